//! Canonical event record.

use crate::native::RawEventInfo;

/// Outcome of the most recent discrete event evaluation.
///
/// `next_event_time` is only meaningful while `upcoming_time_event` is set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventInfo {
    pub iteration_converged: bool,
    pub state_value_references_changed: bool,
    pub state_values_changed: bool,
    pub terminate_simulation: bool,
    pub upcoming_time_event: bool,
    pub next_event_time: f64,
}

impl Default for EventInfo {
    fn default() -> Self {
        Self {
            iteration_converged: false,
            state_value_references_changed: false,
            state_values_changed: false,
            terminate_simulation: false,
            upcoming_time_event: false,
            next_event_time: -1.0,
        }
    }
}

impl EventInfo {
    /// Copy all fields from the native record, normalizing flags to `bool`.
    pub fn assign(&mut self, raw: &RawEventInfo) {
        self.iteration_converged = raw.iteration_converged != 0;
        self.state_value_references_changed = raw.state_value_references_changed != 0;
        self.state_values_changed = raw.state_values_changed != 0;
        self.terminate_simulation = raw.terminate_simulation != 0;
        self.upcoming_time_event = raw.upcoming_time_event != 0;
        self.next_event_time = raw.next_event_time;
    }

    /// Next time event, if one is scheduled.
    pub fn next_time_event(&self) -> Option<f64> {
        self.upcoming_time_event.then_some(self.next_event_time)
    }
}

impl From<&RawEventInfo> for EventInfo {
    fn from(raw: &RawEventInfo) -> Self {
        let mut info = EventInfo::default();
        info.assign(raw);
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_time_event() {
        let info = EventInfo::default();
        assert!(!info.upcoming_time_event);
        assert_eq!(info.next_event_time, -1.0);
        assert_eq!(info.next_time_event(), None);
    }

    #[test]
    fn assign_normalizes_nonzero_bytes() {
        let raw = RawEventInfo {
            iteration_converged: 1,
            state_value_references_changed: 0,
            state_values_changed: 255,
            terminate_simulation: 0,
            upcoming_time_event: 7,
            next_event_time: 2.5,
        };
        let mut info = EventInfo::default();
        info.assign(&raw);

        assert!(info.iteration_converged);
        assert!(!info.state_value_references_changed);
        assert!(info.state_values_changed);
        assert!(!info.terminate_simulation);
        assert_eq!(info.next_time_event(), Some(2.5));
        assert_eq!(EventInfo::from(&raw), info);
    }

    #[test]
    fn assign_overwrites_previous_values() {
        let mut info = EventInfo::from(&RawEventInfo {
            terminate_simulation: 1,
            ..RawEventInfo::default()
        });
        assert!(info.terminate_simulation);

        info.assign(&RawEventInfo::default());
        assert!(!info.terminate_simulation);
        assert_eq!(info.next_event_time, 0.0);
    }
}
