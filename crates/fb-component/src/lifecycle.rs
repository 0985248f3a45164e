//! Adapter lifecycle states.

use core::fmt;

/// Where an adapter is in its load → initialize → step → event cycle.
///
/// `Unloaded` is reachable from every state through `unload()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecycleState {
    #[default]
    Unloaded,
    Loaded,
    Initialized,
    Stepping,
    EventHandling,
    Terminated,
}

impl LifecycleState {
    /// A native instance is bound.
    pub fn is_loaded(self) -> bool {
        self != LifecycleState::Unloaded
    }

    /// Initialized and not yet terminated.
    pub fn is_running(self) -> bool {
        matches!(
            self,
            LifecycleState::Initialized | LifecycleState::Stepping | LifecycleState::EventHandling
        )
    }

    /// Native setters may be called.
    pub fn accepts_writes(self) -> bool {
        self.is_loaded() && self != LifecycleState::Terminated
    }

    /// State after a continuous-time call (time, states, step completion).
    pub(crate) fn after_continuous_call(self) -> Self {
        match self {
            LifecycleState::Initialized | LifecycleState::EventHandling => LifecycleState::Stepping,
            other => other,
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LifecycleState::Unloaded => "unloaded",
            LifecycleState::Loaded => "loaded",
            LifecycleState::Initialized => "initialized",
            LifecycleState::Stepping => "stepping",
            LifecycleState::EventHandling => "event-handling",
            LifecycleState::Terminated => "terminated",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicates() {
        assert!(!LifecycleState::Unloaded.is_loaded());
        assert!(LifecycleState::Loaded.is_loaded());
        assert!(!LifecycleState::Loaded.is_running());
        assert!(LifecycleState::EventHandling.is_running());
        assert!(!LifecycleState::Terminated.is_running());
        assert!(LifecycleState::Terminated.is_loaded());
        assert!(!LifecycleState::Terminated.accepts_writes());
        assert!(!LifecycleState::Unloaded.accepts_writes());
        assert!(LifecycleState::Loaded.accepts_writes());
    }

    #[test]
    fn continuous_calls_enter_stepping() {
        assert_eq!(
            LifecycleState::Initialized.after_continuous_call(),
            LifecycleState::Stepping
        );
        assert_eq!(
            LifecycleState::EventHandling.after_continuous_call(),
            LifecycleState::Stepping
        );
        assert_eq!(
            LifecycleState::Loaded.after_continuous_call(),
            LifecycleState::Loaded
        );
        assert_eq!(
            LifecycleState::Terminated.after_continuous_call(),
            LifecycleState::Terminated
        );
    }
}
