//! Variable reference classification.
//!
//! Partitions a model's declared variables into nested reference subsets:
//!
//! | variability | ALL | START | EVENT | CONTINUOUS |
//! |-------------|-----|-------|-------|------------|
//! | constant    |  ✓  |       |       |            |
//! | parameter   |  ✓  |   ✓   |       |            |
//! | discrete    |  ✓  |   ✓   |   ✓   |            |
//! | continuous  |  ✓  |   ✓   |   ✓   |     ✓      |
//!
//! INPUT and OUTPUT are selected by causality and overlap the chain freely.

use std::collections::{BTreeMap, HashSet};

use fb_values::{ReferenceStore, ScalarKind, ScalarValue, ValueRef, ValueStore};
use tracing::debug;

use crate::description::{Causality, Variability, VariableDescription};
use crate::error::ClassificationError;

/// Named reference subsets maintained for a loaded component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceSubset {
    /// Every declared variable.
    All,
    /// Variables that receive explicit start values (all but constants).
    Start,
    /// Variables relevant at discrete events (start minus parameters).
    Event,
    /// Variables relevant during continuous integration (event minus discrete).
    Continuous,
    Input,
    Output,
}

impl ReferenceSubset {
    pub const ALL: [ReferenceSubset; 6] = [
        ReferenceSubset::All,
        ReferenceSubset::Start,
        ReferenceSubset::Event,
        ReferenceSubset::Continuous,
        ReferenceSubset::Input,
        ReferenceSubset::Output,
    ];

    /// Membership predicate for one variable.
    pub fn admits(self, variable: &VariableDescription) -> bool {
        match self {
            ReferenceSubset::All => true,
            ReferenceSubset::Start => variable.variability != Variability::Constant,
            ReferenceSubset::Event => matches!(
                variable.variability,
                Variability::Discrete | Variability::Continuous
            ),
            ReferenceSubset::Continuous => variable.variability == Variability::Continuous,
            ReferenceSubset::Input => variable.causality == Causality::Input,
            ReferenceSubset::Output => variable.causality == Causality::Output,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ReferenceSubset::All => "all",
            ReferenceSubset::Start => "start",
            ReferenceSubset::Event => "event",
            ReferenceSubset::Continuous => "continuous",
            ReferenceSubset::Input => "input",
            ReferenceSubset::Output => "output",
        }
    }
}

/// Reference subsets of one component, fixed once classification completes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    all: ReferenceStore,
    start: ReferenceStore,
    event: ReferenceStore,
    continuous: ReferenceStore,
    input: ReferenceStore,
    output: ReferenceStore,
    start_values: ValueStore,
    names: BTreeMap<(ScalarKind, ValueRef), String>,
    by_name: BTreeMap<String, (ScalarKind, ValueRef)>,
}

impl Classification {
    /// Classify variables in declaration order.
    ///
    /// Duplicated `(kind, reference)` pairs and repeated names are rejected,
    /// never merged.
    pub fn classify(variables: &[VariableDescription]) -> Result<Self, ClassificationError> {
        let mut out = Classification::default();
        let mut seen = HashSet::with_capacity(variables.len());

        for var in variables {
            let kind = var.kind();
            if !seen.insert((kind, var.value_reference)) {
                return Err(ClassificationError::DuplicateReference {
                    name: var.name.clone(),
                    kind,
                    reference: var.value_reference,
                });
            }
            if out.by_name.contains_key(&var.name) {
                return Err(ClassificationError::DuplicateName {
                    name: var.name.clone(),
                });
            }

            for subset in ReferenceSubset::ALL {
                if subset.admits(var) {
                    out.store_mut(subset).push(kind, var.value_reference);
                }
            }
            if ReferenceSubset::Start.admits(var) {
                out.start_values.push(resolve_start(var)?);
            }
            out.names.insert((kind, var.value_reference), var.name.clone());
            out.by_name.insert(var.name.clone(), (kind, var.value_reference));
        }

        debug!(
            all = out.all.size(),
            start = out.start.size(),
            event = out.event.size(),
            continuous = out.continuous.size(),
            inputs = out.input.size(),
            outputs = out.output.size(),
            "classified variable references"
        );
        Ok(out)
    }

    pub fn subset(&self, subset: ReferenceSubset) -> &ReferenceStore {
        match subset {
            ReferenceSubset::All => &self.all,
            ReferenceSubset::Start => &self.start,
            ReferenceSubset::Event => &self.event,
            ReferenceSubset::Continuous => &self.continuous,
            ReferenceSubset::Input => &self.input,
            ReferenceSubset::Output => &self.output,
        }
    }

    fn store_mut(&mut self, subset: ReferenceSubset) -> &mut ReferenceStore {
        match subset {
            ReferenceSubset::All => &mut self.all,
            ReferenceSubset::Start => &mut self.start,
            ReferenceSubset::Event => &mut self.event,
            ReferenceSubset::Continuous => &mut self.continuous,
            ReferenceSubset::Input => &mut self.input,
            ReferenceSubset::Output => &mut self.output,
        }
    }

    /// Start values, positionally aligned with the START subset.
    pub fn start_values(&self) -> &ValueStore {
        &self.start_values
    }

    /// Variable name behind a reference, if declared.
    pub fn name_of(&self, kind: ScalarKind, reference: ValueRef) -> Option<&str> {
        self.names.get(&(kind, reference)).map(String::as_str)
    }

    /// `(kind, name)` pairs in the store order of a subset.
    pub fn names_of(&self, subset: ReferenceSubset) -> Vec<(ScalarKind, &str)> {
        self.subset(subset)
            .iter()
            .map(|(kind, _, r)| (kind, self.name_of(kind, r).unwrap_or("?")))
            .collect()
    }

    /// Locate a variable by name as `(kind, reference)`.
    pub fn find(&self, name: &str) -> Option<(ScalarKind, ValueRef)> {
        self.by_name.get(name).copied()
    }

    /// CONTINUOUS ⊆ EVENT ⊆ START ⊆ ALL, and INPUT, OUTPUT ⊆ ALL.
    pub fn is_nested(&self) -> bool {
        self.continuous.is_subset_of(&self.event)
            && self.event.is_subset_of(&self.start)
            && self.start.is_subset_of(&self.all)
            && self.input.is_subset_of(&self.all)
            && self.output.is_subset_of(&self.all)
    }
}

fn resolve_start(var: &VariableDescription) -> Result<ScalarValue, ClassificationError> {
    let kind = var.kind();
    match &var.start {
        None => Ok(ScalarValue::default_of(kind)),
        Some(v) if v.kind() == kind => Ok(v.clone()),
        // Whole-number literals in text formats parse as integers.
        Some(ScalarValue::Integer(i)) if kind == ScalarKind::Real => {
            Ok(ScalarValue::Real(f64::from(*i)))
        }
        Some(v) => Err(ClassificationError::StartKindMismatch {
            name: var.name.clone(),
            expected: kind,
            actual: v.kind(),
        }),
    }
}
