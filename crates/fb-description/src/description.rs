//! Parsed model description shapes.

use fb_values::{ScalarKind, ScalarValue, ValueRef};
use serde::{Deserialize, Serialize};

/// Base type of a scalar variable as declared by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclaredType {
    Real,
    Integer,
    Boolean,
    String,
    Enumeration,
}

impl DeclaredType {
    /// Storage kind; enumerations are exchanged as integers.
    pub fn kind(self) -> ScalarKind {
        match self {
            DeclaredType::Real => ScalarKind::Real,
            DeclaredType::Integer | DeclaredType::Enumeration => ScalarKind::Integer,
            DeclaredType::Boolean => ScalarKind::Boolean,
            DeclaredType::String => ScalarKind::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Causality {
    Input,
    Output,
    #[default]
    Internal,
    None,
}

/// How and when a variable may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variability {
    Constant,
    Parameter,
    Discrete,
    #[default]
    Continuous,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDescription {
    pub name: String,
    pub value_reference: ValueRef,
    pub declared_type: DeclaredType,
    #[serde(default)]
    pub causality: Causality,
    #[serde(default)]
    pub variability: Variability,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<ScalarValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl VariableDescription {
    /// Internal continuous variable without a start value.
    pub fn new(name: impl Into<String>, value_reference: ValueRef, declared_type: DeclaredType) -> Self {
        Self {
            name: name.into(),
            value_reference,
            declared_type,
            causality: Causality::default(),
            variability: Variability::default(),
            start: None,
            description: None,
        }
    }

    pub fn with_causality(mut self, causality: Causality) -> Self {
        self.causality = causality;
        self
    }

    pub fn with_variability(mut self, variability: Variability) -> Self {
        self.variability = variability;
        self
    }

    pub fn with_start(mut self, start: impl Into<ScalarValue>) -> Self {
        self.start = Some(start.into());
        self
    }

    pub fn kind(&self) -> ScalarKind {
        self.declared_type.kind()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DefaultExperiment {
    #[serde(default)]
    pub start_time: f64,
    #[serde(default = "default_stop_time")]
    pub stop_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
}

fn default_stop_time() -> f64 {
    1.0
}

impl Default for DefaultExperiment {
    fn default() -> Self {
        Self {
            start_time: 0.0,
            stop_time: default_stop_time(),
            tolerance: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescription {
    pub model_name: String,
    pub model_identifier: String,
    pub guid: String,
    #[serde(default)]
    pub number_of_continuous_states: usize,
    #[serde(default)]
    pub number_of_event_indicators: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_experiment: Option<DefaultExperiment>,
    #[serde(default)]
    pub variables: Vec<VariableDescription>,
}

impl ModelDescription {
    pub fn default_start(&self) -> f64 {
        self.default_experiment.unwrap_or_default().start_time
    }

    pub fn default_stop(&self) -> f64 {
        self.default_experiment.unwrap_or_default().stop_time
    }

    pub fn variable(&self, name: &str) -> Option<&VariableDescription> {
        self.variables.iter().find(|v| v.name == name)
    }
}
