//! Scalar kinds and the kind-parameterized accessor trait.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::store::{ReferenceStore, ValueStore};

/// Opaque native handle identifying one model variable within a component.
pub type ValueRef = u32;

/// The four scalar kinds a model variable can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScalarKind {
    Real,
    Integer,
    Boolean,
    Text,
}

impl ScalarKind {
    /// All kinds in store order.
    pub const ALL: [ScalarKind; 4] = [
        ScalarKind::Real,
        ScalarKind::Integer,
        ScalarKind::Boolean,
        ScalarKind::Text,
    ];

    /// Short label used by the diagnostic store layout.
    pub fn label(self) -> &'static str {
        match self {
            ScalarKind::Real => "Real",
            ScalarKind::Integer => "Int",
            ScalarKind::Boolean => "Bool",
            ScalarKind::Text => "String",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single dynamically kinded value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Boolean(bool),
    Integer(i32),
    Real(f64),
    Text(String),
}

impl ScalarValue {
    pub fn kind(&self) -> ScalarKind {
        match self {
            ScalarValue::Real(_) => ScalarKind::Real,
            ScalarValue::Integer(_) => ScalarKind::Integer,
            ScalarValue::Boolean(_) => ScalarKind::Boolean,
            ScalarValue::Text(_) => ScalarKind::Text,
        }
    }

    /// Zero value of the given kind.
    pub fn default_of(kind: ScalarKind) -> Self {
        match kind {
            ScalarKind::Real => ScalarValue::Real(0.0),
            ScalarKind::Integer => ScalarValue::Integer(0),
            ScalarKind::Boolean => ScalarValue::Boolean(false),
            ScalarKind::Text => ScalarValue::Text(String::new()),
        }
    }
}

impl From<f64> for ScalarValue {
    fn from(v: f64) -> Self {
        ScalarValue::Real(v)
    }
}

impl From<i32> for ScalarValue {
    fn from(v: i32) -> Self {
        ScalarValue::Integer(v)
    }
}

impl From<bool> for ScalarValue {
    fn from(v: bool) -> Self {
        ScalarValue::Boolean(v)
    }
}

impl From<String> for ScalarValue {
    fn from(v: String) -> Self {
        ScalarValue::Text(v)
    }
}

impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        ScalarValue::Text(v.to_string())
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Real(v) => write!(f, "{v}"),
            ScalarValue::Integer(v) => write!(f, "{v}"),
            ScalarValue::Boolean(v) => write!(f, "{v}"),
            ScalarValue::Text(v) => f.write_str(v),
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Compile-time selector for one of the four kind sequences of a store.
///
/// The marker types [`Real`], [`Integer`], [`Boolean`] and [`Text`] are
/// uninhabited; they only exist to pick a sequence through generic accessors
/// such as `ValueStore::get::<Real>()`.
pub trait Kind: sealed::Sealed + 'static {
    /// Element type of this kind's value sequence.
    type Value: Clone + Default + fmt::Debug + fmt::Display + PartialEq + Send + Sync + 'static;

    const KIND: ScalarKind;

    fn values(store: &ValueStore) -> &Vec<Self::Value>;
    fn values_mut(store: &mut ValueStore) -> &mut Vec<Self::Value>;
    fn refs(store: &ReferenceStore) -> &Vec<ValueRef>;
    fn refs_mut(store: &mut ReferenceStore) -> &mut Vec<ValueRef>;

    /// Wrap a typed value into its dynamic form.
    fn wrap(value: Self::Value) -> ScalarValue;

    /// Unwrap a dynamic value, `None` if it is of another kind.
    fn unwrap(value: ScalarValue) -> Option<Self::Value>;
}

/// Floating point variables (`fmiReal`).
#[derive(Debug)]
pub enum Real {}

/// Integer and enumeration variables (`fmiInteger`).
#[derive(Debug)]
pub enum Integer {}

/// Boolean variables (`fmiBoolean`).
#[derive(Debug)]
pub enum Boolean {}

/// String variables (`fmiString`).
#[derive(Debug)]
pub enum Text {}

impl sealed::Sealed for Real {}
impl sealed::Sealed for Integer {}
impl sealed::Sealed for Boolean {}
impl sealed::Sealed for Text {}

impl Kind for Real {
    type Value = f64;
    const KIND: ScalarKind = ScalarKind::Real;

    fn values(store: &ValueStore) -> &Vec<f64> {
        &store.reals
    }
    fn values_mut(store: &mut ValueStore) -> &mut Vec<f64> {
        &mut store.reals
    }
    fn refs(store: &ReferenceStore) -> &Vec<ValueRef> {
        &store.reals
    }
    fn refs_mut(store: &mut ReferenceStore) -> &mut Vec<ValueRef> {
        &mut store.reals
    }
    fn wrap(value: f64) -> ScalarValue {
        ScalarValue::Real(value)
    }
    fn unwrap(value: ScalarValue) -> Option<f64> {
        match value {
            ScalarValue::Real(v) => Some(v),
            _ => None,
        }
    }
}

impl Kind for Integer {
    type Value = i32;
    const KIND: ScalarKind = ScalarKind::Integer;

    fn values(store: &ValueStore) -> &Vec<i32> {
        &store.integers
    }
    fn values_mut(store: &mut ValueStore) -> &mut Vec<i32> {
        &mut store.integers
    }
    fn refs(store: &ReferenceStore) -> &Vec<ValueRef> {
        &store.integers
    }
    fn refs_mut(store: &mut ReferenceStore) -> &mut Vec<ValueRef> {
        &mut store.integers
    }
    fn wrap(value: i32) -> ScalarValue {
        ScalarValue::Integer(value)
    }
    fn unwrap(value: ScalarValue) -> Option<i32> {
        match value {
            ScalarValue::Integer(v) => Some(v),
            _ => None,
        }
    }
}

impl Kind for Boolean {
    type Value = bool;
    const KIND: ScalarKind = ScalarKind::Boolean;

    fn values(store: &ValueStore) -> &Vec<bool> {
        &store.booleans
    }
    fn values_mut(store: &mut ValueStore) -> &mut Vec<bool> {
        &mut store.booleans
    }
    fn refs(store: &ReferenceStore) -> &Vec<ValueRef> {
        &store.booleans
    }
    fn refs_mut(store: &mut ReferenceStore) -> &mut Vec<ValueRef> {
        &mut store.booleans
    }
    fn wrap(value: bool) -> ScalarValue {
        ScalarValue::Boolean(value)
    }
    fn unwrap(value: ScalarValue) -> Option<bool> {
        match value {
            ScalarValue::Boolean(v) => Some(v),
            _ => None,
        }
    }
}

impl Kind for Text {
    type Value = String;
    const KIND: ScalarKind = ScalarKind::Text;

    fn values(store: &ValueStore) -> &Vec<String> {
        &store.texts
    }
    fn values_mut(store: &mut ValueStore) -> &mut Vec<String> {
        &mut store.texts
    }
    fn refs(store: &ReferenceStore) -> &Vec<ValueRef> {
        &store.texts
    }
    fn refs_mut(store: &mut ReferenceStore) -> &mut Vec<ValueRef> {
        &mut store.texts
    }
    fn wrap(value: String) -> ScalarValue {
        ScalarValue::Text(value)
    }
    fn unwrap(value: ScalarValue) -> Option<String> {
        match value {
            ScalarValue::Text(v) => Some(v),
            _ => None,
        }
    }
}
