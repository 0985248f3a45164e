//! Four-kind value and reference stores.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ValueError, ValueResult};
use crate::kind::{Kind, ScalarKind, ScalarValue, ValueRef};

/// Parallel per-kind sequences of variable values.
///
/// Sequences are index-aligned within a kind but not across kinds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueStore {
    #[serde(default)]
    pub(crate) reals: Vec<f64>,
    #[serde(default)]
    pub(crate) integers: Vec<i32>,
    #[serde(default)]
    pub(crate) booleans: Vec<bool>,
    #[serde(default)]
    pub(crate) texts: Vec<String>,
}

impl ValueStore {
    /// Build a store from four explicit sequences.
    pub fn new(reals: Vec<f64>, integers: Vec<i32>, booleans: Vec<bool>, texts: Vec<String>) -> Self {
        Self {
            reals,
            integers,
            booleans,
            texts,
        }
    }

    /// Build a zero-filled store with the given per-kind lengths.
    pub fn with_sizes(reals: usize, integers: usize, booleans: usize, texts: usize) -> Self {
        Self {
            reals: vec![0.0; reals],
            integers: vec![0; integers],
            booleans: vec![false; booleans],
            texts: vec![String::new(); texts],
        }
    }

    pub fn get<K: Kind>(&self) -> &[K::Value] {
        K::values(self)
    }

    pub fn get_mut<K: Kind>(&mut self) -> &mut Vec<K::Value> {
        K::values_mut(self)
    }

    /// Bounds-checked element access.
    pub fn at<K: Kind>(&self, index: usize) -> ValueResult<&K::Value> {
        let values = K::values(self);
        values.get(index).ok_or(ValueError::Index {
            kind: K::KIND,
            index,
            len: values.len(),
        })
    }

    /// Bounds-checked element update.
    pub fn set_at<K: Kind>(&mut self, index: usize, value: K::Value) -> ValueResult<()> {
        let values = K::values_mut(self);
        let len = values.len();
        let slot = values.get_mut(index).ok_or(ValueError::Index {
            kind: K::KIND,
            index,
            len,
        })?;
        *slot = value;
        Ok(())
    }

    /// Element access by runtime kind.
    pub fn value_at(&self, kind: ScalarKind, index: usize) -> ValueResult<ScalarValue> {
        match kind {
            ScalarKind::Real => self.dyn_at::<crate::Real>(index),
            ScalarKind::Integer => self.dyn_at::<crate::Integer>(index),
            ScalarKind::Boolean => self.dyn_at::<crate::Boolean>(index),
            ScalarKind::Text => self.dyn_at::<crate::Text>(index),
        }
    }

    fn dyn_at<K: Kind>(&self, index: usize) -> ValueResult<ScalarValue> {
        self.at::<K>(index).map(|v| K::wrap(v.clone()))
    }

    /// Append a dynamically kinded value to the sequence of its kind.
    pub fn push(&mut self, value: ScalarValue) {
        match value {
            ScalarValue::Real(v) => self.reals.push(v),
            ScalarValue::Integer(v) => self.integers.push(v),
            ScalarValue::Boolean(v) => self.booleans.push(v),
            ScalarValue::Text(v) => self.texts.push(v),
        }
    }

    /// Replace all four sequences with copies of `other`'s.
    pub fn assign(&mut self, other: &ValueStore) {
        self.clone_from(other);
    }

    pub fn len_of(&self, kind: ScalarKind) -> usize {
        match kind {
            ScalarKind::Real => self.reals.len(),
            ScalarKind::Integer => self.integers.len(),
            ScalarKind::Boolean => self.booleans.len(),
            ScalarKind::Text => self.texts.len(),
        }
    }

    /// Total element count across all kinds.
    pub fn size(&self) -> usize {
        self.reals.len() + self.integers.len() + self.booleans.len() + self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reals.is_empty()
            && self.integers.is_empty()
            && self.booleans.is_empty()
            && self.texts.is_empty()
    }

    /// Check that every kind has exactly as many values as `refs` has references.
    pub fn check_aligned(&self, refs: &ReferenceStore) -> ValueResult<()> {
        for kind in ScalarKind::ALL {
            let expected = refs.len_of(kind);
            let actual = self.len_of(kind);
            if expected != actual {
                return Err(ValueError::LengthMismatch {
                    kind,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }
}

/// Parallel per-kind sequences of native value references.
///
/// Has the same shape as [`ValueStore`]; a reference store produced by a
/// classification pass fixes the layout of every value store built from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceStore {
    #[serde(default)]
    pub(crate) reals: Vec<ValueRef>,
    #[serde(default)]
    pub(crate) integers: Vec<ValueRef>,
    #[serde(default)]
    pub(crate) booleans: Vec<ValueRef>,
    #[serde(default)]
    pub(crate) texts: Vec<ValueRef>,
}

impl ReferenceStore {
    pub fn new(
        reals: Vec<ValueRef>,
        integers: Vec<ValueRef>,
        booleans: Vec<ValueRef>,
        texts: Vec<ValueRef>,
    ) -> Self {
        Self {
            reals,
            integers,
            booleans,
            texts,
        }
    }

    pub fn get<K: Kind>(&self) -> &[ValueRef] {
        K::refs(self)
    }

    pub fn get_mut<K: Kind>(&mut self) -> &mut Vec<ValueRef> {
        K::refs_mut(self)
    }

    /// References of a kind selected at runtime.
    pub fn refs_of(&self, kind: ScalarKind) -> &[ValueRef] {
        match kind {
            ScalarKind::Real => &self.reals,
            ScalarKind::Integer => &self.integers,
            ScalarKind::Boolean => &self.booleans,
            ScalarKind::Text => &self.texts,
        }
    }

    /// Bounds-checked reference access.
    pub fn at<K: Kind>(&self, index: usize) -> ValueResult<ValueRef> {
        let refs = K::refs(self);
        refs.get(index).copied().ok_or(ValueError::Index {
            kind: K::KIND,
            index,
            len: refs.len(),
        })
    }

    /// Append a reference to a kind's sequence, returning its index within the kind.
    pub fn push(&mut self, kind: ScalarKind, reference: ValueRef) -> usize {
        let refs = match kind {
            ScalarKind::Real => &mut self.reals,
            ScalarKind::Integer => &mut self.integers,
            ScalarKind::Boolean => &mut self.booleans,
            ScalarKind::Text => &mut self.texts,
        };
        refs.push(reference);
        refs.len() - 1
    }

    pub fn contains(&self, kind: ScalarKind, reference: ValueRef) -> bool {
        self.refs_of(kind).contains(&reference)
    }

    /// Iterate `(kind, index within kind, reference)` in store order.
    pub fn iter(&self) -> impl Iterator<Item = (ScalarKind, usize, ValueRef)> + '_ {
        ScalarKind::ALL.into_iter().flat_map(move |kind| {
            self.refs_of(kind)
                .iter()
                .enumerate()
                .map(move |(i, &r)| (kind, i, r))
        })
    }

    pub fn len_of(&self, kind: ScalarKind) -> usize {
        self.refs_of(kind).len()
    }

    pub fn size(&self) -> usize {
        self.reals.len() + self.integers.len() + self.booleans.len() + self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reals.is_empty()
            && self.integers.is_empty()
            && self.booleans.is_empty()
            && self.texts.is_empty()
    }

    /// True if every reference here also appears, with the same kind, in `other`.
    pub fn is_subset_of(&self, other: &ReferenceStore) -> bool {
        self.iter().all(|(kind, _, r)| other.contains(kind, r))
    }

    /// A zero-filled value store aligned with this reference store.
    pub fn zeroed_values(&self) -> ValueStore {
        ValueStore::with_sizes(
            self.reals.len(),
            self.integers.len(),
            self.booleans.len(),
            self.texts.len(),
        )
    }
}

fn write_kind<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    kind: ScalarKind,
    values: impl IntoIterator<Item = T>,
) -> fmt::Result {
    write!(f, "{}:|", kind.label())?;
    for v in values {
        write!(f, "{v}|")?;
    }
    Ok(())
}

/// Text value with the layout delimiters `\`, `|` and `,` backslash-escaped.
struct Escaped<'a>(&'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            if matches!(c, '\\' | '|' | ',') {
                f.write_str("\\")?;
            }
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ValueStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        write_kind(f, ScalarKind::Real, &self.reals)?;
        f.write_str(",")?;
        write_kind(f, ScalarKind::Integer, &self.integers)?;
        f.write_str(",")?;
        write_kind(f, ScalarKind::Boolean, &self.booleans)?;
        f.write_str(",")?;
        write_kind(f, ScalarKind::Text, self.texts.iter().map(|t| Escaped(t)))?;
        f.write_str("]")
    }
}

impl fmt::Display for ReferenceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, kind) in ScalarKind::ALL.into_iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write_kind(f, kind, self.refs_of(kind))?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::{Boolean, Integer, Real, Text};

    fn sample() -> ValueStore {
        ValueStore::new(
            vec![1.0, 2.5],
            vec![3],
            vec![true, false],
            vec!["abc".to_string()],
        )
    }

    #[test]
    fn typed_accessors() {
        let mut store = sample();
        assert_eq!(store.get::<Real>(), &[1.0, 2.5]);
        assert_eq!(store.get::<Integer>(), &[3]);
        assert_eq!(store.get::<Boolean>(), &[true, false]);
        assert_eq!(store.get::<Text>(), &["abc".to_string()]);

        store.get_mut::<Integer>().push(4);
        assert_eq!(store.len_of(ScalarKind::Integer), 2);
    }

    #[test]
    fn zero_filled_sizes() {
        let store = ValueStore::with_sizes(2, 1, 3, 1);
        assert_eq!(store.size(), 7);
        assert_eq!(store.get::<Real>(), &[0.0, 0.0]);
        assert_eq!(store.get::<Boolean>(), &[false, false, false]);
        assert_eq!(store.get::<Text>(), &[String::new()]);

        let empty = ValueStore::with_sizes(0, 0, 0, 0);
        assert!(empty.is_empty());
        assert_eq!(empty.size(), 0);
        assert_eq!(empty, ValueStore::default());
    }

    #[test]
    fn out_of_range_access_is_index_error() {
        let mut store = sample();
        assert_eq!(*store.at::<Real>(1).unwrap(), 2.5);
        assert_eq!(
            store.at::<Integer>(1),
            Err(ValueError::Index {
                kind: ScalarKind::Integer,
                index: 1,
                len: 1
            })
        );
        assert!(matches!(
            store.set_at::<Text>(5, "x".into()),
            Err(ValueError::Index { index: 5, len: 1, .. })
        ));
        assert!(store.value_at(ScalarKind::Boolean, 2).is_err());
    }

    #[test]
    fn value_at_by_runtime_kind() {
        let store = sample();
        assert_eq!(
            store.value_at(ScalarKind::Real, 1).unwrap(),
            ScalarValue::Real(2.5)
        );
        assert_eq!(
            store.value_at(ScalarKind::Text, 0).unwrap(),
            ScalarValue::Text("abc".into())
        );
    }

    #[test]
    fn assign_and_clone_are_deep() {
        let src = sample();
        let mut dst = ValueStore::with_sizes(1, 1, 1, 1);
        dst.assign(&src);
        assert_eq!(dst, src);

        let mut copy = src.clone();
        copy.set_at::<Real>(0, 9.0).unwrap();
        assert_eq!(*src.at::<Real>(0).unwrap(), 1.0);
    }

    #[test]
    fn display_layout_is_deterministic() {
        assert_eq!(
            sample().to_string(),
            "[Real:|1|2.5|,Int:|3|,Bool:|true|false|,String:|abc|]"
        );
        assert_eq!(
            ValueStore::default().to_string(),
            "[Real:|,Int:|,Bool:|,String:|]"
        );
    }

    #[test]
    fn display_escapes_delimiters_in_text() {
        let store = ValueStore::new(
            vec![],
            vec![],
            vec![],
            vec!["a|b".to_string(), "c,d".to_string(), "e\\f".to_string()],
        );
        assert_eq!(
            store.to_string(),
            r"[Real:|,Int:|,Bool:|,String:|a\|b|c\,d|e\\f|]"
        );

        // a single text holding a delimiter differs from two plain texts
        let joined = ValueStore::new(vec![], vec![], vec![], vec!["x|y".to_string()]);
        let split = ValueStore::new(vec![], vec![], vec![], vec!["x".to_string(), "y".to_string()]);
        assert_ne!(joined.to_string(), split.to_string());
    }

    #[test]
    fn reference_store_push_and_iterate() {
        let mut refs = ReferenceStore::default();
        assert_eq!(refs.push(ScalarKind::Integer, 10), 0);
        assert_eq!(refs.push(ScalarKind::Real, 3), 0);
        assert_eq!(refs.push(ScalarKind::Real, 1), 1);

        let items: Vec<_> = refs.iter().collect();
        assert_eq!(
            items,
            vec![
                (ScalarKind::Real, 0, 3),
                (ScalarKind::Real, 1, 1),
                (ScalarKind::Integer, 0, 10),
            ]
        );
        assert!(refs.contains(ScalarKind::Real, 1));
        assert!(!refs.contains(ScalarKind::Integer, 1));
        assert_eq!(refs.at::<Real>(1).unwrap(), 1);
        assert_eq!(refs.to_string(), "[Real:|3|1|,Int:|10|,Bool:|,String:|]");
    }

    #[test]
    fn zeroed_values_are_aligned() {
        let refs = ReferenceStore::new(vec![0, 1], vec![], vec![4], vec![5, 6]);
        let values = refs.zeroed_values();
        assert!(values.check_aligned(&refs).is_ok());
        assert_eq!(values.size(), refs.size());

        let short = ValueStore::with_sizes(2, 0, 1, 1);
        assert_eq!(
            short.check_aligned(&refs),
            Err(ValueError::LengthMismatch {
                kind: ScalarKind::Text,
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn subset_check_respects_kind() {
        let all = ReferenceStore::new(vec![0, 1], vec![0], vec![], vec![]);
        let sub = ReferenceStore::new(vec![1], vec![], vec![], vec![]);
        let other_kind = ReferenceStore::new(vec![], vec![], vec![1], vec![]);
        assert!(sub.is_subset_of(&all));
        assert!(!other_kind.is_subset_of(&all));
    }
}
