//! fb-values: typed four-kind value and reference storage.
//!
//! Model variables come in four scalar kinds (real, integer, boolean, text).
//! Rather than a single heterogeneous container, every store keeps one
//! strongly-typed sequence per kind and is addressed by `(kind, index)`:
//!
//! - [`ValueStore`] holds variable values
//! - [`ReferenceStore`] holds native value references in the same shape
//!
//! Stores built from the same reference classification are positionally
//! compatible: the same kind and index name the same logical variable, so a
//! reference store and a value store can be zipped for native get/set calls.
//!
//! # Example
//!
//! ```
//! use fb_values::{Real, ReferenceStore, ScalarKind, ValueStore};
//!
//! let mut refs = ReferenceStore::default();
//! refs.push(ScalarKind::Real, 7);
//! refs.push(ScalarKind::Boolean, 2);
//!
//! let mut values = refs.zeroed_values();
//! values.set_at::<Real>(0, 2.5).unwrap();
//!
//! assert_eq!(values.size(), 2);
//! assert_eq!(values.to_string(), "[Real:|2.5|,Int:|,Bool:|false|,String:|]");
//! ```

pub mod error;
pub mod kind;
pub mod store;

pub use error::{ValueError, ValueResult};
pub use kind::{Boolean, Integer, Kind, Real, ScalarKind, ScalarValue, Text, ValueRef};
pub use store::{ReferenceStore, ValueStore};
