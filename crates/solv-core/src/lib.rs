//! Core data model for package dependency solving.
//!
//! Provides the pieces a metadata decoder writes into:
//! - [`pool`]: interning of strings and dependency relations
//! - [`repo`]: repositories of solvables and dependency-list insertion
//! - [`legacy`]: normalization of legacy provides/supplements spellings
//! - [`attr`]: the attribute store for descriptive per-solvable data

pub mod attr;
pub mod legacy;
pub mod pool;
pub mod repo;

pub use attr::{AttrKey, AttrStore, AttrValue, AttributeSink, LocalId};
pub use legacy::fix_legacy;
pub use pool::{Id, Pool, RelOp, Relation};
pub use repo::{add_dep, DepMarker, Repository, Solvable};
