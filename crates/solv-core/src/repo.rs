//! Repositories and the solvables they own.
//!
//! A [`Repository`] is an append-only sequence of [`Solvable`] records. Indices
//! are absolute: the first solvable lives at [`Repository::start`] and the
//! range `[start, end)` is contiguous.

use serde::{Deserialize, Serialize};

use crate::pool::Id;

/// How an id is added to a dependency list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepMarker {
    /// Plain append, deduplicated against the whole list.
    None,
    /// A requirement needed at runtime; kept before the pre-requires marker.
    Requires,
    /// A requirement needed at install time; kept after the pre-requires marker.
    PreRequires,
}

/// Add `id` to a dependency list.
///
/// Requires lists have the layout `[requires.., PREREQ_MARKER, prerequires..]`
/// once any pre-requirement has been added. An id already in the list is never
/// duplicated; a plain requirement later added as a pre-requirement moves
/// behind the marker.
pub fn add_dep(deps: &mut Vec<Id>, id: Id, marker: DepMarker) {
    let marker_pos = deps.iter().position(|d| *d == Id::PREREQ_MARKER);
    match marker {
        DepMarker::None => {
            if !deps.contains(&id) {
                deps.push(id);
            }
        }
        DepMarker::Requires => {
            if deps.contains(&id) {
                return;
            }
            match marker_pos {
                Some(pos) => deps.insert(pos, id),
                None => deps.push(id),
            }
        }
        DepMarker::PreRequires => {
            match (deps.iter().position(|d| *d == id), marker_pos) {
                (Some(pos), Some(m)) if pos > m => return,
                (Some(pos), _) => {
                    deps.remove(pos);
                }
                (None, _) => {}
            }
            if !deps.contains(&Id::PREREQ_MARKER) {
                deps.push(Id::PREREQ_MARKER);
            }
            deps.push(id);
        }
    }
}

/// One package, pattern, or source package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solvable {
    pub name: Id,
    pub evr: Id,
    pub arch: Id,
    pub vendor: Id,
    pub provides: Vec<Id>,
    pub requires: Vec<Id>,
    pub conflicts: Vec<Id>,
    pub obsoletes: Vec<Id>,
    pub recommends: Vec<Id>,
    pub supplements: Vec<Id>,
    pub enhances: Vec<Id>,
    pub suggests: Vec<Id>,
    pub freshens: Vec<Id>,
}

impl Solvable {
    /// Whether the architecture marks a source or no-source package.
    pub fn is_source(&self) -> bool {
        self.arch == Id::ARCH_SRC || self.arch == Id::ARCH_NOSRC
    }

    /// Requirements before the pre-requires marker.
    pub fn plain_requires(&self) -> &[Id] {
        match self.requires.iter().position(|d| *d == Id::PREREQ_MARKER) {
            Some(pos) => &self.requires[..pos],
            None => &self.requires,
        }
    }

    /// Requirements after the pre-requires marker.
    pub fn prerequires(&self) -> &[Id] {
        match self.requires.iter().position(|d| *d == Id::PREREQ_MARKER) {
            Some(pos) => &self.requires[pos + 1..],
            None => &[],
        }
    }

    /// Whether `(name, evr, arch)` identifies this solvable.
    pub fn matches(&self, name: Id, evr: Id, arch: Id) -> bool {
        self.name == name && self.evr == evr && self.arch == arch
    }
}

/// An ordered, append-only collection of solvables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Repository {
    name: String,
    start: usize,
    solvables: Vec<Solvable>,
}

impl Repository {
    /// Create an empty repository whose first solvable will have index 0.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_start(name, 0)
    }

    /// Create an empty repository whose first solvable will have index `start`.
    pub fn with_start(name: impl Into<String>, start: usize) -> Self {
        Repository {
            name: name.into(),
            start,
            solvables: Vec::new(),
        }
    }

    /// Repository name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index of the first solvable.
    pub fn start(&self) -> usize {
        self.start
    }

    /// One past the index of the last solvable.
    pub fn end(&self) -> usize {
        self.start + self.solvables.len()
    }

    pub fn len(&self) -> usize {
        self.solvables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solvables.is_empty()
    }

    /// Append an empty solvable and return its absolute index.
    pub fn add_solvable(&mut self) -> usize {
        self.push(Solvable::default())
    }

    /// Append `solvable` and return its absolute index.
    pub fn push(&mut self, solvable: Solvable) -> usize {
        self.solvables.push(solvable);
        self.end() - 1
    }

    /// Solvable at an absolute index.
    pub fn solvable(&self, index: usize) -> Option<&Solvable> {
        index
            .checked_sub(self.start)
            .and_then(|i| self.solvables.get(i))
    }

    /// Mutable solvable at an absolute index.
    pub fn solvable_mut(&mut self, index: usize) -> Option<&mut Solvable> {
        index
            .checked_sub(self.start)
            .and_then(|i| self.solvables.get_mut(i))
    }

    /// Iterate `(absolute index, solvable)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Solvable)> {
        let start = self.start;
        self.solvables
            .iter()
            .enumerate()
            .map(move |(i, s)| (start + i, s))
    }
}
