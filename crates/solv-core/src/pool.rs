//! String and relation interning.
//!
//! Every name, version, architecture, and dependency expression is stored once
//! in the [`Pool`] and referred to by a small [`Id`]. Strings and relations
//! share a single id space; relation ids carry [`Id::REL_BIT`].

use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Interned identifier for a string or a relation.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Id(u32);

impl Id {
    /// Tag bit distinguishing relation ids from string ids.
    pub const REL_BIT: u32 = 0x8000_0000;

    /// The empty string; used as "absent".
    pub const NULL: Id = Id(0);
    /// Architecture of a source package.
    pub const ARCH_SRC: Id = Id(1);
    /// Architecture of a source package without sources.
    pub const ARCH_NOSRC: Id = Id(2);
    /// Namespace name for kernel module aliases.
    pub const NAMESPACE_MODALIAS: Id = Id(3);
    /// Namespace name for split provides.
    pub const NAMESPACE_SPLITPROVIDES: Id = Id(4);
    /// Separates plain requires from pre-requires inside a requires list.
    pub const PREREQ_MARKER: Id = Id(5);

    /// Whether this id refers to a relation.
    pub fn is_rel(self) -> bool {
        self.0 & Self::REL_BIT != 0
    }

    /// Whether this is the null id.
    pub fn is_null(self) -> bool {
        self == Self::NULL
    }

    /// Raw numeric value.
    pub fn as_u32(self) -> u32 {
        self.0
    }

    fn rel_index(self) -> usize {
        (self.0 & !Self::REL_BIT) as usize
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_rel() {
            write!(f, "rel#{}", self.rel_index())
        } else {
            write!(f, "str#{}", self.0)
        }
    }
}

/// Strings interned by every new pool, in id order.
const PREDEFINED: [&str; 6] = [
    "",
    "src",
    "nosrc",
    "namespace:modalias",
    "namespace:splitprovides",
    "solvable:prereqmarker",
];

/// Relational and structural operators.
///
/// The comparison operators use the flag encoding `GT=1, EQ=2, LT=4`, so that
/// `>=` is `GT|EQ` and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelOp {
    Gt = 1,
    Eq = 2,
    Ge = 3,
    Lt = 4,
    Ne = 5,
    Le = 6,
    And = 16,
    Or = 17,
    With = 18,
    Namespace = 19,
}

impl RelOp {
    /// Comparison tokens in flag order; position + 1 is the flag value.
    pub const COMPARISON_TOKENS: [&'static str; 6] = [">", "=", ">=", "<", "!=", "<="];

    /// Match a comparison token exactly (case-sensitive).
    pub fn from_token(token: &str) -> Option<RelOp> {
        let pos = Self::COMPARISON_TOKENS.iter().position(|t| *t == token)?;
        Self::from_flags(pos as u32 + 1)
    }

    /// Build a comparison operator from its flag value.
    pub fn from_flags(flags: u32) -> Option<RelOp> {
        match flags {
            1 => Some(RelOp::Gt),
            2 => Some(RelOp::Eq),
            3 => Some(RelOp::Ge),
            4 => Some(RelOp::Lt),
            5 => Some(RelOp::Ne),
            6 => Some(RelOp::Le),
            _ => None,
        }
    }

    /// Flag value of this operator.
    pub fn flags(self) -> u32 {
        self as u32
    }

    /// Token used when rendering a relation.
    pub fn as_str(self) -> &'static str {
        match self {
            RelOp::Gt => ">",
            RelOp::Eq => "=",
            RelOp::Ge => ">=",
            RelOp::Lt => "<",
            RelOp::Ne => "!=",
            RelOp::Le => "<=",
            RelOp::And => "&",
            RelOp::Or => "|",
            RelOp::With => "+",
            RelOp::Namespace => "NAMESPACE",
        }
    }
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dependency expression `name op evr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    pub name: Id,
    pub evr: Id,
    pub op: RelOp,
}

/// Interning table for strings and relations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool {
    strings: IndexSet<String>,
    relations: IndexSet<Relation>,
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

impl Pool {
    /// Create a pool holding only the predefined strings.
    pub fn new() -> Self {
        let strings = PREDEFINED.iter().map(|s| s.to_string()).collect();
        Pool {
            strings,
            relations: IndexSet::new(),
        }
    }

    /// Intern a string, returning the existing id if already present.
    pub fn intern(&mut self, text: &str) -> Id {
        if let Some(idx) = self.strings.get_index_of(text) {
            return Id(idx as u32);
        }
        let (idx, _) = self.strings.insert_full(text.to_string());
        Id(idx as u32)
    }

    /// Look up a string without interning it.
    pub fn lookup(&self, text: &str) -> Option<Id> {
        self.strings.get_index_of(text).map(|idx| Id(idx as u32))
    }

    /// Intern the relation `name op evr`.
    pub fn intern_rel(&mut self, name: Id, evr: Id, op: RelOp) -> Id {
        let (idx, _) = self.relations.insert_full(Relation { name, evr, op });
        Id(idx as u32 | Id::REL_BIT)
    }

    /// The relation behind a relation id.
    pub fn relation(&self, id: Id) -> Option<&Relation> {
        if !id.is_rel() {
            return None;
        }
        self.relations.get_index(id.rel_index())
    }

    /// Text of a string id. For a relation id, the text of its name.
    pub fn str(&self, id: Id) -> &str {
        let mut id = id;
        while let Some(rel) = self.relation(id) {
            id = rel.name;
        }
        self.strings
            .get_index(id.0 as usize)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Render a dependency for display.
    pub fn dep_to_string(&self, id: Id) -> String {
        let Some(rel) = self.relation(id) else {
            return self.str(id).to_string();
        };
        match rel.op {
            RelOp::Namespace => {
                format!("{}({})", self.dep_to_string(rel.name), self.dep_to_string(rel.evr))
            }
            RelOp::And | RelOp::Or | RelOp::With => {
                format!(
                    "{} {} {}",
                    self.dep_to_nested(rel.name),
                    rel.op,
                    self.dep_to_nested(rel.evr)
                )
            }
            op => format!("{} {} {}", self.dep_to_string(rel.name), op, self.str(rel.evr)),
        }
    }

    fn dep_to_nested(&self, id: Id) -> String {
        match self.relation(id) {
            Some(rel) if matches!(rel.op, RelOp::And | RelOp::Or | RelOp::With) => {
                format!("({})", self.dep_to_string(id))
            }
            _ => self.dep_to_string(id),
        }
    }

    /// Number of interned strings, including the predefined ones.
    pub fn string_count(&self) -> usize {
        self.strings.len()
    }

    /// Number of interned relations.
    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }
}
