//! Decoding of dependency expressions.

use solv_core::{Id, Pool, RelOp};

use crate::split::Fields;

/// Why a dependency body could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepError {
    /// Neither one nor three fields.
    FieldCount(usize),
    /// Operator outside the comparison set.
    UnknownRelation(String),
}

/// Intern an epoch:version-release string, dropping a redundant `0:` epoch.
pub fn make_evr(pool: &mut Pool, evr: &str) -> Id {
    let evr = match evr.strip_prefix("0:") {
        Some(rest) if !rest.is_empty() => rest,
        _ => evr,
    };
    pool.intern(evr)
}

/// Concatenate `parts` into `scratch` and return the result.
pub fn join<'s>(scratch: &'s mut String, parts: &[&str]) -> &'s str {
    scratch.clear();
    for part in parts {
        scratch.push_str(part);
    }
    scratch.as_str()
}

/// Decode `name` or `name op evr` into a dependency id.
///
/// With a `kind`, the name is interned as `kind:name`.
pub fn parse_dep(
    pool: &mut Pool,
    scratch: &mut String,
    body: &str,
    kind: Option<&str>,
) -> Result<Id, DepError> {
    let fields = Fields::<4>::split(body);
    if fields.len() != 1 && fields.len() != 3 {
        return Err(DepError::FieldCount(fields.len()));
    }

    let name = match kind {
        Some(kind) => pool.intern(join(scratch, &[kind, ":", fields[0]])),
        None => pool.intern(fields[0]),
    };
    if fields.len() == 1 {
        return Ok(name);
    }

    let evr = make_evr(pool, fields[2]);
    let op = RelOp::from_token(fields[1])
        .ok_or_else(|| DepError::UnknownRelation(fields[1].to_string()))?;
    Ok(pool.intern_rel(name, evr, op))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dep(pool: &mut Pool, body: &str, kind: Option<&str>) -> Result<Id, DepError> {
        let mut scratch = String::new();
        parse_dep(pool, &mut scratch, body, kind)
    }

    #[test]
    fn bare_capability() {
        let mut pool = Pool::new();
        let id = dep(&mut pool, " /bin/sh", None).unwrap();
        assert!(!id.is_rel());
        assert_eq!(pool.str(id), "/bin/sh");
    }

    #[test]
    fn versioned_relation() {
        let mut pool = Pool::new();
        let id = dep(&mut pool, " glibc >= 2.31-1", None).unwrap();
        assert_eq!(pool.dep_to_string(id), "glibc >= 2.31-1");
        let rel = pool.relation(id).unwrap();
        assert_eq!(rel.op, RelOp::Ge);
    }

    #[test]
    fn kind_prefix_applies_to_name() {
        let mut pool = Pool::new();
        let id = dep(&mut pool, " base", Some("pattern")).unwrap();
        assert_eq!(pool.str(id), "pattern:base");
    }

    #[test]
    fn zero_epoch_is_dropped() {
        let mut pool = Pool::new();
        let id = dep(&mut pool, " foo = 0:1.2", None).unwrap();
        assert_eq!(pool.dep_to_string(id), "foo = 1.2");
        let id = dep(&mut pool, " foo = 1:1.2", None).unwrap();
        assert_eq!(pool.dep_to_string(id), "foo = 1:1.2");
        // A bare "0:" has nothing after the epoch and is kept.
        let id = dep(&mut pool, " foo = 0:", None).unwrap();
        assert_eq!(pool.dep_to_string(id), "foo = 0:");
    }

    #[test]
    fn same_dependency_twice_gives_same_id() {
        let mut pool = Pool::new();
        let a = dep(&mut pool, " bar < 2", None).unwrap();
        let b = dep(&mut pool, "bar  <  2", None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn two_fields_are_rejected() {
        let mut pool = Pool::new();
        assert_eq!(dep(&mut pool, " bar > ", None), Err(DepError::FieldCount(2)));
        assert_eq!(dep(&mut pool, "", None), Err(DepError::FieldCount(0)));
        assert_eq!(dep(&mut pool, "a = 1 extra", None), Err(DepError::FieldCount(4)));
    }

    #[test]
    fn unknown_operator_is_rejected() {
        let mut pool = Pool::new();
        assert_eq!(
            dep(&mut pool, "bar == 1", None),
            Err(DepError::UnknownRelation("==".into()))
        );
    }
}
