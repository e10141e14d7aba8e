//! Conversion of legacy dependency spellings into supplements.
//!
//! Older package metadata encodes some reverse dependencies as magic provides
//! (`locale(...)`, `name:/path`) or as magic supplements (`modalias(...)`,
//! `packageand(...)`). [`fix_legacy`] turns them into proper relations.

use crate::pool::{Id, Pool, RelOp};
use crate::repo::{add_dep, DepMarker};

/// Normalize legacy provides and supplements of one solvable.
pub fn fix_legacy(pool: &mut Pool, provides: &[Id], supplements: &mut Vec<Id>) {
    for &id in provides {
        if id.is_rel() {
            continue;
        }
        let dep = pool.str(id).to_string();
        let extra = if let Some(inner) = dep.strip_prefix("locale(") {
            locale_supplement(pool, inner)
        } else {
            split_provides_supplement(pool, &dep)
        };
        if let Some(extra) = extra {
            add_dep(supplements, extra, DepMarker::None);
        }
    }

    for slot in supplements.iter_mut() {
        if slot.is_rel() {
            continue;
        }
        let dep = pool.str(*slot).to_string();
        let dep = match dep.strip_prefix("system:") {
            Some(rest) if rest.starts_with("modalias(") => rest,
            _ => dep.as_str(),
        };
        let rewritten = if let Some(inner) = dep.strip_prefix("modalias(") {
            modalias_supplement(pool, inner)
        } else if let Some(inner) = dep.strip_prefix("packageand(") {
            packageand_supplement(pool, inner)
        } else {
            None
        };
        if let Some(id) = rewritten {
            *slot = id;
        }
    }
}

/// `locale(pkg:de;fr)` becomes `pkg & (language:de | language:fr)`.
fn locale_supplement(pool: &mut Pool, inner: &str) -> Option<Id> {
    let inner = inner.split(')').next().unwrap_or(inner);
    let (package, languages) = match inner.find(':') {
        Some(pos) if pos > 0 => (Some(&inner[..pos]), &inner[pos + 1..]),
        _ => (None, inner),
    };

    let mut langs: Option<Id> = None;
    for lang in languages.split(';').filter(|l| !l.is_empty()) {
        let id = pool.intern(&format!("language:{lang}"));
        langs = Some(match langs {
            Some(prev) => pool.intern_rel(prev, id, RelOp::Or),
            None => id,
        });
    }
    let langs = langs?;
    match package {
        Some(package) => {
            let package = pool.intern(package);
            Some(pool.intern_rel(package, langs, RelOp::And))
        }
        None => Some(langs),
    }
}

/// `name:/some/path/` becomes `namespace:splitprovides(name + /some/path)`.
fn split_provides_supplement(pool: &mut Pool, dep: &str) -> Option<Id> {
    let pos = dep.find(':')?;
    if pos == 0 || !dep[pos + 1..].starts_with('/') {
        return None;
    }
    let name = pool.intern(&dep[..pos]);
    let mut path = &dep[pos + 1..];
    while path.len() > 1 && path.ends_with('/') {
        path = &path[..path.len() - 1];
    }
    let path = pool.intern(path);
    let with = pool.intern_rel(name, path, RelOp::With);
    Some(pool.intern_rel(Id::NAMESPACE_SPLITPROVIDES, with, RelOp::Namespace))
}

/// `modalias(driver:pattern)` becomes `driver & namespace:modalias(pattern)`.
fn modalias_supplement(pool: &mut Pool, inner: &str) -> Option<Id> {
    let body = inner.strip_suffix(')').unwrap_or(inner);
    if body.is_empty() {
        return None;
    }
    match body.find(':') {
        Some(pos) if pos > 0 && body[pos + 1..].contains(':') => {
            let driver = pool.intern(&body[..pos]);
            let alias = pool.intern(&body[pos + 1..]);
            let ns = pool.intern_rel(Id::NAMESPACE_MODALIAS, alias, RelOp::Namespace);
            Some(pool.intern_rel(driver, ns, RelOp::And))
        }
        _ => {
            let alias = pool.intern(body);
            Some(pool.intern_rel(Id::NAMESPACE_MODALIAS, alias, RelOp::Namespace))
        }
    }
}

/// `packageand(a:b:c)` becomes `a & b & c`.
fn packageand_supplement(pool: &mut Pool, inner: &str) -> Option<Id> {
    let inner = inner.strip_suffix(')').unwrap_or(inner);
    let mut result: Option<Id> = None;
    for part in inner.split(':').filter(|p| !p.is_empty()) {
        let id = pool.intern(part);
        result = Some(match result {
            Some(prev) => pool.intern_rel(prev, id, RelOp::And),
            None => id,
        });
    }
    result
}
