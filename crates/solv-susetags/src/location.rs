//! Compact encoding of package locations and source references.
//!
//! A package's media file name is usually `<name>-<evr>.<arch>.rpm`; in that
//! case only a void marker is stored and the name is rebuilt on demand with
//! [`media_file_name`].

use solv_core::{AttrKey, AttrStore, AttrValue, AttributeSink, Id, Pool, Solvable};

use crate::split::Fields;

/// A decoded `=Loc` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location<'a> {
    /// The file name follows from the solvable's own identity.
    Derived { medianr: u32 },
    /// The file name (and possibly directory) must be stored verbatim.
    Explicit {
        medianr: u32,
        file: &'a str,
        dir: Option<&'a str>,
    },
}

impl<'a> Location<'a> {
    /// Decode `medianr file [dir]` for `solvable`.
    ///
    /// Returns `None` unless there are two or three fields. A directory equal
    /// to the solvable's architecture is implied and dropped.
    pub fn parse(body: &'a str, solvable: &Solvable, pool: &Pool) -> Option<Location<'a>> {
        let fields = Fields::<3>::split(body);
        if fields.len() != 2 && fields.len() != 3 {
            return None;
        }
        let medianr = atoi(fields[0]);
        let file = fields[1];
        let dir = (fields.len() == 3 && fields[2] != pool.str(solvable.arch)).then(|| fields[2]);

        if dir.is_none() && is_derived_file_name(file, solvable, pool) {
            Some(Location::Derived { medianr })
        } else {
            Some(Location::Explicit { medianr, file, dir })
        }
    }

    /// Write the location attributes for `entry`.
    pub fn emit(&self, sink: &mut dyn AttributeSink, entry: usize) {
        match *self {
            Location::Derived { medianr } => {
                sink.set_int(entry, AttrKey::MediaNr, medianr);
                sink.set_void(entry, AttrKey::MediaFile);
            }
            Location::Explicit { medianr, file, dir } => {
                sink.set_int(entry, AttrKey::MediaNr, medianr);
                if let Some(dir) = dir {
                    let dir = sink.local_id(dir);
                    sink.add_local_id(entry, AttrKey::MediaDir, dir);
                }
                sink.set_string(entry, AttrKey::MediaFile, file);
            }
        }
    }
}

/// Whether `file` is exactly `<name>-<evr>.<arch>.rpm`.
pub fn is_derived_file_name(file: &str, solvable: &Solvable, pool: &Pool) -> bool {
    file.strip_prefix(pool.str(solvable.name))
        .and_then(|rest| rest.strip_prefix('-'))
        .and_then(|rest| rest.strip_prefix(pool.str(solvable.evr)))
        .and_then(|rest| rest.strip_prefix('.'))
        .and_then(|rest| rest.strip_prefix(pool.str(solvable.arch)))
        == Some(".rpm")
}

/// Rebuild the media file name stored for `entry`.
pub fn media_file_name(
    store: &AttrStore,
    pool: &Pool,
    solvable: &Solvable,
    entry: usize,
) -> Option<String> {
    match store.get(entry, AttrKey::MediaFile)? {
        AttrValue::Void => Some(format!(
            "{}-{}.{}.rpm",
            pool.str(solvable.name),
            pool.str(solvable.evr),
            pool.str(solvable.arch)
        )),
        AttrValue::Str(file) => Some(file.clone()),
        _ => None,
    }
}

/// Identity named by a `=Src` body: `name version release arch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRef<'a> {
    pub name: Id,
    pub evr: Id,
    pub arch: Id,
    /// The raw fields, for storing an unresolved reference verbatim.
    pub fields: [&'a str; 4],
}

impl<'a> SourceRef<'a> {
    /// Decode a source body; `None` unless there are exactly four fields.
    pub fn parse(body: &'a str, pool: &mut Pool, scratch: &mut String) -> Option<SourceRef<'a>> {
        let fields = Fields::<5>::split(body);
        if fields.len() != 4 {
            return None;
        }
        let fields = [fields[0], fields[1], fields[2], fields[3]];
        let name = pool.intern(fields[0]);
        let evr = crate::dep::make_evr(pool, crate::dep::join(scratch, &[fields[1], "-", fields[2]]));
        let arch = pool.intern(fields[3]);
        Some(SourceRef {
            name,
            evr,
            arch,
            fields,
        })
    }

    /// The marker key when this is the solvable's own source package.
    ///
    /// A source package with the same name and evr, built for `src` or
    /// `nosrc`, is fully implied by the binary package's identity.
    pub fn implied_key(&self, solvable: &Solvable) -> Option<AttrKey> {
        if solvable.name != self.name || solvable.evr != self.evr {
            return None;
        }
        match self.arch {
            Id::ARCH_SRC => Some(AttrKey::Source),
            Id::ARCH_NOSRC => Some(AttrKey::NoSource),
            _ => None,
        }
    }

    /// Store the reference verbatim as `name`, `version-release`, `arch`.
    pub fn emit_verbatim(&self, sink: &mut dyn AttributeSink, entry: usize, scratch: &mut String) {
        let [name, version, release, arch] = self.fields;
        let parts = [
            name,
            crate::dep::join(scratch, &[version, "-", release]),
            arch,
        ];
        for part in parts {
            let id = sink.local_id(part);
            sink.add_local_id(entry, AttrKey::Source, id);
        }
    }
}

/// Parse leading decimal digits the way C `atoi` does, saturating at `u32::MAX`.
pub fn atoi(text: &str) -> u32 {
    u32::try_from(atoi_u64(text)).unwrap_or(u32::MAX)
}

/// Parse leading decimal digits into a `u64`, saturating on overflow.
pub fn atoi_u64(text: &str) -> u64 {
    let text = text.trim_start();
    let text = text.strip_prefix('+').unwrap_or(text);
    text.bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u64, |acc, b| {
            acc.saturating_mul(10).saturating_add(u64::from(b - b'0'))
        })
}
