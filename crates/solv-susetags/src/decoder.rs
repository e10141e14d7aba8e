//! The susetags decoder.
//!
//! A susetags stream holds one or more blocks of package records separated by
//! `=Ver` lines. The first block creates solvables; later blocks (typically
//! translated descriptions) re-locate solvables created earlier by their
//! `(name, evr, arch)` identity and add attributes to them.
//!
//! Later blocks list packages in roughly the same order as the first one, so
//! the lookup starts at the position of the previous match and wraps around.
//! This keeps re-matching close to O(1) per record.

use std::io::BufRead;

use serde::{Deserialize, Serialize};
use solv_core::{
    add_dep, fix_legacy, AttrKey, AttrStore, AttributeSink, DepMarker, Id, Pool, RelOp,
    Repository, Solvable,
};

use crate::config::{DecodeOptions, DEFAULT_PATTERN_NAMESPACE};
use crate::dep::{self, DepError};
use crate::error::{Result, SusetagsError};
use crate::line::LineAssembler;
use crate::location::{self, Location, SourceRef};
use crate::split::Fields;
use crate::tag::{DepList, Tag};

/// Phase from which `=Pkg`/`=Pat` cross-reference instead of create.
const CROSS_REFERENCE_PHASE: u32 = 2;

/// Growth step of the deferred-sources table.
const DEFERRED_GROW_STEP: usize = 256;

/// Counters describing one decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeStats {
    /// Logical lines seen.
    pub lines: usize,
    /// Solvables appended to the repository.
    pub solvables_created: usize,
    /// Records matched to an existing solvable.
    pub cross_referenced: usize,
    /// Records for which no existing solvable matched.
    pub cross_reference_misses: usize,
    /// Dependency or attribute lines dropped for lack of a solvable.
    pub dropped_lines: usize,
    /// Source references resolved after the whole stream was read.
    pub deferred_sources: usize,
}

/// Result of [`decode_with_options`].
#[derive(Debug)]
pub struct Decoded {
    pub stats: DecodeStats,
    /// Decoded attributes, when enabled.
    pub attrs: Option<AttrStore>,
}

/// Decode a susetags stream into `repo`.
///
/// Created solvables get `vendor`. Descriptive tags are written to `attrs`
/// when given and skipped otherwise. On error the repository keeps whatever
/// was created before the offending line.
pub fn decode<'a, R: BufRead>(
    pool: &'a mut Pool,
    repo: &'a mut Repository,
    reader: R,
    vendor: Id,
    attrs: Option<&'a mut dyn AttributeSink>,
) -> Result<DecodeStats> {
    Decoder::new(pool, repo, vendor, DEFAULT_PATTERN_NAMESPACE, attrs).run(reader)
}

/// Decode a susetags stream according to `options`.
pub fn decode_with_options<R: BufRead>(
    pool: &mut Pool,
    repo: &mut Repository,
    reader: R,
    options: &DecodeOptions,
) -> Result<Decoded> {
    let vendor = match &options.vendor {
        Some(vendor) => pool.intern(vendor),
        None => Id::NULL,
    };
    let mut store = options.with_attributes.then(AttrStore::new);
    let sink = store.as_mut().map(|s| s as &mut dyn AttributeSink);
    let stats = Decoder::new(pool, repo, vendor, &options.pattern_namespace, sink).run(reader)?;
    Ok(Decoded {
        stats,
        attrs: store,
    })
}

/// A source reference waiting for the whole repository.
#[derive(Debug)]
struct DeferredSource {
    body: String,
    lineno: usize,
}

/// Per-decode state.
struct Decoder<'a> {
    pool: &'a mut Pool,
    repo: &'a mut Repository,
    attrs: Option<&'a mut dyn AttributeSink>,
    vendor: Id,
    pattern_namespace: &'a str,
    /// The current record is a pattern.
    is_pattern: bool,
    scratch: String,
    /// Indexed by repository-relative entry.
    deferred: Vec<Option<DeferredSource>>,
    phase: u32,
    /// Absolute index of the solvable receiving tags.
    active: Option<usize>,
    /// Absolute index of the last created solvable, until finalized.
    pending: Option<usize>,
    /// Relative index where the last record was created or matched.
    last_found_pack: usize,
    /// Relative index where the last deferred source matched.
    last_found_source: usize,
    stats: DecodeStats,
}

impl<'a> Decoder<'a> {
    fn new(
        pool: &'a mut Pool,
        repo: &'a mut Repository,
        vendor: Id,
        pattern_namespace: &'a str,
        attrs: Option<&'a mut dyn AttributeSink>,
    ) -> Self {
        Decoder {
            pool,
            repo,
            attrs,
            vendor,
            pattern_namespace,
            is_pattern: false,
            scratch: String::with_capacity(256),
            deferred: Vec::new(),
            phase: 0,
            active: None,
            pending: None,
            last_found_pack: 0,
            last_found_source: 0,
            stats: DecodeStats::default(),
        }
    }

    fn run<R: BufRead>(mut self, reader: R) -> Result<DecodeStats> {
        let mut lines = LineAssembler::new(reader);
        while let Some(line) = lines.next_line()? {
            self.stats.lines += 1;
            self.process(&line.text, line.lineno)?;
        }
        self.finish()?;
        tracing::debug!(
            repo = self.repo.name(),
            physical_lines = lines.physical_lines(),
            created = self.stats.solvables_created,
            cross_referenced = self.stats.cross_referenced,
            misses = self.stats.cross_reference_misses,
            dropped = self.stats.dropped_lines,
            "decoded susetags stream"
        );
        Ok(self.stats)
    }

    fn process(&mut self, line: &str, lineno: usize) -> Result<()> {
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }
        let Some((tag, raw)) = Tag::parse_line(line) else {
            return Ok(());
        };

        if tag == Tag::Ver {
            self.advance_phase();
            return Ok(());
        }
        if tag.is_record_start() {
            return if self.phase < CROSS_REFERENCE_PHASE {
                self.create(tag, raw, line, lineno)
            } else {
                self.locate(tag, raw, line, lineno)
            };
        }

        let Some(index) = self.active else {
            tracing::warn!(lineno, line, "no solvable for line, dropped");
            self.stats.dropped_lines += 1;
            return Ok(());
        };

        if let Some(list) = tag.dep_list() {
            return self.add_dependency(tag, list, index, raw, line, lineno);
        }
        if self.attrs.is_some() {
            self.add_attribute(tag, index, raw, line, lineno)?;
        }
        Ok(())
    }

    /// Handle `=Ver`.
    ///
    /// A leading `=Ver` only moves to phase 1; once solvables exist, `=Ver`
    /// starts cross-referencing.
    fn advance_phase(&mut self) {
        self.phase += 1;
        if self.stats.solvables_created > 0 {
            self.phase = self.phase.max(CROSS_REFERENCE_PHASE);
        }
        if self.phase >= CROSS_REFERENCE_PHASE {
            self.finalize_pending();
            self.active = None;
        }
        self.last_found_pack = 0;
    }

    fn kind(&self) -> Option<&'a str> {
        self.is_pattern.then_some(self.pattern_namespace)
    }

    /// Intern the identity fields of a `=Pkg`/`=Pat` body.
    ///
    /// With `create == false`, a name or arch unknown to the pool yields
    /// `None` for that part.
    fn identity(&mut self, fields: &Fields<'_, 5>, create: bool) -> (Option<Id>, Id, Option<Id>) {
        let name = match self.kind() {
            Some(kind) => dep::join(&mut self.scratch, &[kind, ":", fields[0]]),
            None => dep::join(&mut self.scratch, &[fields[0]]),
        };
        let name = if create {
            Some(self.pool.intern(name))
        } else {
            self.pool.lookup(name)
        };
        let evr = dep::make_evr(
            self.pool,
            dep::join(&mut self.scratch, &[fields[1], "-", fields[2]]),
        );
        let arch = if create {
            Some(self.pool.intern(fields[3]))
        } else {
            self.pool.lookup(fields[3])
        };
        (name, evr, arch)
    }

    /// Create a solvable for `=Pkg`/`=Pat` in the first block.
    fn create(&mut self, tag: Tag, raw: &str, line: &str, lineno: usize) -> Result<()> {
        self.finalize_pending();
        self.is_pattern = tag == Tag::Pat;

        let fields = Fields::<5>::split(raw);
        if fields.len() != 4 {
            return Err(bad_package(line, lineno));
        }
        let (Some(name), evr, Some(arch)) = self.identity(&fields, true) else {
            return Err(bad_package(line, lineno));
        };

        let index = self.repo.push(Solvable {
            name,
            evr,
            arch,
            vendor: self.vendor,
            ..Default::default()
        });
        self.active = Some(index);
        self.pending = Some(index);
        self.last_found_pack = index - self.repo.start();
        self.stats.solvables_created += 1;
        Ok(())
    }

    /// Re-locate an existing solvable for `=Pkg`/`=Pat` in a later block.
    fn locate(&mut self, tag: Tag, raw: &str, line: &str, lineno: usize) -> Result<()> {
        self.active = None;
        self.is_pattern = tag == Tag::Pat;

        let fields = Fields::<5>::split(raw);
        if fields.len() != 4 {
            return Err(bad_package(line, lineno));
        }
        let (name, evr, arch) = self.identity(&fields, false);
        let found = match (name, arch) {
            (Some(name), Some(arch)) => self.find(name, evr, arch, self.last_found_pack),
            _ => None,
        };
        match found {
            Some(rel) => {
                self.last_found_pack = rel;
                self.active = Some(self.repo.start() + rel);
                self.stats.cross_referenced += 1;
            }
            None => {
                tracing::debug!(lineno, line, "no solvable matches record");
                self.stats.cross_reference_misses += 1;
            }
        }
        Ok(())
    }

    /// Find `(name, evr, arch)`, scanning circularly from relative index `hint`.
    ///
    /// Returns the relative index of the first match.
    fn find(&self, name: Id, evr: Id, arch: Id, hint: usize) -> Option<usize> {
        let len = self.repo.len();
        let start = self.repo.start();
        (0..len).map(|n| (hint + n) % len).find(|rel| {
            self.repo
                .solvable(start + rel)
                .is_some_and(|s| s.matches(name, evr, arch))
        })
    }

    /// Add the self-provide and normalize legacy supplements of the last
    /// created solvable.
    fn finalize_pending(&mut self) {
        let Some(index) = self.pending.take() else {
            return;
        };
        let Some(s) = self.repo.solvable_mut(index) else {
            return;
        };
        if !s.is_source() {
            let own = self.pool.intern_rel(s.name, s.evr, RelOp::Eq);
            add_dep(&mut s.provides, own, DepMarker::None);
        }
        fix_legacy(self.pool, &s.provides, &mut s.supplements);
    }

    fn add_dependency(
        &mut self,
        tag: Tag,
        list: DepList,
        index: usize,
        raw: &str,
        line: &str,
        lineno: usize,
    ) -> Result<()> {
        let kind = self.kind();
        let (marker, kind) = match tag {
            Tag::Req => (DepMarker::Requires, kind),
            Tag::Prq if kind.is_some() => (DepMarker::None, None),
            Tag::Prq => (DepMarker::PreRequires, None),
            Tag::Prc | Tag::Psg => (DepMarker::None, None),
            _ => (DepMarker::None, kind),
        };
        let id = dep::parse_dep(self.pool, &mut self.scratch, raw, kind).map_err(|e| match e {
            DepError::FieldCount(fields) => {
                tracing::debug!(lineno, fields, "dependency needs one or three fields");
                SusetagsError::BadDependency {
                    lineno,
                    line: line.to_string(),
                }
            }
            DepError::UnknownRelation(op) => SusetagsError::UnknownRelation {
                lineno,
                op,
                line: line.to_string(),
            },
        })?;
        if let Some(s) = self.repo.solvable_mut(index) {
            add_dep(dep_list_mut(s, list), id, marker);
        }
        Ok(())
    }

    fn add_attribute(
        &mut self,
        tag: Tag,
        index: usize,
        raw: &str,
        line: &str,
        lineno: usize,
    ) -> Result<()> {
        let entry = index - self.repo.start();
        let body = raw.strip_prefix(' ').unwrap_or(raw);

        match tag {
            Tag::Loc => return self.add_location(index, body, line, lineno),
            Tag::Src => return self.add_source(index, body, line, lineno, true),
            _ => {}
        }

        let Some(attrs) = self.attrs.as_deref_mut() else {
            return Ok(());
        };
        if let Some(key) = tag.local_id_key() {
            let id = attrs.local_id(body);
            attrs.add_local_id(entry, key, id);
        } else if let Some(key) = tag.blob_key() {
            self.scratch.clear();
            self.scratch.push_str(body);
            self.scratch.push('\0');
            attrs.set_blob(entry, key, self.scratch.as_bytes());
        } else {
            match tag {
                Tag::Sum => attrs.set_string(entry, AttrKey::Summary, body),
                Tag::Siz => {
                    let fields = Fields::<3>::split(body);
                    if fields.len() == 2 {
                        attrs.set_int(entry, AttrKey::DownloadSize, kilobytes(fields[0]));
                        attrs.set_int(entry, AttrKey::InstallSize, kilobytes(fields[1]));
                    }
                }
                Tag::Tim => {
                    let time = location::atoi(body);
                    if time != 0 {
                        attrs.set_int(entry, AttrKey::Time, time);
                    }
                }
                // Shared data references are not decoded.
                Tag::Shr => {}
                _ => {}
            }
        }
        Ok(())
    }

    fn add_location(&mut self, index: usize, body: &str, line: &str, lineno: usize) -> Result<()> {
        let entry = index - self.repo.start();
        let Some(s) = self.repo.solvable(index) else {
            return Ok(());
        };
        let location = Location::parse(body, s, self.pool).ok_or_else(|| {
            SusetagsError::BadLocation {
                lineno,
                line: line.to_string(),
            }
        })?;
        if let Some(attrs) = self.attrs.as_deref_mut() {
            location.emit(attrs, entry);
        }
        Ok(())
    }

    /// Handle a `=Src` body for the solvable at `index`.
    ///
    /// In the first pass anything but the solvable's own source package is
    /// deferred, because the referenced source solvable may appear later in
    /// the stream.
    fn add_source(
        &mut self,
        index: usize,
        body: &str,
        line: &str,
        lineno: usize,
        first: bool,
    ) -> Result<()> {
        let entry = index - self.repo.start();
        let Some(source) = SourceRef::parse(body, self.pool, &mut self.scratch) else {
            return Err(SusetagsError::BadSource {
                lineno,
                line: line.to_string(),
            });
        };
        let Some(s) = self.repo.solvable(index) else {
            return Ok(());
        };

        if let Some(key) = source.implied_key(s) {
            if let Some(attrs) = self.attrs.as_deref_mut() {
                attrs.set_void(entry, key);
            }
            return Ok(());
        }

        if first {
            if entry >= self.deferred.len() {
                self.deferred.resize_with(entry + DEFERRED_GROW_STEP, || None);
            }
            self.deferred[entry] = Some(DeferredSource {
                body: body.to_string(),
                lineno,
            });
            return Ok(());
        }

        let found = self.find(source.name, source.evr, source.arch, self.last_found_source);
        let Some(attrs) = self.attrs.as_deref_mut() else {
            return Ok(());
        };
        match found {
            Some(rel) => {
                self.last_found_source = rel;
                attrs.add_int(entry, AttrKey::SourceId, rel as u32);
            }
            None => source.emit_verbatim(attrs, entry, &mut self.scratch),
        }
        Ok(())
    }

    /// Finalize the last solvable and resolve deferred source references.
    fn finish(&mut self) -> Result<()> {
        self.finalize_pending();

        let deferred = std::mem::take(&mut self.deferred);
        let start = self.repo.start();
        for (entry, source) in deferred.into_iter().enumerate() {
            let Some(source) = source else {
                continue;
            };
            tracing::trace!(entry, body = source.body, "resolving deferred source");
            self.add_source(start + entry, &source.body, &source.body, source.lineno, false)?;
            self.stats.deferred_sources += 1;
        }
        Ok(())
    }
}

fn bad_package(line: &str, lineno: usize) -> SusetagsError {
    SusetagsError::BadPackage {
        lineno,
        line: line.to_string(),
    }
}

/// Round a byte count up to whole kilobytes.
fn kilobytes(text: &str) -> u32 {
    let kb = location::atoi_u64(text).saturating_add(1023) / 1024;
    u32::try_from(kb).unwrap_or(u32::MAX)
}

fn dep_list_mut(s: &mut Solvable, list: DepList) -> &mut Vec<Id> {
    match list {
        DepList::Provides => &mut s.provides,
        DepList::Requires => &mut s.requires,
        DepList::Conflicts => &mut s.conflicts,
        DepList::Obsoletes => &mut s.obsoletes,
        DepList::Recommends => &mut s.recommends,
        DepList::Supplements => &mut s.supplements,
        DepList::Enhances => &mut s.enhances,
        DepList::Suggests => &mut s.suggests,
        DepList::Freshens => &mut s.freshens,
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufReader, Write};

    use solv_core::AttrValue;

    use super::*;
    use crate::location::media_file_name;

    struct Outcome {
        pool: Pool,
        repo: Repository,
        store: AttrStore,
        stats: DecodeStats,
    }

    fn run(input: &str) -> Outcome {
        let mut pool = Pool::new();
        let mut repo = Repository::new("test");
        let mut store = AttrStore::new();
        let stats = decode(
            &mut pool,
            &mut repo,
            input.as_bytes(),
            Id::NULL,
            Some(&mut store),
        )
        .unwrap();
        Outcome {
            pool,
            repo,
            store,
            stats,
        }
    }

    fn run_err(input: &str) -> SusetagsError {
        let mut pool = Pool::new();
        let mut repo = Repository::new("test");
        let mut store = AttrStore::new();
        decode(
            &mut pool,
            &mut repo,
            input.as_bytes(),
            Id::NULL,
            Some(&mut store),
        )
        .unwrap_err()
    }

    fn deps(pool: &Pool, ids: &[Id]) -> Vec<String> {
        ids.iter().map(|id| pool.dep_to_string(*id)).collect()
    }

    fn solvable(d: &Outcome, index: usize) -> &Solvable {
        d.repo.solvable(index).unwrap()
    }

    const CROSS_REFERENCED: &str =
        "=Pkg: foo 1.0 1 x86_64\n=Req: bar\n=Ver: \n=Pkg: foo 1.0 1 x86_64\n=Sum: A package\n";

    #[test]
    fn second_block_adds_to_existing_solvable() {
        let d = run(CROSS_REFERENCED);
        assert_eq!(d.repo.len(), 1);
        let s = solvable(&d, 0);
        assert_eq!(d.pool.str(s.name), "foo");
        assert_eq!(d.pool.str(s.evr), "1.0-1");
        assert_eq!(d.pool.str(s.arch), "x86_64");
        assert_eq!(deps(&d.pool, &s.requires), vec!["bar"]);
        assert_eq!(deps(&d.pool, &s.provides), vec!["foo = 1.0-1"]);
        assert_eq!(
            d.store.get(0, AttrKey::Summary),
            Some(&AttrValue::Str("A package".into()))
        );
        assert_eq!(d.stats.solvables_created, 1);
        assert_eq!(d.stats.cross_referenced, 1);
        assert_eq!(d.stats.lines, 5);
    }

    #[test]
    fn attributes_disabled() {
        let mut pool = Pool::new();
        let mut repo = Repository::new("test");
        let stats = decode(&mut pool, &mut repo, CROSS_REFERENCED.as_bytes(), Id::NULL, None)
            .unwrap();
        assert_eq!(repo.len(), 1);
        assert_eq!(stats.cross_referenced, 1);
        let s = repo.solvable(0).unwrap();
        assert_eq!(deps(&pool, &s.requires), vec!["bar"]);
        assert_eq!(deps(&pool, &s.provides), vec!["foo = 1.0-1"]);
    }

    #[test]
    fn records_are_created_in_order() {
        let d = run(
            "=Ver: 2.0\n\
             =Pkg: a 1 1 noarch\n\
             # comment\n\
             =Pkg: b 2 1 noarch\n\
             \n\
             =Pkg: c 3 1 noarch\n",
        );
        let names: Vec<&str> = d.repo.iter().map(|(_, s)| d.pool.str(s.name)).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(d.stats.solvables_created, 3);
        for (_, s) in d.repo.iter() {
            assert_eq!(s.provides.len(), 1);
        }
    }

    #[test]
    fn malformed_dependency_is_fatal() {
        let input = "=Pkg: foo 1 1 x86_64\n=Req: bar >\n=Pkg: next 1 1 x86_64\n";
        let err = run_err(input);
        assert!(matches!(err, SusetagsError::BadDependency { lineno: 2, .. }));
        assert_eq!(err.lineno(), Some(2));

        let mut pool = Pool::new();
        let mut repo = Repository::new("test");
        assert!(decode(&mut pool, &mut repo, input.as_bytes(), Id::NULL, None).is_err());
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn unknown_relation_is_fatal() {
        let err = run_err("=Pkg: foo 1 1 x86_64\n=Req: bar ~ 1\n");
        match err {
            SusetagsError::UnknownRelation { op, lineno, .. } => {
                assert_eq!(op, "~");
                assert_eq!(lineno, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_package_is_fatal() {
        let err = run_err("=Pkg: foo 1 x86_64\n");
        assert!(matches!(err, SusetagsError::BadPackage { lineno: 1, .. }));
    }

    #[test]
    fn repository_keeps_records_before_an_error() {
        let mut pool = Pool::new();
        let mut repo = Repository::new("test");
        let input = "=Pkg: a 1 1 x\n=Pkg: b 1 1 x\n=Req: c <\n";
        assert!(decode(&mut pool, &mut repo, input.as_bytes(), Id::NULL, None).is_err());
        assert_eq!(repo.len(), 2);
    }

    #[test]
    fn prerequires_go_behind_the_marker() {
        let d = run("=Pkg: a 1 1 x\n=Req: b\n=Prq: c\n=Req: d\n");
        let s = solvable(&d, 0);
        assert_eq!(deps(&d.pool, s.plain_requires()), vec!["b", "d"]);
        assert_eq!(deps(&d.pool, s.prerequires()), vec!["c"]);
    }

    #[test]
    fn patterns_use_the_namespace() {
        let d = run(
            "=Pat: base 1 1 noarch\n\
             =Req: bash\n\
             =Prq: glibc\n\
             =Prc: foo\n\
             =Rec: x\n\
             =Psg: y\n\
             =Pkg: bash 5 1 x86_64\n\
             =Req: glibc\n",
        );
        let pattern = solvable(&d, 0);
        assert_eq!(d.pool.str(pattern.name), "pattern:base");
        assert_eq!(deps(&d.pool, &pattern.requires), vec!["pattern:bash", "glibc"]);
        assert!(pattern.prerequires().is_empty());
        assert_eq!(deps(&d.pool, &pattern.recommends), vec!["foo", "pattern:x"]);
        assert_eq!(deps(&d.pool, &pattern.suggests), vec!["y"]);
        assert_eq!(deps(&d.pool, &pattern.provides), vec!["pattern:base = 1-1"]);

        let package = solvable(&d, 1);
        assert_eq!(d.pool.str(package.name), "bash");
        assert_eq!(deps(&d.pool, &package.requires), vec!["glibc"]);
    }

    #[test]
    fn patterns_are_cross_referenced_by_namespaced_name() {
        let d = run(
            "=Pat: base 1 1 noarch\n\
             =Pkg: base 1 1 noarch\n\
             =Ver: 2\n\
             =Pat: base 1 1 noarch\n=Sum: Base pattern\n\
             =Pkg: base 1 1 noarch\n=Sum: Base package\n",
        );
        assert_eq!(d.repo.len(), 2);
        assert_eq!(d.stats.cross_referenced, 2);
        assert_eq!(
            d.store.get(0, AttrKey::Summary),
            Some(&AttrValue::Str("Base pattern".into()))
        );
        assert_eq!(
            d.store.get(1, AttrKey::Summary),
            Some(&AttrValue::Str("Base package".into()))
        );
    }

    #[test]
    fn unmatched_pattern_is_not_interned() {
        let d = run(
            "=Pkg: minimal 1 1 noarch\n\
             =Ver: 2\n\
             =Pat: minimal 1 1 noarch\n=Sum: lost\n",
        );
        assert_eq!(d.repo.len(), 1);
        assert_eq!(d.stats.cross_reference_misses, 1);
        assert_eq!(d.stats.dropped_lines, 1);
        assert!(d.pool.lookup("pattern:minimal").is_none());
        assert!(d.store.get(0, AttrKey::Summary).is_none());
    }

    #[test]
    fn modalias_supplement_with_non_ascii_tail() {
        let mut pool = Pool::new();
        let mut repo = Repository::new("test");
        let input: &[u8] = b"=Pkg: a 1 1 x\n\
                             =Sup: modalias(pci:caf\xc3\xa9\n\
                             =Pkg: b 1 1 x\n\
                             =Sup: modalias(x\xff\n";
        decode(&mut pool, &mut repo, input, Id::NULL, None).unwrap();
        let supplements: Vec<_> = repo
            .iter()
            .map(|(_, s)| deps(&pool, &s.supplements))
            .collect();
        assert_eq!(
            supplements,
            vec![
                vec!["namespace:modalias(pci:café)".to_string()],
                vec!["namespace:modalias(x\u{fffd})".to_string()],
            ]
        );
    }

    #[test]
    fn pattern_namespace_is_configurable() {
        let mut pool = Pool::new();
        let mut repo = Repository::new("test");
        let options = DecodeOptions {
            pattern_namespace: "product".to_string(),
            ..DecodeOptions::default()
        };
        decode_with_options(&mut pool, &mut repo, "=Pat: sles 15 1 x\n".as_bytes(), &options)
            .unwrap();
        assert_eq!(pool.str(repo.solvable(0).unwrap().name), "product:sles");
    }

    #[test]
    fn dependency_lists_are_routed_by_tag() {
        let d = run(
            "=Pkg: a 1 1 x\n\
             =Prv: p\n=Obs: o\n=Con: c\n=Rec: r\n=Sup: s\n=Enh: e\n=Sug: g\n=Fre: f\n",
        );
        let s = solvable(&d, 0);
        assert_eq!(deps(&d.pool, &s.provides), vec!["p", "a = 1-1"]);
        assert_eq!(deps(&d.pool, &s.obsoletes), vec!["o"]);
        assert_eq!(deps(&d.pool, &s.conflicts), vec!["c"]);
        assert_eq!(deps(&d.pool, &s.recommends), vec!["r"]);
        assert_eq!(deps(&d.pool, &s.supplements), vec!["s"]);
        assert_eq!(deps(&d.pool, &s.enhances), vec!["e"]);
        assert_eq!(deps(&d.pool, &s.suggests), vec!["g"]);
        assert_eq!(deps(&d.pool, &s.freshens), vec!["f"]);
    }

    #[test]
    fn legacy_provides_become_supplements() {
        let d = run("=Pkg: kde-de 1 1 noarch\n=Prv: locale(kdelibs:de)\n=Pkg: b 1 1 x\n");
        let s = solvable(&d, 0);
        assert_eq!(deps(&d.pool, &s.supplements), vec!["kdelibs & language:de"]);
    }

    #[test]
    fn source_packages_have_no_self_provide() {
        let d = run("=Pkg: foo 1 1 src\n=Pkg: bar 1 1 nosrc\n");
        assert!(solvable(&d, 0).provides.is_empty());
        assert!(solvable(&d, 1).provides.is_empty());
    }

    #[test]
    fn epoch_zero_is_dropped() {
        let d = run("=Pkg: foo 0:1 1 x\n=Req: bar >= 0:2\n");
        let s = solvable(&d, 0);
        assert_eq!(d.pool.str(s.evr), "1-1");
        assert_eq!(deps(&d.pool, &s.requires), vec!["bar >= 2"]);
    }

    #[test]
    fn unmatched_record_drops_its_lines() {
        let d = run(
            "=Pkg: a 1 1 x\n\
             =Ver: 2\n\
             =Pkg: zzz 1 1 x\n\
             =Sum: lost\n\
             =Req: lost\n",
        );
        assert_eq!(d.stats.cross_reference_misses, 1);
        assert_eq!(d.stats.dropped_lines, 2);
        assert!(d.store.get(0, AttrKey::Summary).is_none());
        assert!(solvable(&d, 0).requires.is_empty());
        assert!(d.pool.lookup("zzz").is_none());
    }

    #[test]
    fn lines_before_any_record_are_dropped() {
        let d = run("=Sum: orphan\n=Pkg: a 1 1 x\n");
        assert_eq!(d.stats.dropped_lines, 1);
        assert!(d.store.get(0, AttrKey::Summary).is_none());
    }

    #[test]
    fn cross_reference_wraps_around() {
        let d = run(
            "=Pkg: a 1 1 x\n=Pkg: b 1 1 x\n=Pkg: c 1 1 x\n\
             =Ver: 2\n\
             =Pkg: c 1 1 x\n=Sum: C\n\
             =Pkg: a 1 1 x\n=Sum: A\n\
             =Pkg: b 1 1 x\n=Sum: B\n",
        );
        for (entry, text) in ["A", "B", "C"].iter().enumerate() {
            assert_eq!(
                d.store.get(entry, AttrKey::Summary),
                Some(&AttrValue::Str(text.to_string()))
            );
        }
        assert_eq!(d.stats.cross_referenced, 3);
    }

    #[test]
    fn list_and_cumulative_blocks() {
        let d = run(
            "=Pkg: a 1 1 x\n\
             +Req:\nb\nc >= 2\n-Req:\n\
             +Des:\nLine one\nLine two\n-Des:\n",
        );
        let s = solvable(&d, 0);
        assert_eq!(deps(&d.pool, &s.requires), vec!["b", "c >= 2"]);
        assert_eq!(
            d.store.get(0, AttrKey::Description),
            Some(&AttrValue::Blob(b"Line one\nLine two\0".to_vec()))
        );
    }

    #[test]
    fn sizes_and_time() {
        let d = run(
            "=Pkg: a 1 1 x\n=Siz: 1025 2048\n=Tim: 0\n\
             =Pkg: b 1 1 x\n=Siz: 0 1\n=Tim: 1700000000\n\
             =Pkg: c 1 1 x\n=Siz: 12\n",
        );
        assert_eq!(d.store.get(0, AttrKey::DownloadSize), Some(&AttrValue::Int(2)));
        assert_eq!(d.store.get(0, AttrKey::InstallSize), Some(&AttrValue::Int(2)));
        assert!(d.store.get(0, AttrKey::Time).is_none());
        assert_eq!(d.store.get(1, AttrKey::DownloadSize), Some(&AttrValue::Int(0)));
        assert_eq!(d.store.get(1, AttrKey::InstallSize), Some(&AttrValue::Int(1)));
        assert_eq!(d.store.get(1, AttrKey::Time), Some(&AttrValue::Int(1_700_000_000)));
        assert!(d.store.get(2, AttrKey::DownloadSize).is_none());
    }

    #[test]
    fn local_id_lists() {
        let d = run("=Pkg: a 1 1 x\n=Grp: System/Base\n=Kwd: shell\n=Kwd: posix\n=Lic: GPL-3.0\n");
        assert_eq!(d.store.local_strs(0, AttrKey::Group), vec!["System/Base"]);
        assert_eq!(d.store.local_strs(0, AttrKey::Keywords), vec!["shell", "posix"]);
        assert_eq!(d.store.local_strs(0, AttrKey::License), vec!["GPL-3.0"]);
    }

    #[test]
    fn share_tag_is_ignored() {
        let d = run("=Pkg: a 1 1 x\n=Shr: b 1 1 x\n");
        assert!(d.store.entry(0).is_empty());
        assert_eq!(d.stats.dropped_lines, 0);
    }

    #[test]
    fn derived_location_is_a_void_marker() {
        let d = run("=Pkg: bash 5.1 3 x86_64\n=Loc: 1 bash-5.1-3.x86_64.rpm\n");
        assert_eq!(d.store.get(0, AttrKey::MediaFile), Some(&AttrValue::Void));
        assert_eq!(d.store.get(0, AttrKey::MediaNr), Some(&AttrValue::Int(1)));
        assert_eq!(
            media_file_name(&d.store, &d.pool, solvable(&d, 0), 0).as_deref(),
            Some("bash-5.1-3.x86_64.rpm")
        );
    }

    #[test]
    fn malformed_location_is_fatal() {
        let err = run_err("=Pkg: bash 5.1 3 x86_64\n=Loc: 1\n");
        assert!(matches!(err, SusetagsError::BadLocation { lineno: 2, .. }));
    }

    #[test]
    fn source_references() {
        let d = run(
            "=Pkg: foo 1 1 x86_64\n=Src: foo-src 1 1 src\n\
             =Pkg: foo-src 1 1 src\n\
             =Pkg: bar 2 1 x86_64\n=Src: bar 2 1 src\n\
             =Pkg: baz 1 1 x86_64\n=Src: gone 1 1 src\n",
        );
        assert_eq!(d.store.get(0, AttrKey::SourceId), Some(&AttrValue::IntList(vec![1])));
        assert_eq!(d.store.get(2, AttrKey::Source), Some(&AttrValue::Void));
        assert_eq!(d.store.local_strs(3, AttrKey::Source), vec!["gone", "1-1", "src"]);
        assert_eq!(d.stats.deferred_sources, 2);
    }

    #[test]
    fn malformed_source_is_fatal_only_with_attributes() {
        let input = "=Pkg: a 1 1 x\n=Src: a 1\n";
        let err = run_err(input);
        assert!(matches!(err, SusetagsError::BadSource { lineno: 2, .. }));

        let mut pool = Pool::new();
        let mut repo = Repository::new("test");
        assert!(decode(&mut pool, &mut repo, input.as_bytes(), Id::NULL, None).is_ok());
    }

    #[test]
    fn entries_are_relative_to_the_repository_start() {
        let mut pool = Pool::new();
        let mut repo = Repository::with_start("updates", 10);
        let mut store = AttrStore::new();
        let input = "=Pkg: a 1 1 x\n=Src: b 1 1 src\n=Pkg: b 1 1 src\n=Sum: B\n";
        decode(&mut pool, &mut repo, input.as_bytes(), Id::NULL, Some(&mut store)).unwrap();
        assert_eq!(repo.end(), 12);
        assert_eq!(store.get(0, AttrKey::SourceId), Some(&AttrValue::IntList(vec![1])));
        assert_eq!(store.get(1, AttrKey::Summary), Some(&AttrValue::Str("B".into())));
    }

    #[test]
    fn redecoding_reuses_ids() {
        let input = "=Pkg: a 1 1 x\n=Req: b >= 2\n=Pkg: b 2 1 x\n";
        let mut pool = Pool::new();
        let mut first = Repository::new("first");
        decode(&mut pool, &mut first, input.as_bytes(), Id::NULL, None).unwrap();
        let (strings, relations) = (pool.string_count(), pool.relation_count());

        let mut second = Repository::new("second");
        decode(&mut pool, &mut second, input.as_bytes(), Id::NULL, None).unwrap();
        assert_eq!(pool.string_count(), strings);
        assert_eq!(pool.relation_count(), relations);
        let a: Vec<_> = first.iter().map(|(_, s)| s.clone()).collect();
        let b: Vec<_> = second.iter().map(|(_, s)| s.clone()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn options_set_vendor_and_attributes() {
        let mut pool = Pool::new();
        let mut repo = Repository::new("test");
        let options = DecodeOptions::default().with_vendor("openSUSE");
        let decoded =
            decode_with_options(&mut pool, &mut repo, CROSS_REFERENCED.as_bytes(), &options)
                .unwrap();
        assert_eq!(repo.solvable(0).unwrap().vendor, pool.lookup("openSUSE").unwrap());
        let store = decoded.attrs.unwrap();
        assert!(store.get(0, AttrKey::Summary).is_some());

        let mut repo = Repository::new("bare");
        let decoded = decode_with_options(
            &mut pool,
            &mut repo,
            CROSS_REFERENCED.as_bytes(),
            &DecodeOptions::default().without_attributes(),
        )
        .unwrap();
        assert!(decoded.attrs.is_none());
        assert!(repo.solvable(0).unwrap().vendor.is_null());
    }

    #[test]
    fn decode_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"=Ver: 2.0\n=Pkg: a 1 1 x\n=Sum: from disk").unwrap();
        let reader = BufReader::new(std::fs::File::open(file.path()).unwrap());

        let mut pool = Pool::new();
        let mut repo = Repository::new("disk");
        let decoded =
            decode_with_options(&mut pool, &mut repo, reader, &DecodeOptions::default()).unwrap();
        let store = decoded.attrs.unwrap();
        assert_eq!(
            store.get(0, AttrKey::Summary),
            Some(&AttrValue::Str("from disk".into()))
        );
    }

    #[test]
    fn stats_serialize() {
        let d = run(CROSS_REFERENCED);
        let json = serde_json::to_value(&d.stats).unwrap();
        assert_eq!(json["solvables_created"], 1);
        assert_eq!(json["cross_referenced"], 1);
        assert_eq!(json["dropped_lines"], 0);
    }
}
