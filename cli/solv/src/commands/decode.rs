//! `solv decode`: decode a susetags file and report its solvables.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use solv_core::{AttrKey, AttrStore, AttrValue, Id, Pool, Repository};
use solv_susetags::{media_file_name, DecodeOptions, DecodeStats};

use crate::digest::DigestReader;

/// Run `solv decode <file>`.
pub fn run(
    file: &Path,
    config: Option<&Path>,
    vendor: Option<&str>,
    no_attributes: bool,
    format: Option<&str>,
) -> Result<()> {
    let format = format.unwrap_or("human");
    if !matches!(format, "human" | "json") {
        bail!("unknown format '{format}' (expected human or json)");
    }

    let mut options = match config {
        Some(path) => DecodeOptions::load(path)
            .with_context(|| format!("loading options from {}", path.display()))?,
        None => DecodeOptions::default(),
    };
    if let Some(vendor) = vendor {
        options = options.with_vendor(vendor);
    }
    if no_attributes {
        options = options.without_attributes();
    }

    let report = decode_file(file, &options)?;
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print_human(&report),
    }
    Ok(())
}

/// Decoded repository contents, ready for display.
#[derive(Debug, Serialize)]
pub struct DecodeReport {
    pub repository: String,
    /// SHA-256 of the decoded input.
    pub sha256: String,
    pub stats: DecodeStats,
    pub solvables: Vec<SolvableReport>,
}

/// One solvable with its dependencies rendered as strings.
#[derive(Debug, Serialize)]
pub struct SolvableReport {
    pub name: String,
    pub evr: String,
    pub arch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    pub provides: Vec<String>,
    pub requires: Vec<String>,
    pub prerequires: Vec<String>,
    pub conflicts: Vec<String>,
    pub obsoletes: Vec<String>,
    pub recommends: Vec<String>,
    pub supplements: Vec<String>,
    pub enhances: Vec<String>,
    pub suggests: Vec<String>,
    pub freshens: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_file: Option<String>,
}

/// Decode `path` (or stdin for `-`) into a report.
pub fn decode_file(path: &Path, options: &DecodeOptions) -> Result<DecodeReport> {
    let (name, input): (String, Box<dyn Read>) = if path == Path::new("-") {
        ("stdin".to_string(), Box::new(io::stdin().lock()))
    } else {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "repo".to_string());
        (name, Box::new(file))
    };

    tracing::debug!(path = %path.display(), repo = %name, "decoding susetags");
    let mut pool = Pool::new();
    let mut repo = Repository::new(name);
    let mut reader = BufReader::new(DigestReader::new(input));
    let decoded = solv_susetags::decode_with_options(&mut pool, &mut repo, &mut reader, options)
        .with_context(|| format!("decoding {}", path.display()))?;
    let sha256 = reader.into_inner().finish();

    let mut report = build_report(&pool, &repo, decoded.stats, decoded.attrs.as_ref());
    report.sha256 = sha256;
    Ok(report)
}

fn build_report(
    pool: &Pool,
    repo: &Repository,
    stats: DecodeStats,
    attrs: Option<&AttrStore>,
) -> DecodeReport {
    let render = |ids: &[Id]| -> Vec<String> {
        ids.iter().map(|id| pool.dep_to_string(*id)).collect()
    };

    let solvables = repo
        .iter()
        .map(|(index, s)| {
            let entry = index - repo.start();
            SolvableReport {
                name: pool.str(s.name).to_string(),
                evr: pool.str(s.evr).to_string(),
                arch: pool.str(s.arch).to_string(),
                vendor: (!s.vendor.is_null()).then(|| pool.str(s.vendor).to_string()),
                provides: render(&s.provides),
                requires: render(s.plain_requires()),
                prerequires: render(s.prerequires()),
                conflicts: render(&s.conflicts),
                obsoletes: render(&s.obsoletes),
                recommends: render(&s.recommends),
                supplements: render(&s.supplements),
                enhances: render(&s.enhances),
                suggests: render(&s.suggests),
                freshens: render(&s.freshens),
                summary: attrs.and_then(|store| summary(store, entry)),
                media_file: attrs.and_then(|store| media_file_name(store, pool, s, entry)),
            }
        })
        .collect();

    DecodeReport {
        repository: repo.name().to_string(),
        sha256: String::new(),
        stats,
        solvables,
    }
}

fn summary(store: &AttrStore, entry: usize) -> Option<String> {
    match store.get(entry, AttrKey::Summary)? {
        AttrValue::Str(text) => Some(text.clone()),
        _ => None,
    }
}

fn print_human(report: &DecodeReport) {
    println!("Repository: {}", report.repository);
    println!("Checksum:   sha256:{}", report.sha256);
    println!();
    for s in &report.solvables {
        let deps = format!(
            "{} provides, {} requires, {} conflicts, {} obsoletes",
            s.provides.len(),
            s.requires.len() + s.prerequires.len(),
            s.conflicts.len(),
            s.obsoletes.len()
        );
        match &s.summary {
            Some(summary) => println!("  {}-{}.{}  ({deps})  {summary}", s.name, s.evr, s.arch),
            None => println!("  {}-{}.{}  ({deps})", s.name, s.evr, s.arch),
        }
    }

    let stats = &report.stats;
    println!();
    println!("--- Decode Stats ---");
    println!("  Lines:            {}", stats.lines);
    println!("  Solvables:        {}", stats.solvables_created);
    println!("  Cross-referenced: {}", stats.cross_referenced);
    println!("  Unmatched:        {}", stats.cross_reference_misses);
    println!("  Dropped lines:    {}", stats.dropped_lines);
    println!("  Deferred sources: {}", stats.deferred_sources);
}
