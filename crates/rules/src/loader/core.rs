//! Core [`RuleLoader`] struct: per-format parsing of a rule repository.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::model::{ArchetypeDefinition, FallbackDefinition, Format, RuleSet};
use crate::schema::{ArchetypeFile, FallbackFile, RuleKind};

use super::error::{LoadReport, LoadResult, LoadStatus, Result, RuleError};

/// File extensions recognized as rule files (compared case-insensitively).
pub const RULE_EXTENSIONS: &[&str] = &["json", "yml", "yaml"];

/// Filesystem-backed rule loader.
///
/// Stateless apart from the repository path: every call re-reads disk and
/// returns a fresh [`RuleSet`]. The loader never writes to the repository.
#[derive(Debug, Clone)]
pub struct RuleLoader {
    /// Root directory containing one sub-directory per format.
    repo: PathBuf,
}

impl RuleLoader {
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self { repo: repo.into() }
    }

    /// Get the repository root.
    pub fn repo(&self) -> &Path {
        &self.repo
    }

    /// List the formats present in the repository, sorted: every top-level,
    /// non-hidden directory holding an `Archetypes/` or `Fallbacks/` tree.
    pub fn discover_formats(&self) -> Result<Vec<Format>> {
        let entries = fs::read_dir(&self.repo).map_err(|e| {
            warn!(path = %self.repo.display(), error = %e, "rule repository unavailable");
            RuleError::RepositoryUnavailable(self.repo.clone())
        })?;

        let mut formats: Vec<Format> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| !is_hidden(path) && is_format_dir(path))
            .filter_map(|path| path.file_name().and_then(|n| n.to_str()).map(Format::from))
            .collect();
        formats.sort();
        formats.dedup();
        Ok(formats)
    }

    /// Locate the directory for `format`, matching its name case-insensitively.
    pub fn format_dir(&self, format: &Format) -> Option<PathBuf> {
        find_child_dir(&self.repo, |name| format.matches(name))
    }

    /// Parse every rule file of `format`.
    ///
    /// Never fails: a missing repository or format directory yields an empty
    /// rule set, and each bad file is dropped with a warning and a `Failed`
    /// entry in the report.
    pub fn load_format(&self, format: &Format) -> (RuleSet, LoadReport) {
        let mut report = LoadReport::new(format.clone());
        let mut rules = RuleSet::default();

        let Some(format_dir) = self.format_dir(format) else {
            warn!(
                format = %format,
                repo = %self.repo.display(),
                "format directory not found, loading empty rule set"
            );
            return (rules, report);
        };

        for kind in [RuleKind::Archetype, RuleKind::Fallback] {
            let kind_dir = find_child_dir(&format_dir, |name| {
                name.eq_ignore_ascii_case(kind.dir_name())
            });
            let Some(kind_dir) = kind_dir else {
                debug!(format = %format, dir = kind.dir_name(), "no rule directory");
                continue;
            };

            for path in rule_files(&kind_dir, &mut report) {
                let loaded = match kind {
                    RuleKind::Archetype => self.load_archetype(&path).map(|def| {
                        let name = def.name.clone();
                        rules.archetypes.push(def);
                        name
                    }),
                    RuleKind::Fallback => self.load_fallback(&path).map(|def| {
                        let name = def.name.clone();
                        rules.fallbacks.push(def);
                        name
                    }),
                };

                let status = match loaded {
                    Ok(name) => {
                        debug!(format = %format, kind = %kind, rule = %name, path = %path.display(), "loaded rule");
                        LoadStatus::Loaded { name, kind }
                    }
                    Err(e) => {
                        warn!(format = %format, kind = %kind, path = %path.display(), error = %e, "failed to load rule file");
                        LoadStatus::Failed { error: e.to_string() }
                    }
                };
                report.results.push(LoadResult { path, status });
            }
        }

        warn_duplicates(format, &rules);
        info!(
            format = %format,
            archetypes = rules.archetypes.len(),
            fallbacks = rules.fallbacks.len(),
            failed = report.failed(),
            "loaded format rules"
        );
        (rules, report)
    }

    /// Parse and validate a single archetype file.
    pub fn load_archetype(&self, path: &Path) -> Result<ArchetypeDefinition> {
        let file: ArchetypeFile = parse_document(path)?;
        let def = file.to_definition().map_err(RuleError::Structural)?;

        let unknown: Vec<&str> = def
            .conditions
            .iter()
            .chain(def.variants.iter().flat_map(|v| v.conditions.iter()))
            .flat_map(|c| c.unrecognized_kinds())
            .collect();
        if !unknown.is_empty() {
            warn!(
                path = %path.display(),
                rule = %def.name,
                kinds = ?unknown,
                "rule uses unrecognized condition types; they never match"
            );
        }
        Ok(def)
    }

    /// Parse and validate a single fallback file.
    pub fn load_fallback(&self, path: &Path) -> Result<FallbackDefinition> {
        let file: FallbackFile = parse_document(path)?;
        file.to_definition().map_err(RuleError::Structural)
    }
}

/// Whether `path` has a rule file extension.
pub(crate) fn is_rule_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| RULE_EXTENSIONS.iter().any(|ext| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Deserialize a JSON or YAML rule document, chosen by extension.
fn parse_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path)?;
    let contents = contents.trim_start_matches('\u{feff}');
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        Ok(serde_json::from_str(contents)?)
    } else {
        Ok(serde_yaml::from_str(contents)?)
    }
}

/// First child directory of `dir` whose name satisfies `matches`, by name order.
fn find_child_dir(dir: &Path, matches: impl Fn(&str) -> bool) -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|name| matches(name))
                .unwrap_or(false)
        })
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

/// Rule files under `dir` (recursively) in lexicographic order.
///
/// Dotfiles and files with other extensions are recorded as skipped; hidden
/// directories are not entered.
fn rule_files(dir: &Path, report: &mut LoadReport) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_type().is_dir() || !is_hidden(e.path()));

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "failed to read rule directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.into_path();
        let reason = if is_hidden(&path) {
            Some("dotfile")
        } else if !is_rule_file(&path) {
            Some("not a rule file")
        } else {
            None
        };

        match reason {
            Some(reason) => report.results.push(LoadResult {
                path,
                status: LoadStatus::Skipped {
                    reason: reason.to_string(),
                },
            }),
            None => files.push(path),
        }
    }
    files
}

/// Whether `name` is a rule kind directory (`Archetypes`, `Fallbacks`).
pub(crate) fn is_kind_dir_name(name: &str) -> bool {
    [RuleKind::Archetype, RuleKind::Fallback]
        .iter()
        .any(|kind| name.eq_ignore_ascii_case(kind.dir_name()))
}

/// Whether `dir` is a format directory: it has a rule kind child directory.
pub(crate) fn is_format_dir(dir: &Path) -> bool {
    dir.is_dir() && find_child_dir(dir, is_kind_dir_name).is_some()
}

pub(crate) fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

fn warn_duplicates(format: &Format, rules: &RuleSet) {
    let mut seen = HashSet::new();
    for archetype in &rules.archetypes {
        if !seen.insert(archetype.name.to_lowercase()) {
            warn!(
                format = %format,
                rule = %archetype.name,
                "duplicate archetype name; the first in load order wins"
            );
        }
    }
}
