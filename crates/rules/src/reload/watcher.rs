//! Filesystem event filtering and changed-path → format resolution.

use std::path::{Component, Path};

use notify::{Event, EventKind};

use crate::loader::{is_format_dir, is_hidden, is_kind_dir_name};
use crate::model::Format;

/// Whether a watcher event can change rule content.
pub(super) fn is_relevant(event: &Event) -> bool {
    !matches!(event.kind, EventKind::Access(_))
}

/// The format a changed path belongs to, if any.
///
/// The path's ancestry (inside `repo`) is walked upward for a directory
/// named like a known format. Failing that, a new top-level directory is a
/// format only if the path runs through its `Archetypes/` or `Fallbacks/`
/// child or the directory already holds one; a top-level file is matched by
/// its name prefix (`modern_burn.json` → `modern`). Anything under a hidden
/// directory such as `.git/` and editor temp files are ignored.
pub(super) fn affected_format(repo: &Path, path: &Path, known: &[Format]) -> Option<Format> {
    let rel = path.strip_prefix(repo).ok()?;

    let mut components = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(name) => components.push(name.to_str()?),
            _ => return None,
        }
    }
    let first = *components.first()?;
    if components.iter().any(|c| c.starts_with('.')) || is_temp_file(path) {
        return None;
    }

    if let Some(format) = components
        .iter()
        .rev()
        .find_map(|name| known.iter().find(|f| f.matches(name)))
    {
        return Some(format.clone());
    }

    let through_kind_dir = components.get(1).is_some_and(|c| is_kind_dir_name(c));
    if through_kind_dir || is_format_dir(&repo.join(first)) {
        return Some(Format::from(first));
    }
    if components.len() > 1 {
        return None;
    }

    filename_heuristic(first, known)
}

/// Match `modern_burn.json`, `Modern-Burn.yml` or `modern.json` to `modern`.
fn filename_heuristic(file_name: &str, known: &[Format]) -> Option<Format> {
    let stem = file_name.split('.').next()?;
    let prefix = stem.split(['_', '-', ' ']).next()?;
    known.iter().find(|f| f.matches(prefix)).cloned()
}

fn is_temp_file(path: &Path) -> bool {
    is_hidden(path)
        || path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.ends_with('~') || n.ends_with(".tmp") || n.ends_with(".swp"))
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn known() -> Vec<Format> {
        vec![Format::from("modern"), Format::from("legacy")]
    }

    #[test]
    fn resolves_by_ancestor_directory() {
        let repo = Path::new("/rules");
        let path = repo.join("Modern/Archetypes/Burn.json");
        assert_eq!(affected_format(repo, &path, &known()), Some(Format::from("modern")));

        let nested = repo.join("LEGACY/Fallbacks/colors/Izzet.json");
        assert_eq!(affected_format(repo, &nested, &known()), Some(Format::from("legacy")));
    }

    #[test]
    fn new_top_level_directory_is_a_format() {
        let repo = Path::new("/rules");
        let path = repo.join("Pioneer/Archetypes/Spirits.json");
        assert_eq!(affected_format(repo, &path, &known()), Some(Format::from("pioneer")));
    }

    #[test]
    fn deleted_format_directory_resolves() {
        let repo = Path::new("/rules");
        assert_eq!(affected_format(repo, &repo.join("Modern"), &known()), Some(Format::from("modern")));
    }

    #[test]
    fn filename_heuristics_for_top_level_files() {
        let repo = Path::new("/rules");
        assert_eq!(
            affected_format(repo, &repo.join("modern_burn.json"), &known()),
            Some(Format::from("modern"))
        );
        assert_eq!(
            affected_format(repo, &repo.join("Legacy-Delver.yml"), &known()),
            Some(Format::from("legacy"))
        );
        assert_eq!(affected_format(repo, &repo.join("README.md"), &known()), None);
    }

    #[test]
    fn new_top_level_dir_on_disk() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("Pauper/Fallbacks")).unwrap();
        assert_eq!(
            affected_format(dir.path(), &dir.path().join("Pauper"), &known()),
            Some(Format::from("pauper"))
        );
    }

    #[test]
    fn directories_without_rule_trees_are_not_formats() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("docs/notes.md"), "notes").unwrap();

        assert_eq!(affected_format(dir.path(), &dir.path().join("docs/notes.md"), &known()), None);
        assert_eq!(affected_format(dir.path(), &dir.path().join("docs"), &known()), None);
        assert_eq!(
            affected_format(dir.path(), &dir.path().join("scratch/a/b.json"), &known()),
            None
        );
    }

    #[test]
    fn ignores_git_internals_and_temp_files() {
        let repo = Path::new("/rules");
        assert_eq!(affected_format(repo, &repo.join(".git/FETCH_HEAD"), &known()), None);
        assert_eq!(
            affected_format(repo, &repo.join("Modern/Archetypes/.Burn.json.swp"), &known()),
            None
        );
        assert_eq!(
            affected_format(repo, &repo.join("Modern/Archetypes/Burn.json~"), &known()),
            None
        );
    }

    #[test]
    fn paths_outside_repo_are_ignored() {
        assert_eq!(
            affected_format(Path::new("/rules"), Path::new("/elsewhere/Modern/x.json"), &known()),
            None
        );
        assert_eq!(affected_format(Path::new("/rules"), Path::new("/rules"), &known()), None);
    }
}
