use crate::error::{AppError, Result};
use crate::filter::PathFilter;
use log;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// An entry that passed the filter, as handed to a [`Visitor`].
#[derive(Debug, Clone)]
pub struct WalkEntry {
    pub absolute_path: PathBuf,
    pub relative_path: PathBuf,
    pub name: String,
    pub is_dir: bool,
    pub is_dotfile: bool,
    /// 1 for direct children of the scan root.
    pub depth: usize,
}

pub trait Visitor {
    fn visit(&mut self, entry: &WalkEntry);

    /// Called for entries below the root that could not be read (unreadable
    /// directories, broken links, link loops). `relative_path` is `None` when
    /// walkdir could not attribute the error to a path.
    fn walk_error(&mut self, relative_path: Option<&Path>, error: &walkdir::Error) {
        log::warn!(
            "Error walking {}: {}",
            relative_path.map_or_else(|| "unknown path".into(), |p| p.display().to_string()),
            error
        );
    }
}

/// Directories first, then by file name.
fn compare_entries(a: &walkdir::DirEntry, b: &walkdir::DirEntry) -> Ordering {
    b.file_type()
        .is_dir()
        .cmp(&a.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

fn relative_to(root: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, root).unwrap_or_else(|| path.to_path_buf())
}

/// Depth-first, sorted traversal of `root`. Every admission decision goes
/// through `filter`; rejected directories are pruned. The root itself is
/// never offered to the visitor.
pub fn walk<V: Visitor + ?Sized>(root: &Path, filter: &PathFilter, visitor: &mut V) -> Result<()> {
    log::debug!("Walking directory: {}", root.display());
    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by(compare_entries)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || filter.admits(&relative_to(root, entry.path()), entry.file_type().is_dir())
        });

    for entry_result in walker {
        match entry_result {
            Ok(entry) => {
                if entry.depth() == 0 {
                    if !entry.file_type().is_dir() {
                        return Err(AppError::InvalidArgument(format!(
                            "Scan root is not a directory: {}",
                            root.display()
                        )));
                    }
                    continue;
                }
                let relative_path = relative_to(root, entry.path());
                let name = entry.file_name().to_string_lossy().into_owned();
                let walk_entry = WalkEntry {
                    absolute_path: entry.path().to_path_buf(),
                    is_dir: entry.file_type().is_dir(),
                    is_dotfile: name.starts_with('.'),
                    depth: entry.depth(),
                    name,
                    relative_path,
                };
                log::trace!(
                    "Visiting {}{}",
                    walk_entry.relative_path.display(),
                    if walk_entry.is_dir { "/" } else { "" }
                );
                visitor.visit(&walk_entry);
            }
            Err(e) => {
                if e.depth() == 0 {
                    return Err(e.into());
                }
                let relative_path = e.path().map(|p| (relative_to(root, p), p.is_dir()));
                if let Some((rel, is_dir)) = &relative_path {
                    if !filter.admits(rel, *is_dir) {
                        continue;
                    }
                }
                visitor.walk_error(relative_path.as_ref().map(|(rel, _)| rel.as_path()), &e);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::FilterRuleSet;
    use std::fs;
    use tempfile::tempdir;

    #[derive(Default)]
    struct Collect(Vec<(usize, String, bool)>);

    impl Visitor for Collect {
        fn visit(&mut self, entry: &WalkEntry) {
            self.0.push((
                entry.depth,
                entry.relative_path.to_string_lossy().replace('\\', "/"),
                entry.is_dir,
            ));
        }
    }

    #[test]
    fn directories_come_first_then_names() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::create_dir(dir.path().join("zeta")).unwrap();
        fs::write(dir.path().join("zeta/inner.txt"), "i").unwrap();
        fs::create_dir(dir.path().join("alpha")).unwrap();

        let filter = PathFilter::new(
            dir.path(),
            &FilterRuleSet::default(),
            &dir.path().join(".gitignore"),
            false,
        )
        .unwrap();
        let mut seen = Collect::default();
        walk(dir.path(), &filter, &mut seen).unwrap();

        assert_eq!(
            seen.0,
            vec![
                (1, "alpha".to_string(), true),
                (1, "zeta".to_string(), true),
                (2, "zeta/inner.txt".to_string(), false),
                (1, "a.txt".to_string(), false),
                (1, "b.txt".to_string(), false),
            ]
        );
    }

    #[test]
    fn excluded_directories_are_pruned() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        fs::write(dir.path().join("node_modules/pkg/index.js"), "x").unwrap();
        fs::write(dir.path().join("main.js"), "y").unwrap();

        let mut rules = FilterRuleSet::default();
        rules.extend_exclude(["node_modules"]);
        let filter =
            PathFilter::new(dir.path(), &rules, &dir.path().join(".gitignore"), false).unwrap();
        let mut seen = Collect::default();
        walk(dir.path(), &filter, &mut seen).unwrap();
        assert_eq!(seen.0, vec![(1, "main.js".to_string(), false)]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("absent");
        let filter =
            PathFilter::new(&root, &FilterRuleSet::default(), &root.join(".gitignore"), false)
                .unwrap();
        assert!(walk(&root, &filter, &mut Collect::default()).is_err());
    }

    #[test]
    fn file_root_is_rejected() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        fs::write(&file, "x").unwrap();
        let filter = PathFilter::new(
            &file,
            &FilterRuleSet::default(),
            &dir.path().join(".gitignore"),
            false,
        )
        .unwrap();
        assert!(matches!(
            walk(&file, &filter, &mut Collect::default()),
            Err(AppError::InvalidArgument(_))
        ));
    }
}
