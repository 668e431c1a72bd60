use crate::error::Result;
use crate::filter::PathFilter;
use crate::rules::FilterRuleSet;
use crate::walk::{self, Visitor, WalkEntry};
use log;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

/// Admitted entries in walk order as `(depth, name)`.
#[derive(Debug, Default)]
struct TreeCollector {
    entries: Vec<(usize, String)>,
    visited: HashSet<PathBuf>,
}

impl Visitor for TreeCollector {
    fn visit(&mut self, entry: &WalkEntry) {
        self.visited.insert(entry.relative_path.clone());
        self.entries.push((entry.depth, entry.name.clone()));
    }

    /// Unreadable entries are listed like readable ones, matching the error
    /// records the scan produces for them. A directory that was entered but
    /// could not be listed is already present.
    fn walk_error(&mut self, relative_path: Option<&Path>, error: &walkdir::Error) {
        let Some(path) = relative_path else {
            log::debug!("Tree: skipping unattributed walk error: {}", error);
            return;
        };
        log::debug!("Tree: unreadable entry {}: {}", path.display(), error);
        if self.visited.contains(path) {
            return;
        }
        let Some(name) = path.file_name() else {
            return;
        };
        self.visited.insert(path.to_path_buf());
        self.entries
            .push((path.components().count(), name.to_string_lossy().into_owned()));
    }
}

impl TreeCollector {
    /// An entry is the last of its siblings when no later entry shares its
    /// depth before the walk climbs back above it.
    fn last_sibling_flags(&self) -> Vec<bool> {
        let mut flags = vec![false; self.entries.len()];
        let mut later_sibling: Vec<bool> = Vec::new();
        for (index, (depth, _)) in self.entries.iter().enumerate().rev() {
            let depth = *depth;
            if later_sibling.len() <= depth {
                later_sibling.resize(depth + 1, false);
            }
            flags[index] = !later_sibling[depth];
            later_sibling[depth] = true;
            later_sibling.truncate(depth + 1);
        }
        flags
    }

    fn render(&self) -> String {
        let flags = self.last_sibling_flags();
        let mut ancestors_last: Vec<bool> = Vec::new();
        let mut out = String::new();

        for ((depth, name), is_last) in self.entries.iter().zip(flags) {
            ancestors_last.truncate(depth.saturating_sub(1));
            for ancestor_last in &ancestors_last {
                out.push_str(if *ancestor_last { SPACE } else { PIPE });
            }
            out.push_str(if is_last { LAST_BRANCH } else { BRANCH });
            out.push_str(name);
            out.push('\n');
            ancestors_last.push(is_last);
        }
        out
    }
}

pub fn render_tree(
    root: &Path,
    rules: &FilterRuleSet,
    ignore_file: &Path,
    include_dotfiles: bool,
) -> Result<String> {
    let filter = PathFilter::new(root, rules, ignore_file, include_dotfiles)?;
    render_tree_with_filter(root, &filter)
}

pub fn render_tree_with_filter(root: &Path, filter: &PathFilter) -> Result<String> {
    log::debug!("Rendering directory tree for {}", root.display());
    let mut collector = TreeCollector::default();
    walk::walk(root, filter, &mut collector)?;
    log::debug!("Tree rendered with {} entries", collector.entries.len());
    Ok(collector.render())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn open_rules() -> FilterRuleSet {
        FilterRuleSet::default()
    }

    #[test]
    fn directories_first_with_last_sibling_connectors() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("x"), "").unwrap();
        fs::write(dir.path().join("w"), "").unwrap();
        fs::create_dir(dir.path().join("y")).unwrap();
        fs::write(dir.path().join("y/z"), "").unwrap();

        let tree = render_tree(dir.path(), &open_rules(), &dir.path().join(".gitignore"), false)
            .unwrap();
        assert_eq!(tree, "├── y\n│   └── z\n├── w\n└── x\n");
    }

    #[test]
    fn last_directory_uses_blank_prefix() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a")).unwrap();
        fs::create_dir_all(dir.path().join("b/c")).unwrap();
        fs::write(dir.path().join("b/c/d.txt"), "").unwrap();
        fs::write(dir.path().join("b/e.txt"), "").unwrap();

        let tree = render_tree(dir.path(), &open_rules(), &dir.path().join(".gitignore"), false)
            .unwrap();
        let expected = "\
├── a
└── b
    ├── c
    │   └── d.txt
    └── e.txt
";
        assert_eq!(tree, expected);
    }

    #[test]
    fn tree_agrees_with_include_and_dotfile_rules() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.py"), "").unwrap();
        fs::write(dir.path().join("b.txt"), "").unwrap();
        fs::write(dir.path().join(".secret"), "").unwrap();
        fs::create_dir(dir.path().join("lib")).unwrap();
        fs::write(dir.path().join("lib/c.txt"), "").unwrap();

        let mut rules = open_rules();
        rules.extend_include(["*.py"]);
        let tree = render_tree(dir.path(), &rules, &dir.path().join(".gitignore"), false).unwrap();
        assert_eq!(tree, "├── lib\n└── a.py\n");
        assert!(!tree.contains(".secret"));
        assert!(!tree.contains("b.txt"));
    }

    #[test]
    fn empty_directory_renders_nothing() {
        let dir = tempdir().unwrap();
        let tree = render_tree(dir.path(), &open_rules(), &dir.path().join(".gitignore"), false)
            .unwrap();
        assert_eq!(tree, "");
    }

    #[test]
    fn rendering_is_stable() {
        let dir = tempdir().unwrap();
        for name in ["q.rs", "a.rs", "m.rs"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::create_dir(dir.path().join("src")).unwrap();
        let ignore = dir.path().join(".gitignore");
        let first = render_tree(dir.path(), &open_rules(), &ignore, false).unwrap();
        let second = render_tree(dir.path(), &open_rules(), &ignore, false).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, "├── src\n├── a.rs\n├── m.rs\n└── q.rs\n");
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_is_listed() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "").unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.txt"), dir.path().join("dangling.txt"))
            .unwrap();
        let tree = render_tree(dir.path(), &open_rules(), &dir.path().join(".gitignore"), false)
            .unwrap();
        assert_eq!(tree, "├── a.txt\n└── dangling.txt\n");
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directory_is_listed_once() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("inner.txt"), "").unwrap();
        fs::write(dir.path().join("ok.txt"), "").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let tree = render_tree(dir.path(), &open_rules(), &dir.path().join(".gitignore"), false);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(tree.unwrap(), "├── locked\n└── ok.txt\n");
    }
}
