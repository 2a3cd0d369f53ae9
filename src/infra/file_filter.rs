//! File discovery with .gitignore integration
//!
//! Uses the `ignore` crate (from ripgrep) for gitignore-style walking and for
//! matching workspace globs such as `**/widget.{cpp,cc}`.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use ignore::overrides::OverrideBuilder;

/// File filter configuration
#[derive(Debug, Clone)]
pub struct FileFilterConfig {
    /// Root directory for relative path resolution
    pub root: PathBuf,
    /// Use .gitignore files for filtering
    pub respect_gitignore: bool,
    /// Hidden files/directories (starting with .)
    pub include_hidden: bool,
}

impl Default for FileFilterConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::new(),
            respect_gitignore: true,
            include_hidden: false,
        }
    }
}

/// File filter with gitignore integration
pub struct FileFilter {
    config: FileFilterConfig,
    local_ignore: Option<Gitignore>,
}

impl FileFilter {
    pub fn new(config: FileFilterConfig) -> Self {
        let local_ignore = Self::load_local_ignore(&config.root);
        Self {
            config,
            local_ignore,
        }
    }

    /// Create a filter that respects .gitignore in the given root
    pub fn with_gitignore(root: impl AsRef<Path>) -> Self {
        Self::new(FileFilterConfig {
            root: root.as_ref().to_path_buf(),
            ..Default::default()
        })
    }

    /// Load .cxxmate/ignore
    fn load_local_ignore(root: &Path) -> Option<Gitignore> {
        let ignore_path = root.join(".cxxmate").join("ignore");
        if !ignore_path.exists() {
            return None;
        }

        let mut builder = GitignoreBuilder::new(root);
        if let Some(err) = builder.add(&ignore_path) {
            tracing::warn!("Failed to parse .cxxmate/ignore: {}", err);
        }
        builder.build().ok()
    }

    /// Check if a path should be ignored
    pub fn is_ignored(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.config.root).unwrap_or(path);

        for component in relative.components() {
            let std::path::Component::Normal(name) = component else {
                continue;
            };
            let Some(name) = name.to_str() else {
                continue;
            };
            if is_default_ignored(name) {
                return true;
            }
            if !self.config.include_hidden && name.starts_with('.') {
                return true;
            }
        }

        if let Some(ref ignore) = self.local_ignore
            && ignore
                .matched_path_or_any_parents(relative, path.is_dir())
                .is_ignore()
        {
            return true;
        }

        false
    }

    pub fn should_include(&self, path: &Path) -> bool {
        !self.is_ignored(path)
    }

    /// Create a WalkBuilder configured with this filter
    pub fn walk_builder(&self) -> WalkBuilder {
        let mut builder = WalkBuilder::new(&self.config.root);

        builder
            .hidden(!self.config.include_hidden)
            .git_ignore(self.config.respect_gitignore)
            .git_global(self.config.respect_gitignore)
            .git_exclude(self.config.respect_gitignore)
            .require_git(false);

        builder
    }

    /// Files under the root whose root-relative path matches `glob`.
    ///
    /// An invalid glob matches nothing.
    pub fn find_files(&self, glob: &str) -> Vec<PathBuf> {
        let mut overrides = OverrideBuilder::new(&self.config.root);
        if let Err(e) = overrides.add(glob) {
            tracing::warn!("Invalid glob '{}': {}", glob, e);
            return Vec::new();
        }
        let overrides = match overrides.build() {
            Ok(overrides) => overrides,
            Err(e) => {
                tracing::warn!("Invalid glob '{}': {}", glob, e);
                return Vec::new();
            }
        };

        let mut builder = self.walk_builder();
        builder.overrides(overrides);

        let mut files: Vec<PathBuf> = builder
            .build()
            .filter_map(|e| e.ok())
            .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
            .map(|entry| entry.into_path())
            .filter(|path| self.should_include(path))
            .collect();
        files.sort();
        files
    }
}

fn is_default_ignored(name: &str) -> bool {
    DEFAULT_IGNORE_PATTERNS.iter().any(|pattern| {
        match pattern.strip_suffix('*') {
            Some(prefix) => name.starts_with(prefix),
            None => name == *pattern,
        }
    })
}

/// Directories that never hold the counterpart of a C/C++ file
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    // Version control
    ".git",
    ".svn",
    ".hg",
    // Build outputs
    "build",
    "out",
    "cmake-build-*",
    "CMakeFiles",
    "_deps",
    // Tool caches
    ".cache",
    ".ccls-cache",
    ".clangd",
    // Editors
    ".idea",
    ".vscode",
    // cxxmate
    ".cxxmate",
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_find_files_matches_glob() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(root, "src/widget.cpp");
        touch(root, "test/widget.cc");
        touch(root, "src/widget.h");
        touch(root, "src/gadget.cpp");

        let filter = FileFilter::with_gitignore(root);
        let found = filter.find_files("**/widget.{cpp,cc}");
        assert_eq!(
            found,
            vec![root.join("src/widget.cpp"), root.join("test/widget.cc")]
        );
    }

    #[test]
    fn test_find_files_skips_build_and_gitignored() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::write(root.join(".gitignore"), "generated/\n").unwrap();
        touch(root, "src/widget.cpp");
        touch(root, "build/widget.cpp");
        touch(root, "cmake-build-debug/widget.cpp");
        touch(root, "generated/widget.cpp");

        let filter = FileFilter::with_gitignore(root);
        assert_eq!(
            filter.find_files("**/widget.cpp"),
            vec![root.join("src/widget.cpp")]
        );
    }

    #[test]
    fn test_local_ignore() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(root, ".cxxmate/ignore");
        fs::write(root.join(".cxxmate/ignore"), "third_party/\n").unwrap();
        touch(root, "src/a.cpp");
        touch(root, "third_party/lib/a.cpp");

        let filter = FileFilter::with_gitignore(root);
        assert!(filter.should_include(&root.join("src/a.cpp")));
        assert!(!filter.should_include(&root.join("third_party/lib/a.cpp")));
        assert_eq!(filter.find_files("**/a.cpp"), vec![root.join("src/a.cpp")]);
    }

    #[test]
    fn test_invalid_glob_matches_nothing() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "a.cpp");
        let filter = FileFilter::with_gitignore(temp.path());
        assert!(filter.find_files("**/{a.cpp").is_empty());
    }
}
