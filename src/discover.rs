//! Pattern-matched source discovery.
//!
//! Walks the directory tree under the analysis root, keeping files whose
//! names match any of the requested patterns and counting files and
//! directories visited. Header files are ordered before implementation
//! files so out-of-line C++ members always find their class in the AST.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use globset::{Glob, GlobMatcher};
use walkdir::WalkDir;

/// Extensions treated as C++ headers.
const HEADER_EXTS: &[&str] = &["h", "hpp", "hxx"];

/// Extensions treated as C++ implementation files.
const IMPL_EXTS: &[&str] = &["cpp", "cc", "cxx"];

/// Files found under the root, grouped by `*.ext` pattern, in walk order.
#[derive(Debug, Clone, Default)]
pub struct FileSet {
    by_pattern: BTreeMap<String, Vec<PathBuf>>,
    pub num_files: usize,
    pub num_dirs: usize,
}

/// Search the tree rooted at `root` for files matching `patterns`.
pub fn discover(root: &Path, patterns: &[String]) -> anyhow::Result<FileSet> {
    let matchers: Vec<GlobMatcher> = patterns
        .iter()
        .map(|p| {
            Glob::new(p)
                .map(|g| g.compile_matcher())
                .with_context(|| format!("invalid file pattern {:?}", p))
        })
        .collect::<anyhow::Result<_>>()?;

    let mut files = FileSet::default();
    for entry in WalkDir::new(root).follow_links(true).into_iter().filter_entry(|e| {
        // skip hidden directories
        !(e.file_type().is_dir() && e.file_name().to_string_lossy().starts_with('.'))
    }) {
        let entry = entry?;
        if entry.file_type().is_dir() {
            files.num_dirs += 1;
            continue;
        }
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if matchers.iter().any(|m| m.is_match(name.as_ref())) {
            files.add_file(entry.path().to_path_buf());
        }
    }
    Ok(files)
}

impl FileSet {
    /// Record a file under the `*.ext` pattern of its own extension.
    pub fn add_file(&mut self, path: PathBuf) {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();
        self.by_pattern
            .entry(format!("*.{}", ext))
            .or_default()
            .push(path);
        self.num_files += 1;
    }

    fn with_extensions(&self, exts: &[&str]) -> Vec<PathBuf> {
        let mut out = Vec::new();
        for ext in exts {
            if let Some(files) = self.by_pattern.get(&format!("*.{}", ext)) {
                out.extend(files.iter().cloned());
            }
        }
        out
    }

    pub fn headers(&self) -> Vec<PathBuf> {
        self.with_extensions(HEADER_EXTS)
    }

    pub fn implementations(&self) -> Vec<PathBuf> {
        self.with_extensions(IMPL_EXTS)
    }

    pub fn csharp(&self) -> Vec<PathBuf> {
        self.with_extensions(&["cs"])
    }

    /// Every matched file in parse order: headers first, then C++
    /// implementations, then C#, then anything else that matched.
    pub fn ordered(&self) -> Vec<PathBuf> {
        let mut out = self.headers();
        out.extend(self.implementations());
        out.extend(self.csharp());

        let known: Vec<String> = HEADER_EXTS
            .iter()
            .chain(IMPL_EXTS.iter())
            .chain(["cs"].iter())
            .map(|e| format!("*.{}", e))
            .collect();
        for (pattern, files) in &self.by_pattern {
            if !known.contains(pattern) {
                out.extend(files.iter().cloned());
            }
        }
        out
    }

    /// Matched patterns and their files, for the SLOC display.
    pub fn iter_patterns(&self) -> impl Iterator<Item = (&String, &Vec<PathBuf>)> {
        self.by_pattern.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.num_files == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, "// empty\n").unwrap();
        path
    }

    #[test]
    fn test_patterns_select_files() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "A.h");
        touch(temp.path(), "A.cpp");
        touch(temp.path(), "notes.txt");

        let files = discover(temp.path(), &["*.h".to_string(), "*.cpp".to_string()]).unwrap();
        assert_eq!(files.num_files, 2);
        assert_eq!(files.headers().len(), 1);
        assert_eq!(files.implementations().len(), 1);
    }

    #[test]
    fn test_counts_directories() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();
        touch(&temp.path().join("sub"), "B.h");

        let files = discover(temp.path(), &["*.h".to_string()]).unwrap();
        // the root and the subdirectory
        assert_eq!(files.num_dirs, 2);
        assert_eq!(files.num_files, 1);
    }

    #[test]
    fn test_ordered_puts_headers_before_implementations() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "Z.cpp");
        touch(temp.path(), "A.cpp");
        touch(temp.path(), "Z.h");
        touch(temp.path(), "App.cs");

        let files = discover(
            temp.path(),
            &["*.h".to_string(), "*.cpp".to_string(), "*.cs".to_string()],
        )
        .unwrap();
        let ordered = files.ordered();
        let names: Vec<String> = ordered
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names[0], "Z.h");
        assert!(names.iter().position(|n| n == "App.cs").unwrap() > 1);
        assert_eq!(ordered.len(), 4);
    }

    #[test]
    fn test_hidden_directories_skipped() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();
        touch(&temp.path().join(".git"), "C.h");
        touch(temp.path(), "D.h");

        let files = discover(temp.path(), &["*.h".to_string()]).unwrap();
        assert_eq!(files.num_files, 1);
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(discover(temp.path(), &["*.[h".to_string()]).is_err());
    }

    #[test]
    fn test_empty_corpus() {
        let temp = TempDir::new().unwrap();
        let files = discover(temp.path(), &["*.h".to_string()]).unwrap();
        assert!(files.is_empty());
        assert!(files.ordered().is_empty());
    }
}
