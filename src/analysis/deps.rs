//! Second-pass dependency resolution.
//!
//! Edges cannot be built while parsing: a file may reference a type whose
//! definition comes later in the corpus. So after the type table is closed,
//! every file is re-tokenized and each identifier that names a known user
//! type adds an edge to the defining file. Identifiers inside literals and
//! comments never reach this pass; the tokenizer classifies them away.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::TypeTable;
use crate::lexer::Tokenizer;
use crate::sink::LogSinks;

/// File → set of files it depends on. Entries keep discovery order; each
/// dependency set iterates in ascending path order. Self-edges are omitted.
#[derive(Debug, Clone, Default)]
pub struct DependencyTable {
    entries: Vec<(PathBuf, BTreeSet<PathBuf>)>,
}

impl DependencyTable {
    /// Scan every file against the closed type table. Unreadable files get
    /// a diagnostic and an empty dependency set.
    pub fn resolve(files: &[PathBuf], types: &TypeTable, sinks: &LogSinks) -> DependencyTable {
        let mut entries = Vec::with_capacity(files.len());
        for file in files {
            let mut deps = BTreeSet::new();
            match fs::read_to_string(file) {
                Ok(source) => {
                    for token in Tokenizer::new(&source) {
                        if !token.is_identifier() {
                            continue;
                        }
                        if let Some(definer) = types.defining_file(&token.text) {
                            if definer != file {
                                deps.insert(definer.to_path_buf());
                            }
                        }
                    }
                }
                Err(e) => {
                    sinks.debug(&format!(
                        "cannot read {} for dependency scan: {}; recording no dependencies",
                        file.display(),
                        e
                    ));
                }
            }
            entries.push((file.clone(), deps));
        }
        DependencyTable { entries }
    }

    pub fn dependencies_of(&self, file: &Path) -> Option<&BTreeSet<PathBuf>> {
        self.entries
            .iter()
            .find(|(f, _)| f == file)
            .map(|(_, deps)| deps)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &BTreeSet<PathBuf>)> {
        self.entries.iter().map(|(f, d)| (f, d))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for DependencyTable {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::TypeTable;
    use crate::parser::{parse_file, Repository};
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, source: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, source).unwrap();
        path
    }

    fn analyze(files: &[PathBuf]) -> (TypeTable, DependencyTable) {
        let sinks = LogSinks::quiet();
        let mut repo = Repository::new();
        for file in files {
            parse_file(&mut repo, &sinks, file).unwrap();
        }
        let types = TypeTable::build(&repo.ast, &sinks);
        let deps = DependencyTable::resolve(files, &types, &sinks);
        (types, deps)
    }

    #[test]
    fn test_cross_file_reference() {
        let temp = TempDir::new().unwrap();
        let b_h = write(temp.path(), "B.h", "class B { };");
        let c_cpp = write(temp.path(), "C.cpp", "B b;");
        let (_, deps) = analyze(&[b_h.clone(), c_cpp.clone()]);

        let c_deps = deps.dependencies_of(&c_cpp).unwrap();
        assert!(c_deps.contains(&b_h));
        assert!(deps.dependencies_of(&b_h).unwrap().is_empty());
    }

    #[test]
    fn test_no_self_dependency() {
        let temp = TempDir::new().unwrap();
        let d_cpp = write(temp.path(), "D.cpp", "class D { }; D d;");
        let (_, deps) = analyze(&[d_cpp.clone()]);
        assert!(deps.dependencies_of(&d_cpp).unwrap().is_empty());
    }

    #[test]
    fn test_identifier_in_string_is_not_an_edge() {
        let temp = TempDir::new().unwrap();
        let b_h = write(temp.path(), "B.h", "class B { };");
        let c_cpp = write(temp.path(), "C.cpp", "const char* s = \"B\"; // B in comment\n");
        let (_, deps) = analyze(&[b_h, c_cpp.clone()]);
        assert!(deps.dependencies_of(&c_cpp).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_identifiers_produce_no_edges() {
        let temp = TempDir::new().unwrap();
        let c_cpp = write(temp.path(), "C.cpp", "std::vector<int> v;");
        let (_, deps) = analyze(&[c_cpp.clone()]);
        assert!(deps.dependencies_of(&c_cpp).unwrap().is_empty());
    }

    #[test]
    fn test_unreadable_file_maps_to_empty_set() {
        let temp = TempDir::new().unwrap();
        let b_h = write(temp.path(), "B.h", "class B { };");
        let missing = temp.path().join("Gone.cpp");
        let sinks = LogSinks::quiet();

        let mut repo = Repository::new();
        parse_file(&mut repo, &sinks, &b_h).unwrap();
        let types = TypeTable::build(&repo.ast, &sinks);
        let deps = DependencyTable::resolve(&[b_h, missing.clone()], &types, &sinks);

        assert_eq!(deps.len(), 2);
        assert!(deps.dependencies_of(&missing).unwrap().is_empty());
    }

    #[test]
    fn test_implementation_depends_on_its_header() {
        let temp = TempDir::new().unwrap();
        let a_h = write(temp.path(), "A.h", "class A { public: void f(); };");
        let a_cpp = write(temp.path(), "A.cpp", "#include \"A.h\"\nvoid A::f() { }\n");
        let (_, deps) = analyze(&[a_h.clone(), a_cpp.clone()]);

        let a_cpp_deps = deps.dependencies_of(&a_cpp).unwrap();
        assert_eq!(a_cpp_deps.iter().collect::<Vec<_>>(), vec![&a_h]);
        assert!(deps.dependencies_of(&a_h).unwrap().is_empty());
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let b_h = write(temp.path(), "B.h", "class B { };");
        let c_cpp = write(temp.path(), "C.cpp", "B b;");
        let files = vec![b_h, c_cpp];

        let sinks = LogSinks::quiet();
        let mut repo = Repository::new();
        for file in &files {
            parse_file(&mut repo, &sinks, file).unwrap();
        }
        let types = TypeTable::build(&repo.ast, &sinks);
        let first = DependencyTable::resolve(&files, &types, &sinks);
        let second = DependencyTable::resolve(&files, &types, &sinks);
        assert_eq!(first, second);
    }
}
