//! Abstract syntax tree of named program scopes.
//!
//! Nodes live in an arena owned by [`Ast`]; [`NodeId`] indexes into it, so
//! the root transitively owns every node and nothing points back at its
//! parent. Walks that need parent context pass it down the recursion.

use std::fmt;
use std::path::PathBuf;

/// Name of the synthetic root scope spanning the whole corpus.
pub const GLOBAL_SCOPE_NAME: &str = "Global Namespace";

/// Member access level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Protected,
    Private,
}

impl Access {
    pub fn as_str(&self) -> &'static str {
        match self {
            Access::Public => "public",
            Access::Protected => "protected",
            Access::Private => "private",
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of declaration recorded inside a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Data,
    Function,
    Lambda,
    Other,
}

impl DeclKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclKind::Data => "data",
            DeclKind::Function => "function",
            DeclKind::Lambda => "lambda",
            DeclKind::Other => "other",
        }
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A declaration that appeared directly inside a scope.
#[derive(Debug, Clone)]
pub struct Declaration {
    /// Base name of the file the declaration came from.
    pub package: String,
    /// Full path of that file.
    pub file: PathBuf,
    pub line: usize,
    pub access: Access,
    pub kind: DeclKind,
    /// Raw lexemes of the declaration.
    pub tokens: Vec<String>,
}

impl Declaration {
    pub fn text(&self) -> String {
        self.tokens.join(" ")
    }
}

/// Kind of program scope a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Namespace,
    Class,
    Struct,
    Interface,
    Function,
    Lambda,
    Control,
    Anonymous,
}

impl ScopeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeKind::Namespace => "namespace",
            ScopeKind::Class => "class",
            ScopeKind::Struct => "struct",
            ScopeKind::Interface => "interface",
            ScopeKind::Function => "function",
            ScopeKind::Lambda => "lambda",
            ScopeKind::Control => "control",
            ScopeKind::Anonymous => "anonymous",
        }
    }

    /// Kinds listed in the metrics display.
    pub fn is_metric_kind(&self) -> bool {
        matches!(
            self,
            ScopeKind::Namespace
                | ScopeKind::Class
                | ScopeKind::Struct
                | ScopeKind::Interface
                | ScopeKind::Function
                | ScopeKind::Lambda
        )
    }

    /// Kinds that define a user type.
    pub fn is_type_definition(&self) -> bool {
        matches!(self, ScopeKind::Class | ScopeKind::Struct | ScopeKind::Interface)
    }

    /// Kinds that can contain recordable declarations.
    pub fn holds_declarations(&self) -> bool {
        matches!(
            self,
            ScopeKind::Namespace | ScopeKind::Class | ScopeKind::Struct | ScopeKind::Interface
        )
    }

    /// Contribution of the scope itself to the complexity sum. Bare `{ }`
    /// blocks preserve brace symmetry but are not counted.
    pub fn complexity_weight(&self) -> usize {
        match self {
            ScopeKind::Anonymous => 0,
            _ => 1,
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Index of a node within its [`Ast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A named program scope.
#[derive(Debug, Clone)]
pub struct AstNode {
    pub name: String,
    pub kind: ScopeKind,
    /// Kind of the lexical parent; `None` for the root.
    pub parent_kind: Option<ScopeKind>,
    /// Base name of the file this scope was opened in.
    pub package: String,
    /// Directory of that file.
    pub path: PathBuf,
    pub start_line: usize,
    pub end_line: usize,
    /// Number of scopes contained transitively, including self.
    pub complexity: usize,
    /// `template<...>` prefix text, when the scope was templated.
    pub template_args: Option<String>,
    pub children: Vec<NodeId>,
    pub decls: Vec<Declaration>,
}

impl AstNode {
    pub fn new(
        name: impl Into<String>,
        kind: ScopeKind,
        package: impl Into<String>,
        path: impl Into<PathBuf>,
        start_line: usize,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            parent_kind: None,
            package: package.into(),
            path: path.into(),
            start_line,
            end_line: start_line,
            complexity: 0,
            template_args: None,
            children: Vec::new(),
            decls: Vec::new(),
        }
    }

    /// Inclusive source-line span length.
    pub fn size_lines(&self) -> usize {
        self.end_line.saturating_sub(self.start_line) + 1
    }

    /// Full path of the file this scope was opened in.
    pub fn source_file(&self) -> PathBuf {
        self.path.join(&self.package)
    }

    /// One-line summary used by the tree walker.
    pub fn show(&self) -> String {
        format!(
            "({}, {}, lines [{}-{}], complexity {})",
            self.kind, self.name, self.start_line, self.end_line, self.complexity
        )
    }
}

/// Arena holding the cross-file scope tree. Node 0 is always the root.
#[derive(Debug, Clone)]
pub struct Ast {
    nodes: Vec<AstNode>,
}

impl Ast {
    pub fn new() -> Self {
        let mut root = AstNode::new(GLOBAL_SCOPE_NAME, ScopeKind::Namespace, "", "", 1);
        root.parent_kind = None;
        Self { nodes: vec![root] }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &AstNode {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut AstNode {
        &mut self.nodes[id.index()]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Attach `node` as the last child of `parent`, recording the parent's
    /// kind on the child.
    pub fn add_child(&mut self, parent: NodeId, mut node: AstNode) -> NodeId {
        node.parent_kind = Some(self.node(parent).kind);
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        self.nodes[parent.index()].children.push(id);
        id
    }

    /// First child of `parent` with the given name that can contain nested
    /// scopes; used by qualified-name relocation.
    pub fn find_container_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.node(parent)
            .children
            .iter()
            .copied()
            .find(|&c| {
                let n = self.node(c);
                n.name == name
                    && matches!(
                        n.kind,
                        ScopeKind::Namespace
                            | ScopeKind::Class
                            | ScopeKind::Struct
                            | ScopeKind::Interface
                    )
            })
    }

    /// Pre-order walk from the root; the callback receives each node id and
    /// its depth.
    pub fn walk<F: FnMut(NodeId, usize)>(&self, mut f: F) {
        self.walk_from(self.root(), 0, &mut f);
    }

    fn walk_from<F: FnMut(NodeId, usize)>(&self, id: NodeId, depth: usize, f: &mut F) {
        f(id, depth);
        // children are cheap to copy; the callback may borrow the arena
        let children = self.node(id).children.clone();
        for child in children {
            self.walk_from(child, depth + 1, f);
        }
    }
}

impl Default for Ast {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn node(name: &str, kind: ScopeKind) -> AstNode {
        AstNode::new(name, kind, "T.h", "/src", 1)
    }

    #[test]
    fn test_root_is_global_namespace() {
        let ast = Ast::new();
        let root = ast.node(ast.root());
        assert_eq!(root.name, GLOBAL_SCOPE_NAME);
        assert_eq!(root.kind, ScopeKind::Namespace);
        assert!(root.parent_kind.is_none());
    }

    #[test]
    fn test_add_child_records_parent_kind() {
        let mut ast = Ast::new();
        let class = ast.add_child(ast.root(), node("A", ScopeKind::Class));
        let func = ast.add_child(class, node("f", ScopeKind::Function));
        assert_eq!(ast.node(class).parent_kind, Some(ScopeKind::Namespace));
        assert_eq!(ast.node(func).parent_kind, Some(ScopeKind::Class));
        assert_eq!(ast.node(ast.root()).children, vec![class]);
    }

    #[test]
    fn test_walk_is_preorder_with_depth() {
        let mut ast = Ast::new();
        let a = ast.add_child(ast.root(), node("A", ScopeKind::Class));
        ast.add_child(a, node("f", ScopeKind::Function));
        ast.add_child(ast.root(), node("B", ScopeKind::Class));

        let mut seen = Vec::new();
        ast.walk(|id, depth| seen.push((ast.node(id).name.clone(), depth)));
        assert_eq!(
            seen,
            vec![
                (GLOBAL_SCOPE_NAME.to_string(), 0),
                ("A".to_string(), 1),
                ("f".to_string(), 2),
                ("B".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_find_container_child_skips_functions() {
        let mut ast = Ast::new();
        ast.add_child(ast.root(), node("f", ScopeKind::Function));
        let b = ast.add_child(ast.root(), node("B", ScopeKind::Class));
        assert_eq!(ast.find_container_child(ast.root(), "B"), Some(b));
        assert_eq!(ast.find_container_child(ast.root(), "f"), None);
    }

    #[test]
    fn test_show_format() {
        let mut n = node("A", ScopeKind::Class);
        n.end_line = 10;
        n.complexity = 3;
        assert_eq!(n.show(), "(class, A, lines [1-10], complexity 3)");
    }

    #[test]
    fn test_source_file_joins_path_and_package() {
        let n = node("A", ScopeKind::Class);
        assert_eq!(n.source_file(), Path::new("/src").join("T.h"));
    }
}
