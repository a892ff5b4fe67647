//! Parsed template tree.
//!
//! ```text
//! TemplateTree
//! ├── Directory "{{ project_name }}"
//! │   └── File "__init__.py"          (Text)
//! ├── File "README.md.jinja"         (Text)
//! └── File "logo.png"                (Binary, copied verbatim)
//! ```
//!
//! Names are templates too; they are rendered segment by segment.

/// File content as read from the template root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateContent {
    /// UTF-8 text, run through the render context.
    Text(String),
    /// Anything else, copied byte-for-byte.
    Binary(Vec<u8>),
}

impl TemplateContent {
    /// Classify raw bytes: valid UTF-8 is text, the rest is binary.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(text) => Self::Text(text),
            Err(e) => Self::Binary(e.into_bytes()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSpec {
    /// Single path segment, possibly containing placeholders.
    pub name: String,
    pub content: TemplateContent,
}

impl FileSpec {
    pub fn new(name: impl Into<String>, content: TemplateContent) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }

    pub fn text(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(name, TemplateContent::Text(content.into()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySpec {
    pub name: String,
    pub children: Vec<TemplateNode>,
}

impl DirectorySpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, node: TemplateNode) -> Self {
        self.children.push(node);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateNode {
    File(FileSpec),
    Directory(DirectorySpec),
}

impl TemplateNode {
    pub fn name(&self) -> &str {
        match self {
            Self::File(f) => &f.name,
            Self::Directory(d) => &d.name,
        }
    }
}

/// Root of a parsed template. The manifest is never part of it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateTree {
    pub nodes: Vec<TemplateNode>,
}

impl TemplateTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: TemplateNode) {
        self.nodes.push(node);
    }

    pub fn with_node(mut self, node: TemplateNode) -> Self {
        self.push(node);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total number of nodes, nested ones included.
    pub fn node_count(&self) -> usize {
        fn count(nodes: &[TemplateNode]) -> usize {
            nodes
                .iter()
                .map(|n| match n {
                    TemplateNode::File(_) => 1,
                    TemplateNode::Directory(d) => 1 + count(&d.children),
                })
                .sum()
        }
        count(&self.nodes)
    }
}
