//! Placeholder substitution renderer.
//!
//! Walks a [`TemplateTree`] depth-first. Every name segment goes through the
//! [`RenderContext`]; bodies only do for `.jinja` text files. Everything else
//! is copied byte for byte, `{{ }}` included.

use std::path::Path;

use stencil_core::{
    application::ports::TemplateRenderer,
    domain::{
        RenderContext, RenderedEntry, RenderedTree, TemplateContent, TemplateNode, TemplateTree,
        validate_segment,
    },
    error::StencilResult,
};
use tracing::{instrument, trace};

/// Suffix marking a file as a template; removed from the rendered name.
pub const TEMPLATE_SUFFIX: &str = ".jinja";

/// Simple renderer using basic variable substitution.
pub struct SimpleRenderer;

impl SimpleRenderer {
    /// Create a new simple renderer.
    pub fn new() -> Self {
        Self
    }
}

impl Default for SimpleRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer for SimpleRenderer {
    #[instrument(skip_all, fields(nodes = tree.node_count()))]
    fn render(&self, tree: &TemplateTree, context: &RenderContext) -> StencilResult<RenderedTree> {
        let mut rendered = RenderedTree::new();
        render_nodes(&tree.nodes, Path::new(""), context, &mut rendered)?;
        Ok(rendered)
    }
}

fn render_nodes(
    nodes: &[TemplateNode],
    parent: &Path,
    ctx: &RenderContext,
    out: &mut RenderedTree,
) -> StencilResult<()> {
    for node in nodes {
        match node {
            TemplateNode::Directory(dir) => {
                let (name, _) = render_name(&dir.name, ctx, false)?;
                let path = parent.join(name);
                trace!(path = %path.display(), "directory");
                out.insert(path.clone(), RenderedEntry::Directory)?;
                render_nodes(&dir.children, &path, ctx, out)?;
            }
            TemplateNode::File(file) => {
                let (name, is_template) = render_name(&file.name, ctx, true)?;
                let path = parent.join(name);
                let contents = match &file.content {
                    TemplateContent::Text(text) if is_template => ctx.render(text).into_bytes(),
                    TemplateContent::Text(text) => text.clone().into_bytes(),
                    TemplateContent::Binary(bytes) => bytes.clone(),
                };
                trace!(path = %path.display(), bytes = contents.len(), "file");
                out.insert(path, RenderedEntry::file(contents))?;
            }
        }
    }
    Ok(())
}

/// Rendered segment, and whether a file's `.jinja` suffix was removed.
fn render_name(
    template: &str,
    ctx: &RenderContext,
    is_file: bool,
) -> StencilResult<(String, bool)> {
    let mut name = ctx.render(template);
    let mut is_template = false;
    if is_file {
        if let Some(stripped) = name.strip_suffix(TEMPLATE_SUFFIX) {
            name = stripped.to_string();
            is_template = true;
        }
    }
    validate_segment(template, &name)?;
    Ok((name, is_template))
}
