//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish the three
//! lifecycle operations: `init`, `plan` and `apply`.

pub mod init_service;
pub mod pipeline;
pub mod resolver;
pub mod sync_service;

pub use init_service::{InitReport, InitService};
pub use pipeline::{BindingLayers, Pipeline, ProjectName, Rendering};
pub use resolver::{ResolvedTemplate, SourceResolver};
pub use sync_service::{SyncReport, SyncService};

/// In-memory doubles shared by the service tests.
#[cfg(test)]
pub(crate) mod testing {
    use std::collections::{BTreeMap, BTreeSet};
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};

    use crate::application::ports::{
        Filesystem, MockDestinationReader, MockTemplateLoader, MockTemplateRenderer,
    };
    use crate::domain::{
        ArgumentDecl, DestinationTree, Manifest, RenderContext, RenderedEntry, RenderedTree,
        TemplateContent, TemplateNode, TemplateTree, validate_segment,
    };
    use crate::error::StencilResult;

    pub type Writes = Arc<Mutex<BTreeMap<PathBuf, Vec<u8>>>>;

    /// Filesystem that knows a fixed set of paths and records writes.
    #[derive(Default)]
    pub struct FakeFs {
        files: BTreeSet<PathBuf>,
        dirs: Mutex<BTreeSet<PathBuf>>,
        writes: Writes,
    }

    impl FakeFs {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_file(mut self, path: &str) -> Self {
            self.files.insert(PathBuf::from(path));
            self
        }

        pub fn with_dir(self, path: &str) -> Self {
            self.dirs.lock().unwrap().insert(PathBuf::from(path));
            self
        }

        pub fn writes(&self) -> Writes {
            Arc::clone(&self.writes)
        }
    }

    impl Filesystem for FakeFs {
        fn exists(&self, path: &Path) -> bool {
            self.is_file(path) || self.is_dir(path)
        }

        fn is_file(&self, path: &Path) -> bool {
            self.files.contains(path) || self.writes.lock().unwrap().contains_key(path)
        }

        fn is_dir(&self, path: &Path) -> bool {
            self.dirs.lock().unwrap().contains(path)
        }

        fn create_dir_all(&self, path: &Path) -> StencilResult<()> {
            self.dirs.lock().unwrap().insert(path.to_path_buf());
            Ok(())
        }

        fn write_file(&self, path: &Path, content: &[u8]) -> StencilResult<()> {
            self.writes
                .lock()
                .unwrap()
                .insert(path.to_path_buf(), content.to_vec());
            Ok(())
        }
    }

    pub fn loader_for(name: &str, args: Vec<ArgumentDecl>, tree: TemplateTree) -> MockTemplateLoader {
        let manifest = Manifest::new(name, None, args).unwrap();
        let mut loader = MockTemplateLoader::new();
        loader
            .expect_load_manifest()
            .returning(move |_| Ok(manifest.clone()));
        loader
            .expect_load_tree()
            .returning(move |_, _| Ok(tree.clone()));
        loader
    }

    /// Renders names and text through the context; no suffix handling.
    pub fn passthrough_renderer() -> MockTemplateRenderer {
        let mut renderer = MockTemplateRenderer::new();
        renderer.expect_render().returning(|tree, ctx| {
            let mut out = RenderedTree::new();
            walk(&tree.nodes, Path::new(""), ctx, &mut out)?;
            Ok(out)
        });
        renderer
    }

    fn walk(
        nodes: &[TemplateNode],
        base: &Path,
        ctx: &RenderContext,
        out: &mut RenderedTree,
    ) -> StencilResult<()> {
        for node in nodes {
            let name = ctx.render(node.name());
            validate_segment(node.name(), &name)?;
            let path = base.join(&name);
            match node {
                TemplateNode::Directory(dir) => {
                    out.insert(path.clone(), RenderedEntry::Directory)?;
                    walk(&dir.children, &path, ctx, out)?;
                }
                TemplateNode::File(file) => {
                    let bytes = match &file.content {
                        TemplateContent::Text(t) => ctx.render(t).into_bytes(),
                        TemplateContent::Binary(b) => b.clone(),
                    };
                    out.insert(path, RenderedEntry::file(bytes))?;
                }
            }
        }
        Ok(())
    }

    /// A reader that must never be asked; `init` has no destination yet.
    pub fn no_destination() -> MockDestinationReader {
        let mut reader = MockDestinationReader::new();
        reader.expect_read_entry().never();
        reader
    }

    pub fn destination_with(tree: DestinationTree) -> MockDestinationReader {
        let mut reader = MockDestinationReader::new();
        reader
            .expect_read_entry()
            .returning(move |_, path| Ok(tree.get(path).cloned()));
        reader
    }
}
