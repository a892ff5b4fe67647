//! Shared resolve → bind → render → diff pipeline.
//!
//! Both `init` and `plan`/`apply` run the same computation; they differ only
//! in where the binding layers and project name come from, and in whether
//! the destination already exists.
//!
//! The destination is only read at the paths the template renders; those
//! reads run in parallel. User content blocks found there are carried into
//! the rendering before the diff.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::{
    application::{
        ports::{DestinationReader, Filesystem, TemplateLoader, TemplateRenderer},
        services::resolver::SourceResolver,
    },
    domain::{
        ArgumentBinding, DestinationEntry, DestinationTree, Plan, PlanKind, RenderContext, RenderedTree,
        SourceDescriptor, bind, validate_segment,
    },
    error::StencilResult,
};

/// Inputs for the argument binder, lowest precedence first.
#[derive(Debug, Clone, Default)]
pub struct BindingLayers {
    pub persisted: BTreeMap<String, String>,
    pub cli: BTreeMap<String, String>,
    pub overrides: BTreeMap<String, String>,
}

/// Where the project name comes from.
#[derive(Debug, Clone)]
pub enum ProjectName {
    /// Render the manifest's name expression (at `init`).
    FromManifest,
    /// Use a name that is already known (from the config store).
    Fixed(String),
}

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct Rendering {
    pub project_name: String,
    pub binding: ArgumentBinding,
    /// The manifest's description of the template, if any.
    pub description: Option<String>,
    pub plan: Plan,
}

/// Template side of a run, before the destination is looked at.
struct Rendered {
    project_name: String,
    binding: ArgumentBinding,
    description: Option<String>,
    tree: RenderedTree,
}

/// The adapters every lifecycle operation needs.
pub struct Pipeline {
    resolver: SourceResolver,
    loader: Box<dyn TemplateLoader>,
    renderer: Box<dyn TemplateRenderer>,
    destination: Box<dyn DestinationReader>,
    filesystem: Box<dyn Filesystem>,
}

impl Pipeline {
    pub fn new(
        resolver: SourceResolver,
        loader: Box<dyn TemplateLoader>,
        renderer: Box<dyn TemplateRenderer>,
        destination: Box<dyn DestinationReader>,
        filesystem: Box<dyn Filesystem>,
    ) -> Self {
        Self {
            resolver,
            loader,
            renderer,
            destination,
            filesystem,
        }
    }

    pub fn filesystem(&self) -> &dyn Filesystem {
        self.filesystem.as_ref()
    }

    /// Render `source` and diff it against `dest`.
    ///
    /// `dest = None` diffs against an empty tree (nothing exists yet).
    #[instrument(skip_all, fields(source = %source))]
    pub fn compute(
        &self,
        source: &SourceDescriptor,
        dest: Option<&Path>,
        layers: &BindingLayers,
        name: &ProjectName,
    ) -> StencilResult<Rendering> {
        let mut rendered = self.render(source, layers, name)?;
        let snapshot = match dest {
            Some(root) => self.snapshot(root, &rendered.tree)?,
            None => DestinationTree::empty(),
        };

        let preserved = rendered.tree.preserve_user_content(&snapshot);
        if preserved > 0 {
            debug!(files = preserved, "user content carried over");
        }

        let plan = Plan::diff(&rendered.tree, &snapshot)?;
        info!(
            entries = plan.entries().len(),
            changes = plan.change_count(),
            "plan computed"
        );

        Ok(Rendering {
            project_name: rendered.project_name,
            binding: rendered.binding,
            description: rendered.description,
            plan,
        })
    }

    /// Read the destination at every rendered path, and nowhere else.
    fn snapshot(&self, root: &Path, rendered: &RenderedTree) -> StencilResult<DestinationTree> {
        let paths: Vec<&PathBuf> = rendered.iter().map(|(path, _)| path).collect();
        let found = paths
            .par_iter()
            .map(|path| -> StencilResult<Option<(PathBuf, DestinationEntry)>> {
                let entry = self.destination.read_entry(root, path)?;
                Ok(entry.map(|e| ((*path).clone(), e)))
            })
            .collect::<StencilResult<Vec<_>>>()?;

        let mut snapshot = DestinationTree::empty();
        for (path, entry) in found.into_iter().flatten() {
            snapshot.insert(path, entry);
        }
        debug!(read = paths.len(), existing = snapshot.len(), "destination read");
        Ok(snapshot)
    }

    fn render(
        &self,
        source: &SourceDescriptor,
        layers: &BindingLayers,
        name: &ProjectName,
    ) -> StencilResult<Rendered> {
        let resolved = self.resolver.resolve(source, self.filesystem.as_ref())?;
        let manifest = self.loader.load_manifest(&resolved.manifest_path)?;
        let tree = self
            .loader
            .load_tree(&resolved.root, &resolved.manifest_path)?;
        debug!(nodes = tree.node_count(), "template loaded");

        let binding = bind(&manifest, &layers.persisted, &layers.cli, &layers.overrides)?;
        let context = RenderContext::new(&binding);

        let project_name = match name {
            ProjectName::Fixed(n) => n.clone(),
            ProjectName::FromManifest => {
                let rendered = context.render(manifest.name());
                validate_segment(manifest.name(), &rendered)?;
                rendered
            }
        };
        debug!(project = %project_name, "project name resolved");

        let context = context.with_project_name(project_name.clone());
        let tree = self.renderer.render(&tree, &context)?;
        tree.check_reserved()?;

        Ok(Rendered {
            project_name,
            binding,
            description: manifest.description().map(str::to_string),
            tree,
        })
    }

    /// Write every change in `plan` under `root`.
    ///
    /// Directories are created in plan order first; file writes then run in
    /// parallel. The first failure aborts the rest and nothing is rolled back.
    #[instrument(skip_all, fields(root = %root.display()))]
    pub fn write_plan(&self, root: &Path, plan: &Plan) -> StencilResult<usize> {
        let fs = self.filesystem.as_ref();
        let mut files = Vec::new();

        for entry in plan.changes() {
            let path = root.join(&entry.path);
            match &entry.kind {
                PlanKind::NewDirectory => fs.create_dir_all(&path)?,
                PlanKind::NewEmptyFile => files.push((path, &[][..])),
                PlanKind::NewFile { contents } | PlanKind::ModifiedFile { contents, .. } => {
                    files.push((path, contents.as_slice()))
                }
                PlanKind::Unchanged => {}
            }
        }

        files.par_iter().try_for_each(|(path, contents)| {
            if let Some(parent) = path.parent() {
                fs.create_dir_all(parent)?;
            }
            fs.write_file(path, contents)
        })?;

        let written = plan.change_count();
        info!(written, "plan written");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{MockDestinationReader, MockTemplateFetcher};
    use crate::application::services::testing::{
        FakeFs, destination_with, loader_for, passthrough_renderer,
    };
    use crate::domain::{DomainError, FileSpec, TemplateNode, TemplateTree};
    use crate::error::StencilError;

    fn pipeline(tree: TemplateTree, destination: MockDestinationReader) -> Pipeline {
        Pipeline::new(
            SourceResolver::new(Box::new(MockTemplateFetcher::new())),
            Box::new(loader_for("demo", Vec::new(), tree)),
            Box::new(passthrough_renderer()),
            Box::new(destination),
            Box::new(FakeFs::new().with_dir("tmpl").with_file("tmpl/stencil.toml")),
        )
    }

    fn compute(pipeline: &Pipeline, dest: Option<&Path>) -> StencilResult<Rendering> {
        pipeline.compute(
            &"tmpl".parse::<SourceDescriptor>().unwrap(),
            dest,
            &BindingLayers::default(),
            &ProjectName::Fixed("demo".into()),
        )
    }

    fn text(name: &str, content: &str) -> TemplateNode {
        TemplateNode::File(FileSpec::text(name, content))
    }

    #[test]
    fn only_rendered_paths_are_read() {
        let tree = TemplateTree::new()
            .with_node(text("README.md", "# {{ project_name }}\n"))
            .with_node(text("setup.cfg", ""));

        let mut reader = MockDestinationReader::new();
        reader
            .expect_read_entry()
            .withf(|root, path| {
                root == Path::new("dest")
                    && (path == Path::new("README.md") || path == Path::new("setup.cfg"))
            })
            .times(2)
            .returning(|_, path| {
                Ok((path == Path::new("README.md"))
                    .then(|| DestinationEntry::File(b"# demo\n".to_vec())))
            });

        let rendering = compute(&pipeline(tree, reader), Some(Path::new("dest"))).unwrap();
        assert_eq!(rendering.plan.change_count(), 1);
        assert_eq!(rendering.plan.changes().next().unwrap().path, Path::new("setup.cfg"));
    }

    #[test]
    fn rendered_project_config_is_rejected() {
        let tree = TemplateTree::new().with_node(text(".stencil.toml", "[project]\n"));
        let err = compute(
            &pipeline(tree, destination_with(DestinationTree::empty())),
            Some(Path::new("dest")),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            StencilError::Domain(DomainError::ReservedPath { .. })
        ));
    }

    #[test]
    fn user_content_is_kept_from_destination() {
        let tree = TemplateTree::new().with_node(text(
            "main.py",
            "{{ user_content(\"body\") }}\nprint('v2')\n",
        ));
        let current = "# begin-user-content:body\nmine()\n# end-user-content:body\nprint('v1')\n";
        let destination = DestinationTree::empty()
            .with_entry("main.py", DestinationEntry::File(current.as_bytes().to_vec()));

        let rendering = compute(
            &pipeline(tree, destination_with(destination)),
            Some(Path::new("dest")),
        )
        .unwrap();

        let PlanKind::ModifiedFile { contents, diff } = &rendering.plan.entries()[0].kind else {
            panic!("expected modification");
        };
        assert_eq!(
            contents,
            b"# begin-user-content:body\nmine()\n# end-user-content:body\nprint('v2')\n"
        );
        assert_eq!(diff.lines.len(), 2);
    }
}
