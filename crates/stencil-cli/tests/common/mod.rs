//! Template fixtures shared by the end-to-end tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use assert_cmd::Command;
use tempfile::TempDir;

pub const MANIFEST: &str = r#"
[stencil]
name = "{{ project }}"
description = "Python project"

[[arguments]]
key = "project"
default = "my_project"

[[arguments]]
key = "arg0"
default = "0"
"#;

pub const README_A: &str = "# {{ project_name }} Documentation\n\nA\nB\nC\n";
pub const README_B: &str = "# {{ project_name }} Documentation\n\nA\nX\nC\n";
pub const PYPROJECT: &str = "[project]\nname = {{ project_name }}\n";
pub const SETTINGS: &str = "ARG0 = {{ arg0 | literal }}\nRAW = {{ arg0 }}\n";
/// Not a `.jinja` file, so copied as-is.
pub const NOTES: &str = "Rendered files end in .jinja; {{ project_name }} stays here.\n";

/// A workspace holding `tmplA`, `tmplB` and (once initialised) `out`.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let ws = Self { dir };

        for (template, readme) in [("tmplA", README_A), ("tmplB", README_B)] {
            ws.write(&format!("{template}/stencil.toml"), MANIFEST);
            ws.write(&format!("{template}/README.md.jinja"), readme);
            ws.write(&format!("{template}/pyproject.toml.jinja"), PYPROJECT);
            ws.write(&format!("{template}/NOTES.txt"), NOTES);
            ws.write(&format!("{template}/{{{{ project_name }}}}/__init__.py"), "");
            ws.write(
                &format!("{template}/{{{{ project_name }}}}/settings.py.jinja"),
                SETTINGS,
            );
        }
        ws.write("tmplB/x/y.py.jinja", "print({{ arg0 | literal }})\n");

        ws
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, rel: &str, content: &str) {
        let full = self.path().join(rel);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, content).unwrap();
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path().join(rel)).unwrap()
    }

    /// `stencil` run from the workspace root with a clean environment.
    pub fn stencil(&self) -> Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("stencil");
        cmd.current_dir(self.path())
            .env_remove("RUST_LOG")
            .env_remove("STENCIL_REMOTE__MIRROR")
            .env("NO_COLOR", "1");
        cmd
    }

    /// Every file under `rel`, keyed by `/`-joined relative path.
    pub fn slurp(&self, rel: &str) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        collect(&self.path().join(rel), "", &mut out);
        out
    }
}

fn collect(dir: &Path, prefix: &str, out: &mut BTreeMap<String, String>) {
    for entry in fs::read_dir(dir).unwrap() {
        let entry = entry.unwrap();
        let name = entry.file_name().to_string_lossy().into_owned();
        let rel = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}/{name}")
        };
        if entry.file_type().unwrap().is_dir() {
            out.insert(format!("{rel}/"), String::new());
            collect(&entry.path(), &rel, out);
        } else {
            out.insert(rel, fs::read_to_string(entry.path()).unwrap());
        }
    }
}
