//! TOML-backed config store for `<project>/.stencil.toml`.
//!
//! One type implements both halves of the store; the CLI hands the writer
//! half to `init` only.

use std::io;
use std::path::Path;

use stencil_core::{
    application::{
        ApplicationError,
        ports::{ConfigReader, ConfigWriter},
    },
    domain::{CONFIG_FILE, DomainError, ProjectConfig},
    error::{StencilError, StencilResult},
};
use tracing::{debug, instrument};

use crate::filesystem::map_io_error;

#[derive(Debug, Default, Clone, Copy)]
pub struct TomlConfigStore;

impl TomlConfigStore {
    pub fn new() -> Self {
        Self
    }
}

impl ConfigReader for TomlConfigStore {
    #[instrument(skip(self), fields(root = %project_root.display()))]
    fn read(&self, project_root: &Path) -> StencilResult<ProjectConfig> {
        let path = project_root.join(CONFIG_FILE);
        let raw = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                StencilError::from(ApplicationError::ConfigMissing { path: path.clone() })
            }
            _ => map_io_error(&path, e, "read config"),
        })?;

        let config: ProjectConfig = toml::from_str(&raw).map_err(|e| {
            DomainError::InvalidConfig(format!("failed to parse '{}': {e}", path.display()))
        })?;
        config.validate()?;

        debug!(name = %config.project.name, src = %config.project.src, "config read");
        Ok(config)
    }
}

impl ConfigWriter for TomlConfigStore {
    #[instrument(skip(self, config), fields(root = %project_root.display()))]
    fn write(&self, project_root: &Path, config: &ProjectConfig) -> StencilResult<()> {
        config.validate()?;
        let path = project_root.join(CONFIG_FILE);
        let text = toml::to_string(config).map_err(|e| StencilError::Internal {
            message: format!("failed to serialize config: {e}"),
        })?;
        std::fs::write(&path, text).map_err(|e| map_io_error(&path, e, "write config"))?;
        debug!(path = %path.display(), "config written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::fs;

    use super::*;
    use tempfile::TempDir;

    #[test]
    fn written_config_reads_back() {
        let temp = TempDir::new().unwrap();
        let config = ProjectConfig::new(
            "my_project",
            "gh://acme/templates/python",
            BTreeMap::from([("arg0".to_string(), "0".to_string())]),
        );
        let store = TomlConfigStore::new();

        store.write(temp.path(), &config).unwrap();
        let text = fs::read_to_string(temp.path().join(CONFIG_FILE)).unwrap();
        assert!(text.starts_with("[stencil]\nversion = \"1\"\n"));
        assert!(text.contains("[project]\nname = \"my_project\"\n"));

        assert_eq!(store.read(temp.path()).unwrap(), config);
    }

    #[test]
    fn missing_file_is_config_missing() {
        let temp = TempDir::new().unwrap();
        let err = TomlConfigStore::new().read(temp.path()).unwrap_err();
        assert!(matches!(
            err,
            StencilError::Application(ApplicationError::ConfigMissing { .. })
        ));
    }

    #[test]
    fn wrong_version_is_invalid_config() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE),
            "[stencil]\nversion = \"9\"\n\n[project]\nname = \"p\"\nsrc = \"s\"\n",
        )
        .unwrap();
        let err = TomlConfigStore::new().read(temp.path()).unwrap_err();
        assert!(matches!(
            err,
            StencilError::Domain(DomainError::InvalidConfig(_))
        ));
    }

    #[test]
    fn garbage_is_invalid_config() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), "not = [toml").unwrap();
        assert!(matches!(
            TomlConfigStore::new().read(temp.path()),
            Err(StencilError::Domain(DomainError::InvalidConfig(_)))
        ));
    }
}
