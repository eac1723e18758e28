//! Configuration file support for rocpack.
//!
//! An optional `rocpack.toml` in the work directory (or the file passed with
//! `--config`) provides defaults for release settings, paths, and external
//! tools. Command-line values always take precedence.
//!
//! ```toml
//! [release]
//! rocm_version = "7.1.0"
//! version_suffix = "1234"
//! install_prefix = "/opt/rocm"
//! format = "deb"
//!
//! [paths]
//! catalog = "package.json"
//!
//! [tools]
//! rpath_tool = "./runpath_to_rpath.py"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default config file name, looked up in the work directory.
pub const CONFIG_FILE_NAME: &str = "rocpack.toml";

/// rocpack configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Release settings
    pub release: ReleaseConfig,

    /// File locations
    pub paths: PathsConfig,

    /// External tools
    pub tools: ToolsConfig,
}

/// Release-related defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
    /// ROCm release version (e.g. 7.1.0)
    pub rocm_version: Option<String>,

    /// Version suffix (Debian revision / RPM release)
    pub version_suffix: Option<String>,

    /// Base install prefix
    pub install_prefix: Option<String>,

    /// GPU architecture tag (e.g. gfx94X)
    pub gfx_arch: Option<String>,

    /// Package format to build (deb or rpm); both when unset
    pub format: Option<String>,
}

/// File locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Package catalog (package.json)
    pub catalog: Option<PathBuf>,

    /// Directory finished packages are moved into
    pub dest_dir: Option<PathBuf>,
}

/// External tool overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Path to debuild (default: found in PATH)
    pub debuild: Option<PathBuf>,

    /// Path to rpmbuild (default: found in PATH)
    pub rpmbuild: Option<PathBuf>,

    /// Tool that rewrites RUNPATH to RPATH in a staged tree
    pub rpath_tool: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        let Config {
            release,
            paths,
            tools,
        } = other;

        merge_opt(&mut self.release.rocm_version, release.rocm_version);
        merge_opt(&mut self.release.version_suffix, release.version_suffix);
        merge_opt(&mut self.release.install_prefix, release.install_prefix);
        merge_opt(&mut self.release.gfx_arch, release.gfx_arch);
        merge_opt(&mut self.release.format, release.format);

        merge_opt(&mut self.paths.catalog, paths.catalog);
        merge_opt(&mut self.paths.dest_dir, paths.dest_dir);

        merge_opt(&mut self.tools.debuild, tools.debuild);
        merge_opt(&mut self.tools.rpmbuild, tools.rpmbuild);
        merge_opt(&mut self.tools.rpath_tool, tools.rpath_tool);
    }
}

fn merge_opt<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_parse() {
        let toml = r#"
[release]
rocm_version = "7.1.0"
format = "rpm"

[paths]
catalog = "catalog/package.json"

[tools]
rpath_tool = "/usr/local/bin/runpath-to-rpath"
"#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.release.rocm_version.as_deref(), Some("7.1.0"));
        assert_eq!(config.release.format.as_deref(), Some("rpm"));
        assert!(config.release.version_suffix.is_none());
        assert_eq!(
            config.paths.catalog,
            Some(PathBuf::from("catalog/package.json"))
        );
        assert!(config.tools.debuild.is_none());
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        base.release.rocm_version = Some("7.0.0".to_string());
        base.release.version_suffix = Some("base".to_string());

        let mut other = Config::default();
        other.release.rocm_version = Some("7.1.0".to_string());

        base.merge(other);

        assert_eq!(base.release.rocm_version.as_deref(), Some("7.1.0"));
        assert_eq!(base.release.version_suffix.as_deref(), Some("base"));
    }

    #[test]
    fn test_load_or_default() {
        let tmp = TempDir::new().unwrap();
        let missing = Config::load_or_default(&tmp.path().join(CONFIG_FILE_NAME));
        assert!(missing.release.rocm_version.is_none());

        let path = tmp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[release]\ngfx_arch = \"gfx1201\"\n").unwrap();
        let config = Config::load_or_default(&path);
        assert_eq!(config.release.gfx_arch.as_deref(), Some("gfx1201"));
    }
}
