//! Command implementations

pub mod clean;
pub mod completions;
pub mod fetch;
pub mod package;
pub mod resolve;
pub mod select;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::debug;

use crate::cli::{GlobalArgs, ReleaseArgs};
use rocpack::core::build_config::{
    BuildConfig, DEFAULT_INSTALL_PREFIX, DEFAULT_ROCM_VERSION, DEFAULT_VERSION_SUFFIX,
};
use rocpack::ops::fetch::gfx_arch_from_url;
use rocpack::util::config::{Config, ReleaseConfig, CONFIG_FILE_NAME};
use rocpack::util::Shell;
use rocpack::Catalog;

/// Catalog file used when neither the CLI nor the config names one.
const DEFAULT_CATALOG: &str = "package.json";

/// Settings every command starts from.
pub struct Session {
    pub shell: Shell,
    pub config: Config,
    pub work_dir: PathBuf,
}

impl Session {
    pub fn new(global: &GlobalArgs) -> Result<Self> {
        let shell = Shell::from_flags(global.quiet, global.verbose, global.color);

        let work_dir = match &global.work_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().context("failed to get current directory")?,
        };

        // an explicit config file must load; the implicit one is optional
        let config = match &global.config {
            Some(path) => Config::load(path)?,
            None => Config::load_or_default(&work_dir.join(CONFIG_FILE_NAME)),
        };

        Ok(Session {
            shell,
            config,
            work_dir,
        })
    }

    /// Catalog path: `--catalog`, then the config file, then `package.json`
    /// in the work directory.
    pub fn catalog_path(&self, global: &GlobalArgs) -> PathBuf {
        global.catalog.clone().unwrap_or_else(|| {
            let configured = self.config.paths.catalog.as_deref();
            self.work_path(configured.unwrap_or(Path::new(DEFAULT_CATALOG)))
        })
    }

    /// Destination directory: `--dest-dir`, then the config file.
    pub fn dest_dir(&self, cli: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = cli {
            return Ok(dir.to_path_buf());
        }
        match &self.config.paths.dest_dir {
            Some(dir) => Ok(self.work_path(dir)),
            None => bail!("no destination directory: pass --dest-dir or set paths.dest_dir"),
        }
    }

    pub fn load_catalog(&self, global: &GlobalArgs) -> Result<Catalog> {
        let path = self.catalog_path(global);
        let catalog = Catalog::load(&path)?;
        debug!("loaded {} packages from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Release settings: CLI values merged over the config file.
    ///
    /// A GPU architecture parsed from `--artifact-url` counts as a CLI value.
    pub fn release_settings(&self, release: &ReleaseArgs) -> ReleaseConfig {
        let gfx_arch = release
            .gfx_arch
            .clone()
            .or_else(|| release.artifact_url.as_deref().and_then(gfx_arch_from_url));

        let mut merged = self.config.clone();
        merged.merge(Config {
            release: ReleaseConfig {
                rocm_version: release.rocm_version.clone(),
                version_suffix: release.version_suffix.clone(),
                install_prefix: release.install_prefix.clone(),
                gfx_arch,
                format: None,
            },
            ..Config::default()
        });
        merged.release
    }

    /// Build configuration from CLI values over config values over defaults.
    pub fn build_config(&self, release: &ReleaseArgs) -> Result<BuildConfig> {
        let settings = self.release_settings(release);

        let Some(gfx_arch) = settings.gfx_arch else {
            bail!("GPU architecture unknown: pass --gfx-arch or --artifact-url");
        };
        let version = settings
            .rocm_version
            .as_deref()
            .unwrap_or(DEFAULT_ROCM_VERSION);

        let cfg = BuildConfig::new(version, gfx_arch)?
            .with_version_suffix(
                settings
                    .version_suffix
                    .as_deref()
                    .unwrap_or(DEFAULT_VERSION_SUFFIX),
            )
            .with_install_prefix(
                settings
                    .install_prefix
                    .as_deref()
                    .unwrap_or(DEFAULT_INSTALL_PREFIX),
            )
            .with_rpath(release.rpath_pkg);
        debug!("{:?}", cfg);
        Ok(cfg)
    }

    /// Resolve a path relative to the work directory.
    pub fn work_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.work_dir.join(path)
        }
    }
}
