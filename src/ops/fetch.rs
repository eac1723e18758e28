//! Downloading and extracting build artifacts.
//!
//! CI publishes one archive per artifact directory next to an index page,
//! e.g. `https://therock-artifacts.s3.amazonaws.com/16418185899-linux/index-gfx94X-dcgpu.html`.
//! Archives are cached in the downloads directory and extracted into
//! `artifacts/<prefix>_<component>_<suffix>/`, where the selector expects
//! them. Existing downloads and extracted directories are reused.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{bail, Context, Result};
use regex::Regex;
use tracing::{debug, info};
use url::Url;
use xz2::read::XzDecoder;

use crate::core::artifact::artifact_dir_names;
use crate::core::catalog::Catalog;
use crate::core::errors::PackagingError;
use crate::util::context::RunContext;
use crate::util::fs::{ensure_dir, remove_dir_all_if_exists};
use crate::util::shell::{Shell, Status};

/// Extension of published artifact archives.
pub const ARCHIVE_EXTENSION: &str = "tar.xz";

static BUILD_ID: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"/(\d+)-linux/").ok());

/// CI build id from an artifact URL (`.../16418185899-linux/...`).
pub fn build_id_from_url(url: &str) -> Option<String> {
    let re = BUILD_ID.as_ref()?;
    re.captures(url).map(|caps| caps[1].to_string())
}

/// GPU architecture from the last path segment of an artifact URL.
///
/// `index-gfx94X-dcgpu.html` yields `gfx94X`.
pub fn gfx_arch_from_url(url: &str) -> Option<String> {
    let last = url.trim_end_matches('/').rsplit('/').next()?;
    last.split('-')
        .find(|part| part.contains("gfx"))
        .map(str::to_string)
}

/// Directory URL the archives are served from.
///
/// An index page URL is replaced by its directory; anything else is taken
/// to be the directory itself.
pub fn artifact_base_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).with_context(|| format!("invalid artifact URL: {url}"))?;
    if parsed.cannot_be_a_base() {
        bail!("artifact URL cannot be used as a base: {url}");
    }

    let is_page = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .map(|last| last.ends_with(".html"))
        .unwrap_or(false);

    if is_page {
        return parsed
            .join("./")
            .with_context(|| format!("invalid artifact URL: {url}"));
    }

    let mut base = parsed;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

/// Artifact directory names needed to package `packages`.
///
/// Composite packages contribute the artifacts of their includes. Each
/// directory appears once, in first-use order.
pub fn plan_fetch<S: AsRef<str>>(
    catalog: &Catalog,
    packages: &[S],
    gfx_arch: &str,
) -> Result<Vec<String>, PackagingError> {
    let mut planned = Vec::new();
    let mut seen_dirs = HashSet::new();
    let mut visited = HashSet::new();

    let mut pending: Vec<String> = packages.iter().rev().map(|p| p.as_ref().to_string()).collect();
    while let Some(name) = pending.pop() {
        if !visited.insert(name.clone()) {
            continue;
        }
        let pkg = catalog
            .get(&name)
            .ok_or_else(|| PackagingError::UnknownPackage { name: name.clone() })?;

        if let Some(includes) = pkg.includes() {
            pending.extend(includes.iter().rev().cloned());
            continue;
        }
        for dir in artifact_dir_names(pkg, gfx_arch) {
            if seen_dirs.insert(dir.clone()) {
                planned.push(dir);
            }
        }
    }

    Ok(planned)
}

/// What a fetch did.
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    pub downloaded: Vec<PathBuf>,
    pub extracted: Vec<PathBuf>,
    /// Artifact directories that were already extracted.
    pub reused: Vec<PathBuf>,
}

/// Download and extract each artifact directory in `dirs`.
///
/// Stops at the first failure; directories handled before it stay in place.
pub fn fetch_artifacts(
    ctx: &RunContext,
    base: &Url,
    dirs: &[String],
    shell: &Shell,
) -> Result<FetchReport> {
    let downloads = ctx.downloads_dir();
    let artifacts = ctx.artifacts_dir();
    ensure_dir(&downloads)?;
    ensure_dir(&artifacts)?;

    let mut report = FetchReport::default();
    for dir in dirs {
        let target = artifacts.join(dir);
        if target.is_dir() {
            debug!("already extracted: {}", target.display());
            report.reused.push(target);
            continue;
        }

        let archive_name = format!("{dir}.{ARCHIVE_EXTENSION}");
        let archive = downloads.join(&archive_name);
        if archive.is_file() {
            debug!("using cached {}", archive.display());
        } else {
            let url = base
                .join(&archive_name)
                .with_context(|| format!("invalid artifact name: {archive_name}"))?;
            shell.status(Status::Fetching, &url);
            download(&url, &archive, shell)?;
            report.downloaded.push(archive.clone());
        }

        shell.status(Status::Extracting, &archive_name);
        extract_archive(&archive, &target)?;
        report.extracted.push(target);
    }

    info!(
        "fetched {} archives, extracted {}, reused {}",
        report.downloaded.len(),
        report.extracted.len(),
        report.reused.len()
    );
    Ok(report)
}

fn download(url: &Url, dest: &Path, shell: &Shell) -> Result<()> {
    let mut response = reqwest::blocking::get(url.as_str())
        .with_context(|| format!("failed to download {url}"))?;

    if !response.status().is_success() {
        bail!("failed to download {}: HTTP {}", url, response.status());
    }

    let partial = dest.with_extension("part");
    let mut file = File::create(&partial)
        .with_context(|| format!("failed to create {}", partial.display()))?;
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut progress = shell.bytes_progress(name, response.content_length());

    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = response
            .read(&mut buf)
            .with_context(|| format!("failed to read response body from {url}"))?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n])
            .with_context(|| format!("failed to write {}", partial.display()))?;
        progress.inc(n as u64);
    }
    progress.finish();
    drop(file);

    fs::rename(&partial, dest)
        .with_context(|| format!("failed to move download into {}", dest.display()))?;
    debug!("downloaded {} bytes to {}", progress.position(), dest.display());
    Ok(())
}

/// Extract a `.tar.xz` archive into `dest`.
///
/// A failed extraction removes `dest` again so a later run starts over.
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<()> {
    let file =
        File::open(archive).with_context(|| format!("failed to open {}", archive.display()))?;
    ensure_dir(dest)?;

    let mut tar = tar::Archive::new(XzDecoder::new(file));
    tar.set_preserve_permissions(true);
    if let Err(err) = tar.unpack(dest) {
        remove_dir_all_if_exists(dest)?;
        return Err(err).with_context(|| {
            format!(
                "failed to extract {} into {}",
                archive.display(),
                dest.display()
            )
        });
    }
    Ok(())
}
