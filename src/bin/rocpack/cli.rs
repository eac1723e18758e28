//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell as CompletionShell;

use rocpack::util::shell::ColorChoice;
use rocpack::PackageFormat;

/// rocpack - Debian and RPM packages for ROCm releases
#[derive(Parser)]
#[command(name = "rocpack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,

    /// Config file (default: rocpack.toml in the work directory)
    #[arg(long, global = true, env = "ROCPACK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Package catalog (default: package.json)
    #[arg(long, global = true, env = "ROCPACK_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Directory holding downloads, artifacts and staging trees
    #[arg(long, global = true, env = "ROCPACK_WORK_DIR")]
    pub work_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build Debian and/or RPM packages
    Package(PackageArgs),

    /// Download and extract the artifacts packages need
    Fetch(FetchArgs),

    /// Show final package names and dependencies
    Resolve(ResolveArgs),

    /// Show the artifact paths that make up a package
    Select(SelectArgs),

    /// Remove staging trees (and with --all, fetched artifacts)
    Clean(CleanArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Release settings shared by commands that resolve packages.
#[derive(Args, Debug, Clone, Default)]
pub struct ReleaseArgs {
    /// ROCm release version [default: 9.9.9]
    #[arg(long, env = "ROCPACK_ROCM_VERSION")]
    pub rocm_version: Option<String>,

    /// Debian revision / RPM release [default: crdnnh]
    #[arg(long, env = "ROCPACK_VERSION_SUFFIX")]
    pub version_suffix: Option<String>,

    /// Base install directory [default: /opt/rocm]
    #[arg(long, env = "ROCPACK_INSTALL_PREFIX")]
    pub install_prefix: Option<String>,

    /// GPU architecture (e.g. gfx94X); taken from --artifact-url when omitted
    #[arg(long, env = "ROCPACK_GFX_ARCH")]
    pub gfx_arch: Option<String>,

    /// Artifact index URL of a CI build
    #[arg(long, env = "ROCPACK_ARTIFACT_URL")]
    pub artifact_url: Option<String>,

    /// Build the rpath variant of every package
    #[arg(long)]
    pub rpath_pkg: bool,
}

#[derive(Args)]
pub struct PackageArgs {
    #[command(flatten)]
    pub release: ReleaseArgs,

    /// Packages to build: names, `single` or `composite` (default: all)
    #[arg(long, num_args = 1..)]
    pub pkg_names: Vec<String>,

    /// Package format: deb or rpm (default: both)
    #[arg(long)]
    pub pkg_type: Option<PackageFormat>,

    /// Directory finished packages are moved into
    #[arg(long, env = "ROCPACK_DEST_DIR")]
    pub dest_dir: Option<PathBuf>,

    /// Remove staging trees before building
    #[arg(long)]
    pub clean_build: bool,

    /// Also remove downloaded and extracted artifacts before building
    #[arg(long)]
    pub clean_all: bool,

    /// Keep staging trees after the run
    #[arg(long)]
    pub keep_staging: bool,

    /// Use the artifacts already in the work directory
    #[arg(long)]
    pub no_fetch: bool,
}

#[derive(Args)]
pub struct FetchArgs {
    #[command(flatten)]
    pub release: ReleaseArgs,

    /// Packages whose artifacts to fetch: names, `single` or `composite`
    #[arg(long, num_args = 1..)]
    pub pkg_names: Vec<String>,
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Catalog package names
    #[arg(required = true)]
    pub names: Vec<String>,

    #[command(flatten)]
    pub release: ReleaseArgs,

    /// Only show names for this format
    #[arg(long)]
    pub pkg_type: Option<PackageFormat>,

    /// Also show translated dependencies
    #[arg(long)]
    pub depends: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct SelectArgs {
    /// Catalog package name
    pub name: String,

    #[command(flatten)]
    pub release: ReleaseArgs,

    /// Stage the selected paths into this directory
    #[arg(long, value_name = "DIR")]
    pub stage: Option<PathBuf>,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Also remove downloaded and extracted artifacts
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: CompletionShell,
}
