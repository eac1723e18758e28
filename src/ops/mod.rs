//! High-level operations.
//!
//! This module contains the implementation of rocpack commands.

pub mod assemble;
pub mod clean;
pub mod deb;
pub mod fetch;
pub mod package;
pub mod rpm;
pub mod select;

pub use assemble::{prefix_dir, stage_package, StageReport};
pub use clean::{clean, clean_staging};
pub use deb::create_deb_package;
pub use fetch::{
    artifact_base_url, build_id_from_url, fetch_artifacts, gfx_arch_from_url, plan_fetch,
    FetchReport,
};
pub use package::{
    run_packaging, select_packages, Outcome, PackageOptions, PackageOutcome, PackageSelection,
    PackagerTools, PackagingEnv, RunReport,
};
pub use rpm::create_rpm_package;
pub use select::select_artifact_dirs;
