//! Test fixtures for packaging scenarios.
//!
//! [`PackagingFixture`] builds a small catalog plus matching extracted
//! artifact directories in a temporary work directory:
//!
//! | package     | kind                      | artifact                       |
//! |-------------|---------------------------|--------------------------------|
//! | `hip`       | gfx-sensitive runtime     | `core-hip_lib_gfx94X-dcgpu`    |
//! | `hip-devel` | gfx-sensitive headers     | `core-hip_dev_gfx94X-dcgpu`    |
//! | `rocm-core` | generic                   | `base_lib_generic`             |
//! | `rocm`      | composite of hip + core   |                                |
//! | `broken`    | manifest never fetched    | `missing_lib_generic`          |
//! | `legacy`    | packaging disabled        | `base_lib_generic`             |

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use crate::core::artifact::MANIFEST_FILE_NAME;
use crate::core::build_config::BuildConfig;
use crate::core::catalog::Catalog;
use crate::util::context::RunContext;

/// Catalog JSON used by [`PackagingFixture`].
pub const FIXTURE_CATALOG: &str = r#"[
    {
        "Package": "hip",
        "Artifact": "core-hip",
        "Components": ["lib"],
        "Gfxarch": "True",
        "DEBDepends": ["rocm-core", "libc6"],
        "RPMRequires": ["rocm-core"],
        "RPMRecommends": ["hip-devel"],
        "Maintainer": "ROCm Dev Support <rocm-dev.support@amd.com>",
        "Description": "HIP runtime\nRuntime libraries for HIP.",
        "Homepage": "https://github.com/ROCm/TheRock",
        "License": "MIT",
        "Vendor": "Advanced Micro Devices, Inc.",
        "Group": "System Environment/Libraries",
        "Section": "devel",
        "Priority": "optional",
        "Architecture": "amd64",
        "BuildArch": "x86_64"
    },
    {
        "Package": "hip-devel",
        "Artifact": "core-hip",
        "Components": ["dev"],
        "Gfxarch": "True",
        "DEBDepends": ["hip"],
        "RPMRequires": ["hip"],
        "Maintainer": "ROCm Dev Support <rocm-dev.support@amd.com>",
        "Description": "HIP headers",
        "License": "MIT",
        "Disable_DWZ": "True"
    },
    {
        "Package": "rocm-core",
        "Artifact": "base",
        "Components": ["lib"],
        "Maintainer": "ROCm Dev Support <rocm-dev.support@amd.com>",
        "Description": "ROCm core",
        "License": "MIT"
    },
    {
        "Package": "rocm",
        "Includes": ["hip", "rocm-core"],
        "Composite": "True",
        "DEBDepends": ["libc6"],
        "Maintainer": "ROCm Dev Support <rocm-dev.support@amd.com>",
        "Description": "ROCm meta package",
        "License": "MIT"
    },
    {
        "Package": "broken",
        "Artifact": "missing",
        "Components": ["lib"],
        "Maintainer": "ROCm Dev Support <rocm-dev.support@amd.com>",
        "Description": "Never fetched",
        "License": "MIT"
    },
    {
        "Package": "legacy",
        "Artifact": "base",
        "Components": ["lib"],
        "DisablePackaging": true
    }
]"#;

/// A temporary work directory with a catalog and extracted artifacts.
#[derive(Debug)]
pub struct PackagingFixture {
    pub tmp: TempDir,
    pub catalog: Catalog,
    pub cfg: BuildConfig,
}

impl PackagingFixture {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let catalog = Catalog::from_json_str(FIXTURE_CATALOG).expect("fixture catalog");
        let cfg = BuildConfig::new("7.1.0", "gfx94X").expect("fixture config");

        let fixture = PackagingFixture { tmp, catalog, cfg };
        fixture.write_artifacts();
        fixture
    }

    /// Run context rooted at `<tmp>/work`, delivering into `<tmp>/out`.
    pub fn ctx(&self) -> RunContext {
        RunContext::new(self.tmp.path().join("work"), self.tmp.path().join("out"))
    }

    fn write_artifacts(&self) {
        let root = self.ctx().artifacts_dir();

        artifact(
            &root.join("core-hip_lib_gfx94X-dcgpu"),
            &["hip/lib"],
            &[("hip/lib/lib/libamdhip64.so", "elf")],
        );
        artifact(
            &root.join("core-hip_dev_gfx94X-dcgpu"),
            &["hip-devel/include"],
            &[("hip-devel/include/include/hip/hip_runtime.h", "#pragma once")],
        );
        artifact(
            &root.join("base_lib_generic"),
            &["rocm-core/lib"],
            &[("rocm-core/lib/lib/librocm-core.so", "elf")],
        );
    }
}

impl Default for PackagingFixture {
    fn default() -> Self {
        Self::new()
    }
}

fn artifact(dir: &Path, manifest: &[&str], files: &[(&str, &str)]) {
    for (rel, contents) in files {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().expect("file has a parent")).expect("create dir");
        fs::write(&path, contents).expect("write artifact file");
    }
    fs::write(dir.join(MANIFEST_FILE_NAME), manifest.join("\n")).expect("write manifest");
}
