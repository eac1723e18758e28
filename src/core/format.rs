//! Target package formats.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Suffix marking a development package in the catalog.
pub const DEVEL_MARKER: &str = "-devel";

/// An OS-native package format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageFormat {
    /// Debian `.deb` built with `debuild`
    Deb,
    /// RPM built with `rpmbuild`
    Rpm,
}

impl PackageFormat {
    /// Every format, in the order packages are built.
    pub const ALL: [PackageFormat; 2] = [PackageFormat::Deb, PackageFormat::Rpm];

    pub fn as_str(&self) -> &'static str {
        match self {
            PackageFormat::Deb => "deb",
            PackageFormat::Rpm => "rpm",
        }
    }

    /// File extension of the produced packages.
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    /// This format's spelling of the development-package suffix.
    pub fn devel_marker(&self) -> &'static str {
        match self {
            PackageFormat::Deb => "-dev",
            PackageFormat::Rpm => DEVEL_MARKER,
        }
    }

    /// Rewrite the catalog's `-devel` spelling into this format's own.
    pub fn apply_devel_spelling(&self, name: &str) -> String {
        match self {
            PackageFormat::Deb => name.replace(DEVEL_MARKER, self.devel_marker()),
            PackageFormat::Rpm => name.to_string(),
        }
    }

    /// Expand an optional format selector: `None` means every format.
    pub fn selection(selected: Option<PackageFormat>) -> Vec<PackageFormat> {
        match selected {
            Some(format) => vec![format],
            None => Self::ALL.to_vec(),
        }
    }
}

impl fmt::Display for PackageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "deb" => Ok(PackageFormat::Deb),
            "rpm" => Ok(PackageFormat::Rpm),
            _ => Err(format!(
                "invalid package format '{}'; expected 'deb' or 'rpm'",
                s
            )),
        }
    }
}
