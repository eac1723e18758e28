//! Error types for catalog loading and package resolution.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error while loading the package catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed catalog{}", location(path))]
    Parse {
        path: Option<PathBuf>,
        #[source]
        source: serde_json::Error,
    },

    #[error("package `{name}` is defined more than once")]
    DuplicatePackage { name: String },

    #[error("package `{name}` lists components but has no `Artifact` prefix")]
    MissingArtifactPrefix { name: String },
}

fn location(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => format!(": {}", path.display()),
        None => String::new(),
    }
}

/// Error while resolving, selecting, or packaging a single package.
///
/// None of these abort a run: the package that raised it is marked failed
/// and the remaining packages are still attempted.
#[derive(Debug, Error)]
pub enum PackagingError {
    #[error("package not found in catalog: `{name}`")]
    UnknownPackage { name: String },

    #[error("cyclic `Includes` detected: {}", cycle.join(" -> "))]
    IncludeCycle { cycle: Vec<String> },

    #[error("failed to read artifact manifest: {}", path.display())]
    MissingManifest {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid ROCm version `{version}`: `{component}` is not a number")]
    InvalidVersion { version: String, component: String },

    #[error("package `{name}` has no `{field}`")]
    MissingMetadata { name: String, field: &'static str },

    #[error("`{tool}` {}", describe_exit(.code))]
    ExternalTool {
        tool: String,
        code: Option<i32>,
        output: String,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("failed with exit code {code}"),
        None => "was killed by a signal".to_string(),
    }
}

impl PackagingError {
    /// Captured output of a failed external tool, if any.
    pub fn tool_output(&self) -> Option<&str> {
        match self {
            PackagingError::ExternalTool { output, .. } => Some(output),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_include_cycle_message() {
        let err = PackagingError::IncludeCycle {
            cycle: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "cyclic `Includes` detected: a -> b -> a");
    }

    #[test]
    fn test_tool_output() {
        let err = PackagingError::ExternalTool {
            tool: "debuild".into(),
            code: Some(2),
            output: "dpkg-buildpackage: error".into(),
        };
        assert_eq!(err.tool_output(), Some("dpkg-buildpackage: error"));
        assert_eq!(err.to_string(), "`debuild` failed with exit code 2");

        let err = PackagingError::ExternalTool {
            tool: "rpmbuild".into(),
            code: None,
            output: String::new(),
        };
        assert_eq!(err.to_string(), "`rpmbuild` was killed by a signal");

        let err = PackagingError::UnknownPackage { name: "x".into() };
        assert!(err.tool_output().is_none());
    }
}
