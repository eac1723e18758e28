//! ROCm release version helpers.

use crate::core::errors::PackagingError;

/// Convert a dotted ROCm version into its packed numeric form.
///
/// The major component is written as-is, minor and patch are zero-padded to
/// two digits. Missing components count as zero and anything past the patch
/// level is ignored:
///
/// | version   | number   |
/// |-----------|----------|
/// | `7.1.0`   | `70100`  |
/// | `7.10.0`  | `71000`  |
/// | `10.1.0`  | `100100` |
/// | `7.1`     | `70100`  |
/// | `7.1.1.1` | `70101`  |
pub fn version_to_number(version: &str) -> Result<String, PackagingError> {
    let mut parts = [0u32; 3];

    for (slot, component) in parts.iter_mut().zip(version.split('.')) {
        *slot = component
            .trim()
            .parse()
            .map_err(|_| PackagingError::InvalidVersion {
                version: version.to_string(),
                component: component.to_string(),
            })?;
    }

    let [major, minor, patch] = parts;
    Ok(format!("{major}{minor:02}{patch:02}"))
}
