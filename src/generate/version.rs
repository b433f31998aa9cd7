//! Version-compatibility file.

use crate::core::package::PackageConfig;
use crate::directive::DirectiveSerializer;
use crate::generate::GenerateError;

/// Render `<Project>ConfigVersion` for `pkg` under its compatibility policy.
pub fn version_file(
    pkg: &PackageConfig,
    serializer: &dyn DirectiveSerializer,
) -> Result<String, GenerateError> {
    let version = pkg.semver()?;
    tracing::debug!("version {} ({})", version, pkg.compatibility);
    Ok(serializer.version_file(&version, pkg.compatibility))
}
