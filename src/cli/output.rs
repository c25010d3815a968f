//! CLI output: error mapping and report formatting.

use crate::build::BuildReport;
use crate::error::{ApiError, BuildError};

/// Map domain errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::Build(BuildError::Io { path, source }) => {
            format!("Build failed at {}: {}", path.display(), source)
        }
        other => other.to_string(),
    }
}

/// Human-readable build summary.
pub fn format_build_report(report: &BuildReport) -> String {
    format!(
        "Built {} folders, {} documents, {} apps ({} assets, {} skipped)\n\
         Shortcuts: {} link, {} startup\n\
         Manifest: {}\n\
         Took {} ms",
        report.folders,
        report.documents,
        report.apps,
        report.assets,
        report.skipped,
        report.links,
        report.startup,
        report.manifest_path.display(),
        report.duration.as_millis()
    )
}
