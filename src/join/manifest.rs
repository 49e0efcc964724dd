use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{JumpcutError, Result};
use crate::segment::ConvertedName;

/// Collect converted segment files in play order.
///
/// Only names of the form `converted-NNNN-(silence|norm).mp4` are taken.
/// Paths are made absolute and sorted as strings; the zero-padded index
/// makes that order chronological.
pub fn collect_converted(converted_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for entry in fs::read_dir(converted_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if ConvertedName::parse(&name.to_string_lossy()).is_none() {
            debug!("Skipping {:?} in {}", name, converted_dir.display());
            continue;
        }
        paths.push(std::path::absolute(entry.path())?);
    }

    sort_for_concat(&mut paths);
    Ok(paths)
}

/// Sort by the path string.
pub fn sort_for_concat(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| a.to_string_lossy().cmp(&b.to_string_lossy()));
}

/// One `file '<path>'` line per entry, in the given order.
pub fn render_manifest(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("file '{}'\n", escape_concat_path(&p.to_string_lossy())))
        .collect()
}

/// Write the concat-demuxer manifest for the converted segments.
pub fn write_manifest(converted_dir: &Path, manifest: &Path) -> Result<Vec<PathBuf>> {
    let paths = collect_converted(converted_dir)?;
    if paths.is_empty() {
        return Err(JumpcutError::FileNotFound(format!(
            "no converted segments in {}",
            converted_dir.display()
        )));
    }

    if manifest.exists() {
        fs::remove_file(manifest)?;
    }
    fs::write(manifest, render_manifest(&paths))?;

    debug!("Wrote {} entries to {}", paths.len(), manifest.display());
    Ok(paths)
}

/// Quote a path for the single-quoted concat `file` directive.
fn escape_concat_path(path: &str) -> String {
    path.replace('\'', r"'\''")
}
