use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{ExtractorError, ExtractorResult};
use crate::utils::FileUtils;

/// Result of a manifest write
#[derive(Debug, Clone)]
pub struct ManifestStats {
    pub path: PathBuf,
    pub entries: Vec<String>,
    pub file_size_bytes: u64,
}

/// Write `images` as a JSON array of paths relative to `project_root`.
///
/// Order is preserved and any existing manifest is replaced. Failures are
/// returned to the caller; nothing is written on a serialization error.
pub fn write_manifest(
    images: &[PathBuf],
    project_root: &Path,
    manifest_path: &Path,
) -> ExtractorResult<ManifestStats> {
    debug!("Writing {} manifest entries to {}", images.len(), manifest_path.display());

    let entries: Vec<String> = images
        .iter()
        .map(|path| FileUtils::relative_path(path, project_root))
        .collect();

    // serde_json's pretty printer indents with two spaces
    let json = serde_json::to_vec_pretty(&entries).map_err(|e| manifest_error(manifest_path, e))?;

    let file = File::create(manifest_path).map_err(|e| manifest_error(manifest_path, e))?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&json).map_err(|e| manifest_error(manifest_path, e))?;
    writer.flush().map_err(|e| manifest_error(manifest_path, e))?;

    let file_size_bytes = json.len() as u64;
    info!("Manifest written: {} entries, {} bytes", entries.len(), file_size_bytes);

    Ok(ManifestStats {
        path: manifest_path.to_path_buf(),
        entries,
        file_size_bytes,
    })
}

/// Read a manifest back as its list of relative paths
pub fn read_manifest(manifest_path: &Path) -> ExtractorResult<Vec<String>> {
    let file = File::open(manifest_path).map_err(|e| manifest_error(manifest_path, e))?;
    serde_json::from_reader(file).map_err(|e| manifest_error(manifest_path, e))
}

fn manifest_error(path: &Path, e: impl std::fmt::Display) -> ExtractorError {
    ExtractorError::Manifest {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_relative_and_ordered() {
        let root = tempfile::tempdir().unwrap();
        let out = root.path().join("img").join("products");
        std::fs::create_dir_all(&out).unwrap();

        let images = vec![out.join("b.jpg"), out.join("a.jpg")];
        let manifest_path = out.join("images.json");
        let stats = write_manifest(&images, root.path(), &manifest_path).unwrap();

        assert_eq!(stats.entries, vec!["img/products/b.jpg", "img/products/a.jpg"]);
        assert_eq!(read_manifest(&manifest_path).unwrap(), stats.entries);

        let contents = std::fs::read_to_string(&manifest_path).unwrap();
        assert_eq!(contents, "[\n  \"img/products/b.jpg\",\n  \"img/products/a.jpg\"\n]");
    }

    #[test]
    fn test_manifest_overwrites_previous_run() {
        let root = tempfile::tempdir().unwrap();
        let manifest_path = root.path().join("images.json");
        std::fs::write(&manifest_path, "[\"old.jpg\", \"older.jpg\"]").unwrap();

        write_manifest(&[root.path().join("new.jpg")], root.path(), &manifest_path).unwrap();
        assert_eq!(read_manifest(&manifest_path).unwrap(), vec!["new.jpg"]);
    }

    #[test]
    fn test_manifest_write_failure_is_reported() {
        let root = tempfile::tempdir().unwrap();
        let manifest_path = root.path().join("missing-dir").join("images.json");

        let err = write_manifest(&[], root.path(), &manifest_path).unwrap_err();
        assert!(matches!(err, ExtractorError::Manifest { .. }));
        assert!(!err.is_recoverable());
    }
}
