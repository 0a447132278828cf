use anyhow::Result;
use std::path::{Component, Path, PathBuf};

/// File utility functions
pub struct FileUtils;

impl FileUtils {
    /// Create directory if it doesn't exist; existing contents are untouched
    pub async fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        tokio::fs::create_dir_all(path).await?;
        Ok(())
    }

    /// Express `path` relative to `base`, walking up with `..` where the two diverge.
    ///
    /// Components are joined with `/` so the result is usable as a web path.
    pub fn relative_path<P: AsRef<Path>, B: AsRef<Path>>(path: P, base: B) -> String {
        let path: Vec<Component<'_>> = path.as_ref().components().collect();
        let base: Vec<Component<'_>> = base.as_ref().components().collect();

        let common = path
            .iter()
            .zip(base.iter())
            .take_while(|(a, b)| a == b)
            .count();

        let mut relative = PathBuf::new();
        for _ in common..base.len() {
            relative.push("..");
        }
        for component in &path[common..] {
            relative.push(component.as_os_str());
        }

        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ensure_dir_is_idempotent() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("img").join("products");

        FileUtils::ensure_dir(&dir).await.unwrap();
        std::fs::write(dir.join("keep.jpg"), b"jpeg").unwrap();
        FileUtils::ensure_dir(&dir).await.unwrap();

        assert!(dir.is_dir());
        assert_eq!(std::fs::read(dir.join("keep.jpg")).unwrap(), b"jpeg");
    }

    #[test]
    fn test_relative_path_below_base() {
        assert_eq!(
            FileUtils::relative_path("/site/img/products/a.jpg", "/site"),
            "img/products/a.jpg"
        );
    }

    #[test]
    fn test_relative_path_outside_base() {
        assert_eq!(
            FileUtils::relative_path("/data/img/a.jpg", "/site/www"),
            "../../data/img/a.jpg"
        );
    }
}
