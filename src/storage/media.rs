//! Directory-backed media uploader.
//!
//! Stands in for the cloud media host when products are created locally.
//! Files land under `<root>/<models|images>/<uuid>-<name>` and the returned
//! URL is a `file:` URL that host commands can open from the plugin's
//! working directory.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::catalog::submission::{MediaFile, MediaKind, MediaUploader};
use crate::domain::error::{MedshelfError, Result};
use crate::infrastructure::host_relative;

#[derive(Debug, Clone)]
pub struct DirectoryMediaStore {
    root: PathBuf,
    /// Files written by this store, keyed by the URL handed out for them.
    written: BTreeMap<String, PathBuf>,
}

impl DirectoryMediaStore {
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self {
            root,
            written: BTreeMap::new(),
        }
    }
}

/// Keeps only characters that are safe in a file name.
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

impl MediaUploader for DirectoryMediaStore {
    fn upload(&mut self, file: &MediaFile, kind: MediaKind) -> Result<String> {
        let _span = tracing::debug_span!("media_upload",
            file_name = %file.file_name,
            kind = ?kind,
            bytes = file.bytes.len()
        )
        .entered();

        if file.bytes.is_empty() {
            return Err(MedshelfError::Upload(format!("{} is empty", file.file_name)));
        }

        let dir = self.root.join(kind.folder());
        std::fs::create_dir_all(&dir)?;

        let target = dir.join(format!(
            "{}-{}",
            uuid::Uuid::new_v4().simple(),
            sanitize_file_name(&file.file_name)
        ));
        std::fs::write(&target, &file.bytes)
            .map_err(|e| MedshelfError::Upload(format!("{}: {e}", file.file_name)))?;

        tracing::debug!(target = ?target, "media stored");
        let url = format!("file:{}", host_relative(&target));
        self.written.insert(url.clone(), target);
        Ok(url)
    }

    fn discard(&mut self, url: &str) -> Result<()> {
        let Some(path) = self.written.remove(url) else {
            return Ok(());
        };
        tracing::debug!(path = ?path, "discarding media");
        match std::fs::remove_file(&path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("left femur (v2).stl"), "left_femur__v2_.stl");
        assert_eq!(sanitize_file_name("..."), "upload");
    }

    #[test]
    fn uploads_are_written_by_kind() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DirectoryMediaStore::new(dir.path().to_path_buf());
        let url = store
            .upload(&MediaFile::new("heart.obj", b"v 0 0 0".to_vec()), MediaKind::Raw)
            .unwrap();
        assert!(url.starts_with("file:"));
        assert!(url.ends_with("-heart.obj"));

        let written: Vec<_> = std::fs::read_dir(dir.path().join("models")).unwrap().collect();
        assert_eq!(written.len(), 1);
    }

    #[test]
    fn discard_removes_only_own_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DirectoryMediaStore::new(dir.path().to_path_buf());
        let url = store
            .upload(&MediaFile::new("skull.stl", b"solid skull".to_vec()), MediaKind::Raw)
            .unwrap();

        store.discard("file:elsewhere/skull.stl").unwrap();
        assert_eq!(std::fs::read_dir(dir.path().join("models")).unwrap().count(), 1);

        store.discard(&url).unwrap();
        assert_eq!(std::fs::read_dir(dir.path().join("models")).unwrap().count(), 0);
        store.discard(&url).unwrap();
    }

    #[test]
    fn empty_files_fail() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DirectoryMediaStore::new(dir.path().to_path_buf());
        let err = store
            .upload(&MediaFile::new("blank.png", Vec::new()), MediaKind::Image)
            .unwrap_err();
        assert!(matches!(err, MedshelfError::Upload(_)));
    }
}
