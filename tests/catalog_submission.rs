//! Creating products against the local store and media directory.

use medshelf::catalog::{
    create_product, MediaFile, MediaKind, MediaUploader, ProductDraft, ProductStore,
    ProductSubmission,
};
use medshelf::domain::{ModelStatus, ProductRecord};
use medshelf::storage::{DirectoryMediaStore, JsonStorage, Storage};
use medshelf::{MedshelfError, Result};

/// Counts uploads and fails after `fail_after` of them.
struct FlakyUploader {
    uploads: usize,
    fail_after: usize,
}

impl MediaUploader for FlakyUploader {
    fn upload(&mut self, file: &MediaFile, _kind: MediaKind) -> Result<String> {
        if self.uploads >= self.fail_after {
            return Err(MedshelfError::Upload(format!("{} rejected", file.file_name)));
        }
        self.uploads += 1;
        Ok(format!("https://media.example.org/{}", file.file_name))
    }
}

/// Rejects every record.
struct ReadOnlyStore;

impl ProductStore for ReadOnlyStore {
    fn create(&mut self, _record: ProductRecord) -> Result<ProductRecord> {
        Err(MedshelfError::Storage("catalog is read-only".to_string()))
    }
}

fn storage(dir: &tempfile::TempDir) -> JsonStorage {
    JsonStorage::new(dir.path().join("catalog.json")).unwrap()
}

fn submission(title: &str) -> ProductSubmission {
    ProductSubmission {
        title: title.to_string(),
        author: Some("Dr. Osei".to_string()),
        username: Some("osei".to_string()),
        category: Some("Cardiology".to_string()),
        tags: Some(" heart, valve ,, ".to_string()),
        model_file: Some(MediaFile::new("valve.stl", b"solid valve".to_vec())),
        images: vec![
            MediaFile::new("front.png", vec![1, 2, 3]),
            MediaFile::new("side.png", vec![4, 5, 6]),
        ],
        ..ProductSubmission::default()
    }
}

#[test]
fn missing_title_uploads_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = storage(&dir);
    let mut uploader = FlakyUploader {
        uploads: 0,
        fail_after: usize::MAX,
    };

    let response = create_product(submission("   "), &mut uploader, &mut store);

    assert!(!response.success);
    assert_eq!(
        response.message.as_deref(),
        Some("Missing required field: title")
    );
    assert_eq!(uploader.uploads, 0);
    assert!(store.get_all_products().unwrap().is_empty());
}

#[test]
fn failed_upload_writes_no_record() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = storage(&dir);
    let mut uploader = FlakyUploader {
        uploads: 0,
        fail_after: 2,
    };

    let response = create_product(submission("Mitral Valve"), &mut uploader, &mut store);

    assert!(!response.success);
    assert!(response.model.is_none());
    assert!(response.message.unwrap_or_default().contains("side.png"));
    assert!(store.get_all_products().unwrap().is_empty());
}

#[test]
fn created_record_awaits_review_with_zero_counters() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = storage(&dir);
    let mut uploader = FlakyUploader {
        uploads: 0,
        fail_after: usize::MAX,
    };

    let response = create_product(submission("Mitral Valve"), &mut uploader, &mut store);
    assert!(response.success);
    let model = response.model.unwrap();

    assert_eq!(model.status, ModelStatus::Verification);
    assert_eq!((model.likes, model.downloads, model.shares), (0, 0, 0));
    assert!(model.published_date.is_none());
    assert!(uuid::Uuid::parse_str(&model.id).is_ok());
    assert!(chrono::DateTime::parse_from_rfc3339(&model.created_at).is_ok());
    assert_eq!(model.tags, ["heart", "valve"]);
    assert_eq!(model.model_url, "https://media.example.org/valve.stl");
    assert_eq!(model.preview_image, "https://media.example.org/front.png");
    assert_eq!(model.images.len(), 2);

    let stored = store.get_product(&model.id).unwrap();
    assert_eq!(stored.as_ref(), Some(&model));
}

#[test]
fn piped_draft_lands_in_the_media_directory() {
    let dir = tempfile::tempdir().unwrap();
    let scan = dir.path().join("femur.stl");
    std::fs::write(&scan, b"solid femur").unwrap();

    let draft: ProductDraft = serde_json::from_str(&format!(
        r#"{{"title": "Left Femur", "tags": "bone", "modelFile": "{}"}}"#,
        scan.display()
    ))
    .unwrap();
    let submission = draft
        .load(|path| {
            let bytes = std::fs::read(path)?;
            Ok(MediaFile::new(path, bytes))
        })
        .unwrap();

    let mut store = storage(&dir);
    let mut media = DirectoryMediaStore::new(dir.path().join("media"));
    let response = create_product(submission, &mut media, &mut store);

    assert!(response.success, "{:?}", response.message);
    let model = response.model.unwrap();
    assert!(model.model_url.ends_with("femur.stl"));
    assert_eq!(model.preview_image, "");
    let saved: Vec<_> = std::fs::read_dir(dir.path().join("media").join(MediaKind::Raw.folder()))
        .unwrap()
        .collect();
    assert_eq!(saved.len(), 1);
}

#[test]
fn rejected_record_leaves_no_media_behind() {
    let dir = tempfile::tempdir().unwrap();
    let mut media = DirectoryMediaStore::new(dir.path().join("media"));

    let response = create_product(submission("Mitral Valve"), &mut media, &mut ReadOnlyStore);

    assert!(!response.success);
    assert_eq!(
        response.message.as_deref(),
        Some("Storage error: catalog is read-only")
    );
    for kind in [MediaKind::Raw, MediaKind::Image] {
        let folder = dir.path().join("media").join(kind.folder());
        assert_eq!(std::fs::read_dir(folder).unwrap().count(), 0);
    }
}
