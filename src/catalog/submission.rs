//! Product creation.
//!
//! [`create_product`] turns a [`ProductSubmission`] into a stored
//! [`ProductRecord`]. The submission is validated before anything is
//! uploaded. Media go through a [`MediaUploader`]: the model file as a raw
//! resource, the preview and gallery pictures as images. If any upload
//! fails, no record is written.
//!
//! New records start in review (`verification`) with zeroed counters.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::catalog::wire::CreateResponse;
use crate::domain::error::{MedshelfError, Result};
use crate::domain::{ModelStatus, ProductRecord};

/// How an uploaded file is stored by the media host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Opaque binary such as an STL or OBJ mesh.
    Raw,
    Image,
}

impl MediaKind {
    #[must_use]
    pub const fn folder(self) -> &'static str {
        match self {
            Self::Raw => "models",
            Self::Image => "images",
        }
    }
}

/// A file attached to a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl MediaFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

/// Stores binary media and hands back a public URL.
pub trait MediaUploader {
    /// # Errors
    ///
    /// Returns an error if the file cannot be stored.
    fn upload(&mut self, file: &MediaFile, kind: MediaKind) -> Result<String>;

    /// Removes media stored by an earlier [`upload`](Self::upload) whose
    /// product was never created. Hosts that cannot delete keep the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored file cannot be removed.
    fn discard(&mut self, _url: &str) -> Result<()> {
        Ok(())
    }
}

/// Persists newly created product records.
pub trait ProductStore {
    /// Stores `record` and returns it as saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    fn create(&mut self, record: ProductRecord) -> Result<ProductRecord>;
}

/// The fields of an upload form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductSubmission {
    pub title: String,
    pub author: Option<String>,
    pub username: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub license: Option<String>,
    /// Comma-separated tag list as typed by the user.
    pub tags: Option<String>,
    pub model_file: Option<MediaFile>,
    pub preview_image: Option<MediaFile>,
    pub images: Vec<MediaFile>,
}

/// Splits a comma-separated tag list, trimming each tag and dropping blanks.
#[must_use]
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(String::from)
        .collect()
}

fn require_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(MedshelfError::Validation(
            "Missing required field: title".to_string(),
        ));
    }
    Ok(())
}

/// Rejects a submission that cannot become a record.
///
/// # Errors
///
/// Returns [`MedshelfError::Validation`] when the title is blank.
pub fn validate(submission: &ProductSubmission) -> Result<()> {
    require_title(&submission.title)
}

/// A submission whose files are still paths, as received over a pipe.
///
/// ```json
/// {"title": "Left Femur", "tags": "bone, leg", "modelFile": "scans/femur.stl",
///  "previewImage": "scans/femur.png", "images": []}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductDraft {
    pub title: String,
    pub author: Option<String>,
    pub username: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub license: Option<String>,
    pub tags: Option<String>,
    pub model_file: Option<String>,
    pub preview_image: Option<String>,
    pub images: Vec<String>,
}

impl ProductDraft {
    /// Reads the referenced files through `read` and builds the submission.
    ///
    /// The title is checked first so a blank title is reported even when
    /// the files are unreadable.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank title, or the first error
    /// returned by `read`.
    pub fn load<F>(self, mut read: F) -> Result<ProductSubmission>
    where
        F: FnMut(&str) -> Result<MediaFile>,
    {
        require_title(&self.title)?;
        let model_file = self.model_file.as_deref().map(&mut read).transpose()?;
        let preview_image = self.preview_image.as_deref().map(&mut read).transpose()?;
        let images = self
            .images
            .iter()
            .map(|path| read(path))
            .collect::<Result<Vec<_>>>()?;

        Ok(ProductSubmission {
            title: self.title,
            author: self.author,
            username: self.username,
            category: self.category,
            description: self.description,
            license: self.license,
            tags: self.tags,
            model_file,
            preview_image,
            images,
        })
    }
}

fn upload_media<U: MediaUploader + ?Sized>(
    submission: &ProductSubmission,
    uploader: &mut U,
) -> Result<(String, String, Vec<String>)> {
    let model_url = submission
        .model_file
        .as_ref()
        .map(|file| uploader.upload(file, MediaKind::Raw))
        .transpose()?
        .unwrap_or_default();

    let preview_url = submission
        .preview_image
        .as_ref()
        .map(|file| uploader.upload(file, MediaKind::Image))
        .transpose()?
        .unwrap_or_default();

    let images = submission
        .images
        .iter()
        .map(|file| uploader.upload(file, MediaKind::Image))
        .collect::<Result<Vec<_>>>()?;

    debug!(
        has_model = !model_url.is_empty(),
        has_preview = !preview_url.is_empty(),
        images = images.len(),
        "media uploaded"
    );
    Ok((model_url, preview_url, images))
}

fn discard_uploads<U: MediaUploader + ?Sized>(uploader: &mut U, urls: &[String]) {
    for url in urls {
        if let Err(e) = uploader.discard(url) {
            warn!(%url, error = %e, "could not discard uploaded media");
        }
    }
}

/// Builds the record for an already validated submission.
fn build_record(
    submission: ProductSubmission,
    model_url: String,
    preview_url: String,
    images: Vec<String>,
    now: chrono::DateTime<chrono::Utc>,
) -> ProductRecord {
    let preview_image = if preview_url.is_empty() {
        images.first().cloned().unwrap_or_default()
    } else {
        preview_url
    };

    ProductRecord {
        id: uuid::Uuid::new_v4().to_string(),
        title: submission.title,
        author: submission.author.unwrap_or_default(),
        username: submission.username.unwrap_or_default(),
        category: submission.category.unwrap_or_default(),
        likes: 0,
        downloads: 0,
        shares: 0,
        status: ModelStatus::Verification,
        created_at: now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        published_date: None,
        description: submission.description.unwrap_or_default(),
        license: submission.license.unwrap_or_default(),
        tags: submission.tags.as_deref().map(split_tags).unwrap_or_default(),
        model_url,
        preview_image,
        images,
        related_models: Vec::new(),
        rejection_reason: Some(String::new()),
        admin_notes: Some(String::new()),
    }
}

/// Validates, uploads and stores a submission.
///
/// # Errors
///
/// Returns the first validation, upload or storage error. Nothing is stored
/// when an error is returned.
#[instrument(level = "debug", skip_all, fields(title = %submission.title))]
pub fn try_create_product<U, S>(
    submission: ProductSubmission,
    uploader: &mut U,
    store: &mut S,
) -> Result<ProductRecord>
where
    U: MediaUploader + ?Sized,
    S: ProductStore + ?Sized,
{
    validate(&submission)?;
    let (model_url, preview_url, images) = upload_media(&submission, uploader)?;
    let uploaded: Vec<String> = std::iter::once(&model_url)
        .chain([&preview_url])
        .chain(&images)
        .filter(|url| !url.is_empty())
        .cloned()
        .collect();
    let record = build_record(submission, model_url, preview_url, images, chrono::Utc::now());
    let saved = match store.create(record) {
        Ok(saved) => saved,
        Err(e) => {
            discard_uploads(uploader, &uploaded);
            return Err(e);
        }
    };
    info!(id = %saved.id, "product created");
    Ok(saved)
}

/// [`try_create_product`] folded into the service's response envelope.
pub fn create_product<U, S>(
    submission: ProductSubmission,
    uploader: &mut U,
    store: &mut S,
) -> CreateResponse
where
    U: MediaUploader + ?Sized,
    S: ProductStore + ?Sized,
{
    match try_create_product(submission, uploader, store) {
        Ok(model) => CreateResponse::created(model),
        Err(e) => {
            warn!(error = %e, "product creation failed");
            CreateResponse::rejected(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_trimmed_and_blanks_dropped() {
        assert_eq!(split_tags(" bone , leg,, "), ["bone", "leg"]);
        assert!(split_tags("").is_empty());
    }

    #[test]
    fn whitespace_title_is_missing() {
        let submission = ProductSubmission {
            title: "   ".to_string(),
            ..ProductSubmission::default()
        };
        assert!(matches!(validate(&submission), Err(MedshelfError::Validation(_))));
    }

    #[test]
    fn draft_checks_title_before_reading() {
        let draft = ProductDraft {
            model_file: Some("missing.stl".to_string()),
            ..ProductDraft::default()
        };
        let err = draft
            .load(|_| Err(MedshelfError::Upload("unreadable".to_string())))
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing required field: title");
    }

    #[test]
    fn draft_loads_every_file() {
        let draft: ProductDraft = serde_json::from_str(
            r#"{"title":"Heart","modelFile":"heart.obj","images":["a.png","b.png"]}"#,
        )
        .unwrap();
        let submission = draft
            .load(|path| Ok(MediaFile::new(path, path.as_bytes().to_vec())))
            .unwrap();
        assert_eq!(submission.model_file.unwrap().file_name, "heart.obj");
        assert!(submission.preview_image.is_none());
        assert_eq!(submission.images.len(), 2);
    }

    #[test]
    fn preview_falls_back_to_first_image() {
        let submission = ProductSubmission {
            title: "Hand".to_string(),
            ..ProductSubmission::default()
        };
        let record = build_record(
            submission,
            String::new(),
            String::new(),
            vec!["img-1".to_string(), "img-2".to_string()],
            chrono::Utc::now(),
        );
        assert_eq!(record.preview_image, "img-1");
        assert_eq!(record.status, ModelStatus::Verification);
        assert!(record.published_date.is_none());
        assert!(uuid::Uuid::parse_str(&record.id).is_ok());
    }
}
