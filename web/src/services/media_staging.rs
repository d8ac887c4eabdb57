//! Pending media changes for the property create/edit form.
//!
//! Existing images can be marked for deletion or reordered, new files can be
//! added, and the video can be replaced or removed. Nothing reaches the backend
//! until the whole form is submitted, at which point only new files are
//! uploaded and everything else is described by explicit id lists.

use crate::backend::client::UploadFile;
use crate::backend::models::{PropertyImage, PropertyVideo};
use crate::errors::{ServiceError, ServiceResult};
use uuid::Uuid;

pub const MAX_IMAGES: usize = 3;
pub const MIN_IMAGES_MESSAGE: &str = "Property must have at least one image";

#[derive(Debug, Clone, PartialEq)]
pub enum EditableImage {
    Existing {
        image: PropertyImage,
        deleted: bool,
    },
    New {
        /// Local id used to address the pending file in the form.
        client_id: Uuid,
        file: UploadFile,
    },
}

impl EditableImage {
    pub fn key(&self) -> String {
        match self {
            EditableImage::Existing { image, .. } => image.id.clone(),
            EditableImage::New { client_id, .. } => client_id.to_string(),
        }
    }

    pub fn is_kept(&self) -> bool {
        !matches!(self, EditableImage::Existing { deleted: true, .. })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditableVideo {
    #[default]
    None,
    Existing {
        video: PropertyVideo,
        deleted: bool,
    },
    /// A new upload; replaces the existing video when there was one.
    New {
        file: UploadFile,
        replaces: Option<String>,
    },
}

/// What the form will submit, once validated.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaSubmission {
    pub new_images: Vec<UploadFile>,
    pub new_video: Option<UploadFile>,
    pub deleted_image_ids: Vec<String>,
    pub deleted_video_id: Option<String>,
    /// Kept existing ids and `new:<n>` markers, in display order.
    pub image_order: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MediaStaging {
    images: Vec<EditableImage>,
    video: EditableVideo,
}

impl MediaStaging {
    /// Staging for a property that has no media yet.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Staging seeded with the property's stored media.
    pub fn from_existing(images: &[PropertyImage], video: Option<&PropertyVideo>) -> Self {
        Self {
            images: images
                .iter()
                .cloned()
                .map(|image| EditableImage::Existing {
                    image,
                    deleted: false,
                })
                .collect(),
            video: match video {
                Some(video) => EditableVideo::Existing {
                    video: video.clone(),
                    deleted: false,
                },
                None => EditableVideo::None,
            },
        }
    }

    pub fn images(&self) -> &[EditableImage] {
        &self.images
    }

    pub fn video(&self) -> &EditableVideo {
        &self.video
    }

    pub fn kept_count(&self) -> usize {
        self.images.iter().filter(|i| i.is_kept()).count()
    }

    /// Applies one form submission's removals and uploads together. Counts
    /// are only judged on the result, so a sole image can be swapped for a new
    /// one and a full gallery can swap one of its images. Returns the messages
    /// for unknown ids and non-image files.
    pub fn apply_edits(&mut self, removed: &[String], added: Vec<UploadFile>) -> Vec<String> {
        let mut errors = Vec::new();
        for key in removed {
            match self.kept_index(key) {
                Ok(index) => self.drop_at(index),
                Err(e) => errors.extend(e.user_messages()),
            }
        }
        for file in added {
            if let Err(e) = self.stage_image(file) {
                errors.extend(e.user_messages());
            }
        }
        errors
    }

    fn stage_image(&mut self, file: UploadFile) -> ServiceResult<Uuid> {
        if !file.content_type.starts_with("image/") {
            return Err(ServiceError::validation(format!(
                "{} is not an image",
                file.file_name
            )));
        }
        let client_id = Uuid::now_v7();
        self.images.push(EditableImage::New { client_id, file });
        Ok(client_id)
    }

    fn kept_index(&self, key: &str) -> ServiceResult<usize> {
        self.images
            .iter()
            .position(|i| i.key() == key && i.is_kept())
            .ok_or_else(|| ServiceError::not_found("Image", key))
    }

    fn drop_at(&mut self, index: usize) {
        if matches!(self.images[index], EditableImage::New { .. }) {
            self.images.remove(index);
        } else if let EditableImage::Existing { deleted, .. } = &mut self.images[index] {
            *deleted = true;
        }
    }

    /// Reorders images to follow `keys`; unknown keys are ignored and unlisted
    /// images keep their relative order after the listed ones.
    pub fn reorder(&mut self, keys: &[String]) {
        let mut ordered = Vec::with_capacity(self.images.len());
        for key in keys {
            if let Some(index) = self.images.iter().position(|i| &i.key() == key) {
                ordered.push(self.images.remove(index));
            }
        }
        ordered.append(&mut self.images);
        self.images = ordered;
    }

    pub fn set_video(&mut self, file: UploadFile) -> ServiceResult<()> {
        if !file.content_type.starts_with("video/") {
            return Err(ServiceError::validation(format!(
                "{} is not a video",
                file.file_name
            )));
        }
        let replaces = match &self.video {
            EditableVideo::Existing { video, .. } => Some(video.id.clone()),
            EditableVideo::New { replaces, .. } => replaces.clone(),
            EditableVideo::None => None,
        };
        self.video = EditableVideo::New { file, replaces };
        Ok(())
    }

    pub fn remove_video(&mut self) {
        self.video = match std::mem::take(&mut self.video) {
            EditableVideo::Existing { video, .. } => EditableVideo::Existing {
                video,
                deleted: true,
            },
            EditableVideo::New {
                replaces: Some(id), ..
            } => EditableVideo::Existing {
                video: PropertyVideo {
                    id,
                    url: String::new(),
                },
                deleted: true,
            },
            EditableVideo::New { replaces: None, .. } | EditableVideo::None => EditableVideo::None,
        };
    }

    /// Client-side checks run before anything is sent.
    pub fn validate(&self) -> ServiceResult<()> {
        let kept = self.kept_count();
        if kept == 0 {
            return Err(ServiceError::validation(MIN_IMAGES_MESSAGE));
        }
        if kept > MAX_IMAGES {
            return Err(too_many_images());
        }
        Ok(())
    }

    /// Validates and splits the staged state into the outgoing payload.
    pub fn into_submission(self) -> ServiceResult<MediaSubmission> {
        self.validate()?;

        let mut new_images = Vec::new();
        let mut deleted_image_ids = Vec::new();
        let mut image_order = Vec::new();

        for image in self.images {
            match image {
                EditableImage::Existing {
                    image,
                    deleted: true,
                } => deleted_image_ids.push(image.id),
                EditableImage::Existing { image, .. } => image_order.push(image.id),
                EditableImage::New { file, .. } => {
                    image_order.push(format!("new:{}", new_images.len()));
                    new_images.push(file);
                }
            }
        }

        let (new_video, deleted_video_id) = match self.video {
            EditableVideo::None => (None, None),
            EditableVideo::Existing { video, deleted } => (None, deleted.then_some(video.id)),
            EditableVideo::New { file, replaces } => (Some(file), replaces),
        };

        Ok(MediaSubmission {
            new_images,
            new_video,
            deleted_image_ids,
            deleted_video_id,
            image_order,
        })
    }
}

fn too_many_images() -> ServiceError {
    ServiceError::validation(format!(
        "A property can have at most {} images",
        MAX_IMAGES
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(id: &str) -> PropertyImage {
        PropertyImage {
            id: id.to_string(),
            url: format!("https://cdn.example/{}.jpg", id),
            placeholder: None,
        }
    }

    fn upload(name: &str, content_type: &str) -> UploadFile {
        UploadFile {
            file_name: name.to_string(),
            content_type: content_type.to_string(),
            bytes: vec![1, 2, 3],
        }
    }

    #[test]
    fn test_cannot_delete_last_image() {
        let mut staging = MediaStaging::from_existing(&[stored("a"), stored("b")], None);
        staging.apply_edits(&["a".to_string(), "b".to_string()], Vec::new());
        assert_eq!(staging.kept_count(), 0);
        let error = staging.into_submission().unwrap_err();
        assert_eq!(error.user_messages(), vec![MIN_IMAGES_MESSAGE.to_string()]);
    }

    #[test]
    fn test_removed_image_cannot_be_removed_twice() {
        let mut staging = MediaStaging::from_existing(&[stored("a"), stored("b")], None);
        let errors = staging.apply_edits(&["a".to_string(), "a".to_string()], Vec::new());
        assert_eq!(errors, vec!["Image not found".to_string()]);
        assert_eq!(staging.kept_count(), 1);
    }

    #[test]
    fn test_non_images_are_rejected() {
        let mut staging = MediaStaging::empty();
        let errors = staging.apply_edits(&[], vec![upload("notes.pdf", "application/pdf")]);
        assert_eq!(errors, vec!["notes.pdf is not an image".to_string()]);
        assert!(staging.set_video(upload("clip.jpg", "image/jpeg")).is_err());
    }

    #[test]
    fn test_submission_sends_only_new_files_and_explicit_ids() {
        let video = PropertyVideo {
            id: "v1".to_string(),
            url: "https://cdn.example/v1.mp4".to_string(),
        };
        let mut staging =
            MediaStaging::from_existing(&[stored("a"), stored("b")], Some(&video));
        staging.apply_edits(&["a".to_string()], vec![upload("c.jpg", "image/jpeg")]);
        staging.set_video(upload("tour.mp4", "video/mp4")).unwrap();

        let submission = staging.into_submission().unwrap();
        assert_eq!(submission.new_images.len(), 1);
        assert_eq!(submission.new_images[0].file_name, "c.jpg");
        assert_eq!(submission.deleted_image_ids, vec!["a".to_string()]);
        assert_eq!(submission.image_order, vec!["b".to_string(), "new:0".to_string()]);
        assert_eq!(submission.new_video.map(|f| f.file_name), Some("tour.mp4".to_string()));
        assert_eq!(submission.deleted_video_id, Some("v1".to_string()));
    }

    #[test]
    fn test_empty_staging_fails_validation() {
        let error = MediaStaging::empty().into_submission().unwrap_err();
        assert_eq!(error.user_messages(), vec![MIN_IMAGES_MESSAGE.to_string()]);
    }

    #[test]
    fn test_reorder_follows_keys() {
        let mut staging =
            MediaStaging::from_existing(&[stored("a"), stored("b"), stored("c")], None);
        staging.reorder(&["c".to_string(), "zzz".to_string(), "a".to_string()]);
        let keys: Vec<_> = staging.images().iter().map(|i| i.key()).collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_video_removal() {
        let video = PropertyVideo {
            id: "v1".to_string(),
            url: "https://cdn.example/v1.mp4".to_string(),
        };
        let mut staging = MediaStaging::from_existing(&[stored("a")], Some(&video));
        staging.remove_video();

        let submission = staging.into_submission().unwrap();
        assert!(submission.deleted_image_ids.is_empty());
        assert_eq!(submission.deleted_video_id, Some("v1".to_string()));
        assert!(submission.new_video.is_none());
    }

    #[test]
    fn test_sole_image_can_be_swapped_in_one_edit() {
        let mut staging = MediaStaging::from_existing(&[stored("a")], None);
        let errors = staging.apply_edits(&["a".to_string()], vec![upload("new.jpg", "image/jpeg")]);
        assert!(errors.is_empty());

        let submission = staging.into_submission().unwrap();
        assert_eq!(submission.deleted_image_ids, vec!["a".to_string()]);
        assert_eq!(submission.image_order, vec!["new:0".to_string()]);
    }

    #[test]
    fn test_full_gallery_can_swap_one_image() {
        let mut staging =
            MediaStaging::from_existing(&[stored("a"), stored("b"), stored("c")], None);
        let errors = staging.apply_edits(&["b".to_string()], vec![upload("d.jpg", "image/jpeg")]);
        assert!(errors.is_empty());
        assert_eq!(staging.kept_count(), 3);
        assert!(staging.into_submission().is_ok());
    }

    #[test]
    fn test_edits_leaving_no_image_or_too_many_are_rejected() {
        let mut staging = MediaStaging::from_existing(&[stored("a")], None);
        assert!(staging.apply_edits(&["a".to_string()], Vec::new()).is_empty());
        assert_eq!(
            staging.validate().unwrap_err().user_messages(),
            vec![MIN_IMAGES_MESSAGE.to_string()]
        );

        let mut staging = MediaStaging::from_existing(&[stored("a"), stored("b")], None);
        staging.apply_edits(
            &[],
            vec![upload("c.jpg", "image/jpeg"), upload("d.jpg", "image/jpeg")],
        );
        assert_eq!(
            staging.validate().unwrap_err().user_messages(),
            vec!["A property can have at most 3 images".to_string()]
        );
    }

    #[test]
    fn test_edits_report_unknown_ids_and_non_images() {
        let mut staging = MediaStaging::from_existing(&[stored("a")], None);
        let errors = staging.apply_edits(
            &["missing".to_string()],
            vec![upload("notes.pdf", "application/pdf")],
        );
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[1], "notes.pdf is not an image");
    }
}
