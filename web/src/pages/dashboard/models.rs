//! Form payloads for the user dashboard.

use crate::auth::models::form_errors;
use crate::backend::client::{PropertySubmission, UploadFile};
use crate::backend::models::{Property, PropertyFields, PropertyType};
use crate::errors::{ServiceError, ServiceResult};
use crate::services::media_staging::MediaStaging;
use axum::extract::Multipart;
use serde::Deserialize;
use tracing::warn;
use validator::Validate;

pub const MAX_CREDITS_PER_PURCHASE: u32 = 100;

/// Text fields of the property create/edit form, as typed.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct PropertyFormInput {
    #[validate(length(min = 3, max = 120, message = "Title must be 3-120 characters"))]
    pub title: String,

    #[validate(length(min = 10, message = "Description must be at least 10 characters"))]
    pub description: String,

    #[validate(length(min = 2, message = "Location is required"))]
    pub location: String,

    pub property_type: String,
    pub amount: String,
    #[validate(length(min = 3, max = 3, message = "Currency must be a 3-letter code"))]
    pub currency: String,
    #[validate(length(min = 1, message = "Billing period is required"))]
    pub duration: String,
    pub beds: String,
    pub baths: String,
    pub is_available: bool,
    /// Comma-separated feature names.
    pub features: String,
}

impl PropertyFormInput {
    pub fn blank() -> Self {
        Self {
            currency: "NGN".to_string(),
            duration: "night".to_string(),
            property_type: PropertyType::ShortLet.as_str().to_string(),
            is_available: true,
            ..Default::default()
        }
    }

    pub fn from_property(property: &Property) -> Self {
        Self {
            title: property.title.clone(),
            description: property.description.clone(),
            location: property.location.clone(),
            property_type: property.property_type.as_str().to_string(),
            amount: property.price.amount.to_string(),
            currency: property.price.currency.clone(),
            duration: property.price.duration.clone(),
            beds: property.beds.to_string(),
            baths: property.baths.to_string(),
            is_available: property.is_available,
            features: property.features.join(", "),
        }
    }

    fn set(&mut self, name: &str, value: String) {
        match name {
            "title" => self.title = value,
            "description" => self.description = value,
            "location" => self.location = value,
            "type" | "property_type" => self.property_type = value,
            "amount" => self.amount = value,
            "currency" => self.currency = value,
            "duration" => self.duration = value,
            "beds" => self.beds = value,
            "baths" => self.baths = value,
            "is_available" => self.is_available = true,
            "features" => self.features = value,
            _ => {}
        }
    }

    /// Validated backend fields, or every problem found.
    pub fn parse(&self) -> Result<PropertyFields, Vec<String>> {
        let mut errors = form_errors(self);

        let property_type = self.property_type.parse::<PropertyType>().ok();
        if property_type.is_none() {
            errors.push("type: Choose a property type".to_string());
        }

        let amount = self
            .amount
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|a| a.is_finite() && *a > 0.0);
        if amount.is_none() {
            errors.push("amount: Price must be a positive number".to_string());
        }

        let beds = self.beds.trim().parse::<u32>().ok();
        if beds.is_none() {
            errors.push("beds: Number of beds is required".to_string());
        }
        let baths = self.baths.trim().parse::<u32>().ok();
        if baths.is_none() {
            errors.push("baths: Number of baths is required".to_string());
        }

        match (property_type, amount, beds, baths) {
            (Some(property_type), Some(amount), Some(beds), Some(baths)) if errors.is_empty() => {
                Ok(PropertyFields {
                    title: self.title.trim().to_string(),
                    description: self.description.trim().to_string(),
                    location: self.location.trim().to_string(),
                    property_type,
                    amount,
                    currency: self.currency.trim().to_uppercase(),
                    duration: self.duration.trim().to_string(),
                    beds,
                    baths,
                    is_available: self.is_available,
                    features: self
                        .features
                        .split(',')
                        .map(str::trim)
                        .filter(|f| !f.is_empty())
                        .map(str::to_string)
                        .collect(),
                })
            }
            _ => Err(errors),
        }
    }
}

/// Everything posted by the property form: text fields, new files and the
/// media edits requested on existing assets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyUpload {
    pub input: PropertyFormInput,
    pub images: Vec<UploadFile>,
    pub video: Option<UploadFile>,
    pub remove_images: Vec<String>,
    pub remove_video: bool,
    /// `(position, image id)` pairs from the order inputs.
    pub positions: Vec<(u32, String)>,
}

impl PropertyUpload {
    pub async fn from_multipart(mut multipart: Multipart) -> ServiceResult<Self> {
        let mut upload = PropertyUpload::default();

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            ServiceError::validation(format!("Failed to read form field: {}", e))
        })? {
            let name = field.name().unwrap_or("").to_string();
            let file_name = field.file_name().map(str::to_string);
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field.bytes().await.map_err(|e| {
                ServiceError::validation(format!("Failed to read field data: {}", e))
            })?;

            match (name.as_str(), file_name) {
                ("images" | "video", Some(file_name)) => {
                    // Browsers send an empty part for an untouched file input.
                    if file_name.is_empty() || data.is_empty() {
                        continue;
                    }
                    let file = UploadFile {
                        file_name,
                        content_type,
                        bytes: data.to_vec(),
                    };
                    if name == "images" {
                        upload.images.push(file);
                    } else {
                        upload.video = Some(file);
                    }
                }
                (_, Some(_)) => warn!("Ignoring unexpected file field: {}", name),
                (_, None) => {
                    let value = String::from_utf8_lossy(&data).into_owned();
                    upload.set_text(&name, value);
                }
            }
        }

        Ok(upload)
    }

    fn set_text(&mut self, name: &str, value: String) {
        if name == "remove_image" {
            self.remove_images.push(value);
        } else if name == "remove_video" {
            self.remove_video = value == "true" || value == "on";
        } else if let Some(id) = name.strip_prefix("position_") {
            if let Ok(position) = value.trim().parse::<u32>() {
                self.positions.push((position, id.to_string()));
            }
        } else {
            self.input.set(name, value);
        }
    }

    /// Applies the requested media edits to `staging` and builds the backend
    /// submission. On failure the typed input comes back with every error so
    /// the form can be shown again.
    pub fn into_submission(
        self,
        mut staging: MediaStaging,
    ) -> Result<PropertySubmission, (PropertyFormInput, Vec<String>)> {
        let PropertyUpload {
            input,
            images,
            video,
            remove_images,
            remove_video,
            mut positions,
        } = self;

        let fields = input.parse();
        let mut errors = match &fields {
            Ok(_) => Vec::new(),
            Err(errors) => errors.clone(),
        };

        positions.sort();
        let order: Vec<String> = positions.into_iter().map(|(_, id)| id).collect();
        staging.reorder(&order);

        errors.extend(staging.apply_edits(&remove_images, images));
        if remove_video {
            staging.remove_video();
        }
        if let Some(file) = video {
            if let Err(e) = staging.set_video(file) {
                errors.extend(e.user_messages());
            }
        }

        let media = match staging.into_submission() {
            Ok(media) => Some(media),
            Err(e) => {
                for message in e.user_messages() {
                    if !errors.contains(&message) {
                        errors.push(message);
                    }
                }
                None
            }
        };

        match (fields, media) {
            (Ok(fields), Some(media)) if errors.is_empty() => Ok(PropertySubmission {
                fields,
                new_images: media.new_images,
                new_video: media.new_video,
                deleted_image_ids: media.deleted_image_ids,
                deleted_video_id: media.deleted_video_id,
                image_order: media.image_order,
            }),
            _ => Err((input, errors)),
        }
    }
}

/// `?add-property=true` opens the create form on the properties page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertiesQuery {
    #[serde(rename = "add-property")]
    pub add_property: Option<String>,
    pub page: Option<u32>,
    pub notice: Option<String>,
    pub level: Option<String>,
}

impl PropertiesQuery {
    pub fn wants_create_form(&self) -> bool {
        self.add_property.as_deref() == Some("true")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreditsForm {
    #[serde(default)]
    pub credits: String,
}

impl CreditsForm {
    pub fn credits(&self) -> Result<u32, Vec<String>> {
        match self.credits.trim().parse::<u32>() {
            Ok(n) if (1..=MAX_CREDITS_PER_PURCHASE).contains(&n) => Ok(n),
            _ => Err(vec![format!(
                "credits: Choose between 1 and {} credits",
                MAX_CREDITS_PER_PURCHASE
            )]),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProfileForm {
    #[serde(default)]
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(min = 7, max = 20, message = "Enter a valid phone number"))]
    pub phone_number: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::models::{PropertyImage, PropertyVideo};
    use crate::services::media_staging::MIN_IMAGES_MESSAGE;

    fn input() -> PropertyFormInput {
        PropertyFormInput {
            title: "Ikoyi Penthouse".to_string(),
            description: "Three bedroom penthouse with a view".to_string(),
            location: "Ikoyi, Lagos".to_string(),
            property_type: "Long-stay".to_string(),
            amount: "2500000".to_string(),
            currency: "ngn".to_string(),
            duration: "month".to_string(),
            beds: "3".to_string(),
            baths: "2".to_string(),
            is_available: true,
            features: "Wifi, Pool, ,Gym".to_string(),
        }
    }

    fn image(id: &str) -> PropertyImage {
        PropertyImage {
            id: id.to_string(),
            url: format!("https://cdn.example/{}.jpg", id),
            placeholder: None,
        }
    }

    fn jpeg(name: &str) -> UploadFile {
        UploadFile {
            file_name: name.to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: vec![0xFF, 0xD8],
        }
    }

    #[test]
    fn test_parse_fields() {
        let fields = input().parse().unwrap();
        assert_eq!(fields.property_type, PropertyType::LongStay);
        assert_eq!(fields.amount, 2_500_000.0);
        assert_eq!(fields.currency, "NGN");
        assert_eq!(fields.features, vec!["Wifi", "Pool", "Gym"]);
    }

    #[test]
    fn test_parse_collects_every_error() {
        let input = PropertyFormInput {
            title: "A".to_string(),
            amount: "-4".to_string(),
            beds: "many".to_string(),
            property_type: "Castle".to_string(),
            ..input()
        };
        let errors = input.parse().unwrap_err();
        assert!(errors.contains(&"title: Title must be 3-120 characters".to_string()));
        assert!(errors.contains(&"type: Choose a property type".to_string()));
        assert!(errors.contains(&"amount: Price must be a positive number".to_string()));
        assert!(errors.contains(&"beds: Number of beds is required".to_string()));
    }

    #[test]
    fn test_create_requires_an_image() {
        let upload = PropertyUpload {
            input: input(),
            ..Default::default()
        };
        let (_, errors) = upload.into_submission(MediaStaging::empty()).unwrap_err();
        assert_eq!(errors, vec![MIN_IMAGES_MESSAGE.to_string()]);
    }

    #[test]
    fn test_edit_submission_lists_media_changes() {
        let staging = MediaStaging::from_existing(
            &[image("a"), image("b")],
            Some(&PropertyVideo {
                id: "v1".to_string(),
                url: "https://cdn.example/v1.mp4".to_string(),
            }),
        );
        let upload = PropertyUpload {
            input: input(),
            images: vec![jpeg("new.jpg")],
            remove_images: vec!["a".to_string()],
            remove_video: true,
            positions: vec![(2, "a".to_string()), (1, "b".to_string())],
            ..Default::default()
        };

        let submission = upload.into_submission(staging).unwrap();
        assert_eq!(submission.deleted_image_ids, vec!["a".to_string()]);
        assert_eq!(submission.deleted_video_id.as_deref(), Some("v1"));
        assert_eq!(submission.image_order, vec!["b".to_string(), "new:0".to_string()]);
        assert_eq!(submission.new_images.len(), 1);
    }

    #[test]
    fn test_removing_every_existing_image_is_rejected() {
        let staging = MediaStaging::from_existing(&[image("a")], None);
        let upload = PropertyUpload {
            input: input(),
            remove_images: vec!["a".to_string()],
            ..Default::default()
        };
        let (input, errors) = upload.into_submission(staging).unwrap_err();
        assert_eq!(errors, vec![MIN_IMAGES_MESSAGE.to_string()]);
        assert_eq!(input.title, "Ikoyi Penthouse");
    }

    #[test]
    fn test_sole_image_replaced_in_one_edit() {
        let staging = MediaStaging::from_existing(&[image("a")], None);
        let upload = PropertyUpload {
            input: input(),
            images: vec![jpeg("new.jpg")],
            remove_images: vec!["a".to_string()],
            ..Default::default()
        };

        let submission = upload.into_submission(staging).unwrap();
        assert_eq!(submission.deleted_image_ids, vec!["a".to_string()]);
        assert_eq!(submission.image_order, vec!["new:0".to_string()]);
    }

    #[test]
    fn test_one_of_three_images_replaced_in_one_edit() {
        let staging = MediaStaging::from_existing(&[image("a"), image("b"), image("c")], None);
        let upload = PropertyUpload {
            input: input(),
            images: vec![jpeg("d.jpg")],
            remove_images: vec!["c".to_string()],
            ..Default::default()
        };

        let submission = upload.into_submission(staging).unwrap();
        assert_eq!(
            submission.image_order,
            vec!["a".to_string(), "b".to_string(), "new:0".to_string()]
        );
    }

    #[test]
    fn test_credits_range() {
        let form = |v: &str| CreditsForm {
            credits: v.to_string(),
        };
        assert_eq!(form("5").credits(), Ok(5));
        assert!(form("0").credits().is_err());
        assert!(form("101").credits().is_err());
        assert!(form("abc").credits().is_err());
    }

    #[test]
    fn test_add_property_flag() {
        let query = PropertiesQuery {
            add_property: Some("true".to_string()),
            ..Default::default()
        };
        assert!(query.wants_create_form());
        assert!(!PropertiesQuery::default().wants_create_form());
    }
}
