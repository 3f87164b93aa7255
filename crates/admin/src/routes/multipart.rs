//! Reading the product forms, which arrive as `multipart/form-data`.

use axum::extract::Multipart;

use nikola_core::admin::{ProductDraft, ProductEditForm};

use crate::backend::ImageUpload;
use crate::error::Result;

/// Largest accepted product form, images included.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// File input name on the product forms.
const IMAGES_FIELD: &str = "images";

/// Text fields and attached images of a product form.
#[derive(Debug, Default)]
pub struct ProductForm {
    fields: Vec<(String, String)>,
    images: Vec<ImageUpload>,
}

impl ProductForm {
    /// Drain a multipart body. Empty file inputs are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed or truncated body.
    pub async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            if name == IMAGES_FIELD {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let image = ImageUpload {
                    file_name,
                    content_type,
                    bytes: field.bytes().await?.to_vec(),
                };
                if image.is_present() {
                    form.images.push(image);
                }
            } else {
                form.fields.push((name, field.text().await?));
            }
        }

        Ok(form)
    }

    #[cfg(test)]
    fn from_fields(fields: &[(&str, &str)]) -> Self {
        Self {
            fields: fields
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            images: Vec::new(),
        }
    }

    /// Last value of a text field, or empty.
    fn text(&self, name: &str) -> String {
        self.fields
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
            .unwrap_or_default()
    }

    /// Every value of a repeated field (checkbox groups).
    fn all(&self, name: &str) -> Vec<String> {
        self.fields
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .collect()
    }

    /// Whether a checkbox was ticked. Browsers omit unticked boxes.
    fn checked(&self, name: &str) -> bool {
        self.fields.iter().any(|(key, _)| key == name)
    }

    /// Attached images, in form order.
    #[must_use]
    pub fn images(&self) -> &[ImageUpload] {
        &self.images
    }

    /// Take the attached images, leaving the text fields.
    pub fn take_images(&mut self) -> Vec<ImageUpload> {
        std::mem::take(&mut self.images)
    }

    /// The new-product form as a draft.
    #[must_use]
    pub fn draft(&self) -> ProductDraft {
        ProductDraft {
            code: self.text("code"),
            name: self.text("name"),
            alt_names: self.text("alt_names"),
            labelled_price: self.text("labelled_price"),
            price: self.text("price"),
            description: self.text("description"),
            stock: self.text("stock"),
            is_available: self.checked("is_available"),
            categories: self.all("categories"),
            colors: self.text("colors"),
            saved_at: None,
        }
    }

    /// The edit-product form.
    #[must_use]
    pub fn edit_form(&self) -> ProductEditForm {
        ProductEditForm {
            name: self.text("name"),
            alt_names: self.text("alt_names"),
            labelled_price: self.text("labelled_price"),
            price: self.text("price"),
            description: self.text("description"),
            stock: self.text("stock"),
            is_available: self.checked("is_available"),
            categories: self.all("categories"),
            colors_enabled: self.checked("colors_enabled"),
            colors: self.text("colors"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_collects_checkbox_group() {
        let form = ProductForm::from_fields(&[
            ("name", "Santa Mug"),
            ("price", "1500"),
            ("categories", "kitchen"),
            ("categories", "christmas"),
            ("categories", " "),
            ("is_available", "on"),
        ]);
        let draft = form.draft();
        assert_eq!(draft.name, "Santa Mug");
        assert_eq!(draft.categories, vec!["kitchen", "christmas"]);
        assert!(draft.is_available);
        assert!(draft.saved_at.is_none());
    }

    #[test]
    fn test_unticked_boxes_are_false() {
        let form = ProductForm::from_fields(&[("name", "Elf Hat"), ("colors", "red, green")]);
        let edit = form.edit_form();
        assert!(!edit.is_available);
        assert!(!edit.colors_enabled);
        assert_eq!(edit.colors, "red, green");
    }

    #[test]
    fn test_last_value_wins() {
        let form = ProductForm::from_fields(&[("stock", "1"), ("stock", "7")]);
        assert_eq!(form.draft().stock, "7");
        assert!(form.images().is_empty());
    }
}
