use std::collections::HashMap;

use axum::extract::Multipart;

use crate::error::ApiError;
use crate::storage::Upload;

/// Multipart form field carrying the uploaded image.
pub const IMAGE_FIELD: &str = "image_file";

/// A fully read multipart form: text fields plus uploaded files.
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    files: HashMap<String, Upload>,
}

impl UploadForm {
    /// Reads every part of `multipart`, rejecting any file larger than `max_bytes`.
    pub async fn parse(mut multipart: Multipart, max_bytes: usize) -> Result<Self, ApiError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(filename) => {
                    let bytes = field.bytes().await?;
                    if bytes.len() > max_bytes {
                        return Err(ApiError::bad_request(format!(
                            "Max size file only {} mb",
                            max_bytes / (1024 * 1024)
                        )));
                    }
                    if filename.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    form.files.insert(
                        name,
                        Upload {
                            filename,
                            bytes: bytes.to_vec(),
                        },
                    );
                }
                None => {
                    let value = field.text().await?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    /// Text value of `name`, or `""` when absent.
    pub fn text(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    /// `true` for `true`, `1`, `on` and `yes`, case-insensitive.
    pub fn flag(&self, name: &str) -> bool {
        self.fields
            .get(name)
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "on" | "yes"))
            .unwrap_or(false)
    }

    /// A required integer field.
    pub fn int(&self, name: &str) -> Result<i64, ApiError> {
        self.fields
            .get(name)
            .and_then(|v| v.trim().parse().ok())
            .ok_or_else(|| ApiError::bad_request(format!("{} must be a number", name)))
    }

    pub fn optional_text(&self, name: &str) -> Option<String> {
        self.fields.get(name).filter(|v| !v.trim().is_empty()).cloned()
    }

    pub fn take_file(&mut self, name: &str) -> Option<Upload> {
        self.files.remove(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(fields: &[(&str, &str)]) -> UploadForm {
        UploadForm {
            fields: fields.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            files: HashMap::new(),
        }
    }

    #[test]
    fn flags_accept_common_truthy_values() {
        let form = form(&[("a", "true"), ("b", "1"), ("c", "false"), ("d", "On")]);
        assert!(form.flag("a"));
        assert!(form.flag("b"));
        assert!(!form.flag("c"));
        assert!(form.flag("d"));
        assert!(!form.flag("missing"));
    }

    #[test]
    fn integers_are_required() {
        let form = form(&[("id", " 42 "), ("bad", "x")]);
        assert_eq!(form.int("id").unwrap(), 42);
        assert!(form.int("bad").is_err());
        assert!(form.int("missing").is_err());
    }
}
