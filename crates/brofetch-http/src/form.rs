//! Multipart form bodies.

use reqwest::multipart::{Form, Part};
use serde::Serialize;

/// Value of one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FormValue {
    Text(String),
    File {
        file_name: String,
        mime: Option<String>,
        #[serde(skip_serializing)]
        bytes: Vec<u8>,
    },
}

impl FormValue {
    /// File field from raw bytes.
    pub fn file(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::File {
            file_name: file_name.into(),
            mime: None,
            bytes: bytes.into(),
        }
    }

    /// Set the MIME type of a file field. No effect on text fields.
    pub fn with_mime(self, mime: impl Into<String>) -> Self {
        match self {
            Self::File {
                file_name, bytes, ..
            } => Self::File {
                file_name,
                mime: Some(mime.into()),
                bytes,
            },
            text => text,
        }
    }

    fn to_part(&self) -> Result<Part, reqwest::Error> {
        match self {
            Self::Text(text) => Ok(Part::text(text.clone())),
            Self::File {
                file_name,
                mime,
                bytes,
            } => {
                let part = Part::bytes(bytes.clone()).file_name(file_name.clone());
                match mime {
                    Some(mime) => part.mime_str(mime),
                    None => Ok(part),
                }
            }
        }
    }
}

impl From<String> for FormValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for FormValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Ordered multipart form container.
///
/// Unlike a transport form it can be cloned, so the same body can be sent
/// again on a redirect hop or a retry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormData {
    fields: Vec<(String, FormValue)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing every existing field with the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FormValue>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter().position(|(n, _)| *n == name) {
            Some(first) => {
                self.fields[first].1 = value;
                let mut index = 0;
                self.fields.retain(|(n, _)| {
                    let keep = index <= first || *n != name;
                    index += 1;
                    keep
                });
            }
            None => self.fields.push((name, value)),
        }
    }

    /// Add a field, keeping existing ones with the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<FormValue>) {
        self.fields.push((name.into(), value.into()));
    }

    /// First value of a field.
    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Build the transport multipart body.
    pub fn to_multipart(&self) -> Result<Form, reqwest::Error> {
        self.fields
            .iter()
            .try_fold(Form::new(), |form, (name, value)| {
                Ok(form.part(name.clone(), value.to_part()?))
            })
    }
}

/// Convert a flat key/value map into a [`FormData`].
pub fn object_to_form_data<I, K, V>(fields: I) -> FormData
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<FormValue>,
{
    let mut form = FormData::new();
    for (name, value) in fields {
        form.set(name, value);
    }
    form
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_to_form_data_keeps_order() {
        let form = object_to_form_data([("name", "Ana"), ("city", "Split")]);
        let names: Vec<&str> = form.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["name", "city"]);
        assert_eq!(form.get("city"), Some(&FormValue::from("Split")));
    }

    #[test]
    fn test_set_replaces_all_duplicates() {
        let mut form = FormData::new();
        form.append("tag", "a");
        form.append("other", "x");
        form.append("tag", "b");
        form.set("tag", "c");

        assert_eq!(form.len(), 2);
        assert_eq!(form.get("tag"), Some(&FormValue::from("c")));
        let names: Vec<&str> = form.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["tag", "other"]);
    }

    #[test]
    fn test_file_field_with_mime() {
        let value = FormValue::file("a.txt", b"hello".to_vec()).with_mime("text/plain");
        match value {
            FormValue::File { file_name, mime, bytes } => {
                assert_eq!(file_name, "a.txt");
                assert_eq!(mime.as_deref(), Some("text/plain"));
                assert_eq!(bytes, b"hello");
            }
            other => panic!("expected file field, got {other:?}"),
        }
    }

    #[test]
    fn test_to_multipart_rejects_bad_mime() {
        let mut form = FormData::new();
        form.set("upload", FormValue::file("a.bin", vec![1, 2, 3]).with_mime("not a mime"));
        assert!(form.to_multipart().is_err());

        let ok = object_to_form_data([("a", "1")]);
        assert!(ok.to_multipart().is_ok());
    }

    #[test]
    fn test_serializes_without_file_bytes() {
        let mut form = FormData::new();
        form.set("name", "Ana");
        form.set("upload", FormValue::file("a.bin", vec![0; 4]));

        let json = serde_json::to_value(&form).unwrap();
        assert_eq!(json[0][0], "name");
        assert_eq!(json[0][1], "Ana");
        assert_eq!(json[1][1]["file_name"], "a.bin");
        assert!(json[1][1].get("bytes").is_none());
    }
}
