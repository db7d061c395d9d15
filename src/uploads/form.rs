use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::{too_large, UploadError, UploadField, UploadedFile};
use crate::error::ApiError;

/// How the text parts of a multipart body map onto a resource's JSON shape.
///
/// HTML forms send every value as a string; fields listed here are decoded
/// into their JSON type before the body is deserialized.
#[derive(Debug, Clone, Copy)]
pub struct FormSchema {
    /// Parts that may carry a file.
    pub files: &'static [UploadField],
    /// Parts holding JSON-encoded values (arrays and objects).
    pub json: &'static [&'static str],
    pub bools: &'static [&'static str],
    pub numbers: &'static [&'static str],
}

impl FormSchema {
    fn file_field(&self, name: &str) -> Option<UploadField> {
        self.files.iter().copied().find(|f| f.name == name)
    }

    fn decode(&self, name: &str, raw: String) -> Result<Value, UploadError> {
        if self.json.contains(&name) {
            if raw.trim().is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_str(&raw).map_err(|source| UploadError::InvalidJsonField {
                field: name.to_string(),
                source,
            });
        }
        if self.bools.contains(&name) {
            match raw.trim() {
                "true" | "on" | "1" => return Ok(Value::Bool(true)),
                "false" | "off" | "0" | "" => return Ok(Value::Bool(false)),
                _ => {}
            }
        }
        if self.numbers.contains(&name) {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(Value::Null);
            }
            if let Ok(n) = trimmed.parse::<i64>() {
                return Ok(Value::from(n));
            }
            if let Ok(n) = trimmed.parse::<f64>() {
                if let Some(n) = serde_json::Number::from_f64(n) {
                    return Ok(Value::Number(n));
                }
            }
        }
        Ok(Value::String(raw))
    }
}

/// A request body type that can arrive either as JSON or as multipart form data.
pub trait FormResource: DeserializeOwned + Send {
    const SCHEMA: FormSchema;
}

/// Extracted write body plus any files that accompanied it.
#[derive(Debug)]
pub struct ResourceForm<T> {
    pub input: T,
    pub files: Vec<UploadedFile>,
}

#[async_trait]
impl<S, T> FromRequest<S> for ResourceForm<T>
where
    S: Send + Sync,
    T: FormResource,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map_or(false, |ct| ct.starts_with("multipart/form-data"));

        if !is_multipart {
            let Json(input) = Json::<T>::from_request(req, state).await?;
            return Ok(Self {
                input,
                files: Vec::new(),
            });
        }

        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        let (fields, files) = read_multipart(multipart, &T::SCHEMA).await?;
        let input = serde_json::from_value(Value::Object(fields))
            .map_err(|e| ApiError::invalid_json(format!("Invalid form data: {}", e)))?;
        Ok(Self { input, files })
    }
}

/// Splits a multipart body into decoded text fields and validated files.
pub async fn read_multipart(
    mut multipart: Multipart,
    schema: &FormSchema,
) -> Result<(Map<String, Value>, Vec<UploadedFile>), UploadError> {
    let mut fields = Map::new();
    let mut files: Vec<UploadedFile> = Vec::new();

    while let Some(mut part) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError::Multipart(e.body_text()))?
    {
        let name = part.name().unwrap_or_default().to_string();

        let Some(file_name) = part.file_name().map(str::to_string) else {
            let raw = part
                .text()
                .await
                .map_err(|e| UploadError::Multipart(e.body_text()))?;
            let value = schema.decode(&name, raw)?;
            fields.insert(name, value);
            continue;
        };

        let field = schema
            .file_field(&name)
            .ok_or_else(|| UploadError::UnexpectedField(name.clone()))?;
        if files.iter().any(|f| f.field == field) {
            return Err(UploadError::Multipart(format!(
                "Field '{}' accepts a single file",
                name
            )));
        }

        let content_type = part.content_type().unwrap_or_default().to_string();
        let mut bytes = Vec::new();
        while let Some(chunk) = part
            .chunk()
            .await
            .map_err(|e| UploadError::Multipart(e.body_text()))?
        {
            bytes.extend_from_slice(&chunk);
            if bytes.len() > field.kind.max_bytes() {
                return Err(too_large(&field));
            }
        }

        // Browsers send an empty part when no file was chosen.
        if file_name.is_empty() && bytes.is_empty() {
            continue;
        }

        let file = UploadedFile {
            field,
            file_name,
            content_type,
            bytes,
        };
        file.validate()?;
        files.push(file);
    }

    Ok((fields, files))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uploads::THUMBNAIL;

    const SCHEMA: FormSchema = FormSchema {
        files: &[THUMBNAIL],
        json: &["technologies"],
        bools: &["featured"],
        numbers: &["order"],
    };

    #[test]
    fn decodes_typed_text_fields() {
        assert_eq!(
            SCHEMA.decode("technologies", r#"["Go","Rust"]"#.into()).unwrap(),
            serde_json::json!(["Go", "Rust"])
        );
        assert_eq!(SCHEMA.decode("featured", "true".into()).unwrap(), Value::Bool(true));
        assert_eq!(SCHEMA.decode("order", "3".into()).unwrap(), Value::from(3));
        assert_eq!(
            SCHEMA.decode("title", "3".into()).unwrap(),
            Value::String("3".into())
        );
    }

    #[test]
    fn malformed_json_field_is_reported_by_name() {
        let err = SCHEMA.decode("technologies", "[Go".into()).unwrap_err();
        assert!(matches!(err, UploadError::InvalidJsonField { ref field, .. } if field == "technologies"));
    }
}
