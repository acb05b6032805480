//! Form extractor for `multipart/form-data` and urlencoded bodies.
//!
//! Every endpoint takes its inputs as form fields, so one extractor collects
//! them up front. Repeated keys are kept in order, which is how list inputs
//! (`texts`, `files`) arrive. Text lookups fall back to the query string.

use adapter_core::{AudioUpload, SessionInfo};
use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use url::form_urlencoded;

use crate::error::HttpError;

/// Parsed request form.
#[derive(Debug, Default)]
pub struct FormData {
    fields: Vec<(String, String)>,
    files: Vec<(String, AudioUpload)>,
    query: Vec<(String, String)>,
}

#[axum::async_trait]
impl<S> FromRequest<S> for FormData
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let query = req
            .uri()
            .query()
            .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();

        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.to_ascii_lowercase().starts_with("multipart/form-data"));

        let mut form = Self {
            query,
            ..Self::default()
        };

        if is_multipart {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| HttpError::BadRequest(e.body_text()))?;

            while let Some(field) = multipart
                .next_field()
                .await
                .map_err(|e| HttpError::BadRequest(e.body_text()))?
            {
                let name = field.name().unwrap_or_default().to_string();
                if let Some(filename) = field.file_name().map(str::to_string) {
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| HttpError::BadRequest(e.body_text()))?;
                    form.files.push((name, AudioUpload::new(filename, bytes)));
                } else {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| HttpError::BadRequest(e.body_text()))?;
                    form.fields.push((name, value));
                }
            }
        } else {
            let body = Bytes::from_request(req, state)
                .await
                .map_err(|e| HttpError::BadRequest(e.body_text()))?;
            form.fields = form_urlencoded::parse(&body).into_owned().collect();
        }

        Ok(form)
    }
}

impl FormData {
    /// First value for `name`, from the body or else the query string.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .chain(&self.query)
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Like [`text`](Self::text), treating blank values as absent.
    pub fn optional(&self, name: &str) -> Option<String> {
        self.text(name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
    }

    pub fn text_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.text(name).filter(|v| !v.trim().is_empty()).unwrap_or(default)
    }

    pub fn require_text(&self, name: &str) -> Result<&str, HttpError> {
        self.text(name).ok_or_else(|| missing(name))
    }

    /// Every body value for `name`, in submission order.
    pub fn texts(&self, name: &str) -> Vec<String> {
        self.fields
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
            .collect()
    }

    pub fn require_texts(&self, name: &str) -> Result<Vec<String>, HttpError> {
        let texts = self.texts(name);
        if texts.is_empty() {
            return Err(missing(name));
        }
        Ok(texts)
    }

    pub fn require_file(&self, name: &str) -> Result<&AudioUpload, HttpError> {
        self.files
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, upload)| upload)
            .ok_or_else(|| missing(name))
    }

    pub fn require_files(&self, name: &str) -> Result<Vec<AudioUpload>, HttpError> {
        let files: Vec<AudioUpload> = self
            .files
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, upload)| upload.clone())
            .collect();
        if files.is_empty() {
            return Err(missing(name));
        }
        Ok(files)
    }

    pub fn bool_or(&self, name: &str, default: bool) -> Result<bool, HttpError> {
        match self.text(name).map(str::trim).filter(|v| !v.is_empty()) {
            None => Ok(default),
            Some(raw) => parse_bool(raw).ok_or_else(|| {
                HttpError::UnprocessableEntity(format!("Field '{name}' must be a boolean, got {raw:?}"))
            }),
        }
    }

    pub fn int_or(&self, name: &str, default: i64) -> Result<i64, HttpError> {
        match self.text(name).map(str::trim).filter(|v| !v.is_empty()) {
            None => Ok(default),
            Some(raw) => raw.parse().map_err(|_| {
                HttpError::UnprocessableEntity(format!("Field '{name}' must be an integer, got {raw:?}"))
            }),
        }
    }

    /// `session_id`, `user_id` and `channel`, each optional.
    pub fn session(&self) -> SessionInfo {
        SessionInfo {
            session_id: self.optional("session_id"),
            user_id: self.optional("user_id"),
            channel: self.optional("channel"),
        }
    }
}

fn missing(name: &str) -> HttpError {
    HttpError::UnprocessableEntity(format!("Missing required field: {name}"))
}

/// Parse a form boolean. Accepts `true/false`, `1/0`, `yes/no`, `on/off`.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
