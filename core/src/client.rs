//! Stateless HTTP request builder and response parser for the project API.
//!
//! # Design
//! `ProjectClient` holds only a `base_url` and carries no mutable state between
//! calls. Each CRUD operation is split into a `build_*` method that produces
//! an `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Whoever executes the round-trip sits in between, keeping this module
//! deterministic and free of I/O.
//!
//! All five `parse_*` methods share one failure path: any non-2xx response is
//! reduced to a single message by [`error_message`].

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{ProblemDetail, Project};

/// Synchronous, stateless client for the project API.
#[derive(Debug, Clone)]
pub struct ProjectClient {
    base_url: String,
}

impl ProjectClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_projects(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/api/projects", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_get_project(&self, id: i64) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/api/projects/{id}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create_project(&self, project: &Project) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/api/projects", self.base_url),
            headers: json_headers(),
            body: Some(to_json(project)?),
        })
    }

    pub fn build_update_project(&self, id: i64, project: &Project) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Put,
            path: format!("{}/api/projects/{id}", self.base_url),
            headers: json_headers(),
            body: Some(to_json(project)?),
        })
    }

    pub fn build_delete_project(&self, id: i64) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: format!("{}/api/projects/{id}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list_projects(&self, response: HttpResponse) -> Result<Vec<Project>, ApiError> {
        parse_json(response)
    }

    pub fn parse_get_project(&self, response: HttpResponse) -> Result<Project, ApiError> {
        parse_json(response)
    }

    pub fn parse_create_project(&self, response: HttpResponse) -> Result<Project, ApiError> {
        parse_json(response)
    }

    pub fn parse_update_project(&self, response: HttpResponse) -> Result<Project, ApiError> {
        parse_json(response)
    }

    pub fn parse_delete_project(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }
}

/// Reduce a failed response to the single message shown to the user.
///
/// A JSON object body yields `detail`, else `title`, else
/// `"API Error {status}"`. An absent, unparseable, or non-object body yields the status
/// line text, else `"API Error {status}"`. Non-empty `fieldErrors` are
/// appended as `" (field: message, ...)"` in wire order.
pub fn error_message(response: &HttpResponse) -> String {
    let generic = || format!("API Error {}", response.status);

    let Some(problem) = ProblemDetail::from_body(&response.body) else {
        return non_blank(Some(&response.status_text)).unwrap_or_else(generic);
    };

    let mut message = non_blank(problem.detail.as_ref())
        .or_else(|| non_blank(problem.title.as_ref()))
        .unwrap_or_else(generic);

    if let Some(fields) = problem.field_errors.filter(|f| !f.is_empty()) {
        let pairs: Vec<String> = fields
            .iter()
            .map(|(field, msg)| match msg {
                Value::String(s) => format!("{field}: {s}"),
                other => format!("{field}: {other}"),
            })
            .collect();
        message.push_str(&format!(" ({})", pairs.join(", ")));
    }
    message
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty()).cloned()
}

/// Map non-2xx responses to `ApiError::Http` with the normalized message.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Http {
        status: response.status,
        message: error_message(response),
    })
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

fn to_json(project: &Project) -> Result<String, ApiError> {
    serde_json::to_string(project).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}
