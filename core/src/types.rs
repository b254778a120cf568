//! Domain DTOs for the project API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently;
//! integration tests catch schema drift between the two crates. Fields the
//! client does not model are kept in `Project::extra` so they survive a
//! fetch-edit-update cycle untouched.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A project record. `id` is absent until the server assigns one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Problem+JSON body the server sends with a failed request.
///
/// Every field is optional so that partially-formed bodies still yield
/// whatever message they carry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetail {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Field name to validation message, in wire order.
    #[serde(default)]
    pub field_errors: Option<Map<String, Value>>,
}

impl ProblemDetail {
    /// Read a problem from a response body, field by field.
    ///
    /// Returns `None` unless the body is a JSON object. Within an object, a
    /// member of the wrong type is treated as absent instead of rejecting
    /// the whole body, and `fieldErrors` counts only when it is an object.
    pub fn from_body(body: &str) -> Option<Self> {
        let Value::Object(object) = serde_json::from_str::<Value>(body).ok()? else {
            return None;
        };
        let text = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);
        Some(Self {
            kind: text("type"),
            title: text("title"),
            status: object
                .get("status")
                .and_then(Value::as_u64)
                .and_then(|s| u16::try_from(s).ok()),
            detail: text("detail"),
            path: text("path"),
            timestamp: text("timestamp"),
            field_errors: object.get("fieldErrors").and_then(Value::as_object).cloned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_project_omits_id_and_empty_optionals() {
        let json = serde_json::to_value(Project::new("Apollo")).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "Apollo" }));
    }

    #[test]
    fn project_uses_camel_case_dates() {
        let project = Project {
            id: Some(7),
            name: "Apollo".to_string(),
            description: Some("Moonshot".to_string()),
            start_date: NaiveDate::from_ymd_opt(2099, 1, 15),
            end_date: NaiveDate::from_ymd_opt(2099, 6, 30),
            extra: Map::new(),
        };
        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["startDate"], "2099-01-15");
        assert_eq!(json["endDate"], "2099-06-30");
    }

    #[test]
    fn unknown_fields_are_carried_through() {
        let project: Project =
            serde_json::from_str(r#"{"id":1,"name":"A","owner":"ops","priority":3}"#).unwrap();
        assert_eq!(project.extra["owner"], "ops");
        assert_eq!(project.extra["priority"], 3);

        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["owner"], "ops");
        assert_eq!(json["priority"], 3);
    }

    #[test]
    fn null_optionals_deserialize_as_none() {
        let project: Project = serde_json::from_str(
            r#"{"id":2,"name":"B","description":null,"startDate":null,"endDate":null}"#,
        )
        .unwrap();
        assert_eq!(project.id, Some(2));
        assert!(project.description.is_none());
        assert!(project.start_date.is_none());
    }

    #[test]
    fn problem_from_body_skips_mistyped_members() {
        let problem =
            ProblemDetail::from_body(r#"{"title":"Validation Error","status":"400","detail":7,"fieldErrors":[]}"#)
                .unwrap();
        assert_eq!(problem.title.as_deref(), Some("Validation Error"));
        assert!(problem.status.is_none());
        assert!(problem.detail.is_none());
        assert!(problem.field_errors.is_none());
    }

    #[test]
    fn problem_from_body_requires_an_object() {
        for body in ["", "[]", "null", r#""x""#, "42", "<html></html>"] {
            assert!(ProblemDetail::from_body(body).is_none(), "{body:?}");
        }
    }

    #[test]
    fn problem_detail_keeps_field_error_order() {
        let problem: ProblemDetail = serde_json::from_str(
            r#"{"type":"/problems/validation-error","title":"Validation Error","status":400,
                "fieldErrors":{"startDate":"Start date is required","name":"Project name is required"}}"#,
        )
        .unwrap();
        assert_eq!(problem.kind.as_deref(), Some("/problems/validation-error"));
        let keys: Vec<&String> = problem.field_errors.as_ref().unwrap().keys().collect();
        assert_eq!(keys, ["startDate", "name"]);
    }
}
