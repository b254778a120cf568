use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Body accepted by create and update. Every field is optional so missing
/// values surface as field errors rather than extractor rejections.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetail {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub path: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<BTreeMap<String, String>>,
}

#[derive(Debug)]
pub struct Problem {
    status: StatusCode,
    body: ProblemDetail,
}

impl Problem {
    fn new(status: StatusCode, kind: &str, title: &str, detail: String, uri: &Uri) -> Self {
        Self {
            status,
            body: ProblemDetail {
                kind: format!("/problems/{kind}"),
                title: title.to_string(),
                status: status.as_u16(),
                detail,
                path: uri.path().to_string(),
                timestamp: Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
                field_errors: None,
            },
        }
    }

    fn not_found(id: i64, uri: &Uri) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "project-not-found",
            "Project Not Found",
            format!("Project not found with id: {id}"),
            uri,
        )
    }

    /// Malformed request: bad JSON, wrong content type, or an unparseable id.
    fn invalid_argument(status: StatusCode, detail: String, uri: &Uri) -> Self {
        Self::new(status, "invalid-argument", "Invalid Argument", detail, uri)
    }

    fn validation(field_errors: BTreeMap<String, String>, uri: &Uri) -> Self {
        let mut problem = Self::new(
            StatusCode::BAD_REQUEST,
            "validation-error",
            "Validation Error",
            "Validation failed for one or more fields".to_string(),
            uri,
        );
        problem.body.field_errors = Some(field_errors);
        problem
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        (
            self.status,
            [(axum::http::header::CONTENT_TYPE, "application/problem+json")],
            Json(self.body),
        )
            .into_response()
    }
}

/// Check `input` against the project constraints, relative to `today`.
pub fn validate(input: &ProjectInput, today: NaiveDate) -> BTreeMap<String, String> {
    let mut errors = BTreeMap::new();
    let mut reject = |field: &str, message: &str| {
        errors.entry(field.to_string()).or_insert_with(|| message.to_string());
    };

    match input.name.as_deref().map(str::trim) {
        None | Some("") => reject("name", "Project name is required"),
        Some(name) if !(3..=100).contains(&name.chars().count()) => {
            reject("name", "Name must be between 3 and 100 characters")
        }
        Some(_) => {}
    }
    if input.description.as_ref().is_some_and(|d| d.chars().count() > 1000) {
        reject("description", "Description cannot exceed 1000 characters");
    }
    match input.start_date {
        None => reject("startDate", "Start date is required"),
        Some(date) if date < today => reject("startDate", "Start date must be today or in the future"),
        Some(_) => {}
    }
    match input.end_date {
        None => reject("endDate", "End date is required"),
        Some(date) if date < today => reject("endDate", "End date must be today or in the future"),
        Some(_) => {}
    }
    if let (Some(start), Some(end)) = (input.start_date, input.end_date) {
        if end <= start {
            reject("validDateRange", "End date must be after start date");
        }
    }
    errors
}

#[derive(Debug, Default)]
pub struct Store {
    next_id: i64,
    projects: BTreeMap<i64, Project>,
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/api/projects", get(list_projects).post(create_project))
        .route(
            "/api/projects/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn checked(input: &ProjectInput, uri: &Uri) -> Result<(), Problem> {
    let errors = validate(input, Local::now().date_naive());
    if errors.is_empty() {
        return Ok(());
    }
    tracing::debug!(path = %uri.path(), fields = ?errors.keys().collect::<Vec<_>>(), "validation failed");
    Err(Problem::validation(errors, uri))
}

async fn list_projects(State(db): State<Db>) -> Json<Vec<Project>> {
    let store = db.read().await;
    tracing::info!(count = store.projects.len(), "listing projects");
    Json(store.projects.values().cloned().collect())
}

fn path_id(path: Result<Path<i64>, PathRejection>, uri: &Uri) -> Result<i64, Problem> {
    path.map(|Path(id)| id)
        .map_err(|rejection| Problem::invalid_argument(rejection.status(), rejection.body_text(), uri))
}

fn json_body(json: Result<Json<ProjectInput>, JsonRejection>, uri: &Uri) -> Result<ProjectInput, Problem> {
    json.map(|Json(input)| input)
        .map_err(|rejection| Problem::invalid_argument(rejection.status(), rejection.body_text(), uri))
}

/// A missing project answers with a bare 404: no problem body.
async fn get_project(
    State(db): State<Db>,
    path: Result<Path<i64>, PathRejection>,
    uri: Uri,
) -> Result<Json<Project>, Response> {
    let id = path_id(path, &uri).map_err(IntoResponse::into_response)?;
    let store = db.read().await;
    store.projects.get(&id).cloned().map(Json).ok_or_else(|| {
        tracing::warn!(id, "project not found");
        StatusCode::NOT_FOUND.into_response()
    })
}

async fn create_project(
    State(db): State<Db>,
    uri: Uri,
    json: Result<Json<ProjectInput>, JsonRejection>,
) -> Result<Json<Project>, Problem> {
    let input = json_body(json, &uri)?;
    checked(&input, &uri)?;
    let mut store = db.write().await;
    store.next_id += 1;
    let project = Project {
        id: store.next_id,
        name: input.name.unwrap_or_default(),
        description: input.description,
        start_date: input.start_date,
        end_date: input.end_date,
    };
    store.projects.insert(project.id, project.clone());
    tracing::info!(id = project.id, name = %project.name, "created project");
    Ok(Json(project))
}

async fn update_project(
    State(db): State<Db>,
    path: Result<Path<i64>, PathRejection>,
    uri: Uri,
    json: Result<Json<ProjectInput>, JsonRejection>,
) -> Result<Json<Project>, Problem> {
    let id = path_id(path, &uri)?;
    let input = json_body(json, &uri)?;
    checked(&input, &uri)?;
    let mut store = db.write().await;
    let project = store.projects.get_mut(&id).ok_or_else(|| {
        tracing::error!(id, "update of non-existent project");
        Problem::not_found(id, &uri)
    })?;
    project.name = input.name.unwrap_or_default();
    project.description = input.description;
    project.start_date = input.start_date;
    project.end_date = input.end_date;
    tracing::info!(id, "updated project");
    Ok(Json(project.clone()))
}

async fn delete_project(
    State(db): State<Db>,
    path: Result<Path<i64>, PathRejection>,
    uri: Uri,
) -> Result<StatusCode, Problem> {
    let id = path_id(path, &uri)?;
    let mut store = db.write().await;
    match store.projects.remove(&id) {
        Some(_) => {
            tracing::info!(id, "deleted project");
            Ok(StatusCode::NO_CONTENT)
        }
        None => {
            tracing::error!(id, "delete of non-existent project");
            Err(Problem::not_found(id, &uri))
        }
    }
}
