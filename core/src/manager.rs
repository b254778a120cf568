//! Project management orchestration: API calls sequenced with UI state.
//!
//! # Design
//! `ProjectManager` is the only writer of `UiState` and the recovery boundary
//! for every action: failures are turned into a banner message plus a
//! `tracing::error!` entry and never returned to the caller. The busy flag an
//! action raises is held by a drop guard, so it is lowered when the action
//! finishes or when its future is dropped.
//!
//! State sits behind a mutex so actions take `&self` and may overlap (for
//! example via `tokio::join!`). The lock is never held across an `.await`.
//! Overlapping actions each trigger their own reload; whichever reload
//! finishes last wins.

use parking_lot::Mutex;

use crate::api::ProjectApi;
use crate::error::ApiError;
use crate::http::Transport;
use crate::notifier::ErrorNotifier;
use crate::types::Project;

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this project?";

/// Asks the user to confirm a destructive action.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Everything a front-end renders for the project screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiState {
    pub projects: Vec<Project>,
    pub loading: bool,
    /// Identifier of the record currently being deleted.
    pub deleting_id: Option<i64>,
    pub create_modal_open: bool,
    pub edit_modal_open: bool,
    pub create_loading: bool,
    pub edit_loading: bool,
    /// Copy of the record being edited, independent of `projects`.
    pub editing_project: Option<Project>,
}

/// Busy flag raised for the lifetime of an action. Lowered on drop, so an
/// action whose future is cancelled mid-flight still clears it.
struct Busy<'a> {
    state: &'a Mutex<UiState>,
    lower: fn(&mut UiState),
}

impl<'a> Busy<'a> {
    fn raise(state: &'a Mutex<UiState>, raise: impl FnOnce(&mut UiState), lower: fn(&mut UiState)) -> Self {
        let mut guard = state.lock();
        raise(&mut *guard);
        Self { state, lower }
    }
}

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        (self.lower)(&mut *self.state.lock());
    }
}

pub struct ProjectManager<T> {
    api: ProjectApi<T>,
    notifier: ErrorNotifier,
    confirm: Box<dyn Confirm>,
    state: Mutex<UiState>,
}

impl<T: Transport> ProjectManager<T> {
    pub fn new(api: ProjectApi<T>, notifier: ErrorNotifier, confirm: impl Confirm + 'static) -> Self {
        Self {
            api,
            notifier,
            confirm: Box::new(confirm),
            state: Mutex::new(UiState::default()),
        }
    }

    pub fn api(&self) -> &ProjectApi<T> {
        &self.api
    }

    pub fn notifier(&self) -> &ErrorNotifier {
        &self.notifier
    }

    /// Snapshot of the current UI state.
    pub fn state(&self) -> UiState {
        self.state.lock().clone()
    }

    pub fn projects(&self) -> Vec<Project> {
        self.state.lock().projects.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    pub fn deleting_id(&self) -> Option<i64> {
        self.state.lock().deleting_id
    }

    pub fn editing_project(&self) -> Option<Project> {
        self.state.lock().editing_project.clone()
    }

    /// Replace `projects` with the server's list.
    pub async fn load(&self) {
        let _busy = Busy::raise(&self.state, |s| s.loading = true, |s| s.loading = false);
        match self.api.list_all().await {
            Ok(projects) => self.state.lock().projects = projects,
            Err(err) => self.report("Failed to load projects", &err),
        }
    }

    /// Delete `project` after confirmation, then reload.
    pub async fn delete(&self, project: &Project) {
        let Some(id) = project.id else {
            tracing::warn!(name = %project.name, "cannot delete a project without an id");
            return;
        };
        if !self.confirm.confirm(DELETE_PROMPT) {
            tracing::debug!(id, "delete declined");
            return;
        }

        let _busy = Busy::raise(&self.state, |s| s.deleting_id = Some(id), |s| s.deleting_id = None);
        match self.api.remove(id).await {
            Ok(()) => self.load().await,
            Err(err) => self.report("Failed to delete project", &err),
        }
    }

    /// Create `project`, reload, and close the create modal. The modal stays
    /// open on failure.
    pub async fn create(&self, project: Project) {
        let _busy = Busy::raise(&self.state, |s| s.create_loading = true, |s| s.create_loading = false);
        match self.api.create(&project).await {
            Ok(created) => {
                tracing::debug!(id = ?created.id, "project created");
                self.load().await;
                self.close_create_modal();
            }
            Err(err) => self.report("Failed to create project", &err),
        }
    }

    /// Save `project` over the record in the edit buffer, reload, and close
    /// the edit modal. No-op when the buffer holds no identified record.
    pub async fn edit(&self, project: Project) {
        let id = self
            .state
            .lock()
            .editing_project
            .as_ref()
            .and_then(|p| p.id);
        let Some(id) = id else {
            return;
        };

        let _busy = Busy::raise(&self.state, |s| s.edit_loading = true, |s| s.edit_loading = false);
        match self.api.update(id, &project).await {
            Ok(_) => {
                self.load().await;
                self.close_edit_modal();
            }
            Err(err) => self.report("Failed to update project", &err),
        }
    }

    pub fn open_create_modal(&self) {
        self.state.lock().create_modal_open = true;
    }

    pub fn close_create_modal(&self) {
        self.state.lock().create_modal_open = false;
    }

    pub fn open_edit_modal(&self, project: &Project) {
        let mut state = self.state.lock();
        state.editing_project = Some(project.clone());
        state.edit_modal_open = true;
    }

    pub fn close_edit_modal(&self) {
        let mut state = self.state.lock();
        state.edit_modal_open = false;
        state.editing_project = None;
    }

    fn report(&self, fallback: &str, err: &ApiError) {
        let message = err.to_string();
        let message = if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message
        };
        tracing::error!(error = ?err, "{fallback}");
        self.notifier.show(message);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;
    use crate::client::ProjectClient;
    use crate::http::HttpMethod;
    use crate::testing::ScriptedTransport;

    const TWO_PROJECTS: &str = r#"[{"id":1,"name":"Apollo"},{"id":2,"name":"Gemini"}]"#;

    fn manager(transport: ScriptedTransport) -> ProjectManager<ScriptedTransport> {
        manager_with(transport, |_: &str| true)
    }

    fn manager_with(
        transport: ScriptedTransport,
        confirm: impl Confirm + 'static,
    ) -> ProjectManager<ScriptedTransport> {
        let api = ProjectApi::new(ProjectClient::new("http://api.test"), transport);
        ProjectManager::new(api, ErrorNotifier::new(), confirm)
    }

    fn methods(manager: &ProjectManager<ScriptedTransport>) -> Vec<(HttpMethod, String)> {
        manager
            .api()
            .transport()
            .requests()
            .into_iter()
            .map(|r| (r.method, r.path))
            .collect()
    }

    #[tokio::test]
    async fn load_replaces_projects_in_server_order() {
        let m = manager(ScriptedTransport::new().respond(200, "OK", TWO_PROJECTS));
        m.load().await;

        let state = m.state();
        let names: Vec<&str> = state.projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Apollo", "Gemini"]);
        assert!(!state.loading);
        assert!(!m.notifier().is_visible());
    }

    #[tokio::test]
    async fn failed_load_keeps_projects_and_shows_error() {
        let m = manager(
            ScriptedTransport::new()
                .respond(200, "OK", TWO_PROJECTS)
                .respond(500, "Internal Server Error", ""),
        );
        m.load().await;
        m.load().await;

        assert_eq!(m.projects().len(), 2);
        assert!(!m.is_loading());
        assert!(m.notifier().is_visible());
        assert_eq!(m.notifier().message(), "Internal Server Error");
    }

    #[tokio::test]
    async fn transport_failure_is_reported() {
        let m = manager(ScriptedTransport::new().fail(ApiError::Transport("connection refused".into())));
        m.load().await;

        assert!(!m.is_loading());
        assert_eq!(m.notifier().message(), "network error: connection refused");
    }

    #[tokio::test]
    async fn create_success_reloads_and_closes_modal() {
        let m = manager(
            ScriptedTransport::new()
                .respond(200, "OK", r#"{"id":3,"name":"Mercury"}"#)
                .respond(200, "OK", r#"[{"id":3,"name":"Mercury"}]"#),
        );
        m.open_create_modal();
        m.create(Project::new("Mercury")).await;

        let state = m.state();
        assert!(!state.create_modal_open);
        assert!(!state.create_loading);
        assert_eq!(state.projects[0].id, Some(3));
        assert_eq!(
            methods(&m),
            [
                (HttpMethod::Post, "http://api.test/api/projects".to_string()),
                (HttpMethod::Get, "http://api.test/api/projects".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn create_failure_keeps_modal_open() {
        let body = r#"{"title":"Validation Error","detail":"Validation failed for one or more fields",
                       "fieldErrors":{"name":"Project name is required"}}"#;
        let m = manager(ScriptedTransport::new().respond(400, "Bad Request", body));
        m.open_create_modal();
        m.create(Project::new("")).await;

        let state = m.state();
        assert!(state.create_modal_open);
        assert!(!state.create_loading);
        assert!(state.projects.is_empty());
        assert_eq!(
            m.notifier().message(),
            "Validation failed for one or more fields (name: Project name is required)"
        );
        // No reload after a failed create.
        assert_eq!(methods(&m).len(), 1);
    }

    #[tokio::test]
    async fn declined_delete_makes_no_request() {
        let asked = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&asked);
        let m = manager_with(ScriptedTransport::new(), move |prompt: &str| {
            assert_eq!(prompt, DELETE_PROMPT);
            counter.fetch_add(1, Ordering::SeqCst);
            false
        });

        let mut project = Project::new("Apollo");
        project.id = Some(1);
        m.delete(&project).await;

        assert_eq!(asked.load(Ordering::SeqCst), 1);
        assert!(methods(&m).is_empty());
        assert_eq!(m.state(), UiState::default());
    }

    #[tokio::test]
    async fn delete_without_id_is_ignored() {
        let m = manager_with(ScriptedTransport::new(), |_: &str| -> bool {
            panic!("must not prompt for a project without an id")
        });
        m.delete(&Project::new("Draft")).await;
        assert!(methods(&m).is_empty());
    }

    #[tokio::test]
    async fn confirmed_delete_reloads_and_clears_marker() {
        let m = manager(
            ScriptedTransport::new()
                .respond(200, "OK", TWO_PROJECTS)
                .respond(204, "No Content", "")
                .respond(200, "OK", r#"[{"id":2,"name":"Gemini"}]"#),
        );
        m.load().await;
        let target = m.projects()[0].clone();
        m.delete(&target).await;

        let state = m.state();
        assert!(state.deleting_id.is_none());
        assert!(state.projects.iter().all(|p| p.id != Some(1)));
        assert_eq!(methods(&m)[1], (HttpMethod::Delete, "http://api.test/api/projects/1".to_string()));
    }

    #[tokio::test]
    async fn failed_delete_clears_marker() {
        let body = r#"{"title":"Project Not Found","detail":"Project not found with id: 8"}"#;
        let m = manager(ScriptedTransport::new().respond(404, "Not Found", body));
        let mut project = Project::new("Ghost");
        project.id = Some(8);
        m.delete(&project).await;

        assert!(m.deleting_id().is_none());
        assert_eq!(m.notifier().message(), "Project not found with id: 8");
    }

    #[tokio::test]
    async fn edit_without_snapshot_is_a_noop() {
        let m = manager(ScriptedTransport::new());
        m.edit(Project::new("Nothing open")).await;
        assert!(methods(&m).is_empty());
        assert!(!m.state().edit_loading);
    }

    #[tokio::test]
    async fn edit_of_unsaved_snapshot_is_a_noop() {
        let m = manager(ScriptedTransport::new());
        m.open_edit_modal(&Project::new("Draft"));
        m.edit(Project::new("Draft v2")).await;

        assert!(methods(&m).is_empty());
        let state = m.state();
        assert!(!state.edit_loading);
        assert!(state.edit_modal_open);
        assert_eq!(state.editing_project, Some(Project::new("Draft")));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_actions_still_lower_their_flags() {
        let m = manager(ScriptedTransport::new().stalled(Duration::from_secs(60)));
        let mut project = Project::new("Slow");
        project.id = Some(4);
        let limit = Duration::from_secs(1);

        assert!(timeout(limit, m.load()).await.is_err());
        assert!(timeout(limit, m.delete(&project)).await.is_err());
        assert!(timeout(limit, m.create(Project::new("Slow"))).await.is_err());
        m.open_edit_modal(&project);
        assert!(timeout(limit, m.edit(project.clone())).await.is_err());

        let state = m.state();
        assert!(!state.loading);
        assert!(state.deleting_id.is_none());
        assert!(!state.create_loading);
        assert!(!state.edit_loading);
        assert!(state.edit_modal_open);
        assert_eq!(methods(&m).len(), 4);
    }

    #[tokio::test]
    async fn edit_updates_snapshot_id_then_closes() {
        let m = manager(
            ScriptedTransport::new()
                .respond(200, "OK", r#"{"id":2,"name":"Gemini II"}"#)
                .respond(200, "OK", r#"[{"id":1,"name":"Apollo"},{"id":2,"name":"Gemini II"}]"#),
        );
        let mut original = Project::new("Gemini");
        original.id = Some(2);
        m.open_edit_modal(&original);

        let mut changed = original.clone();
        changed.name = "Gemini II".to_string();
        m.edit(changed).await;

        let state = m.state();
        assert!(!state.edit_modal_open);
        assert!(!state.edit_loading);
        assert!(state.editing_project.is_none());
        assert_eq!(state.projects[1].name, "Gemini II");
        assert_eq!(methods(&m)[0], (HttpMethod::Put, "http://api.test/api/projects/2".to_string()));
    }

    #[tokio::test]
    async fn failed_edit_keeps_modal_and_snapshot() {
        let m = manager(ScriptedTransport::new().respond(500, "", "not json"));
        let mut original = Project::new("Gemini");
        original.id = Some(2);
        m.open_edit_modal(&original);
        m.edit(original.clone()).await;

        let state = m.state();
        assert!(state.edit_modal_open);
        assert!(!state.edit_loading);
        assert_eq!(state.editing_project, Some(original));
        assert_eq!(m.notifier().message(), "API Error 500");
    }

    #[test]
    fn edit_snapshot_is_isolated_from_the_source() {
        let m = manager(ScriptedTransport::new());
        let mut project = Project::new("Apollo");
        project.id = Some(1);
        m.open_edit_modal(&project);

        project.name = "Mutated".to_string();
        project.description = Some("changed after opening".to_string());

        let snapshot = m.editing_project().unwrap();
        assert_eq!(snapshot.name, "Apollo");
        assert!(snapshot.description.is_none());
        assert!(m.state().edit_modal_open);
    }

    #[test]
    fn modals_toggle_independently() {
        let m = manager(ScriptedTransport::new());
        m.open_create_modal();
        let mut project = Project::new("Apollo");
        project.id = Some(1);
        m.open_edit_modal(&project);

        let state = m.state();
        assert!(state.create_modal_open && state.edit_modal_open);

        m.close_create_modal();
        m.close_edit_modal();
        assert_eq!(m.state(), UiState::default());
    }

    #[tokio::test]
    async fn overlapping_actions_reset_their_own_flags() {
        let m = manager(
            ScriptedTransport::new()
                .respond(200, "OK", "[]")
                .respond(200, "OK", "[]"),
        );
        tokio::join!(m.load(), m.load());
        let state = m.state();
        assert!(!state.loading);
        assert!(state.projects.is_empty());
    }
}
