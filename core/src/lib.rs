//! API client core for the project management service.
//!
//! # Overview
//! `ProjectClient` builds `HttpRequest` values and parses `HttpResponse`
//! values without touching the network; a `Transport` performs the round-trip.
//! `ProjectApi` binds the two into async CRUD operations, and
//! `ProjectManager` sequences those operations with loading flags, modal
//! state, and an `ErrorNotifier` banner for a front-end to render.
//!
//! # Design
//! - `ProjectClient` is stateless; it holds only `base_url`.
//! - Every failed response is normalized into one message
//!   (`client::error_message`), carried by `ApiError`.
//! - `ProjectManager` is the recovery boundary: actions never return errors.
//! - Configuration (`Config`) is resolved once and passed in explicitly.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod manager;
pub mod notifier;
pub mod types;

#[cfg(test)]
mod testing;

pub use api::ProjectApi;
pub use client::{error_message, ProjectClient};
pub use config::Config;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use manager::{Confirm, ProjectManager, UiState};
pub use notifier::{ErrorBanner, ErrorNotifier};
pub use types::{ProblemDetail, Project};
