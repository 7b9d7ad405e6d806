//! Project data access.
//!
//! Callers pick a backend once, through [`connect`], and then talk to it
//! through the [`ProjectService`] trait. Failures are reduced to two kinds:
//! the configured list is missing, or anything else.

mod dates;
mod mock;
mod remote;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Url;
use tracing::info;

use crate::config::{BackendMode, Config};
use crate::models::{NewProject, Project};
use crate::sharepoint::SharePointClient;

pub use dates::display_date;
pub use mock::MockProjectService;
pub use remote::SharePointProjectService;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("The list \"{list}\" was not found")]
    ListNotFound { list: String },

    #[error("{0}")]
    Other(String),
}

impl ServiceError {
    pub fn is_list_not_found(&self) -> bool {
        matches!(self, ServiceError::ListNotFound { .. })
    }
}

#[async_trait]
pub trait ProjectService: Send + Sync {
    /// Every project currently in the store; nothing is cached between calls
    async fn list_projects(&self) -> Result<Vec<Project>, ServiceError>;

    /// Create a project and return it as stored, with its assigned id
    async fn add_project(&self, project: NewProject) -> Result<Project, ServiceError>;

    /// Title of the list the service reads from and writes to
    fn list_name(&self) -> &str;

    /// Short label for the status line
    fn backend_label(&self) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Mock,
    SharePoint,
}

/// Hosts used while developing locally
pub fn is_local_host(host: &str) -> bool {
    host == "localhost" || host == "127.0.0.1" || host.contains("workbench")
}

/// True when the site URL points at a local development host, or is not set at all
pub fn is_local_site(site_url: &str) -> bool {
    if site_url.is_empty() {
        return true;
    }
    Url::parse(site_url)
        .ok()
        .and_then(|url| url.host_str().map(is_local_host))
        .unwrap_or(false)
}

pub fn resolve_backend(config: &Config) -> BackendKind {
    match config.backend {
        BackendMode::Mock => BackendKind::Mock,
        BackendMode::SharePoint => BackendKind::SharePoint,
        BackendMode::Auto if is_local_site(config.site_url()) => BackendKind::Mock,
        BackendMode::Auto => BackendKind::SharePoint,
    }
}

/// Build the service for this configuration. The backend choice is fixed for the service's lifetime.
pub fn connect(config: &Config) -> Result<Box<dyn ProjectService>> {
    config.validate()?;

    let service: Box<dyn ProjectService> = match resolve_backend(config) {
        BackendKind::Mock => {
            info!(site = config.site_url(), "using sample project data");
            Box::new(MockProjectService::new(config.list_name.clone()))
        }
        BackendKind::SharePoint => {
            let client = SharePointClient::new(config)?;
            info!(site = client.site_url(), list = %config.list_name, "using SharePoint list");
            Box::new(SharePointProjectService::new(client, config.list_name.clone()))
        }
    };

    Ok(service)
}
