use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use super::dates::normalize_date;
use super::{ProjectService, ServiceError};
use crate::models::{non_empty, ItemPayload, NewProject, Project};
use crate::sharepoint::{SharePointClient, SharePointError};

/// Projects stored in a SharePoint list
pub struct SharePointProjectService {
    client: SharePointClient,
    list_name: String,
}

impl SharePointProjectService {
    pub fn new(client: SharePointClient, list_name: String) -> Self {
        Self { client, list_name }
    }

    fn not_found(&self) -> ServiceError {
        ServiceError::ListNotFound {
            list: self.list_name.clone(),
        }
    }

    fn read_error(&self, err: SharePointError) -> ServiceError {
        if err.is_not_found() {
            warn!(list = %self.list_name, site = self.client.site_url(), "list not found");
            return self.not_found();
        }
        error!(list = %self.list_name, error = %err, "failed to load projects");
        ServiceError::Other(err.to_string())
    }

    fn write_error(&self, err: SharePointError) -> ServiceError {
        if err.is_not_found() {
            warn!(list = %self.list_name, site = self.client.site_url(), "list not found");
            return self.not_found();
        }
        error!(list = %self.list_name, error = %err, body = err.body().unwrap_or(""), "failed to add project");

        let mut message = format!("Failed to add project: {}", err.message());
        if let Some(body) = err.body() {
            message.push_str(" - ");
            message.push_str(body);
        }
        ServiceError::Other(message)
    }
}

/// Outbound item for a new project: dates normalized, empty optional columns left out
pub fn build_payload(project: &NewProject) -> Result<ItemPayload, ServiceError> {
    let date = |value: &Option<String>| -> Result<Option<String>, ServiceError> {
        match non_empty(value) {
            Some(value) => normalize_date(value),
            None => Ok(None),
        }
    };

    Ok(ItemPayload {
        title: project.title.clone().unwrap_or_default(),
        status: non_empty(&project.status).map(str::to_string),
        manager: non_empty(&project.manager).map(str::to_string),
        start_date: date(&project.start_date)?,
        end_date: date(&project.end_date)?,
    })
}

#[async_trait]
impl ProjectService for SharePointProjectService {
    async fn list_projects(&self) -> Result<Vec<Project>, ServiceError> {
        info!(site = self.client.site_url(), list = %self.list_name, "checking for list");
        let list = self
            .client
            .get_list(&self.list_name)
            .await
            .map_err(|err| self.read_error(err))?;
        debug!(title = %list.title, item_count = list.item_count, "list found");

        let items = self
            .client
            .get_items(&self.list_name)
            .await
            .map_err(|err| self.read_error(err))?;

        Ok(items.into_iter().map(Project::from).collect())
    }

    async fn add_project(&self, project: NewProject) -> Result<Project, ServiceError> {
        let payload = build_payload(&project)?;
        info!(
            site = self.client.site_url(),
            list = %self.list_name,
            payload = ?payload,
            "adding project"
        );

        self.client
            .get_list(&self.list_name)
            .await
            .map_err(|err| {
                if err.is_not_found() {
                    self.write_error(err)
                } else {
                    // Only a 404 means the list is missing; anything else is a failed check
                    error!(list = %self.list_name, error = %err, "list verification failed");
                    ServiceError::Other(format!(
                        "Failed to add project: list check failed: {}",
                        err.message()
                    ))
                }
            })?;

        let item = self
            .client
            .add_item(&self.list_name, &payload)
            .await
            .map_err(|err| self.write_error(err))?;
        info!(id = item.id, "project added");

        Ok(Project::from(item))
    }

    fn list_name(&self) -> &str {
        &self.list_name
    }

    fn backend_label(&self) -> String {
        format!("SharePoint: {}", self.client.site_url())
    }
}
