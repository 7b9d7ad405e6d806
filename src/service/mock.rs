use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use super::{ProjectService, ServiceError};
use crate::models::{NewProject, Project};

/// In-memory stand-in for the SharePoint list, used for local development.
///
/// Reads always return the same three sample projects. Adds echo the input
/// back with a timestamp id and are not remembered.
pub struct MockProjectService {
    list_name: String,
}

impl MockProjectService {
    pub fn new(list_name: String) -> Self {
        Self { list_name }
    }
}

fn sample(id: i64, title: &str, status: &str, manager: &str, start: &str, end: &str) -> Project {
    Project {
        id,
        title: title.to_string(),
        status: status.to_string(),
        manager: manager.to_string(),
        start_date: start.to_string(),
        end_date: end.to_string(),
    }
}

pub fn sample_projects() -> Vec<Project> {
    vec![
        sample(1, "Q1 Product Launch", "In Progress", "John Smith", "2024-01-15", "2024-03-30"),
        sample(2, "Website Redesign", "Planning", "Sarah Johnson", "2024-02-01", "2024-05-15"),
        sample(3, "Mobile App Development", "Completed", "Mike Davis", "2023-10-01", "2024-01-10"),
    ]
}

#[async_trait]
impl ProjectService for MockProjectService {
    async fn list_projects(&self) -> Result<Vec<Project>, ServiceError> {
        debug!(list = %self.list_name, "returning sample projects");
        Ok(sample_projects())
    }

    async fn add_project(&self, project: NewProject) -> Result<Project, ServiceError> {
        let project = project.into_project(Utc::now().timestamp_millis());
        debug!(id = project.id, title = %project.title, "created sample project");
        Ok(project)
    }

    fn list_name(&self) -> &str {
        &self.list_name
    }

    fn backend_label(&self) -> String {
        "sample data".to_string()
    }
}
