use serde::{Deserialize, Serialize};

/// A project record as the tracker displays it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub status: String,
    pub manager: String,
    pub start_date: String,
    pub end_date: String,
}

/// Input for creating a project; the backing store assigns the id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewProject {
    pub title: Option<String>,
    pub status: Option<String>,
    pub manager: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl NewProject {
    #[cfg(test)]
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Complete the record with the given id, defaulting missing fields to ""
    pub fn into_project(self, id: i64) -> Project {
        Project {
            id,
            title: self.title.unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            manager: self.manager.unwrap_or_default(),
            start_date: self.start_date.unwrap_or_default(),
            end_date: self.end_date.unwrap_or_default(),
        }
    }
}

/// Returns the value only when it holds something; "" counts as absent
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// A list row as returned by SharePoint. Any text column may be missing or null.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListItem {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "ProjectStatus", default)]
    pub status: Option<String>,
    #[serde(rename = "ProjectManager", default)]
    pub manager: Option<String>,
    #[serde(rename = "StartDate", default)]
    pub start_date: Option<String>,
    #[serde(rename = "EndDate", default)]
    pub end_date: Option<String>,
}

impl From<ListItem> for Project {
    fn from(item: ListItem) -> Self {
        Project {
            id: item.id,
            title: item.title.unwrap_or_default(),
            status: item.status.unwrap_or_default(),
            manager: item.manager.unwrap_or_default(),
            start_date: item.start_date.unwrap_or_default(),
            end_date: item.end_date.unwrap_or_default(),
        }
    }
}

/// Body of the item creation request. Empty optional columns are left out entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ItemPayload {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "ProjectStatus", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "ProjectManager", skip_serializing_if = "Option::is_none")]
    pub manager: Option<String>,
    #[serde(rename = "StartDate", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(rename = "EndDate", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}
