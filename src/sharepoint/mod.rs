//! Thin client for the SharePoint list REST API.
//!
//! Only the three calls the tracker needs are exposed: fetch a list by title
//! (used as an existence probe), read all of its items and create one item.

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::Config;
use crate::models::{ItemPayload, ListItem};

const ODATA_JSON: &str = "application/json;odata=nometadata";

/// Columns requested when reading items
pub const ITEM_COLUMNS: &str = "Id,Title,ProjectStatus,ProjectManager,StartDate,EndDate";

#[derive(Debug, thiserror::Error)]
pub enum SharePointError {
    #[error("Invalid site URL \"{0}\"")]
    InvalidSiteUrl(String),

    #[error("Access token is not a valid header value")]
    InvalidToken,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("SharePoint returned HTTP {status}: {message}")]
    Status {
        status: u16,
        message: String,
        body: String,
    },

    #[error("Unexpected response from SharePoint: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },
}

impl SharePointError {
    pub fn status(&self) -> Option<u16> {
        match self {
            SharePointError::Status { status, .. } => Some(*status),
            SharePointError::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND.as_u16())
    }

    /// Short human readable description, without the raw body
    pub fn message(&self) -> String {
        match self {
            SharePointError::Status { message, .. } => message.clone(),
            SharePointError::Decode { source, .. } => source.to_string(),
            other => other.to_string(),
        }
    }

    /// Raw response body, when the failure carried one
    pub fn body(&self) -> Option<&str> {
        match self {
            SharePointError::Status { body, .. } | SharePointError::Decode { body, .. } => {
                Some(body.as_str()).filter(|b| !b.is_empty())
            }
            _ => None,
        }
    }
}

/// Metadata returned by the list probe
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListInfo {
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "ItemCount", default)]
    pub item_count: i64,
}

#[derive(Debug, Deserialize)]
struct ItemCollection {
    value: Vec<ListItem>,
}

pub struct SharePointClient {
    http: Client,
    site_url: String,
}

impl SharePointClient {
    pub fn new(config: &Config) -> Result<Self, SharePointError> {
        let site_url = config.site_url().to_string();
        Url::parse(&site_url).map_err(|_| SharePointError::InvalidSiteUrl(site_url.clone()))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ODATA_JSON));
        if let Some(token) = config.access_token.as_deref().filter(|t| !t.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| SharePointError::InvalidToken)?;
            value.set_sensitive(true);
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }

        let http = Client::builder().default_headers(headers).build()?;

        Ok(Self { http, site_url })
    }

    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    fn list_url(&self, list: &str) -> String {
        format!(
            "{}/_api/web/lists/getbytitle('{}')",
            self.site_url,
            list.replace('\'', "''")
        )
    }

    /// Fetch list metadata. A missing list surfaces as HTTP 404.
    pub async fn get_list(&self, list: &str) -> Result<ListInfo, SharePointError> {
        let request = self.http.get(self.list_url(list));
        self.send(request).await
    }

    pub async fn get_items(&self, list: &str) -> Result<Vec<ListItem>, SharePointError> {
        let request = self
            .http
            .get(format!("{}/items", self.list_url(list)))
            .query(&[("$select", ITEM_COLUMNS)]);
        let collection: ItemCollection = self.send(request).await?;
        Ok(collection.value)
    }

    pub async fn add_item(
        &self,
        list: &str,
        payload: &ItemPayload,
    ) -> Result<ListItem, SharePointError> {
        let request = self
            .http
            .post(format!("{}/items", self.list_url(list)))
            .header(CONTENT_TYPE, ODATA_JSON)
            .json(payload);
        self.send(request).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, SharePointError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = odata_error_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
            return Err(SharePointError::Status {
                status: status.as_u16(),
                message,
                body,
            });
        }

        serde_json::from_str(&body).map_err(|source| SharePointError::Decode { source, body })
    }
}

/// Pull the human readable message out of an OData error body
fn odata_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let error = value.get("odata.error").or_else(|| value.get("error"))?;
    let message = error.get("message")?;

    match message {
        Value::String(text) => Some(text.clone()),
        Value::Object(_) => message.get("value")?.as_str().map(str::to_string),
        _ => None,
    }
}
