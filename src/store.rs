use std::fmt;

use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;

use crate::error::{FetchError, StoreError};

/// The store owns record identifiers; depending on the collection they come
/// back as integers or as strings, and this synchronizer never inspects them
/// beyond routing them into item URLs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Str(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{id}"),
            RecordId::Str(id) => f.write_str(id),
        }
    }
}

/// A record as it exists in the store. Only the compared fields are
/// deserialized; everything else the store keeps on a record is left alone.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredRecord {
    pub id: RecordId,

    #[serde(rename = "externalUrl")]
    pub external_url: String,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

impl StoredRecord {
    /// Strict comparison over the two tracked fields. A record whose store
    /// copy differs in any other field is deliberately left untouched.
    pub fn differs_from(&self, fields: &RecordFields) -> bool {
        self.title.as_deref() != Some(fields.title.as_str())
            || self.description.as_deref() != Some(fields.description.as_str())
    }
}

/// The writable shape of an externally sourced record, used for both create
/// and update calls. `content` stays null: these records have no local body,
/// only a link out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordFields {
    pub title: String,
    pub description: String,

    #[serde(rename = "externalUrl")]
    pub external_url: String,

    pub content: Option<String>,

    #[serde(
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_created: Option<OffsetDateTime>,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

pub struct StoreClient {
    http: Client,
    items_url: String,
    token: String,
}

impl StoreClient {
    pub fn new(http: Client, base_url: &Url, collection: &str, token: String) -> Self {
        let items_url = format!(
            "{}/items/{collection}",
            base_url.as_str().trim_end_matches('/')
        );

        Self {
            http,
            items_url,
            token,
        }
    }

    /// Lists every record carrying a non-null external URL. Records without
    /// one were authored in the store directly and are none of our business.
    pub async fn list_external(&self) -> Result<Vec<StoredRecord>, FetchError> {
        let filter = r#"{"externalUrl":{"_nnull":true}}"#;

        let response = self
            .http
            .get(&self.items_url)
            .query(&[("filter", filter), ("limit", "-1")])
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| FetchError::List(StoreError::Transport(e)))?;
        let response = check_status(response).await.map_err(FetchError::List)?;
        let envelope: Envelope<Vec<StoredRecord>> = response
            .json()
            .await
            .map_err(|e| FetchError::List(StoreError::Decode(e)))?;

        debug!(
            "The store holds {} externally sourced records",
            envelope.data.len()
        );

        Ok(envelope.data)
    }

    pub async fn create(&self, fields: &RecordFields) -> Result<StoredRecord, StoreError> {
        let response = self
            .http
            .post(&self.items_url)
            .bearer_auth(&self.token)
            .json(fields)
            .send()
            .await
            .map_err(StoreError::Transport)?;
        let response = check_status(response).await?;
        let envelope: Envelope<StoredRecord> =
            response.json().await.map_err(StoreError::Decode)?;

        debug!("Created record {}", envelope.data.id);

        Ok(envelope.data)
    }

    pub async fn update(
        &self,
        id: &RecordId,
        fields: &RecordFields,
    ) -> Result<StoredRecord, StoreError> {
        let response = self
            .http
            .patch(format!("{}/{id}", self.items_url))
            .bearer_auth(&self.token)
            .json(fields)
            .send()
            .await
            .map_err(StoreError::Transport)?;
        let response = check_status(response).await?;
        let envelope: Envelope<StoredRecord> =
            response.json().await.map_err(StoreError::Decode)?;

        Ok(envelope.data)
    }

    pub async fn delete(&self, id: &RecordId) -> Result<(), StoreError> {
        let response = self
            .http
            .delete(format!("{}/{id}", self.items_url))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(StoreError::Transport)?;
        check_status(response).await?;

        Ok(())
    }
}

async fn check_status(response: Response) -> Result<Response, StoreError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let detail = match response.text().await {
        Ok(text) => text.trim().to_string(),
        Err(_) => String::new(),
    };

    Err(StoreError::Rejected { status, detail })
}
