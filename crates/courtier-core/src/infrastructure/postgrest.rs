//! Hosted store adapter speaking the PostgREST dialect (`/rest/v1/<table>`)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::aggregates::{Interaction, NewContact, NewProject};
use crate::domain::value_objects::{ConsentRecord, ContactId, ProjectId};
use crate::ports::outbound::{DataStore, StoreError};

const CONTACT_TABLE: &str = "contact";
const PROJECT_TABLE: &str = "projets";
const CONSENT_TABLE: &str = "consents";
const INTERACTION_TABLE: &str = "interactions";

/// Connection settings for the hosted store
#[derive(Debug, Clone)]
pub struct RestStoreConfig {
    pub base_url: String,
    pub service_key: String,
    pub timeout: Duration,
}

impl RestStoreConfig {
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            service_key: service_key.into(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// `DataStore` backed by the hosted relational store's REST interface
#[derive(Clone)]
pub struct RestDataStore {
    base: Url,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct ContactRow {
    identifiant: i64,
}

#[derive(Deserialize)]
struct ProjectRow {
    projet_id: i64,
}

enum Returning {
    Representation,
    Minimal,
}

impl RestDataStore {
    pub fn new(config: RestStoreConfig) -> Result<Self, StoreError> {
        let key = header::HeaderValue::from_str(&config.service_key)
            .map_err(|_| StoreError::Connection("service key is not a valid header value".into()))?;
        let bearer = header::HeaderValue::from_str(&format!("Bearer {}", config.service_key))
            .map_err(|_| StoreError::Connection("service key is not a valid header value".into()))?;

        let mut headers = header::HeaderMap::new();
        headers.insert("apikey", key);
        headers.insert(header::AUTHORIZATION, bearer);
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let mut raw = config.base_url.trim_end_matches('/').to_string();
        raw.push_str("/rest/v1/");
        let base = Url::parse(&raw).map_err(|e| StoreError::Connection(format!("invalid store url: {e}")))?;

        Ok(Self { base, http })
    }

    fn table_url(&self, table: &str) -> Result<Url, StoreError> {
        self.base
            .join(table)
            .map_err(|e| StoreError::Connection(format!("invalid table url: {e}")))
    }

    async fn insert<B: Serialize + ?Sized>(
        &self,
        table: &str,
        body: &B,
        returning: Returning,
    ) -> Result<Vec<u8>, StoreError> {
        let prefer = match returning {
            Returning::Representation => "return=representation",
            Returning::Minimal => "return=minimal",
        };
        let request = self
            .http
            .request(Method::POST, self.table_url(table)?)
            .header("Prefer", prefer)
            .json(body);
        send(request).await
    }

    async fn insert_returning<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        table: &str,
        body: &B,
    ) -> Result<T, StoreError> {
        let bytes = self.insert(table, body, Returning::Representation).await?;
        let mut rows: Vec<T> =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::Decode(e.to_string()))?;
        if rows.is_empty() {
            return Err(StoreError::Decode(format!("{table}: insert returned no row")));
        }
        Ok(rows.swap_remove(0))
    }
}

async fn send(request: reqwest::RequestBuilder) -> Result<Vec<u8>, StoreError> {
    let response = request.send().await.map_err(transport_error)?;
    let status = response.status();
    let body = response.bytes().await.map_err(transport_error)?;

    if status.is_success() {
        return Ok(body.to_vec());
    }

    let detail = String::from_utf8_lossy(&body);
    Err(match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => StoreError::Timeout,
        _ => StoreError::Rejected(format!("{status}: {detail}")),
    })
}

fn transport_error(error: reqwest::Error) -> StoreError {
    if error.is_timeout() {
        StoreError::Timeout
    } else {
        StoreError::Connection(error.to_string())
    }
}

#[async_trait]
impl DataStore for RestDataStore {
    async fn create_contact(&self, contact: &NewContact) -> Result<ContactId, StoreError> {
        let row: ContactRow = self.insert_returning(CONTACT_TABLE, contact).await?;
        tracing::debug!(contact_id = row.identifiant, "Contact inserted");
        Ok(ContactId::new(row.identifiant))
    }

    async fn find_contact_by_email(&self, email: &str) -> Result<Option<ContactId>, StoreError> {
        let filter = format!("eq.{email}");
        let request = self
            .http
            .request(Method::GET, self.table_url(CONTACT_TABLE)?)
            .query(&[("select", "identifiant"), ("email", filter.as_str()), ("limit", "2")]);

        let bytes = send(request).await?;
        let rows: Vec<ContactRow> =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::Decode(e.to_string()))?;

        match rows.as_slice() {
            [] => Ok(None),
            [row] => Ok(Some(ContactId::new(row.identifiant))),
            _ => Err(StoreError::Ambiguous(format!("several contacts for {email}"))),
        }
    }

    async fn record_consents(&self, consents: &[ConsentRecord]) -> Result<(), StoreError> {
        self.insert(CONSENT_TABLE, consents, Returning::Minimal).await.map(|_| ())
    }

    async fn create_project(&self, project: &NewProject) -> Result<ProjectId, StoreError> {
        let row: ProjectRow = self.insert_returning(PROJECT_TABLE, project).await?;
        tracing::debug!(project_id = row.projet_id, "Project inserted");
        Ok(ProjectId::new(row.projet_id))
    }

    async fn insert_interaction(&self, interaction: &Interaction) -> Result<(), StoreError> {
        self.insert(INTERACTION_TABLE, interaction, Returning::Minimal).await.map(|_| ())
    }
}
