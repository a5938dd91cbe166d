//!
//! `tablestore` is a thin asynchronous client for a hosted tabular store
//! exposing a PostgREST-style REST interface plus an object-storage endpoint.
//!
//! Rows are untyped `serde_json::Value` objects; callers own the mapping to
//! their domain records. Every table is addressed by name and every row is
//! identified by its `id` column.
use std::{
    error::Error,
    fmt::{self, Formatter},
};

use log::debug;
use reqwest::{
    header::{ACCEPT, CONTENT_TYPE},
    Client, Method, RequestBuilder, StatusCode,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use url::{ParseError, Url};

use config::StoreConfiguration;
use query::{Filter, Order};

pub mod config;
pub mod query;
pub mod storage;

type Result<T> = std::result::Result<T, StoreError>;

/// Error document returned by the store on client errors.
#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

#[derive(Debug)]
pub enum StoreError {
    Unauthorized,
    NotFound(String),
    Fault { code: StatusCode, body: ErrorBody },
    RowNotFound(String, String),
    MissingRepresentation(String),
    UploadRejected(StatusCode),
    RequestError(reqwest::Error),
    SerializationError(serde_json::error::Error),
    ParseError(ParseError),
    UnexpectedStatus(StatusCode),
}

#[allow(clippy::enum_glob_use)]
impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        use crate::StoreError::*;

        match self {
            Unauthorized => writeln!(f, "The store rejected the supplied credentials"),
            NotFound(url) => writeln!(f, "Not found: '{url}'"),
            Fault { code, body } => writeln!(f, "Store error ({code}): {}", body.message),
            RowNotFound(table, id) => {
                writeln!(f, "No row with id '{id}' in table '{table}'")
            }
            MissingRepresentation(table) => {
                writeln!(f, "The store returned no representation for table '{table}'")
            }
            UploadRejected(sc) => writeln!(f, "Object upload rejected: {sc}"),
            RequestError(e) => writeln!(f, "Internal error in reqwest library: {}", e.to_string().as_str()),
            SerializationError(e) => writeln!(f, "Could not serialize/deserialize: {e:?}!"),
            ParseError(e) => writeln!(f, "Could not connect to the store: {e:?}!"),
            UnexpectedStatus(sc) => writeln!(f, "Unexpected response status: {sc}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StoreError::RequestError(e) => Some(e),
            StoreError::SerializationError(e) => Some(e),
            StoreError::ParseError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParseError> for StoreError {
    fn from(error: ParseError) -> StoreError {
        StoreError::ParseError(error)
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(error: reqwest::Error) -> StoreError {
        StoreError::RequestError(error)
    }
}

impl From<serde_json::error::Error> for StoreError {
    fn from(error: serde_json::error::Error) -> StoreError {
        StoreError::SerializationError(error)
    }
}

#[derive(Clone, Debug)]
pub enum Credentials {
    Anonymous,
    /// Service or anon key, sent both as the `apikey` header and as a bearer token.
    ApiKey(String),
    Bearer(String),
}

impl Credentials {
    pub(crate) fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Credentials::Anonymous => request,
            Credentials::ApiKey(ref key) => request
                .header("apikey", key.to_owned())
                .bearer_auth(key.to_owned()),
            Credentials::Bearer(ref token) => request.bearer_auth(token.to_owned()),
        }
    }
}

#[derive(Clone)]
pub struct Store {
    pub(crate) host: Url,
    api: String,
    pub(crate) credentials: Credentials,
    pub client: Client,
}

impl Store {
    #[allow(clippy::missing_errors_doc)]
    pub fn new<H>(host: H, credentials: Credentials) -> Result<Store>
    where
        H: Into<String>,
    {
        let host = Url::parse(&host.into())?;

        Ok(Store {
            host,
            api: "rest/v1".to_string(),
            client: Client::new(),
            credentials,
        })
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn from(cfg: &StoreConfiguration) -> Result<Store> {
        Store::new(cfg.url.clone(), Credentials::ApiKey(cfg.api_key.clone()))
    }

    async fn request<D>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Vec<u8>>,
        prefer: Option<&str>,
    ) -> Result<D>
    where
        D: DeserializeOwned,
    {
        let url = self.host.join(&format!("{}{endpoint}", self.api))?;

        let mut request = self
            .client
            .request(method, url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");

        request = self.credentials.apply(request);

        if let Some(prefer) = prefer {
            request = request.header("Prefer", prefer);
        }
        if let Some(body) = body {
            request = request.body(body);
        }
        debug!("request '{:?}'", request);

        let response = request.send().await?;

        let status = response.status();
        let body = &response.text().await?;
        debug!("status {:?} body '{:?}'", status, body);
        match status {
            StatusCode::UNAUTHORIZED => Err(StoreError::Unauthorized),
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(url.to_string())),
            client_err if client_err.is_client_error() => Err(StoreError::Fault {
                code: status,
                body: serde_json::from_str::<ErrorBody>(body)?,
            }),
            _ => {
                let data = if body.is_empty() { "null" } else { body };
                Ok(serde_json::from_str::<D>(data)?)
            }
        }
    }

    /// Fetches all rows of `table` matching `filter`, optionally sorted by the store.
    #[allow(clippy::missing_errors_doc)]
    pub async fn select(
        &self,
        table: &str,
        filter: &Filter,
        order: Option<&Order>,
    ) -> Result<Vec<Value>> {
        let mut endpoint = format!("/{table}?select=*");
        if !filter.is_empty() {
            endpoint.push('&');
            endpoint.push_str(&filter.to_query());
        }
        if let Some(order) = order {
            endpoint.push('&');
            endpoint.push_str(&order.to_query());
        }
        self.request::<Vec<Value>>(Method::GET, &endpoint, None, None)
            .await
    }

    /// Inserts `row` into `table` and returns the stored representation,
    /// including server-assigned columns such as `id` and `created_at`.
    #[allow(clippy::missing_errors_doc)]
    pub async fn insert(&self, table: &str, row: &Value) -> Result<Value> {
        let data = serde_json::to_string(row)?;
        let rows: Vec<Value> = self
            .request(
                Method::POST,
                &format!("/{table}"),
                Some(data.into_bytes()),
                Some("return=representation"),
            )
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::MissingRepresentation(table.to_string()))
    }

    /// Applies a partial update to the row of `table` identified by `id`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::RowNotFound` when no row matched `id`, detected
    /// from the empty representation the store returns in that case.
    pub async fn update(&self, table: &str, id: &str, partial: &Value) -> Result<Value> {
        let data = serde_json::to_string(partial)?;
        let rows: Vec<Value> = self
            .request(
                Method::PATCH,
                &format!("/{table}?id=eq.{}", urlencoding::encode(id)),
                Some(data.into_bytes()),
                Some("return=representation"),
            )
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::RowNotFound(table.to_string(), id.to_string()))
    }

    /// Deletes the row of `table` identified by `id`. Deleting an id that is
    /// already gone is not an error.
    #[allow(clippy::missing_errors_doc)]
    pub async fn delete_row(&self, table: &str, id: &str) -> Result<()> {
        self.request::<Value>(
            Method::DELETE,
            &format!("/{table}?id=eq.{}", urlencoding::encode(id)),
            None,
            None,
        )
        .await?;
        Ok(())
    }

    /// Counts the rows of `table` matching `filter` with a live query.
    ///
    /// The store is asked for the `id` column only; the count is the number
    /// of returned rows, mirroring how the hosted API reports exact counts.
    #[allow(clippy::missing_errors_doc)]
    pub async fn count(&self, table: &str, filter: &Filter) -> Result<u64> {
        let mut endpoint = format!("/{table}?select=id");
        if !filter.is_empty() {
            endpoint.push('&');
            endpoint.push_str(&filter.to_query());
        }
        let rows: Vec<Value> = self.request(Method::GET, &endpoint, None, None).await?;
        Ok(rows.len() as u64)
    }

    /// Invokes a stored procedure. Returns `Value::Null` for void functions.
    #[allow(clippy::missing_errors_doc)]
    pub async fn rpc(&self, function: &str, args: &Value) -> Result<Value> {
        let data = serde_json::to_string(args)?;
        self.request::<Value>(
            Method::POST,
            &format!("/rpc/{function}"),
            Some(data.into_bytes()),
            None,
        )
        .await
    }
}
