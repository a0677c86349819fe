use super::table::Table;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Something that can produce a fresh snapshot of the HR spreadsheet.
///
/// Implementations return an error on failure; turning that into an empty table
/// is the cache's job.
#[async_trait]
pub trait DataSource: Send + Sync + 'static {
    /// Loads every record and builds a new [`Table`].
    async fn load(&self) -> Result<Table, AppError>;

    /// Where the data comes from, for logs and the `check` report.
    fn describe(&self) -> String;
}

/// Records exported to a local JSON file (an array of row objects).
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DataSource for JsonFileSource {
    async fn load(&self) -> Result<Table, AppError> {
        debug!("Reading dataset file {:?}", self.path);
        let raw = tokio::fs::read_to_string(&self.path).await?;
        parse_records(&raw)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// Records served over HTTP as a JSON array, e.g. a published sheet endpoint.
pub struct HttpJsonSource {
    url: Url,
    client: Client,
}

impl HttpJsonSource {
    /// `timeout` bounds each fetch so a stalled endpoint fails like any other load error.
    pub fn new(url: Url, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(url, client))
    }

    pub fn with_client(url: Url, client: Client) -> Self {
        Self { url, client }
    }
}

#[async_trait]
impl DataSource for HttpJsonSource {
    async fn load(&self) -> Result<Table, AppError> {
        info!("Fetching dataset from {}", self.url);
        let res = self.client.get(self.url.clone()).send().await?;
        let status = res.status();

        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::Dataset(format!(
                "Dataset request failed with status {}: {}",
                status, body
            )));
        }

        let raw = res.text().await?;
        parse_records(&raw)
    }

    fn describe(&self) -> String {
        format!("url {}", self.url)
    }
}

/// Picks the source for a configured location: `http(s)://` URLs go over the
/// network, anything else is a file path.
pub fn source_for(location: &str, timeout: Duration) -> Result<Box<dyn DataSource>, AppError> {
    if location.starts_with("http://") || location.starts_with("https://") {
        let url = Url::parse(location)?;
        Ok(Box::new(HttpJsonSource::new(url, timeout)?))
    } else {
        Ok(Box::new(JsonFileSource::new(location)))
    }
}

#[async_trait]
impl DataSource for Box<dyn DataSource> {
    async fn load(&self) -> Result<Table, AppError> {
        (**self).load().await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

fn parse_records(raw: &str) -> Result<Table, AppError> {
    let value: Value = serde_json::from_str(raw)?;
    let Value::Array(rows) = value else {
        return Err(AppError::Dataset(
            "Expected a JSON array of row objects".to_string(),
        ));
    };

    let records = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| match row {
            Value::Object(map) => Ok(map),
            other => Err(AppError::Dataset(format!(
                "Row {} is not an object: {}",
                i, other
            ))),
        })
        .collect::<Result<Vec<Map<String, Value>>, AppError>>()?;

    Ok(Table::from_records(records))
}
