//! HTTP client for the movie catalogue service.

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::config::DataSourceConfig;
use crate::error::{Error, Result};
use crate::types::{MovieRecord, ReportParameter, UserRecord};

use super::ReportDataSource;

const MOVIE_REPORT_PATH: &str = "v1/movie/report/";
const TOP_USERS_PATH: &str = "v1/user/top";
const QUERY_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// [`ReportDataSource`] backed by the catalogue's REST API
pub struct MovielandClient {
    client: Client,
    base_url: Url,
}

impl MovielandClient {
    /// Build a client with the configured base URL and request timeout
    pub fn new(config: &DataSourceConfig) -> Result<Self> {
        let mut base_url = Url::parse(&config.base_url).map_err(|e| Error::Config {
            message: format!("invalid data source url: {}", e),
            key: Some("data_source.base_url".to_string()),
        })?;
        // Url::join drops the last segment unless the base ends with a slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(|e| Error::Config {
            message: format!("invalid endpoint {}: {}", path, e),
            key: Some("data_source.base_url".to_string()),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self.client.get(url.clone()).query(query).send().await?;

        if !response.status().is_success() {
            return Err(Error::UpstreamStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl ReportDataSource for MovielandClient {
    async fn fetch_page(
        &self,
        page: usize,
        page_size: usize,
        parameter: &ReportParameter,
    ) -> Result<Vec<MovieRecord>> {
        tracing::debug!(page, page_size, ?parameter, "Requesting movie page");

        let mut query = vec![("page", page.to_string()), ("count", page_size.to_string())];
        if let Some(from) = parameter.from_date {
            query.push(("fromDate", from.format(QUERY_DATE_FORMAT).to_string()));
        }
        if let Some(to) = parameter.to_date {
            query.push(("toDate", to.format(QUERY_DATE_FORMAT).to_string()));
        }

        let movies: Vec<MovieRecord> = self
            .get_json(self.endpoint(MOVIE_REPORT_PATH)?, &query)
            .await?;

        tracing::debug!(page, received = movies.len(), "Movie page received");
        Ok(movies)
    }

    async fn fetch_top_users(&self) -> Result<Vec<UserRecord>> {
        tracing::info!("Requesting top users");

        let users: Vec<UserRecord> = self.get_json(self.endpoint(TOP_USERS_PATH)?, &[]).await?;

        tracing::info!(received = users.len(), "Top users received");
        Ok(users)
    }
}
