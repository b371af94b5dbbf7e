//! Clients for the Affinidi Elements REST APIs
//!
//! Identity/project listing (IAM), login configurations (VPA) and credential
//! issuance (CIS). Each call authenticates with the caller-supplied API key.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::types::{
    ListLoginConfigurationsResponse, ListProjectsResponse, PageQuery, StartIssuanceInput,
    StartIssuanceResponse,
};

pub const DEFAULT_API_BASE_URL: &str = "https://apse1.api.affinidi.io";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("Request failed with status code {status}")]
    Status { status: u16, body: String },

    #[error("{0}")]
    Other(String),
}

/// The external collaborators called by the elements tools
#[async_trait]
pub trait ElementsApi: Send + Sync {
    async fn list_projects(&self, api_key: &str, page: &PageQuery)
        -> Result<Vec<Value>, ApiError>;

    async fn list_login_configurations(
        &self,
        api_key: &str,
        page: &PageQuery,
    ) -> Result<Vec<Value>, ApiError>;

    async fn start_issuance(
        &self,
        api_key: &str,
        project_id: &str,
        input: &StartIssuanceInput,
    ) -> Result<StartIssuanceResponse, ApiError>;
}

#[derive(Debug, Clone)]
pub struct HttpElementsApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpElementsApi {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorized(builder: RequestBuilder, api_key: &str) -> RequestBuilder {
        builder.header(reqwest::header::AUTHORIZATION, api_key)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        api_key: &str,
        path: &str,
        page: &PageQuery,
    ) -> Result<T, ApiError> {
        let request = Self::authorized(self.http.get(self.url(path)), api_key).query(page);
        decode(request.send().await?).await
    }

    async fn post_json<B: serde::Serialize + Sync, T: DeserializeOwned>(
        &self,
        api_key: &str,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = Self::authorized(self.http.post(self.url(path)), api_key).json(body);
        decode(request.send().await?).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = %status, body = %body, "Elements API request failed");
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.json::<T>().await?)
}

#[async_trait]
impl ElementsApi for HttpElementsApi {
    async fn list_projects(
        &self,
        api_key: &str,
        page: &PageQuery,
    ) -> Result<Vec<Value>, ApiError> {
        let response: ListProjectsResponse = self.get_json(api_key, "/iam/v1/projects", page).await?;
        Ok(response.projects)
    }

    async fn list_login_configurations(
        &self,
        api_key: &str,
        page: &PageQuery,
    ) -> Result<Vec<Value>, ApiError> {
        let response: ListLoginConfigurationsResponse = self
            .get_json(api_key, "/vpa/v1/login/configurations", page)
            .await?;
        Ok(response.configurations)
    }

    async fn start_issuance(
        &self,
        api_key: &str,
        project_id: &str,
        input: &StartIssuanceInput,
    ) -> Result<StartIssuanceResponse, ApiError> {
        if project_id.is_empty() {
            return Err(ApiError::Other("project id is required".to_string()));
        }
        self.post_json(
            api_key,
            &format!("/cis/v1/{project_id}/issuance/start"),
            input,
        )
        .await
    }
}
