use async_trait::async_trait;
use std::future::Future;
use std::io;
use std::time::Duration;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tracing::{debug, info};

use crate::config::RegistryConfig;
use super::api::ModelRegistryApi;
use super::error::RegistryError;
use super::types::{ListPage, ModelArtifact, ModelVersion, RegisteredModel, ServingEnvironment, MODEL_ARTIFACT_TYPE};

/// REST prefix of the model registry API.
pub const API_BASE_PATH: &str = "/api/model_registry/v1alpha3";

// Error payload returned by the registry on non-2xx responses
#[derive(Deserialize, Debug)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// HTTP client for a single registry endpoint.
///
/// Built by [`RegistryClient::connect`], which dials the endpoint once before
/// any request is issued. Requests after that go through the pooled `reqwest`
/// client and have no per-call timeout; pooled connections close when the
/// client is dropped.
pub struct RegistryClient {
    http: Client,
    addr: String,
    base_url: String,
    page_size: u32,
}

impl RegistryClient {
    /// Dials `host:port` within the configured timeout and returns a client for it.
    ///
    /// # Errors
    /// Returns [`RegistryError::Dial`] when the endpoint refuses the connection
    /// or does not answer before the dial timeout.
    pub async fn connect(config: &RegistryConfig) -> Result<Self, RegistryError> {
        let addr = config.address();
        let timeout = config.dial_timeout();

        dial(&addr, timeout, TcpStream::connect(&addr)).await?;

        let http = Client::builder().connect_timeout(timeout).build()?;
        info!("Connected to registry server at {}", addr);

        Ok(Self {
            http,
            base_url: format!("http://{}{}", addr, API_BASE_PATH),
            addr,
            page_size: config.page_size,
        })
    }

    /// Address this client is connected to, as `host:port`.
    pub fn address(&self) -> &str {
        &self.addr
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn find<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<Option<T>, RegistryError> {
        let response = self.http.get(self.url(path)).query(query).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!("{} {:?} not found", path, query);
            return Ok(None);
        }
        let response = check_status(response).await?;
        Ok(Some(response.json().await?))
    }

    async fn create<B, T>(&self, path: &str, body: &B) -> Result<T, RegistryError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Fetches every page of a list endpoint.
    async fn list_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, RegistryError> {
        let page_size = self.page_size.to_string();
        let mut items = Vec::new();
        let mut next_page_token: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", page_size.clone())];
            if let Some(token) = next_page_token.take() {
                query.push(("nextPageToken", token));
            }

            let response = self.http.get(self.url(path)).query(&query).send().await?;
            let page: ListPage<T> = check_status(response).await?.json().await?;

            let fetched = page.items.len();
            items.extend(page.items);

            // The service may cap pages below `pageSize`; only the token says whether more follow
            if page.next_page_token.is_empty() || fetched == 0 {
                break;
            }
            next_page_token = Some(page.next_page_token);
        }

        Ok(items)
    }
}

/// Awaits `connect` for at most `timeout`; the established stream is dropped.
async fn dial<F, S>(addr: &str, timeout: Duration, connect: F) -> Result<(), RegistryError>
where
    F: Future<Output = io::Result<S>>,
{
    match tokio::time::timeout(timeout, connect).await {
        Ok(Ok(_stream)) => Ok(()),
        Ok(Err(e)) => Err(RegistryError::Dial {
            addr: addr.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Err(RegistryError::Dial {
            addr: addr.to_string(),
            reason: format!("timed out after {:?}", timeout),
        }),
    }
}

/// Turns a non-2xx response into a [`RegistryError`], pulling the message out
/// of the registry's JSON error body when there is one.
async fn check_status(response: Response) -> Result<Response, RegistryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) if !body.message.is_empty() => body.message,
        _ => text,
    };

    if status == StatusCode::CONFLICT {
        Err(RegistryError::Conflict(message))
    } else {
        Err(RegistryError::Status { status: status.as_u16(), message })
    }
}

#[async_trait]
impl ModelRegistryApi for RegistryClient {
    async fn find_registered_model(&self, name: &str) -> Result<Option<RegisteredModel>, RegistryError> {
        self.find("/registered_model", &[("name", name)]).await
    }

    async fn upsert_registered_model(&self, model: &RegisteredModel) -> Result<RegisteredModel, RegistryError> {
        self.create("/registered_models", model).await
    }

    async fn find_model_version(
        &self,
        name: &str,
        registered_model_id: &str,
    ) -> Result<Option<ModelVersion>, RegistryError> {
        self.find("/model_version", &[("name", name), ("parentResourceId", registered_model_id)])
            .await
    }

    async fn upsert_model_version(
        &self,
        version: &ModelVersion,
        registered_model_id: &str,
    ) -> Result<ModelVersion, RegistryError> {
        let body = ModelVersion {
            registered_model_id: Some(registered_model_id.to_string()),
            ..version.clone()
        };
        self.create("/model_versions", &body).await
    }

    async fn list_model_versions(&self, registered_model_id: &str) -> Result<Vec<ModelVersion>, RegistryError> {
        self.list_all(&format!("/registered_models/{}/versions", registered_model_id))
            .await
    }

    async fn find_model_artifact(
        &self,
        name: &str,
        model_version_id: &str,
    ) -> Result<Option<ModelArtifact>, RegistryError> {
        self.find("/model_artifact", &[("name", name), ("parentResourceId", model_version_id)])
            .await
    }

    async fn upsert_model_artifact(
        &self,
        artifact: &ModelArtifact,
        model_version_id: &str,
    ) -> Result<ModelArtifact, RegistryError> {
        let body = ModelArtifact {
            artifact_type: Some(MODEL_ARTIFACT_TYPE.to_string()),
            ..artifact.clone()
        };
        self.create(&format!("/model_versions/{}/artifacts", model_version_id), &body)
            .await
    }

    async fn list_model_artifacts(&self, model_version_id: &str) -> Result<Vec<ModelArtifact>, RegistryError> {
        let artifacts: Vec<ModelArtifact> = self
            .list_all(&format!("/model_versions/{}/artifacts", model_version_id))
            .await?;
        Ok(artifacts.into_iter().filter(ModelArtifact::is_model_artifact).collect())
    }

    async fn find_serving_environment(&self, name: &str) -> Result<Option<ServingEnvironment>, RegistryError> {
        self.find("/serving_environment", &[("name", name)]).await
    }

    async fn upsert_serving_environment(
        &self,
        environment: &ServingEnvironment,
    ) -> Result<ServingEnvironment, RegistryError> {
        self.create("/serving_environments", environment).await
    }
}
