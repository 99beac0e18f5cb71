use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, Response, StatusCode};
use thiserror::Error;
use url::Url;

use crate::config::S3Config;
use crate::s3::signing::{self, SigningContext};
use crate::store::{BlobStore, StoreError, StoreResult};

#[derive(Debug, Error)]
pub enum S3Error {
    #[error("S3 {operation} failed: {status} {message}")]
    Status {
        operation: &'static str,
        status: u16,
        message: String,
    },

    #[error("S3 credential `{0}` is not configured")]
    MissingCredential(&'static str),

    #[error("invalid S3 endpoint `{0}`")]
    InvalidEndpoint(String),

    #[error("S3 request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Where a request for one key goes and what gets signed for it.
#[derive(Debug, PartialEq, Eq)]
struct Target {
    url: String,
    host: String,
    /// Request path without its leading `/`.
    resource_key: String,
}

/// A `BlobStore` speaking the S3 REST protocol directly, one signed request per call.
///
/// Objects are keyed by blob id with no prefix.
#[derive(Clone, Debug)]
pub struct S3BlobStore {
    client: Client,
    config: S3Config,
}

impl S3BlobStore {
    pub fn new(config: &S3Config) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &S3Config) -> Self {
        Self { client, config: config.clone() }
    }

    /// Virtual-hosted by default. An endpoint override is addressed
    /// path-style as `{endpoint}/{bucket}/{key}`, keeping any path the
    /// endpoint already has.
    fn target(&self, key: &str) -> Result<Target, S3Error> {
        match &self.config.s3_endpoint {
            Some(endpoint) => {
                let invalid = || S3Error::InvalidEndpoint(endpoint.clone());
                let url = Url::parse(&format!(
                    "{}/{}/{key}",
                    endpoint.trim_end_matches('/'),
                    self.config.s3_bucket
                ))
                .map_err(|_| invalid())?;
                let host = url.host_str().ok_or_else(invalid)?;
                let host = match url.port() {
                    Some(port) => format!("{host}:{port}"),
                    None => host.to_string(),
                };
                // sign the path exactly as it goes on the wire
                let path = url.path();
                let resource_key = path.strip_prefix('/').unwrap_or(path).to_string();
                Ok(Target {
                    url: url.to_string(),
                    host,
                    resource_key,
                })
            }
            None => {
                let host = format!(
                    "{}.s3.{}.{}",
                    self.config.s3_bucket, self.config.aws_region, self.config.s3_domain
                );
                Ok(Target {
                    url: format!("https://{host}/{key}"),
                    host,
                    resource_key: key.to_string(),
                })
            }
        }
    }

    async fn send(&self, method: Method, key: &str, body: Option<&[u8]>) -> Result<Response, S3Error> {
        let access_key_id = self
            .config
            .aws_access_key_id
            .as_deref()
            .ok_or(S3Error::MissingCredential("AWS_ACCESS_KEY_ID"))?;
        let secret_key = self
            .config
            .aws_secret_access_key
            .as_deref()
            .ok_or(S3Error::MissingCredential("AWS_SECRET_ACCESS_KEY"))?;
        let target = self.target(key)?;

        let ctx = SigningContext::new(
            method.as_str(),
            &target.resource_key,
            &target.host,
            &self.config.aws_region,
            access_key_id,
            secret_key,
            Utc::now(),
            body,
        );
        let signed = signing::sign(&ctx, body.map(<[u8]>::len));

        let mut request = self.client.request(method.clone(), &target.url);
        for (name, value) in &signed.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        request = request.header(AUTHORIZATION, signed.authorization);
        if let Some(body) = body {
            request = request.body(body.to_vec());
        }

        tracing::debug!("{} {}", ctx.method, target.url);
        Ok(request.send().await?)
    }
}

async fn status_error(operation: &'static str, response: Response) -> S3Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    tracing::debug!("S3 {} returned {}: {}", operation, status, body);
    S3Error::Status {
        operation,
        status: status.as_u16(),
        message: status.canonical_reason().unwrap_or_default().to_string(),
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn store(&self, id: &str, data: &[u8]) -> StoreResult<String> {
        let response = self
            .send(Method::PUT, id, Some(data))
            .await
            .map_err(|e| StoreError::store(id, e))?;
        if response.status() != StatusCode::OK {
            return Err(StoreError::store(id, status_error("upload", response).await));
        }
        Ok(id.to_string())
    }

    async fn retrieve(&self, path: &str) -> StoreResult<Vec<u8>> {
        let response = self
            .send(Method::GET, path, None)
            .await
            .map_err(|e| StoreError::retrieve(path, e))?;
        match response.status() {
            StatusCode::OK => {
                let body = response
                    .bytes()
                    .await
                    .map_err(|e| StoreError::retrieve(path, S3Error::from(e)))?;
                Ok(body.to_vec())
            }
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(path.to_string())),
            _ => Err(StoreError::retrieve(path, status_error("download", response).await)),
        }
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        let response = self
            .send(Method::DELETE, path, None)
            .await
            .map_err(|e| StoreError::delete(path, e))?;
        if response.status() != StatusCode::NO_CONTENT {
            return Err(StoreError::delete(path, status_error("delete", response).await));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "s3"
    }
}
