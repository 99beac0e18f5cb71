use std::io::Cursor;

use async_trait::async_trait;
use suppaftp::types::FileType;
use suppaftp::{FtpError, FtpStream, Status};
use thiserror::Error;
use tokio::task;

use crate::config::FtpConfig;
use crate::store::{BlobStore, StoreError, StoreResult};

#[derive(Debug, Error)]
pub enum FtpStoreError {
    #[error("FTP setting `{0}` is not configured")]
    MissingSetting(&'static str),

    #[error("FTP error: {0}")]
    Ftp(#[from] FtpError),

    #[error("FTP task did not complete: {0}")]
    Join(#[from] task::JoinError),
}

/// An authenticated control connection, closed with `QUIT` when dropped.
struct FtpSession {
    stream: FtpStream,
}

impl FtpSession {
    fn open(config: &FtpConfig) -> Result<Self, FtpStoreError> {
        let host = config.ftp_host.as_deref().ok_or(FtpStoreError::MissingSetting("FTP_HOST"))?;
        let username = config
            .ftp_username
            .as_deref()
            .ok_or(FtpStoreError::MissingSetting("FTP_USERNAME"))?;
        let password = config
            .ftp_password
            .as_deref()
            .ok_or(FtpStoreError::MissingSetting("FTP_PASSWORD"))?;

        let stream = FtpStream::connect((host, config.ftp_port))?;
        // from here on, Drop closes the connection whatever happens
        let mut session = FtpSession { stream };
        session.stream.login(username, password)?;
        session.stream.transfer_type(FileType::Binary)?;
        Ok(session)
    }

    /// Creates every missing segment of `dir`.
    fn ensure_dir(&mut self, dir: &str) -> Result<(), FtpStoreError> {
        for prefix in dir_prefixes(dir) {
            match self.stream.mkdir(&prefix) {
                Ok(()) => tracing::debug!("created remote directory {}", prefix),
                // already there, or not ours to create: the upload will tell
                Err(FtpError::UnexpectedResponse(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

impl Drop for FtpSession {
    fn drop(&mut self) {
        if let Err(e) = self.stream.quit() {
            tracing::debug!("FTP session did not close cleanly: {}", e);
        }
    }
}

/// `a/b/c` -> `a`, `a/b`, `a/b/c`, keeping a leading `/`.
fn dir_prefixes(dir: &str) -> Vec<String> {
    let root = if dir.starts_with('/') { "/" } else { "" };
    let mut prefixes = Vec::new();
    let mut current = String::new();
    for segment in dir.split('/').filter(|s| !s.is_empty()) {
        if !current.is_empty() {
            current.push('/');
        }
        current.push_str(segment);
        prefixes.push(format!("{root}{current}"));
    }
    prefixes
}

fn is_file_unavailable(err: &FtpStoreError) -> bool {
    matches!(
        err,
        FtpStoreError::Ftp(FtpError::UnexpectedResponse(response))
            if matches!(response.status, Status::FileUnavailable)
    )
}

/// A `BlobStore` on a remote FTP server. Every call opens its own session.
#[derive(Clone, Debug)]
pub struct FtpBlobStore {
    config: FtpConfig,
}

impl FtpBlobStore {
    pub fn new(config: &FtpConfig) -> Self {
        Self { config: config.clone() }
    }

    fn remote_path(&self, id: &str) -> String {
        format!("{}/{}", self.config.ftp_base_path, id)
    }

    /// Runs `op` inside a fresh session on the blocking pool.
    async fn with_session<T, F>(&self, op: F) -> Result<T, FtpStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut FtpSession) -> Result<T, FtpStoreError> + Send + 'static,
    {
        let config = self.config.clone();
        task::spawn_blocking(move || {
            let mut session = FtpSession::open(&config)?;
            op(&mut session)
        })
        .await?
    }
}

#[async_trait]
impl BlobStore for FtpBlobStore {
    async fn store(&self, id: &str, data: &[u8]) -> StoreResult<String> {
        let remote_path = self.remote_path(id);
        let base_path = self.config.ftp_base_path.clone();
        let target = remote_path.clone();
        let data = data.to_vec();

        self.with_session(move |session| {
            session.ensure_dir(&base_path)?;
            session.stream.put_file(&target, &mut Cursor::new(data))?;
            Ok(())
        })
        .await
        .map_err(|e| StoreError::store(id, e))?;

        tracing::debug!("uploaded {} to {}", id, remote_path);
        Ok(remote_path)
    }

    async fn retrieve(&self, path: &str) -> StoreResult<Vec<u8>> {
        let target = path.to_string();
        self.with_session(move |session| Ok(session.stream.retr_as_buffer(&target)?.into_inner()))
            .await
            .map_err(|e| {
                if is_file_unavailable(&e) {
                    StoreError::NotFound(path.to_string())
                } else {
                    StoreError::retrieve(path, e)
                }
            })
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        let target = path.to_string();
        self.with_session(move |session| Ok(session.stream.rm(&target)?))
            .await
            .map_err(|e| StoreError::delete(path, e))
    }

    fn name(&self) -> &'static str {
        "ftp"
    }
}
