use std::path::PathBuf;

use clap::Args;

/// Storage settings, read once at startup from flags or the environment.
#[derive(Args, Debug, Clone)]
pub struct StorageConfig {
    /// Backend new blobs are written to.
    #[clap(long, env = "STORAGE_BACKEND")]
    pub storage_backend: Option<String>,

    #[clap(long, env = "LOCAL_STORAGE_PATH", default_value = "./storage")]
    pub local_storage_path: PathBuf,

    #[clap(flatten)]
    pub ftp: FtpConfig,

    #[clap(flatten)]
    pub s3: S3Config,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FtpConfig {
    #[clap(long, env = "FTP_HOST")]
    pub ftp_host: Option<String>,
    #[clap(long, env = "FTP_PORT", default_value_t = 21)]
    pub ftp_port: u16,
    #[clap(long, env = "FTP_USERNAME")]
    pub ftp_username: Option<String>,
    #[clap(long, env = "FTP_PASSWORD", hide_env_values = true)]
    pub ftp_password: Option<String>,
    #[clap(long, env = "FTP_BASE_PATH", default_value = "")]
    pub ftp_base_path: String,
}

#[derive(Args, Debug, Clone)]
pub struct S3Config {
    #[clap(long, env = "S3_BUCKET_NAME", default_value = "voxa-storage")]
    pub s3_bucket: String,
    #[clap(long, env = "AWS_REGION", default_value = "us-east-1")]
    pub aws_region: String,
    #[clap(long, env = "AWS_ACCESS_KEY_ID")]
    pub aws_access_key_id: Option<String>,
    #[clap(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub aws_secret_access_key: Option<String>,
    /// Parent domain of the virtual-hosted bucket endpoint.
    #[clap(long, env = "S3_DOMAIN", default_value = "amazonaws.com")]
    pub s3_domain: String,
    /// Replaces `https://{bucket}.s3.{region}.{domain}` for S3-compatible services.
    /// Requests then go path-style to `{endpoint}/{bucket}/{key}`.
    #[clap(long, env = "S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            s3_bucket: "voxa-storage".to_string(),
            aws_region: "us-east-1".to_string(),
            aws_access_key_id: None,
            aws_secret_access_key: None,
            s3_domain: "amazonaws.com".to_string(),
            s3_endpoint: None,
        }
    }
}

impl StorageConfig {
    pub const DEFAULT_BACKEND: &'static str = "local";

    /// Configured default backend name, `"local"` when unset.
    pub fn default_backend(&self) -> &str {
        self.storage_backend.as_deref().unwrap_or(Self::DEFAULT_BACKEND)
    }

    /// Config rooted at `local_storage_path` with every other medium left unconfigured.
    pub fn local(local_storage_path: impl Into<PathBuf>) -> Self {
        Self {
            storage_backend: None,
            local_storage_path: local_storage_path.into(),
            ftp: FtpConfig::default(),
            s3: S3Config::default(),
        }
    }
}
