use blob_store::StorageConfig;
use clap::Parser;

#[derive(Parser)]
pub struct Args {
    #[clap(long, env = "HTTP_ADDR", default_value = "127.0.0.1:3000")]
    pub(crate) http_addr: String,
    /// Directory of the metadata database.
    #[clap(long, env = "DATA_DIR", default_value = "./blob-metadata.db")]
    pub(crate) data_dir: String,
    #[clap(flatten)]
    pub(crate) storage: StorageConfig,
}
