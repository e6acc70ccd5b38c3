use std::path::PathBuf;

use rust_client::domain::Reading;

pub mod house_file;

pub use house_file::HouseFileSource;

#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("failed to read file at path: {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse JSON data from file: {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Anything that can hand over one house's readings, in stored order.
///
/// Every call is a fresh load; implementations must not cache between calls.
#[async_trait::async_trait]
pub trait ReadingSource: Send + Sync {
    fn name(&self) -> &str;

    async fn load(&self) -> Result<Vec<Reading>, SourceError>;
}
