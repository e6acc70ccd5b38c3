pub mod config;
pub mod http;
pub mod lookup;
pub mod metrics_server;
pub mod observability;
pub mod sources;

pub use lookup::{find_reading, LookupError, LookupRequest};
