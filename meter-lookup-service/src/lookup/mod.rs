use std::sync::Arc;

use rust_client::domain::{is_blank, Reading, ReadingKey};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    config::SourceFailurePolicy,
    sources::{ReadingSource, SourceError},
};

/// Raw lookup payload. Fields are any JSON value; only presence is checked.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LookupRequest {
    #[serde(rename = "meterID")]
    pub meter_id: Option<Value>,
    #[serde(rename = "mobileNo")]
    pub mobile_no: Option<Value>,
    #[serde(rename = "requestID")]
    pub request_id: Option<Value>,
}

impl LookupRequest {
    pub fn new(meter_id: &str, mobile_no: &str, request_id: &str) -> Self {
        Self {
            meter_id: Some(Value::from(meter_id)),
            mobile_no: Some(Value::from(mobile_no)),
            request_id: Some(Value::from(request_id)),
        }
    }

    /// A field is missing when absent or blank (`null`, `false`, `0`, `""`).
    /// Present values are used as sent, without type coercion.
    pub fn key(&self) -> Result<ReadingKey, LookupError> {
        fn present(v: &Option<Value>) -> Option<&Value> {
            v.as_ref().filter(|v| !is_blank(v))
        }

        match (
            present(&self.meter_id),
            present(&self.mobile_no),
            present(&self.request_id),
        ) {
            (Some(m), Some(p), Some(r)) => Ok(ReadingKey::new(m.clone(), p.clone(), r.clone())),
            _ => Err(LookupError::MissingFields),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LookupError {
    #[error("meterID, mobileNo, and requestID are required.")]
    MissingFields,
    #[error("Reading not found for the given parameters.")]
    NotFound,
    #[error("source {source_name} failed: {error}")]
    Source {
        source_name: String,
        #[source]
        error: SourceError,
    },
}

/// Searches `sources` in order and returns the first reading matching the
/// request triple.
///
/// Validation happens before any source is touched. Sources are loaded one at
/// a time; a match stops the search so later sources are never loaded.
pub async fn find_reading(
    request: &LookupRequest,
    sources: &[Arc<dyn ReadingSource>],
    policy: SourceFailurePolicy,
) -> Result<Reading, LookupError> {
    let key = request.key().inspect_err(|_| {
        metrics::counter!("meter_lookup_invalid_total").increment(1);
        tracing::debug!("rejected lookup with missing fields");
    })?;

    for source in sources {
        let readings = match source.load().await {
            Ok(readings) => readings,
            Err(error) => match policy {
                SourceFailurePolicy::Abort => {
                    metrics::counter!("meter_lookup_source_errors_total").increment(1);
                    return Err(LookupError::Source {
                        source_name: source.name().to_string(),
                        error,
                    });
                }
                SourceFailurePolicy::Skip => {
                    metrics::counter!("meter_lookup_source_errors_total").increment(1);
                    tracing::warn!(source = source.name(), error = %error, "skipping unreadable source");
                    continue;
                }
            },
        };

        if let Some(found) = readings.into_iter().find(|r| r.matches(&key)) {
            metrics::counter!("meter_lookup_found_total").increment(1);
            tracing::debug!(source = source.name(), meter_id = %key.meter_id, "reading found");
            return Ok(found);
        }
    }

    metrics::counter!("meter_lookup_not_found_total").increment(1);
    tracing::debug!(meter_id = %key.meter_id, "no reading matched lookup");
    Err(LookupError::NotFound)
}
