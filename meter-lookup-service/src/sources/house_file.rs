use std::path::{Path, PathBuf};

use rust_client::domain::Reading;
use serde_json::Value;

use super::{ReadingSource, SourceError};

/// One house's `metreData.json`: a JSON array of reading objects.
///
/// The file is read in full and deserialized in full on every `load`.
/// Array entries that are not objects carry no fields and are dropped.
pub struct HouseFileSource {
    name: String,
    path: PathBuf,
}

impl HouseFileSource {
    pub fn new<N: Into<String>, P: Into<PathBuf>>(name: N, path: P) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl ReadingSource for HouseFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn load(&self) -> Result<Vec<Reading>, SourceError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| SourceError::Read {
            path: self.path.clone(),
            source: e,
        })?;

        let entries: Vec<Value> = serde_json::from_slice(&bytes).map_err(|e| SourceError::Parse {
            path: self.path.clone(),
            source: e,
        })?;

        let readings: Vec<Reading> = entries
            .into_iter()
            .filter_map(|entry| match entry {
                Value::Object(fields) => Some(Reading::from(fields)),
                _ => None,
            })
            .collect();

        metrics::counter!("meter_lookup_source_loads_total", "source" => self.name.clone()).increment(1);
        tracing::debug!(source = %self.name, records = readings.len(), "loaded house data");

        Ok(readings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[tokio::test]
    async fn loads_records_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "metreData.json",
            r#"[
                {"meterID": "M1", "mobileNo": "111", "requestID": "R1", "units": 10},
                {"meterID": "M2", "mobileNo": "555", "requestID": "R9", "value": 42}
            ]"#,
        );

        let source = HouseFileSource::new("house1", &path);
        let readings = source.load().await.unwrap();

        assert_eq!(source.name(), "house1");
        assert_eq!(source.path(), path.as_path());
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].meter_id(), Some(&serde_json::json!("M1")));
        assert_eq!(readings[1].get("value"), Some(&serde_json::json!(42)));
    }

    #[tokio::test]
    async fn empty_array_is_valid() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "metreData.json", "[]");

        let readings = HouseFileSource::new("house1", path).load().await.unwrap();
        assert!(readings.is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("House1").join("metreData.json");

        let err = HouseFileSource::new("house1", &path).load().await.unwrap_err();
        assert!(matches!(&err, SourceError::Read { path: p, .. } if *p == path));
    }

    #[tokio::test]
    async fn malformed_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "metreData.json", r#"[{"meterID": "M1","#);

        let err = HouseFileSource::new("house1", path).load().await.unwrap_err();
        assert!(matches!(err, SourceError::Parse { .. }));
    }

    #[tokio::test]
    async fn non_array_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let object = write_file(&dir, "object.json", r#"{"meterID": "M1"}"#);

        assert!(matches!(
            HouseFileSource::new("a", object).load().await,
            Err(SourceError::Parse { .. })
        ));
    }

    #[tokio::test]
    async fn non_object_entries_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "metreData.json",
            r#"[7, "x", null, [1], {"meterID": "M1", "mobileNo": "111", "requestID": "R1"}]"#,
        );

        let readings = HouseFileSource::new("house1", path).load().await.unwrap();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].request_id(), Some(&serde_json::json!("R1")));
    }

    #[tokio::test]
    async fn every_load_rereads_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "metreData.json", "[]");
        let source = HouseFileSource::new("house1", &path);

        assert!(source.load().await.unwrap().is_empty());

        write_file(
            &dir,
            "metreData.json",
            r#"[{"meterID": "M1", "mobileNo": "111", "requestID": "R1"}]"#,
        );
        assert_eq!(source.load().await.unwrap().len(), 1);
    }
}
