//! Reading types shared by the generator, the window and the processor.
//!
//! A reading is an immutable value: once produced it is only ever copied or
//! borrowed, never mutated in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Device names used by the default simulated fleet.
pub const DEFAULT_DEVICE_IDS: [&str; 3] = ["sensor-001", "sensor-002", "sensor-003"];

/// One timestamped environmental measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    /// When the reading was taken
    #[serde(with = "timestamp_serde")]
    pub timestamp: DateTime<Utc>,
    /// Degrees Celsius
    pub temperature: f64,
    /// Relative humidity in percent, always within [0, 100] when generated
    pub humidity: f64,
    /// Hectopascals
    pub pressure: f64,
    /// Identifier of the producing device
    pub device_id: String,
}

impl Reading {
    pub fn new(
        timestamp: DateTime<Utc>,
        temperature: f64,
        humidity: f64,
        pressure: f64,
        device_id: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            temperature,
            humidity,
            pressure,
            device_id: device_id.into(),
        }
    }
}

/// Serde support for reading timestamps.
///
/// Always writes millisecond precision so the string form sorts the same way
/// the instants do.
pub(crate) mod timestamp_serde {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn reading_at(timestamp: DateTime<Utc>) -> Reading {
        Reading::new(timestamp, 22.0, 45.0, 1013.0, "sensor-001")
    }

    #[test]
    fn test_reading_serializes_camel_case() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 22, 10, 0, 0).unwrap();
        let json = serde_json::to_string(&reading_at(ts)).unwrap();

        assert!(json.contains("\"deviceId\":\"sensor-001\""));
        assert!(json.contains("\"timestamp\":\"2024-01-22T10:00:00.000Z\""));
    }

    #[test]
    fn test_timestamp_round_trip() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 22, 10, 0, 0).unwrap() + Duration::milliseconds(300);
        let original = reading_at(ts);

        let json = serde_json::to_string(&original).unwrap();
        let parsed: Reading = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, original);
    }

    #[test]
    fn test_serialized_timestamps_sort_lexically() {
        let base = Utc.with_ymd_and_hms(2024, 1, 22, 10, 0, 0).unwrap();
        let stamps: Vec<String> = [0, 100, 1000, 1100]
            .iter()
            .map(|&ms| {
                let json = serde_json::to_value(reading_at(base + Duration::milliseconds(ms))).unwrap();
                json["timestamp"].as_str().unwrap().to_string()
            })
            .collect();

        let mut sorted = stamps.clone();
        sorted.sort();
        assert_eq!(sorted, stamps);
    }

    #[test]
    fn test_deserialize_accepts_offsets() {
        let json = r#"{"timestamp":"2024-01-22T12:00:00+02:00","temperature":21.0,"humidity":40.0,"pressure":1010.0,"deviceId":"sensor-002"}"#;
        let reading: Reading = serde_json::from_str(json).unwrap();

        assert_eq!(
            reading.timestamp,
            Utc.with_ymd_and_hms(2024, 1, 22, 10, 0, 0).unwrap()
        );
        assert_eq!(reading.device_id, "sensor-002");
    }
}
