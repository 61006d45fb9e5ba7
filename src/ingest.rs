//! ═══════════════════════════════════════════════════════════════════════════════
//! INGEST — Wire Events to Typed Readings
//! ═══════════════════════════════════════════════════════════════════════════════
//!
//! The feed delivers readings as loose JSON rows: integer sensor ids
//! and values that arrive as numbers or strings depending on firmware
//! revision. Everything is validated here; nothing malformed crosses
//! into the pipeline. Rejects are dropped, counted and logged.
//! ═══════════════════════════════════════════════════════════════════════════════

use serde::{Deserialize, Serialize};

use crate::error::{CribResult, IngestError};
use crate::types::{SensorKind, SensorReading, Threshold, TimePoint};

/// Sound pitch: emitted by some firmware, never monitored.
const PITCH_SENSOR_ID: u32 = 6;

/// A value as it appears on the wire. Older firmware sends strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    fn as_finite_f64(&self) -> Option<f64> {
        let v = match self {
            RawValue::Number(n) => *n,
            RawValue::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        v.is_finite().then_some(v)
    }
}

/// One reading row from the feed. Timestamp is implicit: a reading is
/// stamped when it arrives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawReadingEvent {
    pub sensor_type_id: u32,
    pub value: RawValue,
}

/// One threshold row from the feed. Replaces the table entry whole.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawThresholdEvent {
    pub sensor_type_id: u32,
    pub min_value: f64,
    pub max_value: f64,
}

/// A line of the replay feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedEvent {
    Reading(RawReadingEvent),
    Threshold(RawThresholdEvent),
    /// User pressed cancel on the alert popup
    Cancel,
}

/// Validate one reading row.
pub fn parse_reading(event: &RawReadingEvent, at: TimePoint) -> CribResult<SensorReading> {
    let kind = match SensorKind::from_wire_id(event.sensor_type_id) {
        Some(kind) => kind,
        None if event.sensor_type_id == PITCH_SENSOR_ID => {
            return Err(IngestError::UnsupportedSensor {
                id: PITCH_SENSOR_ID,
                name: "sound pitch",
            }
            .into());
        }
        None => return Err(IngestError::UnknownSensorId(event.sensor_type_id).into()),
    };

    let value = event
        .value
        .as_finite_f64()
        .ok_or_else(|| IngestError::NonNumericValue {
            sensor_id: event.sensor_type_id,
            raw: match &event.value {
                RawValue::Number(n) => n.to_string(),
                RawValue::Text(s) => s.clone(),
            },
        })?;

    Ok(SensorReading::new(kind, value, at))
}

/// Validate one threshold row.
pub fn parse_threshold(event: &RawThresholdEvent) -> CribResult<(SensorKind, Threshold)> {
    let kind = SensorKind::from_wire_id(event.sensor_type_id)
        .ok_or(IngestError::UnknownSensorId(event.sensor_type_id))?;
    Ok((kind, Threshold::new(event.min_value, event.max_value)))
}
