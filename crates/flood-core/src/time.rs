use chrono::DateTime;
use std::time::{SystemTime, UNIX_EPOCH};

pub type EpochMillis = u64;

pub fn now_epoch_millis() -> EpochMillis {
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    duration.as_millis() as EpochMillis
}

/// Renders the `HH:MM dd/MM` stamp used in note log lines (UTC).
pub fn format_note_timestamp(at_ms: EpochMillis) -> String {
    i64::try_from(at_ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map(|stamp| stamp.format("%H:%M %d/%m").to_string())
        .unwrap_or_else(|| "--:-- --/--".to_string())
}
