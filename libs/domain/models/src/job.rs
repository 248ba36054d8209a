// [libs/domain/models/src/job.rs]
//! Entidad `Job`: la unidad de trabajo visible por la cola, vinculada
//! exactamente a una Image (spec §3, §4.4).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobDisposition {
    Pending,
    Completed,
    DeadLettered,
}

impl JobDisposition {
    pub fn as_key(&self) -> &'static str {
        match self {
            JobDisposition::Pending => "pending",
            JobDisposition::Completed => "completed",
            JobDisposition::DeadLettered => "dead_lettered",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "pending" => Some(JobDisposition::Pending),
            "completed" => Some(JobDisposition::Completed),
            "dead_lettered" => Some(JobDisposition::DeadLettered),
            _ => None,
        }
    }
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    pub id: String,
    pub image_id: String,
    pub kind: String,
    /// Carga útil autocontenida: duplica los campos esenciales de la Image
    /// para que el trabajador no dependa de una lectura adicional.
    pub payload: serde_json::Value,
    pub attempt_count: i64,
    pub max_attempts: i64,
    pub next_attempt_after: DateTime<Utc>,
    pub visible: bool,
    pub disposition: JobDisposition,
    pub claimed_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const DEFAULT_MAX_ATTEMPTS: i64 = 5;
/// Base de la curva de backoff exponencial: 30s * 2^(intento-1), tope ~30min.
pub const BACKOFF_BASE_SECONDS: i64 = 30;
pub const BACKOFF_CAP_SECONDS: i64 = 30 * 60;

/// Calcula el retraso de backoff exponencial con jitter para el próximo
/// intento, acotado en `BACKOFF_CAP_SECONDS` (spec §4.4).
pub fn backoff_delay_seconds(attempt: i64, jitter_unit: f64) -> i64 {
    debug_assert!((0.0..1.0).contains(&jitter_unit));
    let exponent = (attempt - 1).max(0) as u32;
    let raw = BACKOFF_BASE_SECONDS.saturating_mul(1i64 << exponent.min(20));
    let capped = raw.min(BACKOFF_CAP_SECONDS);
    // +/- 20% de jitter determinista, centrado en `capped`.
    let jitter_span = (capped as f64) * 0.4;
    let offset = (jitter_unit - 0.5) * jitter_span;
    (capped as f64 + offset).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_exponentially_and_caps() {
        let at_center_jitter = 0.5;
        assert_eq!(backoff_delay_seconds(1, at_center_jitter), 30);
        assert_eq!(backoff_delay_seconds(2, at_center_jitter), 60);
        assert_eq!(backoff_delay_seconds(3, at_center_jitter), 120);
        // Large attempt counts must not exceed the cap even without jitter.
        assert_eq!(backoff_delay_seconds(20, at_center_jitter), BACKOFF_CAP_SECONDS);
    }

    #[test]
    fn jitter_stays_within_twenty_percent_band() {
        let capped = backoff_delay_seconds(10, 0.0);
        let uncapped_base = BACKOFF_CAP_SECONDS as f64;
        assert!((capped as f64) >= uncapped_base * 0.8 - 1.0);
        let high = backoff_delay_seconds(10, 1.0);
        assert!((high as f64) <= uncapped_base * 1.2 + 1.0);
    }
}
