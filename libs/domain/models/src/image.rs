// [libs/domain/models/src/image.rs]
//! Entidad `Image`: una solicitud de puesta en escena. Su máquina de
//! estados es de un solo sentido — ver `ImageStatus::can_transition_to`
//! (spec §3, invariante crítico).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use crate::room::{RoomType, Style};

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ImageStatus {
    Queued,
    Processing,
    Ready,
    Failed,
}

impl ImageStatus {
    pub fn as_key(&self) -> &'static str {
        match self {
            ImageStatus::Queued => "queued",
            ImageStatus::Processing => "processing",
            ImageStatus::Ready => "ready",
            ImageStatus::Failed => "failed",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "queued" => Some(ImageStatus::Queued),
            "processing" => Some(ImageStatus::Processing),
            "ready" => Some(ImageStatus::Ready),
            "failed" => Some(ImageStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ImageStatus::Ready | ImageStatus::Failed)
    }

    /// Encodes the one-way transition rule of spec §3: queued -> processing
    /// -> {ready, failed}. No edge leaves a terminal state, and no terminal
    /// state replaces another.
    pub fn can_transition_to(&self, next: ImageStatus) -> bool {
        use ImageStatus::*;
        match (self, next) {
            (Queued, Processing) => true,
            (Processing, Ready) | (Processing, Failed) => true,
            _ => false,
        }
    }
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Image {
    pub id: String,
    pub project_id: String,
    /// Referencia al Original deduplicado; nula durante la ventana de
    /// migración heredada (spec §3, §9).
    pub original_id: Option<String>,
    /// URL heredada, previa a la deduplicación por contenido.
    pub source_url: Option<String>,
    pub room_type: Option<RoomType>,
    pub style: Option<Style>,
    pub prompt: Option<String>,
    pub seed: Option<u32>,
    pub status: ImageStatus,
    pub staged_url: Option<String>,
    pub error: Option<String>,
    pub cost: Option<f64>,
    pub model_id: Option<String>,
    pub processing_ms: Option<i64>,
    pub provider_prediction_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Image {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Petición de creación de una Image, previa a cualquier escritura.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateImageRequest {
    pub project_id: String,
    pub original_url: String,
    pub room_type: Option<RoomType>,
    pub style: Option<Style>,
    pub seed: Option<u32>,
    pub prompt: Option<String>,
}

/// Resultado de una creación en lote (spec §4.3 `batch_create`).
#[derive(Debug, Clone, Serialize)]
pub struct BatchCreateOutcome {
    pub images: Vec<Image>,
    pub errors: Vec<BatchItemError>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchItemError {
    pub index: usize,
    pub code: String,
    pub message: String,
}
