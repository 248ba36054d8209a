// [libs/domain/models/src/lib.rs]
/*!
 * =================================================================
 * APARATO: DOMAIN MODEL ROOT (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: DEFINICIÓN SUPREMA DEL ÁRBOL DE ENTIDADES
 *
 * Única fuente de verdad para las entidades del núcleo de orquestación:
 * Original (CAOS), Image (staging request), Project, Job, ModelConfig.
 * Ninguna de estas estructuras conoce la capa de persistencia ni la de
 * transporte HTTP — son DTOs puros, serializables, sin lógica de I/O.
 * =================================================================
 */

pub mod error;
pub mod image;
pub mod job;
pub mod mime_sniff;
pub mod model_config;
pub mod original;
pub mod project;
pub mod room;

pub use error::StagingError;
pub use image::{BatchCreateOutcome, BatchItemError, CreateImageRequest, Image, ImageStatus};
pub use job::{Job, JobDisposition};
pub use mime_sniff::sniff_media_type;
pub use model_config::{ConfigFieldSchema, ConfigFieldType, ModelConfig};
pub use original::Original;
pub use project::Project;
pub use room::{RoomType, Style};

#[cfg(test)]
mod tests_serialization;
