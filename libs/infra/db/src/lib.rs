// [libs/infra/db/src/lib.rs]
/*!
 * =================================================================
 * APARATO: REALSTAGE PERSISTENCE ADAPTER (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: ÚNICO PUNTO DE ENTRADA A LA PERSISTENCIA RELACIONAL
 *
 * VISION HOLÍSTICA:
 * Expone el cliente de conexión, el catálogo de errores y el barril
 * de repositorios. Ningún otro crate debe importar `libsql` directamente;
 * todo acceso a datos cruza por aquí.
 * =================================================================
 */

pub mod client;
pub mod errors;
pub mod repositories;
pub mod schema;

pub use client::TursoClient;
pub use errors::DbError;
pub use repositories::{
    BillingRepository, EventOutboxRepository, ImageRepository, JobRepository, ModelConfigRepository, OriginalRepository,
    PendingStatusEvent, ProjectRepository,
};
