// [apps/worker/src/lib.rs]
/*!
 * =================================================================
 * APARATO: WORKER LIBRARY ROOT (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: CRATE ROOT (ESTRATO L1-APP)
 * =================================================================
 */

pub mod engine;
pub mod settings;

pub mod prelude {
    pub use crate::engine::StagingWorkerEngine;
    pub use crate::settings::Settings;
}
