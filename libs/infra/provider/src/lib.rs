// [libs/infra/provider/src/lib.rs]
/*!
 * =================================================================
 * APARATO: GENERATIVE PROVIDER ADAPTER ROOT (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * =================================================================
 */

pub mod client;
pub mod errors;

pub use client::{PredictionHandle, PredictionOutcome, PredictionState, ProviderClient};
pub use errors::ProviderError;
