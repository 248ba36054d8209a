// [libs/infra/blob/src/lib.rs]
/*!
 * =================================================================
 * APARATO: BLOB GATEWAY ROOT (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: ÚNICO PUNTO DE ENTRADA AL OBJECT STORE
 *
 * Expone el presigner SigV4, el contrato `BlobGateway` y su
 * implementación S3-compatible. Ningún otro crate debe construir una
 * URL firmada o hablar HTTP con el object store directamente.
 * =================================================================
 */

pub mod client;
pub mod errors;
pub mod presign;

pub use client::{original_storage_key, staged_storage_key, BlobGateway, BlobGatewayConfig, S3BlobGateway};
pub use errors::BlobError;
pub use presign::{presign_url, PresignMethod, SigningCredentials};
