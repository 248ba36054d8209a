// [libs/infra/blob/src/client.rs]
/*!
 * =================================================================
 * APARATO: S3-COMPATIBLE BLOB GATEWAY (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: PUT/GET/DELETE DIRECTO Y PRESIGN HACIA EL OBJECT STORE
 *
 * VISION HOLÍSTICA:
 * `S3BlobGateway` es el único adaptador del Almacén de Originales y del
 * prefijo `staged/` hacia el object store subyacente. El cliente HTTP se
 * construye igual que el uplink del worker soberano (timeout fijo, header
 * map por defecto), pero sin bearer token propio: la autenticación de
 * escritura directa vive en la firma SigV4 de cada request.
 * =================================================================
 */

use crate::errors::BlobError;
use crate::presign::{presign_url, PresignMethod, SigningCredentials};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use reqwest::Client;
use tracing::{info, instrument, warn};

#[derive(Clone)]
pub struct BlobGatewayConfig {
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
}

#[async_trait]
pub trait BlobGateway: Send + Sync {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str, cache_control: &str) -> Result<(), BlobError>;
    async fn get(&self, key: &str) -> Result<Bytes, BlobError>;
    async fn delete(&self, key: &str) -> Result<(), BlobError>;
    fn presign_put(&self, key: &str, expires_in_seconds: u32) -> Result<String, BlobError>;
    fn presign_get(&self, key: &str, expires_in_seconds: u32, download: bool) -> Result<String, BlobError>;
}

pub struct S3BlobGateway {
    http_client: Client,
    config: BlobGatewayConfig,
}

impl S3BlobGateway {
    pub fn new(config: BlobGatewayConfig) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .user_agent("RealStageAI-BlobGateway/1.0")
                .build()
                .expect("FATAL: blob gateway client initialization failed."),
            config,
        }
    }

    fn credentials(&self) -> SigningCredentials {
        SigningCredentials {
            access_key_id: self.config.access_key_id.clone(),
            secret_access_key: self.config.secret_access_key.clone(),
            region: self.config.region.clone(),
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.config.endpoint.trim_end_matches('/'), key.trim_start_matches('/'))
    }
}

#[async_trait]
impl BlobGateway for S3BlobGateway {
    /// Escribe un objeto mediante una URL autofirmada de corta duración
    /// (el mismo mecanismo que `presign_put`, consumido internamente en
    /// lugar de delegarlo a un cliente externo).
    #[instrument(skip(self, bytes))]
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str, cache_control: &str) -> Result<(), BlobError> {
        let url = presign_url(
            PresignMethod::Put,
            &self.config.endpoint,
            key,
            &self.credentials(),
            300,
            &[],
            Utc::now(),
        )?;

        let response = self
            .http_client
            .put(url)
            .header("content-type", content_type)
            .header("cache-control", cache_control)
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            warn!("🚫 [BLOB_PUT_REJECTED]: {} -> HTTP_{}", key, response.status());
            return Err(BlobError::Rejected(response.status().as_u16()));
        }

        info!("📦 [BLOB_PUT]: {} stored.", key);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Bytes, BlobError> {
        let url = presign_url(PresignMethod::Get, &self.config.endpoint, key, &self.credentials(), 300, &[], Utc::now())?;
        let response = self.http_client.get(url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(BlobError::NotFound);
        }
        if !response.status().is_success() {
            return Err(BlobError::Rejected(response.status().as_u16()));
        }

        Ok(response.bytes().await?)
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> Result<(), BlobError> {
        let response = self.http_client.delete(self.object_url(key)).send().await?;
        if !response.status().is_success() && response.status() != reqwest::StatusCode::NOT_FOUND {
            warn!("🚫 [BLOB_DELETE_REJECTED]: {} -> HTTP_{}", key, response.status());
            return Err(BlobError::Rejected(response.status().as_u16()));
        }
        info!("🗑️ [BLOB_DELETE]: {} removed.", key);
        Ok(())
    }

    fn presign_put(&self, key: &str, expires_in_seconds: u32) -> Result<String, BlobError> {
        presign_url(PresignMethod::Put, &self.config.endpoint, key, &self.credentials(), expires_in_seconds, &[], Utc::now())
    }

    fn presign_get(&self, key: &str, expires_in_seconds: u32, download: bool) -> Result<String, BlobError> {
        let extra_query: &[(&str, &str)] = if download { &[("response-content-disposition", "attachment")] } else { &[] };
        presign_url(PresignMethod::Get, &self.config.endpoint, key, &self.credentials(), expires_in_seconds, extra_query, Utc::now())
    }
}

/// Clave de objeto para un Original recién admitido por CAOS (spec §4.1):
/// `originals/<primeros-2-hex>/<hash>`.
pub fn original_storage_key(hash_hex: &str) -> String {
    let prefix = &hash_hex[..hash_hex.len().min(2)];
    format!("originals/{prefix}/{hash_hex}")
}

/// Clave de objeto para el resultado puesto en escena de una Image (spec
/// §4.7 paso 7): `staged/<primeros-8-hex-del-image-id>/<image-id>-staged.jpg`.
pub fn staged_storage_key(image_id: &str) -> String {
    let prefix = &image_id.replace('-', "")[..8.min(image_id.len())];
    format!("staged/{prefix}/{image_id}-staged.jpg")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn original_storage_key_uses_two_hex_prefix() {
        assert_eq!(original_storage_key("abcdef0123"), "originals/ab/abcdef0123");
    }

    #[test]
    fn staged_storage_key_uses_eight_hex_prefix_of_image_id() {
        let image_id = "11112222-3333-4444-5555-666677778888";
        assert_eq!(staged_storage_key(image_id), format!("staged/11112222/{image_id}-staged.jpg"));
    }
}
