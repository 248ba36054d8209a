// [libs/infra/blob/src/presign.rs]
/*!
 * =================================================================
 * APARATO: SIGV4 QUERY PRESIGNER (V1.0 - GOLD MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: FIRMA DE URLS DE SUBIDA/DESCARGA DIRECTA AL OBJECT STORE
 *
 * VISION HOLÍSTICA:
 * Implementa la variante de query-string de AWS Signature V4 (la misma
 * usada por S3 y cualquier object store compatible — R2, MinIO, Spaces),
 * sin depender de un SDK: solo `hmac`+`sha2`, igual que el resto de la
 * capa de persistencia usa `sha2` para el direccionamiento por contenido.
 * =================================================================
 */

use crate::errors::BlobError;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

pub struct SigningCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
}

pub enum PresignMethod {
    Put,
    Get,
}

impl PresignMethod {
    fn as_str(&self) -> &'static str {
        match self {
            PresignMethod::Put => "PUT",
            PresignMethod::Get => "GET",
        }
    }
}

/// Construye una URL presignada de tipo query-string contra `endpoint`
/// (p. ej. `https://<bucket>.s3.<region>.amazonaws.com`) para `object_key`,
/// válida por `expires_in_seconds` (máximo 604800 por el propio protocolo).
pub fn presign_url(
    method: PresignMethod,
    endpoint: &str,
    object_key: &str,
    credentials: &SigningCredentials,
    expires_in_seconds: u32,
    extra_query: &[(&str, &str)],
    now: DateTime<Utc>,
) -> Result<String, BlobError> {
    let parsed = url::Url::parse(endpoint)
        .map_err(|e| BlobError::Configuration(format!("invalid endpoint url: {e}")))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| BlobError::Configuration("endpoint has no host".into()))?
        .to_string();

    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let date_stamp = now.format("%Y%m%d").to_string();
    let credential_scope = format!("{date_stamp}/{}/s3/aws4_request", credentials.region);
    let credential = format!("{}/{credential_scope}", credentials.access_key_id);

    let canonical_uri = format!("/{}", object_key.trim_start_matches('/'));

    let mut query_pairs: Vec<(String, String)> = vec![
        ("X-Amz-Algorithm".into(), "AWS4-HMAC-SHA256".into()),
        ("X-Amz-Credential".into(), credential.clone()),
        ("X-Amz-Date".into(), amz_date.clone()),
        ("X-Amz-Expires".into(), expires_in_seconds.to_string()),
        ("X-Amz-SignedHeaders".into(), "host".into()),
    ];
    for (key, value) in extra_query {
        query_pairs.push((key.to_string(), value.to_string()));
    }
    query_pairs.sort_by(|a, b| a.0.cmp(&b.0));

    let canonical_querystring = query_pairs
        .iter()
        .map(|(k, v)| format!("{}={}", uri_encode(k), uri_encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    let canonical_headers = format!("host:{host}\n");
    let signed_headers = "host";

    let canonical_request = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        method.as_str(),
        canonical_uri,
        canonical_querystring,
        canonical_headers,
        signed_headers,
        "UNSIGNED-PAYLOAD",
    );

    let hashed_canonical_request = hex::encode(Sha256::digest(canonical_request.as_bytes()));

    let string_to_sign = format!(
        "AWS4-HMAC-SHA256\n{amz_date}\n{credential_scope}\n{hashed_canonical_request}",
    );

    let signing_key = derive_signing_key(&credentials.secret_access_key, &date_stamp, &credentials.region);
    let signature = hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes()));

    Ok(format!(
        "{}://{}{}?{}&X-Amz-Signature={}",
        parsed.scheme(),
        host,
        canonical_uri,
        canonical_querystring,
        signature
    ))
}

fn derive_signing_key(secret_access_key: &str, date_stamp: &str, region: &str) -> Vec<u8> {
    let k_secret = format!("AWS4{secret_access_key}");
    let k_date = hmac_sha256(k_secret.as_bytes(), date_stamp.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, b"s3");
    hmac_sha256(&k_service, b"aws4_request")
}

fn hmac_sha256(key: &[u8], message: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

/// Codificación porcentual RFC 3986 estricta, requerida por SigV4 (distinta
/// de la codificación laxa de `url::form_urlencoded`).
fn uri_encode(input: &str) -> String {
    let mut encoded = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char);
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
    }

    fn fixed_credentials() -> SigningCredentials {
        SigningCredentials {
            access_key_id: "AKIDEXAMPLE".into(),
            secret_access_key: "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY".into(),
            region: "us-east-1".into(),
        }
    }

    #[test]
    fn presigned_url_embeds_signature_and_expiry() {
        let url = presign_url(
            PresignMethod::Put,
            "https://bucket.s3.us-east-1.amazonaws.com",
            "originals/ab/abcdef123",
            &fixed_credentials(),
            900,
            &[],
            fixed_now(),
        )
        .unwrap();

        assert!(url.contains("X-Amz-Signature="));
        assert!(url.contains("X-Amz-Expires=900"));
        assert!(url.contains("originals/ab/abcdef123"));
    }

    #[test]
    fn same_inputs_produce_deterministic_signature() {
        let first = presign_url(PresignMethod::Get, "https://bucket.s3.us-east-1.amazonaws.com", "k", &fixed_credentials(), 60, &[], fixed_now()).unwrap();
        let second = presign_url(PresignMethod::Get, "https://bucket.s3.us-east-1.amazonaws.com", "k", &fixed_credentials(), 60, &[], fixed_now()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn extra_query_parameters_affect_signature() {
        let plain = presign_url(PresignMethod::Get, "https://bucket.s3.us-east-1.amazonaws.com", "k", &fixed_credentials(), 60, &[], fixed_now()).unwrap();
        let with_disposition = presign_url(
            PresignMethod::Get,
            "https://bucket.s3.us-east-1.amazonaws.com",
            "k",
            &fixed_credentials(),
            60,
            &[("response-content-disposition", "attachment")],
            fixed_now(),
        )
        .unwrap();
        assert_ne!(plain, with_disposition);
        assert!(with_disposition.contains("response-content-disposition"));
    }
}
