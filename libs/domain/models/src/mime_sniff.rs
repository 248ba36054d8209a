//! Detección de tipo MIME por número mágico, compartida entre la admisión
//! de un Original (apps/api, antes de CAOS) y la construcción de la data
//! URL del Staging Worker (apps/worker, spec §4.7 paso 3). Cubre los
//! formatos de imagen realmente subidos por el cliente; cualquier otro
//! flujo de bytes cae al tipo genérico.

const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];
const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const GIF87_MAGIC: [u8; 6] = *b"GIF87a";
const GIF89_MAGIC: [u8; 6] = *b"GIF89a";
const RIFF_MAGIC: [u8; 4] = *b"RIFF";
const WEBP_MAGIC: [u8; 4] = *b"WEBP";

pub fn sniff_media_type(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&JPEG_MAGIC) {
        return "image/jpeg";
    }
    if bytes.starts_with(&PNG_MAGIC) {
        return "image/png";
    }
    if bytes.starts_with(&GIF87_MAGIC) || bytes.starts_with(&GIF89_MAGIC) {
        return "image/gif";
    }
    if bytes.len() >= 12 && bytes[0..4] == RIFF_MAGIC && bytes[8..12] == WEBP_MAGIC {
        return "image/webp";
    }
    "application/octet-stream"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_png_signature() {
        let mut bytes = PNG_MAGIC.to_vec();
        bytes.extend_from_slice(&[0, 0, 0]);
        assert_eq!(sniff_media_type(&bytes), "image/png");
    }

    #[test]
    fn detects_jpeg_signature() {
        assert_eq!(sniff_media_type(&[0xFF, 0xD8, 0xFF, 0xE0]), "image/jpeg");
    }

    #[test]
    fn falls_back_to_octet_stream_for_unknown_bytes() {
        assert_eq!(sniff_media_type(&[0, 1, 2, 3]), "application/octet-stream");
    }
}
