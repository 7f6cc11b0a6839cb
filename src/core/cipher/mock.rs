//! Mock KMS backend for testing.
//!
//! Reversible hex encoding bound to the key name. NOT cryptographically
//! secure; it only exercises the KMS plumbing and checksum contract without
//! network access.

use zeroize::Zeroizing;

use super::{checksum, DecryptRequest, DecryptResponse, EncryptRequest, EncryptResponse};
use super::KeyManagement;
use crate::error::{CipherError, Result, Stage};

const PREFIX: &str = "mock-kms";

#[derive(Debug, Clone, Copy, Default)]
pub struct MockKms;

fn mask(key: &str) -> u8 {
    (checksum(key.as_bytes()) & 0xff) as u8 | 0x01
}

impl KeyManagement for MockKms {
    fn encrypt(&self, request: &EncryptRequest<'_>) -> Result<EncryptResponse> {
        let mask = mask(request.key);
        let body: String = request
            .plaintext
            .iter()
            .map(|b| format!("{:02x}", b ^ mask))
            .collect();
        let ciphertext = format!(
            "{}:{:08x}:{:08x}:{}",
            PREFIX,
            checksum(request.key.as_bytes()),
            checksum(request.plaintext),
            body
        )
        .into_bytes();

        Ok(EncryptResponse {
            verified_plaintext_crc32c: checksum(request.plaintext) == request.plaintext_crc32c,
            ciphertext_crc32c: checksum(&ciphertext),
            ciphertext,
        })
    }

    fn decrypt(&self, request: &DecryptRequest<'_>) -> Result<DecryptResponse> {
        if checksum(request.ciphertext) != request.ciphertext_crc32c {
            return Err(CipherError::IntegrityCheckFailed {
                operation: "decrypt",
                stage: Stage::Request,
            }
            .into());
        }

        let invalid = || CipherError::DecryptionFailed("not a mock-kms ciphertext".to_string());

        let text = std::str::from_utf8(request.ciphertext).map_err(|_| invalid())?;
        let mut parts = text.splitn(4, ':');
        let (prefix, key_crc, body_crc, body) =
            match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some(p), Some(k), Some(c), Some(b)) => (p, k, c, b),
                _ => return Err(invalid().into()),
            };
        if prefix != PREFIX {
            return Err(invalid().into());
        }
        if key_crc != format!("{:08x}", checksum(request.key.as_bytes())) {
            return Err(CipherError::DecryptionFailed(
                "ciphertext was not produced by this key".to_string(),
            )
            .into());
        }
        if body.len() % 2 != 0 || !body.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(invalid().into());
        }

        let mask = mask(request.key);
        let bytes: std::result::Result<Vec<u8>, _> = (0..body.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&body[i..i + 2], 16).map(|b| b ^ mask))
            .collect();
        let plaintext = Zeroizing::new(
            bytes.map_err(|e| CipherError::DecryptionFailed(format!("invalid hex: {}", e)))?,
        );

        if body_crc != format!("{:08x}", checksum(&plaintext)) {
            return Err(CipherError::DecryptionFailed("authentication failed".to_string()).into());
        }

        Ok(DecryptResponse {
            plaintext_crc32c: checksum(&plaintext),
            plaintext,
        })
    }

    fn name(&self) -> &'static str {
        "mock-kms"
    }
}
