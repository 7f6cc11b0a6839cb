//! Key-management client seam.
//!
//! Encryption itself is delegated to a KMS. This module owns the
//! integrity-check contract around every call:
//!
//! 1. the outbound payload's CRC32C travels with the request,
//! 2. the service reports whether it saw the same checksum,
//! 3. the returned payload is re-checksummed locally and compared with the
//!    checksum the service reported.
//!
//! Any mismatch discards the payload.
//!
//! ## Backends
//!
//! - **gcp**: Google Cloud KMS over REST. Feature-gated (`gcp`, on by default).
//! - **mock**: reversible test cipher. Unit tests and the `test-kms` feature.

use tracing::{debug, trace};
use zeroize::Zeroizing;

use crate::error::{CipherError, Result, Stage};

#[cfg(feature = "gcp")]
pub mod gcp;

#[cfg(any(test, feature = "test-kms"))]
pub mod mock;

/// Encrypt call as sent to the service.
#[derive(Debug)]
pub struct EncryptRequest<'a> {
    /// Key identifier
    pub key: &'a str,
    pub plaintext: &'a [u8],
    pub plaintext_crc32c: u32,
}

/// Service reply to an encrypt call.
#[derive(Debug)]
pub struct EncryptResponse {
    pub ciphertext: Vec<u8>,
    /// Whether the service's checksum of the plaintext matched ours
    pub verified_plaintext_crc32c: bool,
    pub ciphertext_crc32c: u32,
}

/// Decrypt call as sent to the service.
#[derive(Debug)]
pub struct DecryptRequest<'a> {
    pub key: &'a str,
    pub ciphertext: &'a [u8],
    pub ciphertext_crc32c: u32,
}

/// Service reply to a decrypt call.
pub struct DecryptResponse {
    pub plaintext: Zeroizing<Vec<u8>>,
    pub plaintext_crc32c: u32,
}

impl std::fmt::Debug for DecryptResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecryptResponse")
            .field("plaintext_len", &self.plaintext.len())
            .field("plaintext_crc32c", &self.plaintext_crc32c)
            .finish()
    }
}

/// A key-management service able to encrypt and decrypt under a named key.
///
/// Implementations report service failures as `CipherError::EncryptionFailed`
/// or `CipherError::DecryptionFailed`. A service that verifies the request
/// checksum itself and rejects a mismatch should report
/// `CipherError::IntegrityCheckFailed` with `Stage::Request`.
pub trait KeyManagement: std::fmt::Debug {
    fn encrypt(&self, request: &EncryptRequest<'_>) -> Result<EncryptResponse>;

    fn decrypt(&self, request: &DecryptRequest<'_>) -> Result<DecryptResponse>;

    /// Backend name for logs.
    fn name(&self) -> &'static str;
}

/// CRC32C (Castagnoli), the checksum Cloud KMS uses.
pub fn checksum(data: &[u8]) -> u32 {
    crc32c::crc32c(data)
}

/// Encrypt `plaintext` under `key`, enforcing both checksum checks.
///
/// # Errors
///
/// Returns `CipherError::IntegrityCheckFailed` if the service did not verify
/// the request checksum or the response checksum does not match, and
/// propagates any service error.
pub fn encrypt(client: &dyn KeyManagement, key: &str, plaintext: &[u8]) -> Result<Vec<u8>> {
    let request = EncryptRequest {
        key,
        plaintext,
        plaintext_crc32c: checksum(plaintext),
    };
    trace!(
        backend = client.name(),
        plaintext_len = plaintext.len(),
        "encrypt request"
    );

    let response = client.encrypt(&request)?;

    if !response.verified_plaintext_crc32c {
        debug!("encrypt: service did not verify plaintext checksum");
        return Err(CipherError::IntegrityCheckFailed {
            operation: "encrypt",
            stage: Stage::Request,
        }
        .into());
    }
    if checksum(&response.ciphertext) != response.ciphertext_crc32c {
        debug!("encrypt: ciphertext checksum mismatch");
        return Err(CipherError::IntegrityCheckFailed {
            operation: "encrypt",
            stage: Stage::Response,
        }
        .into());
    }

    trace!(ciphertext_len = response.ciphertext.len(), "encrypted");
    Ok(response.ciphertext)
}

/// Decrypt `ciphertext` under `key`, enforcing the response checksum.
///
/// # Errors
///
/// Returns `CipherError::IntegrityCheckFailed` if the returned plaintext does
/// not match the service-reported checksum, and propagates any service error.
pub fn decrypt(
    client: &dyn KeyManagement,
    key: &str,
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    let request = DecryptRequest {
        key,
        ciphertext,
        ciphertext_crc32c: checksum(ciphertext),
    };
    trace!(
        backend = client.name(),
        ciphertext_len = ciphertext.len(),
        "decrypt request"
    );

    let response = client.decrypt(&request)?;

    if checksum(&response.plaintext) != response.plaintext_crc32c {
        debug!("decrypt: plaintext checksum mismatch");
        return Err(CipherError::IntegrityCheckFailed {
            operation: "decrypt",
            stage: Stage::Response,
        }
        .into());
    }

    trace!(plaintext_len = response.plaintext.len(), "decrypted");
    Ok(response.plaintext)
}

/// Build the KMS client for this build.
///
/// `test-kms` builds always get the mock; otherwise Cloud KMS when the `gcp`
/// feature is compiled in.
pub fn client() -> Result<Box<dyn KeyManagement>> {
    #[cfg(any(test, feature = "test-kms"))]
    {
        debug!("using mock KMS backend");
        return Ok(Box::new(mock::MockKms));
    }

    #[cfg(all(not(test), not(feature = "test-kms"), feature = "gcp"))]
    {
        debug!("using GCP KMS backend");
        return Ok(Box::new(gcp::GcpKms::from_env()));
    }

    #[cfg(all(not(test), not(feature = "test-kms"), not(feature = "gcp")))]
    {
        return Err(CipherError::Unavailable(
            "no KMS backend compiled. Rebuild with: cargo install envi --features gcp".to_string(),
        )
        .into());
    }
}
