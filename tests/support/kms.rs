//! In-memory KMS for library-level integration tests.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use envi::core::cipher::{
    checksum, DecryptRequest, DecryptResponse, EncryptRequest, EncryptResponse, KeyManagement,
};
use envi::core::config::Settings;
use envi::core::store::Store;
use envi::error::{CipherError, Result, Stage};
use zeroize::Zeroizing;

/// Key identifier used throughout the tests.
pub const KEY: &str = "projects/test/locations/global/keyRings/envi/cryptoKeys/test";

/// Which part of the integrity contract the fake should break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fault {
    #[default]
    None,
    /// Encrypt reply claims the plaintext checksum did not match
    UnverifiedRequest,
    /// Encrypt reply carries a wrong ciphertext checksum
    CorruptCiphertext,
    /// Decrypt reply carries a wrong plaintext checksum
    CorruptPlaintext,
    /// Every call fails as if the service were down
    Down,
}

/// Nonce-based toy cipher: `nonce(8) || body || tag(4)`.
///
/// Each encryption uses a fresh nonce, so saving the same document twice
/// yields different ciphertext.
#[derive(Debug, Default)]
pub struct FakeKms {
    pub fault: Fault,
    counter: AtomicU64,
}

impl FakeKms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fault(fault: Fault) -> Self {
        Self {
            fault,
            ..Self::default()
        }
    }

    fn keystream(key: &str, nonce: &[u8], i: usize) -> u8 {
        let key_crc = checksum(key.as_bytes()).to_le_bytes();
        nonce[i % 8] ^ key_crc[i % 4] ^ (i as u8).wrapping_mul(31)
    }

    fn tag(key: &str, nonce: &[u8], plaintext: &[u8]) -> [u8; 4] {
        let mut data = key.as_bytes().to_vec();
        data.extend_from_slice(nonce);
        data.extend_from_slice(plaintext);
        checksum(&data).to_le_bytes()
    }
}

impl KeyManagement for FakeKms {
    fn encrypt(&self, request: &EncryptRequest<'_>) -> Result<EncryptResponse> {
        if self.fault == Fault::Down {
            return Err(CipherError::EncryptionFailed("service unavailable".into()).into());
        }

        let nonce = (self.counter.fetch_add(1, Ordering::SeqCst) + 1).to_le_bytes();
        let mut ciphertext = nonce.to_vec();
        ciphertext.extend(
            request
                .plaintext
                .iter()
                .enumerate()
                .map(|(i, b)| b ^ Self::keystream(request.key, &nonce, i)),
        );
        ciphertext.extend_from_slice(&Self::tag(request.key, &nonce, request.plaintext));

        let mut ciphertext_crc32c = checksum(&ciphertext);
        if self.fault == Fault::CorruptCiphertext {
            ciphertext_crc32c ^= 0xdead_beef;
        }

        Ok(EncryptResponse {
            ciphertext,
            verified_plaintext_crc32c: self.fault != Fault::UnverifiedRequest
                && checksum(request.plaintext) == request.plaintext_crc32c,
            ciphertext_crc32c,
        })
    }

    fn decrypt(&self, request: &DecryptRequest<'_>) -> Result<DecryptResponse> {
        if self.fault == Fault::Down {
            return Err(CipherError::DecryptionFailed("service unavailable".into()).into());
        }
        if checksum(request.ciphertext) != request.ciphertext_crc32c {
            return Err(CipherError::IntegrityCheckFailed {
                operation: "decrypt",
                stage: Stage::Request,
            }
            .into());
        }

        let data = request.ciphertext;
        if data.len() < 12 {
            return Err(CipherError::DecryptionFailed("ciphertext too short".into()).into());
        }
        let (nonce, rest) = data.split_at(8);
        let (body, tag) = rest.split_at(rest.len() - 4);

        let plaintext: Zeroizing<Vec<u8>> = Zeroizing::new(
            body.iter()
                .enumerate()
                .map(|(i, b)| b ^ Self::keystream(request.key, nonce, i))
                .collect(),
        );
        if Self::tag(request.key, nonce, &plaintext) != tag {
            return Err(CipherError::DecryptionFailed("authentication failed".into()).into());
        }

        let mut plaintext_crc32c = checksum(&plaintext);
        if self.fault == Fault::CorruptPlaintext {
            plaintext_crc32c ^= 0xdead_beef;
        }

        Ok(DecryptResponse {
            plaintext,
            plaintext_crc32c,
        })
    }

    fn name(&self) -> &'static str {
        "fake-kms"
    }
}

/// Settings rooted at `dir` with the test key and a private temp dir.
pub fn settings(dir: &Path, scratch: &Path) -> Settings {
    Settings::new(dir)
        .with_resource_id(Some(KEY.to_string()))
        .with_temp_dir(scratch)
}

/// Store over `dir` using a healthy fake KMS.
pub fn store(dir: &Path, scratch: &Path) -> Store {
    Store::with_client(settings(dir, scratch), Box::new(FakeKms::new()))
}

/// Store over `dir` using a fake KMS with the given fault.
pub fn faulty_store(dir: &Path, scratch: &Path, fault: Fault) -> Store {
    Store::with_client(settings(dir, scratch), Box::new(FakeKms::with_fault(fault)))
}
