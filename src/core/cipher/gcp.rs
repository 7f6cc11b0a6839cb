//! Google Cloud KMS backend.
//!
//! Talks to the Cloud KMS REST API (`cryptoKeys.encrypt` / `cryptoKeys.decrypt`)
//! so the CRC32C fields of the request and response are available to the
//! integrity checks. Enable with `--features gcp` (on by default).
//!
//! ## Requirements
//!
//! - An OAuth access token, from `GOOGLE_OAUTH_ACCESS_TOKEN` or an
//!   authenticated `gcloud` CLI (`gcloud auth print-access-token`)
//! - cloudkms.cryptoKeyVersions.useToEncrypt and useToDecrypt permissions
//!
//! ## Usage
//!
//! ```bash
//! export ENVI_RESOURCE_ID=projects/my-project/locations/global/keyRings/my-ring/cryptoKeys/my-key
//! envi init
//! ```

use ::base64::Engine;
use serde::{Deserialize, Serialize};
use std::process::{Command, Stdio};
use tracing::trace;
use zeroize::Zeroizing;

use super::{DecryptRequest, DecryptResponse, EncryptRequest, EncryptResponse, KeyManagement};
use crate::error::{CipherError, Result, Stage};

const DEFAULT_ENDPOINT: &str = "https://cloudkms.googleapis.com/v1";
const ENDPOINT_ENV: &str = "ENVI_KMS_ENDPOINT";
const TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

/// Google Cloud KMS client.
#[derive(Debug)]
pub struct GcpKms {
    endpoint: String,
    http: reqwest::blocking::Client,
}

// Cloud KMS encodes int64 fields as JSON strings.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EncryptBody {
    plaintext: String,
    plaintext_crc32c: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EncryptReply {
    ciphertext: Option<String>,
    ciphertext_crc32c: Option<String>,
    #[serde(default)]
    verified_plaintext_crc32c: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DecryptBody {
    ciphertext: String,
    ciphertext_crc32c: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DecryptReply {
    plaintext: Option<String>,
    plaintext_crc32c: Option<String>,
}

impl GcpKms {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            http: reqwest::blocking::Client::new(),
        }
    }

    /// Client for the public endpoint, or `ENVI_KMS_ENDPOINT` when set.
    pub fn from_env() -> Self {
        let endpoint =
            std::env::var(ENDPOINT_ENV).unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        Self::new(endpoint)
    }

    /// Validate `projects/*/locations/*/keyRings/*/cryptoKeys/*`.
    fn check_resource_name(name: &str) -> std::result::Result<(), String> {
        let parts: Vec<&str> = name.split('/').collect();

        if parts.len() != 8
            || parts[0] != "projects"
            || parts[2] != "locations"
            || parts[4] != "keyRings"
            || parts[6] != "cryptoKeys"
            || parts.iter().any(|p| p.is_empty())
        {
            return Err(format!("invalid GCP KMS resource name format: {}", name));
        }
        Ok(())
    }

    fn url(&self, key: &str, method: &str) -> String {
        format!("{}/{}:{}", self.endpoint, key, method)
    }

    /// OAuth token from the environment or the gcloud CLI.
    fn access_token() -> std::result::Result<Zeroizing<String>, String> {
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            if !token.trim().is_empty() {
                return Ok(Zeroizing::new(token.trim().to_string()));
            }
        }

        let output = Command::new("gcloud")
            .args(["auth", "print-access-token"])
            .stdin(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|_| {
                "gcloud CLI not found. Install it from https://cloud.google.com/sdk/docs/install"
                    .to_string()
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("gcloud auth print-access-token failed: {}", stderr.trim()));
        }

        let token = String::from_utf8(output.stdout)
            .map_err(|e| format!("UTF-8 error in access token: {}", e))?;
        Ok(Zeroizing::new(token.trim().to_string()))
    }

    fn post<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        body: &B,
    ) -> std::result::Result<R, String> {
        let token = Self::access_token()?;
        let response = self
            .http
            .post(url)
            .bearer_auth(token.as_str())
            .json(body)
            .send()
            .map_err(|e| format!("request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(format!("{}: {}", status, text.trim()));
        }

        response
            .json::<R>()
            .map_err(|e| format!("invalid response: {}", e))
    }
}

fn parse_crc(field: &str, value: Option<String>) -> std::result::Result<u32, String> {
    let value = value.ok_or_else(|| format!("response missing {}", field))?;
    value
        .parse::<u32>()
        .map_err(|e| format!("invalid {}: {}", field, e))
}

fn decode(field: &str, value: Option<String>) -> std::result::Result<Vec<u8>, String> {
    // Cloud KMS omits empty byte fields entirely.
    let value = value.unwrap_or_default();
    ::base64::engine::general_purpose::STANDARD
        .decode(value)
        .map_err(|e| format!("invalid base64 in {}: {}", field, e))
}

/// Cloud KMS answers a request-checksum mismatch with 400 and this phrase.
fn is_checksum_rejection(message: &str) -> bool {
    message.contains("400") && message.to_ascii_lowercase().contains("crc32c")
}

impl KeyManagement for GcpKms {
    fn name(&self) -> &'static str {
        "gcp-kms"
    }

    fn encrypt(&self, request: &EncryptRequest<'_>) -> Result<EncryptResponse> {
        trace!(
            resource_name = %request.key,
            plaintext_len = request.plaintext.len(),
            "encrypting with GCP KMS"
        );

        Self::check_resource_name(request.key).map_err(CipherError::EncryptionFailed)?;

        let body = EncryptBody {
            plaintext: ::base64::engine::general_purpose::STANDARD.encode(request.plaintext),
            plaintext_crc32c: request.plaintext_crc32c.to_string(),
        };

        let reply: EncryptReply = match self.post(&self.url(request.key, "encrypt"), &body) {
            Ok(reply) => reply,
            Err(e) if is_checksum_rejection(&e) => {
                return Err(CipherError::IntegrityCheckFailed {
                    operation: "encrypt",
                    stage: Stage::Request,
                }
                .into())
            }
            Err(e) => {
                return Err(
                    CipherError::EncryptionFailed(format!("KMS encrypt failed: {}", e)).into(),
                )
            }
        };

        let ciphertext =
            decode("ciphertext", reply.ciphertext).map_err(CipherError::EncryptionFailed)?;
        let ciphertext_crc32c = parse_crc("ciphertextCrc32c", reply.ciphertext_crc32c)
            .map_err(CipherError::EncryptionFailed)?;

        trace!(ciphertext_len = ciphertext.len(), "encrypted with GCP KMS");
        Ok(EncryptResponse {
            ciphertext,
            verified_plaintext_crc32c: reply.verified_plaintext_crc32c,
            ciphertext_crc32c,
        })
    }

    fn decrypt(&self, request: &DecryptRequest<'_>) -> Result<DecryptResponse> {
        trace!(
            resource_name = %request.key,
            ciphertext_len = request.ciphertext.len(),
            "decrypting with GCP KMS"
        );

        Self::check_resource_name(request.key).map_err(CipherError::DecryptionFailed)?;

        let body = DecryptBody {
            ciphertext: ::base64::engine::general_purpose::STANDARD.encode(request.ciphertext),
            ciphertext_crc32c: request.ciphertext_crc32c.to_string(),
        };

        let reply: DecryptReply = match self.post(&self.url(request.key, "decrypt"), &body) {
            Ok(reply) => reply,
            Err(e) if is_checksum_rejection(&e) => {
                return Err(CipherError::IntegrityCheckFailed {
                    operation: "decrypt",
                    stage: Stage::Request,
                }
                .into())
            }
            Err(e) => {
                return Err(
                    CipherError::DecryptionFailed(format!("KMS decrypt failed: {}", e)).into(),
                )
            }
        };

        let plaintext = Zeroizing::new(
            decode("plaintext", reply.plaintext).map_err(CipherError::DecryptionFailed)?,
        );
        let plaintext_crc32c = parse_crc("plaintextCrc32c", reply.plaintext_crc32c)
            .map_err(CipherError::DecryptionFailed)?;

        trace!(plaintext_len = plaintext.len(), "decrypted with GCP KMS");
        Ok(DecryptResponse {
            plaintext,
            plaintext_crc32c,
        })
    }
}
