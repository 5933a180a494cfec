//! On-disk encrypted container format.
//!
//! A `.vault` file is a small UTF-8 JSON envelope:
//!
//! ```text
//! {"ciphertext": "<base64>", "iv": "<base64, 12 bytes>",
//!  "salt": "<base64, 32 bytes>", "authTag": ""}
//! ```
//!
//! - **ciphertext**: AES-256-GCM output, authentication tag appended.
//! - **iv**: the GCM nonce, freshly random for every write.
//! - **salt**: the PBKDF2 salt, also freshly random for every write.
//! - **authTag**: always empty; the tag lives inside `ciphertext`. The
//!   field survives as a format marker from version 1.
//!
//! Salt and iv are regenerated on every save, so encrypting the same
//! document twice never yields the same bytes.

use serde::{Deserialize, Serialize};

use crate::crypto::{IV_LEN, SALT_LEN};
use crate::errors::{Result, VaultError};

/// The parsed on-disk envelope. Holds raw bytes in memory; base64 only
/// exists in the serialized form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedContainer {
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub ciphertext: Vec<u8>,

    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub iv: Vec<u8>,

    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub salt: Vec<u8>,

    /// Format marker, always empty. Older readers require its presence.
    #[serde(default)]
    pub auth_tag: String,
}

impl EncryptedContainer {
    pub fn new(ciphertext: Vec<u8>, iv: [u8; IV_LEN], salt: [u8; SALT_LEN]) -> Self {
        Self {
            ciphertext,
            iv: iv.to_vec(),
            salt: salt.to_vec(),
            auth_tag: String::new(),
        }
    }

    /// Parse a container from file bytes.
    ///
    /// Anything that is not the JSON envelope above (wrong encoding, bad
    /// base64, missing fields, wrong iv/salt sizes) is reported as
    /// [`VaultError::MalformedContainer`]; wrong-password failures only
    /// happen later, at decrypt time.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| VaultError::MalformedContainer("file is not valid UTF-8".into()))?;

        let container: EncryptedContainer = serde_json::from_str(text)
            .map_err(|e| VaultError::MalformedContainer(format!("container JSON: {e}")))?;

        container.validate()?;
        Ok(container)
    }

    /// Serialize to the exact bytes written to disk (compact JSON).
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| VaultError::SerializationError(format!("container: {e}")))
    }

    /// Check the structural invariants of a parsed container.
    pub fn validate(&self) -> Result<()> {
        if self.ciphertext.is_empty() {
            return Err(VaultError::MalformedContainer("empty ciphertext".into()));
        }
        if self.iv.len() != IV_LEN {
            return Err(VaultError::MalformedContainer(format!(
                "iv must be {IV_LEN} bytes, got {}",
                self.iv.len()
            )));
        }
        if self.salt.len() != SALT_LEN {
            return Err(VaultError::MalformedContainer(format!(
                "salt must be {SALT_LEN} bytes, got {}",
                self.salt.len()
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

pub(crate) fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let encoded = BASE64.encode(data);
    serializer.serialize_str(&encoded)
}

pub(crate) fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}
