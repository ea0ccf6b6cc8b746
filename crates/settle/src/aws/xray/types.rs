//! X-Ray encryption configuration

use aws_sdk_xray::types as sdk;
use serde::Serialize;
use strum::{Display, EnumString};

/// How X-Ray encrypts trace data at rest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum EncryptionType {
    /// A customer managed or AWS managed KMS key
    #[strum(serialize = "KMS")]
    #[serde(rename = "KMS")]
    Kms,
    /// X-Ray's default encryption
    #[strum(serialize = "NONE")]
    #[serde(rename = "NONE")]
    None,
}

impl From<EncryptionType> for sdk::EncryptionType {
    fn from(t: EncryptionType) -> Self {
        match t {
            EncryptionType::Kms => sdk::EncryptionType::Kms,
            EncryptionType::None => sdk::EncryptionType::None,
        }
    }
}

/// The region's X-Ray encryption configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncryptionConfig {
    pub key_id: Option<String>,
    pub status: Option<String>,
    /// `None` if the service reported a type this crate does not model
    pub encryption_type: Option<EncryptionType>,
}

impl From<&sdk::EncryptionConfig> for EncryptionConfig {
    fn from(c: &sdk::EncryptionConfig) -> Self {
        Self {
            key_id: c.key_id().map(str::to_string),
            status: c.status().map(|s| s.as_str().to_string()),
            encryption_type: c.r#type().and_then(|t| t.as_str().parse().ok()),
        }
    }
}
