//! Secure channel mode selection

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// Which secured messaging scheme to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// AES-256-GCM with an additional HMAC-SHA256 tag over a shared key
    #[serde(alias = "hmac")]
    Symmetric,
    /// RSA PKCS#1 v1.5 encryption and signature with per-party key pairs
    #[serde(alias = "rsa")]
    Asymmetric,
}

impl Mode {
    /// Short name used on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Symmetric => "hmac",
            Self::Asymmetric => "rsa",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hmac" | "symmetric" | "sym" => Ok(Self::Symmetric),
            "rsa" | "asymmetric" | "asym" => Ok(Self::Asymmetric),
            _ => Err(ProtocolError::UnknownMode(s.to_string())),
        }
    }
}
