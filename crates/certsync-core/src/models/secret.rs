//! Secret domain model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::meta::ObjectMeta;
use crate::encoding::base64_map;

/// Well-known data entry holding a PEM-encoded private key.
pub const TLS_PRIVATE_KEY_KEY: &str = "tls.key";

/// Opaque key/value byte store. The request manager only reads these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Secret {
    pub meta: ObjectMeta,
    #[serde(default, with = "base64_map")]
    pub data: BTreeMap<String, Vec<u8>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSecret {
    pub namespace: String,
    pub name: String,
    pub data: BTreeMap<String, Vec<u8>>,
}
