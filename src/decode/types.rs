//! Decoder types

use serde::{Deserialize, Serialize};

/// How decoded base64 bytes are turned back into text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Base64Output {
    /// UTF-8 text, probed for embedded JSON
    #[default]
    Utf8,
    /// Lowercase hex digits
    Hex,
}
