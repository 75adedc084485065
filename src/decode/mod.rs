//! Payload sniffing module
//!
//! Opportunistically decodes string payloads before they become leaves:
//! - base64 text (globally by shape, or for explicitly listed keys/paths)
//! - strings holding embedded JSON (`autoCast`)
//!
//! # Overview
//!
//! Decoding never fails a traversal. Bad base64 or JSON is logged and the
//! original value is kept.

mod sniffer;
mod types;

pub use sniffer::{decode_base64, is_base64, probe_json, PayloadSniffer};
pub use types::Base64Output;
