//! Meshtastic Share URL Codec
//!
//! This crate decodes and encodes the share URLs Meshtastic apps exchange,
//! such as `https://meshtastic.org/e/#<payload>`. The payload is a protobuf
//! record in URL-safe base64, and nothing in it says which message it is.
//!
//! # Decoding
//!
//! The URL path picks the order in which candidate schemas are tried:
//!
//! - `/v/` URLs try the node family (`NodeInfo`, `User`, `Position`,
//!   `MyNodeInfo`) first
//! - everything else tries the channel family (`ChannelSet`, `Channel`) first
//! - `MeshPacket` is the last resort in both cases
//!
//! A candidate wins when it parses and carries at least one meaningful
//! field. Rejected candidates are collected in an attempt log that is
//! returned when nothing matches.
//!
//! # Encoding
//!
//! The [`Encoder`] builds a `ChannelSet` (or a bare `Channel`) from loosely
//! typed input, forms the URL, and decodes it again as a self-check.
//!
//! # Example
//!
//! ```rust,ignore
//! use meshtastic_url::{Decoder, Encoder, ChannelSpec};
//!
//! let response = Decoder::new().decode_channel_url("https://meshtastic.org/e/#CgcSAQE...");
//! println!("{}", serde_json::to_string(&response)?);
//!
//! let encoded = Encoder::default().encode_single_channel(&ChannelSpec::default())?;
//! println!("{}", encoded.url);
//! ```

pub mod base64url;
pub mod coerce;
mod config;
mod decode;
mod encode;
mod error;
mod extract;
mod psk;
mod qr;
mod response;
mod schema;

pub use config::*;
pub use decode::*;
pub use encode::*;
pub use error::*;
pub use extract::*;
pub use psk::*;
pub use qr::*;
pub use response::*;
pub use schema::*;
