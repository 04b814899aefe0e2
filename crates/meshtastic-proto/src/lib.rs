//! Meshtastic Protobuf Wire Codec
//!
//! This crate provides the message schemas that can appear inside a
//! Meshtastic share URL, together with a small protobuf wire reader and
//! writer. Every scalar field is tracked with explicit presence, so a field
//! set to zero on the wire is distinguishable from a missing one.
//!
//! # Schemas
//!
//! - **Channel family**: [`ChannelSet`], [`Channel`], [`ChannelSettings`],
//!   [`ModuleSettings`], [`LoRaConfig`]
//! - **Node family**: [`NodeInfo`], [`User`], [`Position`], [`MyNodeInfo`],
//!   [`DeviceMetrics`]
//! - **Packets**: [`MeshPacket`], [`Data`]
//!
//! # Example
//!
//! ```rust,ignore
//! use meshtastic_proto::{ChannelSet, Message};
//!
//! let set = ChannelSet::decode(&payload)?;
//! let fields = set.to_fields();
//! ```

mod channel;
mod enums;
mod error;
mod fields;
mod mesh;
mod message;
mod wire;

pub use channel::*;
pub use enums::*;
pub use error::*;
pub use fields::*;
pub use mesh::*;
pub use message::Message;
pub use wire::*;
