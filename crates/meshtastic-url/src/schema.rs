//! The fixed registry of candidate schemas.
//!
//! A share URL does not say which message it carries, and protobuf bytes
//! often parse under several shapes. Each [`CandidateSchema`] pairs a parser
//! with a plausibility predicate that rejects parses carrying nothing but
//! defaults. Candidates are grouped into two ordered families plus a last
//! resort:
//!
//! | Family  | Order                                     |
//! |---------|-------------------------------------------|
//! | Channel | `ChannelSet`, `Channel`                   |
//! | Node    | `NodeInfo`, `User`, `Position`, `MyNodeInfo` |
//! | Last    | `MeshPacket` (always plausible)           |

use meshtastic_proto::{
    Channel, ChannelSet, Fields, MeshPacket, Message, MyNodeInfo, NodeInfo, Position, ProtoResult,
    User,
};

use crate::UrlClassification;

// ============================================================================
// Result sections
// ============================================================================

/// Key under which a matched record appears in a decode response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultSection {
    /// Channel configuration (`ChannelSet` or `Channel`).
    Config,
    /// `NodeInfo`.
    Node,
    /// `User`.
    User,
    /// `Position`.
    Position,
    /// `MyNodeInfo`.
    MyNodeInfo,
    /// `MeshPacket`.
    MeshPacket,
}

impl ResultSection {
    /// Response key.
    pub fn key(self) -> &'static str {
        match self {
            ResultSection::Config => "Config",
            ResultSection::Node => "Node",
            ResultSection::User => "User",
            ResultSection::Position => "Position",
            ResultSection::MyNodeInfo => "MyNodeInfo",
            ResultSection::MeshPacket => "MeshPacket",
        }
    }

    /// Human-readable heading.
    pub fn title(self) -> &'static str {
        match self {
            ResultSection::Config => "Configuration Data",
            ResultSection::Node => "Node Information",
            ResultSection::User => "User Information",
            ResultSection::Position => "Position Information",
            ResultSection::MyNodeInfo => "My Node Information",
            ResultSection::MeshPacket => "Mesh Packet",
        }
    }

    /// All sections, in response precedence order.
    pub const ALL: [ResultSection; 6] = [
        ResultSection::Config,
        ResultSection::Node,
        ResultSection::User,
        ResultSection::Position,
        ResultSection::MyNodeInfo,
        ResultSection::MeshPacket,
    ];
}

// ============================================================================
// Parsed messages
// ============================================================================

/// A payload parsed under one candidate schema.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedMessage {
    ChannelSet(ChannelSet),
    Channel(Channel),
    NodeInfo(NodeInfo),
    User(User),
    Position(Position),
    MyNodeInfo(MyNodeInfo),
    MeshPacket(MeshPacket),
}

impl ParsedMessage {
    /// Render as a field mapping.
    pub fn to_fields(&self) -> Fields {
        match self {
            ParsedMessage::ChannelSet(m) => m.to_fields(),
            ParsedMessage::Channel(m) => m.to_fields(),
            ParsedMessage::NodeInfo(m) => m.to_fields(),
            ParsedMessage::User(m) => m.to_fields(),
            ParsedMessage::Position(m) => m.to_fields(),
            ParsedMessage::MyNodeInfo(m) => m.to_fields(),
            ParsedMessage::MeshPacket(m) => m.to_fields(),
        }
    }

    /// Protobuf message name of the parsed record.
    pub fn schema_name(&self) -> &'static str {
        match self {
            ParsedMessage::ChannelSet(_) => "ChannelSet",
            ParsedMessage::Channel(_) => "Channel",
            ParsedMessage::NodeInfo(_) => "NodeInfo",
            ParsedMessage::User(_) => "User",
            ParsedMessage::Position(_) => "Position",
            ParsedMessage::MyNodeInfo(_) => "MyNodeInfo",
            ParsedMessage::MeshPacket(_) => "MeshPacket",
        }
    }

    /// Number of channels carried, for channel records.
    pub fn channel_count(&self) -> Option<usize> {
        match self {
            ParsedMessage::ChannelSet(set) => Some(set.settings.len()),
            ParsedMessage::Channel(_) => Some(1),
            _ => None,
        }
    }
}

// ============================================================================
// Candidates
// ============================================================================

/// One message shape the decoder may try.
pub struct CandidateSchema {
    /// Protobuf message name, as written to the attempt log.
    pub name: &'static str,
    /// Response key used when this candidate matches.
    pub section: ResultSection,
    parse: fn(&[u8]) -> ProtoResult<ParsedMessage>,
    plausible: fn(&ParsedMessage) -> bool,
}

impl std::fmt::Debug for CandidateSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandidateSchema")
            .field("name", &self.name)
            .field("section", &self.section)
            .finish()
    }
}

impl CandidateSchema {
    /// Parse `bytes` under this schema.
    pub fn parse(&self, bytes: &[u8]) -> ProtoResult<ParsedMessage> {
        (self.parse)(bytes)
    }

    /// Whether a parse result carries at least one meaningful field.
    pub fn is_plausible(&self, message: &ParsedMessage) -> bool {
        (self.plausible)(message)
    }
}

fn parse_channel_set(bytes: &[u8]) -> ProtoResult<ParsedMessage> {
    ChannelSet::decode(bytes).map(ParsedMessage::ChannelSet)
}

fn parse_channel(bytes: &[u8]) -> ProtoResult<ParsedMessage> {
    Channel::decode(bytes).map(ParsedMessage::Channel)
}

fn parse_node_info(bytes: &[u8]) -> ProtoResult<ParsedMessage> {
    NodeInfo::decode(bytes).map(ParsedMessage::NodeInfo)
}

fn parse_user(bytes: &[u8]) -> ProtoResult<ParsedMessage> {
    User::decode(bytes).map(ParsedMessage::User)
}

fn parse_position(bytes: &[u8]) -> ProtoResult<ParsedMessage> {
    Position::decode(bytes).map(ParsedMessage::Position)
}

fn parse_my_node_info(bytes: &[u8]) -> ProtoResult<ParsedMessage> {
    MyNodeInfo::decode(bytes).map(ParsedMessage::MyNodeInfo)
}

fn parse_mesh_packet(bytes: &[u8]) -> ProtoResult<ParsedMessage> {
    MeshPacket::decode(bytes).map(ParsedMessage::MeshPacket)
}

fn present_str(s: &Option<String>) -> bool {
    s.as_deref().is_some_and(|s| !s.is_empty())
}

fn present_msg<M: Message>(m: &Option<M>) -> bool {
    m.as_ref().is_some_and(|m| !m.is_empty())
}

fn channel_set_plausible(message: &ParsedMessage) -> bool {
    match message {
        ParsedMessage::ChannelSet(set) => !set.settings.is_empty() || present_msg(&set.lora_config),
        _ => false,
    }
}

fn channel_plausible(message: &ParsedMessage) -> bool {
    match message {
        ParsedMessage::Channel(ch) => {
            present_msg(&ch.settings) || ch.role.is_some() || ch.index.is_some()
        }
        _ => false,
    }
}

fn node_info_plausible(message: &ParsedMessage) -> bool {
    match message {
        ParsedMessage::NodeInfo(node) => node.num.is_some() || present_msg(&node.user),
        _ => false,
    }
}

fn user_plausible(message: &ParsedMessage) -> bool {
    match message {
        ParsedMessage::User(user) => {
            present_str(&user.id) || present_str(&user.long_name) || present_str(&user.short_name)
        }
        _ => false,
    }
}

fn position_plausible(message: &ParsedMessage) -> bool {
    match message {
        ParsedMessage::Position(pos) => {
            pos.latitude_i.is_some() || pos.longitude_i.is_some() || pos.altitude.is_some()
        }
        _ => false,
    }
}

fn my_node_info_plausible(message: &ParsedMessage) -> bool {
    match message {
        ParsedMessage::MyNodeInfo(info) => !info.is_empty(),
        _ => false,
    }
}

fn always(_: &ParsedMessage) -> bool {
    true
}

/// Channel family, in trial order.
pub static CHANNEL_FAMILY: [CandidateSchema; 2] = [
    CandidateSchema {
        name: "ChannelSet",
        section: ResultSection::Config,
        parse: parse_channel_set,
        plausible: channel_set_plausible,
    },
    CandidateSchema {
        name: "Channel",
        section: ResultSection::Config,
        parse: parse_channel,
        plausible: channel_plausible,
    },
];

/// Node family, in trial order.
pub static NODE_FAMILY: [CandidateSchema; 4] = [
    CandidateSchema {
        name: "NodeInfo",
        section: ResultSection::Node,
        parse: parse_node_info,
        plausible: node_info_plausible,
    },
    CandidateSchema {
        name: "User",
        section: ResultSection::User,
        parse: parse_user,
        plausible: user_plausible,
    },
    CandidateSchema {
        name: "Position",
        section: ResultSection::Position,
        parse: parse_position,
        plausible: position_plausible,
    },
    CandidateSchema {
        name: "MyNodeInfo",
        section: ResultSection::MyNodeInfo,
        parse: parse_my_node_info,
        plausible: my_node_info_plausible,
    },
];

/// Tried after both families, whatever the classification.
pub static LAST_RESORT: CandidateSchema = CandidateSchema {
    name: "MeshPacket",
    section: ResultSection::MeshPacket,
    parse: parse_mesh_packet,
    plausible: always,
};

/// Every candidate in the order dictated by `classification`.
pub fn candidate_order(
    classification: UrlClassification,
) -> impl Iterator<Item = &'static CandidateSchema> {
    let (first, second) = if classification.prefers_node_family() {
        (&NODE_FAMILY[..], &CHANNEL_FAMILY[..])
    } else {
        (&CHANNEL_FAMILY[..], &NODE_FAMILY[..])
    };
    first
        .iter()
        .chain(second.iter())
        .chain(std::iter::once(&LAST_RESORT))
}
