//! Message protocol spoken across the trust boundary.
//!
//! Every message is a JSON object with a `type` tag. Inbound messages come
//! from peers (untrusted ones may only say `hello`), outbound messages are
//! the handshake request and the `info:*` state notifications.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Messages a peer may send to the player link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Inbound {
    /// Introduction from a not-yet-trusted origin. Any extra fields are
    /// carried along into the `acl:Request` forwarded to trusted peers.
    #[serde(rename = "hello")]
    Hello {
        #[serde(flatten)]
        payload: Map<String, Value>,
    },

    #[serde(rename = "acl:Accept")]
    Accept { origin: String },

    #[serde(rename = "acl:Reject")]
    Reject { origin: String },

    #[serde(rename = "action:PlayPause")]
    PlayPause,

    #[serde(rename = "action:Stop")]
    Stop,

    #[serde(rename = "action:ListPrev")]
    ListPrev,

    #[serde(rename = "action:ListNext")]
    ListNext,

    #[serde(rename = "action:AudioMute")]
    AudioMute,

    #[serde(rename = "action:Fullscreen")]
    Fullscreen,

    #[serde(rename = "op:PlaylistPlay")]
    PlaylistPlay { index: i64 },

    /// Seek to an absolute position in seconds.
    #[serde(rename = "op:Seek")]
    Seek { position: f64 },

    /// Requested volume in percent; clamped before it reaches the backend.
    #[serde(rename = "op:SetVolume")]
    SetVolume { volume: f64 },
}

impl Inbound {
    /// Wire tag of this message, as found in the `type` field.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Hello { .. } => "hello",
            Self::Accept { .. } => "acl:Accept",
            Self::Reject { .. } => "acl:Reject",
            Self::PlayPause => "action:PlayPause",
            Self::Stop => "action:Stop",
            Self::ListPrev => "action:ListPrev",
            Self::ListNext => "action:ListNext",
            Self::AudioMute => "action:AudioMute",
            Self::Fullscreen => "action:Fullscreen",
            Self::PlaylistPlay { .. } => "op:PlaylistPlay",
            Self::Seek { .. } => "op:Seek",
            Self::SetVolume { .. } => "op:SetVolume",
        }
    }
}

/// Messages the player link sends to peers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Outbound {
    /// Pushed to every freshly opened connection so the widget knows to say hello.
    #[serde(rename = "ready")]
    Ready { sview: bool },

    /// Asks trusted peers to accept or reject a pending origin.
    #[serde(rename = "acl:Request")]
    Request {
        origin: String,
        #[serde(flatten)]
        payload: Map<String, Value>,
    },

    #[serde(rename = "info:Version")]
    Version { version: String },

    #[serde(rename = "info:Online")]
    Online { online: bool },

    #[serde(rename = "info:Playlist")]
    Playlist { titles: Vec<String> },

    #[serde(rename = "info:PlaylistIndex")]
    PlaylistIndex { index: i64 },

    #[serde(rename = "info:Title")]
    Title { title: String },

    #[serde(rename = "info:Volume")]
    Volume { volume: i64 },

    #[serde(rename = "info:Muted")]
    Muted { muted: bool },

    #[serde(rename = "info:Playing")]
    Playing { playing: bool },
}

impl Outbound {
    /// Build an `acl:Request` for `origin` out of the payload its hello carried.
    /// `type` and `origin` keys in the payload are overwritten.
    pub fn request(origin: impl Into<String>, mut payload: Map<String, Value>) -> Self {
        payload.remove("type");
        payload.remove("origin");
        Self::Request {
            origin: origin.into(),
            payload,
        }
    }
}
