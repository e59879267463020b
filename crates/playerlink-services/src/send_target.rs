//! Send targeting: broadcast vs single peer.

/// Target for an outbound state notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SendTarget {
    /// Every trusted peer.
    #[default]
    Broadcast,

    /// One trusted peer, by origin.
    Peer(String),
}

impl SendTarget {
    pub fn peer(origin: impl Into<String>) -> Self {
        Self::Peer(origin.into())
    }
}
