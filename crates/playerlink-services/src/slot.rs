//! Change-tracked state slots.

use playerlink_core::Profile;

/// One independently tracked piece of player state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotName {
    Version,
    Online,
    Volume,
    Playing,
    Muted,
    PlaylistId,
    FileId,
    Title,
}

impl SlotName {
    /// Order in which a newly trusted peer receives the snapshot.
    pub const RESEND_ORDER: [SlotName; 8] = [
        SlotName::Version,
        SlotName::Online,
        SlotName::Volume,
        SlotName::Playing,
        SlotName::Muted,
        SlotName::PlaylistId,
        SlotName::FileId,
        SlotName::Title,
    ];

    /// Whether this slot exists in the given deployment.
    pub fn tracked_by(&self, profile: Profile) -> bool {
        match self {
            SlotName::Playing | SlotName::Muted => profile.tracks_playback(),
            _ => true,
        }
    }
}

/// Why a slot's emission rule runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The value just changed; broadcast and trigger dependent fetches.
    Fresh,
    /// Replay the stored value to a peer without change detection.
    Resend,
}

/// A typed value for one slot.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotUpdate {
    Version(String),
    Online(bool),
    Volume(i64),
    Playing(bool),
    Muted(bool),
    PlaylistId(i64),
    FileId(i64),
    Title(String),
}

impl SlotUpdate {
    pub fn slot(&self) -> SlotName {
        match self {
            Self::Version(_) => SlotName::Version,
            Self::Online(_) => SlotName::Online,
            Self::Volume(_) => SlotName::Volume,
            Self::Playing(_) => SlotName::Playing,
            Self::Muted(_) => SlotName::Muted,
            Self::PlaylistId(_) => SlotName::PlaylistId,
            Self::FileId(_) => SlotName::FileId,
            Self::Title(_) => SlotName::Title,
        }
    }
}

/// Holds a value that is unset until the first `set`.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot<T> {
    value: Option<T>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self { value: None }
    }
}

impl<T: PartialEq> Slot<T> {
    /// Store `value`. Returns true only if it differs from what was stored.
    pub fn set(&mut self, value: T) -> bool {
        if self.value.as_ref() == Some(&value) {
            return false;
        }
        self.value = Some(value);
        true
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }
}
