//! Backend action API endpoints.
//!
//! The backend is pull-only: plain-text GET endpoints relative to its base
//! URL. Queries return state, commands are fire-and-forget.

/// Upper bound accepted by the backend volume endpoint. Values above 100
/// are the amplified range.
pub const MAX_VOLUME: i64 = 120;

/// Read-only endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    Version,
    /// Compact colon-delimited status record.
    CurrentId,
    CurrentTitle,
    /// Newline-delimited titles of the current playlist.
    Playlist,
}

impl Query {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Version => "version",
            Self::CurrentId => "current?id",
            Self::CurrentTitle => "current?title",
            Self::Playlist => "playlist",
        }
    }
}

/// State-mutating endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    PlayPause,
    Stop,
    Prev,
    Next,
    Mute,
    Fullscreen,
    Item(i64),
    Seek(f64),
    Volume(i64),
}

impl Command {
    /// Volume command with the requested percentage clamped to `0..=MAX_VOLUME`.
    pub fn volume(requested: f64) -> Self {
        let clamped = requested.clamp(0.0, MAX_VOLUME as f64).round() as i64;
        Self::Volume(clamped)
    }

    pub fn path(&self) -> String {
        match self {
            Self::PlayPause => "play_pause".to_string(),
            Self::Stop => "stop".to_string(),
            Self::Prev => "prev".to_string(),
            Self::Next => "next".to_string(),
            Self::Mute => "mute".to_string(),
            Self::Fullscreen => "fullscr_win".to_string(),
            Self::Item(index) => format!("item?{index}"),
            Self::Seek(seconds) => format!("seek?{seconds:.2}"),
            Self::Volume(volume) => format!("vol?{volume}"),
        }
    }
}
