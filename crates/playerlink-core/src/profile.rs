//! Deployment profiles.

use serde::{Deserialize, Serialize};

/// Which player surface is being mirrored.
///
/// `Full` is the movie player and tracks mute/play state. `Gallery` is the
/// reduced image-viewer deployment: version, online, playlist, file, volume
/// and title only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Full,
    Gallery,
}

impl Profile {
    /// Whether mute and play flags are tracked.
    pub fn tracks_playback(&self) -> bool {
        matches!(self, Self::Full)
    }

    /// Number of fields in the `current?id` record.
    pub fn status_arity(&self) -> usize {
        match self {
            Self::Full => 5,
            Self::Gallery => 3,
        }
    }
}

impl std::str::FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Self::Full),
            "gallery" => Ok(Self::Gallery),
            other => Err(format!("unknown profile '{other}'")),
        }
    }
}
