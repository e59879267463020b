//! The compact `current?id` status record.
//!
//! Format: `playlist_id:file_id:volume` followed, in the full profile, by
//! `:muted:playing` where `1` means set. Trailing fields beyond the profile's
//! arity are ignored.

use crate::profile::Profile;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("status record has {got} fields, expected {expected}")]
    Arity { expected: usize, got: usize },
    #[error("status field `{field}` is not an integer: {value:?}")]
    NotInteger { field: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackFlags {
    pub muted: bool,
    pub playing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusRecord {
    /// Negative when no playlist is loaded.
    pub playlist_id: i64,
    pub file_id: i64,
    pub volume: i64,
    /// Present only in the full profile.
    pub flags: Option<PlaybackFlags>,
}

impl StatusRecord {
    pub fn parse(text: &str, profile: Profile) -> Result<Self, RecordError> {
        let fields: Vec<&str> = text.trim().split(':').collect();
        let expected = profile.status_arity();
        if fields.len() < expected {
            return Err(RecordError::Arity {
                expected,
                got: fields.len(),
            });
        }

        let flags = if profile.tracks_playback() {
            Some(PlaybackFlags {
                muted: fields[3].trim() == "1",
                playing: fields[4].trim() == "1",
            })
        } else {
            None
        };

        Ok(Self {
            playlist_id: integer("playlist_id", fields[0])?,
            file_id: integer("file_id", fields[1])?,
            volume: integer("volume", fields[2])?,
            flags,
        })
    }
}

fn integer(field: &'static str, raw: &str) -> Result<i64, RecordError> {
    raw.trim().parse().map_err(|_| RecordError::NotInteger {
        field,
        value: raw.to_string(),
    })
}
