//! playerlink-core: shared types for the player link: the cross-context
//! message protocol, the backend endpoint model, the compact status record
//! and configuration. All other playerlink crates depend on this one.

pub mod command;
pub mod config;
pub mod message;
pub mod profile;
pub mod record;

pub use command::{Command, Query, MAX_VOLUME};
pub use message::{Inbound, Outbound};
pub use profile::Profile;
pub use record::{PlaybackFlags, RecordError, StatusRecord};
