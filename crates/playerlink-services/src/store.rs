//! State store: canonical player state with change-only emission.
//!
//! Each slot has an emission rule that turns its value into at most one
//! outbound notification. `set` runs the rule only when the value actually
//! changed and broadcasts the result. `resend` runs it unconditionally for
//! one target, which is how a newly trusted peer gets the full snapshot.
//!
//! The store performs no I/O. It returns [`Effect`]s: messages to send and
//! dependent backend fetches to start. Fetch results come back tagged with
//! the generation that requested them, and a result whose generation is no
//! longer current is discarded instead of overwriting newer state.

use playerlink_core::{Outbound, Profile, StatusRecord};
use serde::Serialize;

use crate::send_target::SendTarget;
use crate::slot::{Mode, Slot, SlotName, SlotUpdate};

/// Capability required to mutate backend-derived slots.
///
/// Only [`StateStore::new`] creates one, and the hub hands it to nothing but
/// its poll handling, so the poll path is the single writer of that state.
#[derive(Debug)]
pub struct BackendWriter {
    _private: (),
}

/// Work the store asks its owner to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Send(SendTarget, Outbound),
    /// Fetch `current?title` and report back via [`StateStore::title_fetched`].
    FetchTitle { generation: u64 },
    /// Fetch `playlist` and report back via [`StateStore::playlist_fetched`].
    FetchPlaylist { generation: u64 },
}

/// Read-only view of the store, for the control API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSnapshot {
    pub version: Option<String>,
    pub online: Option<bool>,
    pub volume: Option<i64>,
    pub playing: Option<bool>,
    pub muted: Option<bool>,
    pub playlist_id: Option<i64>,
    pub file_id: Option<i64>,
    pub title: Option<String>,
    pub playlist: Vec<String>,
}

pub struct StateStore {
    profile: Profile,
    version: Slot<String>,
    online: Slot<bool>,
    volume: Slot<i64>,
    playing: Slot<bool>,
    muted: Slot<bool>,
    playlist_id: Slot<i64>,
    file_id: Slot<i64>,
    title: Slot<String>,
    /// Titles last shown to peers. Only refetched when the playlist id changes.
    playlist: Vec<String>,
    title_generation: u64,
    playlist_generation: u64,
}

impl StateStore {
    pub fn new(profile: Profile) -> (Self, BackendWriter) {
        let store = Self {
            profile,
            version: Slot::default(),
            online: Slot::default(),
            volume: Slot::default(),
            playing: Slot::default(),
            muted: Slot::default(),
            playlist_id: Slot::default(),
            file_id: Slot::default(),
            title: Slot::default(),
            playlist: Vec::new(),
            title_generation: 0,
            playlist_generation: 0,
        };
        (store, BackendWriter { _private: () })
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn is_online(&self) -> bool {
        self.online.get().copied().unwrap_or(false)
    }

    /// Set one slot. Emits only if the value changed.
    pub fn set(&mut self, _writer: &BackendWriter, update: SlotUpdate) -> Vec<Effect> {
        let mut fx = Vec::new();
        self.update(update, &mut fx);
        fx
    }

    /// Feed a successful `current?id` poll into the store.
    pub fn apply_status(&mut self, _writer: &BackendWriter, record: &StatusRecord) -> Vec<Effect> {
        let mut fx = Vec::new();
        self.update(SlotUpdate::Online(true), &mut fx);
        self.update(SlotUpdate::PlaylistId(record.playlist_id), &mut fx);
        self.update(SlotUpdate::FileId(record.file_id), &mut fx);
        self.update(SlotUpdate::Volume(record.volume), &mut fx);
        if let Some(flags) = record.flags {
            self.update(SlotUpdate::Muted(flags.muted), &mut fx);
            self.update(SlotUpdate::Playing(flags.playing), &mut fx);
        }
        fx
    }

    /// Backend unreachable: go offline, forget the playlist, blank the title.
    pub fn apply_offline(&mut self, _writer: &BackendWriter) -> Vec<Effect> {
        let mut fx = Vec::new();
        self.update(SlotUpdate::Online(false), &mut fx);
        self.update(SlotUpdate::PlaylistId(-1), &mut fx);
        // A title lookup still in flight must not resurrect the old title.
        self.title_generation += 1;
        self.update(SlotUpdate::Title(String::new()), &mut fx);
        fx
    }

    /// Result of a `current?title` fetch started by a file id change.
    pub fn title_fetched(&mut self, generation: u64, title: String) -> Vec<Effect> {
        let mut fx = Vec::new();
        if generation != self.title_generation {
            tracing::debug!(generation, current = self.title_generation, "stale title discarded");
            return fx;
        }
        self.update(SlotUpdate::Title(title), &mut fx);
        fx
    }

    /// Result of a `playlist` fetch started by a playlist id change.
    ///
    /// A listing with no titles converges the playlist id to the "no
    /// playlist" sentinel. The clear is emitted once, not twice.
    pub fn playlist_fetched(&mut self, generation: u64, body: &str) -> Vec<Effect> {
        let mut fx = Vec::new();
        if generation != self.playlist_generation {
            tracing::debug!(
                generation,
                current = self.playlist_generation,
                "stale playlist discarded"
            );
            return fx;
        }

        let titles: Vec<String> = body
            .split('\n')
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        if !self.playlist.is_empty() || !titles.is_empty() {
            fx.push(Effect::Send(
                SendTarget::Broadcast,
                Outbound::Playlist {
                    titles: titles.clone(),
                },
            ));
        }

        let empty = titles.is_empty();
        self.playlist = titles;
        if empty {
            self.update(SlotUpdate::PlaylistId(-1), &mut fx);
        }
        fx
    }

    /// Replay one slot to `target` regardless of change state.
    pub fn resend(&mut self, slot: SlotName, target: SendTarget) -> Vec<Effect> {
        let mut fx = Vec::new();
        if slot.tracked_by(self.profile) {
            self.emit(slot, Mode::Resend, &target, &mut fx);
        }
        fx
    }

    /// Replay every tracked slot to `target`, in [`SlotName::RESEND_ORDER`].
    pub fn resend_all(&mut self, target: SendTarget) -> Vec<Effect> {
        let mut fx = Vec::new();
        for slot in SlotName::RESEND_ORDER {
            if slot.tracked_by(self.profile) {
                self.emit(slot, Mode::Resend, &target, &mut fx);
            }
        }
        fx
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            version: self.version.get().cloned(),
            online: self.online.get().copied(),
            volume: self.volume.get().copied(),
            playing: self.playing.get().copied(),
            muted: self.muted.get().copied(),
            playlist_id: self.playlist_id.get().copied(),
            file_id: self.file_id.get().copied(),
            title: self.title.get().cloned(),
            playlist: self.playlist.clone(),
        }
    }

    fn update(&mut self, update: SlotUpdate, fx: &mut Vec<Effect>) {
        let slot = update.slot();
        if !slot.tracked_by(self.profile) {
            return;
        }
        let changed = match update {
            SlotUpdate::Version(v) => self.version.set(v),
            SlotUpdate::Online(v) => self.online.set(v),
            SlotUpdate::Volume(v) => self.volume.set(v),
            SlotUpdate::Playing(v) => self.playing.set(v),
            SlotUpdate::Muted(v) => self.muted.set(v),
            SlotUpdate::PlaylistId(v) => self.playlist_id.set(v),
            SlotUpdate::FileId(v) => self.file_id.set(v),
            SlotUpdate::Title(v) => self.title.set(v),
        };
        if changed {
            self.emit(slot, Mode::Fresh, &SendTarget::Broadcast, fx);
        }
    }

    fn emit(&mut self, slot: SlotName, mode: Mode, target: &SendTarget, fx: &mut Vec<Effect>) {
        let message = match slot {
            SlotName::Version => self.version.get().map(|v| Outbound::Version {
                version: v.clone(),
            }),
            SlotName::Online => self.online.get().map(|&v| Outbound::Online { online: v }),
            SlotName::Volume => self.volume.get().map(|&v| Outbound::Volume { volume: v }),
            SlotName::Playing => self.playing.get().map(|&v| Outbound::Playing { playing: v }),
            SlotName::Muted => self.muted.get().map(|&v| Outbound::Muted { muted: v }),
            SlotName::Title => self.title.get().map(|v| Outbound::Title { title: v.clone() }),
            SlotName::PlaylistId => return self.emit_playlist_id(mode, target, fx),
            SlotName::FileId => return self.emit_file_id(mode, target, fx),
        };
        if let Some(message) = message {
            fx.push(Effect::Send(target.clone(), message));
        }
    }

    fn emit_playlist_id(&mut self, mode: Mode, target: &SendTarget, fx: &mut Vec<Effect>) {
        let Some(&id) = self.playlist_id.get() else {
            return;
        };

        if id < 0 {
            if mode == Mode::Fresh {
                self.playlist_generation += 1;
            }
            if !self.playlist.is_empty() {
                fx.push(Effect::Send(
                    target.clone(),
                    Outbound::Playlist { titles: Vec::new() },
                ));
                self.playlist.clear();
            }
            return;
        }

        match mode {
            Mode::Fresh => {
                self.playlist_generation += 1;
                fx.push(Effect::FetchPlaylist {
                    generation: self.playlist_generation,
                });
            }
            Mode::Resend => fx.push(Effect::Send(
                target.clone(),
                Outbound::Playlist {
                    titles: self.playlist.clone(),
                },
            )),
        }
    }

    fn emit_file_id(&mut self, mode: Mode, target: &SendTarget, fx: &mut Vec<Effect>) {
        let Some(&index) = self.file_id.get() else {
            return;
        };
        fx.push(Effect::Send(
            target.clone(),
            Outbound::PlaylistIndex { index },
        ));
        if mode == Mode::Fresh {
            self.title_generation += 1;
            fx.push(Effect::FetchTitle {
                generation: self.title_generation,
            });
        }
    }
}
