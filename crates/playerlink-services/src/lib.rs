//! playerlink-services: the state synchronization core: peer handshake
//! registry, change-only state store, backend poll scheduler and the hub
//! task that serializes every protocol event.

pub mod backend;
pub mod dispatch;
pub mod endpoint;
pub mod hub;
pub mod poll;
pub mod registry;
pub mod send_target;
pub mod slot;
pub mod store;

pub use backend::{probe_version, Backend, BackendError, HttpBackend};
pub use endpoint::{ChannelEndpoint, Endpoint, LocalEndpoint};
pub use hub::{Hub, HubHandle, HubSnapshot};
pub use poll::{PollScheduler, PollTick};
pub use registry::{HelloOutcome, Peer, PeerRegistry, PeerState};
pub use send_target::SendTarget;
pub use slot::{Mode, Slot, SlotName, SlotUpdate};
pub use store::{BackendWriter, Effect, StateSnapshot, StateStore};
