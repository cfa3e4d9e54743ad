//! Persisted UI state: sidebar preferences, change notifications, and the
//! key/value stores behind them.

mod error;
mod hub;
mod store;

pub use crate::error::StateError;
pub use crate::hub::{LEGACY_BLOG_ID_KEY, SIDEBAR_STATES_KEY, SidebarSignal, SignalSection, StateHub};
pub use crate::store::{MemoryStateStore, SqliteStateStore, StateStore};
