use folio_core::sidebar::SidebarPrefs;

use crate::error::StateError;
use crate::store::StateStore;

/// Store key holding the serialized section-to-expanded map.
pub const SIDEBAR_STATES_KEY: &str = "section-sidebar-states";

/// Key once used by the removed auto-redirect feature. It is deleted on
/// open and must never be written again.
pub const LEGACY_BLOG_ID_KEY: &str = "current_blog_id";

/// Notification sent to subscribers whenever the sidebar preference for
/// the active section changes or a new section is entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SidebarSignal {
    pub section: SignalSection,
    pub expanded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalSection {
    Entered,
    Changed,
}

/// Owns the persisted sidebar preferences and fans out changes to
/// subscribers.
pub struct StateHub<S: StateStore> {
    store: S,
    prefs: SidebarPrefs,
    subscribers: Vec<Box<dyn FnMut(&str, SidebarSignal)>>,
}

impl<S: StateStore> StateHub<S> {
    pub fn open(mut store: S) -> Result<Self, StateError> {
        store.remove(LEGACY_BLOG_ID_KEY)?;
        let prefs = match store.get(SIDEBAR_STATES_KEY)? {
            Some(raw) => {
                serde_json::from_str(&raw).map_err(|source| StateError::Corrupt {
                    key: SIDEBAR_STATES_KEY.to_string(),
                    source,
                })?
            }
            None => SidebarPrefs::default(),
        };
        Ok(Self {
            store,
            prefs,
            subscribers: Vec::new(),
        })
    }

    pub fn prefs(&self) -> &SidebarPrefs {
        &self.prefs
    }

    pub fn expanded_for(&self, section: &str) -> bool {
        self.prefs.expanded_for(section)
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&str, SidebarSignal) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Re-announces the stored preference when navigation lands on a
    /// section, so late subscribers see the current value.
    pub fn enter_section(&mut self, section: &str) {
        let expanded = self.prefs.expanded_for(section);
        self.notify(
            section,
            SidebarSignal {
                section: SignalSection::Entered,
                expanded,
            },
        );
    }

    pub fn set_section(&mut self, section: &str, expanded: bool) -> Result<(), StateError> {
        self.prefs.set(section, expanded);
        self.persist()?;
        self.notify(
            section,
            SidebarSignal {
                section: SignalSection::Changed,
                expanded,
            },
        );
        Ok(())
    }

    pub fn toggle_section(&mut self, section: &str) -> Result<bool, StateError> {
        let expanded = self.prefs.toggle(section);
        self.persist()?;
        self.notify(
            section,
            SidebarSignal {
                section: SignalSection::Changed,
                expanded,
            },
        );
        Ok(expanded)
    }

    fn persist(&mut self) -> Result<(), StateError> {
        let raw = serde_json::to_string(&self.prefs).map_err(|source| StateError::Encode {
            key: SIDEBAR_STATES_KEY.to_string(),
            source,
        })?;
        self.store.put(SIDEBAR_STATES_KEY, &raw)
    }

    fn notify(&mut self, section: &str, signal: SidebarSignal) {
        for subscriber in &mut self.subscribers {
            subscriber(section, signal);
        }
    }
}
