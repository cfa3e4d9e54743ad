//! Explicit view state machine for the blog section
//!
//! Every external signal (list clicks, back clicks, history traversal,
//! section switches) funnels through [`ViewMachine::handle`], which mutates
//! the machine and returns the effects the host shell must apply: history
//! pushes, post loads and sidebar signals. The machine never touches the
//! outside world itself.

use std::time::{Duration, Instant};

use crate::location::Location;
use crate::model::ViewState;
use crate::route::resolve_route;

pub const BLOG_SECTION: &str = "blog";
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct MachineOptions {
    /// Window after a section change during which URL-driven re-evaluation
    /// (popstate/hashchange) is suppressed.
    pub debounce: Duration,
}

impl Default for MachineOptions {
    fn default() -> Self {
        MachineOptions {
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEvent {
    /// User picked a post from the list.
    Select(String),
    /// User clicked back-to-list inside a post.
    Back,
    /// Browser back/forward landed on this location.
    PopState(Location),
    /// The fragment changed without a history traversal.
    HashChange(Location),
    /// The user moved between top-level sections of the page.
    SectionChange {
        previous: Option<String>,
        current: String,
        location: Location,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Push a history entry so the address bar mirrors the view state.
    PushHistory(Location),
    /// Start fetching a post. The generation must be echoed back through
    /// [`ViewMachine::complete_load`].
    LoadPost { id: String, generation: u64 },
    /// Broadcast to the sidebar collaborator.
    Sidebar { expanded: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Loading,
    Ready,
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// The view moved on while the fetch was in flight; result dropped.
    Stale,
}

#[derive(Debug)]
pub struct ViewMachine {
    state: ViewState,
    phase: LoadPhase,
    generation: u64,
    location: Location,
    inside_blog: bool,
    was_inside_blog: bool,
    first_transition: bool,
    last_section_change: Option<Instant>,
    debounce: Duration,
}

impl ViewMachine {
    pub fn new(options: MachineOptions) -> Self {
        ViewMachine {
            state: ViewState::List,
            phase: LoadPhase::Idle,
            generation: 0,
            location: Location::default(),
            inside_blog: false,
            was_inside_blog: false,
            first_transition: true,
            last_section_change: None,
            debounce: options.debounce,
        }
    }

    /// Resolves the initial state from the current location. The blog area
    /// is visible when this runs, so direct links go straight to the post.
    pub fn mount(&mut self, location: &Location, _now: Instant) -> Vec<Effect> {
        self.location = location.clone();
        self.inside_blog = true;
        self.was_inside_blog = true;
        match resolve_route(location).blog_id {
            Some(id) => self.enter_post(id),
            None => {
                self.state = ViewState::List;
                Vec::new()
            }
        }
    }

    pub fn handle(&mut self, event: NavEvent, now: Instant) -> Vec<Effect> {
        match event {
            NavEvent::Select(id) => self.select(id),
            NavEvent::Back => self.back(),
            NavEvent::PopState(location) | NavEvent::HashChange(location) => {
                self.sync_from_location(location, now)
            }
            NavEvent::SectionChange {
                previous,
                current,
                location,
            } => self.section_change(previous.as_deref(), &current, location, now),
        }
    }

    /// Applies a loader result. Completions from an older generation, or
    /// arriving after the user left the post view, are dropped.
    pub fn complete_load(&mut self, generation: u64, found: bool) -> LoadOutcome {
        if generation != self.generation || !self.state.is_post() {
            return LoadOutcome::Stale;
        }
        self.phase = if found {
            LoadPhase::Ready
        } else {
            LoadPhase::NotFound
        };
        LoadOutcome::Applied
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    fn select(&mut self, id: String) -> Vec<Effect> {
        let next = self.location.with_blog_id(&id);
        self.location = next.clone();
        let mut effects = vec![Effect::PushHistory(next)];
        effects.extend(self.enter_post(id));
        effects
    }

    fn back(&mut self) -> Vec<Effect> {
        self.leave_post();
        let next = self.location.without_blog_id();
        self.location = next.clone();
        vec![
            Effect::PushHistory(next),
            Effect::Sidebar { expanded: true },
        ]
    }

    fn sync_from_location(&mut self, location: Location, now: Instant) -> Vec<Effect> {
        if self.within_debounce(now) {
            // a section switch just reset the view; the URL may still carry
            // the stale id at this instant
            return Vec::new();
        }
        let route = resolve_route(&location);
        self.location = location;
        match route.blog_id {
            Some(id) => {
                if !(self.inside_blog && self.was_inside_blog) {
                    // arriving from outside always lands on the list first
                    self.leave_post();
                    return Vec::new();
                }
                if self.state.selected_id() == Some(id.as_str()) {
                    return Vec::new();
                }
                self.enter_post(id)
            }
            None => {
                if self.state.is_post() {
                    self.leave_post();
                    return vec![Effect::Sidebar { expanded: true }];
                }
                Vec::new()
            }
        }
    }

    fn section_change(
        &mut self,
        previous: Option<&str>,
        current: &str,
        location: Location,
        now: Instant,
    ) -> Vec<Effect> {
        self.was_inside_blog = previous == Some(BLOG_SECTION);
        self.inside_blog = current == BLOG_SECTION;
        self.last_section_change = Some(now);
        self.location = location;
        let first = std::mem::replace(&mut self.first_transition, false);

        let effects = self.apply_section(first);
        // the transition has settled; later URL events see this section as
        // the previous tick
        self.was_inside_blog = self.inside_blog;
        effects
    }

    fn apply_section(&mut self, first: bool) -> Vec<Effect> {
        if !self.inside_blog {
            self.leave_post();
            return Vec::new();
        }

        let route = resolve_route(&self.location);
        if first && route.is_post_view {
            if let Some(id) = route.blog_id {
                if self.state.selected_id() == Some(id.as_str()) {
                    // mount already started this load
                    return Vec::new();
                }
                return self.enter_post(id);
            }
        }

        // returning to the blog tab always shows the list; scrub any stale
        // id so the address bar agrees
        self.leave_post();
        if route.is_post_view {
            let next = self.location.without_blog_id();
            self.location = next.clone();
            return vec![Effect::PushHistory(next)];
        }
        Vec::new()
    }

    fn enter_post(&mut self, id: String) -> Vec<Effect> {
        self.state = ViewState::Post(id.clone());
        self.phase = LoadPhase::Loading;
        self.generation += 1;
        vec![
            Effect::LoadPost {
                id,
                generation: self.generation,
            },
            Effect::Sidebar { expanded: false },
        ]
    }

    fn leave_post(&mut self) {
        if self.state.is_post() {
            // orphan any in-flight fetch
            self.generation += 1;
        }
        self.state = ViewState::List;
        self.phase = LoadPhase::Idle;
    }

    fn within_debounce(&self, now: Instant) -> bool {
        match self.last_section_change {
            Some(at) => now.saturating_duration_since(at) < self.debounce,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> ViewMachine {
        ViewMachine::new(MachineOptions::default())
    }

    fn load_effect(effects: &[Effect]) -> Option<(String, u64)> {
        effects.iter().find_map(|effect| match effect {
            Effect::LoadPost { id, generation } => Some((id.clone(), *generation)),
            _ => None,
        })
    }

    fn pushed(effects: &[Effect]) -> Option<Location> {
        effects.iter().find_map(|effect| match effect {
            Effect::PushHistory(location) => Some(location.clone()),
            _ => None,
        })
    }

    #[test]
    fn mount_without_id_shows_list() {
        let mut m = machine();
        let effects = m.mount(&Location::parse("/#blog"), Instant::now());
        assert!(effects.is_empty());
        assert_eq!(*m.state(), ViewState::List);
    }

    #[test]
    fn mount_with_direct_link_enters_post() {
        let mut m = machine();
        let effects = m.mount(&Location::parse("/?blogId=x#blog"), Instant::now());
        assert_eq!(*m.state(), ViewState::Post("x".to_string()));
        assert_eq!(m.phase(), LoadPhase::Loading);
        assert!(load_effect(&effects).is_some());
    }

    #[test]
    fn select_pushes_id_and_collapses_sidebar() {
        let now = Instant::now();
        let mut m = machine();
        m.mount(&Location::parse("/?lang=en#blog"), now);
        let effects = m.handle(NavEvent::Select("x".to_string()), now);
        let location = pushed(&effects).expect("history push");
        assert_eq!(location.query, "lang=en&blogId=x");
        assert_eq!(location.fragment, "blog");
        assert!(effects.contains(&Effect::Sidebar { expanded: false }));
        assert_eq!(*m.state(), ViewState::Post("x".to_string()));
    }

    #[test]
    fn select_then_back_round_trips_the_query() {
        let now = Instant::now();
        let mut m = machine();
        m.mount(&Location::parse("/?lang=en#blog"), now);
        m.handle(NavEvent::Select("x".to_string()), now);
        let effects = m.handle(NavEvent::Back, now);
        let location = pushed(&effects).expect("history push");
        assert_eq!(location.query, "lang=en");
        assert_eq!(location.fragment, "blog");
        assert_eq!(*m.state(), ViewState::List);
        assert_eq!(m.phase(), LoadPhase::Idle);
    }

    #[test]
    fn popstate_rederives_state_from_location() {
        let now = Instant::now();
        let mut m = machine();
        m.mount(&Location::parse("/#blog"), now);
        let later = now + DEFAULT_DEBOUNCE;

        let effects = m.handle(NavEvent::PopState(Location::parse("/?blogId=x#blog")), later);
        assert_eq!(*m.state(), ViewState::Post("x".to_string()));
        assert!(load_effect(&effects).is_some());

        let effects = m.handle(NavEvent::PopState(Location::parse("/#blog")), later);
        assert_eq!(*m.state(), ViewState::List);
        assert!(effects.contains(&Effect::Sidebar { expanded: true }));
    }

    #[test]
    fn popstate_to_same_id_does_not_refetch() {
        let now = Instant::now();
        let mut m = machine();
        m.mount(&Location::parse("/?blogId=x#blog"), now);
        let effects = m.handle(
            NavEvent::PopState(Location::parse("/?blogId=x#blog")),
            now + DEFAULT_DEBOUNCE,
        );
        assert!(effects.is_empty());
    }

    #[test]
    fn section_reentry_resets_to_list_despite_stale_url() {
        let now = Instant::now();
        let mut m = machine();
        m.mount(&Location::parse("/#blog"), now);
        m.first_transition = false;

        let effects = m.handle(
            NavEvent::SectionChange {
                previous: Some("about".to_string()),
                current: BLOG_SECTION.to_string(),
                location: Location::parse("/?blogId=stale#blog"),
            },
            now,
        );
        assert_eq!(*m.state(), ViewState::List);
        let location = pushed(&effects).expect("stale id scrubbed");
        assert_eq!(location.query_param("blogId"), None);
    }

    #[test]
    fn first_transition_with_direct_link_enters_post() {
        let now = Instant::now();
        let mut m = ViewMachine::new(MachineOptions::default());
        let effects = m.handle(
            NavEvent::SectionChange {
                previous: None,
                current: BLOG_SECTION.to_string(),
                location: Location::parse("/?blogId=x#blog"),
            },
            now,
        );
        assert_eq!(*m.state(), ViewState::Post("x".to_string()));
        assert!(load_effect(&effects).is_some());
    }

    #[test]
    fn popstate_within_debounce_window_is_suppressed() {
        let now = Instant::now();
        let mut m = machine();
        m.mount(&Location::parse("/#blog"), now);
        m.first_transition = false;
        m.handle(
            NavEvent::SectionChange {
                previous: Some("about".to_string()),
                current: BLOG_SECTION.to_string(),
                location: Location::parse("/?blogId=stale#blog"),
            },
            now,
        );

        // the stale query string is still present at the instant of the
        // section switch; it must not flip the view back to the post
        let effects = m.handle(
            NavEvent::PopState(Location::parse("/?blogId=stale#blog")),
            now + Duration::from_millis(100),
        );
        assert!(effects.is_empty());
        assert_eq!(*m.state(), ViewState::List);

        // after the window the same signal is honored again
        let effects = m.handle(
            NavEvent::PopState(Location::parse("/?blogId=stale#blog")),
            now + DEFAULT_DEBOUNCE,
        );
        assert!(load_effect(&effects).is_some());
    }

    #[test]
    fn url_transition_from_outside_lands_on_list() {
        let now = Instant::now();
        let mut m = machine();
        m.mount(&Location::parse("/#blog"), now);
        m.first_transition = false;
        m.handle(
            NavEvent::SectionChange {
                previous: Some(BLOG_SECTION.to_string()),
                current: "about".to_string(),
                location: Location::parse("/#about"),
            },
            now,
        );

        let effects = m.handle(
            NavEvent::PopState(Location::parse("/?blogId=x#blog")),
            now + DEFAULT_DEBOUNCE,
        );
        assert!(effects.is_empty());
        assert_eq!(*m.state(), ViewState::List);
    }

    #[test]
    fn stale_load_completion_is_dropped() {
        let now = Instant::now();
        let mut m = machine();
        let effects = m.mount(&Location::parse("/?blogId=x#blog"), now);
        let (_, generation) = load_effect(&effects).expect("load started");

        m.handle(NavEvent::Back, now);
        assert_eq!(m.complete_load(generation, true), LoadOutcome::Stale);
        assert_eq!(m.phase(), LoadPhase::Idle);
    }

    #[test]
    fn reselect_orphans_the_previous_fetch() {
        let now = Instant::now();
        let mut m = machine();
        m.mount(&Location::parse("/#blog"), now);
        let first = m.handle(NavEvent::Select("a".to_string()), now);
        let (_, first_generation) = load_effect(&first).expect("first load");
        m.handle(NavEvent::Back, now);
        let second = m.handle(NavEvent::Select("b".to_string()), now);
        let (_, second_generation) = load_effect(&second).expect("second load");

        assert_eq!(m.complete_load(first_generation, true), LoadOutcome::Stale);
        assert_eq!(
            m.complete_load(second_generation, true),
            LoadOutcome::Applied
        );
        assert_eq!(m.phase(), LoadPhase::Ready);
    }

    #[test]
    fn failed_load_surfaces_not_found() {
        let now = Instant::now();
        let mut m = machine();
        let effects = m.mount(&Location::parse("/?blogId=gone#blog"), now);
        let (_, generation) = load_effect(&effects).expect("load started");
        assert_eq!(m.complete_load(generation, false), LoadOutcome::Applied);
        assert_eq!(m.phase(), LoadPhase::NotFound);
    }
}
