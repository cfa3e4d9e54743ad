pub mod config;
pub mod loader;
pub mod location;
pub mod machine;
pub mod model;
pub mod normalize;
pub mod route;
pub mod sidebar;
pub mod toc;

pub use crate::loader::{FetchError, PostLoader, PostNotFound, PostSource};
pub use crate::location::Location;
pub use crate::machine::{Effect, MachineOptions, NavEvent, ViewMachine};
pub use crate::model::{ContentBundle, ContentItem, Post, ViewState};
pub use crate::route::{RouteQuery, resolve_route};
