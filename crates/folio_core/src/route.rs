//! Blog route extraction from the current location
//!
//! Pure and idempotent: the same location string always yields the same
//! decision, so callers may re-run it on every navigation event.

use crate::location::{BLOG_FRAGMENT, BLOG_ID_PARAM, Location, param_value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteQuery {
    pub blog_id: Option<String>,
    pub is_post_view: bool,
    pub is_direct_link: bool,
}

impl RouteQuery {
    fn list() -> Self {
        RouteQuery {
            blog_id: None,
            is_post_view: false,
            is_direct_link: false,
        }
    }
}

/// Decides which view a location encodes.
///
/// Precedence: the GitHub-Pages SPA encoding first (the whole route is folded
/// into the query string by the 404 redirect), then a plain `blogId` query
/// parameter, then the fragment forms `#blog?blogId=X`, `#?blogId=X` and
/// `#blogId=X`. A query value wins over a fragment value when both exist.
pub fn resolve_route(location: &Location) -> RouteQuery {
    if let Some(id) = spa_encoded_blog_id(&location.query) {
        // that URL shape only exists on shared or bookmarked links
        return RouteQuery {
            blog_id: Some(id),
            is_post_view: true,
            is_direct_link: true,
        };
    }

    let query_id = non_empty(location.query_param(BLOG_ID_PARAM));
    let fragment_id = fragment_blog_id(&location.fragment);
    let is_direct_link = query_id.is_some() && location.fragment == BLOG_FRAGMENT;

    match query_id.or(fragment_id) {
        Some(id) => RouteQuery {
            blog_id: Some(id),
            is_post_view: true,
            is_direct_link,
        },
        None => RouteQuery::list(),
    }
}

/// GitHub-Pages static hosting rewrites `/blog?blogId=X` into
/// `/?/blog?blogId=X`, so the real route arrives as a query string that
/// starts with a slash.
fn spa_encoded_blog_id(query: &str) -> Option<String> {
    let rest = query.strip_prefix('/')?;
    let (route, inner_query) = match rest.split_once('?') {
        Some((route, inner)) => (route, inner),
        None => (rest, ""),
    };
    if route.trim_matches('/') != BLOG_FRAGMENT {
        return None;
    }
    non_empty(param_value(inner_query, BLOG_ID_PARAM))
}

fn fragment_blog_id(fragment: &str) -> Option<String> {
    if !fragment.contains("blogId=") {
        return None;
    }
    let inner = match fragment.split_once('?') {
        Some((_, inner)) => inner,
        None => fragment,
    };
    non_empty(param_value(inner, BLOG_ID_PARAM))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|id| !id.trim().is_empty())
}
