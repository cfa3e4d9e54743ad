//! Post loading with static-hosting fallbacks
//!
//! A post lives at `{base_path}{posts_dir}/{id}.json`, where `base_path` is
//! the deployment prefix (empty on root deployments). Static hosts that
//! rewrite SPA routes sometimes serve content under a shifted prefix, so the
//! loader can retry a fixed list of prefix variants against the bare path.
//! First success wins; exhaustion is terminal for that call. Nothing is
//! cached, a revisited id refetches.

use thiserror::Error;

use crate::config::SiteConfig;
use crate::model::Post;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("resource not found")]
    NotFound,
    #[error("fetch failed: {0}")]
    Failed(String),
}

#[derive(Debug, Error)]
#[error("post not found: {id} (tried {})", attempts.join(", "))]
pub struct PostNotFound {
    pub id: String,
    pub attempts: Vec<String>,
}

/// Where post bytes come from: a content directory, an HTTP origin, or a
/// test double.
pub trait PostSource {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError>;
}

#[derive(Debug, Clone)]
pub struct PostLoader {
    base_path: String,
    posts_dir: String,
    fallback_prefixes: Vec<String>,
    static_hosting: bool,
}

impl PostLoader {
    pub fn new(posts_dir: impl Into<String>) -> Self {
        PostLoader {
            base_path: String::new(),
            posts_dir: posts_dir.into(),
            fallback_prefixes: Vec::new(),
            static_hosting: false,
        }
    }

    pub fn from_config(config: &SiteConfig) -> Self {
        PostLoader {
            base_path: config.site.base_path.clone(),
            posts_dir: config.content.posts_dir.clone(),
            fallback_prefixes: config.content.fallback_prefixes.clone(),
            static_hosting: config.content.static_hosting,
        }
    }

    /// Sets the deployment prefix, e.g. "/portfolio" on project pages.
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Enables the static-hosting fallback list.
    pub fn with_fallbacks(mut self, prefixes: Vec<String>) -> Self {
        self.fallback_prefixes = prefixes;
        self.static_hosting = true;
        self
    }

    /// Canonical path of a post resource, deployment prefix included.
    pub fn post_path(&self, id: &str) -> String {
        format!("{}{}", self.base_path.trim_end_matches('/'), self.bare_path(id))
    }

    fn bare_path(&self, id: &str) -> String {
        format!("{}/{id}.json", self.posts_dir.trim_end_matches('/'))
    }

    pub fn load(&self, source: &dyn PostSource, id: &str) -> Result<Post, PostNotFound> {
        if !valid_post_id(id) {
            return Err(PostNotFound {
                id: id.to_string(),
                attempts: Vec::new(),
            });
        }
        let mut attempts = Vec::new();
        for path in self.candidates(id) {
            match source.fetch(&path) {
                // a malformed body counts as a miss, a mirror may still
                // carry the intact copy
                Ok(bytes) => match serde_json::from_slice::<Post>(&bytes) {
                    Ok(post) => return Ok(post),
                    Err(_) => attempts.push(path),
                },
                Err(_) => attempts.push(path),
            }
        }
        Err(PostNotFound {
            id: id.to_string(),
            attempts,
        })
    }

    // fallback prefixes stand in for the deployment prefix, so they apply
    // to the bare path
    fn candidates(&self, id: &str) -> Vec<String> {
        let bare = self.bare_path(id);
        let mut paths = Vec::with_capacity(1 + self.fallback_prefixes.len());
        paths.push(self.post_path(id));
        if self.static_hosting {
            for prefix in &self.fallback_prefixes {
                paths.push(format!("{}{}", prefix.trim_end_matches('/'), bare));
            }
        }
        paths
    }
}

/// Ids feed straight into resource paths, so anything that could escape the
/// posts directory is rejected before the first request.
fn valid_post_id(id: &str) -> bool {
    !id.is_empty() && id != "." && !id.contains(['/', '\\']) && !id.contains("..")
}
