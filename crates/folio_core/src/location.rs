//! SPA location handling: path, query and fragment in one value

use std::fmt;

pub const BLOG_ID_PARAM: &str = "blogId";
pub const BLOG_FRAGMENT: &str = "blog";

/// The parts of a URL the router cares about. `query` and `fragment` are
/// stored without their `?`/`#` markers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub path: String,
    pub query: String,
    pub fragment: String,
}

impl Location {
    /// Splits a URL (absolute or path-relative) into its parts. Never fails:
    /// anything that is not a query or fragment is the path.
    pub fn parse(url: &str) -> Self {
        let rest = match url.find("://") {
            Some(pos) => {
                let after = &url[pos + 3..];
                match after.find(['/', '?', '#']) {
                    Some(idx) => &after[idx..],
                    None => "",
                }
            }
            None => url,
        };
        let (without_fragment, fragment) = match rest.split_once('#') {
            Some((head, tail)) => (head, tail),
            None => (rest, ""),
        };
        let (path, query) = match without_fragment.split_once('?') {
            Some((head, tail)) => (head, tail),
            None => (without_fragment, ""),
        };
        Location {
            path: path.to_string(),
            query: query.to_string(),
            fragment: fragment.to_string(),
        }
    }

    pub fn query_param(&self, key: &str) -> Option<String> {
        param_value(&self.query, key)
    }

    /// Sets `key` to `value`, replacing the first existing occurrence.
    /// Only the touched pair is re-encoded; other parameters pass through
    /// byte for byte.
    pub fn with_query_param(&self, key: &str, value: &str) -> Location {
        let encoded = format!(
            "{}={}",
            urlencoding::encode(key),
            urlencoding::encode(value)
        );
        let mut replaced = false;
        let mut segments: Vec<String> = Vec::new();
        for segment in raw_segments(&self.query) {
            if !replaced && segment_key(segment) == key {
                segments.push(encoded.clone());
                replaced = true;
            } else {
                segments.push(segment.to_string());
            }
        }
        if !replaced {
            segments.push(encoded);
        }
        Location {
            path: self.path.clone(),
            query: segments.join("&"),
            fragment: self.fragment.clone(),
        }
    }

    pub fn without_query_param(&self, key: &str) -> Location {
        let segments: Vec<&str> = raw_segments(&self.query)
            .filter(|segment| segment_key(segment) != key)
            .collect();
        Location {
            path: self.path.clone(),
            query: segments.join("&"),
            fragment: self.fragment.clone(),
        }
    }

    /// Encodes a selected post: sets the `blogId` parameter and makes sure
    /// the `blog` fragment marker is present.
    pub fn with_blog_id(&self, id: &str) -> Location {
        let mut next = self.with_query_param(BLOG_ID_PARAM, id);
        if next.fragment.is_empty() {
            next.fragment = BLOG_FRAGMENT.to_string();
        }
        next
    }

    /// Drops the selected post, keeping the fragment marker intact.
    pub fn without_blog_id(&self) -> Location {
        self.without_query_param(BLOG_ID_PARAM)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)?;
        if !self.query.is_empty() {
            write!(f, "?{}", self.query)?;
        }
        if !self.fragment.is_empty() {
            write!(f, "#{}", self.fragment)?;
        }
        Ok(())
    }
}

/// Decoded key/value pairs of a query string, in document order.
pub fn query_pairs(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(key), decode(value))
        })
        .collect()
}

/// First value of `key` in a raw query string, decoded.
pub fn param_value(query: &str, key: &str) -> Option<String> {
    query_pairs(query)
        .into_iter()
        .find(|(existing, _)| existing == key)
        .map(|(_, value)| value)
}

fn raw_segments(query: &str) -> impl Iterator<Item = &str> {
    query.split('&').filter(|segment| !segment.is_empty())
}

fn segment_key(segment: &str) -> String {
    let raw = segment.split_once('=').map_or(segment, |(key, _)| key);
    decode(raw)
}

fn decode(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|value| value.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}
