use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

pub const DEFAULT_POSTS_DIR: &str = "/data/blog-posts";
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub site: SiteMeta,
    pub content: ContentConfig,
    pub nav: NavConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteMeta {
    pub title: String,
    /// Deployment prefix, e.g. "/portfolio" on project pages. Empty for
    /// root deployments.
    pub base_path: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentConfig {
    pub posts_dir: String,
    pub fallback_prefixes: Vec<String>,
    pub static_hosting: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavConfig {
    pub debounce_ms: u64,
    pub sections: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            site: SiteMeta {
                title: "folio".to_string(),
                base_path: String::new(),
                language: "en".to_string(),
            },
            content: ContentConfig {
                posts_dir: DEFAULT_POSTS_DIR.to_string(),
                fallback_prefixes: Vec::new(),
                static_hosting: false,
            },
            nav: NavConfig {
                debounce_ms: DEFAULT_DEBOUNCE_MS,
                sections: default_sections(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct SiteConfigRaw {
    site: SiteMetaRaw,
    content: Option<ContentConfigRaw>,
    nav: Option<NavConfigRaw>,
}

#[derive(Debug, Deserialize)]
struct SiteMetaRaw {
    title: Option<String>,
    base_path: Option<String>,
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentConfigRaw {
    posts_dir: Option<String>,
    fallback_prefixes: Option<Vec<String>>,
    static_hosting: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct NavConfigRaw {
    debounce_ms: Option<u64>,
    sections: Option<Vec<String>>,
}

pub fn load_site_config(path: &Path) -> Result<SiteConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let parsed: SiteConfigRaw = serde_yaml::from_str(&raw)
        .with_context(|| format!("failed to parse YAML config {}", path.display()))?;

    let site = SiteMeta {
        title: required_string(parsed.site.title, "site.title")?,
        base_path: absolute_or_empty(parsed.site.base_path, "site.base_path")?,
        language: non_empty_or_default(parsed.site.language, "en", "site.language")?,
    };

    let content = match parsed.content {
        None => SiteConfig::default().content,
        Some(content_raw) => {
            let posts_dir = non_empty_or_default(
                content_raw.posts_dir,
                DEFAULT_POSTS_DIR,
                "content.posts_dir",
            )?;
            if !posts_dir.starts_with('/') {
                bail!("content.posts_dir must start with '/'");
            }
            let fallback_prefixes = content_raw.fallback_prefixes.unwrap_or_default();
            for (idx, prefix) in fallback_prefixes.iter().enumerate() {
                if prefix.trim().is_empty() {
                    bail!("content.fallback_prefixes[{idx}] must not be empty");
                }
            }
            ContentConfig {
                posts_dir,
                fallback_prefixes,
                static_hosting: content_raw.static_hosting.unwrap_or(false),
            }
        }
    };

    let nav = match parsed.nav {
        None => SiteConfig::default().nav,
        Some(nav_raw) => {
            let sections = match nav_raw.sections {
                None => default_sections(),
                Some(sections) => {
                    for (idx, section) in sections.iter().enumerate() {
                        if section.trim().is_empty() {
                            bail!("nav.sections[{idx}] must not be empty");
                        }
                    }
                    if !sections.iter().any(|section| section == "blog") {
                        bail!("nav.sections must include 'blog'");
                    }
                    sections
                }
            };
            NavConfig {
                debounce_ms: nav_raw.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS),
                sections,
            }
        }
    };

    Ok(SiteConfig { site, content, nav })
}

fn default_sections() -> Vec<String> {
    vec![
        "about".to_string(),
        "blog".to_string(),
        "contact".to_string(),
    ]
}

fn required_string(value: Option<String>, field: &str) -> Result<String> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => bail!("missing required field: {}", field),
    }
}

fn non_empty_or_default(value: Option<String>, default: &str, field: &str) -> Result<String> {
    match value {
        Some(text) => {
            if text.trim().is_empty() {
                bail!("{field} must not be empty");
            }
            Ok(text)
        }
        None => Ok(default.to_string()),
    }
}

fn absolute_or_empty(value: Option<String>, field: &str) -> Result<String> {
    match value {
        None => Ok(String::new()),
        Some(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(String::new());
            }
            if !trimmed.starts_with('/') {
                bail!("{field} must start with '/'");
            }
            Ok(trimmed.trim_end_matches('/').to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::load_site_config;
    use std::fs;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn write_temp(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("folio-config-{}.yaml", Uuid::new_v4()));
        fs::write(&path, contents).expect("write temp config");
        path
    }

    #[test]
    fn valid_minimal_config_parses() {
        let path = write_temp("site:\n  title: \"Demo\"\n");
        let config = load_site_config(&path).expect("config should load");
        assert_eq!(config.site.title, "Demo");
        assert_eq!(config.site.language, "en");
        assert_eq!(config.site.base_path, "");
    }

    #[test]
    fn content_defaults_apply_when_missing() {
        let path = write_temp("site:\n  title: \"Demo\"\n");
        let config = load_site_config(&path).expect("config should load");
        assert_eq!(config.content.posts_dir, "/data/blog-posts");
        assert!(config.content.fallback_prefixes.is_empty());
        assert!(!config.content.static_hosting);
    }

    #[test]
    fn nav_defaults_apply_when_missing() {
        let path = write_temp("site:\n  title: \"Demo\"\n");
        let config = load_site_config(&path).expect("config should load");
        assert_eq!(config.nav.debounce_ms, 500);
        assert_eq!(config.nav.sections, vec!["about", "blog", "contact"]);
    }

    #[test]
    fn missing_title_fails() {
        let path = write_temp("site:\n  language: \"en\"\n");
        let err = load_site_config(&path).expect_err("expected error");
        assert!(err.to_string().contains("site.title"));
    }

    #[test]
    fn base_path_must_be_absolute() {
        let path = write_temp("site:\n  title: \"Demo\"\n  base_path: \"portfolio\"\n");
        let err = load_site_config(&path).expect_err("expected error");
        assert!(err.to_string().contains("site.base_path"));
    }

    #[test]
    fn base_path_trailing_slash_is_trimmed() {
        let path = write_temp("site:\n  title: \"Demo\"\n  base_path: \"/portfolio/\"\n");
        let config = load_site_config(&path).expect("config should load");
        assert_eq!(config.site.base_path, "/portfolio");
    }

    #[test]
    fn posts_dir_must_be_absolute() {
        let path = write_temp(
            "site:\n  title: \"Demo\"\ncontent:\n  posts_dir: \"data/blog-posts\"\n",
        );
        let err = load_site_config(&path).expect_err("expected error");
        assert!(err.to_string().contains("content.posts_dir"));
    }

    #[test]
    fn empty_fallback_prefix_fails() {
        let path = write_temp(
            "site:\n  title: \"Demo\"\ncontent:\n  fallback_prefixes:\n    - \"/mirror\"\n    - \"\"\n",
        );
        let err = load_site_config(&path).expect_err("expected error");
        assert!(err.to_string().contains("content.fallback_prefixes[1]"));
    }

    #[test]
    fn sections_must_include_blog() {
        let path = write_temp(
            "site:\n  title: \"Demo\"\nnav:\n  sections:\n    - \"about\"\n    - \"contact\"\n",
        );
        let err = load_site_config(&path).expect_err("expected error");
        assert!(err.to_string().contains("nav.sections must include 'blog'"));
    }

    #[test]
    fn debounce_is_configurable() {
        let path = write_temp("site:\n  title: \"Demo\"\nnav:\n  debounce_ms: 50\n");
        let config = load_site_config(&path).expect("config should load");
        assert_eq!(config.nav.debounce_ms, 50);
    }

    #[test]
    fn static_hosting_round_trips() {
        let path = write_temp(
            "site:\n  title: \"Demo\"\ncontent:\n  static_hosting: true\n  fallback_prefixes:\n    - \"/portfolio\"\n",
        );
        let config = load_site_config(&path).expect("config should load");
        assert!(config.content.static_hosting);
        assert_eq!(config.content.fallback_prefixes, vec!["/portfolio"]);
    }
}
