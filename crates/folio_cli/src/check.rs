use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use folio_core::config::{SiteConfig, load_site_config};
use folio_core::loader::PostLoader;
use folio_core::model::{ContentBundle, parse_post_date};
use folio_core::normalize::normalize_items;

use crate::source::FsPostSource;

/// File name of the content bundle inside the content directory.
pub const BUNDLE_FILE: &str = "blog.json";

/// Site config file picked up when no --config is given.
pub const CONFIG_FILE: &str = "folio.yaml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindingLevel {
    Warning,
    Error,
}

#[derive(Debug)]
pub struct Finding {
    pub level: FindingLevel,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct CheckReport {
    pub items: usize,
    pub findings: Vec<Finding>,
}

impl CheckReport {
    pub fn error_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|finding| finding.level == FindingLevel::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|finding| finding.level == FindingLevel::Warning)
            .count()
    }

    fn warn(&mut self, message: String) {
        self.findings.push(Finding {
            level: FindingLevel::Warning,
            message,
        });
    }

    fn error(&mut self, message: String) {
        self.findings.push(Finding {
            level: FindingLevel::Error,
            message,
        });
    }
}

/// Validates a content tree the way the running site would consume it:
/// parse the bundle, normalize the item list, then resolve and parse every
/// linked post through the same loader the site uses.
pub fn run_check(content_dir: &Path, config_path: Option<&Path>) -> Result<CheckReport> {
    let config = load_config(content_dir, config_path)?;

    let bundle_path = content_dir.join(BUNDLE_FILE);
    let raw = fs::read_to_string(&bundle_path)
        .with_context(|| format!("failed to read {}", bundle_path.display()))?;
    let bundle: ContentBundle = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", bundle_path.display()))?;

    let items = normalize_items(&bundle.items, &bundle);
    let loader = PostLoader::from_config(&config);
    let source = FsPostSource::new(content_dir);
    let language = config.site.language.as_str();

    let mut report = CheckReport {
        items: items.len(),
        ..CheckReport::default()
    };
    let mut referenced: BTreeSet<String> = BTreeSet::new();

    for item in &items {
        let post_id = match item.resolved_post_id() {
            Some(id) => id.to_string(),
            None => {
                report.warn(format!(
                    "item {} has no post id and renders as a plain card",
                    item.id
                ));
                continue;
            }
        };
        referenced.insert(post_id.clone());

        let post = match loader.load(&source, &post_id) {
            Ok(post) => post,
            Err(err) => {
                report.error(err.to_string());
                continue;
            }
        };

        if post.body_in(language).is_none() {
            report.error(format!(
                "post {post_id} has no content for language '{language}'"
            ));
        }
        if let Some(date) = post.date.as_deref() {
            if parse_post_date(date).is_none() {
                report.warn(format!(
                    "post {post_id} has unparseable date '{date}', it will render without one"
                ));
            }
        }
    }

    scan_orphans(content_dir, &config, &referenced, &mut report);
    Ok(report)
}

fn load_config(content_dir: &Path, config_path: Option<&Path>) -> Result<SiteConfig> {
    if let Some(path) = config_path {
        return load_site_config(path);
    }
    let default_path = content_dir.join(CONFIG_FILE);
    if default_path.is_file() {
        return load_site_config(&default_path);
    }
    Ok(SiteConfig::default())
}

/// Posts on disk that no list item links to are unreachable in the UI.
fn scan_orphans(
    content_dir: &Path,
    config: &SiteConfig,
    referenced: &BTreeSet<String>,
    report: &mut CheckReport,
) {
    let posts_dir = posts_dir_on_disk(content_dir, &config.content.posts_dir);
    if !posts_dir.is_dir() {
        return;
    }
    for entry in WalkDir::new(&posts_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
    {
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        let stem = match path.file_stem().and_then(|stem| stem.to_str()) {
            Some(stem) => stem,
            None => continue,
        };
        if !referenced.contains(stem) {
            report.warn(format!(
                "orphan post file {} is not linked from any item",
                path.display()
            ));
        }
    }
}

fn posts_dir_on_disk(content_dir: &Path, posts_dir: &str) -> PathBuf {
    content_dir.join(posts_dir.trim_start_matches('/'))
}
