use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use folio_cli::check::{self, FindingLevel};
use folio_cli::serve::{self, ServeOpts};
use folio_core::location::Location;
use folio_core::route::{RouteQuery, resolve_route};

#[derive(Debug, Parser)]
#[command(name = "folio_cli")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Serve a content directory over HTTP.")]
    Serve {
        #[arg(default_value = "content")]
        content_dir: PathBuf,
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 8080)]
        port: u16,
        #[arg(long)]
        no_open: bool,
        #[arg(long, conflicts_with = "no_open")]
        open: bool,
        #[arg(long, default_value = "blog.json")]
        index: String,
    },
    #[command(about = "Validate a content directory: bundle, posts, links.")]
    Check {
        #[arg(default_value = "content")]
        content_dir: PathBuf,
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
    #[command(about = "Show which view a URL resolves to.")]
    Resolve {
        url: String,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Serve {
            content_dir,
            host,
            port,
            no_open,
            open,
            index,
        } => {
            let no_open = if open { false } else { no_open };
            serve::run_serve(ServeOpts {
                content_dir,
                host,
                port,
                no_open,
                index,
            })
        }
        Command::Check {
            content_dir,
            config,
        } => run_check(&content_dir, config.as_deref()),
        Command::Resolve { url, json } => {
            let route = resolve_route(&Location::parse(&url));
            println!("{}", render_route(&route, json));
            Ok(())
        }
    }
}

fn run_check(content_dir: &std::path::Path, config: Option<&std::path::Path>) -> Result<()> {
    let report = check::run_check(content_dir, config)?;
    for finding in &report.findings {
        let label = match finding.level {
            FindingLevel::Warning => "warning",
            FindingLevel::Error => "error",
        };
        eprintln!("{label}: {}", finding.message);
    }
    println!(
        "checked {} items: {} errors, {} warnings",
        report.items,
        report.error_count(),
        report.warning_count()
    );
    if report.error_count() > 0 {
        anyhow::bail!("check failed with {} errors", report.error_count());
    }
    Ok(())
}

fn render_route(route: &RouteQuery, json: bool) -> String {
    if json {
        return serde_json::json!({
            "blogId": route.blog_id,
            "isPostView": route.is_post_view,
            "isDirectLink": route.is_direct_link,
        })
        .to_string();
    }
    match &route.blog_id {
        Some(id) => format!(
            "view: post\nblog_id: {id}\ndirect_link: {}",
            route.is_direct_link
        ),
        None => "view: list".to_string(),
    }
}
