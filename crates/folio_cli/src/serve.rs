use std::fs::File;
use std::io::Read;
use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Response, Server, StatusCode};

pub struct ServeOpts {
    pub content_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub no_open: bool,
    pub index: String,
}

pub struct ServeHandle {
    pub url: String,
    shutdown: Arc<AtomicBool>,
    join: JoinHandle<Result<()>>,
}

impl ServeHandle {
    pub fn stop(self) -> Result<()> {
        self.shutdown.store(true, Ordering::SeqCst);
        match self.join.join() {
            Ok(result) => result,
            Err(_) => anyhow::bail!("serve thread panicked"),
        }
    }
}

pub fn run_serve(opts: ServeOpts) -> Result<()> {
    let content_dir = resolve_content_dir(opts.content_dir)?;
    validate_content_dir(&content_dir)?;

    let (server, addr) = bind_server(&opts.host, opts.port)?;
    let url = serve_url(&opts.host, addr);

    println!("Serving: {}", content_dir.display());
    println!("URL: {url}");

    if !opts.no_open {
        if let Err(err) = webbrowser::open(&url) {
            eprintln!("warning: failed to open browser: {err}");
        }
    }

    serve_loop(server, content_dir, opts.index, None)
}

pub fn spawn_serve(opts: ServeOpts) -> Result<ServeHandle> {
    let content_dir = resolve_content_dir(opts.content_dir)?;
    validate_content_dir(&content_dir)?;

    let (server, addr) = bind_server(&opts.host, opts.port)?;
    let url = serve_url(&opts.host, addr);
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_thread = shutdown.clone();
    let index = opts.index.clone();
    let join = thread::spawn(move || serve_loop(server, content_dir, index, Some(shutdown_thread)));

    Ok(ServeHandle {
        url,
        shutdown,
        join,
    })
}

fn resolve_content_dir(content_dir: PathBuf) -> Result<PathBuf> {
    if content_dir.is_absolute() {
        return Ok(content_dir);
    }
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    Ok(cwd.join(content_dir))
}

fn validate_content_dir(content_dir: &Path) -> Result<()> {
    if !content_dir.exists() || !content_dir.is_dir() {
        anyhow::bail!(
            "content dir {} does not exist or is not a directory",
            content_dir.display()
        );
    }
    Ok(())
}

fn bind_server(host: &str, port: u16) -> Result<(Server, SocketAddr)> {
    let addr = format!("{host}:{port}");
    let server =
        Server::http(&addr).map_err(|err| anyhow::anyhow!("failed to bind to {addr}: {err}"))?;
    let actual = server
        .server_addr()
        .to_ip()
        .ok_or_else(|| anyhow::anyhow!("failed to resolve socket address"))?;
    Ok((server, actual))
}

fn serve_url(host: &str, addr: SocketAddr) -> String {
    format!("http://{host}:{}/", addr.port())
}

fn serve_loop(
    server: Server,
    content_dir: PathBuf,
    index: String,
    shutdown: Option<Arc<AtomicBool>>,
) -> Result<()> {
    loop {
        if let Some(flag) = &shutdown {
            if flag.load(Ordering::SeqCst) {
                break;
            }
        }

        let request = match server.recv_timeout(Duration::from_millis(200)) {
            Ok(Some(request)) => request,
            Ok(None) => continue,
            Err(err) => return Err(err.into()),
        };

        let response = match handle_request(&request, &content_dir, &index) {
            Ok(response) => response,
            Err(err) => {
                eprintln!("warning: {err}");
                Response::from_string("Internal Server Error")
                    .with_status_code(StatusCode(500))
                    .boxed()
            }
        };

        if let Err(err) = request.respond(response) {
            eprintln!("warning: failed to send response: {err}");
        }
    }
    Ok(())
}

fn handle_request(
    request: &tiny_http::Request,
    content_dir: &Path,
    index: &str,
) -> Result<Response<Box<dyn Read + Send>>> {
    if request.method() != &Method::Get && request.method() != &Method::Head {
        return Ok(Response::from_string("Method Not Allowed")
            .with_status_code(StatusCode(405))
            .boxed());
    }

    let rel_path = match sanitize_path(request.url(), index) {
        Some(path) => path,
        None => {
            return Ok(Response::from_string("Not Found")
                .with_status_code(StatusCode(404))
                .boxed());
        }
    };

    let full_path = content_dir.join(&rel_path);
    if !full_path.exists() || full_path.is_dir() {
        return Ok(Response::from_string("Not Found")
            .with_status_code(StatusCode(404))
            .boxed());
    }

    let mut file =
        File::open(&full_path).with_context(|| format!("failed to open {}", full_path.display()))?;

    if request.method() == &Method::Head {
        let _ = file.read(&mut [0; 0]);
        return Ok(Response::empty(200)
            .with_header(content_type_header(&full_path))
            .boxed());
    }

    let response = Response::from_file(file)
        .with_header(content_type_header(&full_path))
        .boxed();
    Ok(response)
}

fn sanitize_path(url: &str, index: &str) -> Option<PathBuf> {
    let path = url.split('?').next().unwrap_or(url);
    let decoded = urlencoding::decode(path).ok()?;
    if decoded.contains('\\') {
        return None;
    }
    let trimmed = decoded.trim_start_matches('/');
    let effective = if trimmed.is_empty() { index } else { trimmed };
    let rel_path = Path::new(effective);

    let mut clean = PathBuf::new();
    for component in rel_path.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if clean.as_os_str().is_empty() {
        None
    } else {
        Some(clean)
    }
}

fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()).unwrap_or("") {
        "json" => "application/json; charset=utf-8",
        "html" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" => "text/javascript; charset=utf-8",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "txt" => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

fn content_type_header(path: &Path) -> Header {
    Header::from_bytes("Content-Type", content_type_for(path)).expect("valid header")
}
