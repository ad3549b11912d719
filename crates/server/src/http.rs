use std::fs;
use std::io::{self, Cursor, Read};
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tiny_http::{Header, Method, Request, Response, Server};

use crate::store::{AttendanceStore, RecordRequest};

/// Document served for `/`.
const DEFAULT_DOCUMENT: &str = "login.html";

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("could not bind listening socket: {0}")]
    Bind(String),
}

/// The attendance API plus static asset serving, one request at a time.
pub struct AttendanceApi {
    store: AttendanceStore,
    assets_dir: PathBuf,
}

impl AttendanceApi {
    pub fn new(store: AttendanceStore, assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            assets_dir: assets_dir.into(),
        }
    }

    /// Routes and answers one request. Failures to deliver the response
    /// are logged, never propagated, so the accept loop keeps going.
    pub fn handle(&self, mut request: Request) {
        let method = request.method().clone();
        let url = request.url().to_string();
        log::debug!("{method} {url}");

        let path = url.split('?').next().unwrap_or(&url).to_string();
        let outcome = match (method, path.as_str()) {
            (Method::Get, "/api/attendance") => {
                let totals = self.store.totals();
                request.respond(json_response(200, serialize(&totals)))
            }
            (Method::Get, _) if path.starts_with("/api/attendance/") => {
                let class_name = percent_decode(&path["/api/attendance/".len()..]);
                let counts = self.store.class_counts(&class_name);
                request.respond(json_response(200, serialize(&counts)))
            }
            (Method::Post, "/api/attendance") => {
                let response = self.record(&mut request);
                request.respond(response)
            }
            (Method::Get, _) => {
                let response = self.serve_asset(&path);
                request.respond(response)
            }
            _ => request.respond(Response::from_string("").with_status_code(404)),
        };
        if let Err(e) = outcome {
            log::warn!("failed to deliver response for {url}: {e}");
        }
    }

    /// Parses and applies a count upsert. Any malformed body is a 400
    /// and leaves the stored document untouched; an I/O failure during
    /// the rewrite is a 500 (the previous document survives either way).
    fn record(&self, request: &mut Request) -> Response<Cursor<Vec<u8>>> {
        let mut body = String::new();
        if request.as_reader().read_to_string(&mut body).is_err() {
            return json_response(400, "{}".to_string());
        }
        let record: RecordRequest = match serde_json::from_str(&body) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("malformed attendance record: {e}");
                return json_response(400, "{}".to_string());
            }
        };
        match self.store.record(&record) {
            Ok(()) => json_response(200, "{}".to_string()),
            Err(e) => {
                log::error!("attendance write failed: {e}");
                json_response(500, "{}".to_string())
            }
        }
    }

    fn serve_asset(&self, path: &str) -> Response<Cursor<Vec<u8>>> {
        let Some(file_path) = self.resolve_asset(path) else {
            return not_found();
        };
        match fs::read(&file_path) {
            Ok(content) => {
                let mime = content_type_for(&file_path);
                with_content_type(Response::from_data(content), mime)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => not_found(),
            Err(e) => {
                log::error!("failed to read {}: {e}", file_path.display());
                Response::from_string(format!("Internal error reading asset: {e}"))
                    .with_status_code(500)
            }
        }
    }

    /// Maps a URL path onto the assets directory. Anything that is not
    /// a plain relative path (parent components, absolute paths) is
    /// rejected.
    fn resolve_asset(&self, path: &str) -> Option<PathBuf> {
        let trimmed = path.trim_start_matches('/');
        let decoded = if trimmed.is_empty() {
            DEFAULT_DOCUMENT.to_string()
        } else {
            percent_decode(trimmed)
        };
        let relative = Path::new(&decoded);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }
        Some(self.assets_dir.join(relative))
    }
}

/// Binds the listening socket and serves requests forever.
pub fn serve(port: u16, api: &AttendanceApi) -> Result<(), ServeError> {
    let server = Server::http(("0.0.0.0", port)).map_err(|e| ServeError::Bind(e.to_string()))?;
    log::info!("Server running at http://localhost:{port}/");
    serve_on(&server, api);
    Ok(())
}

/// The accept loop, separated so tests can drive an ephemeral-port
/// server.
pub fn serve_on(server: &Server, api: &AttendanceApi) {
    for request in server.incoming_requests() {
        api.handle(request);
    }
}

fn serialize(value: &impl serde::Serialize) -> String {
    // BTreeMaps of strings and integers cannot fail to serialize.
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}

fn json_response(status: u16, body: String) -> Response<Cursor<Vec<u8>>> {
    with_content_type(Response::from_string(body), "application/json").with_status_code(status)
}

fn not_found() -> Response<Cursor<Vec<u8>>> {
    with_content_type(
        Response::from_string("<h1>404 Not Found</h1>"),
        "text/html",
    )
    .with_status_code(404)
}

fn with_content_type(
    response: Response<Cursor<Vec<u8>>>,
    mime: &str,
) -> Response<Cursor<Vec<u8>>> {
    match Header::from_bytes(&b"Content-Type"[..], mime.as_bytes()) {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}

fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("html") => "text/html",
        Some("js") => "text/javascript",
        Some("css") => "text/css",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") => "image/jpg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("wav") => "audio/wav",
        Some("mp4") => "video/mp4",
        Some("woff") => "application/font-woff",
        Some("ttf") => "application/font-ttf",
        Some("eot") => "application/vnd.ms-fontobject",
        Some("otf") => "application/font-otf",
        Some("wasm") => "application/wasm",
        _ => "application/octet-stream",
    }
}

/// Minimal percent-decoding for URL path segments.
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2]));
            if let (Some(hi), Some(lo)) = hex {
                out.push(hi * 16 + lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}
