//! Stub of the Aksharamukha public transliteration API.
//!
//! Serves `GET /api/public` with the same query parameters as the real
//! service (`text`, `target`, `source`, `nativize`, `preoptions`,
//! `postoptions`) and a plain-text response. What the stub answers is decided
//! by a pluggable [`Responder`]; every decoded query is recorded so tests can
//! assert on exactly what a client sent. `GET /queries` lists them as JSON and
//! `GET /health` reports liveness with a request count.
//!
//! The [`TestServer`] helper starts a stub on a random port for integration testing.

use akshara_schema::{ScriptCatalog, ScriptRegistry};
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tiny_http::{Header, Method, Response, Server, StatusCode};
use tracing::{debug, info};

pub const API_PATH: &str = "/api/public";

/// One decoded `/api/public` request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TranslitQuery {
    pub text: Option<String>,
    pub target: Option<String>,
    pub source: Option<String>,
    pub nativize: Option<String>,
    pub preoptions: Option<String>,
    pub postoptions: Option<String>,
    /// Every parameter in arrival order, including unknown ones.
    pub params: Vec<(String, String)>,
}

impl TranslitQuery {
    pub fn parse(query: &str) -> Self {
        let mut q = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let slot = match key.as_ref() {
                "text" => Some(&mut q.text),
                "target" => Some(&mut q.target),
                "source" => Some(&mut q.source),
                "nativize" => Some(&mut q.nativize),
                "preoptions" => Some(&mut q.preoptions),
                "postoptions" => Some(&mut q.postoptions),
                _ => None,
            };
            if let Some(slot) = slot {
                *slot = Some(value.clone().into_owned());
            }
            q.params.push((key.into_owned(), value.into_owned()));
        }
        q
    }

    pub fn has_param(&self, name: &str) -> bool {
        self.params.iter().any(|(k, _)| k == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubResponse {
    pub status: u16,
    pub body: String,
}

impl StubResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn error(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

pub type Responder = Arc<dyn Fn(&TranslitQuery) -> StubResponse + Send + Sync>;

/// Request handling state shared by every connection.
pub struct Stub {
    responder: Responder,
    delay: Duration,
    queries: Mutex<Vec<TranslitQuery>>,
}

impl Default for Stub {
    fn default() -> Self {
        Self::with_responder(echo)
    }
}

impl Stub {
    /// A stub that validates scripts against the built-in catalog and echoes `text`.
    pub fn echo() -> Self {
        Self::default()
    }

    pub fn with_responder(
        responder: impl Fn(&TranslitQuery) -> StubResponse + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Arc::new(responder),
            delay: Duration::ZERO,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Answer every query with the same body and HTTP 200.
    pub fn fixed(body: &str) -> Self {
        let body = body.to_owned();
        Self::with_responder(move |_| StubResponse::ok(body.clone()))
    }

    /// Answer every query with the given status.
    pub fn status(status: u16) -> Self {
        Self::with_responder(move |_| StubResponse::error(status, format!("status {status}")))
    }

    /// Sleep before answering each query.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Every query received so far, in arrival order.
    pub fn queries(&self) -> Vec<TranslitQuery> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, query: TranslitQuery) {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query);
    }
}

/// The default responder: mirrors the real service's validation, then echoes.
pub fn echo(query: &TranslitQuery) -> StubResponse {
    let catalog = ScriptCatalog::builtin();
    let Some(text) = query.text.as_deref().filter(|t| !t.is_empty()) else {
        return StubResponse::error(400, "missing text");
    };
    match query.target.as_deref() {
        Some(target) if catalog.is_valid_script(target) => {}
        Some(target) => return StubResponse::error(400, format!("invalid target '{target}'")),
        None => return StubResponse::error(400, "missing target"),
    }
    if let Some(source) = query.source.as_deref() {
        if !catalog.is_valid_script(source) {
            return StubResponse::error(400, format!("invalid source '{source}'"));
        }
    }
    StubResponse::ok(format!("{text}\n"))
}

fn respond_text(req: tiny_http::Request, code: u16, body: &str) {
    let mut response = Response::from_string(body).with_status_code(StatusCode(code));
    if let Ok(header) = Header::from_bytes("Content-Type", "text/plain; charset=utf-8") {
        response = response.with_header(header);
    }
    let _ = req.respond(response);
}

fn respond_json(req: tiny_http::Request, body: &str) {
    let mut response = Response::from_string(body);
    if let Ok(header) = Header::from_bytes("Content-Type", "application/json") {
        response = response.with_header(header);
    }
    let _ = req.respond(response);
}

/// Handle a single HTTP request, dispatching to the appropriate route handler.
pub fn handle_request(stub: &Stub, req: tiny_http::Request) {
    let method = req.method().clone();
    let url = req.url().to_owned();
    debug!("{method} {url}");

    let (path, query) = url.split_once('?').unwrap_or((url.as_str(), ""));
    match (&method, path) {
        (Method::Get, API_PATH) => {
            let parsed = TranslitQuery::parse(query);
            stub.record(parsed.clone());
            if !stub.delay.is_zero() {
                std::thread::sleep(stub.delay);
            }
            let response = (stub.responder)(&parsed);
            respond_text(req, response.status, &response.body);
        }
        (_, API_PATH) => respond_text(req, 405, "method not allowed"),
        (Method::Get, "/health") => {
            let body = serde_json::json!({
                "status": "ok",
                "requests": stub.queries().len(),
            });
            respond_json(req, &body.to_string());
        }
        (Method::Get, "/queries") => {
            let json = serde_json::to_string(&stub.queries()).unwrap_or_else(|_| "[]".to_owned());
            respond_json(req, &json);
        }
        _ => respond_text(req, 404, "not found"),
    }
}

/// Start the server loop, blocking the current thread.
pub fn run_server(
    stub: &Arc<Stub>,
    addr: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let server = Server::http(addr)?;
    info!("listening on {addr}");
    serve(&server, stub);
    Ok(())
}

fn serve(server: &Server, stub: &Arc<Stub>) {
    for request in server.incoming_requests() {
        let stub = Arc::clone(stub);
        std::thread::spawn(move || handle_request(&stub, request));
    }
}

/// A test helper that starts a stub on a random port in a background thread.
///
/// The server listens on `127.0.0.1:{port}`. Drop the `TestServer` to stop it.
pub struct TestServer {
    pub url: String,
    pub endpoint: String,
    pub host: String,
    pub port: u16,
    stub: Arc<Stub>,
    server: Arc<Server>,
    _handle: std::thread::JoinHandle<()>,
}

impl TestServer {
    /// Start a test server. Binds to `127.0.0.1:0` (random port).
    pub fn start(stub: Stub) -> Self {
        let server =
            Arc::new(Server::http("127.0.0.1:0").expect("failed to bind test HTTP server"));
        let port = server.server_addr().to_ip().expect("not an IP addr").port();
        let url = format!("http://127.0.0.1:{port}");

        let stub = Arc::new(stub);
        let srv = Arc::clone(&server);
        let st = Arc::clone(&stub);
        let handle = std::thread::spawn(move || serve(&srv, &st));

        Self {
            endpoint: format!("{url}{API_PATH}"),
            url,
            host: "127.0.0.1".to_owned(),
            port,
            stub,
            server,
            _handle: handle,
        }
    }

    pub fn echo() -> Self {
        Self::start(Stub::echo())
    }

    pub fn queries(&self) -> Vec<TranslitQuery> {
        self.stub.queries()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.server.unblock();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_query() {
        let q = TranslitQuery::parse(
            "text=%E0%A4%A8%E0%A4%AE%E0%A4%B8%E0%A5%8D%E0%A4%A4%E0%A5%87&target=ISO&source=Devanagari&nativize=false&preoptions=a%2Cb",
        );
        assert_eq!(q.text.as_deref(), Some("नमस्ते"));
        assert_eq!(q.target.as_deref(), Some("ISO"));
        assert_eq!(q.source.as_deref(), Some("Devanagari"));
        assert_eq!(q.nativize.as_deref(), Some("false"));
        assert_eq!(q.preoptions.as_deref(), Some("a,b"));
        assert_eq!(q.postoptions, None);
        assert_eq!(q.params.len(), 5);
        assert_eq!(q.params[0].0, "text");
    }

    #[test]
    fn parse_plus_as_space() {
        let q = TranslitQuery::parse("text=a+b&target=ISO");
        assert_eq!(q.text.as_deref(), Some("a b"));
        assert!(!q.has_param("source"));
    }

    #[test]
    fn echo_validates_scripts() {
        let ok = echo(&TranslitQuery::parse("text=x&target=ISO"));
        assert_eq!(ok, StubResponse::ok("x\n"));

        assert_eq!(echo(&TranslitQuery::parse("text=x&target=Nope")).status, 400);
        assert_eq!(
            echo(&TranslitQuery::parse("text=x&target=ISO&source=Nope")).status,
            400
        );
        assert_eq!(echo(&TranslitQuery::parse("target=ISO")).status, 400);
        assert_eq!(echo(&TranslitQuery::parse("text=x")).status, 400);
    }

    #[test]
    fn fixed_and_status_stubs() {
        let q = TranslitQuery::default();
        assert_eq!((Stub::fixed("namaste").responder)(&q).body, "namaste");
        assert_eq!((Stub::status(503).responder)(&q).status, 503);
    }
}
