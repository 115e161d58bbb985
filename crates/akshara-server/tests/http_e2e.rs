//! HTTP round trips against an in-process stub on a random port.

use akshara_server::{Stub, StubResponse, TestServer};
use std::time::{Duration, Instant};

fn agent() -> ureq::Agent {
    ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .into()
}

#[test]
fn echo_roundtrip_records_query() {
    let server = TestServer::echo();
    let mut resp = agent()
        .get(&server.endpoint)
        .query("text", "नमस्ते")
        .query("target", "ISO")
        .query("source", "Devanagari")
        .call()
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.body_mut().read_to_string().unwrap(), "नमस्ते\n");

    let queries = server.queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].text.as_deref(), Some("नमस्ते"));
    assert_eq!(queries[0].source.as_deref(), Some("Devanagari"));
    assert!(!queries[0].has_param("nativize"));
}

#[test]
fn invalid_target_is_bad_request() {
    let server = TestServer::echo();
    let resp = agent()
        .get(&server.endpoint)
        .query("text", "x")
        .query("target", "Klingon")
        .call()
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[test]
fn custom_responder_sees_options() {
    let server = TestServer::start(Stub::with_responder(|q| {
        StubResponse::ok(format!(
            "{}|{}",
            q.preoptions.as_deref().unwrap_or("-"),
            q.postoptions.as_deref().unwrap_or("-")
        ))
    }));
    let mut resp = agent()
        .get(&server.endpoint)
        .query("text", "x")
        .query("target", "ISO")
        .query("postoptions", "A,B")
        .call()
        .unwrap();
    assert_eq!(resp.body_mut().read_to_string().unwrap(), "-|A,B");
}

#[test]
fn health_and_unknown_routes() {
    let server = TestServer::echo();
    let mut resp = agent().get(&format!("{}/health", server.url)).call().unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: serde_json::Value =
        serde_json::from_str(&resp.body_mut().read_to_string().unwrap()).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["requests"], 0);
    let resp = agent().get(&format!("{}/nope", server.url)).call().unwrap();
    assert_eq!(resp.status().as_u16(), 404);
    assert!(server.queries().is_empty());
}

#[test]
fn delayed_requests_are_served_concurrently() {
    let server = TestServer::start(Stub::fixed("ok").with_delay(Duration::from_millis(200)));
    let start = Instant::now();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let endpoint = server.endpoint.clone();
            std::thread::spawn(move || {
                agent()
                    .get(&endpoint)
                    .query("text", "x")
                    .query("target", "ISO")
                    .call()
                    .unwrap()
                    .status()
                    .as_u16()
            })
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), 200);
    }
    assert!(start.elapsed() < Duration::from_millis(750));
    assert_eq!(server.queries().len(), 4);
}

#[test]
fn recorded_queries_listed_as_json() {
    let server = TestServer::echo();
    agent()
        .get(&server.endpoint)
        .query("text", "namaste")
        .query("target", "ISO")
        .call()
        .unwrap();

    let mut resp = agent().get(&format!("{}/queries", server.url)).call().unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: serde_json::Value =
        serde_json::from_str(&resp.body_mut().read_to_string().unwrap()).unwrap();
    let queries = body.as_array().unwrap();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0]["text"], "namaste");
    assert_eq!(queries[0]["target"], "ISO");
    assert!(queries[0]["source"].is_null());
}
