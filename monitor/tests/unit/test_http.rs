//! HTTP client tests against a local one-shot server

use std::net::SocketAddr;

use deploywatch::errors::FetchError;
use deploywatch::http::client::HttpClient;
use deploywatch::http::deployments::DeploymentSource;
use deploywatch::models::deployment::DeploymentState;
use secrecy::SecretString;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve a single canned response and hand back the request line
async fn serve_once(status: &str, body: &str) -> (SocketAddr, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        String::from_utf8_lossy(&request).into_owned()
    });

    (addr, handle)
}

fn client(addr: SocketAddr) -> HttpClient {
    HttpClient::new(
        &format!("http://{}", addr),
        SecretString::from("secret-token".to_string()),
        None,
    )
    .unwrap()
}

#[tokio::test]
async fn test_fetch_snapshot_success_passes_unknown_state_through() {
    let body = r#"{"deployments":[
        {"uid":"dpl_1","state":"WEIRD","url":"a.vercel.app","created":1700000000000},
        {"uid":"dpl_2","state":"READY"}
    ]}"#;
    let (addr, server) = serve_once("200 OK", body).await;

    let snapshot = client(addr).fetch_snapshot("prj_1", 2).await.unwrap();
    let request = server.await.unwrap();

    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[0].state, DeploymentState::Unknown("WEIRD".to_string()));
    assert_eq!(snapshot[1].state, DeploymentState::Ready);
    assert!(request.starts_with("GET /v6/deployments?projectId=prj_1&limit=2 "));
    assert!(request
        .to_lowercase()
        .contains("authorization: bearer secret-token"));
}

#[tokio::test]
async fn test_error_status_is_remote_rejected_with_body() {
    let (addr, server) = serve_once("403 Forbidden", "forbidden").await;

    let result = client(addr).fetch_snapshot("prj_1", 5).await;
    server.await.unwrap();

    assert_eq!(
        result,
        Err(FetchError::RemoteRejected {
            status: 403,
            body: "forbidden".to_string(),
        })
    );
}

#[tokio::test]
async fn test_malformed_body_is_malformed_or_local() {
    let (addr, server) = serve_once("200 OK", "badjson").await;

    let result = client(addr).fetch_snapshot("prj_1", 5).await;
    server.await.unwrap();

    assert!(matches!(result, Err(FetchError::MalformedOrLocal { .. })));
}

#[tokio::test]
async fn test_refused_connection_is_unreachable() {
    // Grab a free port, then close it so nothing is listening
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let result = client(addr).fetch_snapshot("prj_1", 5).await;

    assert!(matches!(result, Err(FetchError::Unreachable(_))));
}
