//! Login against a local HTTP server, then resume the session from disk.

use netbound::{Config, FailureKind, ResourceState, bootstrap};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Answer a single request with `body` and close the connection.
async fn serve_once(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
    });

    format!("http://{addr}/api/")
}

/// Read headers and the declared body so closing never resets the client.
async fn read_request(socket: &mut tokio::net::TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf);
        if let Some(end) = text.find("\r\n\r\n") {
            let content_length = text[..end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + content_length {
                return;
            }
        }
    }
}

#[tokio::test]
async fn test_login_then_resume_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let base_url = serve_once(
        "200 OK",
        r#"{"response":"Successfully authenticated.","pk":7,"email":"a@b.com","token":"T0K3N"}"#,
    )
    .await;
    let config = Config::builder()
        .base_url(base_url)
        .data_dir(dir.path())
        .build()
        .unwrap();

    let repository = bootstrap::open_repository(&config, false).unwrap();
    let state = repository.attempt_login("a@b.com", "pw").terminal().await;
    assert_eq!(state.data().and_then(|view| view.account_pk()), Some(7));
    drop(repository);

    let reopened = bootstrap::open_repository(&config, false).unwrap();
    match reopened.check_previous_auth_user().terminal().await {
        ResourceState::Success { data, .. } => {
            let token = data.auth_token.unwrap();
            assert_eq!(token.account_pk, 7);
            assert_eq!(token.token, "T0K3N");
        }
        other => panic!("Expected Success, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_surfaces_remote_message() {
    let dir = tempfile::tempdir().unwrap();
    let base_url = serve_once("400 Bad Request", r#"{"error_message":"Invalid credentials"}"#).await;
    let config = Config::builder()
        .base_url(base_url)
        .data_dir(dir.path())
        .build()
        .unwrap();

    let repository = bootstrap::open_repository(&config, false).unwrap();
    let state = repository.attempt_login("a@b.com", "pw").terminal().await;

    assert_eq!(state.message(), Some("Invalid credentials"));
    assert_eq!(state.failure_kind(), Some(FailureKind::RemoteError));
}
