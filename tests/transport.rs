use std::{
    collections::HashMap,
    io::{Read, Write},
    net::{TcpListener, TcpStream},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use http_transport::{
    blocking, transport::reqwest::blocking::TransportReqwest as BlockingTransportReqwest,
    Transport, TransportBody, TransportConfigurationBuilder, TransportError, TransportReqwest,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    format!("http://127.0.0.1:{port}/ping")
}

/// Plain HTTP/1.1 server which counts accepted and closed connections.
///
/// `/quotes` answers with a chunked body which never ends, anything else with
/// `pong`.
struct CountingServer {
    uri: String,
    accepted: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl CountingServer {
    fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let uri = format!("http://{}", listener.local_addr().unwrap());
        let accepted = Arc::new(AtomicUsize::new(0));
        let closed = Arc::new(AtomicUsize::new(0));

        let (accepted_counter, closed_counter) = (accepted.clone(), closed.clone());
        thread::spawn(move || {
            for socket in listener.incoming() {
                let Ok(socket) = socket else { break };
                accepted_counter.fetch_add(1, Ordering::SeqCst);

                let closed = closed_counter.clone();
                thread::spawn(move || {
                    serve_connection(socket);
                    closed.fetch_add(1, Ordering::SeqCst);
                });
            }
        });

        Self {
            uri,
            accepted,
            closed,
        }
    }

    fn counts(&self) -> (usize, usize) {
        (
            self.accepted.load(Ordering::SeqCst),
            self.closed.load(Ordering::SeqCst),
        )
    }
}

/// Answer requests until the client closes the connection.
fn serve_connection(mut socket: TcpStream) {
    while let Some(head) = read_head(&mut socket) {
        if head.starts_with("GET /quotes") {
            let opened = socket
                .write_all(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\ntick\n\r\n");
            if opened.is_ok() {
                let mut rest = Vec::new();
                let _ = socket.read_to_end(&mut rest);
            }
            return;
        }

        if socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 4\r\n\r\npong")
            .is_err()
        {
            return;
        }
    }
}

fn read_head(socket: &mut TcpStream) -> Option<String> {
    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        match socket.read(&mut byte) {
            Ok(1) => head.push(byte[0]),
            _ => return None,
        }
    }

    Some(String::from_utf8_lossy(&head).into_owned())
}

const RELEASE_WAIT: Duration = Duration::from_secs(5);

async fn wait_for_release(server: &CountingServer, expected: usize) {
    let started = Instant::now();
    while server.counts() != (expected, expected) && started.elapsed() < RELEASE_WAIT {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert_eq!(server.counts(), (expected, expected));
}

fn wait_for_release_blocking(server: &CountingServer, expected: usize) {
    let started = Instant::now();
    while server.counts() != (expected, expected) && started.elapsed() < RELEASE_WAIT {
        thread::sleep(Duration::from_millis(20));
    }

    assert_eq!(server.counts(), (expected, expected));
}

#[tokio::test]
async fn close_connection_after_every_call() {
    init_logger();
    let server = CountingServer::start();
    let transport = TransportReqwest::new().unwrap();

    for call in 1..=5 {
        let response = transport
            .get(&format!("{}/ping", server.uri), None, None, None)
            .await
            .unwrap();
        assert_eq!(response.body, Some(b"pong".to_vec()));

        wait_for_release(&server, call).await;
    }

    transport
        .delete(&format!("{}/items/5", server.uri), None, None)
        .await
        .unwrap();
    wait_for_release(&server, 6).await;
}

#[tokio::test]
async fn close_stream_connection_on_every_exit() {
    init_logger();
    let server = CountingServer::start();
    let transport = TransportReqwest::new().unwrap();
    let url = format!("{}/quotes", server.uri);

    let mut stream = transport.stream(&url, None, None, None).await.unwrap();
    assert_eq!(stream.chunk().await.unwrap().unwrap().as_ref(), b"tick\n");
    assert_eq!(server.counts(), (1, 0));
    drop(stream);
    wait_for_release(&server, 1).await;

    let failed: Result<(), TransportError> = async {
        let mut stream = transport.stream(&url, None, None, None).await?;
        stream.chunk().await?;

        Err(TransportError::InvalidHeader {
            details: "failure inside stream scope".into(),
        })
    }
    .await;
    assert!(failed.is_err());
    wait_for_release(&server, 2).await;
}

#[test]
fn blocking_transport_closes_every_connection() {
    use blocking::Transport;

    init_logger();
    let server = CountingServer::start();
    let transport = BlockingTransportReqwest::new().unwrap();

    for call in 1..=3 {
        transport
            .get(&format!("{}/ping", server.uri), None, None, None)
            .unwrap();
        wait_for_release_blocking(&server, call);
    }

    let url = format!("{}/quotes", server.uri);
    let mut stream = transport.stream(&url, None, None, None).unwrap();
    let mut tick = [0u8; 5];
    stream.read_exact(&mut tick).unwrap();
    assert_eq!(&tick, b"tick\n");
    drop(stream);
    wait_for_release_blocking(&server, 4);

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _stream = transport.stream(&url, None, None, None).unwrap();
        panic!("failure inside stream scope");
    }));
    assert!(result.is_err());
    wait_for_release_blocking(&server, 5);
}

#[tokio::test]
async fn complete_sequential_calls_with_per_call_clients() {
    init_logger();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
        .expect(25)
        .mount(&server)
        .await;

    let transport = TransportReqwest::new().unwrap();
    let url = format!("{}/ping", server.uri());
    for _ in 0..25 {
        let response = transport.get(&url, None, None, None).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, Some(b"pong".to_vec()));
    }
}

#[tokio::test]
async fn return_underlying_error_on_connection_failure() {
    init_logger();
    let transport = TransportReqwest::new().unwrap();

    let error = transport
        .delete(&closed_port_url(), None, None)
        .await
        .unwrap_err();

    let TransportError::Transport { source } = &error else {
        panic!("unexpected error: {error:?}");
    };
    assert!(source.downcast_ref::<reqwest::Error>().unwrap().is_connect());

    // Transport stays usable after a failed call.
    assert!(transport
        .post(&closed_port_url(), None, None, None)
        .await
        .is_err());
}

#[tokio::test]
async fn send_configured_user_agent() {
    init_logger();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("user-agent", "quotes-app/2.1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let configuration = TransportConfigurationBuilder::default()
        .with_user_agent("quotes-app/2.1")
        .build()
        .unwrap();
    let transport = TransportReqwest::with_configuration(configuration).unwrap();
    let url = format!("{}/ping", server.uri());

    transport.get(&url, None, None, None).await.unwrap();
    let mut stream = transport.stream(&url, None, None, None).await.unwrap();
    while stream.chunk().await.unwrap().is_some() {}
}

#[tokio::test]
async fn reopen_stream_after_failing_scope() {
    init_logger();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/quotes"))
        .respond_with(ResponseTemplate::new(200).set_body_string("tick"))
        .expect(2)
        .mount(&server)
        .await;

    let transport = TransportReqwest::new().unwrap();
    let url = format!("{}/quotes", server.uri());

    let failed: Result<(), TransportError> = async {
        let stream = transport.stream(&url, None, None, None).await?;
        assert_eq!(stream.status(), 200);

        Err(TransportError::InvalidHeader {
            details: "failure inside stream scope".into(),
        })
    }
    .await;
    assert!(failed.is_err());

    let mut stream = transport.stream(&url, None, None, None).await.unwrap();
    assert_eq!(stream.chunk().await.unwrap().unwrap().as_ref(), b"tick");
    assert_eq!(stream.chunk().await.unwrap(), None);
}

#[tokio::test]
async fn blocking_transport_handles_every_method() {
    init_logger();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/items"))
        .and(body_json(serde_json::json!({"name": "a"})))
        .respond_with(ResponseTemplate::new(201).set_body_string("created"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/items/5"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/quotes"))
        .respond_with(ResponseTemplate::new(200).set_body_string("tick"))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    tokio::task::spawn_blocking(move || {
        use blocking::Transport;

        let transport = BlockingTransportReqwest::new().unwrap();

        let body = TransportBody::json(HashMap::from([("name", "a")])).unwrap();
        let created = transport
            .post(&format!("{uri}/items"), None, None, Some(body))
            .unwrap();
        assert_eq!(created.status, 201);
        assert_eq!(created.body, Some(b"created".to_vec()));

        let deleted = transport
            .delete(&format!("{uri}/items/5"), None, None)
            .unwrap();
        assert_eq!(deleted.status, 204);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _stream = transport
                .stream(&format!("{uri}/quotes"), None, None, None)
                .unwrap();
            panic!("failure inside stream scope");
        }));
        assert!(result.is_err());

        let error = transport.get(&closed_port_url(), None, None, None).unwrap_err();
        assert!(matches!(error, TransportError::Transport { .. }));
    })
    .await
    .unwrap();

    let requests = server.received_requests().await.unwrap();
    let delete = requests.iter().find(|r| r.url.path() == "/items/5").unwrap();
    assert!(delete.body.is_empty());
}

#[tokio::test]
async fn blocking_stream_reads_whole_body() {
    init_logger();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/quotes"))
        .respond_with(ResponseTemplate::new(200).set_body_string("first\nsecond\n"))
        .mount(&server)
        .await;

    let url = format!("{}/quotes", server.uri());
    tokio::task::spawn_blocking(move || {
        use blocking::Transport;

        let transport = BlockingTransportReqwest::new().unwrap();
        let mut stream = transport.stream(&url, None, None, None).unwrap();
        let mut body = String::new();
        stream.read_to_string(&mut body).unwrap();

        assert_eq!(body, "first\nsecond\n");
    })
    .await
    .unwrap();
}
