#![allow(dead_code)]

use std::convert::Infallible;
use std::io::{self, Write};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;
use tokio_rustls::rustls::{crypto, ServerConfig};
use tokio_rustls::TlsAcceptor;
use tracing::Level;

use dev_route_forwarder::proxy::{ClientOptions, UpstreamClients};

/// 받은 요청(메서드, URI, 헤더, 바디)을 JSON으로 돌려주는 백엔드를 띄웁니다.
pub async fn spawn_echo_backend() -> SocketAddr {
    spawn_backend(None).await
}

/// 응답 전에 `delay`만큼 기다리는 백엔드
pub async fn spawn_slow_backend(delay: Duration) -> SocketAddr {
    spawn_backend(Some(delay)).await
}

async fn spawn_backend(delay: Option<Duration>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let service = service_fn(move |req| echo(req, delay));
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await;
            });
        }
    });

    addr
}

/// `tests/fixtures`의 자체 서명 인증서(localhost, 127.0.0.1)로 TLS를 여는 에코 백엔드
pub async fn spawn_tls_echo_backend() -> SocketAddr {
    let mut cert_pem: &[u8] = include_bytes!("../fixtures/self_signed.pem");
    let mut key_pem: &[u8] = include_bytes!("../fixtures/self_signed.key");
    let certs = rustls_pemfile::certs(&mut cert_pem)
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    let key = rustls_pemfile::private_key(&mut key_pem).unwrap().unwrap();

    let config = ServerConfig::builder_with_provider(Arc::new(crypto::ring::default_provider()))
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .unwrap();
    let acceptor = TlsAcceptor::from(Arc::new(config));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                // 인증서를 거부한 클라이언트는 핸드셰이크 중에 끊음
                let Ok(stream) = acceptor.accept(stream).await else {
                    return;
                };
                let service = service_fn(|req| echo(req, None));
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await;
            });
        }
    });

    addr
}

async fn echo(req: Request<Incoming>, delay: Option<Duration>) -> Result<Response<Full<Bytes>>, Infallible> {
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let mut headers = Map::new();
    for (name, value) in req.headers() {
        headers.insert(
            name.to_string(),
            Value::String(value.to_str().unwrap_or_default().to_string()),
        );
    }
    let method = req.method().to_string();
    let uri = req.uri().to_string();
    let body = req.into_body().collect().await.unwrap().to_bytes();

    let echoed = json!({
        "method": method,
        "uri": uri,
        "headers": headers,
        "body": String::from_utf8_lossy(&body),
    });

    Ok(Response::builder()
        .header("x-echo-backend", "1")
        .body(Full::new(Bytes::from(echoed.to_string())))
        .unwrap())
}

/// 아무것도 듣고 있지 않은 로컬 포트
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

pub fn clients() -> UpstreamClients {
    UpstreamClients::new(&ClientOptions::default()).unwrap()
}

/// fmt 구독자 출력을 메모리에 모읍니다.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogCapture {
    /// `max_level`까지 기록하는 구독자. `tracing::subscriber::set_default`와 함께 씁니다.
    pub fn subscriber(&self, max_level: Level) -> impl tracing::Subscriber + Send + Sync + 'static {
        let writer = self.clone();
        tracing_subscriber::fmt()
            .with_max_level(max_level)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
    }
}
