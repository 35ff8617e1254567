pub mod handler;
pub mod listener;
pub mod error;

pub type Result<T> = std::result::Result<T, Error>;

pub use error::Error;
pub use handler::{error_response, RequestHandler};
pub use listener::ServerListener;

use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::proxy::{load_ca_certificates, ClientOptions, RouteForwarder, UpstreamClients};
use crate::settings::Settings;

/// 설정으로 전달기를 조립합니다. 라우트나 업스트림 설정이 잘못되면 시작 단계에서 실패합니다.
#[instrument(skip(settings), level = "debug", err)]
pub fn build_forwarder(settings: &Settings) -> Result<RouteForwarder> {
    let table = settings.routing_table()?;
    let fallback = settings.fallback_rule()?;

    let extra_roots = match &settings.upstream.ca_file {
        Some(path) => load_ca_certificates(path)?,
        None => Vec::new(),
    };
    let clients = UpstreamClients::new(&ClientOptions {
        connect_timeout: settings.upstream.connect_timeout(),
        extra_roots,
    })?;

    if table.is_empty() && fallback.is_none() {
        warn!("라우트가 하나도 없습니다. 모든 요청이 404로 응답됩니다");
    }
    info!(
        routes = table.len(),
        patterns = ?table.patterns().collect::<Vec<_>>(),
        fallback = fallback.is_some(),
        "라우트 테이블 로드 완료"
    );

    Ok(RouteForwarder::new(table, clients)
        .with_timeout(settings.upstream.timeout())
        .with_fallback(fallback))
}

/// 리스너를 열고 종료 시그널까지 요청을 처리합니다.
pub async fn serve(settings: &Settings) -> Result<()> {
    let forwarder = build_forwarder(settings)?;
    let listener = ServerListener::new(&settings.server).await?;
    let handler = Arc::new(RequestHandler::new(forwarder));
    listener.run(handler).await
}
