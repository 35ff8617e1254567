use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::settings::ServerSettings;
use super::handler::RequestHandler;
use super::Result;

pub struct ServerListener {
    http_listener: TcpListener,
}

impl ServerListener {
    pub async fn new(config: &ServerSettings) -> Result<Self> {
        let addr = format!("{}:{}", config.bind_address, config.http_port);
        let http_listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| {
                error!(error = %e, address = %addr, "HTTP 포트 바인딩 실패");
                e
            })?;

        info!(address = %addr, "HTTP 리스너 시작");
        Ok(Self { http_listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.http_listener.local_addr()?)
    }

    /// Ctrl-C가 들어올 때까지 연결을 받습니다.
    pub async fn run(self, handler: Arc<RequestHandler>) -> Result<()> {
        self.run_until(handler, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "종료 시그널 대기 실패");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// `shutdown`이 끝나면 새 연결을 받지 않고 반환합니다.
    /// 이미 받은 연결은 각자의 태스크에서 끝까지 처리됩니다.
    pub async fn run_until<F>(self, handler: Arc<RequestHandler>, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                result = self.http_listener.accept() => {
                    match result {
                        Ok((stream, peer)) => {
                            debug!(peer = %peer, "연결 수락");
                            let handler = handler.clone();
                            tokio::spawn(async move {
                                let io = TokioIo::new(stream);
                                if let Err(err) = handler.handle_connection(io).await {
                                    debug!(error = %err, peer = %peer, "HTTP 연결 처리 실패");
                                }
                            });
                        }
                        Err(e) => {
                            error!(error = %e, "HTTP 연결 수락 실패");
                        }
                    }
                }

                _ = &mut shutdown => {
                    info!("종료 시그널 수신, 리스너를 닫습니다");
                    return Ok(());
                }
            }
        }
    }
}
