use dev_route_forwarder::{logging::init_logging, server, settings::Settings};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let settings = match Settings::load().await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("설정 로드 실패: {}", e);
            std::process::exit(1);
        }
    };

    let guard = init_logging(&settings.logging);
    info!(
        bind = %settings.server.bind_address,
        port = settings.server.http_port,
        routes = settings.routes.len(),
        "Dev Route Forwarder 시작"
    );

    if let Err(e) = server::serve(&settings).await {
        error!(error = %e, "서버 실행 실패");
        drop(guard);
        std::process::exit(1);
    }

    info!("서버 종료");
}
