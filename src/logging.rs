use std::path::Path;
use std::time::Instant;

use time::format_description::well_known::Rfc3339;
use tracing::{debug, error, info, trace, warn, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

use crate::settings::{LogFormat, LogOutput, LogSettings};

/// 전역 tracing 구독자를 설정합니다.
///
/// 돌려받은 `WorkerGuard`는 프로세스가 끝날 때까지 살아 있어야 합니다.
pub fn init_logging(settings: &LogSettings) -> WorkerGuard {
    let filter = EnvFilter::builder()
        .with_default_directive(settings.level.into())
        .from_env_lossy();

    let (writer, guard) = match &settings.output {
        LogOutput::Stdout => tracing_appender::non_blocking(std::io::stdout()),
        LogOutput::File(path) => {
            let path = Path::new(path);
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let file_name = path.file_name().map(|f| f.to_os_string()).unwrap_or_else(|| "proxy.log".into());
            tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name))
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::new(Rfc3339))
        .with_target(true)
        .with_writer(writer);

    let result = match settings.format {
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
        LogFormat::Text => builder.with_thread_ids(true).try_init(),
    };
    if let Err(e) = result {
        eprintln!("로깅 초기화 실패: {}", e);
    }

    guard
}

/// 요청 하나에 대한 구조화된 로그 레코드입니다.
#[derive(Debug)]
pub struct RequestLog {
    pub request_id: String,
    pub method: String,
    pub path: String,
    pub route: Option<String>,
    pub target: Option<String>,
    pub forwarded_uri: Option<String>,
    /// pathRewrite 적용 후 경로
    pub forwarded_path: Option<String>,
    pub header_overrides: Vec<String>,
    pub status_code: u16,
    pub duration_ms: u64,
    pub error: Option<String>,
    started: Instant,
}

impl RequestLog {
    pub fn new(request_id: String) -> Self {
        Self {
            request_id,
            method: String::new(),
            path: String::new(),
            route: None,
            target: None,
            forwarded_uri: None,
            forwarded_path: None,
            header_overrides: Vec::new(),
            status_code: 0,
            duration_ms: 0,
            error: None,
            started: Instant::now(),
        }
    }

    pub fn with_request<B>(&mut self, req: &hyper::Request<B>) {
        self.method = req.method().to_string();
        self.path = req.uri().path().to_string();
        trace!(request_id = %self.request_id, method = %self.method, path = %self.path, "요청 수신");
    }

    /// 매칭된 라우트와 전달 URI를 기록합니다. `route`가 None이면 폴백 전달입니다.
    pub fn with_route(&mut self, route: Option<&str>, target: &str, uri: &hyper::Uri) {
        self.route = route.map(str::to_string);
        self.target = Some(target.to_string());
        self.forwarded_uri = Some(uri.to_string());
        trace!(request_id = %self.request_id, route = ?self.route, target = %target, "라우트 선택");
    }

    /// 재작성된 경로와 덮어쓴 헤더 이름을 기록합니다.
    pub fn with_rewrite(&mut self, forwarded_path: &str, header_overrides: Vec<String>) {
        self.forwarded_path = Some(forwarded_path.to_string());
        self.header_overrides = header_overrides;
    }

    pub fn with_response(&mut self, status: hyper::StatusCode) {
        self.status_code = status.as_u16();
    }

    pub fn with_error(&mut self, status: hyper::StatusCode, error: impl std::fmt::Display) {
        self.status_code = status.as_u16();
        self.error = Some(error.to_string());
    }

    pub fn finish(&mut self) {
        self.duration_ms = self.started.elapsed().as_millis() as u64;
    }
}

/// 요청 로그를 남깁니다.
///
/// `threshold`는 라우트의 로그 레벨입니다. INFO 이하(INFO, DEBUG, TRACE)면
/// 완료 레코드를 INFO로 남기고, DEBUG 이하면 재작성 전후 경로와 덮어쓴 헤더를
/// DEBUG로 함께 남깁니다. WARN, ERROR나 None이면 정상 요청은 기록하지 않습니다.
/// 에러와 5xx 응답은 라우트 레벨과 관계없이 기록합니다.
pub fn log_request(log: &RequestLog, threshold: Option<Level>) {
    if threshold.is_some_and(|t| t >= Level::DEBUG) {
        debug!(
            request_id = %log.request_id,
            path = %log.path,
            forwarded_path = ?log.forwarded_path,
            header_overrides = ?log.header_overrides,
            "경로 재작성 및 헤더 덮어쓰기"
        );
    }

    macro_rules! emit {
        ($macro:ident) => {
            $macro!(
                request_id = %log.request_id,
                method = %log.method,
                path = %log.path,
                route = ?log.route,
                target = ?log.target,
                forwarded_uri = ?log.forwarded_uri,
                status = log.status_code,
                duration_ms = log.duration_ms,
                error = ?log.error,
                "요청 처리 완료"
            )
        };
    }

    if log.error.is_some() && log.status_code >= 500 {
        emit!(error);
    } else if log.error.is_some() || log.status_code >= 500 {
        emit!(warn);
    } else if threshold.is_some_and(|t| t >= Level::INFO) {
        emit!(info);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
        }
    }

    // 전역 필터가 `filter`일 때 `threshold` 라우트의 출력
    fn output(filter: Level, threshold: Option<Level>, log: &RequestLog) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(filter)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || log_request(log, threshold));
        captured.text()
    }

    fn success() -> RequestLog {
        let mut log = RequestLog::new("req-1".to_string());
        log.path = "/teller/balance".to_string();
        log.with_rewrite("api/balance", vec!["host".to_string()]);
        log.with_response(hyper::StatusCode::OK);
        log
    }

    #[test]
    fn test_debug_route_still_logs_completion_at_info() {
        let out = output(Level::INFO, Some(Level::DEBUG), &success());
        assert!(out.contains("요청 처리 완료"), "{}", out);
        assert!(out.contains(" INFO "), "{}", out);
        assert!(!out.contains("경로 재작성"), "{}", out);

        let out = output(Level::INFO, Some(Level::TRACE), &success());
        assert!(out.contains("요청 처리 완료"), "{}", out);
    }

    #[test]
    fn test_debug_route_adds_rewrite_detail() {
        let out = output(Level::DEBUG, Some(Level::DEBUG), &success());
        assert!(out.contains("경로 재작성"), "{}", out);
        assert!(out.contains("api/balance"), "{}", out);
        assert!(out.contains("host"), "{}", out);
        assert!(out.contains("요청 처리 완료"), "{}", out);

        // INFO 라우트는 세부 내용을 남기지 않음
        let out = output(Level::DEBUG, Some(Level::INFO), &success());
        assert!(!out.contains("경로 재작성"), "{}", out);
        assert!(out.contains("요청 처리 완료"), "{}", out);
    }

    #[test]
    fn test_quiet_routes_skip_success() {
        assert!(output(Level::TRACE, Some(Level::WARN), &success()).is_empty());
        assert!(output(Level::TRACE, Some(Level::ERROR), &success()).is_empty());
        assert!(output(Level::TRACE, None, &success()).is_empty());
    }

    #[test]
    fn test_errors_logged_regardless_of_route_level() {
        let mut log = RequestLog::new("req-2".to_string());
        log.with_error(hyper::StatusCode::BAD_GATEWAY, "connection refused");

        let out = output(Level::INFO, None, &log);
        assert!(out.contains("ERROR"), "{}", out);
        assert!(out.contains("connection refused"), "{}", out);

        let mut log = RequestLog::new("req-3".to_string());
        log.with_error(hyper::StatusCode::NOT_FOUND, "no route");
        let out = output(Level::INFO, Some(Level::ERROR), &log);
        assert!(out.contains("WARN"), "{}", out);
    }
}
