use std::time::Duration;
use hyper::StatusCode;

/// 백엔드에 도달하지 못한 원인
#[derive(Debug, thiserror::Error)]
pub enum UnreachableCause {
    /// TCP 연결 또는 TLS 핸드셰이크 실패 (인증서 검증 실패 포함)
    #[error("연결 실패: {0}")]
    Connect(String),

    /// 요청 타임아웃 초과
    #[error("{0:?} 안에 응답이 없음")]
    Timeout(Duration),
}

/// 요청 단위 전달 에러입니다. 호출자에게 HTTP 에러 응답으로 돌려주며 프로세스를 멈추지 않습니다.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("경로 {path}에 일치하는 라우트가 없음")]
    NoRouteMatched {
        path: String,
    },

    #[error("백엔드 {target}에 연결할 수 없음: {cause}")]
    BackendUnreachable {
        target: String,
        cause: UnreachableCause,
    },

    #[error("백엔드 {target} 통신 오류: {reason}")]
    UpstreamError {
        target: String,
        reason: String,
    },

    #[error("전달 요청을 만들 수 없음: {reason}")]
    InvalidRequest {
        reason: String,
    },
}

impl ForwardError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ForwardError::NoRouteMatched { .. } => StatusCode::NOT_FOUND,
            ForwardError::BackendUnreachable { cause: UnreachableCause::Timeout(_), .. } => {
                StatusCode::GATEWAY_TIMEOUT
            }
            ForwardError::BackendUnreachable { .. } => StatusCode::BAD_GATEWAY,
            ForwardError::UpstreamError { .. } => StatusCode::BAD_GATEWAY,
            ForwardError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
        }
    }
}
