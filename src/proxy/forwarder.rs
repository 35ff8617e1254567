use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::body::Body;
use hyper::header::{HeaderMap, HeaderName, CONNECTION};
use hyper::{Request, Response, Uri, Version};
use hyper_util::client::legacy;
use tracing::{instrument, Level};
use uuid::Uuid;

use crate::logging::{log_request, RequestLog};
use crate::proxy::client::{BoxError, ProxyBody, UpstreamClients};
use crate::proxy::error::{ForwardError, UnreachableCause};
use crate::routing::{RouteRule, RoutingTable, Target};

// 다음 홉으로 전달하지 않는 헤더
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "proxy-authenticate",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// 라우트 규칙이 적용된 백엔드 요청입니다.
#[derive(Debug)]
pub struct Outbound<B> {
    pub request: Request<B>,
    /// 매칭된 라우트 패턴, 폴백 전달이면 None
    pub route: Option<String>,
    /// pathRewrite 적용 후 경로 (타겟 기준 경로 제외)
    pub forwarded_path: String,
    /// 규칙이 덮어쓴 헤더 이름
    pub overridden_headers: Vec<String>,
    pub target: Target,
    pub secure: bool,
    pub log_level: Option<Level>,
}

/// 라우트 테이블에 따라 요청을 변환하고 백엔드로 전달합니다.
///
/// 라우트 테이블은 생성 후 바뀌지 않으므로 복제본들이 잠금 없이 공유합니다.
#[derive(Clone)]
pub struct RouteForwarder {
    table: Arc<RoutingTable>,
    clients: UpstreamClients,
    timeout: Option<Duration>,
    fallback: Option<Arc<RouteRule>>,
}

impl RouteForwarder {
    pub fn new(table: RoutingTable, clients: UpstreamClients) -> Self {
        Self {
            table: Arc::new(table),
            clients,
            timeout: None,
            fallback: None,
        }
    }

    /// 요청마다 적용할 타임아웃. 응답 헤더를 받을 때까지의 시간입니다.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// 일치하는 라우트가 없을 때 요청을 그대로 넘길 규칙
    pub fn with_fallback(mut self, fallback: Option<RouteRule>) -> Self {
        self.fallback = fallback.map(Arc::new);
        self
    }

    pub fn table(&self) -> &RoutingTable {
        &self.table
    }

    /// 요청에 라우트를 적용해 백엔드 요청을 만듭니다. 네트워크 I/O는 하지 않습니다.
    ///
    /// # 반환
    ///
    /// 일치하는 라우트도 폴백도 없으면 `ForwardError::NoRouteMatched`를 반환합니다.
    pub fn prepare<B>(&self, req: Request<B>) -> Result<Outbound<B>, ForwardError> {
        let path = req.uri().path().to_string();

        if let Some(rule) = self.table.find_route(&path) {
            return build_outbound(rule, Some(rule.pattern().to_string()), req);
        }

        match &self.fallback {
            Some(rule) => build_outbound(rule, None, req),
            None => Err(ForwardError::NoRouteMatched { path }),
        }
    }

    /// 요청을 백엔드로 전달하고 응답을 스트리밍으로 돌려줍니다.
    ///
    /// 재시도는 하지 않습니다. 반환된 future가 드롭되면(클라이언트 연결 종료 등)
    /// 진행 중인 백엔드 요청도 함께 취소됩니다.
    #[instrument(skip_all, fields(method = %req.method(), path = %req.uri().path()))]
    pub async fn forward<B>(&self, req: Request<B>) -> Result<Response<ProxyBody>, ForwardError>
    where
        B: Body<Data = Bytes> + Send + Sync + 'static,
        B::Error: Into<BoxError>,
    {
        let mut log = RequestLog::new(Uuid::new_v4().to_string());
        log.with_request(&req);

        let outbound = match self.prepare(req) {
            Ok(outbound) => outbound,
            Err(e) => {
                log.with_error(e.status_code(), &e);
                log.finish();
                log_request(&log, Some(Level::WARN));
                return Err(e);
            }
        };

        let target = outbound.target.to_string();
        let level = outbound.log_level;
        log.with_route(outbound.route.as_deref(), &target, outbound.request.uri());
        log.with_rewrite(&outbound.forwarded_path, outbound.overridden_headers.clone());

        let client = self.clients.for_rule(outbound.secure);
        let request: Request<ProxyBody> = outbound.request
            .map(|body| body.map_err(Into::into).boxed());

        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, client.request(request)).await {
                Ok(result) => result.map_err(|e| classify_client_error(e, &target)),
                Err(_) => Err(ForwardError::BackendUnreachable {
                    target: target.clone(),
                    cause: UnreachableCause::Timeout(limit),
                }),
            },
            None => client.request(request).await.map_err(|e| classify_client_error(e, &target)),
        };

        match result {
            Ok(response) => {
                log.with_response(response.status());
                log.finish();
                log_request(&log, level);
                Ok(response.map(|body| body.map_err(BoxError::from).boxed()))
            }
            Err(e) => {
                log.with_error(e.status_code(), &e);
                log.finish();
                log_request(&log, level);
                Err(e)
            }
        }
    }
}

fn build_outbound<B>(
    rule: &RouteRule,
    route: Option<String>,
    req: Request<B>,
) -> Result<Outbound<B>, ForwardError> {
    let (mut parts, body) = req.into_parts();

    let forwarded_path = rule.path_rewrite.apply(parts.uri.path());
    let uri_string = rule.target.uri_for(&forwarded_path, parts.uri.query());
    let uri: Uri = uri_string.parse().map_err(|e| ForwardError::InvalidRequest {
        reason: format!("{}: {}", uri_string, e),
    })?;

    strip_hop_by_hop(&mut parts.headers);
    rule.headers.apply_to(&mut parts.headers);

    parts.uri = uri;
    parts.version = Version::HTTP_11;

    Ok(Outbound {
        request: Request::from_parts(parts, body),
        route,
        forwarded_path,
        overridden_headers: rule.headers.names().map(|name| name.to_string()).collect(),
        target: rule.target.clone(),
        secure: rule.secure,
        log_level: rule.log_level,
    })
}

/// 홉 단위 헤더와 `Connection` 헤더에 나열된 헤더를 제거합니다.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers.get_all(CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

fn classify_client_error(error: legacy::Error, target: &str) -> ForwardError {
    let reason = error_chain(&error);
    if error.is_connect() {
        ForwardError::BackendUnreachable {
            target: target.to_string(),
            cause: UnreachableCause::Connect(reason),
        }
    } else {
        ForwardError::UpstreamError {
            target: target.to_string(),
            reason,
        }
    }
}

// 인증서 오류 같은 원인은 source 체인 깊숙이 있음
fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
