use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use tracing::debug;

use crate::proxy::{ForwardError, ProxyBody, RouteForwarder};

/// 들어온 요청을 전달기로 넘기고, 전달 에러를 HTTP 에러 응답으로 바꿉니다.
pub struct RequestHandler {
    forwarder: RouteForwarder,
}

impl RequestHandler {
    pub fn new(forwarder: RouteForwarder) -> Self {
        Self { forwarder }
    }

    pub fn forwarder(&self) -> &RouteForwarder {
        &self.forwarder
    }

    pub async fn handle_request(
        &self,
        req: Request<Incoming>,
    ) -> Result<Response<ProxyBody>, std::convert::Infallible> {
        match self.forwarder.forward(req).await {
            Ok(response) => Ok(response),
            Err(e) => Ok(error_response(&e)),
        }
    }

    pub async fn handle_connection<I>(&self, io: I) -> Result<(), hyper::Error>
    where
        I: hyper::rt::Read + hyper::rt::Write + Send + Unpin + 'static,
    {
        http1::Builder::new()
            .serve_connection(io, service_fn(|req| self.handle_request(req)))
            .await
    }
}

/// 전달 에러를 상태 코드와 평문 메시지를 담은 응답으로 바꿉니다.
pub fn error_response(error: &ForwardError) -> Response<ProxyBody> {
    let body: ProxyBody = Full::new(Bytes::from(format!("Error: {}", error)))
        .map_err(|never| match never {})
        .boxed();

    let mut response = Response::new(body);
    *response.status_mut() = error.status_code();
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    debug!(status = %response.status(), error = %error, "에러 응답 반환");
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::StatusCode;

    #[tokio::test]
    async fn test_error_response_body() {
        let response = error_response(&ForwardError::NoRouteMatched {
            path: "/unmatched/path".to_string(),
        });
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert!(String::from_utf8_lossy(&body).contains("/unmatched/path"));
    }
}
