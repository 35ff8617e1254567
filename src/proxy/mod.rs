//! 라우트 규칙에 따라 요청을 백엔드로 전달하는 모듈입니다.

mod client;
mod error;
mod forwarder;

pub use client::{
    load_ca_certificates,
    BoxError,
    ClientError,
    ClientOptions,
    ProxyBody,
    UpstreamClient,
    UpstreamClients,
};
pub use error::{ForwardError, UnreachableCause};
pub use forwarder::{strip_hop_by_hop, Outbound, RouteForwarder};
