//! Dev Route Forwarder는 로컬 개발 서버 앞에 두는 경로 기반 리버스 프록시입니다.
//!
//! # 주요 기능
//!
//! - 선언 순서대로 검사하는 경로 라우팅 (처음 일치한 규칙 사용)
//! - pathRewrite 정규식으로 경로 변환
//! - 백엔드별 헤더 덮어쓰기
//! - 라우트별 TLS 인증서 검증 여부 (`secure`)
//! - 라우트별 요청 로그 레벨
//!
//! # 예제
//!
//! ```
//! use dev_route_forwarder::routing::{RouteRule, RoutingTable};
//!
//! let mut table = RoutingTable::new();
//!
//! table.add_route(
//!     RouteRule::builder("/api/*", "http://127.0.0.1:6969")
//!         .secure(false)
//!         .header("host", "127.0.0.1:6969")
//!         .build()
//!         .unwrap(),
//! );
//! table.add_route(
//!     RouteRule::builder("/teller/*", "http://127.0.0.1:7979")
//!         .rewrite("^/teller", "api/")
//!         .build()
//!         .unwrap(),
//! );
//!
//! let rule = table.find_route("/teller/balance").unwrap();
//! assert_eq!(rule.path_rewrite.apply("/teller/balance"), "api/balance");
//! assert!(table.find_route("/unmatched/path").is_none());
//! ```

pub mod logging;
pub mod proxy;
pub mod routing;
pub mod server;
pub mod settings;
