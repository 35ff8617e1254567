//! 경로 기반 라우팅을 위한 핵심 기능을 제공하는 모듈입니다.

mod error;
mod headers;
mod matcher;
mod rewrite;
mod rule;
mod table;
mod target;

pub use error::RoutingError;
pub use headers::{HeaderOverride, HeaderOverrides, HeaderValueSource};
pub use matcher::{PathMatcher, PathMatcherKind};
pub use rewrite::{PathRewrite, PathRewrites};
pub use rule::{RouteRule, RouteRuleBuilder};
pub use table::RoutingTable;
pub use target::{Scheme, Target};
