use tracing::Level;

use crate::routing::{
    HeaderOverride,
    HeaderOverrides,
    PathMatcher,
    PathRewrite,
    PathRewrites,
    RoutingError,
    Target,
};

/// 경로 패턴 하나를 백엔드 타겟과 변환 규칙에 연결하는 라우트 규칙입니다.
#[derive(Debug, Clone)]
pub struct RouteRule {
    pub matcher: PathMatcher,
    pub target: Target,
    /// false면 백엔드 TLS 인증서를 검증하지 않음
    pub secure: bool,
    pub path_rewrite: PathRewrites,
    pub headers: HeaderOverrides,
    /// 요청 로그 레벨, None이면 로그를 남기지 않음
    pub log_level: Option<Level>,
}

impl RouteRule {
    /// 기본값(secure, info 로그, 변환 없음)으로 규칙을 만듭니다.
    pub fn new(pattern: &str, target: &str) -> Result<Self, RoutingError> {
        RouteRuleBuilder::new(pattern, target).build()
    }

    pub fn builder(pattern: &str, target: &str) -> RouteRuleBuilder {
        RouteRuleBuilder::new(pattern, target)
    }

    pub fn pattern(&self) -> &str {
        self.matcher.as_str()
    }

    pub fn matches(&self, path: &str) -> bool {
        self.matcher.matches(path)
    }
}

/// 설정 레코드에서 [`RouteRule`]을 조립합니다. 모든 검증은 `build`에서 한 번에 합니다.
#[derive(Debug, Clone)]
pub struct RouteRuleBuilder {
    pattern: String,
    target: String,
    secure: bool,
    change_origin: bool,
    rewrites: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    log_level: Option<Level>,
}

impl RouteRuleBuilder {
    pub fn new(pattern: &str, target: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            target: target.to_string(),
            secure: true,
            change_origin: false,
            rewrites: Vec::new(),
            headers: Vec::new(),
            log_level: Some(Level::INFO),
        }
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn change_origin(mut self, change_origin: bool) -> Self {
        self.change_origin = change_origin;
        self
    }

    pub fn rewrite(mut self, pattern: &str, replacement: &str) -> Self {
        self.rewrites.push((pattern.to_string(), replacement.to_string()));
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn log_level(mut self, level: Option<Level>) -> Self {
        self.log_level = level;
        self
    }

    pub fn build(self) -> Result<RouteRule, RoutingError> {
        let matcher = PathMatcher::from_str(&self.pattern)?;
        let target = Target::parse(&self.target)?;

        let rewrites = self.rewrites.iter()
            .map(|(pattern, replacement)| PathRewrite::new(pattern, replacement))
            .collect::<Result<Vec<_>, _>>()?;

        // changeOrigin이 먼저 적용되고 명시적 헤더가 덮어씀
        let mut overrides = Vec::with_capacity(self.headers.len() + 1);
        if self.change_origin {
            overrides.push(HeaderOverride::host_from_target());
        }
        for (name, value) in &self.headers {
            overrides.push(HeaderOverride::new(name, value)?);
        }
        let headers = HeaderOverrides::resolve(&overrides, &target)?;

        Ok(RouteRule {
            matcher,
            target,
            secure: self.secure,
            path_rewrite: PathRewrites::new(rewrites),
            headers,
            log_level: self.log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::HOST;

    #[test]
    fn test_defaults() {
        let rule = RouteRule::new("/api/*", "http://127.0.0.1:6969").unwrap();
        assert!(rule.secure);
        assert!(rule.path_rewrite.is_empty());
        assert!(rule.headers.is_empty());
        assert_eq!(rule.log_level, Some(Level::INFO));
        assert_eq!(rule.pattern(), "/api/*");
    }

    #[test]
    fn test_change_origin_sets_host() {
        let rule = RouteRule::builder("/api", "http://127.0.0.1:6969")
            .change_origin(true)
            .build()
            .unwrap();
        assert_eq!(rule.headers.get(&HOST).unwrap(), "127.0.0.1:6969");
    }

    #[test]
    fn test_build_reports_first_invalid_part() {
        let err = RouteRule::builder("/api", "http://127.0.0.1:6969")
            .rewrite("[", "x")
            .build()
            .unwrap_err();
        assert!(matches!(err, RoutingError::InvalidRewrite { .. }));

        let err = RouteRule::new("api", "http://127.0.0.1:6969").unwrap_err();
        assert!(matches!(err, RoutingError::InvalidPathPattern { .. }));

        let err = RouteRule::new("/api", "127.0.0.1").unwrap_err();
        assert!(matches!(err, RoutingError::InvalidTarget { .. }));
    }
}
