use tracing::{debug, warn};

use crate::routing::RouteRule;

/// 선언 순서를 유지하는 라우트 테이블입니다.
///
/// 요청 경로에 대해 규칙을 앞에서부터 검사하고 처음 일치한 규칙을 고릅니다.
/// 생성 후에는 변경하지 않으며 여러 요청이 잠금 없이 공유합니다.
#[derive(Debug, Clone, Default)]
pub struct RoutingTable {
    rules: Vec<RouteRule>,
}

impl RoutingTable {
    /// 새로운 라우팅 테이블을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 규칙 목록으로 테이블을 만듭니다. 앞선 규칙과 같은 패턴은 절대 선택되지 않으므로 경고합니다.
    pub fn from_rules(rules: Vec<RouteRule>) -> Self {
        let mut table = Self::new();
        for rule in rules {
            table.add_route(rule);
        }
        table
    }

    /// 테이블 끝에 규칙을 추가합니다.
    pub fn add_route(&mut self, rule: RouteRule) {
        if let Some(earlier) = self.rules.iter().find(|r| r.matcher == rule.matcher) {
            warn!(
                pattern = %rule.pattern(),
                shadowed_by = %earlier.pattern(),
                "앞선 라우트에 가려져 선택되지 않는 규칙"
            );
        }
        self.rules.push(rule);
    }

    /// 경로와 일치하는 첫 번째 규칙을 찾습니다.
    ///
    /// # 인자
    ///
    /// * `path` - 요청 URI의 경로 부분 (쿼리 제외)
    ///
    /// # 반환
    ///
    /// 일치하는 규칙이 없으면 `None`을 반환합니다.
    pub fn find_route(&self, path: &str) -> Option<&RouteRule> {
        let found = self.rules.iter().find(|rule| rule.matches(path));
        match found {
            Some(rule) => debug!(path = %path, pattern = %rule.pattern(), "라우트 매칭"),
            None => debug!(
                path = %path,
                available_routes = ?self.patterns().collect::<Vec<_>>(),
                "일치하는 라우트 없음"
            ),
        }
        found
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.pattern())
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
