use dev_route_forwarder::routing::{PathMatcher, PathMatcherKind, RouteRule, RoutingError, RoutingTable};

fn rule(pattern: &str, target: &str) -> RouteRule {
    RouteRule::new(pattern, target).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_wins() {
        let table = RoutingTable::from_rules(vec![
            rule("/api/users/*", "http://127.0.0.1:7001"),
            rule("/api/*", "http://127.0.0.1:7002"),
        ]);

        let found = table.find_route("/api/users/42").unwrap();
        assert_eq!(found.target.port, 7001);

        let found = table.find_route("/api/orders").unwrap();
        assert_eq!(found.target.port, 7002);
    }

    #[test]
    fn test_order_decides_overlapping_rules() {
        // 넓은 규칙이 앞에 있으면 뒤의 구체적인 규칙은 선택되지 않음
        let table = RoutingTable::from_rules(vec![
            rule("/api/*", "http://127.0.0.1:7002"),
            rule("/api/users/*", "http://127.0.0.1:7001"),
        ]);

        assert_eq!(table.find_route("/api/users/42").unwrap().target.port, 7002);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_unmatched_path() {
        let table = RoutingTable::from_rules(vec![
            rule("/api/*", "http://127.0.0.1:6969"),
            rule("/teller/*", "http://127.0.0.1:7979"),
        ]);

        assert!(table.find_route("/unmatched/path").is_none());
        assert!(table.find_route("/apiary").is_none());
        assert!(RoutingTable::new().find_route("/").is_none());
    }

    #[test]
    fn test_prefix_segments() {
        let matcher = PathMatcher::from_str("/api/*").unwrap();
        assert_eq!(matcher.kind, PathMatcherKind::Prefix);

        assert!(matcher.matches("/api"));
        assert!(matcher.matches("/api/"));
        assert!(matcher.matches("/api/users/1"));
        assert!(!matcher.matches("/apiv2"));
    }

    #[test]
    fn test_root_matches_everything() {
        let matcher = PathMatcher::from_str("/").unwrap();
        assert!(matcher.matches("/"));
        assert!(matcher.matches("/anything/at/all"));
    }

    #[test]
    fn test_glob_patterns() {
        let single = PathMatcher::from_str("/files/*.js").unwrap();
        assert_eq!(single.kind, PathMatcherKind::Glob);
        assert!(single.matches("/files/app.js"));
        assert!(!single.matches("/files/nested/app.js"));

        let deep = PathMatcher::from_str("/assets/**").unwrap();
        assert!(deep.matches("/assets"));
        assert!(deep.matches("/assets/img/logo.png"));
        assert!(!deep.matches("/assetsx"));
    }

    #[test]
    fn test_regex_patterns() {
        let matcher = PathMatcher::from_str("^/v[0-9]+/").unwrap();
        assert_eq!(matcher.kind, PathMatcherKind::Regex);
        assert!(matcher.matches("/v2/users"));
        assert!(!matcher.matches("/vx/users"));
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(matches!(
            PathMatcher::from_str(""),
            Err(RoutingError::InvalidPathPattern { .. })
        ));
        assert!(matches!(
            PathMatcher::from_str("api/*"),
            Err(RoutingError::InvalidPathPattern { .. })
        ));
        assert!(matches!(
            PathMatcher::from_str("^/api/("),
            Err(RoutingError::InvalidPathPattern { .. })
        ));
    }

    #[test]
    fn test_rule_rejects_bad_target() {
        assert!(matches!(
            RouteRule::new("/api/*", "ftp://127.0.0.1:21"),
            Err(RoutingError::InvalidTarget { .. })
        ));
        assert!(matches!(
            RouteRule::new("/api/*", "not a url"),
            Err(RoutingError::InvalidTarget { .. })
        ));
    }
}
