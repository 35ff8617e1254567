use std::path::Path;
use serde_json::{Map, Value};
use tracing::debug;

use super::error::SettingsError;
use super::routes::RouteConfig;
use super::validator::ProxyFileValidator;
use super::Result;

/// 개발 서버 형식의 프록시 파일을 읽어 선언 순서대로 라우트 레코드를 돌려줍니다.
pub async fn load_proxy_file<P: AsRef<Path>>(path: P) -> Result<Vec<RouteConfig>> {
    let path_str = path.as_ref().to_string_lossy().to_string();
    let content = tokio::fs::read_to_string(&path).await.map_err(|e| SettingsError::FileError {
        path: path_str.clone(),
        error: e,
    })?;

    parse_proxy_file(&content, &path_str)
}

/// `origin`은 에러 메시지에 쓰이는 파일 이름입니다.
pub fn parse_proxy_file(content: &str, origin: &str) -> Result<Vec<RouteConfig>> {
    let value: Value = serde_json::from_str(content).map_err(|e| SettingsError::JsonParseError {
        path: origin.to_string(),
        source: e,
    })?;

    ProxyFileValidator::new()?
        .validate(&value)
        .map_err(|errors| SettingsError::ValidationErrors {
            path: origin.to_string(),
            errors,
        })?;

    let mut routes = Vec::new();
    match value {
        Value::Object(entries) => {
            for (pattern, options) in entries {
                routes.push(route_from_options(pattern, options, origin)?);
            }
        }
        Value::Array(items) => {
            for mut options in items {
                let contexts = match options.as_object_mut().and_then(|o| o.remove("context")) {
                    Some(Value::String(pattern)) => vec![pattern],
                    Some(Value::Array(patterns)) => patterns
                        .into_iter()
                        .filter_map(|p| p.as_str().map(str::to_string))
                        .collect(),
                    _ => Vec::new(),
                };
                for pattern in contexts {
                    routes.push(route_from_options(pattern, options.clone(), origin)?);
                }
            }
        }
        _ => {}
    }

    debug!(file = %origin, count = routes.len(), "JSON 프록시 설정 파싱 완료");
    Ok(routes)
}

fn route_from_options(pattern: String, options: Value, origin: &str) -> Result<RouteConfig> {
    let mut fields = match options {
        Value::Object(fields) => fields,
        _ => Map::new(),
    };
    fields.insert("pattern".to_string(), Value::String(pattern));

    serde_json::from_value(Value::Object(fields)).map_err(|e| SettingsError::JsonParseError {
        path: origin.to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_layout_keeps_key_order() {
        let routes = parse_proxy_file(r#"{
            "/zeta/*": { "target": "http://127.0.0.1:1" },
            "/alpha/*": { "target": "http://127.0.0.1:2" },
            "/api/*": {
                "target": "http://127.0.0.1:6969",
                "secure": false,
                "headers": { "host": "127.0.0.1:6969" }
            }
        }"#, "proxy.conf.json").unwrap();

        let patterns: Vec<_> = routes.iter().map(|r| r.pattern.as_str()).collect();
        assert_eq!(patterns, vec!["/zeta/*", "/alpha/*", "/api/*"]);
        assert!(!routes[2].secure);
        assert_eq!(routes[2].header_overrides.0, vec![("host".to_string(), "127.0.0.1:6969".to_string())]);
    }

    #[test]
    fn test_array_layout_expands_contexts() {
        let routes = parse_proxy_file(r#"[
            { "context": ["/auth", "/api"], "target": "http://127.0.0.1:6969" },
            { "context": "/teller", "target": "http://127.0.0.1:7979" }
        ]"#, "proxy.conf.json").unwrap();

        let patterns: Vec<_> = routes.iter().map(|r| r.pattern.as_str()).collect();
        assert_eq!(patterns, vec!["/auth", "/api", "/teller"]);
        assert_eq!(routes[1].target, "http://127.0.0.1:6969");
    }

    #[test]
    fn test_schema_violation() {
        let err = parse_proxy_file(r#"{ "/api/*": { "secure": true } }"#, "proxy.conf.json")
            .unwrap_err();
        assert!(matches!(err, SettingsError::ValidationErrors { .. }));
    }

    #[test]
    fn test_malformed_json() {
        let err = parse_proxy_file("{ not json", "proxy.conf.json").unwrap_err();
        assert!(matches!(err, SettingsError::JsonParseError { .. }));
    }
}
