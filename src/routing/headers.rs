use hyper::header::{HeaderMap, HeaderName, HeaderValue};
use crate::routing::error::RoutingError;
use crate::routing::target::Target;

/// 헤더 값의 출처
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValueSource {
    /// 설정에 적힌 값 그대로
    Literal(String),
    /// 타겟의 `host[:port]`
    TargetAuthority,
    /// 타겟의 `scheme://host[:port]`
    TargetOrigin,
}

impl HeaderValueSource {
    /// 설정 문자열을 해석합니다. `{target.authority}`, `{target.origin}`, `{target}`만
    /// 계산 값이고 나머지는 리터럴입니다.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "{target.authority}" => HeaderValueSource::TargetAuthority,
            "{target.origin}" | "{target}" => HeaderValueSource::TargetOrigin,
            _ => HeaderValueSource::Literal(value.to_string()),
        }
    }

    fn resolve(&self, target: &Target) -> String {
        match self {
            HeaderValueSource::Literal(value) => value.clone(),
            HeaderValueSource::TargetAuthority => target.authority(),
            HeaderValueSource::TargetOrigin => target.origin(),
        }
    }
}

/// 요청 헤더 하나를 덮어쓰는 규칙입니다.
#[derive(Debug, Clone)]
pub struct HeaderOverride {
    pub name: HeaderName,
    pub source: HeaderValueSource,
}

impl HeaderOverride {
    pub fn new(name: &str, value: &str) -> Result<Self, RoutingError> {
        let name = HeaderName::from_bytes(name.trim().as_bytes()).map_err(|e| {
            RoutingError::InvalidHeader {
                name: name.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self {
            name,
            source: HeaderValueSource::parse(value),
        })
    }

    pub fn host_from_target() -> Self {
        Self {
            name: hyper::header::HOST,
            source: HeaderValueSource::TargetAuthority,
        }
    }
}

/// 타겟에 대해 미리 계산된 헤더 덮어쓰기 목록입니다.
///
/// 라우트의 타겟은 바뀌지 않으므로 계산 값은 규칙 생성 시점에 한 번만 만듭니다.
#[derive(Debug, Clone, Default)]
pub struct HeaderOverrides {
    resolved: Vec<(HeaderName, HeaderValue)>,
}

impl HeaderOverrides {
    pub fn resolve(overrides: &[HeaderOverride], target: &Target) -> Result<Self, RoutingError> {
        let resolved = overrides.iter()
            .map(|o| {
                let value = o.source.resolve(target);
                HeaderValue::from_str(&value)
                    .map(|v| (o.name.clone(), v))
                    .map_err(|e| RoutingError::InvalidHeader {
                        name: o.name.to_string(),
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { resolved })
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    /// 덮어쓸 헤더 이름. 적용 순서 그대로입니다.
    pub fn names(&self) -> impl Iterator<Item = &HeaderName> {
        self.resolved.iter().map(|(name, _)| name)
    }

    pub fn get(&self, name: &HeaderName) -> Option<&HeaderValue> {
        self.resolved.iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// 순서대로 덮어씁니다. 같은 이름이 여러 번 나오면 마지막 값이 남습니다.
    pub fn apply_to(&self, headers: &mut HeaderMap) {
        for (name, value) in &self.resolved {
            headers.insert(name.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> Target {
        Target::parse("http://127.0.0.1:6969").unwrap()
    }

    #[test]
    fn test_source_parsing() {
        assert_eq!(HeaderValueSource::parse("{target.authority}"), HeaderValueSource::TargetAuthority);
        assert_eq!(HeaderValueSource::parse("{target}"), HeaderValueSource::TargetOrigin);
        assert_eq!(
            HeaderValueSource::parse("127.0.0.1:6969"),
            HeaderValueSource::Literal("127.0.0.1:6969".to_string())
        );
    }

    #[test]
    fn test_overrides_replace_existing_values() {
        let overrides = HeaderOverrides::resolve(
            &[
                HeaderOverride::new("host", "{target.authority}").unwrap(),
                HeaderOverride::new("Referer", "{target.origin}").unwrap(),
                HeaderOverride::new("origin", "{target}").unwrap(),
            ],
            &target(),
        ).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("localhost:4200"));
        headers.append("referer", HeaderValue::from_static("http://localhost:4200/a"));
        headers.append("referer", HeaderValue::from_static("http://localhost:4200/b"));

        overrides.apply_to(&mut headers);

        assert_eq!(headers["host"], "127.0.0.1:6969");
        assert_eq!(headers.get_all("referer").iter().count(), 1);
        assert_eq!(headers["referer"], "http://127.0.0.1:6969");
        assert_eq!(headers["origin"], "http://127.0.0.1:6969");
    }

    #[test]
    fn test_later_override_wins() {
        let overrides = HeaderOverrides::resolve(
            &[
                HeaderOverride::host_from_target(),
                HeaderOverride::new("host", "custom.local").unwrap(),
            ],
            &target(),
        ).unwrap();
        assert_eq!(overrides.get(&hyper::header::HOST).unwrap(), "custom.local");
    }

    #[test]
    fn test_invalid_header() {
        assert!(HeaderOverride::new("bad header", "x").is_err());
        let bad_value = HeaderOverride::new("x-test", "line\nbreak").unwrap();
        assert!(HeaderOverrides::resolve(&[bad_value], &target()).is_err());
    }
}
