use std::fmt;
use serde::de::{Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;

use crate::routing::RouteRule;
use super::logging::parse_route_log_level;
use super::{Result, SettingsError};

/// 선언 순서를 유지하는 (키, 값) 목록.
///
/// 테이블(`{ "^/old" = "/new" }`)과 쌍 목록(`[["^/old", "/new"]]`) 형식을 모두 받습니다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderedPairs(pub Vec<(String, String)>);

impl OrderedPairs {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>, T: Into<String>> FromIterator<(S, T)> for OrderedPairs {
    fn from_iter<I: IntoIterator<Item = (S, T)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<'de> Deserialize<'de> for OrderedPairs {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PairsVisitor;

        impl<'de> Visitor<'de> for PairsVisitor {
            type Value = OrderedPairs;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a table of strings or a list of [key, value] pairs")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
                let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(pair) = map.next_entry::<String, String>()? {
                    pairs.push(pair);
                }
                Ok(OrderedPairs(pairs))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error> {
                let mut pairs = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(pair) = seq.next_element::<(String, String)>()? {
                    pairs.push(pair);
                }
                Ok(OrderedPairs(pairs))
            }
        }

        deserializer.deserialize_any(PairsVisitor)
    }
}

/// 설정 파일의 라우트 레코드 하나.
///
/// TOML의 snake_case 키와 개발 서버 JSON의 camelCase 키를 모두 받습니다.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RouteConfig {
    pub pattern: String,
    pub target: String,

    #[serde(default = "default_secure")]
    pub secure: bool,

    #[serde(default, alias = "changeOrigin")]
    pub change_origin: bool,

    #[serde(default, alias = "pathRewrite")]
    pub path_rewrite: OrderedPairs,

    #[serde(default, alias = "headerOverrides", alias = "headers")]
    pub header_overrides: OrderedPairs,

    /// trace, debug, info, warn, error 또는 silent
    #[serde(default, alias = "logLevel")]
    pub log_level: Option<String>,
}

fn default_secure() -> bool { true }

impl RouteConfig {
    pub fn new(pattern: &str, target: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            target: target.to_string(),
            secure: default_secure(),
            change_origin: false,
            path_rewrite: OrderedPairs::default(),
            header_overrides: OrderedPairs::default(),
            log_level: None,
        }
    }

    /// 레코드를 검증하고 라우트 규칙으로 변환합니다.
    pub fn to_rule(&self) -> Result<RouteRule> {
        let invalid = |reason: String| SettingsError::InvalidConfiguration {
            route: self.pattern.clone(),
            reason,
        };

        let mut builder = RouteRule::builder(&self.pattern, &self.target)
            .secure(self.secure)
            .change_origin(self.change_origin);

        for (pattern, replacement) in self.path_rewrite.iter() {
            builder = builder.rewrite(pattern, replacement);
        }
        for (name, value) in self.header_overrides.iter() {
            builder = builder.header(name, value);
        }
        if let Some(level) = &self.log_level {
            builder = builder.log_level(parse_route_log_level(level).map_err(invalid)?);
        }

        builder.build().map_err(|e| invalid(e.to_string()))
    }
}
