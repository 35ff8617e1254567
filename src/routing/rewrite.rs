use regex_lite::Regex;
use crate::routing::error::RoutingError;

/// 하나의 정규식 치환 규칙입니다. 경로에서 처음 일치하는 부분만 바꿉니다.
#[derive(Debug, Clone)]
pub struct PathRewrite {
    regex: Regex,
    replacement: String,
}

impl PathRewrite {
    pub fn new(pattern: &str, replacement: &str) -> Result<Self, RoutingError> {
        let regex = Regex::new(pattern).map_err(|e| RoutingError::InvalidRewrite {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            regex,
            replacement: replacement.to_string(),
        })
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// 처음 일치한 부분을 치환합니다.
    ///
    /// 치환 결과와 앞뒤 경로가 맞닿는 곳에서 '/'가 겹치면 하나만 남깁니다.
    /// 원래 경로에 있던 연속된 '/'는 그대로 둡니다.
    pub fn apply(&self, path: &str) -> String {
        let Some(caps) = self.regex.captures(path) else {
            return path.to_string();
        };
        let Some(found) = caps.get(0) else {
            return path.to_string();
        };

        let mut replaced = String::new();
        caps.expand(&self.replacement, &mut replaced);

        let mut out = String::with_capacity(path.len() + replaced.len());
        join_segment(&mut out, &path[..found.start()]);
        join_segment(&mut out, &replaced);
        join_segment(&mut out, &path[found.end()..]);
        out
    }
}

fn join_segment(out: &mut String, part: &str) {
    match part.strip_prefix('/') {
        Some(rest) if out.ends_with('/') => out.push_str(rest),
        _ => out.push_str(part),
    }
}

/// 선언 순서대로 적용되는 경로 치환 목록입니다.
#[derive(Debug, Clone, Default)]
pub struct PathRewrites {
    rules: Vec<PathRewrite>,
}

impl PathRewrites {
    pub fn new(rules: Vec<PathRewrite>) -> Self {
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathRewrite> {
        self.rules.iter()
    }

    /// 모든 치환을 순서대로 적용합니다.
    /// 목록이 비어 있거나 아무 치환도 일치하지 않으면 입력을 그대로 돌려줍니다.
    pub fn apply(&self, path: &str) -> String {
        self.rules.iter()
            .fold(path.to_string(), |acc, rule| rule.apply(&acc))
    }
}
