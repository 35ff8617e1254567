use std::fmt;
use regex_lite as regex;
use crate::routing::error::RoutingError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathMatcherKind {
    Prefix,
    Glob,
    Regex,
}

/// 요청 경로에 대한 라우트 패턴입니다.
///
/// * `^`로 시작하면 정규식
/// * 끝에만 `*`가 있으면 세그먼트 단위 접두사 (`/api/*`, `/api*`)
/// * 그 외 위치에 `*`, `**`, `?`가 있으면 glob
/// * 나머지는 세그먼트 단위 접두사 (`/api`는 `/api/*`와 같음)
#[derive(Debug, Clone)]
pub struct PathMatcher {
    pub kind: PathMatcherKind,
    pub pattern: String,
    source: String,
    regex: Option<regex::Regex>,
}

impl PathMatcher {
    pub fn from_str(pattern: &str) -> Result<Self, RoutingError> {
        if pattern.is_empty() {
            return Err(RoutingError::InvalidPathPattern {
                pattern: pattern.to_string(),
                reason: "빈 패턴".to_string(),
            });
        }

        if pattern.starts_with('^') {
            let re = compile(pattern, pattern)?;
            return Ok(PathMatcher {
                kind: PathMatcherKind::Regex,
                pattern: pattern.to_string(),
                source: pattern.to_string(),
                regex: Some(re),
            });
        }

        if !pattern.starts_with('/') {
            return Err(RoutingError::InvalidPathPattern {
                pattern: pattern.to_string(),
                reason: "경로 패턴은 '/'로 시작해야 합니다".to_string(),
            });
        }

        let base = pattern.trim_end_matches('*');
        if base.contains(['*', '?']) || pattern.ends_with("**") {
            let re = compile(&glob_to_regex(pattern), pattern)?;
            return Ok(PathMatcher {
                kind: PathMatcherKind::Glob,
                pattern: pattern.to_string(),
                source: pattern.to_string(),
                regex: Some(re),
            });
        }

        Ok(PathMatcher {
            kind: PathMatcherKind::Prefix,
            pattern: base.to_string(),
            source: pattern.to_string(),
            regex: None,
        })
    }

    /// 설정에 적힌 원래 패턴 문자열
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, path: &str) -> bool {
        match self.kind {
            PathMatcherKind::Prefix => {
                let pattern = self.pattern.trim_end_matches('/');
                if pattern.is_empty() {
                    return true;
                }
                let path = path.trim_end_matches('/');
                path == pattern
                    || path.strip_prefix(pattern).map_or(false, |rest| rest.starts_with('/'))
            }
            PathMatcherKind::Glob | PathMatcherKind::Regex => self.regex.as_ref()
                .map(|r| r.is_match(path))
                .unwrap_or(false),
        }
    }
}

fn compile(expr: &str, pattern: &str) -> Result<regex::Regex, RoutingError> {
    regex::Regex::new(expr).map_err(|e| RoutingError::InvalidPathPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

// `**`는 임의 문자열, `*`는 한 세그먼트 내부, `?`는 '/'가 아닌 한 글자
fn glob_to_regex(glob: &str) -> String {
    let mut out = String::from("^");
    let mut chars = glob.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                out.push_str(".*");
            }
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            c if "\\.+()|[]{}^$".contains(c) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    // `/static/**`는 `/static` 자체도 매칭
    if let Some(stripped) = out.strip_suffix("/.*") {
        out = format!("{}(/.*)?", stripped);
    }
    out.push('$');
    out
}

impl PartialEq for PathMatcher {
    fn eq(&self, other: &Self) -> bool {
        if self.kind != other.kind {
            return false;
        }
        match self.kind {
            PathMatcherKind::Prefix => {
                self.pattern.trim_end_matches('/') == other.pattern.trim_end_matches('/')
            }
            _ => self.pattern == other.pattern,
        }
    }
}

impl Eq for PathMatcher {}

impl fmt::Display for PathMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
