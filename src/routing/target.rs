use std::fmt;
use url::Url;
use crate::routing::error::RoutingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }
}

/// 요청을 전달할 백엔드의 기준 URL입니다.
///
/// # 필드
///
/// * `scheme` - `http` 또는 `https`
/// * `host` - 호스트 이름 또는 IP (IPv6는 대괄호 포함)
/// * `port` - 명시되지 않았으면 스킴의 기본 포트
/// * `base_path` - 전달 경로 앞에 붙는 경로 (없으면 빈 문자열)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    explicit_port: bool,
    pub base_path: String,
}

impl Target {
    /// 타겟 URL 문자열을 해석합니다.
    ///
    /// # 예제
    ///
    /// ```
    /// use dev_route_forwarder::routing::Target;
    ///
    /// let target = Target::parse("http://127.0.0.1:6969").unwrap();
    /// assert_eq!(target.authority(), "127.0.0.1:6969");
    /// assert_eq!(target.origin(), "http://127.0.0.1:6969");
    /// ```
    pub fn parse(value: &str) -> Result<Self, RoutingError> {
        let invalid = |reason: &str| RoutingError::InvalidTarget {
            target: value.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(value).map_err(|e| invalid(&e.to_string()))?;

        let scheme = match url.scheme() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            other => return Err(invalid(&format!("지원하지 않는 스킴: {}", other))),
        };

        let host = url.host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| invalid("호스트가 없습니다"))?
            .to_string();

        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("타겟에는 쿼리나 프래그먼트를 쓸 수 없습니다"));
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(invalid("타겟에 사용자 정보를 포함할 수 없습니다"));
        }

        let base_path = url.path().trim_end_matches('/').to_string();

        Ok(Self {
            scheme,
            host,
            port: url.port().unwrap_or_else(|| scheme.default_port()),
            explicit_port: url.port().is_some() || written_port(value).is_some(),
            base_path,
        })
    }

    /// 타겟 URL에 적힌 그대로의 `host[:port]`
    pub fn authority(&self) -> String {
        if self.explicit_port {
            format!("{}:{}", self.host, self.port)
        } else {
            self.host.clone()
        }
    }

    pub fn origin(&self) -> String {
        format!("{}://{}", self.scheme.as_str(), self.authority())
    }

    pub fn is_tls(&self) -> bool {
        self.scheme == Scheme::Https
    }

    /// 전달 경로와 원래 쿼리로 백엔드 URI 문자열을 만듭니다.
    /// 경로가 '/'로 시작하지 않으면 앞에 붙입니다.
    pub fn uri_for(&self, path: &str, query: Option<&str>) -> String {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        let mut uri = format!(
            "{}://{}:{}{}{}",
            self.scheme.as_str(),
            self.host,
            self.port,
            self.base_path,
            path
        );
        if let Some(query) = query {
            uri.push('?');
            uri.push_str(query);
        }
        uri
    }
}

// `url`은 스킴 기본 포트를 지우므로 원문에서 포트를 직접 찾음
fn written_port(value: &str) -> Option<u16> {
    let (_, rest) = value.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next()?;
    let host_port = authority.rsplit('@').next()?;
    let after_host = match host_port.rfind(']') {
        Some(end) => &host_port[end + 1..],
        None => host_port,
    };
    after_host.rsplit_once(':').and_then(|(_, port)| port.parse().ok())
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.origin(), self.base_path)
    }
}
