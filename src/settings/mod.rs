use std::{env, path::Path};
use serde::Deserialize;
use tracing::{debug, info};

use crate::routing::{RouteRule, RoutingTable};

mod server;
pub mod logging;
mod upstream;
mod routes;
mod json;
mod validator;
mod error;

pub use server::ServerSettings;
pub use logging::{LogFormat, LogOutput, LogSettings};
pub use upstream::UpstreamSettings;
pub use routes::{OrderedPairs, RouteConfig};
pub use json::{load_proxy_file, parse_proxy_file};
pub use validator::ProxyFileValidator;
pub use error::SettingsError;

pub type Result<T> = std::result::Result<T, SettingsError>;
pub use server::parse_env_var;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    // 서버 설정
    #[serde(default)]
    pub server: ServerSettings,

    // 로깅 설정
    #[serde(default)]
    pub logging: LogSettings,

    // 백엔드 연결 설정
    #[serde(default)]
    pub upstream: UpstreamSettings,

    /// 선언 순서대로 검사되는 라우트 목록
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

impl Settings {
    /// `PROXY_CONFIG_FILE`이 있으면 TOML 파일에서, 없으면 환경 변수에서 설정을 읽습니다.
    /// `server.routes_file`이 지정되어 있으면 그 라우트를 뒤에 붙입니다.
    pub async fn load() -> Result<Self> {
        let mut settings = if let Ok(config_path) = env::var("PROXY_CONFIG_FILE") {
            Self::from_toml_file(&config_path).await?
        } else {
            Self::from_env().await?
        };

        if let Some(routes_file) = settings.server.routes_file.clone() {
            settings.load_routes_file(&routes_file).await?;
        }

        settings.validate()?;
        Ok(settings)
    }

    pub async fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| SettingsError::FileError {
            path: path.as_ref().to_string_lossy().to_string(),
            error: e,
        })?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| SettingsError::ParseError { source: e })
    }

    pub async fn from_env() -> Result<Self> {
        let settings = Self {
            server: ServerSettings::from_env()?,
            logging: LogSettings::from_env()?,
            upstream: UpstreamSettings::from_env()?,
            routes: Vec::new(),
        };

        debug!("환경 변수에서 설정 로드 완료");
        Ok(settings)
    }

    /// JSON 프록시 파일의 라우트를 기존 라우트 뒤에 추가합니다.
    pub async fn load_routes_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let routes = load_proxy_file(&path).await?;
        info!(
            file = %path.as_ref().display(),
            count = routes.len(),
            "JSON 프록시 설정 로드"
        );
        self.routes.extend(routes);
        Ok(())
    }

    /// 모든 라우트를 미리 컴파일해 봅니다. 하나라도 잘못되면 시작하지 않습니다.
    ///
    /// 로깅 초기화 전에 호출되므로 테이블은 만들지 않고 로그도 남기지 않습니다.
    /// 가려진 라우트 경고는 [`Settings::routing_table`]에서 나옵니다.
    pub fn validate(&self) -> Result<()> {
        self.server.validate()?;
        self.upstream.validate()?;

        for route in &self.routes {
            route.to_rule()?;
        }
        self.fallback_rule()?;
        Ok(())
    }

    pub fn routing_table(&self) -> Result<RoutingTable> {
        let mut table = RoutingTable::new();
        for route in &self.routes {
            table.add_route(route.to_rule()?);
        }
        Ok(table)
    }

    /// 일치하는 라우트가 없는 요청을 그대로 넘길 규칙
    pub fn fallback_rule(&self) -> Result<Option<RouteRule>> {
        self.server
            .fallback_target
            .as_deref()
            .map(|target| {
                let mut config = RouteConfig::new("/", target);
                config.secure = self.server.fallback_secure;
                config.to_rule()
            })
            .transpose()
    }
}
