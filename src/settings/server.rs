use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use crate::routing::Target;
use super::SettingsError;

#[derive(Clone, Debug, Deserialize)]
pub struct ServerSettings {
    /// 리스닝 주소 (기본값: 127.0.0.1)
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// HTTP 포트 (기본값: 8080)
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// 개발 서버 형식의 JSON 프록시 설정 파일
    #[serde(default)]
    pub routes_file: Option<PathBuf>,

    /// 일치하는 라우트가 없을 때 요청을 그대로 넘길 타겟
    #[serde(default)]
    pub fallback_target: Option<String>,

    /// 폴백 타겟의 인증서 검증 여부
    #[serde(default = "default_fallback_secure")]
    pub fallback_secure: bool,
}

fn default_bind_address() -> String { "127.0.0.1".to_string() }
fn default_http_port() -> u16 { 8080 }
fn default_fallback_secure() -> bool { true }

pub fn parse_env_var<T: std::str::FromStr, F: FnOnce() -> T>(name: &str, default: F) -> Result<T, SettingsError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val.parse().map_err(|e: T::Err| SettingsError::EnvVarInvalid {
            var_name: name.to_string(),
            value: val,
            reason: e.to_string(),
        }),
        Err(env::VarError::NotPresent) => Ok(default()),
        Err(e) => Err(SettingsError::EnvVarInvalid {
            var_name: name.to_string(),
            value: "".to_string(),
            reason: e.to_string(),
        }),
    }
}

impl ServerSettings {
    const MIN_PORT: u16 = 1;
    const MAX_PORT: u16 = 65535;

    fn parse_port(name: &str, value: &str) -> Result<u16, SettingsError> {
        let port = value.parse::<u16>().map_err(|_| SettingsError::EnvVarInvalid {
            var_name: name.to_string(),
            value: value.to_string(),
            reason: format!("포트는 {}-{} 범위여야 합니다", Self::MIN_PORT, Self::MAX_PORT),
        })?;

        if port < Self::MIN_PORT {
            return Err(SettingsError::EnvVarInvalid {
                var_name: name.to_string(),
                value: value.to_string(),
                reason: "포트는 0이 될 수 없습니다".to_string(),
            });
        }

        Ok(port)
    }

    pub fn from_env() -> Result<Self, SettingsError> {
        let http_port = Self::parse_port(
            "PROXY_HTTP_PORT",
            &env::var("PROXY_HTTP_PORT").unwrap_or_else(|_| default_http_port().to_string())
        )?;

        let settings = Self {
            bind_address: env::var("PROXY_BIND_ADDRESS").unwrap_or_else(|_| default_bind_address()),
            http_port,
            routes_file: env::var("PROXY_ROUTES_FILE").ok().map(PathBuf::from),
            fallback_target: env::var("PROXY_FALLBACK_TARGET").ok().filter(|v| !v.is_empty()),
            fallback_secure: parse_env_var("PROXY_FALLBACK_SECURE", default_fallback_secure)?,
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.http_port < Self::MIN_PORT {
            return Err(SettingsError::InvalidConfig(
                "server.http_port: 포트는 0이 될 수 없습니다".to_string(),
            ));
        }

        if self.bind_address.parse::<std::net::IpAddr>().is_err() && self.bind_address != "localhost" {
            return Err(SettingsError::InvalidConfig(format!(
                "server.bind_address: 유효하지 않은 주소 {}",
                self.bind_address
            )));
        }

        if let Some(target) = &self.fallback_target {
            Target::parse(target).map_err(|e| SettingsError::InvalidConfiguration {
                route: "<fallback>".to_string(),
                reason: e.to_string(),
            })?;
        }

        Ok(())
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            http_port: default_http_port(),
            routes_file: None,
            fallback_target: None,
            fallback_secure: default_fallback_secure(),
        }
    }
}
