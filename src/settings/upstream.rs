use std::env;
use std::path::PathBuf;
use std::time::Duration;
use serde::Deserialize;
use super::{server::parse_env_var, SettingsError};

/// 백엔드 연결 설정
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamSettings {
    /// 응답 헤더를 받을 때까지의 제한 시간(초), 0 또는 미설정이면 무제한
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// TCP 연결 제한 시간(초)
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,

    /// `secure` 라우트에서 추가로 신뢰할 CA 인증서 (PEM)
    #[serde(default)]
    pub ca_file: Option<PathBuf>,
}

impl UpstreamSettings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Ok(Self {
            timeout_secs: parse_env_var("PROXY_UPSTREAM_TIMEOUT", || 0u64).map(non_zero)?,
            connect_timeout_secs: parse_env_var("PROXY_UPSTREAM_CONNECT_TIMEOUT", || 0u64).map(non_zero)?,
            ca_file: env::var("PROXY_UPSTREAM_CA_FILE").ok().map(PathBuf::from),
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.and_then(non_zero).map(Duration::from_secs)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.and_then(non_zero).map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if let Some(path) = &self.ca_file {
            if !path.exists() {
                return Err(SettingsError::FileError {
                    path: path.to_string_lossy().to_string(),
                    error: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "CA 인증서 파일을 찾을 수 없습니다",
                    ),
                });
            }
        }
        Ok(())
    }
}

fn non_zero(value: u64) -> Option<u64> {
    (value > 0).then_some(value)
}
