use std::fmt;

#[derive(Debug)]
pub enum SettingsError {
    EnvVarInvalid {
        var_name: String,
        value: String,
        reason: String,
    },
    FileError {
        path: String,
        error: std::io::Error,
    },
    ParseError {
        source: toml::de::Error,
    },
    JsonParseError {
        path: String,
        source: serde_json::Error,
    },
    SchemaCompileError {
        reason: String,
    },
    ValidationErrors {
        path: String,
        errors: Vec<String>,
    },
    /// 라우트 규칙이 잘못되었습니다. 시작 단계에서만 발생합니다.
    InvalidConfiguration {
        route: String,
        reason: String,
    },
    InvalidConfig(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnvVarInvalid { var_name, value, reason } =>
                write!(f, "환경 변수 {} 값 {} 오류: {}", var_name, value, reason),
            Self::FileError { path, error } =>
                write!(f, "설정 파일 {} 오류: {}", path, error),
            Self::ParseError { source } =>
                write!(f, "설정 파싱 오류: {}", source),
            Self::JsonParseError { path, source } =>
                write!(f, "JSON 설정 {} 파싱 오류: {}", path, source),
            Self::SchemaCompileError { reason } =>
                write!(f, "스키마 컴파일 오류: {}", reason),
            Self::ValidationErrors { path, errors } =>
                write!(f, "설정 파일 {} 검증 실패: {}", path, errors.join("; ")),
            Self::InvalidConfiguration { route, reason } =>
                write!(f, "잘못된 라우트 설정 '{}': {}", route, reason),
            Self::InvalidConfig(msg) =>
                write!(f, "잘못된 설정: {}", msg),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ParseError { source } => Some(source),
            Self::FileError { error, .. } => Some(error),
            Self::JsonParseError { source, .. } => Some(source),
            _ => None,
        }
    }
}
