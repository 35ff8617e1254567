use jsonschema::{Draft, JSONSchema};
use serde_json::Value;
use tracing::debug;

use super::error::SettingsError;
use super::Result;

/// 개발 서버 프록시 파일 검증기
pub struct ProxyFileValidator {
    schema: JSONSchema,
}

impl ProxyFileValidator {
    pub fn new() -> Result<Self> {
        // 객체 형식: { "<패턴>": { 옵션 } }
        // 배열 형식: [ { "context": "<패턴>" | ["<패턴>", ...], 옵션 } ]
        let schema_str = r##"{
            "$schema": "http://json-schema.org/draft-07/schema#",
            "definitions": {
                "pairs": {
                    "oneOf": [
                        {
                            "type": "object",
                            "additionalProperties": {"type": "string"}
                        },
                        {
                            "type": "array",
                            "items": {
                                "type": "array",
                                "items": {"type": "string"},
                                "minItems": 2,
                                "maxItems": 2
                            }
                        }
                    ]
                },
                "options": {
                    "type": "object",
                    "required": ["target"],
                    "properties": {
                        "target": {"type": "string", "minLength": 1},
                        "secure": {"type": "boolean"},
                        "changeOrigin": {"type": "boolean"},
                        "logLevel": {
                            "type": "string",
                            "enum": ["trace", "debug", "info", "warn", "error", "silent"]
                        },
                        "pathRewrite": {"$ref": "#/definitions/pairs"},
                        "headers": {"$ref": "#/definitions/pairs"},
                        "headerOverrides": {"$ref": "#/definitions/pairs"}
                    }
                },
                "context": {
                    "oneOf": [
                        {"type": "string", "minLength": 1},
                        {
                            "type": "array",
                            "items": {"type": "string", "minLength": 1},
                            "minItems": 1
                        }
                    ]
                }
            },
            "oneOf": [
                {
                    "type": "object",
                    "additionalProperties": {"$ref": "#/definitions/options"}
                },
                {
                    "type": "array",
                    "items": {
                        "allOf": [
                            {"$ref": "#/definitions/options"},
                            {
                                "required": ["context"],
                                "properties": {
                                    "context": {"$ref": "#/definitions/context"}
                                }
                            }
                        ]
                    }
                }
            ]
        }"##;

        let schema_value: Value = serde_json::from_str(schema_str)
            .map_err(|e| SettingsError::SchemaCompileError {
                reason: format!("스키마 파싱 오류: {}", e)
            })?;

        let schema = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&schema_value)
            .map_err(|e| SettingsError::SchemaCompileError {
                reason: format!("스키마 컴파일 오류: {}", e)
            })?;

        debug!("JSON 스키마 컴파일 성공");
        Ok(Self { schema })
    }

    /// 스키마 위반 목록을 경로와 함께 돌려줍니다.
    pub fn validate(&self, value: &Value) -> std::result::Result<(), Vec<String>> {
        match self.schema.validate(value) {
            Ok(()) => Ok(()),
            Err(errors) => Err(errors
                .map(|error| format!("스키마 오류 (경로: {}): {}", error.instance_path, error))
                .collect()),
        }
    }
}
