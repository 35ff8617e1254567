/// 라우트 규칙을 구성하는 중에 발생하는 에러입니다.
///
/// 모두 설정 로드 시점의 에러이며 요청 처리 중에는 발생하지 않습니다.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum RoutingError {
    /// 잘못된 경로 패턴
    #[error("잘못된 경로 패턴: {pattern} ({reason})")]
    InvalidPathPattern {
        pattern: String,
        reason: String,
    },

    /// 컴파일할 수 없는 pathRewrite 정규식
    #[error("잘못된 pathRewrite 정규식 {pattern}: {reason}")]
    InvalidRewrite {
        pattern: String,
        reason: String,
    },

    /// 해석할 수 없는 타겟 URL
    #[error("유효하지 않은 타겟 {target}: {reason}")]
    InvalidTarget {
        target: String,
        reason: String,
    },

    /// 헤더 이름 또는 값이 유효하지 않음
    #[error("유효하지 않은 헤더 {name}: {reason}")]
    InvalidHeader {
        name: String,
        reason: String,
    },
}
