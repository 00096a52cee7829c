use thiserror::Error;

/// Ошибки построения отчётов по выполнению плана
#[derive(Debug, Error)]
pub enum PerformanceError {
    /// Продавец, команда или область отчёта не существует
    #[error("not found: {0}")]
    NotFound(String),

    /// Некорректный ключ месяца или параметры запроса
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Ошибка хранилища; пробрасывается как есть, без повторов
    #[error("upstream failure: {0}")]
    UpstreamFailure(#[from] anyhow::Error),
}

pub type PerformanceResult<T> = Result<T, PerformanceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_upstream_failure_keeps_source() {
        let err: PerformanceError = anyhow::anyhow!("database is locked").into();
        assert!(matches!(err, PerformanceError::UpstreamFailure(_)));
        assert!(err.to_string().contains("database is locked"));
        assert!(err.source().is_some());
    }
}
