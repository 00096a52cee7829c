// Aggregate handlers (a001-a004)
pub mod a001_seller;
pub mod a002_team;
pub mod a003_sales_target;
pub mod a004_sales_disposition;

// Dashboard handlers
pub mod d410_sales_performance;

pub mod logs;

/// Ошибки разбора id и валидации сервисы возвращают с префиксами
/// "Invalid ..." и "Validation failed: ...": это 400, а не 500.
pub(crate) fn is_client_error(e: &anyhow::Error) -> bool {
    let msg = e.to_string();
    msg.starts_with("Validation failed") || msg.starts_with("Invalid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_detection() {
        assert!(is_client_error(&anyhow::anyhow!("Validation failed: empty name")));
        assert!(is_client_error(&anyhow::anyhow!("Invalid seller ID: bad")));
        assert!(!is_client_error(&anyhow::anyhow!("database is locked")));
    }
}
