pub mod repository;

use repository::log_event_internal;

/// Записать бизнес-событие в журнал (`system_log`)
///
/// # Примеры
/// ```ignore
/// logger::log("a003_sales_target", "План на 2024-03-01 обновлён");
/// ```
pub fn log(category: &str, message: &str) {
    log_event_internal("server", category, message);
}
