use serde::{Deserialize, Serialize};

/// Запись журнала бизнес-событий
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: i64,
    pub timestamp: String,
    pub source: String, // "server" или "admin"
    pub category: String,
    pub message: String,
}
