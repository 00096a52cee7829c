pub mod logger;
pub mod month_key;
