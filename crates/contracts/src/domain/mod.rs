pub mod a001_seller;
pub mod a002_team;
pub mod a003_sales_target;
pub mod a004_sales_disposition;
pub mod common;
