use super::repository;
use chrono::Utc;
use contracts::domain::a001_seller::aggregate::SellerId;
use contracts::domain::a004_sales_disposition::aggregate::{SalesDisposition, SalesDispositionDto};
use contracts::domain::common::AggregateId;
use contracts::shared::month_key::MonthKey;
use uuid::Uuid;

use crate::domain::a001_seller;
use crate::shared::data::db::get_connection;
use crate::shared::logger;

/// Зарегистрировать сделку. `None`, если продавец не найден.
pub async fn create(dto: SalesDispositionDto) -> anyhow::Result<Option<Uuid>> {
    let db = get_connection();

    let seller_id = SellerId::from_string(&dto.seller_id)
        .map_err(|e| anyhow::anyhow!("Invalid seller ID: {}", e))?;

    if a001_seller::repository::find_by_id(db, &seller_id).await?.is_none() {
        return Ok(None);
    }

    let disposition = SalesDisposition::new_for_insert(
        seller_id,
        dto.source,
        dto.client_name.filter(|c| !c.trim().is_empty()),
        dto.gross_value,
        dto.cash_in,
        dto.created_at.unwrap_or_else(Utc::now),
    );

    disposition
        .validate()
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;

    repository::insert(db, &disposition).await?;

    logger::log(
        "a004_sales_disposition",
        &format!(
            "Сделка {} ({}): сумма {}, поступило {}",
            seller_id,
            disposition.source.as_str(),
            disposition.gross_value,
            disposition.cash_in
        ),
    );

    Ok(Some(disposition.id.value()))
}

/// Сделки продавца за месяц
pub async fn list(seller_id: &str, month: &str) -> anyhow::Result<Vec<SalesDisposition>> {
    let seller_id = SellerId::from_string(seller_id)
        .map_err(|e| anyhow::anyhow!("Invalid seller ID: {}", e))?;
    let month = MonthKey::parse(month).map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;
    repository::list_by_seller_and_month(get_connection(), &seller_id, month).await
}
