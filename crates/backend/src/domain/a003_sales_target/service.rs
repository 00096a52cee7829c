use super::repository;
use contracts::domain::a001_seller::aggregate::SellerId;
use contracts::domain::a003_sales_target::aggregate::{SalesTarget, SalesTargetDto, SalesTargetId};
use contracts::domain::common::AggregateId;
use contracts::shared::month_key::MonthKey;

use crate::domain::a001_seller;
use crate::shared::data::db::get_connection;
use crate::shared::logger;

/// Установить план продавца на месяц.
///
/// Возвращает сохранённый план или `None`, если продавец не найден.
pub async fn upsert(dto: SalesTargetDto) -> anyhow::Result<Option<SalesTarget>> {
    let db = get_connection();

    let seller_id = SellerId::from_string(&dto.seller_id)
        .map_err(|e| anyhow::anyhow!("Invalid seller ID: {}", e))?;
    let month = MonthKey::parse(&dto.month)
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;

    if a001_seller::repository::find_by_id(db, &seller_id).await?.is_none() {
        return Ok(None);
    }

    let mut target = SalesTarget::new_for_insert(
        seller_id,
        month,
        dto.target_accounts,
        dto.target_gross,
        dto.target_cash_in,
    );

    target
        .validate()
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;

    target.before_write();

    repository::upsert(db, &target).await?;

    logger::log(
        "a003_sales_target",
        &format!(
            "План {} на {}: сделок {}, сумма {}, поступления {}",
            seller_id,
            month.period(),
            target.target_accounts,
            target.target_gross,
            target.target_cash_in
        ),
    );

    repository::find(db, &seller_id, month).await
}

/// Все планы на месяц
pub async fn list_by_month(month: &str) -> anyhow::Result<Vec<SalesTarget>> {
    let month = MonthKey::parse(month).map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;
    repository::list_by_month(get_connection(), month).await
}

/// Удалить план
pub async fn delete(id: &str) -> anyhow::Result<bool> {
    let target_id = SalesTargetId::from_string(id)
        .map_err(|e| anyhow::anyhow!("Invalid target ID: {}", e))?;
    let deleted = repository::delete_by_id(get_connection(), &target_id).await?;
    if deleted {
        logger::log("a003_sales_target", &format!("План {} удалён", target_id));
    }
    Ok(deleted)
}
