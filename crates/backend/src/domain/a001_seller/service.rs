use super::repository;
use contracts::domain::a001_seller::aggregate::{Seller, SellerDto, SellerId};
use contracts::domain::common::AggregateId;
use uuid::Uuid;

use crate::shared::data::db::get_connection;
use crate::shared::logger;

/// Создание нового продавца
pub async fn create(dto: SellerDto) -> anyhow::Result<Uuid> {
    let code = dto
        .code
        .clone()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| format!("SLR-{}", &Uuid::new_v4().to_string()[..8].to_uppercase()));

    let mut seller = Seller::new_for_insert(code, dto.display_name, dto.department);
    seller.base.comment = dto.comment;

    seller
        .validate()
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;

    seller.before_write();

    repository::insert(get_connection(), &seller).await?;

    logger::log(
        "a001_seller",
        &format!("Создан продавец {} ({})", seller.display_name(), seller.department),
    );

    Ok(seller.base.id.value())
}

/// Получить продавца по ID
pub async fn get_by_id(id: &str) -> anyhow::Result<Option<Seller>> {
    let seller_id = SellerId::from_string(id)
        .map_err(|e| anyhow::anyhow!("Invalid seller ID: {}", e))?;
    repository::find_by_id(get_connection(), &seller_id).await
}

/// Получить всех продавцов
pub async fn list_all() -> anyhow::Result<Vec<Seller>> {
    repository::list_all(get_connection()).await
}
