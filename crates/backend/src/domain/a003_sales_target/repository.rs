use std::str::FromStr;

use chrono::Utc;
use contracts::domain::a001_seller::aggregate::SellerId;
use contracts::domain::a003_sales_target::aggregate::{SalesTarget, SalesTargetId};
use contracts::domain::common::{AggregateId, EntityMetadata};
use contracts::shared::month_key::MonthKey;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

mod sales_target {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "a003_sales_target")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub seller_id: String,
        /// `YYYY-MM-01`
        pub month: String,
        pub target_accounts: i64,
        /// Деньги хранятся строкой, чтобы не терять точность
        pub target_gross: String,
        pub target_cash_in: String,
        pub created_at: Option<chrono::DateTime<chrono::Utc>>,
        pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
        pub version: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

fn parse_money(field: &str, value: &str) -> anyhow::Result<Decimal> {
    Decimal::from_str(value)
        .map_err(|e| anyhow::anyhow!("a003_sales_target: invalid {} '{}': {}", field, value, e))
}

impl TryFrom<sales_target::Model> for SalesTarget {
    type Error = anyhow::Error;

    fn try_from(m: sales_target::Model) -> Result<Self, Self::Error> {
        let id = SalesTargetId::from_string(&m.id)
            .map_err(|e| anyhow::anyhow!("a003_sales_target: {}", e))?;
        let seller_id = SellerId::from_string(&m.seller_id)
            .map_err(|e| anyhow::anyhow!("a003_sales_target: {}", e))?;
        let month = MonthKey::parse(&m.month)
            .map_err(|e| anyhow::anyhow!("a003_sales_target: {}", e))?;

        Ok(SalesTarget {
            id,
            seller_id,
            month,
            target_accounts: m.target_accounts,
            target_gross: parse_money("target_gross", &m.target_gross)?,
            target_cash_in: parse_money("target_cash_in", &m.target_cash_in)?,
            metadata: EntityMetadata {
                created_at: m.created_at.unwrap_or_else(Utc::now),
                updated_at: m.updated_at.unwrap_or_else(Utc::now),
                is_deleted: false,
                version: m.version,
            },
        })
    }
}

/// План продавца на месяц
pub async fn find(
    db: &DatabaseConnection,
    seller_id: &SellerId,
    month: MonthKey,
) -> anyhow::Result<Option<SalesTarget>> {
    sales_target::Entity::find()
        .filter(sales_target::Column::SellerId.eq(seller_id.as_string()))
        .filter(sales_target::Column::Month.eq(month.to_string()))
        .one(db)
        .await?
        .map(SalesTarget::try_from)
        .transpose()
}

/// Все планы на месяц
pub async fn list_by_month(
    db: &DatabaseConnection,
    month: MonthKey,
) -> anyhow::Result<Vec<SalesTarget>> {
    sales_target::Entity::find()
        .filter(sales_target::Column::Month.eq(month.to_string()))
        .order_by_asc(sales_target::Column::SellerId)
        .all(db)
        .await?
        .into_iter()
        .map(SalesTarget::try_from)
        .collect()
}

/// Записать план. Существующий план на тот же (продавец, месяц) перезаписывается,
/// его версия увеличивается на единицу.
pub async fn upsert(db: &DatabaseConnection, t: &SalesTarget) -> anyhow::Result<()> {
    let active_model = sales_target::ActiveModel {
        id: Set(t.id.as_string()),
        seller_id: Set(t.seller_id.as_string()),
        month: Set(t.month.to_string()),
        target_accounts: Set(t.target_accounts),
        target_gross: Set(t.target_gross.to_string()),
        target_cash_in: Set(t.target_cash_in.to_string()),
        created_at: Set(Some(t.metadata.created_at)),
        updated_at: Set(Some(t.metadata.updated_at)),
        version: Set(t.metadata.version),
    };

    sales_target::Entity::insert(active_model)
        .on_conflict(
            OnConflict::columns([sales_target::Column::SellerId, sales_target::Column::Month])
                .update_columns([
                    sales_target::Column::TargetAccounts,
                    sales_target::Column::TargetGross,
                    sales_target::Column::TargetCashIn,
                    sales_target::Column::UpdatedAt,
                ])
                .value(
                    sales_target::Column::Version,
                    Expr::col((sales_target::Entity, sales_target::Column::Version)).add(1),
                )
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// Удалить план. `false`, если такого плана нет.
pub async fn delete_by_id(db: &DatabaseConnection, id: &SalesTargetId) -> anyhow::Result<bool> {
    let result = sales_target::Entity::delete_by_id(id.as_string()).exec(db).await?;
    Ok(result.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_in_memory;

    fn march() -> MonthKey {
        MonthKey::new(2024, 3).unwrap()
    }

    #[tokio::test]
    async fn test_second_upsert_overwrites_existing_target() {
        let db = connect_in_memory().await;
        let seller = SellerId::new_v4();

        let first = SalesTarget::new_for_insert(
            seller,
            march(),
            10,
            Decimal::from(10000),
            Decimal::from(8000),
        );
        upsert(&db, &first).await.unwrap();

        let second = SalesTarget::new_for_insert(
            seller,
            march(),
            12,
            Decimal::new(1250050, 2),
            Decimal::from(9000),
        );
        upsert(&db, &second).await.unwrap();

        let rows = list_by_month(&db, march()).await.unwrap();
        assert_eq!(rows.len(), 1);

        let stored = find(&db, &seller, march()).await.unwrap().unwrap();
        assert_eq!(stored.id, first.id);
        assert_eq!(stored.target_accounts, 12);
        assert_eq!(stored.target_gross, Decimal::new(1250050, 2));
        assert_eq!(stored.target_cash_in, Decimal::from(9000));
        assert_eq!(stored.metadata.version, first.metadata.version + 1);
    }

    #[tokio::test]
    async fn test_each_overwrite_bumps_version() {
        let db = connect_in_memory().await;
        let seller = SellerId::new_v4();
        let initial = SalesTarget::new_for_insert(seller, march(), 1, Decimal::ONE, Decimal::ONE);
        upsert(&db, &initial).await.unwrap();
        assert_eq!(
            find(&db, &seller, march()).await.unwrap().unwrap().metadata.version,
            initial.metadata.version
        );

        for accounts in 2..=4 {
            let next =
                SalesTarget::new_for_insert(seller, march(), accounts, Decimal::ONE, Decimal::ONE);
            upsert(&db, &next).await.unwrap();
        }

        let stored = find(&db, &seller, march()).await.unwrap().unwrap();
        assert_eq!(stored.target_accounts, 4);
        assert_eq!(stored.metadata.version, initial.metadata.version + 3);
    }

    #[tokio::test]
    async fn test_find_is_scoped_to_month() {
        let db = connect_in_memory().await;
        let seller = SellerId::new_v4();
        let target = SalesTarget::new_for_insert(seller, march(), 5, Decimal::ZERO, Decimal::ZERO);
        upsert(&db, &target).await.unwrap();

        let april = MonthKey::new(2024, 4).unwrap();
        assert!(find(&db, &seller, april).await.unwrap().is_none());
        assert!(find(&db, &seller, march()).await.unwrap().is_some());

        assert!(delete_by_id(&db, &target.id).await.unwrap());
        assert!(!delete_by_id(&db, &target.id).await.unwrap());
        assert!(find(&db, &seller, march()).await.unwrap().is_none());
    }
}
