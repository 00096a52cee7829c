use std::str::FromStr;

use contracts::domain::a001_seller::aggregate::SellerId;
use contracts::domain::a004_sales_disposition::aggregate::{
    RevenueSource, SalesDisposition, SalesDispositionId,
};
use contracts::domain::common::AggregateId;
use contracts::shared::month_key::MonthKey;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

mod sales_disposition {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "a004_sales_disposition")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub seller_id: String,
        pub source: String,
        pub client_name: Option<String>,
        pub gross_value: String,
        pub cash_in: String,
        pub remaining: String,
        pub created_at: chrono::DateTime<chrono::Utc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

fn parse_money(field: &str, value: &str) -> anyhow::Result<Decimal> {
    Decimal::from_str(value)
        .map_err(|e| {
            anyhow::anyhow!("a004_sales_disposition: invalid {} '{}': {}", field, value, e)
        })
}

impl TryFrom<sales_disposition::Model> for SalesDisposition {
    type Error = anyhow::Error;

    fn try_from(m: sales_disposition::Model) -> Result<Self, Self::Error> {
        let id = SalesDispositionId::from_string(&m.id)
            .map_err(|e| anyhow::anyhow!("a004_sales_disposition: {}", e))?;
        let seller_id = SellerId::from_string(&m.seller_id)
            .map_err(|e| anyhow::anyhow!("a004_sales_disposition: {}", e))?;
        let source = RevenueSource::from_str(&m.source).ok_or_else(|| {
            anyhow::anyhow!("a004_sales_disposition: unknown source '{}'", m.source)
        })?;

        Ok(SalesDisposition {
            id,
            seller_id,
            created_at: m.created_at,
            source,
            client_name: m.client_name,
            gross_value: parse_money("gross_value", &m.gross_value)?,
            cash_in: parse_money("cash_in", &m.cash_in)?,
            remaining: parse_money("remaining", &m.remaining)?,
        })
    }
}

/// Сделки продавца за месяц (по `created_at` в UTC), в порядке создания
pub async fn list_by_seller_and_month(
    db: &DatabaseConnection,
    seller_id: &SellerId,
    month: MonthKey,
) -> anyhow::Result<Vec<SalesDisposition>> {
    sales_disposition::Entity::find()
        .filter(sales_disposition::Column::SellerId.eq(seller_id.as_string()))
        .filter(Expr::cust_with_values(
            "substr(created_at, 1, 7) = ?",
            [month.period()],
        ))
        .order_by_asc(sales_disposition::Column::CreatedAt)
        .order_by_asc(sales_disposition::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(SalesDisposition::try_from)
        .collect()
}

/// Зарегистрировать сделку
pub async fn insert(db: &DatabaseConnection, d: &SalesDisposition) -> anyhow::Result<()> {
    let active_model = sales_disposition::ActiveModel {
        id: Set(d.id.as_string()),
        seller_id: Set(d.seller_id.as_string()),
        source: Set(d.source.as_str().to_string()),
        client_name: Set(d.client_name.clone()),
        gross_value: Set(d.gross_value.to_string()),
        cash_in: Set(d.cash_in.to_string()),
        remaining: Set(d.remaining.to_string()),
        created_at: Set(d.created_at),
    };

    active_model.insert(db).await?;
    Ok(())
}
