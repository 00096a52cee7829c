use chrono::Utc;
use contracts::domain::a001_seller::aggregate::{Seller, SellerId};
use contracts::domain::common::{AggregateId, BaseAggregate, EntityMetadata};
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

mod seller {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "a001_seller")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub code: String,
        pub description: String,
        pub comment: Option<String>,
        pub department: String,
        pub is_active: bool,
        pub is_deleted: bool,
        pub created_at: Option<chrono::DateTime<chrono::Utc>>,
        pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
        pub version: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

impl TryFrom<seller::Model> for Seller {
    type Error = anyhow::Error;

    fn try_from(m: seller::Model) -> Result<Self, Self::Error> {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id)
            .map_err(|e| anyhow::anyhow!("a001_seller: invalid id '{}': {}", m.id, e))?;

        Ok(Seller {
            base: BaseAggregate::with_metadata(
                SellerId(uuid),
                m.code,
                m.description,
                m.comment,
                metadata,
            ),
            department: m.department,
            is_active: m.is_active,
        })
    }
}

fn into_sellers(models: Vec<seller::Model>) -> anyhow::Result<Vec<Seller>> {
    models.into_iter().map(Seller::try_from).collect()
}

// ============================================================================
// Repository functions
// ============================================================================

/// Все продавцы (по имени)
pub async fn list_all(db: &DatabaseConnection) -> anyhow::Result<Vec<Seller>> {
    let models = seller::Entity::find()
        .filter(seller::Column::IsDeleted.eq(false))
        .order_by_asc(seller::Column::Description)
        .order_by_asc(seller::Column::Id)
        .all(db)
        .await?;
    into_sellers(models)
}

/// Активные продавцы отдела, упорядоченные по имени, затем по id
pub async fn list_by_department(
    db: &DatabaseConnection,
    department: &str,
) -> anyhow::Result<Vec<Seller>> {
    let models = seller::Entity::find()
        .filter(seller::Column::IsDeleted.eq(false))
        .filter(seller::Column::IsActive.eq(true))
        .filter(seller::Column::Department.eq(department))
        .order_by_asc(seller::Column::Description)
        .order_by_asc(seller::Column::Id)
        .all(db)
        .await?;
    into_sellers(models)
}

/// Активные продавцы из списка id, упорядоченные по имени, затем по id
pub async fn list_active_by_ids(
    db: &DatabaseConnection,
    ids: &[SellerId],
) -> anyhow::Result<Vec<Seller>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<String> = ids.iter().map(|id| id.as_string()).collect();
    let models = seller::Entity::find()
        .filter(seller::Column::IsDeleted.eq(false))
        .filter(seller::Column::IsActive.eq(true))
        .filter(seller::Column::Id.is_in(ids))
        .order_by_asc(seller::Column::Description)
        .order_by_asc(seller::Column::Id)
        .all(db)
        .await?;
    into_sellers(models)
}

/// Найти продавца по ID (удалённые не возвращаются)
pub async fn find_by_id(db: &DatabaseConnection, id: &SellerId) -> anyhow::Result<Option<Seller>> {
    let model = seller::Entity::find_by_id(id.as_string())
        .filter(seller::Column::IsDeleted.eq(false))
        .one(db)
        .await?;
    model.map(Seller::try_from).transpose()
}

/// Вставить нового продавца
pub async fn insert(db: &DatabaseConnection, s: &Seller) -> anyhow::Result<()> {
    let active_model = seller::ActiveModel {
        id: Set(s.base.id.as_string()),
        code: Set(s.base.code.clone()),
        description: Set(s.base.description.clone()),
        comment: Set(s.base.comment.clone()),
        department: Set(s.department.clone()),
        is_active: Set(s.is_active),
        is_deleted: Set(false),
        created_at: Set(Some(s.base.metadata.created_at)),
        updated_at: Set(Some(s.base.metadata.updated_at)),
        version: Set(s.base.metadata.version),
    };

    active_model.insert(db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_in_memory;

    async fn seed(db: &DatabaseConnection, name: &str, department: &str) -> Seller {
        let s = Seller::new_for_insert(
            format!("SLR-{}", name),
            name.to_string(),
            department.to_string(),
        );
        insert(db, &s).await.unwrap();
        s
    }

    #[tokio::test]
    async fn test_department_listing_is_ordered_and_filtered() {
        let db = connect_in_memory().await;
        seed(&db, "Viktor", "Sales").await;
        seed(&db, "Anna", "Sales").await;
        seed(&db, "Olga", "Upsell").await;

        let mut retired = Seller::new_for_insert("SLR-X".into(), "Boris".into(), "Sales".into());
        retired.is_active = false;
        insert(&db, &retired).await.unwrap();

        let sales = list_by_department(&db, "Sales").await.unwrap();
        let names: Vec<&str> = sales.iter().map(|s| s.display_name()).collect();
        assert_eq!(names, vec!["Anna", "Viktor"]);

        assert!(list_by_department(&db, "Support").await.unwrap().is_empty());
        assert_eq!(list_all(&db).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let db = connect_in_memory().await;
        let anna = seed(&db, "Anna", "Sales").await;

        let found = find_by_id(&db, &anna.id()).await.unwrap().unwrap();
        assert_eq!(found.display_name(), "Anna");
        assert_eq!(found.department, "Sales");

        assert!(find_by_id(&db, &SellerId::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_active_by_ids() {
        let db = connect_in_memory().await;
        let anna = seed(&db, "Anna", "Sales").await;
        let olga = seed(&db, "Olga", "Upsell").await;
        seed(&db, "Viktor", "Sales").await;

        let sellers = list_active_by_ids(&db, &[olga.id(), anna.id(), SellerId::new_v4()])
            .await
            .unwrap();
        let names: Vec<&str> = sellers.iter().map(|s| s.display_name()).collect();
        assert_eq!(names, vec!["Anna", "Olga"]);

        assert!(list_active_by_ids(&db, &[]).await.unwrap().is_empty());
    }
}
