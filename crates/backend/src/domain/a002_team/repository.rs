use chrono::Utc;
use contracts::domain::a001_seller::aggregate::SellerId;
use contracts::domain::a002_team::aggregate::{current_memberships, Team, TeamId, TeamMembership};
use contracts::domain::common::{AggregateId, BaseAggregate, EntityMetadata};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

mod team {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "a002_team")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub code: String,
        pub description: String,
        pub comment: Option<String>,
        pub lead_id: Option<String>,
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

mod team_member {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "a002_team_member")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub team_id: String,
        pub seller_id: String,
        pub joined_at: chrono::DateTime<chrono::Utc>,
        pub is_active: bool,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

fn parse_uuid(table: &str, value: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| anyhow::anyhow!("{}: invalid id '{}': {}", table, value, e))
}

impl TryFrom<team::Model> for Team {
    type Error = anyhow::Error;

    fn try_from(m: team::Model) -> Result<Self, Self::Error> {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };
        let id = parse_uuid("a002_team", &m.id)?;
        let lead_id = m
            .lead_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| parse_uuid("a002_team", s).map(SellerId))
            .transpose()?;

        Ok(Team {
            base: BaseAggregate::with_metadata(
                TeamId(id),
                m.code,
                m.description,
                m.comment,
                metadata,
            ),
            lead_id,
            is_active: m.is_active,
        })
    }
}

impl TryFrom<team_member::Model> for TeamMembership {
    type Error = anyhow::Error;

    fn try_from(m: team_member::Model) -> Result<Self, Self::Error> {
        Ok(TeamMembership {
            id: parse_uuid("a002_team_member", &m.id)?,
            team_id: TeamId(parse_uuid("a002_team_member", &m.team_id)?),
            seller_id: SellerId(parse_uuid("a002_team_member", &m.seller_id)?),
            joined_at: m.joined_at,
            is_active: m.is_active,
        })
    }
}

// ============================================================================
// Teams
// ============================================================================

/// Все команды (по названию)
pub async fn list_all(db: &DatabaseConnection) -> anyhow::Result<Vec<Team>> {
    team::Entity::find()
        .filter(team::Column::IsDeleted.eq(false))
        .order_by_asc(team::Column::Description)
        .order_by_asc(team::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(Team::try_from)
        .collect()
}

/// Активные команды (по названию)
pub async fn list_active(db: &DatabaseConnection) -> anyhow::Result<Vec<Team>> {
    team::Entity::find()
        .filter(team::Column::IsDeleted.eq(false))
        .filter(team::Column::IsActive.eq(true))
        .order_by_asc(team::Column::Description)
        .order_by_asc(team::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(Team::try_from)
        .collect()
}

/// Найти команду по ID
pub async fn find_by_id(db: &DatabaseConnection, id: &TeamId) -> anyhow::Result<Option<Team>> {
    team::Entity::find_by_id(id.as_string())
        .filter(team::Column::IsDeleted.eq(false))
        .one(db)
        .await?
        .map(Team::try_from)
        .transpose()
}

/// Вставить новую команду
pub async fn insert(db: &DatabaseConnection, t: &Team) -> anyhow::Result<()> {
    let active_model = team::ActiveModel {
        id: Set(t.base.id.as_string()),
        code: Set(t.base.code.clone()),
        description: Set(t.base.description.clone()),
        comment: Set(t.base.comment.clone()),
        lead_id: Set(t.lead_id.map(|id| id.as_string())),
        is_active: Set(t.is_active),
        is_deleted: Set(false),
        created_at: Set(Some(t.base.metadata.created_at)),
        updated_at: Set(Some(t.base.metadata.updated_at)),
        version: Set(t.base.metadata.version),
    };

    active_model.insert(db).await?;
    Ok(())
}

/// Мягкая активация/деактивация команды. Возвращает `false`, если команды нет.
pub async fn set_active(
    db: &DatabaseConnection,
    id: &TeamId,
    is_active: bool,
) -> anyhow::Result<bool> {
    let result = team::Entity::update_many()
        .col_expr(team::Column::IsActive, Expr::value(is_active))
        .col_expr(team::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(team::Column::Id.eq(id.as_string()))
        .filter(team::Column::IsDeleted.eq(false))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

// ============================================================================
// Memberships
// ============================================================================

/// Добавить строку членства
pub async fn insert_membership(db: &DatabaseConnection, m: &TeamMembership) -> anyhow::Result<()> {
    let active_model = team_member::ActiveModel {
        id: Set(m.id.to_string()),
        team_id: Set(m.team_id.as_string()),
        seller_id: Set(m.seller_id.as_string()),
        joined_at: Set(m.joined_at),
        is_active: Set(m.is_active),
    };

    active_model.insert(db).await?;
    Ok(())
}

/// Закрыть все активные членства продавца в команде
pub async fn deactivate_membership(
    db: &DatabaseConnection,
    team_id: &TeamId,
    seller_id: &SellerId,
) -> anyhow::Result<u64> {
    let result = team_member::Entity::update_many()
        .col_expr(team_member::Column::IsActive, Expr::value(false))
        .filter(team_member::Column::TeamId.eq(team_id.as_string()))
        .filter(team_member::Column::SellerId.eq(seller_id.as_string()))
        .filter(team_member::Column::IsActive.eq(true))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Закрыть все активные членства продавца во всех командах
async fn deactivate_all_memberships(
    db: &DatabaseConnection,
    seller_id: &SellerId,
) -> anyhow::Result<u64> {
    let result = team_member::Entity::update_many()
        .col_expr(team_member::Column::IsActive, Expr::value(false))
        .filter(team_member::Column::SellerId.eq(seller_id.as_string()))
        .filter(team_member::Column::IsActive.eq(true))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Активные строки членства одного продавца
async fn list_active_memberships_of_seller(
    db: &DatabaseConnection,
    seller_id: &SellerId,
) -> anyhow::Result<Vec<TeamMembership>> {
    team_member::Entity::find()
        .filter(team_member::Column::SellerId.eq(seller_id.as_string()))
        .filter(team_member::Column::IsActive.eq(true))
        .all(db)
        .await?
        .into_iter()
        .map(TeamMembership::try_from)
        .collect()
}

/// Перевести продавца в команду: прежние активные членства закрываются,
/// затем добавляется новая строка. Возвращает число закрытых строк.
pub async fn transfer_member(db: &DatabaseConnection, m: &TeamMembership) -> anyhow::Result<u64> {
    let closed = deactivate_all_memberships(db, &m.seller_id).await?;
    insert_membership(db, m).await?;
    Ok(closed)
}

/// Исключить продавца из команды.
///
/// Если это его текущая команда, закрываются все активные строки продавца,
/// иначе после исключения снова стала бы текущей более старая строка другой
/// команды. Для нетекущей команды закрываются только её строки.
pub async fn remove_member(
    db: &DatabaseConnection,
    team_id: &TeamId,
    seller_id: &SellerId,
) -> anyhow::Result<u64> {
    let rows = list_active_memberships_of_seller(db, seller_id).await?;
    let is_current = current_memberships(rows)
        .first()
        .is_some_and(|m| m.team_id == *team_id);

    if is_current {
        deactivate_all_memberships(db, seller_id).await
    } else {
        deactivate_membership(db, team_id, seller_id).await
    }
}

/// Все активные строки членства всех продавцов, как есть (с возможными дублями)
pub async fn list_active_memberships(
    db: &DatabaseConnection,
) -> anyhow::Result<Vec<TeamMembership>> {
    team_member::Entity::find()
        .filter(team_member::Column::IsActive.eq(true))
        .order_by_asc(team_member::Column::JoinedAt)
        .order_by_asc(team_member::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(TeamMembership::try_from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_in_memory;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_team_roundtrip_and_soft_deactivation() {
        let db = connect_in_memory().await;
        let lead = SellerId::new_v4();
        let north = Team::new_for_insert("T-N".into(), "North".into(), Some(lead));
        let south = Team::new_for_insert("T-S".into(), "South".into(), None);
        insert(&db, &north).await.unwrap();
        insert(&db, &south).await.unwrap();

        let found = find_by_id(&db, &north.id()).await.unwrap().unwrap();
        assert_eq!(found.name(), "North");
        assert_eq!(found.lead_id, Some(lead));

        assert!(set_active(&db, &south.id(), false).await.unwrap());
        assert!(!set_active(&db, &TeamId::new_v4(), false).await.unwrap());

        let active: Vec<String> = list_active(&db)
            .await
            .unwrap()
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(active, vec!["North"]);
        assert_eq!(list_all(&db).await.unwrap().len(), 2);

        let south = find_by_id(&db, &south.id()).await.unwrap().unwrap();
        assert!(!south.is_active);
    }

    #[tokio::test]
    async fn test_duplicate_memberships_are_returned_raw() {
        let db = connect_in_memory().await;
        let team = TeamId::new_v4();
        let seller = SellerId::new_v4();

        let first = TeamMembership::new_for_insert(team, seller, at(1));
        let second = TeamMembership::new_for_insert(team, seller, at(2));
        insert_membership(&db, &first).await.unwrap();
        insert_membership(&db, &second).await.unwrap();

        let rows = list_active_memberships(&db).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, first.id);
        assert_eq!(rows[1].joined_at, second.joined_at);

        assert_eq!(deactivate_membership(&db, &team, &seller).await.unwrap(), 2);
        assert!(list_active_memberships(&db).await.unwrap().is_empty());
    }

    fn at(month: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, month, 1, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_transfer_closes_previous_team() {
        let db = connect_in_memory().await;
        let north = TeamId::new_v4();
        let south = TeamId::new_v4();
        let seller = SellerId::new_v4();

        let first = TeamMembership::new_for_insert(north, seller, at(1));
        assert_eq!(transfer_member(&db, &first).await.unwrap(), 0);
        let second = TeamMembership::new_for_insert(south, seller, at(2));
        assert_eq!(transfer_member(&db, &second).await.unwrap(), 1);

        let rows = list_active_memberships(&db).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].team_id, south);
    }

    #[tokio::test]
    async fn test_removing_from_current_team_does_not_revive_older_team() {
        let db = connect_in_memory().await;
        let north = TeamId::new_v4();
        let south = TeamId::new_v4();
        let seller = SellerId::new_v4();

        // Строки, оставшиеся без закрытия прежнего членства
        let stale = TeamMembership::new_for_insert(north, seller, at(1));
        let latest = TeamMembership::new_for_insert(south, seller, at(2));
        insert_membership(&db, &stale).await.unwrap();
        insert_membership(&db, &latest).await.unwrap();

        assert_eq!(remove_member(&db, &south, &seller).await.unwrap(), 2);

        let current = current_memberships(list_active_memberships(&db).await.unwrap());
        assert!(current.iter().all(|m| m.team_id != north));
        assert!(current.is_empty());
    }

    #[tokio::test]
    async fn test_removing_from_stale_team_keeps_current_one() {
        let db = connect_in_memory().await;
        let north = TeamId::new_v4();
        let south = TeamId::new_v4();
        let seller = SellerId::new_v4();

        let stale = TeamMembership::new_for_insert(north, seller, at(1));
        let latest = TeamMembership::new_for_insert(south, seller, at(2));
        insert_membership(&db, &stale).await.unwrap();
        insert_membership(&db, &latest).await.unwrap();

        assert_eq!(remove_member(&db, &north, &seller).await.unwrap(), 1);

        let current = current_memberships(list_active_memberships(&db).await.unwrap());
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].team_id, south);
    }
}
