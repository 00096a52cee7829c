use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::a001_seller::aggregate::SellerId;
use crate::domain::common::{AggregateId, BaseAggregate};

crate::uuid_aggregate_id!(
    /// Уникальный идентификатор команды
    TeamId
);

// ============================================================================
// Aggregate Root
// ============================================================================

/// Команда продавцов
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    #[serde(flatten)]
    pub base: BaseAggregate<TeamId>,

    /// Руководитель команды (один из продавцов)
    pub lead_id: Option<SellerId>,

    /// Команды не удаляются, а деактивируются
    pub is_active: bool,
}

impl Team {
    /// Создать новую команду для вставки в БД
    pub fn new_for_insert(code: String, name: String, lead_id: Option<SellerId>) -> Self {
        Self {
            base: BaseAggregate::new(TeamId::new_v4(), code, name),
            lead_id,
            is_active: true,
        }
    }

    pub fn id(&self) -> TeamId {
        self.base.id
    }

    pub fn name(&self) -> &str {
        &self.base.description
    }

    /// Валидация данных
    pub fn validate(&self) -> Result<(), String> {
        if self.base.description.trim().is_empty() {
            return Err("Название команды не может быть пустым".into());
        }
        if self.base.code.trim().is_empty() {
            return Err("Код не может быть пустым".into());
        }
        Ok(())
    }

    /// Хук перед записью
    pub fn before_write(&mut self) {
        self.base.touch();
    }
}

// ============================================================================
// Membership
// ============================================================================

/// Строка членства продавца в команде.
///
/// Источник может содержать несколько активных строк для одного продавца
/// (переводы между командами без закрытия старой записи), поэтому текущий
/// состав всегда вычисляется через [`current_memberships`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMembership {
    pub id: Uuid,
    pub team_id: TeamId,
    pub seller_id: SellerId,
    pub joined_at: DateTime<Utc>,
    pub is_active: bool,
}

impl TeamMembership {
    pub fn new_for_insert(team_id: TeamId, seller_id: SellerId, joined_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            team_id,
            seller_id,
            joined_at,
            is_active: true,
        }
    }
}

/// Одно членство на продавца: самое позднее по `joined_at` среди активных,
/// при равенстве побеждает больший `id`. Результат упорядочен по `seller_id`,
/// поэтому не зависит от порядка входных строк.
pub fn current_memberships(rows: Vec<TeamMembership>) -> Vec<TeamMembership> {
    let mut latest: HashMap<SellerId, TeamMembership> = HashMap::new();

    for row in rows.into_iter().filter(|m| m.is_active) {
        match latest.get(&row.seller_id) {
            Some(existing) if (existing.joined_at, existing.id) >= (row.joined_at, row.id) => {}
            _ => {
                latest.insert(row.seller_id, row);
            }
        }
    }

    let mut result: Vec<TeamMembership> = latest.into_values().collect();
    result.sort_by_key(|m| m.seller_id);
    result
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// DTO для создания команды
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TeamDto {
    pub code: Option<String>,
    pub name: String,
    pub lead_id: Option<String>,
    pub comment: Option<String>,
}

/// DTO для добавления продавца в команду
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMemberDto {
    pub seller_id: String,
    /// По умолчанию текущий момент
    pub joined_at: Option<DateTime<Utc>>,
}

/// DTO для активации/деактивации команды
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamActiveDto {
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn membership(team: TeamId, seller: SellerId, day: u32, id: u128) -> TeamMembership {
        TeamMembership {
            id: Uuid::from_u128(id),
            team_id: team,
            seller_id: seller,
            joined_at: Utc.with_ymd_and_hms(2024, 1, day, 9, 0, 0).unwrap(),
            is_active: true,
        }
    }

    #[test]
    fn test_latest_membership_wins() {
        let north = TeamId::new_v4();
        let south = TeamId::new_v4();
        let seller = SellerId::new_v4();

        let rows = vec![
            membership(north, seller, 5, 1),
            membership(south, seller, 20, 2),
            membership(north, seller, 10, 3),
        ];

        let current = current_memberships(rows);
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].team_id, south);
    }

    #[test]
    fn test_same_join_time_breaks_tie_by_id_regardless_of_order() {
        let north = TeamId::new_v4();
        let south = TeamId::new_v4();
        let seller = SellerId::new_v4();

        let forward = vec![membership(north, seller, 7, 10), membership(south, seller, 7, 11)];
        let backward = vec![membership(south, seller, 7, 11), membership(north, seller, 7, 10)];

        assert_eq!(current_memberships(forward)[0].team_id, south);
        assert_eq!(current_memberships(backward)[0].team_id, south);
    }

    #[test]
    fn test_inactive_rows_are_ignored() {
        let north = TeamId::new_v4();
        let south = TeamId::new_v4();
        let seller = SellerId::new_v4();

        let mut closed = membership(south, seller, 25, 2);
        closed.is_active = false;

        let current = current_memberships(vec![membership(north, seller, 1, 1), closed]);
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].team_id, north);
    }

    #[test]
    fn test_team_validation() {
        assert!(Team::new_for_insert("T-1".into(), "North".into(), None).validate().is_ok());
        assert!(Team::new_for_insert("T-2".into(), " ".into(), None).validate().is_err());
    }
}
