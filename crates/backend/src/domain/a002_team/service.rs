use super::repository;
use chrono::Utc;
use contracts::domain::a001_seller::aggregate::SellerId;
use contracts::domain::a002_team::aggregate::{Team, TeamDto, TeamId, TeamMemberDto, TeamMembership};
use contracts::domain::common::AggregateId;
use uuid::Uuid;

use crate::domain::a001_seller;
use crate::shared::data::db::get_connection;
use crate::shared::logger;

fn parse_team_id(id: &str) -> anyhow::Result<TeamId> {
    TeamId::from_string(id).map_err(|e| anyhow::anyhow!("Invalid team ID: {}", e))
}

fn parse_seller_id(id: &str) -> anyhow::Result<SellerId> {
    SellerId::from_string(id).map_err(|e| anyhow::anyhow!("Invalid seller ID: {}", e))
}

/// Создание новой команды
pub async fn create(dto: TeamDto) -> anyhow::Result<Uuid> {
    let db = get_connection();

    let code = dto
        .code
        .clone()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| format!("TEAM-{}", &Uuid::new_v4().to_string()[..8].to_uppercase()));

    let lead_id = match dto.lead_id.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(raw) => {
            let lead_id = parse_seller_id(raw)?;
            if a001_seller::repository::find_by_id(db, &lead_id).await?.is_none() {
                return Err(anyhow::anyhow!("Validation failed: lead {} not found", raw));
            }
            Some(lead_id)
        }
        None => None,
    };

    let mut team = Team::new_for_insert(code, dto.name, lead_id);
    team.base.comment = dto.comment;

    team.validate()
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;

    team.before_write();

    repository::insert(db, &team).await?;

    logger::log("a002_team", &format!("Создана команда {}", team.name()));

    Ok(team.base.id.value())
}

/// Получить все команды
pub async fn list_all() -> anyhow::Result<Vec<Team>> {
    repository::list_all(get_connection()).await
}

/// Активировать/деактивировать команду. `false`, если команда не найдена.
pub async fn set_active(id: &str, is_active: bool) -> anyhow::Result<bool> {
    let team_id = parse_team_id(id)?;
    let updated = repository::set_active(get_connection(), &team_id, is_active).await?;
    if updated {
        let state = if is_active { "активирована" } else { "деактивирована" };
        logger::log("a002_team", &format!("Команда {} {}", team_id, state));
    }
    Ok(updated)
}

/// Добавить продавца в команду. Продавец состоит только в одной команде,
/// поэтому прежние активные членства закрываются.
///
/// Возвращает `None`, если команда или продавец не найдены.
pub async fn add_member(team_id: &str, dto: TeamMemberDto) -> anyhow::Result<Option<Uuid>> {
    let db = get_connection();
    let team_id = parse_team_id(team_id)?;
    let seller_id = parse_seller_id(&dto.seller_id)?;

    if repository::find_by_id(db, &team_id).await?.is_none() {
        return Ok(None);
    }
    if a001_seller::repository::find_by_id(db, &seller_id).await?.is_none() {
        return Ok(None);
    }

    let membership = TeamMembership::new_for_insert(
        team_id,
        seller_id,
        dto.joined_at.unwrap_or_else(Utc::now),
    );
    let closed = repository::transfer_member(db, &membership).await?;

    logger::log(
        "a002_team",
        &format!(
            "Продавец {} добавлен в команду {} (закрыто прежних членств: {})",
            seller_id, team_id, closed
        ),
    );

    Ok(Some(membership.id))
}

/// Исключить продавца из команды. Возвращает число закрытых строк членства.
///
/// Исключение из текущей команды закрывает и устаревшие строки других
/// команд, чтобы продавец не вернулся в прежнюю команду.
pub async fn remove_member(team_id: &str, seller_id: &str) -> anyhow::Result<u64> {
    let team_id = parse_team_id(team_id)?;
    let seller_id = parse_seller_id(seller_id)?;

    let closed = repository::remove_member(get_connection(), &team_id, &seller_id).await?;
    if closed > 0 {
        logger::log(
            "a002_team",
            &format!("Продавец {} исключён из команды {}", seller_id, team_id),
        );
    }
    Ok(closed)
}

/// Текущий состав команды (после устранения дублей членства)
pub async fn list_members(team_id: &str) -> anyhow::Result<Vec<TeamMembership>> {
    let team_id = parse_team_id(team_id)?;
    let rows = repository::list_active_memberships(get_connection()).await?;
    Ok(contracts::domain::a002_team::aggregate::current_memberships(rows)
        .into_iter()
        .filter(|m| m.team_id == team_id)
        .collect())
}
