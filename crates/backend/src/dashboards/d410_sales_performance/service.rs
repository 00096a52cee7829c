use contracts::dashboards::d410_sales_performance::{
    LeaderboardQuery, PerformanceScope, PerformanceSummary, RankingQuery, RankingResponse,
    SellerRank, TeamLeaderboardResponse, TeamPerformanceSummary,
};
use contracts::domain::a001_seller::aggregate::SellerId;
use contracts::domain::a002_team::aggregate::TeamId;
use contracts::domain::common::AggregateId;
use contracts::shared::month_key::MonthKey;

use super::aggregator::{AggregatorSettings, PerformanceAggregator};
use super::error::{PerformanceError, PerformanceResult};
use super::repository::SqlPerformanceSource;
use crate::shared::config;
use crate::shared::data::db::get_connection;

fn aggregator() -> PerformanceAggregator<SqlPerformanceSource> {
    let performance = &config::get_config().performance;
    PerformanceAggregator::new(
        SqlPerformanceSource::new(get_connection().clone()),
        AggregatorSettings {
            completion_basis: performance.completion_basis,
            default_sort_key: performance.default_sort_key,
        },
    )
}

fn parse_month(raw: &str) -> PerformanceResult<MonthKey> {
    MonthKey::parse(raw.trim()).map_err(PerformanceError::InvalidInput)
}

fn parse_seller_id(raw: &str) -> PerformanceResult<SellerId> {
    SellerId::from_string(raw)
        .map_err(|e| PerformanceError::InvalidInput(format!("seller id: {}", e)))
}

fn parse_team_id(raw: &str) -> PerformanceResult<TeamId> {
    TeamId::from_string(raw).map_err(|e| PerformanceError::InvalidInput(format!("team id: {}", e)))
}

/// Ровно один из параметров `department` / `team_id`
fn parse_scope(query: &RankingQuery) -> PerformanceResult<PerformanceScope> {
    let department = query.department.as_deref().filter(|d| !d.trim().is_empty());
    let team_id = query.team_id.as_deref().filter(|t| !t.trim().is_empty());

    match (department, team_id) {
        (Some(department), None) => Ok(PerformanceScope::Department(department.to_string())),
        (None, Some(team_id)) => Ok(PerformanceScope::Team(parse_team_id(team_id)?)),
        (Some(_), Some(_)) => Err(PerformanceError::InvalidInput(
            "specify either department or team_id, not both".to_string(),
        )),
        (None, None) => Err(PerformanceError::InvalidInput(
            "department or team_id is required".to_string(),
        )),
    }
}

/// Итоги продавца за месяц
pub async fn get_seller_summary(
    seller_id: &str,
    month: &str,
) -> PerformanceResult<PerformanceSummary> {
    let seller_id = parse_seller_id(seller_id)?;
    let month = parse_month(month)?;
    aggregator().seller_summary(&seller_id, month).await
}

/// Итоги команды за месяц
pub async fn get_team_summary(
    team_id: &str,
    month: &str,
) -> PerformanceResult<TeamPerformanceSummary> {
    let team_id = parse_team_id(team_id)?;
    let month = parse_month(month)?;
    aggregator().team_summary(&team_id, month).await
}

/// Рейтинг продавцов отдела или команды
pub async fn get_ranking(query: RankingQuery) -> PerformanceResult<RankingResponse> {
    let month = parse_month(&query.month)?;
    let scope = parse_scope(&query)?;
    let aggregator = aggregator();
    let sort_key = query.sort_key.unwrap_or(aggregator.settings().default_sort_key);

    let rows = aggregator.ranked_sellers(&scope, month, sort_key).await?;
    tracing::debug!("Ranking {:?} for {}: {} rows", scope, month.period(), rows.len());

    Ok(RankingResponse {
        month,
        scope,
        sort_key,
        rows,
    })
}

/// Место продавца в рейтинге
pub async fn get_seller_rank(
    seller_id: &str,
    query: RankingQuery,
) -> PerformanceResult<SellerRank> {
    let seller_id = parse_seller_id(seller_id)?;
    let month = parse_month(&query.month)?;
    let scope = parse_scope(&query)?;
    let aggregator = aggregator();
    let sort_key = query.sort_key.unwrap_or(aggregator.settings().default_sort_key);

    aggregator.seller_rank(&seller_id, &scope, month, sort_key).await
}

/// Рейтинг команд (пустые команды не показываются)
pub async fn get_team_leaderboard(
    query: LeaderboardQuery,
) -> PerformanceResult<TeamLeaderboardResponse> {
    let month = parse_month(&query.month)?;
    let aggregator = aggregator();
    let sort_key = query.sort_key.unwrap_or(aggregator.settings().default_sort_key);

    let teams = aggregator.team_leaderboard(month, sort_key).await?;
    Ok(TeamLeaderboardResponse {
        month,
        sort_key,
        teams,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(department: Option<&str>, team_id: Option<&str>) -> RankingQuery {
        RankingQuery {
            month: "2024-03".into(),
            department: department.map(String::from),
            team_id: team_id.map(String::from),
            sort_key: None,
        }
    }

    #[test]
    fn test_month_boundary_normalisation() {
        assert_eq!(parse_month("2024-03").unwrap(), parse_month("2024-03-17").unwrap());
        assert!(matches!(parse_month(""), Err(PerformanceError::InvalidInput(_))));
        assert!(matches!(parse_month("03/2024"), Err(PerformanceError::InvalidInput(_))));
    }

    #[test]
    fn test_scope_requires_exactly_one_selector() {
        assert_eq!(
            parse_scope(&query(Some("Sales"), None)).unwrap(),
            PerformanceScope::Department("Sales".into())
        );

        let team = TeamId::new_v4();
        assert_eq!(
            parse_scope(&query(None, Some(team.to_string().as_str()))).unwrap(),
            PerformanceScope::Team(team)
        );

        assert!(matches!(
            parse_scope(&query(Some("Sales"), Some(team.to_string().as_str()))),
            Err(PerformanceError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_scope(&query(None, Some(" "))),
            Err(PerformanceError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_scope(&query(None, Some("not-a-uuid"))),
            Err(PerformanceError::InvalidInput(_))
        ));
    }
}
