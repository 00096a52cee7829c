use async_trait::async_trait;
use contracts::dashboards::d410_sales_performance::PerformanceScope;
use contracts::domain::a001_seller::aggregate::{Seller, SellerId};
use contracts::domain::a002_team::aggregate::{current_memberships, Team, TeamId};
use contracts::domain::a003_sales_target::aggregate::SalesTarget;
use contracts::domain::a004_sales_disposition::aggregate::SalesDisposition;
use contracts::shared::month_key::MonthKey;
use sea_orm::DatabaseConnection;

use super::source::PerformanceSource;
use crate::domain::{a001_seller, a002_team, a003_sales_target, a004_sales_disposition};

/// Источник данных для отчётов поверх репозиториев агрегатов (SQLite)
#[derive(Clone)]
pub struct SqlPerformanceSource {
    db: DatabaseConnection,
}

impl SqlPerformanceSource {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PerformanceSource for SqlPerformanceSource {
    async fn get_seller(&self, seller_id: &SellerId) -> anyhow::Result<Option<Seller>> {
        a001_seller::repository::find_by_id(&self.db, seller_id).await
    }

    async fn get_team(&self, team_id: &TeamId) -> anyhow::Result<Option<Team>> {
        a002_team::repository::find_by_id(&self.db, team_id).await
    }

    async fn get_target(
        &self,
        seller_id: &SellerId,
        month: MonthKey,
    ) -> anyhow::Result<Option<SalesTarget>> {
        a003_sales_target::repository::find(&self.db, seller_id, month).await
    }

    async fn list_transactions(
        &self,
        seller_id: &SellerId,
        month: MonthKey,
    ) -> anyhow::Result<Vec<SalesDisposition>> {
        a004_sales_disposition::repository::list_by_seller_and_month(&self.db, seller_id, month)
            .await
    }

    async fn list_team_members(&self, team_id: &TeamId) -> anyhow::Result<Vec<Seller>> {
        // Дубли членства разрешаются по всем командам сразу: продавец,
        // переведённый в другую команду, в старой уже не числится.
        let rows = a002_team::repository::list_active_memberships(&self.db).await?;
        let member_ids: Vec<SellerId> = current_memberships(rows)
            .into_iter()
            .filter(|m| m.team_id == *team_id)
            .map(|m| m.seller_id)
            .collect();
        a001_seller::repository::list_active_by_ids(&self.db, &member_ids).await
    }

    async fn list_sellers_in_scope(&self, scope: &PerformanceScope) -> anyhow::Result<Vec<Seller>> {
        match scope {
            PerformanceScope::Department(name) => {
                a001_seller::repository::list_by_department(&self.db, name).await
            }
            PerformanceScope::Team(team_id) => self.list_team_members(team_id).await,
        }
    }

    async fn list_active_teams(&self) -> anyhow::Result<Vec<Team>> {
        a002_team::repository::list_active(&self.db).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboards::d410_sales_performance::aggregator::{
        AggregatorSettings, PerformanceAggregator,
    };
    use crate::shared::data::db::connect_in_memory;
    use chrono::{TimeZone, Utc};
    use contracts::dashboards::d410_sales_performance::{CompletionBasis, SortKey};
    use contracts::domain::a002_team::aggregate::TeamMembership;
    use contracts::domain::a004_sales_disposition::aggregate::RevenueSource;
    use rust_decimal::Decimal;

    async fn seed_seller(db: &DatabaseConnection, name: &str) -> SellerId {
        let seller = Seller::new_for_insert(format!("SLR-{}", name), name.into(), "Sales".into());
        a001_seller::repository::insert(db, &seller).await.unwrap();
        seller.id()
    }

    async fn seed_deal(
        db: &DatabaseConnection,
        seller: SellerId,
        gross: i64,
        cash_in: i64,
        day: u32,
    ) {
        let deal = SalesDisposition::new_for_insert(
            seller,
            RevenueSource::Sale,
            None,
            Decimal::from(gross),
            Decimal::from(cash_in),
            Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
        );
        a004_sales_disposition::repository::insert(db, &deal).await.unwrap();
    }

    #[tokio::test]
    async fn test_team_summary_from_sqlite() {
        let db = connect_in_memory().await;
        let march = MonthKey::new(2024, 3).unwrap();

        let anna = seed_seller(&db, "Anna").await;
        let boris = seed_seller(&db, "Boris").await;

        let north = Team::new_for_insert("T-N".into(), "North".into(), Some(anna));
        let south = Team::new_for_insert("T-S".into(), "South".into(), None);
        a002_team::repository::insert(&db, &north).await.unwrap();
        a002_team::repository::insert(&db, &south).await.unwrap();

        let joined = |d| Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap();
        for m in [
            TeamMembership::new_for_insert(north.id(), anna, joined(1)),
            TeamMembership::new_for_insert(north.id(), boris, joined(1)),
            // Борис переведён в South позже
            TeamMembership::new_for_insert(south.id(), boris, joined(20)),
        ] {
            a002_team::repository::insert_membership(&db, &m).await.unwrap();
        }

        a003_sales_target::repository::upsert(
            &db,
            &SalesTarget::new_for_insert(anna, march, 2, Decimal::from(1000), Decimal::from(1000)),
        )
        .await
        .unwrap();
        seed_deal(&db, anna, 600, 300, 3).await;
        seed_deal(&db, anna, 400, 400, 28).await;
        seed_deal(&db, boris, 900, 900, 5).await;

        let aggregator = PerformanceAggregator::new(
            SqlPerformanceSource::new(db.clone()),
            AggregatorSettings {
                completion_basis: CompletionBasis::Accounts,
                default_sort_key: SortKey::Gross,
            },
        );

        let summary = aggregator.team_summary(&north.id(), march).await.unwrap();
        assert_eq!(summary.member_count, 1);
        assert_eq!(summary.lead_id, Some(anna));
        assert_eq!(summary.total_gross, Decimal::from(1000));
        assert_eq!(summary.total_remaining, Decimal::from(300));
        assert_eq!(summary.average_performance, Decimal::from(100));

        let board = aggregator.team_leaderboard(march, SortKey::Gross).await.unwrap();
        let names: Vec<&str> = board.iter().map(|t| t.team_name.as_str()).collect();
        assert_eq!(names, vec!["North", "South"]);
    }
}
