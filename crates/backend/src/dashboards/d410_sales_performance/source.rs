use async_trait::async_trait;
use contracts::dashboards::d410_sales_performance::PerformanceScope;
use contracts::domain::a001_seller::aggregate::{Seller, SellerId};
use contracts::domain::a002_team::aggregate::{Team, TeamId};
use contracts::domain::a003_sales_target::aggregate::SalesTarget;
use contracts::domain::a004_sales_disposition::aggregate::SalesDisposition;
use contracts::shared::month_key::MonthKey;

/// Источник данных агрегатора, только чтение.
///
/// Каждый вызов обращается к хранилищу: между вызовами ничего не кэшируется,
/// согласованность между ними не предполагается.
#[async_trait]
pub trait PerformanceSource: Send + Sync {
    async fn get_seller(&self, seller_id: &SellerId) -> anyhow::Result<Option<Seller>>;

    async fn get_team(&self, team_id: &TeamId) -> anyhow::Result<Option<Team>>;

    /// `None`, если план на месяц не задан
    async fn get_target(
        &self,
        seller_id: &SellerId,
        month: MonthKey,
    ) -> anyhow::Result<Option<SalesTarget>>;

    /// Сделки, созданные в течение месяца (UTC)
    async fn list_transactions(
        &self,
        seller_id: &SellerId,
        month: MonthKey,
    ) -> anyhow::Result<Vec<SalesDisposition>>;

    /// Текущие активные участники, по одной записи на продавца, по имени и id
    async fn list_team_members(&self, team_id: &TeamId) -> anyhow::Result<Vec<Seller>>;

    /// Активные продавцы отдела или команды, по имени и id
    async fn list_sellers_in_scope(
        &self,
        scope: &PerformanceScope,
    ) -> anyhow::Result<Vec<Seller>>;

    async fn list_active_teams(&self) -> anyhow::Result<Vec<Team>>;
}
