use std::collections::HashSet;

use contracts::dashboards::d410_sales_performance::{
    CompletionBasis, CompletionBreakdown, PerformanceScope, PerformanceSummary, SellerRank,
    SortKey, TargetShortfall, TeamPerformanceSummary,
};
use contracts::domain::a001_seller::aggregate::{Seller, SellerId};
use contracts::domain::a002_team::aggregate::{Team, TeamId};
use contracts::domain::a003_sales_target::aggregate::SalesTarget;
use contracts::domain::a004_sales_disposition::aggregate::SalesDisposition;
use contracts::shared::month_key::MonthKey;
use rust_decimal::Decimal;

use super::error::{PerformanceError, PerformanceResult};
use super::source::PerformanceSource;

/// Настройки отчёта из секции `[performance]` config.toml
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregatorSettings {
    pub completion_basis: CompletionBasis,
    pub default_sort_key: SortKey,
}

/// Выполнение месячных планов продавцами и командами.
///
/// Состояния не хранит: каждый вызов заново читает источник, поэтому два
/// вызова над неизменными данными дают равные результаты.
pub struct PerformanceAggregator<S> {
    source: S,
    settings: AggregatorSettings,
}

impl<S: PerformanceSource> PerformanceAggregator<S> {
    pub fn new(source: S, settings: AggregatorSettings) -> Self {
        Self { source, settings }
    }

    pub fn settings(&self) -> &AggregatorSettings {
        &self.settings
    }

    /// Сводка по продавцу за месяц. Без плана или сделок значения нулевые.
    pub async fn seller_summary(
        &self,
        seller_id: &SellerId,
        month: MonthKey,
    ) -> PerformanceResult<PerformanceSummary> {
        let seller = self
            .source
            .get_seller(seller_id)
            .await?
            .ok_or_else(|| PerformanceError::NotFound(format!("seller {}", seller_id)))?;
        self.summarize_seller(&seller, month).await
    }

    /// Сводка по активной команде по её текущему составу.
    ///
    /// Команда без участников даёт сводку с нулём участников.
    pub async fn team_summary(
        &self,
        team_id: &TeamId,
        month: MonthKey,
    ) -> PerformanceResult<TeamPerformanceSummary> {
        let team = self.active_team(team_id).await?;
        self.summarize_team(&team, month).await
    }

    /// Все продавцы области, по убыванию `sort_key`, с проставленными местами
    pub async fn ranked_sellers(
        &self,
        scope: &PerformanceScope,
        month: MonthKey,
        sort_key: SortKey,
    ) -> PerformanceResult<Vec<PerformanceSummary>> {
        let sellers = self.scope_sellers(scope).await?;

        let mut summaries = Vec::with_capacity(sellers.len());
        for seller in &sellers {
            summaries.push(self.summarize_seller(seller, month).await?);
        }

        Ok(rank_summaries(summaries, sort_key))
    }

    /// Место продавца в рейтинге. `rank` равен `None`, если продавец
    /// существует, но в область не входит.
    pub async fn seller_rank(
        &self,
        seller_id: &SellerId,
        scope: &PerformanceScope,
        month: MonthKey,
        sort_key: SortKey,
    ) -> PerformanceResult<SellerRank> {
        if self.source.get_seller(seller_id).await?.is_none() {
            return Err(PerformanceError::NotFound(format!("seller {}", seller_id)));
        }

        let ranked = self.ranked_sellers(scope, month, sort_key).await?;
        let rank = ranked
            .iter()
            .find(|s| s.seller_id == *seller_id)
            .and_then(|s| s.rank);

        Ok(SellerRank {
            seller_id: *seller_id,
            month,
            sort_key,
            rank,
            out_of: ranked.len() as u32,
        })
    }

    /// Активные команды хотя бы с одним участником, по убыванию `sort_key`
    pub async fn team_leaderboard(
        &self,
        month: MonthKey,
        sort_key: SortKey,
    ) -> PerformanceResult<Vec<TeamPerformanceSummary>> {
        let teams = self.source.list_active_teams().await?;

        let mut summaries = Vec::with_capacity(teams.len());
        for team in &teams {
            let summary = self.summarize_team(team, month).await?;
            if summary.member_count > 0 {
                summaries.push(summary);
            }
        }

        summaries.sort_by(|a, b| b.sort_value(sort_key).cmp(&a.sort_value(sort_key)));
        for (idx, summary) in summaries.iter_mut().enumerate() {
            summary.rank = Some(idx as u32 + 1);
        }
        Ok(summaries)
    }

    async fn active_team(&self, team_id: &TeamId) -> PerformanceResult<Team> {
        match self.source.get_team(team_id).await? {
            Some(team) if team.is_active => Ok(team),
            Some(_) => Err(PerformanceError::NotFound(format!("team {} is inactive", team_id))),
            None => Err(PerformanceError::NotFound(format!("team {}", team_id))),
        }
    }

    async fn scope_sellers(&self, scope: &PerformanceScope) -> PerformanceResult<Vec<Seller>> {
        match scope {
            PerformanceScope::Department(name) => {
                if name.trim().is_empty() {
                    return Err(PerformanceError::InvalidInput(
                        "department name is empty".to_string(),
                    ));
                }
                let sellers = dedup_sellers(self.source.list_sellers_in_scope(scope).await?);
                if sellers.is_empty() {
                    return Err(PerformanceError::NotFound(format!("department '{}'", name)));
                }
                Ok(sellers)
            }
            PerformanceScope::Team(team_id) => {
                self.active_team(team_id).await?;
                Ok(dedup_sellers(self.source.list_sellers_in_scope(scope).await?))
            }
        }
    }

    async fn summarize_seller(
        &self,
        seller: &Seller,
        month: MonthKey,
    ) -> PerformanceResult<PerformanceSummary> {
        let seller_id = seller.id();
        let target = self.source.get_target(&seller_id, month).await?;
        let transactions = self.source.list_transactions(&seller_id, month).await?;
        build_summary(
            seller,
            month,
            target.as_ref(),
            &transactions,
            self.settings.completion_basis,
        )
    }

    async fn summarize_team(
        &self,
        team: &Team,
        month: MonthKey,
    ) -> PerformanceResult<TeamPerformanceSummary> {
        let members = dedup_sellers(self.source.list_team_members(&team.id()).await?);

        let mut summaries = Vec::with_capacity(members.len());
        for member in &members {
            summaries.push(self.summarize_seller(member, month).await?);
        }

        let members = rank_summaries(summaries, self.settings.default_sort_key);
        build_team_summary(team, month, members)
    }
}

// ============================================================================
// Arithmetic
// ============================================================================

/// `achieved / target × 100`; 0, если план не положителен или результат
/// не помещается в `Decimal`.
pub fn completion_percentage(achieved: Decimal, target: Decimal) -> Decimal {
    if target <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    achieved
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(target))
        .unwrap_or(Decimal::ZERO)
}

fn overflow(what: &str) -> PerformanceError {
    PerformanceError::UpstreamFailure(anyhow::anyhow!("{} overflow", what))
}

fn add_amount(total: Decimal, value: Decimal, what: &str) -> PerformanceResult<Decimal> {
    total.checked_add(value).ok_or_else(|| overflow(what))
}

fn add_count(total: i64, value: i64, what: &str) -> PerformanceResult<i64> {
    total.checked_add(value).ok_or_else(|| overflow(what))
}

fn sum_amounts(
    members: &[PerformanceSummary],
    what: &str,
    pick: impl Fn(&PerformanceSummary) -> Decimal,
) -> PerformanceResult<Decimal> {
    members
        .iter()
        .try_fold(Decimal::ZERO, |acc, m| add_amount(acc, pick(m), what))
}

fn sum_counts(
    members: &[PerformanceSummary],
    what: &str,
    pick: impl Fn(&PerformanceSummary) -> i64,
) -> PerformanceResult<i64> {
    members
        .iter()
        .try_fold(0i64, |acc, m| add_count(acc, pick(m), what))
}

/// Сводка по продавцу из уже прочитанных строк. Сделка учитывается один раз
/// на идентификатор. Переполнение сумм даёт `UpstreamFailure`.
pub fn build_summary(
    seller: &Seller,
    month: MonthKey,
    target: Option<&SalesTarget>,
    transactions: &[SalesDisposition],
    basis: CompletionBasis,
) -> PerformanceResult<PerformanceSummary> {
    let mut seen = HashSet::new();
    let mut accounts_achieved: i64 = 0;
    let mut total_gross = Decimal::ZERO;
    let mut total_cash_in = Decimal::ZERO;
    let mut total_remaining = Decimal::ZERO;

    for tx in transactions {
        if !seen.insert(tx.id) {
            continue;
        }
        accounts_achieved = add_count(accounts_achieved, 1, "accounts")?;
        total_gross = add_amount(total_gross, tx.gross_value, "gross")?;
        total_cash_in = add_amount(total_cash_in, tx.cash_in, "cash_in")?;
        total_remaining = add_amount(total_remaining, tx.remaining, "remaining")?;
    }

    let target = target
        .cloned()
        .unwrap_or_else(|| SalesTarget::zero(seller.id(), month));

    let shortfall = TargetShortfall {
        accounts: target.target_accounts.saturating_sub(accounts_achieved).max(0),
        gross: target.target_gross.saturating_sub(total_gross).max(Decimal::ZERO),
        cash_in: target.target_cash_in.saturating_sub(total_cash_in).max(Decimal::ZERO),
    };

    let completion = CompletionBreakdown {
        accounts: completion_percentage(
            Decimal::from(accounts_achieved),
            Decimal::from(target.target_accounts),
        ),
        gross: completion_percentage(total_gross, target.target_gross),
        cash_in: completion_percentage(total_cash_in, target.target_cash_in),
    };

    Ok(PerformanceSummary {
        seller_id: seller.id(),
        seller_name: seller.display_name().to_string(),
        department: seller.department.clone(),
        month,
        accounts_achieved,
        total_gross,
        total_cash_in,
        total_remaining,
        target_accounts: target.target_accounts,
        target_gross: target.target_gross,
        target_cash_in: target.target_cash_in,
        shortfall,
        completion,
        target_completion_percentage: completion.get(basis),
        rank: None,
    })
}

/// Итоги команды: простые суммы по участникам, средние невзвешенные
pub fn build_team_summary(
    team: &Team,
    month: MonthKey,
    members: Vec<PerformanceSummary>,
) -> PerformanceResult<TeamPerformanceSummary> {
    let member_count = members.len() as u32;

    let mean = |what: &str,
                pick: fn(&PerformanceSummary) -> Decimal|
     -> PerformanceResult<Decimal> {
        if members.is_empty() {
            return Ok(Decimal::ZERO);
        }
        Ok(sum_amounts(&members, what, pick)? / Decimal::from(member_count))
    };

    let average_performance = mean("average performance", |m| m.target_completion_percentage)?;
    let average_completion = CompletionBreakdown {
        accounts: mean("average completion", |m| m.completion.accounts)?,
        gross: mean("average completion", |m| m.completion.gross)?,
        cash_in: mean("average completion", |m| m.completion.cash_in)?,
    };

    Ok(TeamPerformanceSummary {
        team_id: team.id(),
        team_name: team.name().to_string(),
        lead_id: team.lead_id,
        month,
        member_count,
        accounts_achieved: sum_counts(&members, "team accounts", |m| m.accounts_achieved)?,
        total_gross: sum_amounts(&members, "team gross", |m| m.total_gross)?,
        total_cash_in: sum_amounts(&members, "team cash_in", |m| m.total_cash_in)?,
        total_remaining: sum_amounts(&members, "team remaining", |m| m.total_remaining)?,
        target_accounts: sum_counts(&members, "team target", |m| m.target_accounts)?,
        target_gross: sum_amounts(&members, "team target", |m| m.target_gross)?,
        target_cash_in: sum_amounts(&members, "team target", |m| m.target_cash_in)?,
        shortfall: TargetShortfall {
            accounts: sum_counts(&members, "team shortfall", |m| m.shortfall.accounts)?,
            gross: sum_amounts(&members, "team shortfall", |m| m.shortfall.gross)?,
            cash_in: sum_amounts(&members, "team shortfall", |m| m.shortfall.cash_in)?,
        },
        average_performance,
        average_completion,
        members,
        rank: None,
    })
}

/// Устойчивая сортировка по убыванию `sort_key`, затем места по позиции
/// начиная с 1. Равные значения сохраняют исходный порядок.
pub fn rank_summaries(
    mut summaries: Vec<PerformanceSummary>,
    sort_key: SortKey,
) -> Vec<PerformanceSummary> {
    summaries.sort_by(|a, b| b.sort_value(sort_key).cmp(&a.sort_value(sort_key)));
    for (idx, summary) in summaries.iter_mut().enumerate() {
        summary.rank = Some(idx as u32 + 1);
    }
    summaries
}

/// Побеждает первое вхождение продавца
fn dedup_sellers(sellers: Vec<Seller>) -> Vec<Seller> {
    let mut seen: HashSet<SellerId> = HashSet::new();
    sellers.into_iter().filter(|s| seen.insert(s.id())).collect()
}
