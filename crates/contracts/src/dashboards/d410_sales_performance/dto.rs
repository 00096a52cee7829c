use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::a001_seller::aggregate::SellerId;
use crate::domain::a002_team::aggregate::TeamId;
use crate::shared::month_key::MonthKey;

// ---------------------------------------------------------------------------
// Report options
// ---------------------------------------------------------------------------

/// Поле, по которому упорядочивается рейтинг продавцов и команд
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Gross,
    CashIn,
}

/// Какой процент выполнения попадает в `target_completion_percentage`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionBasis {
    #[default]
    Accounts,
    Gross,
    CashIn,
}

/// Множество продавцов, по которому строится рейтинг
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PerformanceScope {
    Department(String),
    Team(TeamId),
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

/// Процент выполнения плана по каждому показателю
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompletionBreakdown {
    pub accounts: Decimal,
    pub gross: Decimal,
    pub cash_in: Decimal,
}

impl CompletionBreakdown {
    pub fn get(&self, basis: CompletionBasis) -> Decimal {
        match basis {
            CompletionBasis::Accounts => self.accounts,
            CompletionBasis::Gross => self.gross,
            CompletionBasis::CashIn => self.cash_in,
        }
    }
}

/// Сколько не хватает до плана: `max(0, план - факт)`.
///
/// Не путать с `total_remaining`: это неоплаченный остаток по сделкам.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TargetShortfall {
    pub accounts: i64,
    pub gross: Decimal,
    pub cash_in: Decimal,
}

/// Результаты продавца за месяц
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub seller_id: SellerId,
    pub seller_name: String,
    pub department: String,
    pub month: MonthKey,

    /// Количество различных сделок за месяц
    pub accounts_achieved: i64,
    pub total_gross: Decimal,
    pub total_cash_in: Decimal,
    /// Сумма неоплаченных остатков по сделкам месяца
    pub total_remaining: Decimal,

    pub target_accounts: i64,
    pub target_gross: Decimal,
    pub target_cash_in: Decimal,

    pub shortfall: TargetShortfall,
    pub completion: CompletionBreakdown,
    pub target_completion_percentage: Decimal,

    /// 1 = лучший; заполняется только внутри рейтинга
    pub rank: Option<u32>,
}

impl PerformanceSummary {
    pub fn sort_value(&self, key: SortKey) -> Decimal {
        match key {
            SortKey::Gross => self.total_gross,
            SortKey::CashIn => self.total_cash_in,
        }
    }
}

/// Результаты команды за месяц по её текущему составу
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamPerformanceSummary {
    pub team_id: TeamId,
    pub team_name: String,
    pub lead_id: Option<SellerId>,
    pub month: MonthKey,
    pub member_count: u32,

    pub accounts_achieved: i64,
    pub total_gross: Decimal,
    pub total_cash_in: Decimal,
    pub total_remaining: Decimal,

    pub target_accounts: i64,
    pub target_gross: Decimal,
    pub target_cash_in: Decimal,

    /// Сумма недостач участников (перевыполнение одного не покрывает другого)
    pub shortfall: TargetShortfall,

    /// Невзвешенное среднее `target_completion_percentage` участников
    pub average_performance: Decimal,
    /// Невзвешенное среднее по каждому показателю
    pub average_completion: CompletionBreakdown,

    /// Сводки участников с местами
    pub members: Vec<PerformanceSummary>,

    /// 1 = лучшая; заполняется только в таблице лидеров
    pub rank: Option<u32>,
}

impl TeamPerformanceSummary {
    pub fn sort_value(&self, key: SortKey) -> Decimal {
        match key {
            SortKey::Gross => self.total_gross,
            SortKey::CashIn => self.total_cash_in,
        }
    }
}

// ---------------------------------------------------------------------------
// API request / response
// ---------------------------------------------------------------------------

/// Параметры `GET /api/d410/sellers/:id/summary` и `/teams/:id/summary`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthQuery {
    /// `YYYY-MM` или `YYYY-MM-DD`
    pub month: String,
}

/// Параметры рейтинга. Задаётся ровно одно из `department` и `team_id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankingQuery {
    pub month: String,
    pub department: Option<String>,
    pub team_id: Option<String>,
    pub sort_key: Option<SortKey>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingResponse {
    pub month: MonthKey,
    pub scope: PerformanceScope,
    pub sort_key: SortKey,
    pub rows: Vec<PerformanceSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerRank {
    pub seller_id: SellerId,
    pub month: MonthKey,
    pub sort_key: SortKey,
    /// `None`, если продавец не входит в область
    pub rank: Option<u32>,
    /// Число продавцов в рейтинге области
    pub out_of: u32,
}

/// Параметры `GET /api/d410/teams/leaderboard`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardQuery {
    pub month: String,
    pub sort_key: Option<SortKey>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamLeaderboardResponse {
    pub month: MonthKey,
    pub sort_key: SortKey,
    pub teams: Vec<TeamPerformanceSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_wire_names() {
        assert_eq!(serde_json::to_string(&SortKey::CashIn).unwrap(), "\"cash_in\"");
        let key: SortKey = serde_json::from_str("\"gross\"").unwrap();
        assert_eq!(key, SortKey::Gross);
    }

    #[test]
    fn test_completion_breakdown_selects_basis() {
        let breakdown = CompletionBreakdown {
            accounts: Decimal::from(30),
            gross: Decimal::from(120),
            cash_in: Decimal::new(1125, 1),
        };
        assert_eq!(breakdown.get(CompletionBasis::Accounts), Decimal::from(30));
        assert_eq!(breakdown.get(CompletionBasis::Gross), Decimal::from(120));
        assert_eq!(breakdown.get(CompletionBasis::CashIn), Decimal::new(1125, 1));
    }

    #[test]
    fn test_scope_serialization() {
        let scope = PerformanceScope::Department("Upsell".into());
        assert_eq!(
            serde_json::to_string(&scope).unwrap(),
            r#"{"kind":"department","value":"Upsell"}"#
        );
    }
}
