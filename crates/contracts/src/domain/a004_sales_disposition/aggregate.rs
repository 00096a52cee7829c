use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::a001_seller::aggregate::SellerId;
use crate::shared::month_key::MonthKey;

crate::uuid_aggregate_id!(
    /// Уникальный идентификатор сделки
    SalesDispositionId
);

/// Источник выручки. Все источники учитываются в выполнении плана одинаково.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RevenueSource {
    #[default]
    Sale,
    Upsell,
    RecurringService,
    ProjectRemainder,
}

impl RevenueSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevenueSource::Sale => "sale",
            RevenueSource::Upsell => "upsell",
            RevenueSource::RecurringService => "recurring_service",
            RevenueSource::ProjectRemainder => "project_remainder",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "sale" => Some(RevenueSource::Sale),
            "upsell" => Some(RevenueSource::Upsell),
            "recurring_service" => Some(RevenueSource::RecurringService),
            "project_remainder" => Some(RevenueSource::ProjectRemainder),
            _ => None,
        }
    }
}

/// Зафиксированная сделка (продажа или апсейл).
///
/// `remaining`: неоплаченный остаток по сделке, вычисляется один раз при
/// создании как `gross_value - cash_in` и дальше не пересчитывается.
/// Это не то же самое, что недовыполнение плана.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesDisposition {
    pub id: SalesDispositionId,
    pub seller_id: SellerId,
    pub created_at: DateTime<Utc>,
    pub source: RevenueSource,
    pub client_name: Option<String>,
    pub gross_value: Decimal,
    pub cash_in: Decimal,
    pub remaining: Decimal,
}

impl SalesDisposition {
    pub fn new_for_insert(
        seller_id: SellerId,
        source: RevenueSource,
        client_name: Option<String>,
        gross_value: Decimal,
        cash_in: Decimal,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: SalesDispositionId::new_v4(),
            seller_id,
            created_at,
            source,
            client_name,
            gross_value,
            cash_in,
            remaining: gross_value.saturating_sub(cash_in),
        }
    }

    /// Месяц, в который попадает сделка
    pub fn month(&self) -> MonthKey {
        MonthKey::from_timestamp(&self.created_at)
    }

    /// Валидация данных
    pub fn validate(&self) -> Result<(), String> {
        if self.gross_value < Decimal::ZERO {
            return Err("Сумма сделки не может быть отрицательной".into());
        }
        if self.cash_in < Decimal::ZERO {
            return Err("Поступление не может быть отрицательным".into());
        }
        if self.cash_in > self.gross_value {
            return Err("Поступление не может превышать сумму сделки".into());
        }
        Ok(())
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// DTO для регистрации сделки
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesDispositionDto {
    pub seller_id: String,
    #[serde(default)]
    pub source: RevenueSource,
    pub client_name: Option<String>,
    pub gross_value: Decimal,
    #[serde(default)]
    pub cash_in: Decimal,
    /// По умолчанию текущий момент
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_remaining_is_fixed_at_creation() {
        let created_at = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let mut sale = SalesDisposition::new_for_insert(
            SellerId::new_v4(),
            RevenueSource::Sale,
            None,
            Decimal::from(5000),
            Decimal::from(3500),
            created_at,
        );
        assert_eq!(sale.remaining, Decimal::from(1500));

        sale.cash_in = Decimal::from(5000);
        assert_eq!(sale.remaining, Decimal::from(1500));
        assert_eq!(sale.month().period(), "2024-03");
    }

    #[test]
    fn test_overpayment_rejected() {
        let sale = SalesDisposition::new_for_insert(
            SellerId::new_v4(),
            RevenueSource::Upsell,
            None,
            Decimal::from(100),
            Decimal::from(150),
            Utc::now(),
        );
        assert!(sale.validate().is_err());
    }

    #[test]
    fn test_extreme_amounts_do_not_panic_and_are_rejected() {
        let sale = SalesDisposition::new_for_insert(
            SellerId::new_v4(),
            RevenueSource::Sale,
            None,
            -Decimal::MAX,
            Decimal::MAX,
            Utc::now(),
        );
        assert_eq!(sale.remaining, Decimal::MIN);
        assert!(sale.validate().is_err());
    }

    #[test]
    fn test_source_codes() {
        for source in [
            RevenueSource::Sale,
            RevenueSource::Upsell,
            RevenueSource::RecurringService,
            RevenueSource::ProjectRemainder,
        ] {
            assert_eq!(RevenueSource::from_str(source.as_str()), Some(source));
        }
        assert_eq!(RevenueSource::from_str("refund"), None);
    }
}
