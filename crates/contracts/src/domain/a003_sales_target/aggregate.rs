use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::a001_seller::aggregate::SellerId;
use crate::domain::common::EntityMetadata;
use crate::shared::month_key::MonthKey;

crate::uuid_aggregate_id!(
    /// Уникальный идентификатор плана продаж
    SalesTargetId
);

/// Месячный план продавца.
///
/// Ключ уникальности: пара (продавец, месяц): повторная запись плана на тот же
/// месяц перезаписывает значения, а не создаёт дубликат.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesTarget {
    pub id: SalesTargetId,
    pub seller_id: SellerId,
    pub month: MonthKey,
    /// План по количеству сделок
    pub target_accounts: i64,
    /// План по валовой сумме сделок
    pub target_gross: Decimal,
    /// План по собранным деньгам
    pub target_cash_in: Decimal,
    pub metadata: EntityMetadata,
}

impl SalesTarget {
    pub fn new_for_insert(
        seller_id: SellerId,
        month: MonthKey,
        target_accounts: i64,
        target_gross: Decimal,
        target_cash_in: Decimal,
    ) -> Self {
        Self {
            id: SalesTargetId::new_v4(),
            seller_id,
            month,
            target_accounts,
            target_gross,
            target_cash_in,
            metadata: EntityMetadata::new(),
        }
    }

    /// Нулевой план (используется, когда план на месяц не задан)
    pub fn zero(seller_id: SellerId, month: MonthKey) -> Self {
        Self::new_for_insert(seller_id, month, 0, Decimal::ZERO, Decimal::ZERO)
    }

    /// Валидация данных
    pub fn validate(&self) -> Result<(), String> {
        if self.target_accounts < 0 {
            return Err("План по количеству сделок не может быть отрицательным".into());
        }
        if self.target_gross < Decimal::ZERO {
            return Err("План по валовой сумме не может быть отрицательным".into());
        }
        if self.target_cash_in < Decimal::ZERO {
            return Err("План по поступлениям не может быть отрицательным".into());
        }
        Ok(())
    }

    /// Хук перед записью
    pub fn before_write(&mut self) {
        self.metadata.touch();
        self.metadata.increment_version();
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// DTO для установки плана (upsert по продавцу и месяцу)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesTargetDto {
    pub seller_id: String,
    /// `YYYY-MM` или `YYYY-MM-DD`
    pub month: String,
    #[serde(default)]
    pub target_accounts: i64,
    #[serde(default)]
    pub target_gross: Decimal,
    #[serde(default)]
    pub target_cash_in: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month() -> MonthKey {
        MonthKey::new(2024, 3).unwrap()
    }

    #[test]
    fn test_zero_target_is_valid() {
        assert!(SalesTarget::zero(SellerId::new_v4(), month()).validate().is_ok());
    }

    #[test]
    fn test_negative_values_rejected() {
        let seller = SellerId::new_v4();
        let bad_accounts =
            SalesTarget::new_for_insert(seller, month(), -1, Decimal::ZERO, Decimal::ZERO);
        assert!(bad_accounts.validate().is_err());

        let bad_gross =
            SalesTarget::new_for_insert(seller, month(), 1, Decimal::new(-1, 2), Decimal::ZERO);
        assert!(bad_gross.validate().is_err());

        let bad_cash =
            SalesTarget::new_for_insert(seller, month(), 1, Decimal::ZERO, Decimal::from(-5));
        assert!(bad_cash.validate().is_err());
    }

    #[test]
    fn test_dto_accepts_numbers_and_strings_for_money() {
        let dto: SalesTargetDto = serde_json::from_str(
            r#"{"seller_id":"x","month":"2024-03","target_accounts":10,"target_gross":10000,"target_cash_in":"8000.50"}"#,
        )
        .unwrap();
        assert_eq!(dto.target_gross, Decimal::from(10000));
        assert_eq!(dto.target_cash_in, Decimal::new(800050, 2));
    }
}
