use serde::{Deserialize, Serialize};

use crate::domain::common::{AggregateId, BaseAggregate};

crate::uuid_aggregate_id!(
    /// Уникальный идентификатор продавца
    SellerId
);

// ============================================================================
// Aggregate Root
// ============================================================================

/// Продавец (апсейлер): сотрудник, у которого есть месячный план и сделки
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seller {
    #[serde(flatten)]
    pub base: BaseAggregate<SellerId>,

    /// Отдел (например, "Sales", "Upsell")
    pub department: String,

    /// Неактивные продавцы не попадают в рейтинги и составы команд
    pub is_active: bool,
}

impl Seller {
    /// Создать нового продавца для вставки в БД
    pub fn new_for_insert(code: String, display_name: String, department: String) -> Self {
        Self {
            base: BaseAggregate::new(SellerId::new_v4(), code, display_name),
            department,
            is_active: true,
        }
    }

    pub fn id(&self) -> SellerId {
        self.base.id
    }

    pub fn display_name(&self) -> &str {
        &self.base.description
    }

    /// Валидация данных
    pub fn validate(&self) -> Result<(), String> {
        if self.base.description.trim().is_empty() {
            return Err("Имя продавца не может быть пустым".into());
        }
        if self.base.code.trim().is_empty() {
            return Err("Код не может быть пустым".into());
        }
        if self.department.trim().is_empty() {
            return Err("Отдел не может быть пустым".into());
        }
        Ok(())
    }

    /// Хук перед записью
    pub fn before_write(&mut self) {
        self.base.touch();
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// DTO для создания продавца
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SellerDto {
    pub code: Option<String>,
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub department: String,
    pub comment: Option<String>,
}
