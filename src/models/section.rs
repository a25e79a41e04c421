use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Правило-заглушка для "уже проданных" мест.
///
/// Настоящего инвентаря здесь нет: занятость места вычисляется из его
/// индексов в ряду. Значения модулей - фикстура, а не бизнес-правило.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BookingRule {
    /// `(row_index * seat_index) % modulus == 0`
    Product { modulus: u32 },
    /// `(row_index + seat_index) % modulus == 0`
    Sum { modulus: u32 },
}

impl BookingRule {
    pub fn modulus(&self) -> u32 {
        match self {
            BookingRule::Product { modulus } | BookingRule::Sum { modulus } => *modulus,
        }
    }

    pub fn is_booked(&self, row_index: u32, seat_index: u32) -> bool {
        match *self {
            BookingRule::Product { modulus } => {
                (row_index as u64 * seat_index as u64) % modulus as u64 == 0
            }
            BookingRule::Sum { modulus } => {
                (row_index as u64 + seat_index as u64) % modulus as u64 == 0
            }
        }
    }
}

// Ценовая зона зала
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Section {
    #[validate(length(min = 1), custom(function = "validate_section_id"))]
    pub id: String,
    #[validate(length(min = 1))]
    pub display_name: String,
    #[validate(range(min = 0.0))]
    pub unit_price: f64,
    #[validate(length(min = 1, max = 1000))]
    pub row_labels: Vec<String>,
    #[validate(range(min = 1, max = 1000))]
    pub seats_per_row: u32,
    #[validate(range(min = 1, max = 64))]
    pub column_groups: u32,
    #[validate(custom(function = "validate_booking_rule"))]
    pub booking_rule: BookingRule,
}

impl Section {
    pub fn row_count(&self) -> u32 {
        u32::try_from(self.row_labels.len()).unwrap_or(u32::MAX)
    }

    /// Полное число мест в секции: группы × ряды × места в ряду.
    /// Для непроверенной секции упирается в `u32::MAX`.
    pub fn capacity(&self) -> u32 {
        self.column_groups
            .saturating_mul(self.row_count())
            .saturating_mul(self.seats_per_row)
    }

    pub fn row_label(&self, row_index: u32) -> Option<&str> {
        self.row_labels.get(row_index as usize).map(String::as_str)
    }

    /// Номер места в ряду, сквозной по всем группам колонок, начиная с 1.
    pub fn seat_number(&self, column_group: u32, seat_index: u32) -> u32 {
        column_group
            .saturating_mul(self.seats_per_row)
            .saturating_add(seat_index)
            .saturating_add(1)
    }

    pub fn contains_position(&self, column_group: u32, row_index: u32, seat_index: u32) -> bool {
        column_group < self.column_groups
            && row_index < self.row_count()
            && seat_index < self.seats_per_row
    }
}

// '_' разделяет части составного ключа места
fn validate_section_id(id: &str) -> Result<(), ValidationError> {
    if id.contains('_') || id.chars().any(char::is_whitespace) {
        return Err(ValidationError::new("section_id_separator"));
    }
    Ok(())
}

fn validate_booking_rule(rule: &BookingRule) -> Result<(), ValidationError> {
    if rule.modulus() == 0 {
        return Err(ValidationError::new("booking_rule_modulus_zero"));
    }
    Ok(())
}
