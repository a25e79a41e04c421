use serde::Serialize;

use crate::models::Seat;
use crate::services::selection::SelectionSet;

/// Сервисный сбор по умолчанию, как в интерфейсе оформления заказа.
pub const DEFAULT_SERVICE_FEE: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceSummary {
    pub seat_count: usize,
    pub subtotal: f64,
    pub service_fee: f64,
    pub total: f64,
}

/// Подсчет сумм по выбранным местам. Ничего не кеширует.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceAggregator {
    service_fee: f64,
}

impl Default for PriceAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE_FEE)
    }
}

impl PriceAggregator {
    pub fn new(service_fee: f64) -> Self {
        Self { service_fee }
    }

    pub fn service_fee(&self) -> f64 {
        self.service_fee
    }

    /// Сумма цен мест. Для пустого выбора ровно `0.0`.
    pub fn subtotal<'a>(seats: impl IntoIterator<Item = &'a Seat>) -> f64 {
        seats.into_iter().fold(0.0, |acc, seat| acc + seat.price)
    }

    pub fn grand_total<'a>(seats: impl IntoIterator<Item = &'a Seat>, service_fee: f64) -> f64 {
        Self::subtotal(seats) + service_fee
    }

    pub fn summary(&self, selection: &SelectionSet) -> PriceSummary {
        let subtotal = Self::subtotal(selection);
        PriceSummary {
            seat_count: selection.len(),
            subtotal,
            service_fee: self.service_fee,
            total: subtotal + self.service_fee,
        }
    }
}

/// Перевод суммы в копейки/центы для платежного шлюза.
pub fn to_minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}
