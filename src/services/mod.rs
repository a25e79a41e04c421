pub mod checkout;
pub mod cleanup;
pub mod pricing;
pub mod seat_map;
pub mod selection;
