use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Место в зале в том виде, в каком его видит карта мест.
///
/// `booked` не хранится: он вычисляется при каждом построении карты.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seat {
    pub id: String,
    pub section_id: String,
    pub row_label: String,
    pub seat_number: u32,
    pub price: f64,
    pub booked: bool,
}

impl Seat {
    pub fn is_available(&self) -> bool {
        !self.booked
    }
}

/// Составной ключ места: секция, группа колонок, ряд, место.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeatKey {
    pub section_id: String,
    pub column_group: u32,
    pub row_index: u32,
    pub seat_index: u32,
}

impl SeatKey {
    pub fn new(section_id: impl Into<String>, column_group: u32, row_index: u32, seat_index: u32) -> Self {
        Self {
            section_id: section_id.into(),
            column_group,
            row_index,
            seat_index,
        }
    }
}

impl fmt::Display for SeatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}",
            self.section_id, self.column_group, self.row_index, self.seat_index
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed seat id: {0}")]
pub struct SeatKeyParseError(pub String);

impl FromStr for SeatKey {
    type Err = SeatKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || SeatKeyParseError(s.to_string());

        // Разбираем справа: последние три части всегда числа
        let mut parts = s.rsplitn(4, '_');
        let seat_index = parts.next().and_then(|p| p.parse().ok()).ok_or_else(err)?;
        let row_index = parts.next().and_then(|p| p.parse().ok()).ok_or_else(err)?;
        let column_group = parts.next().and_then(|p| p.parse().ok()).ok_or_else(err)?;
        let section_id = parts.next().filter(|p| !p.is_empty()).ok_or_else(err)?;

        // Только каноническая запись: без '+' и ведущих нулей
        let key = SeatKey::new(section_id, column_group, row_index, seat_index);
        if key.to_string() != s {
            return Err(err());
        }
        Ok(key)
    }
}
