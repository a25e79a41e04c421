use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;
use validator::Validate;

use super::section::{BookingRule, Section};

#[derive(Debug, thiserror::Error)]
pub enum VenueError {
    #[error("failed to read venue layout: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid venue layout: {0}")]
    Invalid(#[from] validator::ValidationErrors),
    #[error("duplicate section id: {0}")]
    DuplicateSection(String),
}

// Схема зала: упорядоченный список ценовых зон
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Venue {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1), nested)]
    pub sections: Vec<Section>,
}

impl Venue {
    /// Проверяет схему и уникальность id секций.
    pub fn validated(self) -> Result<Self, VenueError> {
        self.validate()?;

        let mut seen = HashSet::new();
        for section in &self.sections {
            if !seen.insert(section.id.as_str()) {
                return Err(VenueError::DuplicateSection(section.id.clone()));
            }
        }
        Ok(self)
    }

    /// Загружает схему зала из файла (toml / json / yaml по расширению).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, VenueError> {
        let path = path.as_ref();
        info!("Loading venue layout from {}", path.display());

        let venue: Venue = config::Config::builder()
            .add_source(config::File::from(path))
            .build()?
            .try_deserialize()?;

        venue.validated()
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn capacity(&self) -> u32 {
        self.sections.iter().map(Section::capacity).fold(0, u32::saturating_add)
    }

    /// Встроенная схема на пять секций.
    pub fn default_layout() -> Self {
        Venue {
            name: "Main Hall".to_string(),
            sections: vec![
                section("first-class", "First Class", 200.0, 'C', 8, 2, BookingRule::Product { modulus: 7 }),
                section("second-class", "Second Class", 160.0, 'D', 10, 2, BookingRule::Product { modulus: 9 }),
                section("third-class", "Third Class", 120.0, 'E', 10, 2, BookingRule::Product { modulus: 11 }),
                section("economy", "Economy", 90.0, 'F', 12, 2, BookingRule::Product { modulus: 13 }),
                section("general", "General Admission", 60.0, 'J', 14, 4, BookingRule::Sum { modulus: 10 }),
            ],
        }
    }
}

impl Default for Venue {
    fn default() -> Self {
        Self::default_layout()
    }
}

fn section(
    id: &str,
    display_name: &str,
    unit_price: f64,
    last_row: char,
    seats_per_row: u32,
    column_groups: u32,
    booking_rule: BookingRule,
) -> Section {
    Section {
        id: id.to_string(),
        display_name: display_name.to_string(),
        unit_price,
        row_labels: ('A'..=last_row).map(String::from).collect(),
        seats_per_row,
        column_groups,
        booking_rule,
    }
}
