//! seat_map.rs
//!
//! Карта мест: перечисление всех мест секции и признак занятости.
//!
//! Занятость скрыта за трейтом [`SeatAvailability`], чтобы заглушку на модулях
//! можно было заменить реальным запросом к инвентарю, не трогая выбор и цены.

use serde::Serialize;
use std::sync::Arc;

use crate::models::{Seat, SeatKey, Section, Venue};

/// Источник сведений о занятых местах.
pub trait SeatAvailability: Send + Sync {
    fn is_booked(&self, section: &Section, row_index: u32, seat_index: u32) -> bool;
}

/// Детерминированная заглушка: правило берется из `Section::booking_rule`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderAvailability;

impl SeatAvailability for PlaceholderAvailability {
    fn is_booked(&self, section: &Section, row_index: u32, seat_index: u32) -> bool {
        section.booking_rule.is_booked(row_index, seat_index)
    }
}

/// Сводка по заполненности секции.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionOccupancy {
    pub section_id: String,
    pub total_seats: u32,
    pub booked_seats: u32,
    pub free_seats: u32,
    /// Выручка, если продать все свободные места.
    pub potential_revenue: f64,
}

#[derive(Clone)]
pub struct SeatMap {
    venue: Arc<Venue>,
    availability: Arc<dyn SeatAvailability>,
}

impl SeatMap {
    pub fn new(venue: Arc<Venue>) -> Self {
        Self::with_availability(venue, Arc::new(PlaceholderAvailability))
    }

    pub fn with_availability(venue: Arc<Venue>, availability: Arc<dyn SeatAvailability>) -> Self {
        Self { venue, availability }
    }

    pub fn venue(&self) -> &Venue {
        &self.venue
    }

    pub fn sections(&self) -> &[Section] {
        &self.venue.sections
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.venue.section(id)
    }

    pub fn is_booked(&self, section: &Section, row_index: u32, seat_index: u32) -> bool {
        self.availability.is_booked(section, row_index, seat_index)
    }

    /// Все места секции: группа колонок, затем ряд, затем место.
    ///
    /// Итератор ленивый и конечный; повторный вызов дает ту же последовательность.
    pub fn list_seats<'a>(&'a self, section: &'a Section) -> impl Iterator<Item = Seat> + 'a {
        (0..section.column_groups).flat_map(move |group| {
            (0..section.row_count()).flat_map(move |row| {
                (0..section.seats_per_row).map(move |seat| self.build_seat(section, group, row, seat))
            })
        })
    }

    /// Восстанавливает место по составному id. `None`, если id не разбирается
    /// или указывает за пределы секции.
    pub fn find_seat(&self, seat_id: &str) -> Option<Seat> {
        let key: SeatKey = seat_id.parse().ok()?;
        let section = self.section(&key.section_id)?;
        if !section.contains_position(key.column_group, key.row_index, key.seat_index) {
            return None;
        }
        Some(self.build_seat(section, key.column_group, key.row_index, key.seat_index))
    }

    pub fn occupancy(&self, section: &Section) -> SectionOccupancy {
        let (booked, free) = self
            .list_seats(section)
            .fold((0u32, 0u32), |(booked, free), seat| {
                if seat.booked { (booked + 1, free) } else { (booked, free + 1) }
            });

        SectionOccupancy {
            section_id: section.id.clone(),
            total_seats: booked + free,
            booked_seats: booked,
            free_seats: free,
            potential_revenue: free as f64 * section.unit_price,
        }
    }

    fn build_seat(&self, section: &Section, column_group: u32, row_index: u32, seat_index: u32) -> Seat {
        Seat {
            id: SeatKey::new(section.id.as_str(), column_group, row_index, seat_index).to_string(),
            section_id: section.id.clone(),
            row_label: section.row_label(row_index).unwrap_or_default().to_string(),
            seat_number: section.seat_number(column_group, seat_index),
            price: section.unit_price,
            booked: self.is_booked(section, row_index, seat_index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookingRule;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn seat_map() -> SeatMap {
        SeatMap::new(Arc::new(Venue::default_layout()))
    }

    #[test]
    fn lists_every_position_once() {
        let map = seat_map();
        let mut all = HashSet::new();
        for section in map.sections() {
            let seats: Vec<Seat> = map.list_seats(section).collect();
            assert_eq!(seats.len() as u32, section.capacity());
            for seat in seats {
                assert!(all.insert(seat.id.clone()), "duplicate seat id {}", seat.id);
            }
        }
        assert_eq!(all.len() as u32, map.venue().capacity());
    }

    #[test]
    fn listing_is_restartable() {
        let map = seat_map();
        let section = map.section("second-class").unwrap();
        let first: Vec<Seat> = map.list_seats(section).collect();
        let second: Vec<Seat> = map.list_seats(section).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn listing_order_is_group_row_seat() {
        let map = seat_map();
        let section = map.section("first-class").unwrap();
        let ids: Vec<String> = map.list_seats(section).take(9).map(|s| s.id).collect();
        assert_eq!(ids[0], "first-class_0_0_0");
        assert_eq!(ids[7], "first-class_0_0_7");
        assert_eq!(ids[8], "first-class_0_1_0");
    }

    #[test]
    fn origin_seat_in_mod_seven_section_is_booked() {
        let map = seat_map();
        let section = map.section("first-class").unwrap();
        assert_eq!(section.booking_rule, BookingRule::Product { modulus: 7 });
        assert!(map.is_booked(section, 0, 0));
        assert!(map.find_seat("first-class_0_0_0").unwrap().booked);
    }

    #[test]
    fn finds_seat_by_id() {
        let map = seat_map();
        let seat = map.find_seat("second-class_1_2_5").unwrap();
        assert_eq!(seat.section_id, "second-class");
        assert_eq!(seat.row_label, "C");
        assert_eq!(seat.seat_number, 16);
        assert_eq!(seat.price, 160.0);
        assert!(!seat.booked);
    }

    #[test]
    fn unknown_or_out_of_range_ids_are_not_found() {
        let map = seat_map();
        assert!(map.find_seat("balcony_0_0_0").is_none());
        assert!(map.find_seat("first-class_2_0_0").is_none());
        assert!(map.find_seat("first-class_0_3_0").is_none());
        assert!(map.find_seat("first-class_0_0_8").is_none());
        assert!(map.find_seat("garbage").is_none());
        // Только каноническая запись id
        assert!(map.find_seat("first-class_0_1_+1").is_none());
        assert!(map.find_seat("first-class_0_1_01").is_none());
    }

    #[test]
    fn general_section_uses_sum_rule() {
        let map = seat_map();
        let section = map.section("general").unwrap();
        assert!(map.is_booked(section, 4, 6));
        assert!(!map.is_booked(section, 4, 5));
    }

    #[test]
    fn occupancy_adds_up() {
        let map = seat_map();
        for section in map.sections() {
            let occ = map.occupancy(section);
            assert_eq!(occ.total_seats, section.capacity());
            assert_eq!(occ.booked_seats + occ.free_seats, occ.total_seats);
            assert!(occ.booked_seats > 0);
        }
    }

    struct NothingBooked;

    impl SeatAvailability for NothingBooked {
        fn is_booked(&self, _: &Section, _: u32, _: u32) -> bool {
            false
        }
    }

    #[test]
    fn availability_source_is_swappable() {
        let map = SeatMap::with_availability(Arc::new(Venue::default_layout()), Arc::new(NothingBooked));
        assert!(!map.find_seat("first-class_0_0_0").unwrap().booked);
        let section = map.section("economy").unwrap();
        assert_eq!(map.occupancy(section).booked_seats, 0);
    }

    proptest! {
        #[test]
        fn is_booked_is_deterministic(section_idx in 0usize..5, row in 0u32..64, seat in 0u32..64) {
            let map = seat_map();
            let section = &map.sections()[section_idx];
            prop_assert_eq!(map.is_booked(section, row, seat), map.is_booked(section, row, seat));
        }
    }
}
