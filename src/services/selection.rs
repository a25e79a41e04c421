use serde::Serialize;
use std::collections::HashSet;

use crate::models::Seat;

/// Результат переключения места.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// Место занято, выбор не изменился.
    RejectedBooked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPhase {
    Idle,
    Selecting,
}

/// Выбранные пользователем места в порядке выбора, уникальные по id.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    seats: Vec<Seat>,
    ids: HashSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Добавляет место или убирает его, если оно уже выбрано.
    /// Для занятого места ничего не меняется; снять его можно через `remove`.
    pub fn toggle(&mut self, seat: &Seat) -> ToggleOutcome {
        if seat.booked {
            return ToggleOutcome::RejectedBooked;
        }
        if self.remove(&seat.id) {
            return ToggleOutcome::Removed;
        }
        self.ids.insert(seat.id.clone());
        self.seats.push(seat.clone());
        ToggleOutcome::Added
    }

    pub fn remove(&mut self, seat_id: &str) -> bool {
        if !self.ids.remove(seat_id) {
            return false;
        }
        self.seats.retain(|s| s.id != seat_id);
        true
    }

    pub fn clear(&mut self) {
        self.seats.clear();
        self.ids.clear();
    }

    pub fn contains(&self, seat_id: &str) -> bool {
        self.ids.contains(seat_id)
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Seat> {
        self.seats.iter()
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    pub fn phase(&self) -> SelectionPhase {
        if self.is_empty() {
            SelectionPhase::Idle
        } else {
            SelectionPhase::Selecting
        }
    }
}

impl<'a> IntoIterator for &'a SelectionSet {
    type Item = &'a Seat;
    type IntoIter = std::slice::Iter<'a, Seat>;

    fn into_iter(self) -> Self::IntoIter {
        self.seats.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::pricing::PriceAggregator;
    use proptest::prelude::*;

    fn seat(id: &str, price: f64) -> Seat {
        Seat {
            id: id.to_string(),
            section_id: id.split('_').next().unwrap_or_default().to_string(),
            row_label: "A".to_string(),
            seat_number: 1,
            price,
            booked: false,
        }
    }

    fn ids(set: &SelectionSet) -> Vec<&str> {
        set.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn starts_idle() {
        let set = SelectionSet::new();
        assert!(set.is_empty());
        assert_eq!(set.phase(), SelectionPhase::Idle);
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut set = SelectionSet::new();
        let a = seat("vip_0_1_1", 50.0);

        assert_eq!(set.toggle(&a), ToggleOutcome::Added);
        assert!(set.contains(&a.id));
        assert_eq!(set.phase(), SelectionPhase::Selecting);

        assert_eq!(set.toggle(&a), ToggleOutcome::Removed);
        assert!(!set.contains(&a.id));
        assert_eq!(set.phase(), SelectionPhase::Idle);
    }

    #[test]
    fn booked_seat_is_rejected() {
        let mut set = SelectionSet::new();
        let mut taken = seat("first-class_0_0_0", 200.0);
        taken.booked = true;

        assert_eq!(set.toggle(&taken), ToggleOutcome::RejectedBooked);
        assert!(!set.contains(&taken.id));
        assert!(set.is_empty());
    }

    #[test]
    fn readded_seat_moves_to_the_end() {
        let mut set = SelectionSet::new();
        let a = seat("vip_0_1_1", 50.0);
        let b = seat("vip_0_1_2", 50.0);
        let c = seat("vip_0_1_3", 50.0);
        set.toggle(&a);
        set.toggle(&b);
        set.toggle(&c);

        set.toggle(&a);
        set.toggle(&a);
        assert_eq!(ids(&set), vec!["vip_0_1_2", "vip_0_1_3", "vip_0_1_1"]);
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut set = SelectionSet::new();
        set.toggle(&seat("vip_0_1_1", 50.0));
        assert!(!set.remove("vip_9_9_9"));
        assert_eq!(set.len(), 1);
        assert!(set.remove("vip_0_1_1"));
        assert!(set.is_empty());
    }

    #[test]
    fn clear_empties_everything() {
        let mut set = SelectionSet::new();
        let seats = [seat("a_0_1_1", 1.0), seat("a_0_1_2", 2.0), seat("a_0_1_3", 3.0)];
        for s in &seats {
            set.toggle(s);
        }
        assert_eq!(PriceAggregator::subtotal(&set), 6.0);

        set.clear();
        for s in &seats {
            assert!(!set.contains(&s.id));
        }
        assert_eq!(set.phase(), SelectionPhase::Idle);
        assert_eq!(PriceAggregator::subtotal(&set), 0.0);
    }

    proptest! {
        #[test]
        fn double_toggle_restores_membership(
            initial in proptest::collection::vec(0u32..20, 0..10),
            target in 0u32..20,
        ) {
            let mut set = SelectionSet::new();
            for n in initial {
                let s = seat(&format!("zone_0_0_{n}"), 10.0);
                if !set.contains(&s.id) {
                    set.toggle(&s);
                }
            }
            let before: HashSet<String> = set.iter().map(|s| s.id.clone()).collect();

            let t = seat(&format!("zone_0_0_{target}"), 10.0);
            set.toggle(&t);
            prop_assert_ne!(set.contains(&t.id), before.contains(&t.id));
            set.toggle(&t);

            let after: HashSet<String> = set.iter().map(|s| s.id.clone()).collect();
            prop_assert_eq!(before, after);
            prop_assert_eq!(set.len(), set.ids.len());
        }
    }
}
