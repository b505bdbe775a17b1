//! Generic keyed collection — the shared merge engine behind the
//! reservations, appointments and rooms containers.
//!
//! All three collections obey the same action-driven merge rules, so the
//! strategy lives here once and the record types only provide their key and
//! patch-merge behavior.

use std::collections::HashSet;

use tracing::warn;

use crate::model::{Appointment, Reservation, Room};
use crate::protocol::{CollectionAction, CollectionUpdate};

/// A record that can live in a [`Collection`].
pub trait Keyed {
    fn key(&self) -> i64;

    /// Merge `patch` into `self`, new fields overriding old.
    fn merge_from(&mut self, patch: Self);
}

impl Keyed for Reservation {
    fn key(&self) -> i64 {
        self.id
    }
    fn merge_from(&mut self, patch: Self) {
        Reservation::merge_from(self, patch)
    }
}

impl Keyed for Appointment {
    fn key(&self) -> i64 {
        self.id
    }
    fn merge_from(&mut self, patch: Self) {
        Appointment::merge_from(self, patch)
    }
}

impl Keyed for Room {
    fn key(&self) -> i64 {
        self.id
    }
    fn merge_from(&mut self, patch: Self) {
        Room::merge_from(self, patch)
    }
}

/// An ordered, id-keyed collection with action-driven bulk updates.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    name: &'static str,
    items: Vec<T>,
}

impl<T: Keyed> Collection<T> {
    pub fn new(name: &'static str) -> Self {
        Self { name, items: Vec::new() }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, key: i64) -> Option<&T> {
        self.items.iter().find(|i| i.key() == key)
    }

    /// Apply a validated collection update.
    ///
    /// - `Replace` discards the current contents entirely.
    /// - `Create` appends.
    /// - `Update` merges by key; an unknown key is appended with a warning
    ///   rather than dropped (the server is authoritative).
    /// - `Delete` removes every key present in the payload.
    pub fn apply(&mut self, update: CollectionUpdate<T>) {
        match update.action {
            CollectionAction::Replace => {
                self.items = update.items;
            }
            CollectionAction::Create => {
                self.items.extend(update.items);
            }
            CollectionAction::Update => {
                for patch in update.items {
                    match self.items.iter_mut().find(|i| i.key() == patch.key()) {
                        Some(existing) => existing.merge_from(patch),
                        None => {
                            warn!(
                                collection = self.name,
                                key = patch.key(),
                                "update for unknown record, inserting"
                            );
                            self.items.push(patch);
                        }
                    }
                }
            }
            CollectionAction::Delete => {
                let doomed: HashSet<i64> = update.items.iter().map(Keyed::key).collect();
                self.items.retain(|i| !doomed.contains(&i.key()));
            }
        }
    }

    /// Insert or merge a single record (used by the overlay coordinator to
    /// reflect REST results locally).
    pub fn upsert(&mut self, record: T) {
        match self.items.iter_mut().find(|i| i.key() == record.key()) {
            Some(existing) => existing.merge_from(record),
            None => self.items.push(record),
        }
    }

    /// Remove a single record by key; returns whether anything was removed.
    pub fn remove(&mut self, key: i64) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.key() != key);
        self.items.len() < before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn res(id: i64, guest: Option<&str>) -> Reservation {
        Reservation { id, guest_name: guest.map(Into::into), ..Default::default() }
    }

    fn update(action: CollectionAction, items: Vec<Reservation>) -> CollectionUpdate<Reservation> {
        CollectionUpdate { action, items }
    }

    #[test]
    fn replace_discards_prior_state() {
        let mut c = Collection::new("reservations");
        c.apply(update(CollectionAction::Replace, vec![res(1, None), res(2, None)]));
        c.apply(update(CollectionAction::Replace, vec![res(9, None)]));
        assert_eq!(c.items().iter().map(|r| r.id).collect::<Vec<_>>(), vec![9]);
    }

    #[test]
    fn create_appends() {
        let mut c = Collection::new("reservations");
        c.apply(update(CollectionAction::Create, vec![res(1, None)]));
        c.apply(update(CollectionAction::Create, vec![res(2, None)]));
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn update_merges_by_id() {
        let mut c = Collection::new("reservations");
        c.apply(update(CollectionAction::Replace, vec![res(1, Some("Nimal"))]));

        let mut patch = res(1, None);
        patch.phone = Some("+94 77 000".into());
        c.apply(update(CollectionAction::Update, vec![patch]));

        let merged = c.get(1).unwrap();
        // Union: untouched field survives, new field lands.
        assert_eq!(merged.guest_name.as_deref(), Some("Nimal"));
        assert_eq!(merged.phone.as_deref(), Some("+94 77 000"));
    }

    #[test]
    fn update_unknown_id_inserts() {
        let mut c = Collection::new("reservations");
        c.apply(update(CollectionAction::Update, vec![res(42, Some("ghost"))]));
        assert_eq!(c.len(), 1);
        assert_eq!(c.get(42).unwrap().guest_name.as_deref(), Some("ghost"));
    }

    #[test]
    fn delete_filters_by_id_set() {
        let mut c = Collection::new("reservations");
        c.apply(update(CollectionAction::Replace, vec![res(5, None), res(7, None), res(9, None)]));
        c.apply(update(CollectionAction::Delete, vec![res(7, None)]));
        assert_eq!(c.items().iter().map(|r| r.id).collect::<Vec<_>>(), vec![5, 9]);
    }

    #[test]
    fn remove_single() {
        let mut c = Collection::new("reservations");
        c.apply(update(CollectionAction::Replace, vec![res(1, None)]));
        assert!(c.remove(1));
        assert!(!c.remove(1));
        assert!(c.is_empty());
    }
}
