//! In-memory event store, bucketed by day.
//!
//! Invariants held between calls:
//! - events in one bucket never overlap (half-open spans)
//! - every event lives in exactly one bucket
//! - ids are unique across all buckets
//!
//! Buckets are dropped when their last event goes, so `buckets` never holds
//! an empty list.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::conflict::find_conflict;
use crate::date_key::DateKey;
use crate::error::{SnapshotError, StoreError};
use crate::event::{Event, EventChange, EventDraft, EventId};
use crate::id::{ClockIds, IdGenerator};

/// Full date-key -> events mapping, as persisted and exported.
pub type EventMap = BTreeMap<DateKey, Vec<Event>>;

/// Attempts at drawing an unused id before giving up.
const MAX_ID_ATTEMPTS: usize = 100;

#[derive(Debug)]
pub struct EventStore<G = ClockIds> {
    buckets: EventMap,
    index: HashMap<EventId, DateKey>,
    ids: G,
}

impl EventStore<ClockIds> {
    pub fn new() -> Self {
        Self::with_ids(ClockIds::default())
    }
}

impl Default for EventStore<ClockIds> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: IdGenerator> EventStore<G> {
    pub fn with_ids(ids: G) -> Self {
        EventStore {
            buckets: EventMap::new(),
            index: HashMap::new(),
            ids,
        }
    }

    /// A store holding `map`, which must satisfy every store invariant.
    pub fn from_snapshot(map: EventMap, ids: G) -> Result<Self, SnapshotError> {
        let mut store = Self::with_ids(ids);
        store.restore(map)?;
        Ok(store)
    }

    /// Replace the contents with `map`, provided it satisfies every store
    /// invariant. On error the store keeps its current contents.
    pub fn restore(&mut self, map: EventMap) -> Result<(), SnapshotError> {
        let mut index = HashMap::new();
        let mut buckets = EventMap::new();

        for (date_key, events) in map {
            if events.is_empty() {
                continue;
            }

            for (position, event) in events.iter().enumerate() {
                event.check().map_err(|reason| SnapshotError::InvalidEvent {
                    date_key,
                    id: event.id,
                    reason,
                })?;

                if index.insert(event.id, date_key).is_some() {
                    return Err(SnapshotError::DuplicateId(event.id));
                }

                if let Some(earlier) = find_conflict(&event.span(), &events[..position], None) {
                    return Err(SnapshotError::Overlap {
                        date_key,
                        first: earlier.id,
                        second: event.id,
                    });
                }
            }

            buckets.insert(date_key, events);
        }

        for id in index.keys() {
            self.ids.observe(*id);
        }
        self.buckets = buckets;
        self.index = index;
        Ok(())
    }

    /// Create or replace an event on `date_key`.
    ///
    /// The draft is validated, then checked against the other events in the
    /// target bucket. An update keeps its id and is appended to the target
    /// bucket, whether or not the day changes.
    pub fn upsert(&mut self, date_key: DateKey, change: EventChange) -> Result<Event, StoreError> {
        let existing_id = change.existing_id();
        let valid = change.draft().validate()?;

        let previous_key = match existing_id {
            Some(id) => Some(
                *self
                    .index
                    .get(&id)
                    .ok_or(StoreError::NotFound { date_key, id })?,
            ),
            None => None,
        };

        if let Some(conflicting) = find_conflict(&valid.span, self.bucket(date_key), existing_id) {
            return Err(StoreError::Conflict {
                date_key,
                conflicting: Box::new(conflicting.clone()),
            });
        }

        let event = match (existing_id, previous_key) {
            (Some(id), Some(previous_key)) => {
                let event = valid.into_event(id);
                self.replace(previous_key, date_key, event.clone());
                debug!(%id, from = %previous_key, to = %date_key, "updated event");
                event
            }
            _ => {
                let id = self.mint_id()?;
                let event = valid.into_event(id);
                self.buckets.entry(date_key).or_default().push(event.clone());
                self.index.insert(id, date_key);
                debug!(%id, %date_key, "created event");
                event
            }
        };

        Ok(event)
    }

    pub fn create(&mut self, date_key: DateKey, draft: EventDraft) -> Result<Event, StoreError> {
        self.upsert(date_key, EventChange::Create(draft))
    }

    pub fn update(
        &mut self,
        date_key: DateKey,
        id: EventId,
        draft: EventDraft,
    ) -> Result<Event, StoreError> {
        self.upsert(date_key, EventChange::Update(id, draft))
    }

    /// Remove the event `id` from `date_key`'s bucket and return it.
    pub fn delete(&mut self, date_key: DateKey, id: EventId) -> Result<Event, StoreError> {
        let not_found = StoreError::NotFound { date_key, id };

        let bucket = self.buckets.get_mut(&date_key).ok_or(not_found.clone())?;
        let position = bucket
            .iter()
            .position(|event| event.id == id)
            .ok_or(not_found)?;

        let removed = bucket.remove(position);
        let now_empty = bucket.is_empty();
        if now_empty {
            self.buckets.remove(&date_key);
        }
        self.index.remove(&id);

        debug!(%id, %date_key, "deleted event");
        Ok(removed)
    }

    /// Owned copy of the events on `date_key`, in insertion order.
    pub fn list_by_date(&self, date_key: DateKey) -> Vec<Event> {
        self.bucket(date_key).to_vec()
    }

    /// Events on `date_key` accepted by `predicate`, in insertion order.
    pub fn filter<P>(&self, date_key: DateKey, mut predicate: P) -> Vec<Event>
    where
        P: FnMut(&Event) -> bool,
    {
        self.bucket(date_key)
            .iter()
            .filter(|event| predicate(event))
            .cloned()
            .collect()
    }

    /// Events on `date_key` whose title or description contains `term`,
    /// ignoring case. An empty term returns the whole day.
    pub fn search(&self, date_key: DateKey, term: &str) -> Vec<Event> {
        self.filter(date_key, |event| event.matches_text(term))
    }

    /// Look an event up by id alone.
    pub fn get(&self, id: EventId) -> Option<(DateKey, Event)> {
        let date_key = *self.index.get(&id)?;
        self.bucket(date_key)
            .iter()
            .find(|event| event.id == id)
            .map(|event| (date_key, event.clone()))
    }

    pub fn count_by_date(&self, date_key: DateKey) -> usize {
        self.bucket(date_key).len()
    }

    /// Days holding at least one event, ascending.
    pub fn date_keys(&self) -> impl Iterator<Item = DateKey> + '_ {
        self.buckets.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Owned copy of the full mapping.
    pub fn snapshot(&self) -> EventMap {
        self.buckets.clone()
    }

    pub(crate) fn buckets(&self) -> &EventMap {
        &self.buckets
    }

    fn bucket(&self, date_key: DateKey) -> &[Event] {
        self.buckets
            .get(&date_key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Take the old record out and append the new one, even on the same day.
    fn replace(&mut self, previous_key: DateKey, date_key: DateKey, event: Event) {
        let id = event.id;

        if let Some(bucket) = self.buckets.get_mut(&previous_key) {
            bucket.retain(|e| e.id != id);
            let now_empty = bucket.is_empty();
            if now_empty {
                self.buckets.remove(&previous_key);
            }
        }
        self.buckets.entry(date_key).or_default().push(event);
        self.index.insert(id, date_key);
    }

    fn mint_id(&mut self) -> Result<EventId, StoreError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.ids.next_id();
            if !self.index.contains_key(&id) {
                return Ok(id);
            }
        }
        Err(StoreError::IdsExhausted(MAX_ID_ATTEMPTS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::id::SequentialIds;
    use pretty_assertions::assert_eq;

    fn day(s: &str) -> DateKey {
        s.parse().unwrap()
    }

    fn store() -> EventStore<SequentialIds> {
        EventStore::with_ids(SequentialIds::default())
    }

    fn draft(title: &str, start: &str, end: &str) -> EventDraft {
        EventDraft::new(title, start, end)
    }

    fn titles(events: &[Event]) -> Vec<&str> {
        events.iter().map(|e| e.title.as_str()).collect()
    }

    #[test]
    fn test_standup_scenario() {
        let mut store = store();
        let june_1 = day("2024-06-01");

        let standup = store
            .create(
                june_1,
                draft("Standup", "09:00", "09:15").with_color("#3b82f6"),
            )
            .unwrap();
        assert_eq!(standup.id, EventId::new(1));
        assert_eq!(store.list_by_date(june_1), vec![standup.clone()]);

        let err = store
            .create(june_1, draft("Overlap", "09:10", "09:30"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
        assert_eq!(store.count_by_date(june_1), 1);

        assert_eq!(store.search(june_1, "stand"), vec![standup]);
        assert!(store.search(june_1, "zzz").is_empty());
    }

    #[test]
    fn test_non_overlapping_drafts_keep_insertion_order() {
        let mut store = store();
        let key = day("2024-06-03");
        store.create(key, draft("Late", "15:00", "16:00")).unwrap();
        store.create(key, draft("Early", "08:00", "09:00")).unwrap();
        store.create(key, draft("Noon", "12:00", "13:00")).unwrap();

        assert_eq!(titles(&store.list_by_date(key)), vec!["Late", "Early", "Noon"]);
    }

    #[test]
    fn test_boundaries() {
        let mut store = store();
        let key = day("2024-06-03");
        store.create(key, draft("A", "09:00", "10:00")).unwrap();

        assert!(store.create(key, draft("B", "10:00", "11:00")).is_ok());
        assert!(matches!(
            store.create(key, draft("C", "09:30", "10:30")),
            Err(StoreError::Conflict { .. })
        ));
        assert!(matches!(
            store.create(key, draft("D", "09:00", "09:01")),
            Err(StoreError::Conflict { .. })
        ));
    }

    #[test]
    fn test_conflict_names_the_existing_event() {
        let mut store = store();
        let key = day("2024-06-03");
        let lunch = store.create(key, draft("Lunch", "12:00", "13:00")).unwrap();

        match store.create(key, draft("Call", "12:30", "12:45")) {
            Err(StoreError::Conflict {
                date_key,
                conflicting,
            }) => {
                assert_eq!(date_key, key);
                assert_eq!(*conflicting, lunch);
            }
            other => panic!("Expected conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_same_time_on_other_days_is_fine() {
        let mut store = store();
        store.create(day("2024-06-03"), draft("A", "09:00", "10:00")).unwrap();
        store.create(day("2024-06-04"), draft("A", "09:00", "10:00")).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_update_with_own_interval_succeeds() {
        let mut store = store();
        let key = day("2024-06-03");
        let event = store.create(key, draft("Focus", "09:00", "11:00")).unwrap();

        let updated = store
            .update(key, event.id, draft("Deep focus", "09:00", "11:00"))
            .unwrap();
        assert_eq!(updated.id, event.id);
        assert_eq!(titles(&store.list_by_date(key)), vec!["Deep focus"]);
    }

    #[test]
    fn test_update_moves_event_to_end_of_bucket() {
        let mut store = store();
        let key = day("2024-06-03");
        store.create(key, draft("First", "08:00", "09:00")).unwrap();
        let middle = store.create(key, draft("Second", "10:00", "11:00")).unwrap();
        store.create(key, draft("Third", "12:00", "13:00")).unwrap();

        store
            .update(key, middle.id, draft("Second (moved)", "10:30", "11:30"))
            .unwrap();
        assert_eq!(
            titles(&store.list_by_date(key)),
            vec!["First", "Third", "Second (moved)"]
        );
    }

    #[test]
    fn test_same_span_update_still_appends() {
        let mut store = store();
        let key = day("2024-06-03");
        let a = store.create(key, draft("A", "08:00", "09:00")).unwrap();
        store.create(key, draft("B", "10:00", "11:00")).unwrap();

        store.update(key, a.id, draft("A2", "08:00", "09:00")).unwrap();
        assert_eq!(titles(&store.list_by_date(key)), vec!["B", "A2"]);
        assert_eq!(store.get(a.id).map(|(k, _)| k), Some(key));
    }

    #[test]
    fn test_update_still_conflicts_with_siblings() {
        let mut store = store();
        let key = day("2024-06-03");
        store.create(key, draft("A", "09:00", "10:00")).unwrap();
        let b = store.create(key, draft("B", "10:00", "11:00")).unwrap();

        let before = store.snapshot();
        let err = store.update(key, b.id, draft("B", "09:30", "11:00")).unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_update_moves_event_between_days() {
        let mut store = store();
        let monday = day("2024-06-03");
        let tuesday = day("2024-06-04");
        let event = store.create(monday, draft("Demo", "14:00", "15:00")).unwrap();

        store.update(tuesday, event.id, draft("Demo", "14:00", "15:00")).unwrap();

        assert!(store.list_by_date(monday).is_empty());
        assert_eq!(store.date_keys().collect::<Vec<_>>(), vec![tuesday]);
        assert_eq!(store.get(event.id).map(|(k, _)| k), Some(tuesday));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_move_checks_conflicts_on_target_day() {
        let mut store = store();
        let monday = day("2024-06-03");
        let tuesday = day("2024-06-04");
        let event = store.create(monday, draft("Demo", "14:00", "15:00")).unwrap();
        store.create(tuesday, draft("Busy", "14:30", "16:00")).unwrap();

        assert!(matches!(
            store.update(tuesday, event.id, draft("Demo", "14:00", "15:00")),
            Err(StoreError::Conflict { .. })
        ));
        assert_eq!(store.get(event.id).map(|(k, _)| k), Some(monday));
    }

    #[test]
    fn test_update_unknown_id_is_not_found() {
        let mut store = store();
        let key = day("2024-06-03");
        let err = store
            .update(key, EventId::new(99), draft("Ghost", "09:00", "10:00"))
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::NotFound {
                date_key: key,
                id: EventId::new(99)
            }
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_validation_runs_before_anything_else() {
        let mut store = store();
        let key = day("2024-06-03");

        assert_eq!(
            store.create(key, draft("", "09:00", "10:00")).unwrap_err(),
            StoreError::Validation(ValidationError::MissingField("title"))
        );
        assert!(matches!(
            store.create(key, draft("Backwards", "10:00", "09:00")),
            Err(StoreError::Validation(ValidationError::EndNotAfterStart { .. }))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_delete() {
        let mut store = store();
        let key = day("2024-06-03");
        let a = store.create(key, draft("A", "09:00", "10:00")).unwrap();
        let b = store.create(key, draft("B", "10:00", "11:00")).unwrap();

        assert_eq!(store.delete(key, a.id).unwrap(), a);
        assert_eq!(store.list_by_date(key), vec![b.clone()]);

        store.delete(key, b.id).unwrap();
        assert!(store.list_by_date(key).is_empty());
        assert_eq!(store.date_keys().count(), 0);
    }

    #[test]
    fn test_delete_unknown_or_wrong_day_leaves_store_alone() {
        let mut store = store();
        let key = day("2024-06-03");
        let a = store.create(key, draft("A", "09:00", "10:00")).unwrap();
        let before = store.snapshot();

        assert!(matches!(
            store.delete(key, EventId::new(42)),
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.delete(day("2024-06-04"), a.id),
            Err(StoreError::NotFound { .. })
        ));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_deleted_ids_are_not_reused() {
        let mut store = store();
        let key = day("2024-06-03");
        let a = store.create(key, draft("A", "09:00", "10:00")).unwrap();
        store.delete(key, a.id).unwrap();
        let b = store.create(key, draft("B", "09:00", "10:00")).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_list_is_a_copy() {
        let mut store = store();
        let key = day("2024-06-03");
        store.create(key, draft("A", "09:00", "10:00")).unwrap();

        let mut listed = store.list_by_date(key);
        listed[0].title = "Tampered".to_string();
        listed.clear();

        assert_eq!(titles(&store.list_by_date(key)), vec!["A"]);
    }

    #[test]
    fn test_filter_preserves_order() {
        let mut store = store();
        let key = day("2024-06-03");
        store.create(key, draft("Standup", "09:00", "09:15")).unwrap();
        store.create(key, draft("Lunch", "12:00", "13:00")).unwrap();
        store.create(key, draft("Stand-down", "17:00", "17:15")).unwrap();

        let found = store.filter(key, |e| e.title.starts_with("Stand"));
        assert_eq!(titles(&found), vec!["Standup", "Stand-down"]);
    }

    /// Hands out the same id forever.
    struct StuckIds;

    impl IdGenerator for StuckIds {
        fn next_id(&mut self) -> EventId {
            EventId::new(7)
        }
    }

    #[test]
    fn test_colliding_generator_cannot_break_id_uniqueness() {
        let mut store = EventStore::with_ids(StuckIds);
        let key = day("2024-06-03");
        store.create(key, draft("A", "09:00", "10:00")).unwrap();

        assert_eq!(
            store.create(key, draft("B", "10:00", "11:00")).unwrap_err(),
            StoreError::IdsExhausted(MAX_ID_ATTEMPTS)
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_restore_accepts_valid_map_and_advances_ids() {
        let mut source = store();
        let key = day("2024-06-03");
        source.create(key, draft("A", "09:00", "10:00")).unwrap();
        source.create(key, draft("B", "10:00", "11:00")).unwrap();

        let mut restored =
            EventStore::from_snapshot(source.snapshot(), SequentialIds::default()).unwrap();
        assert_eq!(restored.snapshot(), source.snapshot());

        let c = restored.create(key, draft("C", "11:00", "12:00")).unwrap();
        assert_eq!(c.id, EventId::new(3));
    }

    #[test]
    fn test_restore_rejects_overlaps_and_duplicates() {
        let key = day("2024-06-03");
        let mut source = store();
        let a = source.create(key, draft("A", "09:00", "10:00")).unwrap();

        let mut overlapping = source.snapshot();
        let mut clash = a.clone();
        clash.id = EventId::new(2);
        overlapping.get_mut(&key).unwrap().push(clash);

        let mut target = store();
        assert_eq!(
            target.restore(overlapping).unwrap_err(),
            SnapshotError::Overlap {
                date_key: key,
                first: a.id,
                second: EventId::new(2)
            }
        );
        assert!(target.is_empty());

        let mut duplicated = source.snapshot();
        duplicated.insert(day("2024-06-04"), vec![a.clone()]);
        assert_eq!(
            target.restore(duplicated).unwrap_err(),
            SnapshotError::DuplicateId(a.id)
        );
    }

    #[test]
    fn test_restore_rejects_invalid_events_and_skips_empty_buckets() {
        let key = day("2024-06-03");
        let mut source = store();
        let a = source.create(key, draft("A", "09:00", "10:00")).unwrap();

        let mut backwards = a.clone();
        std::mem::swap(&mut backwards.start_time, &mut backwards.end_time);
        let mut map = EventMap::new();
        map.insert(key, vec![backwards]);

        let mut target = store();
        assert!(matches!(
            target.restore(map),
            Err(SnapshotError::InvalidEvent { .. })
        ));

        let mut with_empty = source.snapshot();
        with_empty.insert(day("2024-06-05"), Vec::new());
        target.restore(with_empty).unwrap();
        assert_eq!(target.date_keys().collect::<Vec<_>>(), vec![key]);
    }
}
