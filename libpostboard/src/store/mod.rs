//! Normalized entity storage
//!
//! `EntityStore` keeps entities in a map keyed by id alongside the ordered
//! list of ids produced by its sort comparer. Both views are updated
//! together so that every id in the order has an entry and vice versa.
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use libpostboard::store::EntityStore;
//! use libpostboard::types::{newest_first, Post, Reactions};
//!
//! let mut store = EntityStore::new(newest_first);
//! store.upsert_one(Post {
//!     id: 1,
//!     title: "Hello".to_string(),
//!     body: "World".to_string(),
//!     user_id: Some(1),
//!     date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
//!     reactions: Reactions::default(),
//! });
//!
//! assert_eq!(store.ids(), &[1]);
//! assert!(store.get(1).is_some());
//! ```

pub mod status;

pub use status::{LoadStatus, StatusTracker};

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

/// Revisions are drawn from one process-wide counter so that stores cloned
/// from a common ancestor never reuse a revision once they diverge.
static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

fn next_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, AtomicOrdering::Relaxed)
}

/// Anything that can be stored by id
pub trait Entity: Clone + PartialEq {
    type Id: Copy + Eq + Ord + Hash + fmt::Debug;

    fn id(&self) -> Self::Id;
}

/// Sort comparer applied to entities after every insert or update
pub type SortComparer<T> = fn(&T, &T) -> Ordering;

/// Keyed collection with a maintained sort order
#[derive(Clone)]
pub struct EntityStore<T: Entity> {
    entities: HashMap<T::Id, T>,
    ids: Vec<T::Id>,
    comparer: SortComparer<T>,
    revision: u64,
}

impl<T: Entity> EntityStore<T> {
    /// Create an empty store ordered by `comparer`.
    ///
    /// Entities the comparer considers equal are ordered by ascending id.
    pub fn new(comparer: SortComparer<T>) -> Self {
        Self {
            entities: HashMap::new(),
            ids: Vec::new(),
            comparer,
            revision: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: T::Id) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn get(&self, id: T::Id) -> Option<&T> {
        self.entities.get(&id)
    }

    /// Ids in sort order
    pub fn ids(&self) -> &[T::Id] {
        &self.ids
    }

    /// Entities in sort order
    pub fn all(&self) -> impl Iterator<Item = &T> + '_ {
        // `ids` and `entities` always hold the same keys
        self.ids.iter().filter_map(move |id| self.entities.get(id))
    }

    /// Changes whenever the stored data changes; zero for a new store.
    ///
    /// Two stores report the same non-zero revision only if one is an
    /// unmodified clone of the other.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Insert a new entity. An existing entry with the same id is replaced.
    pub fn add_one(&mut self, entity: T) {
        self.upsert_one(entity);
    }

    /// Insert or replace by id
    pub fn upsert_one(&mut self, entity: T) {
        if self.put(entity) {
            self.resort();
        }
    }

    /// Insert or replace each entity by id, sorting once at the end
    pub fn upsert_many<I>(&mut self, entities: I)
    where
        I: IntoIterator<Item = T>,
    {
        let mut changed = false;
        for entity in entities {
            changed |= self.put(entity);
        }
        if changed {
            self.resort();
        }
    }

    /// Remove by id; returns the removed entity if there was one
    pub fn remove_one(&mut self, id: T::Id) -> Option<T> {
        let removed = self.entities.remove(&id)?;
        self.ids.retain(|existing| *existing != id);
        self.revision = next_revision();
        Some(removed)
    }

    /// Mutate an entity in place. Returns false if the id is unknown.
    pub fn update_one<F>(&mut self, id: T::Id, f: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        let Some(entity) = self.entities.get(&id) else {
            return false;
        };
        let mut updated = entity.clone();
        f(&mut updated);
        if self.put(updated) {
            self.resort();
        }
        true
    }

    fn put(&mut self, entity: T) -> bool {
        let id = entity.id();
        match self.entities.get(&id) {
            Some(existing) if *existing == entity => false,
            Some(_) => {
                self.entities.insert(id, entity);
                self.revision = next_revision();
                true
            }
            None => {
                self.entities.insert(id, entity);
                self.ids.push(id);
                self.revision = next_revision();
                true
            }
        }
    }

    fn resort(&mut self) {
        let entities = &self.entities;
        let comparer = self.comparer;
        self.ids.sort_by(|a, b| match (entities.get(a), entities.get(b)) {
            (Some(x), Some(y)) => comparer(x, y).then_with(|| a.cmp(b)),
            _ => a.cmp(b),
        });
    }
}

/// Compares stored data only; revisions and comparers are ignored
impl<T: Entity> PartialEq for EntityStore<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ids == other.ids && self.entities == other.entities
    }
}

impl<T: Entity + fmt::Debug> fmt::Debug for EntityStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityStore")
            .field("ids", &self.ids)
            .field("entities", &self.entities)
            .field("revision", &self.revision)
            .finish()
    }
}
