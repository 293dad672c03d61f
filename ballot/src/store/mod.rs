//! Observable state shared with presentation layers.
//!
//! Only the sync engine writes candidates and flags from remote truth; the
//! admin channel may set a flag optimistically, and the load driver owns the
//! load-running flag. Readers go through the accessors and re-read on every
//! notification.

use crate::storage::Storage;
use ballot_common::{candidate::Candidate, category::Category};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

type Callback = Arc<dyn Fn() + Send + Sync>;

pub(crate) struct StoreState {
    pub candidates: Vec<Candidate>,
    pub voting_open: bool,
    pub test_mode: bool,
    pub load_running: bool,
    /// Whether the last snapshot carried the test-mode sentinel row.
    pub setting_row_seen: bool,
    /// Whether the last snapshot carried the voting-status sentinel row.
    pub status_row_seen: bool,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            candidates: Vec::new(),
            voting_open: true,
            test_mode: false,
            load_running: false,
            setting_row_seen: false,
            status_row_seen: false,
        }
    }
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    callbacks: Vec<(u64, Callback)>,
}

pub struct Store<S> {
    state: RwLock<StoreState>,
    listeners: Arc<Mutex<Listeners>>,
    storage: Arc<S>,
}

impl<S: Storage> Store<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            state: RwLock::default(),
            listeners: Arc::default(),
            storage,
        }
    }

    pub fn candidates(&self) -> Vec<Candidate> {
        self.read(|state| state.candidates.clone())
    }

    /// Candidates ordered by their score in `category`, highest first.
    pub fn ranking(&self, category: Category) -> Vec<Candidate> {
        let mut candidates = self.candidates();
        candidates.sort_by(|a, b| b.score(category).cmp(&a.score(category)));
        candidates
    }

    pub fn voting_open(&self) -> bool {
        self.read(|state| state.voting_open)
    }

    pub fn test_mode(&self) -> bool {
        self.read(|state| state.test_mode)
    }

    pub fn load_running(&self) -> bool {
        self.read(|state| state.load_running)
    }

    /// Read through to durable storage on every call.
    pub fn has_voted(&self) -> bool {
        match self.storage.has_voted() {
            Ok(voted) => voted,
            Err(e) => {
                tracing::warn!("failed to read the voted flag: {}", e);
                false
            }
        }
    }

    /// Registers `callback`, invokes it once right away and returns the
    /// handle that removes it again.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let callback: Callback = Arc::new(callback);
        let id = {
            let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
            let id = listeners.next_id;
            listeners.next_id += 1;
            listeners.callbacks.push((id, callback.clone()));
            id
        };

        callback();

        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Invokes every callback in registration order.
    pub fn notify(&self) {
        let callbacks = {
            let listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
            listeners
                .callbacks
                .iter()
                .map(|(_, callback)| callback.clone())
                .collect::<Vec<_>>()
        };

        tracing::trace!(listeners = callbacks.len(), "notify");
        for callback in callbacks {
            callback();
        }
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&StoreState) -> R) -> R {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> R {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }
}

/// Returned by [`Store::subscribe`]. Dropping it keeps the callback
/// registered; call [`Subscription::unsubscribe`] to remove it.
pub struct Subscription {
    id: u64,
    listeners: Weak<Mutex<Listeners>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        if let Some(listeners) = self.listeners.upgrade() {
            let mut listeners = listeners.lock().unwrap_or_else(PoisonError::into_inner);
            listeners.callbacks.retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use ballot_common::candidate::Scores;
    use ballot_common::types::palette_color;

    fn store() -> Store<MemoryStorage> {
        Store::new(Arc::new(MemoryStorage::default()))
    }

    fn candidate(id: &str, singing: u64, costume: u64) -> Candidate {
        Candidate {
            id: id.to_string(),
            name: id.to_uppercase(),
            song: String::new(),
            image: String::new(),
            video_link: String::new(),
            scores: Scores {
                singing,
                popularity: 0,
                costume,
            },
            total_score: 0,
            vote_count: 0,
            color: palette_color(0),
        }
    }

    #[test]
    fn subscribe_invokes_immediately_then_in_order() {
        let store = store();
        let calls = Arc::new(Mutex::new(Vec::new()));

        let c = calls.clone();
        let first = store.subscribe(move || c.lock().unwrap().push("first"));
        let c = calls.clone();
        let _second = store.subscribe(move || c.lock().unwrap().push("second"));
        assert_eq!(*calls.lock().unwrap(), vec!["first", "second"]);

        store.notify();
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["first", "second", "first", "second"]
        );

        first.unsubscribe();
        store.notify();
        assert_eq!(calls.lock().unwrap().last(), Some(&"second"));
        assert_eq!(calls.lock().unwrap().len(), 5);
    }

    #[test]
    fn callbacks_may_read_state() {
        let store = Arc::new(store());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let (s, r) = (seen.clone(), Arc::downgrade(&store));
        let _sub = store.subscribe(move || {
            if let Some(store) = r.upgrade() {
                s.lock().unwrap().push(store.voting_open());
            }
        });
        store.update(|state| state.voting_open = false);
        store.notify();

        assert_eq!(*seen.lock().unwrap(), vec![true, false]);
    }

    #[test]
    fn has_voted_reads_storage() {
        let storage = Arc::new(MemoryStorage::default());
        let store = Store::new(storage.clone());
        assert!(!store.has_voted());
        storage.set_voted().unwrap();
        assert!(store.has_voted());
    }

    #[test]
    fn ranking_by_category() {
        let store = store();
        store.update(|state| {
            state.candidates = vec![candidate("a", 1, 9), candidate("b", 5, 0), candidate("c", 3, 4)]
        });

        let ids = |list: Vec<Candidate>| list.into_iter().map(|c| c.id).collect::<Vec<_>>();
        assert_eq!(ids(store.ranking(Category::Singing)), vec!["b", "c", "a"]);
        assert_eq!(ids(store.ranking(Category::Costume)), vec!["a", "c", "b"]);
        assert_eq!(ids(store.ranking(Category::Popularity)), vec!["a", "b", "c"]);
    }
}
