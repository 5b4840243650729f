//! An in-process reference [`Storage`] implementation, for embedding this
//! engine in a process that has no external KV server and for the crate's
//! own test suite. It is wall-clock-free: TTLs are recorded but expiry is
//! evaluated lazily against an explicit `now`, since the engine itself never
//! needs to read the clock (every timestamp arrives in the Configuration).

use super::Storage;
use crate::error::StorageError;
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Default)]
struct HashRecord {
    fields: HashMap<Vec<u8>, i64>,
    expires_at: Option<i64>,
}

#[derive(Default)]
struct SetRecord {
    members: Vec<String>,
    expires_at: Option<i64>,
}

#[derive(Default)]
struct State {
    hashes: HashMap<String, HashRecord>,
    sets: HashMap<Vec<u8>, SetRecord>,
}

/// Reference adapter backing the `hincrby`/`hgetall`/`sadd`/`smembers`/`expireat`
/// contract with a plain map guarded by a single mutex. Assumes one command
/// executes at a time, as every other `Storage` implementation here does.
#[derive(Default)]
pub struct InMemoryStorage {
    state: Mutex<State>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expiration set on the hash at `key`, if any and if the hash exists.
    /// Exposed only for tests that assert TTL monotonicity.
    pub fn hash_expiry(&self, key: &str) -> Option<i64> {
        self.state.lock().hashes.get(key).and_then(|h| h.expires_at)
    }

    /// Expiration set on the set at `key`, if any and if the set exists.
    pub fn set_expiry(&self, key: &[u8]) -> Option<i64> {
        self.state.lock().sets.get(key).and_then(|s| s.expires_at)
    }
}

impl Storage for InMemoryStorage {
    fn hincrby(&self, key: &str, field: &[u8], delta: i64) -> Result<i64, StorageError> {
        let mut state = self.state.lock();
        let record = state.hashes.entry(key.to_string()).or_default();
        let value = record.fields.entry(field.to_vec()).or_insert(0);
        *value += delta;
        Ok(*value)
    }

    fn hgetall(&self, key: &str) -> Result<Vec<(Vec<u8>, i64)>, StorageError> {
        let state = self.state.lock();
        Ok(state
            .hashes
            .get(key)
            .map(|h| h.fields.iter().map(|(k, v)| (k.clone(), *v)).collect())
            .unwrap_or_default())
    }

    fn sadd(&self, key: &[u8], members: &[String]) -> Result<usize, StorageError> {
        let mut state = self.state.lock();
        let record = state.sets.entry(key.to_vec()).or_default();
        let mut added = 0;
        for member in members {
            if !record.members.contains(member) {
                record.members.push(member.clone());
                added += 1;
            }
        }
        Ok(added)
    }

    fn smembers(&self, key: &[u8]) -> Result<Vec<String>, StorageError> {
        let state = self.state.lock();
        Ok(state
            .sets
            .get(key)
            .map(|s| s.members.clone())
            .unwrap_or_default())
    }

    fn expireat(&self, key: &[u8], epoch_seconds: i64) -> Result<(), StorageError> {
        let mut state = self.state.lock();
        if let Some(hash) = state.hashes.get_mut(&String::from_utf8_lossy(key).into_owned()) {
            hash.expires_at = Some(epoch_seconds);
        }
        if let Some(set) = state.sets.get_mut(key) {
            set.expires_at = Some(epoch_seconds);
        }
        Ok(())
    }
}
