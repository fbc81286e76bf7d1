// Copyright (C) 2025 Michael Herstine <sp1ff@pobox.com>
//
// This file is part of palaver.
//
// palaver is free software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// palaver is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without
// even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
// General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with palaver.  If not,
// see <http://www.gnu.org/licenses/>.

//! # memory
//!
//! In-memory [Store] implementation.
//!
//! All state lives behind a single mutex, which makes [Store::execute] trivially atomic: the
//! entire batch is applied under one acquisition, so no reader or competing transaction can
//! observe a half-applied batch. Cloning a [MemoryStore] clones the handle, not the data.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use tap::Pipe;
use tracing::debug;

use crate::store::{Command, Error, Store, Transaction};

type Result<T> = std::result::Result<T, Error>;

/// An in-memory [Store]
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

// Sorted sets are kept as member-to-score maps & sorted on demand; the sets this crate serves top
// out at feed-page sizes, where sorting at read time beats maintaining a parallel order structure.
#[derive(Debug, Default)]
struct Inner {
    zsets: HashMap<String, HashMap<u64, i64>>,
    sets: HashMap<String, HashSet<u64>>,
    counters: HashMap<String, i64>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn zset_score(&self, key: &str, member: u64) -> Result<Option<i64>> {
        self.inner
            .lock()
            .expect("Poisoned mutex!")
            .zsets
            .get(key)
            .and_then(|zset| zset.get(&member))
            .copied()
            .pipe(Ok)
    }

    async fn zset_card(&self, key: &str) -> Result<usize> {
        self.inner
            .lock()
            .expect("Poisoned mutex!")
            .zsets
            .get(key)
            .map(|zset| zset.len())
            .unwrap_or(0)
            .pipe(Ok)
    }

    async fn zset_rev_range(
        &self,
        key: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Option<Vec<u64>>> {
        let inner = self.inner.lock().expect("Poisoned mutex!");
        match inner.zsets.get(key) {
            // Absent key, *not* an empty range-- callers tell the two apart
            None => Ok(None),
            Some(zset) => {
                let mut members = zset.iter().map(|(m, s)| (*m, *s)).collect::<Vec<_>>();
                members.sort_by(|lhs, rhs| rhs.1.cmp(&lhs.1).then(rhs.0.cmp(&lhs.0)));
                members
                    .into_iter()
                    .skip(offset)
                    .take(limit)
                    .map(|(member, _score)| member)
                    .collect::<Vec<_>>()
                    .pipe(Some)
                    .pipe(Ok)
            }
        }
    }

    async fn set_is_member(&self, key: &str, member: u64) -> Result<bool> {
        self.inner
            .lock()
            .expect("Poisoned mutex!")
            .sets
            .get(key)
            .map(|set| set.contains(&member))
            .unwrap_or(false)
            .pipe(Ok)
    }

    async fn set_card(&self, key: &str) -> Result<usize> {
        self.inner
            .lock()
            .expect("Poisoned mutex!")
            .sets
            .get(key)
            .map(|set| set.len())
            .unwrap_or(0)
            .pipe(Ok)
    }

    async fn counter_get(&self, key: &str) -> Result<Option<i64>> {
        self.inner
            .lock()
            .expect("Poisoned mutex!")
            .counters
            .get(key)
            .copied()
            .pipe(Ok)
    }

    async fn execute(&self, tx: Transaction) -> Result<()> {
        let mut inner = self.inner.lock().expect("Poisoned mutex!");
        let commands = tx.into_commands();
        debug!("MemoryStore::execute(): applying {} command(s)", commands.len());
        for command in commands {
            match command {
                Command::ZsetAdd { key, member, score } => {
                    inner.zsets.entry(key).or_default().insert(member, score);
                }
                Command::ZsetRemove { key, member } => {
                    if let Some(zset) = inner.zsets.get_mut(&key) {
                        zset.remove(&member);
                        // An empty set & an absent key must be indistinguishable, so drop the key
                        if zset.is_empty() {
                            inner.zsets.remove(&key);
                        }
                    }
                }
                Command::SetAdd { key, member } => {
                    inner.sets.entry(key).or_default().insert(member);
                }
                Command::SetRemove { key, member } => {
                    if let Some(set) = inner.sets.get_mut(&key) {
                        set.remove(&member);
                        if set.is_empty() {
                            inner.sets.remove(&key);
                        }
                    }
                }
                Command::Increment { key } => {
                    *inner.counters.entry(key).or_insert(0) += 1;
                }
                Command::Decrement { key } => {
                    // No floor at zero; the service layer owns that risk
                    *inner.counters.entry(key).or_insert(0) -= 1;
                }
            }
        }
        Ok(())
    }
}
