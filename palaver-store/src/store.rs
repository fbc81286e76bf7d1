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

//! # store
//!
//! The store protocol.
//!
//! Keys are strings (see `palaver::keys` for how the service crate mints them), members are `u64`
//! identifiers, and sorted-set scores are `i64` milliseconds since the Unix epoch. Mutation is
//! only possible through a [Transaction]: callers queue commands against the handle, then hand the
//! whole batch to [Store::execute], which applies it all-or-nothing relative to other
//! transactions. A [Transaction] holds no lock and touches no connection while commands are being
//! queued, so dropping one on an early-return path abandons it cleanly.
//!
//! Reads ([Store::zset_score] & friends) are single round-trips outside any transaction. A read
//! performed before [Store::execute] is *not* part of the atomic unit.

use async_trait::async_trait;

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                       module Error type                                        //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// The store error type
///
/// Implementations of [Store] will have wildly different failure modes (a network store can lose
/// its connection, an in-memory store can't fail at all), so this type just wraps whatever the
/// backend produced. Callers are expected to propagate it; retry & circuit-breaking are the
/// business of the layer above.
#[derive(Debug)]
pub struct Error {
    source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl std::error::Error for Error {}

impl Error {
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Error {
        Error {
            source: Box::new(err),
        }
    }
}

type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                          Transaction                                           //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// A single write queued in a [Transaction]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    /// Add `member` to the sorted set at `key` with the given score, overwriting the score if the
    /// member is already present
    ZsetAdd { key: String, member: u64, score: i64 },
    /// Remove `member` from the sorted set at `key`; no-op if absent
    ZsetRemove { key: String, member: u64 },
    /// Add `member` to the plain set at `key`; no-op if already present
    SetAdd { key: String, member: u64 },
    /// Remove `member` from the plain set at `key`; no-op if absent
    SetRemove { key: String, member: u64 },
    /// Add one to the counter at `key`, treating an absent counter as zero
    Increment { key: String },
    /// Subtract one from the counter at `key`, treating an absent counter as zero
    Decrement { key: String },
}

/// A queued batch of writes
///
/// Commands are buffered in the order issued; nothing reaches the store until the handle is given
/// to [Store::execute]. Queuing is infallible (the commands are validated by construction).
#[derive(Debug, Default)]
pub struct Transaction {
    commands: Vec<Command>,
}

impl Transaction {
    pub fn new() -> Transaction {
        Transaction::default()
    }
    pub fn zset_add(&mut self, key: impl Into<String>, member: u64, score: i64) {
        self.commands.push(Command::ZsetAdd {
            key: key.into(),
            member,
            score,
        });
    }
    pub fn zset_remove(&mut self, key: impl Into<String>, member: u64) {
        self.commands.push(Command::ZsetRemove {
            key: key.into(),
            member,
        });
    }
    pub fn set_add(&mut self, key: impl Into<String>, member: u64) {
        self.commands.push(Command::SetAdd {
            key: key.into(),
            member,
        });
    }
    pub fn set_remove(&mut self, key: impl Into<String>, member: u64) {
        self.commands.push(Command::SetRemove {
            key: key.into(),
            member,
        });
    }
    pub fn increment(&mut self, key: impl Into<String>) {
        self.commands.push(Command::Increment { key: key.into() });
    }
    pub fn decrement(&mut self, key: impl Into<String>) {
        self.commands.push(Command::Decrement { key: key.into() });
    }
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
    pub fn len(&self) -> usize {
        self.commands.len()
    }
    /// Surrender the queued commands, in issue order
    pub fn into_commands(self) -> Vec<Command> {
        self.commands
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                              Store                                             //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Object-safe trait abstracting over the secondary-index store
///
/// Implementations must maintain two lifecycle rules, which the service layer leans on:
///
/// 1. removing the last member of a (sorted) set deletes the key outright, so a subsequent
///    [zset_rev_range] returns `None` rather than `Some(vec![])`;
/// 2. writing to an absent key creates it.
///
/// Read-after-write on the same handle is immediate; no stronger ordering guarantee is made with
/// respect to concurrent writers.
///
/// [zset_rev_range]: Store::zset_rev_range
#[async_trait]
pub trait Store {
    /// Retrieve the score of `member` in the sorted set at `key`; `None` if the key is absent or
    /// the member isn't in it
    async fn zset_score(&self, key: &str, member: u64) -> Result<Option<i64>>;
    /// Cardinality of the sorted set at `key` (zero if absent)
    async fn zset_card(&self, key: &str) -> Result<usize>;
    /// Walk the sorted set at `key` by descending score (ties broken by descending member),
    /// skipping `offset` members & yielding at most `limit`
    ///
    /// `None` means the key is absent; `Some` carries the members in range, possibly none. Callers
    /// paginating through a set use `None` as their stop signal, so implementations must preserve
    /// the distinction.
    async fn zset_rev_range(
        &self,
        key: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Option<Vec<u64>>>;
    /// Test membership of `member` in the plain set at `key`
    async fn set_is_member(&self, key: &str, member: u64) -> Result<bool>;
    /// Cardinality of the plain set at `key` (zero if absent)
    async fn set_card(&self, key: &str) -> Result<usize>;
    /// Current value of the counter at `key`; `None` if it has never been touched
    async fn counter_get(&self, key: &str) -> Result<Option<i64>>;
    /// Apply a queued batch of writes atomically with respect to other transactions
    async fn execute(&self, tx: Transaction) -> Result<()>;
}
