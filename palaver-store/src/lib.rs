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

//! # palaver-store
//!
//! The [palaver] social-graph services keep their relationship sets & like counts in a secondary
//! index, not in the system of record. This crate defines the protocol that index must speak (a
//! small slice of the usual key-value repertoire: sorted sets, plain sets, counters, and an atomic
//! multi-command transaction) and provides an in-memory implementation of it.
//!
//! [palaver]: https://en.wiktionary.org/wiki/palaver
//!
//! The protocol is deliberately indifferent to the wire: anything that can add & remove scored
//! members, test set membership, bump a counter, and apply a queued batch of writes atomically can
//! sit behind [Store]. The [MemoryStore] implementation here is what the test-suites run against,
//! and is perfectly serviceable for a single-process deployment.

pub mod memory;
pub mod store;

pub use memory::MemoryStore;
pub use store::{Command, Error, Store, Transaction};
