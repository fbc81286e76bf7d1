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

//! # keys
//!
//! Store key naming. Pure functions of (identifiers, entity type); the formats below are a
//! contract with whatever is already in the store, so changing them orphans existing data.

use crate::entities::{EntityId, EntityType, UserId};

const SEPARATOR: &str = ":";

const PREFIX_FOLLOWEE: &str = "followee";
const PREFIX_FOLLOWER: &str = "follower";
const PREFIX_ENTITY_LIKE: &str = "like:entity";
const PREFIX_USER_LIKE: &str = "like:user";

/// Key of the sorted set of entities `subject` follows, of one kind: member = entity id, score =
/// follow time in milliseconds
pub fn followee(subject: &UserId, entity_type: EntityType) -> String {
    format!("{PREFIX_FOLLOWEE}{SEPARATOR}{subject}{SEPARATOR}{entity_type}")
}

/// Key of the sorted set of users following `target`: member = user id, score = follow time in
/// milliseconds
pub fn follower(entity_type: EntityType, target: &EntityId) -> String {
    format!("{PREFIX_FOLLOWER}{SEPARATOR}{entity_type}{SEPARATOR}{target}")
}

/// Key of the plain set of users who currently like `entity`
pub fn entity_like(entity_type: EntityType, entity: &EntityId) -> String {
    format!("{PREFIX_ENTITY_LIKE}{SEPARATOR}{entity_type}{SEPARATOR}{entity}")
}

/// Key of the running count of likes received by `user` across everything they've authored
pub fn user_like(user: &UserId) -> String {
    format!("{PREFIX_USER_LIKE}{SEPARATOR}{user}")
}
