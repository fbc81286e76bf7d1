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

//! # follow
//!
//! Follow relationships between users & entities.
//!
//! Each relationship is written twice: once into the subject's followee set and once into the
//! target's follower set, both scored with the follow time in milliseconds. Scoring by timestamp
//! turns a set into a time-ordered feed without a separate ordering structure, and the symmetric
//! dual-write buys O(1) lookups in both directions at the cost of write amplification. The two
//! writes always travel in the same transaction; the sets must never disagree about a
//! relationship.
//!
//! There is no relationship entity anywhere: a follow exists exactly as long as its two set
//! entries do. Unfollowing removes the entries; there is no tombstone.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use snafu::{Backtrace, ResultExt, Snafu};
use tap::Pipe;
use tracing::debug;

use palaver_store::{Store, Transaction};

use crate::{
    entities::{EntityId, EntityType, User, UserId},
    keys,
    storage::{self, Backend as StorageBackend},
};

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                       module Error type                                        //
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Failed to record a follow: {source}"))]
    Follow {
        source: palaver_store::Error,
        backtrace: Backtrace,
    },
    #[snafu(display("Failed to count followees: {source}"))]
    FolloweeCount {
        source: palaver_store::Error,
        backtrace: Backtrace,
    },
    #[snafu(display("Failed to count followers: {source}"))]
    FollowerCount {
        source: palaver_store::Error,
        backtrace: Backtrace,
    },
    #[snafu(display("Failed to check a follow relationship: {source}"))]
    HasFollowed {
        source: palaver_store::Error,
        backtrace: Backtrace,
    },
    #[snafu(display("Failed to walk the set at {key}: {source}"))]
    List {
        key: String,
        source: palaver_store::Error,
        backtrace: Backtrace,
    },
    #[snafu(display("Failed to read the score of {member} in {key}: {source}"))]
    Score {
        key: String,
        member: u64,
        source: palaver_store::Error,
        backtrace: Backtrace,
    },
    #[snafu(display("Failed to record an unfollow: {source}"))]
    Unfollow {
        source: palaver_store::Error,
        backtrace: Backtrace,
    },
    #[snafu(display("Failed to look up user {id}: {source}"))]
    User {
        id: UserId,
        source: storage::Error,
    },
}

type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                           Follows                                              //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// One row in a follower or followee listing
///
/// `user` is `None` when the identifier no longer resolves (the account was deleted after the
/// relationship was recorded); the row is still returned so that pagination stays stable.
#[derive(Clone, Debug, Serialize)]
pub struct FollowEntry {
    pub user: Option<User>,
    #[serde(rename = "followed-at")]
    pub followed_at: DateTime<Utc>,
}

/// The follow component
///
/// Holds the secondary-index store plus the user-lookup seam used to hydrate listings.
pub struct Follows {
    store: Arc<dyn Store + Send + Sync>,
    users: Arc<dyn StorageBackend + Send + Sync>,
}

impl Follows {
    pub fn new(
        store: Arc<dyn Store + Send + Sync>,
        users: Arc<dyn StorageBackend + Send + Sync>,
    ) -> Follows {
        Follows { store, users }
    }

    /// Have `subject` follow `target`
    ///
    /// Idempotent in effect: re-following refreshes the relationship's timestamp to "now" rather
    /// than erroring, and leaves both cardinalities unchanged.
    pub async fn follow(
        &self,
        subject: &UserId,
        entity_type: EntityType,
        target: &EntityId,
    ) -> Result<()> {
        // One instant for both writes; the two sets must agree on when the follow happened.
        let now = Utc::now().timestamp_millis();
        let mut tx = Transaction::new();
        tx.zset_add(keys::followee(subject, entity_type), target.as_u64(), now);
        tx.zset_add(keys::follower(entity_type, target), subject.as_u64(), now);
        self.store.execute(tx).await.context(FollowSnafu)?;
        debug!("Follows::follow(): {subject} -> {entity_type}/{target}");
        Ok(())
    }

    /// Have `subject` stop following `target`; a no-op if there is no such relationship
    pub async fn unfollow(
        &self,
        subject: &UserId,
        entity_type: EntityType,
        target: &EntityId,
    ) -> Result<()> {
        let mut tx = Transaction::new();
        tx.zset_remove(keys::followee(subject, entity_type), target.as_u64());
        tx.zset_remove(keys::follower(entity_type, target), subject.as_u64());
        self.store.execute(tx).await.context(UnfollowSnafu)?;
        debug!("Follows::unfollow(): {subject} -x-> {entity_type}/{target}");
        Ok(())
    }

    /// The number of entities of one kind that `subject` follows
    pub async fn followee_count(&self, subject: &UserId, entity_type: EntityType) -> Result<usize> {
        self.store
            .zset_card(&keys::followee(subject, entity_type))
            .await
            .context(FolloweeCountSnafu)
    }

    /// The number of users following `target`
    pub async fn follower_count(&self, entity_type: EntityType, target: &EntityId) -> Result<usize> {
        self.store
            .zset_card(&keys::follower(entity_type, target))
            .await
            .context(FollowerCountSnafu)
    }

    /// Is `subject` currently following `target`?
    pub async fn has_followed(
        &self,
        subject: &UserId,
        entity_type: EntityType,
        target: &EntityId,
    ) -> Result<bool> {
        self.store
            .zset_score(&keys::followee(subject, entity_type), target.as_u64())
            .await
            .context(HasFollowedSnafu)
            .map(|score| score.is_some())
    }

    /// The users `subject` follows, most recently followed first
    ///
    /// `None` means `subject` has never followed anyone (or has unfollowed everyone)-- callers
    /// paginating through the listing use it as their stop signal. `Some(vec![])` means the set
    /// exists but `offset` is past its end.
    pub async fn followees(
        &self,
        subject: &UserId,
        offset: usize,
        limit: usize,
    ) -> Result<Option<Vec<FollowEntry>>> {
        self.listing(&keys::followee(subject, EntityType::User), offset, limit)
            .await
    }

    /// The users following `target`, most recently followed first; same contract as [followees]
    ///
    /// [followees]: Follows::followees
    pub async fn followers(
        &self,
        target: &UserId,
        offset: usize,
        limit: usize,
    ) -> Result<Option<Vec<FollowEntry>>> {
        self.listing(
            &keys::follower(EntityType::User, &EntityId::from(target)),
            offset,
            limit,
        )
        .await
    }

    /// Walk a relationship set by descending follow time & hydrate each member through the
    /// user-lookup seam
    async fn listing(
        &self,
        key: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Option<Vec<FollowEntry>>> {
        let members = match self
            .store
            .zset_rev_range(key, offset, limit)
            .await
            .context(ListSnafu { key })?
        {
            Some(members) => members,
            None => return Ok(None),
        };
        let mut entries = Vec::with_capacity(members.len());
        for member in members {
            let id = UserId::from(member);
            let user = self.users.user_for_id(&id).await.context(UserSnafu { id })?;
            let score = self
                .store
                .zset_score(key, member)
                .await
                .context(ScoreSnafu { key, member })?;
            // A concurrent unfollow can drop the member between the range read & the score read;
            // skip the row rather than invent a timestamp.
            let followed_at = match score.and_then(DateTime::from_timestamp_millis) {
                Some(dt) => dt,
                None => continue,
            };
            entries.push(FollowEntry { user, followed_at });
        }
        entries.pipe(Some).pipe(Ok)
    }
}
