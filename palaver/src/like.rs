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

//! # like
//!
//! Like reactions on entities, plus a per-author running total.
//!
//! [like] is a *toggle*, not an idempotent "set liked": each call flips the caller's membership in
//! the entity's like set and moves the author's counter by one in the matching direction. The
//! membership read happens before the transaction is opened, so two concurrent calls for the same
//! (user, entity) pair can both observe the same state & double-toggle. Likewise, nothing checks
//! that `author` actually authored the entity; a caller that passes a different author on the
//! un-like than on the like walks the wrong counter, possibly below zero. Both are properties of
//! the current contract, not oversights; see DESIGN.md before "fixing" either.
//!
//! [like]: Likes::like

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use snafu::{Backtrace, ResultExt, Snafu};
use tap::Pipe;
use tracing::debug;

use palaver_store::{Store, Transaction};

use crate::{
    entities::{EntityId, EntityType, UserId},
    keys,
};

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                       module Error type                                        //
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Failed to count an entity's likes: {source}"))]
    EntityLikeCount {
        source: palaver_store::Error,
        backtrace: Backtrace,
    },
    #[snafu(display("Failed to toggle a like: {source}"))]
    Like {
        source: palaver_store::Error,
        backtrace: Backtrace,
    },
    #[snafu(display("Failed to check a like status: {source}"))]
    Status {
        source: palaver_store::Error,
        backtrace: Backtrace,
    },
    #[snafu(display("Attempted to deserialize an invalid value for LikeStatus: {n}"))]
    StatusDe { n: u8 },
    #[snafu(display("Failed to read a user's like count: {source}"))]
    UserLikeCount {
        source: palaver_store::Error,
        backtrace: Backtrace,
    },
}

type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                          LikeStatus                                            //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Whether a given user currently likes a given entity
///
/// Serializes as 0/1; that's the shape clients already consume.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum LikeStatus {
    NotLiked,
    Liked,
}

impl From<LikeStatus> for u8 {
    fn from(status: LikeStatus) -> u8 {
        match status {
            LikeStatus::NotLiked => 0,
            LikeStatus::Liked => 1,
        }
    }
}

impl TryFrom<u8> for LikeStatus {
    type Error = Error;

    fn try_from(n: u8) -> Result<LikeStatus> {
        match n {
            0 => Ok(LikeStatus::NotLiked),
            1 => Ok(LikeStatus::Liked),
            n => Err(StatusDeSnafu { n }.build()),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                             Likes                                              //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// The like component
pub struct Likes {
    store: Arc<dyn Store + Send + Sync>,
}

impl Likes {
    pub fn new(store: Arc<dyn Store + Send + Sync>) -> Likes {
        Likes { store }
    }

    /// Toggle `user`'s like on an entity, crediting (or debiting) `author`
    ///
    /// If `user` is currently in the entity's like set, remove them & decrement `author`'s
    /// counter; otherwise add them & increment it. The removal-or-addition and the counter move
    /// are applied in one transaction; the membership read is not part of it.
    pub async fn like(
        &self,
        user: &UserId,
        entity_type: EntityType,
        entity: &EntityId,
        author: &UserId,
    ) -> Result<()> {
        let entity_key = keys::entity_like(entity_type, entity);
        let author_key = keys::user_like(author);
        let liked = self
            .store
            .set_is_member(&entity_key, user.as_u64())
            .await
            .context(LikeSnafu)?;
        let mut tx = Transaction::new();
        if liked {
            tx.set_remove(&entity_key, user.as_u64());
            tx.decrement(&author_key);
        } else {
            tx.set_add(&entity_key, user.as_u64());
            tx.increment(&author_key);
        }
        self.store.execute(tx).await.context(LikeSnafu)?;
        debug!(
            "Likes::like(): {user} {} {entity_type}/{entity}",
            if liked { "un-liked" } else { "liked" }
        );
        Ok(())
    }

    /// The number of users who currently like an entity
    pub async fn entity_like_count(
        &self,
        entity_type: EntityType,
        entity: &EntityId,
    ) -> Result<usize> {
        self.store
            .set_card(&keys::entity_like(entity_type, entity))
            .await
            .context(EntityLikeCountSnafu)
    }

    /// Does `user` currently like an entity?
    pub async fn entity_like_status(
        &self,
        user: &UserId,
        entity_type: EntityType,
        entity: &EntityId,
    ) -> Result<LikeStatus> {
        self.store
            .set_is_member(&keys::entity_like(entity_type, entity), user.as_u64())
            .await
            .context(StatusSnafu)?
            .pipe(|member| {
                if member {
                    LikeStatus::Liked
                } else {
                    LikeStatus::NotLiked
                }
            })
            .pipe(Ok)
    }

    /// The running total of likes received by `user` across everything they've authored
    ///
    /// Never initialized reads as zero. This is an independently-maintained counter, not a sum
    /// over like sets, and it can go negative if callers toggle with inconsistent `author`
    /// arguments.
    pub async fn user_like_count(&self, user: &UserId) -> Result<i64> {
        self.store
            .counter_get(&keys::user_like(user))
            .await
            .context(UserLikeCountSnafu)
            .map(|count| count.unwrap_or(0))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn like_status_wire_shape() {
        assert_eq!(serde_json::to_string(&LikeStatus::Liked).unwrap(), "1");
        assert_eq!(serde_json::to_string(&LikeStatus::NotLiked).unwrap(), "0");
        assert_eq!(
            serde_json::from_str::<LikeStatus>("1").unwrap(),
            LikeStatus::Liked
        );
        assert!(serde_json::from_str::<LikeStatus>("2").is_err());
    }
}
