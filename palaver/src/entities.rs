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

//! # palaver models
//!
//! I hate these sort of "catch-all" modules named "models" or "entities", but these types are
//! truly foundational: identifiers, the entity-type tag, and the display-ready [User] record that
//! the user-lookup seam returns.

use std::{fmt::Display, ops::Deref, str::FromStr};

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use snafu::{Backtrace, prelude::*};
use url::Url;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("{name} is not a valid palaver username"))]
    BadUsername { name: String, backtrace: Backtrace },
}

type Result<T> = std::result::Result<T, Error>;

type StdResult<T, E> = std::result::Result<T, E>;

// Convenience function for implementing `Deserialize` on refined types
fn mk_serde_de_err<'de, D: Deserializer<'de>>(err: Error) -> D::Error {
    <D::Error as serde::de::Error>::custom(format!("{}", err))
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                          identifiers                                           //
////////////////////////////////////////////////////////////////////////////////////////////////////

// Identifiers come from the system of record, which hands out small integers; in the store they
// show up both inside keys and as set members.
macro_rules! define_id {
    ($type_name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(
            Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
        )]
        #[serde(transparent)]
        pub struct $type_name(u64);

        impl $type_name {
            pub fn new(id: u64) -> $type_name {
                $type_name(id)
            }
            /// The raw identifier, as stored as a set member
            pub fn as_u64(&self) -> u64 {
                self.0
            }
        }

        impl Display for $type_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $type_name {
            fn from(id: u64) -> $type_name {
                $type_name(id)
            }
        }
    };
}

define_id!(UserId, "Identifier for a palaver user");
define_id!(EntityId, "Identifier for a followable/likable entity (user, post, comment...)");

// Users are themselves followable entities; their entity id is just their user id.
impl From<&UserId> for EntityId {
    fn from(id: &UserId) -> EntityId {
        EntityId(id.0)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                           EntityType                                           //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// The kind of thing being followed or liked
///
/// The numeric tags are part of the key format (and hence of any store contents written by prior
/// deployments); they must not be renumbered.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum EntityType {
    Post,
    Comment,
    User,
}

impl EntityType {
    pub fn tag(&self) -> u8 {
        match self {
            EntityType::Post => 1,
            EntityType::Comment => 2,
            EntityType::User => 3,
        }
    }
}

impl Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                            Username                                            //
////////////////////////////////////////////////////////////////////////////////////////////////////

// palaver usernames must be ASCII, may be from two to sixty-four characters in length, and must
// match the regex "^[a-zA-Z][-_.a-zA-Z0-9]+$".
const MIN_USERNAME_LENGTH: usize = 2;
const MAX_USERNAME_LENGTH: usize = 64;

lazy_static! {
    static ref USERNAME: Regex = Regex::new("^[a-zA-Z][-_.a-zA-Z0-9]+$").unwrap(/* known good */);
}

fn check_username(s: &str) -> bool {
    s.is_ascii()
        && s.len() >= MIN_USERNAME_LENGTH
        && s.len() <= MAX_USERNAME_LENGTH
        && USERNAME.is_match(s)
}

/// A refined type representing a palaver username
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Construct a [Username] from a `&str`, copying it. To *move* a [String] into a [Username]
    /// (with the same validity checking) use [TryFrom::try_from()].
    pub fn new(name: &str) -> Result<Username> {
        check_username(name)
            .then_some(Username(name.to_owned()))
            .ok_or(
                BadUsernameSnafu {
                    name: name.to_owned(),
                }
                .build(),
            )
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.deref()
    }
}

impl Deref for Username {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// Implement `Deserialize` by hand to fail if the serialized value isn't a legit `Username`
impl<'de> Deserialize<'de> for Username {
    fn deserialize<D>(deserializer: D) -> StdResult<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        Username::try_from(s).map_err(mk_serde_de_err::<'de, D>)
    }
}

impl Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Username {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Username::new(s)
    }
}

impl TryFrom<String> for Username {
    type Error = Error;

    fn try_from(name: String) -> std::result::Result<Self, Self::Error> {
        if check_username(&name) {
            Ok(Username(name))
        } else {
            BadUsernameSnafu { name }.fail()
        }
    }
}


////////////////////////////////////////////////////////////////////////////////////////////////////
//                                              User                                              //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// A display-ready user record
///
/// This is what the user-lookup seam hands back: enough to render a row in a follower or followee
/// listing. It is *not* the system-of-record user (no credentials, no e-mail, no status flags);
/// that entity never crosses into this crate.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct User {
    id: UserId,
    username: Username,
    avatar_url: Option<Url>,
    created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        id: UserId,
        username: Username,
        avatar_url: Option<Url>,
        created_at: DateTime<Utc>,
    ) -> User {
        User {
            id,
            username,
            avatar_url,
            created_at,
        }
    }
    pub fn id(&self) -> UserId {
        self.id
    }
    pub fn username(&self) -> &Username {
        &self.username
    }
    pub fn avatar_url(&self) -> Option<&Url> {
        self.avatar_url.as_ref()
    }
    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }
}
