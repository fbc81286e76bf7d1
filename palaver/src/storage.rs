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

//! # storage
//!
//! The seam to the system of record.
//!
//! Users, posts & comments are persisted elsewhere; this crate only ever needs to hydrate a user
//! identifier into a display-ready [User] record. [Backend] is that one narrow interface, and
//! [Directory] is an in-memory implementation of it for tests & embedders that have no database.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use async_trait::async_trait;

use crate::entities::{User, UserId};

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

#[async_trait]
pub trait Backend {
    /// Retrieve a [User] given their identifier. `None` means there is no user by that id (never
    /// created, or since deleted); callers must treat that as a normal outcome, not a failure.
    async fn user_for_id(&self, id: &UserId) -> Result<Option<User>, Error>;
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                           Directory                                            //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// An in-memory [Backend]
#[derive(Clone, Debug, Default)]
pub struct Directory {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl Directory {
    pub fn new() -> Directory {
        Directory::default()
    }
    pub fn insert(&self, user: User) {
        self.users
            .write()
            .expect("Poisoned R/W lock!")
            .insert(user.id(), user);
    }
    pub fn remove(&self, id: &UserId) {
        self.users.write().expect("Poisoned R/W lock!").remove(id);
    }
}

#[async_trait]
impl Backend for Directory {
    async fn user_for_id(&self, id: &UserId) -> Result<Option<User>, Error> {
        Ok(self
            .users
            .read()
            .expect("Poisoned R/W lock!")
            .get(id)
            .cloned())
    }
}
