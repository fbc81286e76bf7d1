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

//! # palaver
//!
//! Social-graph services for a small forum: follow/unfollow relationships between users &
//! entities, and like/unlike reactions on content.
//!
//! Both components keep their state in a secondary index speaking the [palaver_store] protocol;
//! the system of record (users, posts, comments) lives elsewhere & is reached only through the
//! narrow lookup seam in [storage]. There is no HTTP surface here: embedders wire [follow::Follows]
//! & [like::Likes] into whatever request layer they run, passing the acting user's id explicitly
//! on every call (there is deliberately no ambient "current user" anywhere in this crate).

pub mod entities;
pub mod follow;
pub mod keys;
pub mod like;
pub mod storage;
