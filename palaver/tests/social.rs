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

//! # social-graph integration tests
//!
//! Exercise [Follows] & [Likes] together over a [MemoryStore] & an in-memory user directory, the
//! way an embedder would wire them up.

use std::{sync::Arc, time::Duration};

use chrono::Utc;

use palaver::{
    entities::{EntityId, EntityType, User, UserId, Username},
    follow::Follows,
    like::{LikeStatus, Likes},
    storage::Directory,
};
use palaver_store::MemoryStore;

fn user(id: u64, name: &str) -> User {
    User::new(
        UserId::new(id),
        Username::new(name).expect("Bad test username"),
        None,
        Utc::now(),
    )
}

/// Stand up the follow component over a fresh store, with the given users in the directory
fn follows(users: &[(u64, &str)]) -> (Follows, Directory) {
    let directory = Directory::new();
    users
        .iter()
        .for_each(|(id, name)| directory.insert(user(*id, name)));
    (
        Follows::new(
            Arc::new(MemoryStore::new()),
            Arc::new(directory.clone()),
        ),
        directory,
    )
}

#[tokio::test]
async fn follow_then_unfollow() {
    let (follows, _) = follows(&[(1, "alice"), (2, "bob")]);
    let alice = UserId::new(1);
    let bob = EntityId::new(2);

    assert!(!follows.has_followed(&alice, EntityType::User, &bob).await.unwrap());

    follows.follow(&alice, EntityType::User, &bob).await.unwrap();
    assert!(follows.has_followed(&alice, EntityType::User, &bob).await.unwrap());
    assert_eq!(follows.followee_count(&alice, EntityType::User).await.unwrap(), 1);
    // Symmetry: the reverse relation must show the follow, too
    assert_eq!(follows.follower_count(EntityType::User, &bob).await.unwrap(), 1);

    follows.unfollow(&alice, EntityType::User, &bob).await.unwrap();
    assert!(!follows.has_followed(&alice, EntityType::User, &bob).await.unwrap());
    assert_eq!(follows.followee_count(&alice, EntityType::User).await.unwrap(), 0);
    assert_eq!(follows.follower_count(EntityType::User, &bob).await.unwrap(), 0);

    // Unfollowing a relationship that doesn't exist is a quiet no-op
    follows.unfollow(&alice, EntityType::User, &bob).await.unwrap();
}

#[tokio::test]
async fn follow_twice_leaves_one_membership() {
    let (follows, _) = follows(&[(1, "alice"), (2, "bob")]);
    let alice = UserId::new(1);
    let bob = EntityId::new(2);

    follows.follow(&alice, EntityType::User, &bob).await.unwrap();
    let first = follows.followees(&alice, 0, 10).await.unwrap().unwrap();

    tokio::time::sleep(Duration::from_millis(5)).await;
    follows.follow(&alice, EntityType::User, &bob).await.unwrap();

    // Still exactly one relationship, in both directions...
    assert_eq!(follows.followee_count(&alice, EntityType::User).await.unwrap(), 1);
    assert_eq!(follows.follower_count(EntityType::User, &bob).await.unwrap(), 1);
    // ...but the follow time moved forward
    let second = follows.followees(&alice, 0, 10).await.unwrap().unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert!(second[0].followed_at > first[0].followed_at);
}

#[tokio::test]
async fn follows_are_generic_over_entity_type() {
    let (follows, _) = follows(&[(1, "alice")]);
    let alice = UserId::new(1);
    let post = EntityId::new(97);

    follows.follow(&alice, EntityType::Post, &post).await.unwrap();
    assert!(follows.has_followed(&alice, EntityType::Post, &post).await.unwrap());
    // Following a post leaves the user-typed followee set untouched
    assert_eq!(follows.followee_count(&alice, EntityType::User).await.unwrap(), 0);
    assert_eq!(follows.followee_count(&alice, EntityType::Post).await.unwrap(), 1);
    assert_eq!(follows.follower_count(EntityType::Post, &post).await.unwrap(), 1);
}

#[tokio::test]
async fn followees_order_and_pagination() {
    let (follows, _) = follows(&[(1, "alice"), (2, "bob"), (3, "carol"), (4, "dave")]);
    let alice = UserId::new(1);

    // No relationships at all: the listing is absent, the stop-paginating signal
    assert!(follows.followees(&alice, 0, 10).await.unwrap().is_none());

    for target in [2u64, 3, 4] {
        follows
            .follow(&alice, EntityType::User, &EntityId::new(target))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let listing = follows.followees(&alice, 0, 10).await.unwrap().unwrap();
    assert_eq!(listing.len(), 3);
    // Most recently followed first, timestamps non-increasing down the page
    let names = listing
        .iter()
        .map(|entry| entry.user.as_ref().unwrap().username().to_string())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["dave", "carol", "bob"]);
    assert!(
        listing
            .windows(2)
            .all(|pair| pair[0].followed_at >= pair[1].followed_at)
    );

    // Offset paging
    let page = follows.followees(&alice, 1, 1).await.unwrap().unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].user.as_ref().unwrap().username().as_ref(), "carol");

    // Offset past the end of an existing set: present-but-empty, *not* absent
    let page = follows.followees(&alice, 10, 5).await.unwrap().unwrap();
    assert!(page.is_empty());

    // And the mirror image, from bob's side
    let followers = follows.followers(&UserId::new(2), 0, 10).await.unwrap().unwrap();
    assert_eq!(followers.len(), 1);
    assert_eq!(
        followers[0].user.as_ref().unwrap().username().as_ref(),
        "alice"
    );
}

#[tokio::test]
async fn deleted_users_still_appear_in_listings() {
    let (follows, directory) = follows(&[(1, "alice"), (2, "bob")]);
    let alice = UserId::new(1);

    follows
        .follow(&alice, EntityType::User, &EntityId::new(2))
        .await
        .unwrap();
    directory.remove(&UserId::new(2));

    // The relationship outlives the account; the row hydrates with no user rather than failing
    let listing = follows.followees(&alice, 0, 10).await.unwrap().unwrap();
    assert_eq!(listing.len(), 1);
    assert!(listing[0].user.is_none());
}

#[tokio::test]
async fn like_toggles() {
    let likes = Likes::new(Arc::new(MemoryStore::new()));
    let reader = UserId::new(10);
    let author = UserId::new(11);
    let post = EntityId::new(500);

    assert_eq!(
        likes.entity_like_status(&reader, EntityType::Post, &post).await.unwrap(),
        LikeStatus::NotLiked
    );
    assert_eq!(likes.entity_like_count(EntityType::Post, &post).await.unwrap(), 0);
    assert_eq!(likes.user_like_count(&author).await.unwrap(), 0);

    likes
        .like(&reader, EntityType::Post, &post, &author)
        .await
        .unwrap();
    assert_eq!(
        likes.entity_like_status(&reader, EntityType::Post, &post).await.unwrap(),
        LikeStatus::Liked
    );
    assert_eq!(likes.entity_like_count(EntityType::Post, &post).await.unwrap(), 1);
    assert_eq!(likes.user_like_count(&author).await.unwrap(), 1);

    // Second call with the same arguments un-likes
    likes
        .like(&reader, EntityType::Post, &post, &author)
        .await
        .unwrap();
    assert_eq!(
        likes.entity_like_status(&reader, EntityType::Post, &post).await.unwrap(),
        LikeStatus::NotLiked
    );
    assert_eq!(likes.entity_like_count(EntityType::Post, &post).await.unwrap(), 0);
    assert_eq!(likes.user_like_count(&author).await.unwrap(), 0);
}

#[tokio::test]
async fn two_likers_on_one_entity() {
    let likes = Likes::new(Arc::new(MemoryStore::new()));
    let author = UserId::new(11);
    let comment = EntityId::new(600);

    likes
        .like(&UserId::new(20), EntityType::Comment, &comment, &author)
        .await
        .unwrap();
    likes
        .like(&UserId::new(21), EntityType::Comment, &comment, &author)
        .await
        .unwrap();

    assert_eq!(
        likes.entity_like_count(EntityType::Comment, &comment).await.unwrap(),
        2
    );
    assert_eq!(likes.user_like_count(&author).await.unwrap(), 2);

    // One of them backs out
    likes
        .like(&UserId::new(20), EntityType::Comment, &comment, &author)
        .await
        .unwrap();
    assert_eq!(
        likes.entity_like_count(EntityType::Comment, &comment).await.unwrap(),
        1
    );
    assert_eq!(likes.user_like_count(&author).await.unwrap(), 1);
}

#[tokio::test]
async fn mismatched_author_can_drive_the_counter_negative() {
    // Nothing verifies that `author` actually authored the entity; a caller that likes crediting
    // one user & un-likes debiting another walks the second user's counter below zero. That's the
    // documented contract, so pin it.
    let likes = Likes::new(Arc::new(MemoryStore::new()));
    let reader = UserId::new(30);
    let post = EntityId::new(700);

    likes
        .like(&reader, EntityType::Post, &post, &UserId::new(31))
        .await
        .unwrap();
    likes
        .like(&reader, EntityType::Post, &post, &UserId::new(32))
        .await
        .unwrap();

    assert_eq!(likes.user_like_count(&UserId::new(31)).await.unwrap(), 1);
    assert_eq!(likes.user_like_count(&UserId::new(32)).await.unwrap(), -1);
}

#[tokio::test]
async fn likes_and_follows_share_a_store() {
    // Both components against one store instance, as an embedder would run them; their key spaces
    // must not collide.
    let store = Arc::new(MemoryStore::new());
    let directory = Directory::new();
    directory.insert(user(1, "alice"));
    directory.insert(user(2, "bob"));
    let follows = Follows::new(store.clone(), Arc::new(directory));
    let likes = Likes::new(store);

    let alice = UserId::new(1);
    let bob = UserId::new(2);

    follows
        .follow(&alice, EntityType::User, &EntityId::new(2))
        .await
        .unwrap();
    likes
        .like(&alice, EntityType::Post, &EntityId::new(2), &bob)
        .await
        .unwrap();

    assert_eq!(follows.follower_count(EntityType::User, &EntityId::new(2)).await.unwrap(), 1);
    assert_eq!(likes.entity_like_count(EntityType::Post, &EntityId::new(2)).await.unwrap(), 1);
    assert_eq!(likes.user_like_count(&bob).await.unwrap(), 1);
}
