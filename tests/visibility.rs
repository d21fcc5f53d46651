//! Visibility Policy Tests
//!
//! The predicate is pure, so these exercise it directly: privileged bypass,
//! publication and archival gating, and the followers-only tier.

use time::OffsetDateTime;
use uuid::Uuid;

use encre::app::visibility::{feed_eligible, is_visible};
use encre::domain::post::{Post, PostVisibility};
use encre::domain::user::Viewer;

fn post(author_id: Uuid, visibility: PostVisibility, published: bool, archived: bool) -> Post {
    let now = OffsetDateTime::from_unix_timestamp(1_000).unwrap();
    Post {
        id: Uuid::new_v4(),
        author_id,
        title: "t".into(),
        content: "c".into(),
        rendered_html: "<p>c</p>".into(),
        tags: vec![],
        visibility,
        is_published: published,
        published_at: published.then_some(now),
        archived_at: archived.then_some(now),
        view_count: 0,
        created_at: now,
    }
}

fn privileged() -> Viewer {
    Viewer {
        user_id: Some(Uuid::new_v4()),
        privileged: true,
    }
}

#[test]
fn public_post_visible_to_anyone() {
    let post = post(Uuid::new_v4(), PostVisibility::Public, true, false);

    assert!(is_visible(&post, Viewer::anonymous(), false));
    assert!(is_visible(&post, Viewer::user(Uuid::new_v4()), false));
}

#[test]
fn followers_only_hidden_from_anonymous() {
    let post = post(Uuid::new_v4(), PostVisibility::FollowersOnly, true, false);

    assert!(!is_visible(&post, Viewer::anonymous(), false));
}

#[test]
fn followers_only_requires_follower_or_self() {
    let author = Uuid::new_v4();
    let post = post(author, PostVisibility::FollowersOnly, true, false);
    let stranger = Viewer::user(Uuid::new_v4());

    assert!(!is_visible(&post, stranger, false));
    assert!(is_visible(&post, stranger, true));
    assert!(is_visible(&post, Viewer::user(author), false));
}

#[test]
fn unpublished_hidden_even_from_author() {
    let author = Uuid::new_v4();
    let post = post(author, PostVisibility::Public, false, false);

    assert!(!is_visible(&post, Viewer::user(author), false));
    assert!(!is_visible(&post, Viewer::anonymous(), false));
}

#[test]
fn archived_visible_only_to_author() {
    let author = Uuid::new_v4();
    let post = post(author, PostVisibility::Public, true, true);

    assert!(is_visible(&post, Viewer::user(author), false));
    assert!(!is_visible(&post, Viewer::user(Uuid::new_v4()), false));
    assert!(!is_visible(&post, Viewer::anonymous(), false));
}

#[test]
fn privileged_bypasses_every_rule() {
    let author = Uuid::new_v4();

    let unpublished = post(author, PostVisibility::Public, false, false);
    let archived = post(author, PostVisibility::Public, true, true);
    let followers_only = post(author, PostVisibility::FollowersOnly, true, false);

    assert!(is_visible(&unpublished, privileged(), false));
    assert!(is_visible(&archived, privileged(), false));
    assert!(is_visible(&followers_only, privileged(), false));
}

#[test]
fn feed_excludes_archived_even_for_author() {
    let author = Uuid::new_v4();
    let archived = post(author, PostVisibility::Public, true, true);

    assert!(is_visible(&archived, Viewer::user(author), false));
    assert!(!feed_eligible(&archived, Viewer::user(author), false));
    // privileged viewers keep the archival bypass in feeds
    assert!(feed_eligible(&archived, privileged(), false));
}

#[test]
fn feed_requires_publication_timestamp() {
    let author = Uuid::new_v4();
    let mut post = post(author, PostVisibility::Public, true, false);
    post.published_at = None;

    assert!(!feed_eligible(&post, privileged(), false));
}
