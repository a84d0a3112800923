//! Pure reducer function for state transitions
//!
//! The reducer is a pure function: `(State, Action) -> State`. It performs no
//! I/O; the only "clock" it reads is the timestamp carried by each lifecycle
//! event, so the same inputs always give the same output.

use chrono::{DateTime, Duration, Utc};
use libpostboard::service::events::{Lifecycle, Phase, PostsEvent, UpdateOutcome};
use libpostboard::types::{PostRef, ReceivedPost};
use libpostboard::{PostId, ReactionKind};

use super::actions::Action;
use super::state::{AppState, PostsState};

/// Pure reducer function
///
/// Takes current state and an action, returns new state.
pub fn reduce(state: AppState, action: Action) -> AppState {
    match action {
        Action::ReactionAdded { post_id, reaction } => AppState {
            posts: reaction_added(state.posts, post_id, &reaction),
            ..state
        },
        Action::Posts(event) => AppState {
            posts: reduce_posts(state.posts, event),
            ..state
        },
    }
}

fn reduce_posts(posts: PostsState, event: PostsEvent) -> PostsState {
    match event {
        PostsEvent::FetchPosts(lifecycle) => fetch_posts(posts, lifecycle),
        PostsEvent::AddNewPost(lifecycle) => add_new_post(posts, lifecycle),
        PostsEvent::UpdatePost(lifecycle) => update_post(posts, lifecycle),
        PostsEvent::DeletePost(lifecycle) => delete_post(posts, lifecycle),
    }
}

fn reaction_added(mut posts: PostsState, post_id: PostId, reaction: &str) -> PostsState {
    let kind: ReactionKind = match reaction.parse() {
        Ok(kind) => kind,
        Err(e) => {
            tracing::debug!("Ignoring reaction on post {}: {}", post_id, e);
            return posts;
        }
    };

    let found = posts
        .entities
        .update_one(post_id, |post| post.reactions.increment(kind));
    if !found {
        tracing::debug!("Ignoring {} reaction: post {} not in store", kind, post_id);
    }
    posts
}

/// Date for the `index`-th post of a fetch: `index + 1` minutes before `now`
fn fetched_date(now: DateTime<Utc>, index: usize) -> DateTime<Utc> {
    now - Duration::minutes(index as i64 + 1)
}

fn fetch_posts(mut posts: PostsState, lifecycle: Lifecycle<Vec<ReceivedPost>>) -> PostsState {
    let now = lifecycle.timestamp;
    match lifecycle.phase {
        Phase::Pending => posts.load.start(),
        Phase::Fulfilled(received) => {
            tracing::debug!("Loaded {} posts", received.len());
            let dated = received
                .into_iter()
                .enumerate()
                .map(|(index, post)| post.into_post(fetched_date(now, index)));
            posts.entities.upsert_many(dated);
            posts.load.succeed();
        }
        Phase::Rejected(error) => posts.load.fail(error.to_string()),
    }
    posts
}

fn add_new_post(mut posts: PostsState, lifecycle: Lifecycle<ReceivedPost>) -> PostsState {
    match lifecycle.phase {
        Phase::Fulfilled(received) => {
            posts.entities.add_one(received.into_post(lifecycle.timestamp));
        }
        Phase::Rejected(error) => tracing::warn!("Create failed, store unchanged: {}", error),
        Phase::Pending => {}
    }
    posts
}

fn update_post(mut posts: PostsState, lifecycle: Lifecycle<UpdateOutcome>) -> PostsState {
    match lifecycle.phase {
        Phase::Fulfilled(UpdateOutcome { edits, confirmed }) => {
            if !confirmed {
                tracing::debug!("Applying unconfirmed edits to post {}", edits.id);
            }
            let post = edits.apply(posts.entities.get(edits.id), lifecycle.timestamp);
            posts.entities.upsert_one(post);
        }
        Phase::Rejected(error) => tracing::warn!("Update failed, store unchanged: {}", error),
        Phase::Pending => {}
    }
    posts
}

fn delete_post(mut posts: PostsState, lifecycle: Lifecycle<PostRef>) -> PostsState {
    match lifecycle.phase {
        Phase::Fulfilled(PostRef { id }) => {
            if posts.entities.remove_one(id).is_none() {
                tracing::debug!("Deleted post {} was not in store", id);
            }
        }
        Phase::Rejected(error) => tracing::warn!("Delete failed, store unchanged: {}", error),
        Phase::Pending => {}
    }
    posts
}
