//! Core types for Postboard

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::OperationError;
use crate::store::Entity;

pub type PostId = i64;
pub type UserId = i64;

/// The fixed set of reactions a post can receive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReactionKind {
    ThumbsUp,
    Wow,
    Heart,
    Rocket,
    Coffee,
}

impl ReactionKind {
    pub const ALL: [ReactionKind; 5] = [
        ReactionKind::ThumbsUp,
        ReactionKind::Wow,
        ReactionKind::Heart,
        ReactionKind::Rocket,
        ReactionKind::Coffee,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionKind::ThumbsUp => "thumbsUp",
            ReactionKind::Wow => "wow",
            ReactionKind::Heart => "heart",
            ReactionKind::Rocket => "rocket",
            ReactionKind::Coffee => "coffee",
        }
    }
}

impl FromStr for ReactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReactionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Unknown reaction: '{}'. Valid options: thumbsUp, wow, heart, rocket, coffee",
                    s
                )
            })
    }
}

impl fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reaction counters, one per `ReactionKind`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reactions {
    pub thumbs_up: u32,
    pub wow: u32,
    pub heart: u32,
    pub rocket: u32,
    pub coffee: u32,
}

impl Reactions {
    pub fn get(&self, kind: ReactionKind) -> u32 {
        match kind {
            ReactionKind::ThumbsUp => self.thumbs_up,
            ReactionKind::Wow => self.wow,
            ReactionKind::Heart => self.heart,
            ReactionKind::Rocket => self.rocket,
            ReactionKind::Coffee => self.coffee,
        }
    }

    pub fn increment(&mut self, kind: ReactionKind) {
        let counter = match kind {
            ReactionKind::ThumbsUp => &mut self.thumbs_up,
            ReactionKind::Wow => &mut self.wow,
            ReactionKind::Heart => &mut self.heart,
            ReactionKind::Rocket => &mut self.rocket,
            ReactionKind::Coffee => &mut self.coffee,
        };
        *counter = counter.saturating_add(1);
    }

    pub fn total(&self) -> u64 {
        ReactionKind::ALL
            .into_iter()
            .map(|kind| u64::from(self.get(kind)))
            .sum()
    }
}

/// A post as held in the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub body: String,
    /// `None` when the post was created locally from edits that named no
    /// author
    pub user_id: Option<UserId>,
    pub date: DateTime<Utc>,
    pub reactions: Reactions,
}

impl Entity for Post {
    type Id = PostId;

    fn id(&self) -> PostId {
        self.id
    }
}

/// Sort comparer for the post store: newest first
pub fn newest_first(a: &Post, b: &Post) -> std::cmp::Ordering {
    b.date.cmp(&a.date)
}

/// A user reference as it travels over the wire.
///
/// Form inputs send the author as text while the API lists it as a number,
/// so both shapes are accepted and coerced on the way into the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    Number(UserId),
    Text(String),
}

impl UserRef {
    pub fn to_user_id(&self) -> Result<UserId, OperationError> {
        match self {
            UserRef::Number(id) => Ok(*id),
            UserRef::Text(text) => text.trim().parse().map_err(|_| {
                OperationError::Malformed(format!("userId '{}' is not an integer", text))
            }),
        }
    }
}

impl From<UserId> for UserRef {
    fn from(id: UserId) -> Self {
        UserRef::Number(id)
    }
}

/// Post payload as returned by the remote API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPost {
    #[serde(default)]
    pub id: Option<PostId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserRef>,
}

impl RawPost {
    /// The id, if it is usable as a store key
    pub fn valid_id(&self) -> Option<PostId> {
        self.id.filter(|id| *id > 0)
    }
}

/// Payload for creating a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDraft {
    pub title: String,
    pub body: String,
    pub user_id: UserRef,
}

/// A post received from the API, validated and coerced, ready for the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedPost {
    pub id: PostId,
    pub title: String,
    pub body: String,
    pub user_id: UserId,
}

impl TryFrom<RawPost> for ReceivedPost {
    type Error = OperationError;

    fn try_from(raw: RawPost) -> Result<Self, Self::Error> {
        let id = raw
            .valid_id()
            .ok_or_else(|| OperationError::Malformed("post has no id".to_string()))?;
        let user_id = raw
            .user_id
            .as_ref()
            .ok_or_else(|| OperationError::Malformed(format!("post {} has no userId", id)))?
            .to_user_id()?;

        Ok(Self {
            id,
            title: raw.title.unwrap_or_default(),
            body: raw.body.unwrap_or_default(),
            user_id,
        })
    }
}

impl ReceivedPost {
    /// Store representation dated `date`, with every reaction at zero
    pub fn into_post(self, date: DateTime<Utc>) -> Post {
        Post {
            id: self.id,
            title: self.title,
            body: self.body,
            user_id: Some(self.user_id),
            date,
            reactions: Reactions::default(),
        }
    }
}

/// Partial update of a post; absent fields keep their current value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostEdits {
    pub id: PostId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reactions: Option<Reactions>,
}

impl PostEdits {
    pub fn new(id: PostId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn user_id(mut self, user_id: UserId) -> Self {
        self.user_id = Some(UserRef::Number(user_id));
        self
    }

    pub fn has_valid_id(&self) -> bool {
        self.id > 0
    }

    /// Check the id and coerce any text `userId` to a number, so that
    /// `apply` cannot fail later
    pub fn normalized(self) -> Result<Self, OperationError> {
        if !self.has_valid_id() {
            return Err(OperationError::Malformed(format!(
                "cannot update post with id {}",
                self.id
            )));
        }
        let user_id = match &self.user_id {
            Some(user_ref) => Some(UserRef::Number(user_ref.to_user_id()?)),
            None => None,
        };
        Ok(Self { user_id, ..self })
    }

    /// Merge these edits over `existing`, or build a fresh post from them
    /// alone, dated `date`.
    ///
    /// Expects normalized edits; an uncoercible `userId` is treated as
    /// absent.
    pub fn apply(&self, existing: Option<&Post>, date: DateTime<Utc>) -> Post {
        let user_id = match &self.user_id {
            Some(user_ref) => user_ref.to_user_id().ok(),
            None => existing.and_then(|p| p.user_id),
        };

        Post {
            id: self.id,
            title: self
                .title
                .clone()
                .or_else(|| existing.map(|p| p.title.clone()))
                .unwrap_or_default(),
            body: self
                .body
                .clone()
                .or_else(|| existing.map(|p| p.body.clone()))
                .unwrap_or_default(),
            user_id,
            date,
            reactions: self
                .reactions
                .or_else(|| existing.map(|p| p.reactions))
                .unwrap_or_default(),
        }
    }
}

impl TryFrom<RawPost> for PostEdits {
    type Error = OperationError;

    fn try_from(raw: RawPost) -> Result<Self, Self::Error> {
        let id = raw
            .valid_id()
            .ok_or_else(|| OperationError::Malformed("updated post has no id".to_string()))?;
        Self {
            id,
            title: raw.title,
            body: raw.body,
            user_id: raw.user_id,
            reactions: None,
        }
        .normalized()
    }
}

/// Reference to a post by id, as passed to delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRef {
    pub id: PostId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_post() -> Post {
        Post {
            id: 9,
            title: "Original".to_string(),
            body: "Body".to_string(),
            user_id: Some(4),
            date: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            reactions: Reactions {
                heart: 3,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_reaction_kind_from_str() {
        assert_eq!("thumbsUp".parse::<ReactionKind>().unwrap(), ReactionKind::ThumbsUp);
        assert_eq!("coffee".parse::<ReactionKind>().unwrap(), ReactionKind::Coffee);

        let err = "laugh".parse::<ReactionKind>().unwrap_err();
        assert!(err.contains("Unknown reaction: 'laugh'"));
        // Wire names are case sensitive
        assert!("ThumbsUp".parse::<ReactionKind>().is_err());
    }

    #[test]
    fn test_reactions_increment() {
        let mut reactions = Reactions::default();
        reactions.increment(ReactionKind::Wow);
        reactions.increment(ReactionKind::Wow);
        reactions.increment(ReactionKind::Rocket);

        assert_eq!(reactions.get(ReactionKind::Wow), 2);
        assert_eq!(reactions.get(ReactionKind::Rocket), 1);
        assert_eq!(reactions.get(ReactionKind::Heart), 0);
        assert_eq!(reactions.total(), 3);
    }

    #[test]
    fn test_reactions_increment_saturates() {
        let mut reactions = Reactions {
            coffee: u32::MAX,
            ..Default::default()
        };
        reactions.increment(ReactionKind::Coffee);
        assert_eq!(reactions.coffee, u32::MAX);
    }

    #[test]
    fn test_reactions_serialize_with_wire_names() {
        let json = serde_json::to_value(Reactions::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"thumbsUp": 0, "wow": 0, "heart": 0, "rocket": 0, "coffee": 0})
        );
    }

    #[test]
    fn test_user_ref_coercion() {
        assert_eq!(UserRef::Number(3).to_user_id().unwrap(), 3);
        assert_eq!(UserRef::Text("3".to_string()).to_user_id().unwrap(), 3);
        assert_eq!(UserRef::Text(" 12 ".to_string()).to_user_id().unwrap(), 12);
        assert!(matches!(
            UserRef::Text("abc".to_string()).to_user_id(),
            Err(OperationError::Malformed(_))
        ));
    }

    #[test]
    fn test_raw_post_accepts_both_user_id_shapes() {
        let numeric: RawPost =
            serde_json::from_str(r#"{"id":1,"title":"t","body":"b","userId":1}"#).unwrap();
        assert_eq!(numeric.user_id, Some(UserRef::Number(1)));

        let text: RawPost =
            serde_json::from_str(r#"{"id":101,"title":"A","body":"B","userId":"3"}"#).unwrap();
        assert_eq!(text.user_id, Some(UserRef::Text("3".to_string())));
    }

    #[test]
    fn test_raw_post_missing_fields() {
        let raw: RawPost = serde_json::from_str(r#"{"title":"only"}"#).unwrap();
        assert_eq!(raw.id, None);
        assert_eq!(raw.title.as_deref(), Some("only"));
        assert_eq!(raw.body, None);
        assert_eq!(raw.valid_id(), None);

        let zero: RawPost = serde_json::from_str(r#"{"id":0}"#).unwrap();
        assert_eq!(zero.valid_id(), None);
    }

    #[test]
    fn test_new_post_from_raw() {
        let raw = RawPost {
            id: Some(101),
            title: Some("A".to_string()),
            body: Some("B".to_string()),
            user_id: Some(UserRef::Text("3".to_string())),
        };
        let post = ReceivedPost::try_from(raw).unwrap();
        assert_eq!(post.id, 101);
        assert_eq!(post.title, "A");
        assert_eq!(post.user_id, 3);
    }

    #[test]
    fn test_new_post_without_id_is_malformed() {
        let raw = RawPost {
            id: None,
            title: Some("A".to_string()),
            body: Some("B".to_string()),
            user_id: Some(UserRef::Number(3)),
        };
        assert!(matches!(ReceivedPost::try_from(raw), Err(OperationError::Malformed(_))));
    }

    #[test]
    fn test_edits_merge_over_existing() {
        let existing = sample_post();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        let merged = PostEdits::new(9).title("X").apply(Some(&existing), now);

        assert_eq!(merged.title, "X");
        assert_eq!(merged.body, "Body");
        assert_eq!(merged.user_id, Some(4));
        assert_eq!(merged.reactions.heart, 3);
        assert_eq!(merged.date, now);
    }

    #[test]
    fn test_edits_for_unknown_post_build_fresh_post() {
        let now = Utc::now();

        let anonymous = PostEdits::new(9).title("X").apply(None, now);
        assert_eq!(anonymous.id, 9);
        assert_eq!(anonymous.title, "X");
        assert_eq!(anonymous.user_id, None);
        assert_eq!(anonymous.date, now);

        let fresh = PostEdits::new(9).title("X").user_id(2).apply(None, now);
        assert_eq!(fresh.user_id, Some(2));
        assert_eq!(fresh.body, "");
        assert_eq!(fresh.reactions, Reactions::default());
    }

    #[test]
    fn test_normalized_edits() {
        let mut edits = PostEdits::new(9);
        edits.user_id = Some(UserRef::Text(" 3 ".to_string()));
        assert_eq!(edits.normalized().unwrap().user_id, Some(UserRef::Number(3)));

        let mut bad_author = PostEdits::new(9);
        bad_author.user_id = Some(UserRef::Text("abc".to_string()));
        assert!(matches!(bad_author.normalized(), Err(OperationError::Malformed(_))));

        assert!(matches!(
            PostEdits::new(0).title("X").normalized(),
            Err(OperationError::Malformed(_))
        ));
    }

    #[test]
    fn test_edits_from_response_coerce_user_id() {
        let raw = RawPost {
            id: Some(9),
            title: Some("X".to_string()),
            body: None,
            user_id: Some(UserRef::Text("4".to_string())),
        };
        let edits = PostEdits::try_from(raw).unwrap();
        assert_eq!(edits.user_id, Some(UserRef::Number(4)));
        assert_eq!(edits.body, None);
    }

    #[test]
    fn test_edits_serialize_only_present_fields() {
        let json = serde_json::to_value(PostEdits::new(9).title("X")).unwrap();
        assert_eq!(json, serde_json::json!({"id": 9, "title": "X"}));
    }

    #[test]
    fn test_post_serializes_camel_case() {
        let json = serde_json::to_value(sample_post()).unwrap();
        assert_eq!(json["userId"], 4);
        assert_eq!(json["reactions"]["heart"], 3);
        assert!(json["date"].as_str().unwrap().starts_with("2024-01-01T12:00:00"));
    }

    #[test]
    fn test_newest_first() {
        let older = sample_post();
        let mut newer = sample_post();
        newer.date = older.date + chrono::Duration::minutes(1);

        assert_eq!(newest_first(&newer, &older), std::cmp::Ordering::Less);
        assert_eq!(newest_first(&older, &newer), std::cmp::Ordering::Greater);
    }
}
