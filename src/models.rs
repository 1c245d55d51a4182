use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// All identifiers are canonical 128-bit UUIDs.
pub type Id = Uuid;

/// Row in the users table. Maintained by the identity provider; this
/// service only ever reads it (and seeds it in tests).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "postgres-store", derive(sqlx::FromRow))]
pub struct User {
    pub id: Id,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "postgres-store", derive(sqlx::FromRow))]
pub struct Post {
    pub id: Id,
    pub user_id: Id,
    pub caption: String,
    pub url: String,
    pub file_type: String, // "image" | "video", derived from upload content type
    pub file_name: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewPost {
    pub user_id: Id,
    pub caption: String,
    pub url: String,
    pub file_type: String,
    pub file_name: String,
    pub category: String,
}

/// Feed/search item: a post annotated relative to the caller.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PostView {
    pub id: Id,
    pub user_id: Id,
    pub caption: String,
    pub url: String,
    pub file_type: String,
    pub file_name: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub is_owner: bool,
    pub email: String,
    pub like_count: i64,
}

impl PostView {
    pub fn annotate(post: Post, caller: Id, email: String, like_count: i64) -> Self {
        PostView {
            is_owner: post.user_id == caller,
            id: post.id,
            user_id: post.user_id,
            caption: post.caption,
            url: post.url,
            file_type: post.file_type,
            file_name: post.file_name,
            category: post.category,
            created_at: post.created_at,
            email,
            like_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "postgres-store", derive(sqlx::FromRow))]
pub struct Comment {
    pub id: Id,
    pub post_id: Id,
    pub user_id: Id,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewComment {
    pub post_id: Id,
    pub user_id: Id,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "postgres-store", derive(sqlx::FromRow))]
pub struct Like {
    pub id: Id,
    pub post_id: Id,
    pub user_id: Id,
}

/// Two-party chat. The (user1_id, user2_id) pair is unique as an
/// unordered pair: the store never holds two rows for the same two users
/// regardless of column order.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "postgres-store", derive(sqlx::FromRow))]
pub struct Chat {
    pub id: Id,
    pub user1_id: Id,
    pub user2_id: Id,
    pub created_at: DateTime<Utc>,
}

impl Chat {
    pub fn has_participant(&self, user: Id) -> bool {
        self.user1_id == user || self.user2_id == user
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "postgres-store", derive(sqlx::FromRow))]
pub struct ChatMessage {
    pub id: Id,
    pub chat_id: Id,
    pub sender_id: Id,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewChatMessage {
    pub chat_id: Id,
    pub sender_id: Id,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_participancy_covers_both_sides() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let chat = Chat { id: Uuid::new_v4(), user1_id: a, user2_id: b, created_at: Utc::now() };
        assert!(chat.has_participant(a));
        assert!(chat.has_participant(b));
        assert!(!chat.has_participant(Uuid::new_v4()));
    }

    #[test]
    fn post_view_owner_flag() {
        let owner = Uuid::new_v4();
        let post = Post {
            id: Uuid::new_v4(),
            user_id: owner,
            caption: "c".into(),
            url: "https://cdn/x".into(),
            file_type: "image".into(),
            file_name: "x.png".into(),
            category: "art".into(),
            created_at: Utc::now(),
        };
        let view = PostView::annotate(post.clone(), owner, "a@b".into(), 3);
        assert!(view.is_owner);
        assert_eq!(view.like_count, 3);
        let view = PostView::annotate(post, Uuid::new_v4(), "a@b".into(), 0);
        assert!(!view.is_owner);
    }
}
