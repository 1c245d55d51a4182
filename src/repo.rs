use crate::models::*;

#[derive(thiserror::Error, Debug)]
pub enum RepoError {
    #[error("not found")] NotFound,
    #[error("store error: {0}")] Internal(String),
}

pub type RepoResult<T> = Result<T, RepoError>;

use async_trait::async_trait;

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Write path for the identity provider (and tests); the service
    /// itself only reads users.
    async fn upsert_user(&self, user: User) -> RepoResult<()>;
    async fn list_users(&self) -> RepoResult<Vec<User>>;
}

#[async_trait]
pub trait PostRepo: Send + Sync {
    async fn create_post(&self, new: NewPost) -> RepoResult<Post>;
    async fn get_post(&self, id: Id) -> RepoResult<Post>;
    /// Newest first, optionally filtered by exact category.
    async fn list_posts(&self, category: Option<&str>) -> RepoResult<Vec<Post>>;
    /// Case-insensitive caption substring match, optional exact category.
    async fn search_posts(&self, query: &str, category: Option<&str>) -> RepoResult<Vec<Post>>;
    /// Posts the user has liked, newest first.
    async fn liked_posts(&self, user_id: Id) -> RepoResult<Vec<Post>>;
    /// Removes the post together with its comments and likes.
    async fn delete_post(&self, id: Id) -> RepoResult<()>;
}

#[async_trait]
pub trait CommentRepo: Send + Sync {
    async fn create_comment(&self, new: NewComment) -> RepoResult<Comment>;
    async fn get_comment(&self, id: Id) -> RepoResult<Comment>;
    /// Newest first.
    async fn list_comments(&self, post_id: Id) -> RepoResult<Vec<Comment>>;
    async fn delete_comment(&self, id: Id) -> RepoResult<()>;
}

#[async_trait]
pub trait LikeRepo: Send + Sync {
    /// Toggle semantics: returns true when the like now exists, false
    /// when an existing like was removed. The (post_id, user_id) pair is
    /// unique at the store.
    async fn toggle_like(&self, post_id: Id, user_id: Id) -> RepoResult<bool>;
    async fn like_count(&self, post_id: Id) -> RepoResult<i64>;
}

#[async_trait]
pub trait ChatRepo: Send + Sync {
    /// Resolve the canonical chat for an unordered user pair, creating it
    /// on first contact. Idempotent and commutative in its arguments.
    async fn get_or_create_chat(&self, caller: Id, other: Id) -> RepoResult<Chat>;
    async fn get_chat(&self, id: Id) -> RepoResult<Chat>;
    /// Chats where the user is either participant, newest first.
    async fn list_chats(&self, user_id: Id) -> RepoResult<Vec<Chat>>;
    async fn create_message(&self, new: NewChatMessage) -> RepoResult<ChatMessage>;
    /// Full history, ascending created_at.
    async fn list_messages(&self, chat_id: Id) -> RepoResult<Vec<ChatMessage>>;
}

pub trait Repo: UserRepo + PostRepo + CommentRepo + LikeRepo + ChatRepo {}

impl<T> Repo for T where T: UserRepo + PostRepo + CommentRepo + LikeRepo + ChatRepo {}

#[cfg(feature = "inmem-store")]
pub mod inmem {
    use super::*;
    use chrono::Utc;
    use serde::{Deserialize, Serialize};
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, RwLock};
    use uuid::Uuid;

    const SNAPSHOT_PATH: &str = "data/state.json";

    #[derive(Default, Serialize, Deserialize)]
    struct State {
        users: HashMap<Id, User>,
        posts: HashMap<Id, Post>,
        comments: HashMap<Id, Comment>,
        likes: HashMap<Id, Like>,
        chats: HashMap<Id, Chat>,
        // append-only; insertion order is the send order
        messages: Vec<ChatMessage>,
    }

    impl State {
        fn chat_for_pair(&self, a: Id, b: Id) -> Option<Chat> {
            // Unordered-pair lookup: both orderings count as a match.
            self.chats
                .values()
                .find(|c| (c.user1_id == a && c.user2_id == b) || (c.user1_id == b && c.user2_id == a))
                .cloned()
        }
    }

    #[derive(Clone)]
    pub struct InMemRepo {
        state: Arc<RwLock<State>>,
        snapshot_path: Arc<PathBuf>,
    }

    impl InMemRepo {
        fn data_dir() -> PathBuf {
            std::env::var("MOSAIC_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data"))
        }

        fn snapshot_path() -> PathBuf {
            if std::env::var("MOSAIC_DATA_DIR").is_ok() {
                let mut p = Self::data_dir();
                p.push("state.json");
                p
            } else {
                PathBuf::from(SNAPSHOT_PATH)
            }
        }

        fn load_state_from(path: &Path) -> State {
            match std::fs::read(path) {
                Ok(bytes) => match serde_json::from_slice::<State>(&bytes) {
                    Ok(s) => {
                        log::info!("loaded snapshot '{}'", path.display());
                        s
                    }
                    Err(e) => {
                        log::warn!("failed to parse snapshot '{}': {e}; starting empty", path.display());
                        State::default()
                    }
                },
                Err(_) => State::default(),
            }
        }

        fn persist(&self) {
            let path = self.snapshot_path.clone();
            if let Ok(s) = serde_json::to_vec_pretty(&*self.state.read().unwrap()) {
                if let Some(dir) = path.parent() {
                    let _ = std::fs::create_dir_all(dir);
                }
                if let Err(e) = std::fs::write(&*path, s) {
                    log::error!("failed to write snapshot '{}': {e}", path.display());
                }
            }
        }

        pub fn new() -> Self {
            Self::with_snapshot_path(Self::snapshot_path())
        }

        /// Construct against an explicit snapshot file, bypassing the
        /// env-derived default. Lets callers (tests in particular) pin
        /// their state without touching process-global env.
        pub fn with_snapshot_path(snapshot_path: PathBuf) -> Self {
            let state = Self::load_state_from(&snapshot_path);
            Self {
                state: Arc::new(RwLock::new(state)),
                snapshot_path: Arc::new(snapshot_path),
            }
        }
    }

    impl Default for InMemRepo {
        fn default() -> Self { Self::new() }
    }

    #[async_trait]
    impl UserRepo for InMemRepo {
        async fn upsert_user(&self, user: User) -> RepoResult<()> {
            let mut s = self.state.write().unwrap();
            s.users.insert(user.id, user);
            drop(s);
            self.persist();
            Ok(())
        }
        async fn list_users(&self) -> RepoResult<Vec<User>> {
            let s = self.state.read().unwrap();
            Ok(s.users.values().cloned().collect())
        }
    }

    #[async_trait]
    impl PostRepo for InMemRepo {
        async fn create_post(&self, new: NewPost) -> RepoResult<Post> {
            let mut s = self.state.write().unwrap();
            let post = Post {
                id: Uuid::new_v4(),
                user_id: new.user_id,
                caption: new.caption,
                url: new.url,
                file_type: new.file_type,
                file_name: new.file_name,
                category: new.category,
                created_at: Utc::now(),
            };
            s.posts.insert(post.id, post.clone());
            drop(s);
            self.persist();
            Ok(post)
        }
        async fn get_post(&self, id: Id) -> RepoResult<Post> {
            let s = self.state.read().unwrap();
            s.posts.get(&id).cloned().ok_or(RepoError::NotFound)
        }
        async fn list_posts(&self, category: Option<&str>) -> RepoResult<Vec<Post>> {
            let s = self.state.read().unwrap();
            let mut v: Vec<_> = s
                .posts
                .values()
                .filter(|p| category.map_or(true, |c| p.category == c))
                .cloned()
                .collect();
            v.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(v)
        }
        async fn search_posts(&self, query: &str, category: Option<&str>) -> RepoResult<Vec<Post>> {
            let needle = query.to_lowercase();
            let s = self.state.read().unwrap();
            let mut v: Vec<_> = s
                .posts
                .values()
                .filter(|p| p.caption.to_lowercase().contains(&needle))
                .filter(|p| category.map_or(true, |c| p.category == c))
                .cloned()
                .collect();
            v.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(v)
        }
        async fn liked_posts(&self, user_id: Id) -> RepoResult<Vec<Post>> {
            let s = self.state.read().unwrap();
            let mut v: Vec<_> = s
                .likes
                .values()
                .filter(|l| l.user_id == user_id)
                .filter_map(|l| s.posts.get(&l.post_id).cloned())
                .collect();
            v.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(v)
        }
        async fn delete_post(&self, id: Id) -> RepoResult<()> {
            let mut s = self.state.write().unwrap();
            if s.posts.remove(&id).is_none() {
                return Err(RepoError::NotFound);
            }
            s.comments.retain(|_, c| c.post_id != id);
            s.likes.retain(|_, l| l.post_id != id);
            drop(s);
            self.persist();
            Ok(())
        }
    }

    #[async_trait]
    impl CommentRepo for InMemRepo {
        async fn create_comment(&self, new: NewComment) -> RepoResult<Comment> {
            let mut s = self.state.write().unwrap();
            if !s.posts.contains_key(&new.post_id) {
                return Err(RepoError::NotFound);
            }
            let comment = Comment {
                id: Uuid::new_v4(),
                post_id: new.post_id,
                user_id: new.user_id,
                description: new.description,
                created_at: Utc::now(),
            };
            s.comments.insert(comment.id, comment.clone());
            drop(s);
            self.persist();
            Ok(comment)
        }
        async fn get_comment(&self, id: Id) -> RepoResult<Comment> {
            let s = self.state.read().unwrap();
            s.comments.get(&id).cloned().ok_or(RepoError::NotFound)
        }
        async fn list_comments(&self, post_id: Id) -> RepoResult<Vec<Comment>> {
            let s = self.state.read().unwrap();
            let mut v: Vec<_> = s
                .comments
                .values()
                .filter(|c| c.post_id == post_id)
                .cloned()
                .collect();
            v.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(v)
        }
        async fn delete_comment(&self, id: Id) -> RepoResult<()> {
            let mut s = self.state.write().unwrap();
            if s.comments.remove(&id).is_none() {
                return Err(RepoError::NotFound);
            }
            drop(s);
            self.persist();
            Ok(())
        }
    }

    #[async_trait]
    impl LikeRepo for InMemRepo {
        async fn toggle_like(&self, post_id: Id, user_id: Id) -> RepoResult<bool> {
            // Lookup and flip happen under one write lock, so two racing
            // toggles cannot both insert.
            let mut s = self.state.write().unwrap();
            if !s.posts.contains_key(&post_id) {
                return Err(RepoError::NotFound);
            }
            let existing = s
                .likes
                .values()
                .find(|l| l.post_id == post_id && l.user_id == user_id)
                .map(|l| l.id);
            let liked = match existing {
                Some(like_id) => {
                    s.likes.remove(&like_id);
                    false
                }
                None => {
                    let like = Like { id: Uuid::new_v4(), post_id, user_id };
                    s.likes.insert(like.id, like);
                    true
                }
            };
            drop(s);
            self.persist();
            Ok(liked)
        }
        async fn like_count(&self, post_id: Id) -> RepoResult<i64> {
            let s = self.state.read().unwrap();
            Ok(s.likes.values().filter(|l| l.post_id == post_id).count() as i64)
        }
    }

    #[async_trait]
    impl ChatRepo for InMemRepo {
        async fn get_or_create_chat(&self, caller: Id, other: Id) -> RepoResult<Chat> {
            // Lookup and insert share the write lock: the unordered-pair
            // uniqueness invariant holds even for racing first contacts.
            let mut s = self.state.write().unwrap();
            if let Some(existing) = s.chat_for_pair(caller, other) {
                return Ok(existing);
            }
            let chat = Chat {
                id: Uuid::new_v4(),
                user1_id: caller,
                user2_id: other,
                created_at: Utc::now(),
            };
            s.chats.insert(chat.id, chat.clone());
            drop(s);
            self.persist();
            Ok(chat)
        }
        async fn get_chat(&self, id: Id) -> RepoResult<Chat> {
            let s = self.state.read().unwrap();
            s.chats.get(&id).cloned().ok_or(RepoError::NotFound)
        }
        async fn list_chats(&self, user_id: Id) -> RepoResult<Vec<Chat>> {
            let s = self.state.read().unwrap();
            let mut v: Vec<_> = s
                .chats
                .values()
                .filter(|c| c.has_participant(user_id))
                .cloned()
                .collect();
            v.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(v)
        }
        async fn create_message(&self, new: NewChatMessage) -> RepoResult<ChatMessage> {
            let mut s = self.state.write().unwrap();
            if !s.chats.contains_key(&new.chat_id) {
                return Err(RepoError::NotFound);
            }
            let msg = ChatMessage {
                id: Uuid::new_v4(),
                chat_id: new.chat_id,
                sender_id: new.sender_id,
                content: new.content,
                created_at: Utc::now(),
            };
            s.messages.push(msg.clone());
            drop(s);
            self.persist();
            Ok(msg)
        }
        async fn list_messages(&self, chat_id: Id) -> RepoResult<Vec<ChatMessage>> {
            let s = self.state.read().unwrap();
            let mut v: Vec<_> = s
                .messages
                .iter()
                .filter(|m| m.chat_id == chat_id)
                .cloned()
                .collect();
            // stable: equal timestamps keep send order
            v.sort_by(|a, b| a.created_at.cmp(&b.created_at));
            Ok(v)
        }
    }
}

// Postgres implementation (feature = "postgres-store")
#[cfg(feature = "postgres-store")]
pub mod pg {
    use super::*;
    use sqlx::{Pool, Postgres};
    use uuid::Uuid;

    #[derive(Clone)]
    pub struct PgRepo { pool: Pool<Postgres> }

    impl PgRepo {
        pub fn new(pool: Pool<Postgres>) -> Self { Self { pool } }
    }

    fn map_sqlx(e: sqlx::Error) -> RepoError {
        match e {
            sqlx::Error::RowNotFound => RepoError::NotFound,
            other => RepoError::Internal(other.to_string()),
        }
    }

    #[async_trait]
    impl UserRepo for PgRepo {
        async fn upsert_user(&self, user: User) -> RepoResult<()> {
            sqlx::query(
                "INSERT INTO users (id, email) VALUES ($1,$2) ON CONFLICT (id) DO UPDATE SET email = EXCLUDED.email",
            )
            .bind(user.id)
            .bind(&user.email)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
            Ok(())
        }
        async fn list_users(&self) -> RepoResult<Vec<User>> {
            sqlx::query_as::<_, User>("SELECT id, email FROM users")
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx)
        }
    }

    const POST_COLS: &str = "id, user_id, caption, url, file_type, file_name, category, created_at";

    #[async_trait]
    impl PostRepo for PgRepo {
        async fn create_post(&self, new: NewPost) -> RepoResult<Post> {
            let sql = format!(
                "INSERT INTO posts (id, user_id, caption, url, file_type, file_name, category) \
                 VALUES ($1,$2,$3,$4,$5,$6,$7) RETURNING {POST_COLS}"
            );
            sqlx::query_as::<_, Post>(&sql)
                .bind(Uuid::new_v4())
                .bind(new.user_id)
                .bind(&new.caption)
                .bind(&new.url)
                .bind(&new.file_type)
                .bind(&new.file_name)
                .bind(&new.category)
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx)
        }
        async fn get_post(&self, id: Id) -> RepoResult<Post> {
            let sql = format!("SELECT {POST_COLS} FROM posts WHERE id = $1");
            sqlx::query_as::<_, Post>(&sql)
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx)
        }
        async fn list_posts(&self, category: Option<&str>) -> RepoResult<Vec<Post>> {
            let sql = format!(
                "SELECT {POST_COLS} FROM posts WHERE ($1::text IS NULL OR category = $1) \
                 ORDER BY created_at DESC"
            );
            sqlx::query_as::<_, Post>(&sql)
                .bind(category)
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx)
        }
        async fn search_posts(&self, query: &str, category: Option<&str>) -> RepoResult<Vec<Post>> {
            let sql = format!(
                "SELECT {POST_COLS} FROM posts \
                 WHERE caption ILIKE '%' || $1 || '%' AND ($2::text IS NULL OR category = $2) \
                 ORDER BY created_at DESC"
            );
            sqlx::query_as::<_, Post>(&sql)
                .bind(query)
                .bind(category)
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx)
        }
        async fn liked_posts(&self, user_id: Id) -> RepoResult<Vec<Post>> {
            let sql = format!(
                "SELECT p.{} FROM posts p JOIN likes l ON l.post_id = p.id \
                 WHERE l.user_id = $1 ORDER BY p.created_at DESC",
                POST_COLS.replace(", ", ", p.")
            );
            sqlx::query_as::<_, Post>(&sql)
                .bind(user_id)
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx)
        }
        async fn delete_post(&self, id: Id) -> RepoResult<()> {
            let mut tx = self.pool.begin().await.map_err(map_sqlx)?;
            sqlx::query("DELETE FROM likes WHERE post_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx)?;
            sqlx::query("DELETE FROM comments WHERE post_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx)?;
            let res = sqlx::query("DELETE FROM posts WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx)?;
            if res.rows_affected() == 0 {
                return Err(RepoError::NotFound);
            }
            tx.commit().await.map_err(map_sqlx)?;
            Ok(())
        }
    }

    #[async_trait]
    impl CommentRepo for PgRepo {
        async fn create_comment(&self, new: NewComment) -> RepoResult<Comment> {
            sqlx::query_as::<_, Comment>(
                "INSERT INTO comments (id, post_id, user_id, description) VALUES ($1,$2,$3,$4) \
                 RETURNING id, post_id, user_id, description, created_at",
            )
            .bind(Uuid::new_v4())
            .bind(new.post_id)
            .bind(new.user_id)
            .bind(&new.description)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)
        }
        async fn get_comment(&self, id: Id) -> RepoResult<Comment> {
            sqlx::query_as::<_, Comment>(
                "SELECT id, post_id, user_id, description, created_at FROM comments WHERE id = $1",
            )
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)
        }
        async fn list_comments(&self, post_id: Id) -> RepoResult<Vec<Comment>> {
            sqlx::query_as::<_, Comment>(
                "SELECT id, post_id, user_id, description, created_at FROM comments \
                 WHERE post_id = $1 ORDER BY created_at DESC",
            )
            .bind(post_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)
        }
        async fn delete_comment(&self, id: Id) -> RepoResult<()> {
            let res = sqlx::query("DELETE FROM comments WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx)?;
            if res.rows_affected() == 0 {
                return Err(RepoError::NotFound);
            }
            Ok(())
        }
    }

    #[async_trait]
    impl LikeRepo for PgRepo {
        async fn toggle_like(&self, post_id: Id, user_id: Id) -> RepoResult<bool> {
            let mut tx = self.pool.begin().await.map_err(map_sqlx)?;
            let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM posts WHERE id = $1")
                .bind(post_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_sqlx)?;
            if exists.is_none() {
                return Err(RepoError::NotFound);
            }
            let removed = sqlx::query("DELETE FROM likes WHERE post_id = $1 AND user_id = $2")
                .bind(post_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx)?;
            let liked = if removed.rows_affected() == 0 {
                // Unique (post_id, user_id) closes the read-then-insert race.
                sqlx::query(
                    "INSERT INTO likes (id, post_id, user_id) VALUES ($1,$2,$3) \
                     ON CONFLICT (post_id, user_id) DO NOTHING",
                )
                .bind(Uuid::new_v4())
                .bind(post_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx)?;
                true
            } else {
                false
            };
            tx.commit().await.map_err(map_sqlx)?;
            Ok(liked)
        }
        async fn like_count(&self, post_id: Id) -> RepoResult<i64> {
            let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM likes WHERE post_id = $1")
                .bind(post_id)
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx)?;
            Ok(count)
        }
    }

    const CHAT_COLS: &str = "id, user1_id, user2_id, created_at";

    #[async_trait]
    impl ChatRepo for PgRepo {
        async fn get_or_create_chat(&self, caller: Id, other: Id) -> RepoResult<Chat> {
            let lookup = format!(
                "SELECT {CHAT_COLS} FROM chats \
                 WHERE (user1_id = $1 AND user2_id = $2) OR (user1_id = $2 AND user2_id = $1)"
            );
            if let Some(chat) = sqlx::query_as::<_, Chat>(&lookup)
                .bind(caller)
                .bind(other)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx)?
            {
                return Ok(chat);
            }
            // The unique index over (LEAST, GREATEST) of the pair turns a
            // racing double-insert into a no-op; the loser re-selects.
            let insert = format!(
                "INSERT INTO chats (id, user1_id, user2_id) VALUES ($1,$2,$3) \
                 ON CONFLICT ((LEAST(user1_id, user2_id)), (GREATEST(user1_id, user2_id))) DO NOTHING \
                 RETURNING {CHAT_COLS}"
            );
            if let Some(chat) = sqlx::query_as::<_, Chat>(&insert)
                .bind(Uuid::new_v4())
                .bind(caller)
                .bind(other)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx)?
            {
                return Ok(chat);
            }
            sqlx::query_as::<_, Chat>(&lookup)
                .bind(caller)
                .bind(other)
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx)
        }
        async fn get_chat(&self, id: Id) -> RepoResult<Chat> {
            let sql = format!("SELECT {CHAT_COLS} FROM chats WHERE id = $1");
            sqlx::query_as::<_, Chat>(&sql)
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx)
        }
        async fn list_chats(&self, user_id: Id) -> RepoResult<Vec<Chat>> {
            let sql = format!(
                "SELECT {CHAT_COLS} FROM chats WHERE user1_id = $1 OR user2_id = $1 \
                 ORDER BY created_at DESC"
            );
            sqlx::query_as::<_, Chat>(&sql)
                .bind(user_id)
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx)
        }
        async fn create_message(&self, new: NewChatMessage) -> RepoResult<ChatMessage> {
            sqlx::query_as::<_, ChatMessage>(
                "INSERT INTO chat_messages (id, chat_id, sender_id, content) VALUES ($1,$2,$3,$4) \
                 RETURNING id, chat_id, sender_id, content, created_at",
            )
            .bind(Uuid::new_v4())
            .bind(new.chat_id)
            .bind(new.sender_id)
            .bind(&new.content)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)
        }
        async fn list_messages(&self, chat_id: Id) -> RepoResult<Vec<ChatMessage>> {
            sqlx::query_as::<_, ChatMessage>(
                "SELECT id, chat_id, sender_id, content, created_at FROM chat_messages \
                 WHERE chat_id = $1 ORDER BY created_at ASC, id ASC",
            )
            .bind(chat_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)
        }
    }
}
