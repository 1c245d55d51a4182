use std::collections::HashMap;
use std::sync::Arc;

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::TryStreamExt as _;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::*;
use crate::repo::Repo;
use crate::storage::MediaStore;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/upload").route(web::post().to(upload_post)))
        .service(web::resource("/feed").route(web::get().to(get_feed)))
        .service(web::resource("/search").route(web::get().to(search_posts)))
        .service(web::resource("/posts/liked").route(web::get().to(liked_posts)))
        .service(web::resource("/posts/{id}").route(web::delete().to(delete_post)))
        .service(web::resource("/posts/{id}/comments").route(web::get().to(list_comments)))
        .service(web::resource("/posts/{id}/createcomment").route(web::post().to(create_comment)))
        .service(web::resource("/comments/{id}").route(web::delete().to(delete_comment)))
        .service(web::resource("/posts/{id}/like").route(web::post().to(toggle_like)))
        .service(web::resource("/posts/{id}/likes").route(web::get().to(get_likes)))
        .service(
            web::resource("/chats/")
                .route(web::post().to(create_chat))
                .route(web::get().to(list_chats)),
        )
        .service(
            web::resource("/chats/{id}/messages")
                .route(web::post().to(send_chat_message))
                .route(web::get().to(get_chat_messages)),
        )
        .route("/healthz", web::get().to(healthz));
}

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repo>,
    pub media_store: Arc<dyn MediaStore>,
}

fn parse_id(raw: &str) -> Result<Id, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::InvalidIdentifier)
}

/// Annotate raw posts with like counts, owner email and the caller's
/// ownership flag. Explicit mapping step; nothing reflective.
async fn annotate_posts(
    repo: &dyn Repo,
    posts: Vec<Post>,
    caller: Id,
) -> Result<Vec<PostView>, ApiError> {
    let emails: HashMap<Id, String> = repo
        .list_users()
        .await?
        .into_iter()
        .map(|u| (u.id, u.email))
        .collect();
    let mut views = Vec::with_capacity(posts.len());
    for post in posts {
        let like_count = repo.like_count(post.id).await?;
        let email = emails
            .get(&post.user_id)
            .cloned()
            .unwrap_or_else(|| "Unknown".to_string());
        views.push(PostView::annotate(post, caller, email, like_count));
    }
    Ok(views)
}

// ---------------- posts / feed ----------------

#[utoipa::path(
    post,
    path = "/upload",
    responses(
        (status = 200, description = "Post created", body = Post),
        (status = 500, description = "Upload or persistence failed")
    )
)]
pub async fn upload_post(
    auth: AuthUser,
    data: web::Data<AppState>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    // Request-local buffer; dropped on every exit path.
    let mut bytes: Vec<u8> = Vec::new();
    let mut file_name = String::from("upload");
    let mut content_type: Option<String> = None;
    let mut caption = String::new();
    let mut category = String::new();

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| ApiError::UploadFailed(e.to_string()))?
    {
        let name = field
            .content_disposition()
            .get_name()
            .unwrap_or_default()
            .to_string();
        let mut buf: Vec<u8> = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| ApiError::UploadFailed(e.to_string()))?
        {
            buf.extend_from_slice(&chunk);
        }
        match name.as_str() {
            "file" => {
                if let Some(fname) = field.content_disposition().get_filename() {
                    file_name = fname.to_string();
                }
                content_type = field.content_type().map(|m| m.to_string());
                bytes = buf;
            }
            "caption" => caption = String::from_utf8_lossy(&buf).into_owned(),
            "category" => category = String::from_utf8_lossy(&buf).into_owned(),
            _ => {}
        }
    }
    if bytes.is_empty() {
        return Err(ApiError::UploadFailed("missing file field".into()));
    }

    // file_type is derived from the declared content type, with a byte
    // sniff as fallback when the part did not carry one.
    let mime = content_type.unwrap_or_else(|| {
        infer::get(&bytes)
            .map(|t| t.mime_type().to_string())
            .unwrap_or_else(|| "application/octet-stream".into())
    });
    let file_type = if mime.starts_with("video/") { "video" } else { "image" };

    let stored = data
        .media_store
        .upload(&file_name, &mime, &bytes)
        .await
        .map_err(|e| ApiError::UploadFailed(e.to_string()))?;
    if stored.url.is_empty() {
        return Err(ApiError::UploadFailed("media store returned empty url".into()));
    }

    // Persist only after the media store reported success.
    let post = data
        .repo
        .create_post(NewPost {
            user_id: auth.id,
            caption,
            url: stored.url,
            file_type: file_type.to_string(),
            file_name: stored.file_name,
            category,
        })
        .await
        .map_err(|e| ApiError::UploadFailed(e.to_string()))?;
    Ok(HttpResponse::Ok().json(post))
}

#[derive(serde::Deserialize)]
pub struct FeedQuery {
    category: Option<String>,
}

#[utoipa::path(
    get,
    path = "/feed",
    params(("category" = Option<String>, Query, description = "Exact category filter")),
    responses((status = 200, description = "Posts newest-first with annotations"))
)]
pub async fn get_feed(
    auth: AuthUser,
    data: web::Data<AppState>,
    query: web::Query<FeedQuery>,
) -> Result<HttpResponse, ApiError> {
    let category = query.category.as_deref().filter(|c| !c.is_empty());
    let posts = data.repo.list_posts(category).await?;
    let views = annotate_posts(data.repo.as_ref(), posts, auth.id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "posts": views })))
}

#[derive(serde::Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    query: String,
    category: Option<String>,
}

#[utoipa::path(
    get,
    path = "/search",
    params(
        ("query" = String, Query, description = "Case-insensitive caption substring"),
        ("category" = Option<String>, Query, description = "Exact category filter")
    ),
    responses((status = 200, description = "Matching posts newest-first"))
)]
pub async fn search_posts(
    auth: AuthUser,
    data: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, ApiError> {
    let category = query.category.as_deref().filter(|c| !c.is_empty());
    let posts = data.repo.search_posts(&query.query, category).await?;
    let views = annotate_posts(data.repo.as_ref(), posts, auth.id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "posts": views })))
}

#[utoipa::path(
    get,
    path = "/posts/liked",
    responses((status = 200, description = "Posts the caller has liked, newest-first"))
)]
pub async fn liked_posts(
    auth: AuthUser,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let posts = data.repo.liked_posts(auth.id).await?;
    let views = annotate_posts(data.repo.as_ref(), posts, auth.id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "posts": views })))
}

#[utoipa::path(
    delete,
    path = "/posts/{id}",
    params(("id" = Uuid, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post deleted"),
        (status = 403, description = "Caller is not the owner"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn delete_post(
    auth: AuthUser,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let post_id = parse_id(&path)?;
    let post = data.repo.get_post(post_id).await?;
    if post.user_id != auth.id {
        return Err(ApiError::Forbidden);
    }
    data.repo.delete_post(post_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Post deleted successfully"
    })))
}

// ---------------- comments ----------------

#[utoipa::path(
    get,
    path = "/posts/{id}/comments",
    params(("id" = Uuid, Path, description = "Post id")),
    responses(
        (status = 200, description = "Comments newest-first"),
        (status = 400, description = "Malformed id")
    )
)]
pub async fn list_comments(
    _auth: AuthUser,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let post_id = parse_id(&path)?;
    let comments = data.repo.list_comments(post_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "comments": comments })))
}

#[derive(serde::Deserialize, utoipa::ToSchema)]
pub struct CommentForm {
    pub description: String,
}

#[utoipa::path(
    post,
    path = "/posts/{id}/createcomment",
    responses(
        (status = 200, description = "Comment created", body = Comment),
        (status = 404, description = "Post not found")
    )
)]
pub async fn create_comment(
    auth: AuthUser,
    data: web::Data<AppState>,
    path: web::Path<String>,
    form: web::Form<CommentForm>,
) -> Result<HttpResponse, ApiError> {
    let post_id = parse_id(&path)?;
    // Existence check before the write, 404 when the post is gone.
    data.repo.get_post(post_id).await?;
    let comment = data
        .repo
        .create_comment(NewComment {
            post_id,
            user_id: auth.id,
            description: form.into_inner().description,
        })
        .await?;
    Ok(HttpResponse::Ok().json(comment))
}

#[utoipa::path(
    delete,
    path = "/comments/{id}",
    params(("id" = Uuid, Path, description = "Comment id")),
    responses(
        (status = 200, description = "Comment deleted"),
        (status = 403, description = "Caller is not the author"),
        (status = 404, description = "Comment not found")
    )
)]
pub async fn delete_comment(
    auth: AuthUser,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let comment_id = parse_id(&path)?;
    let comment = data.repo.get_comment(comment_id).await?;
    if comment.user_id != auth.id {
        return Err(ApiError::Forbidden);
    }
    data.repo.delete_comment(comment_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Comment deleted" })))
}

// ---------------- likes ----------------

#[utoipa::path(
    post,
    path = "/posts/{id}/like",
    params(("id" = Uuid, Path, description = "Post id")),
    responses(
        (status = 200, description = "Like toggled"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn toggle_like(
    auth: AuthUser,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let post_id = parse_id(&path)?;
    let liked = data.repo.toggle_like(post_id, auth.id).await?;
    let message = if liked { "Post liked" } else { "Post unliked" };
    Ok(HttpResponse::Ok().json(serde_json::json!({ "liked": liked, "message": message })))
}

#[utoipa::path(
    get,
    path = "/posts/{id}/likes",
    params(("id" = Uuid, Path, description = "Post id")),
    responses((status = 200, description = "Like count"))
)]
pub async fn get_likes(
    _auth: AuthUser,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let post_id = parse_id(&path)?;
    let count = data.repo.like_count(post_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "likes": count })))
}

// ---------------- chats ----------------

#[derive(serde::Deserialize, utoipa::ToSchema)]
pub struct ChatCreate {
    pub other_user_id: String,
}

#[utoipa::path(
    post,
    path = "/chats/",
    request_body = ChatCreate,
    responses(
        (status = 200, description = "Existing or newly created chat", body = Chat),
        (status = 400, description = "Malformed other_user_id")
    )
)]
pub async fn create_chat(
    auth: AuthUser,
    data: web::Data<AppState>,
    payload: web::Json<ChatCreate>,
) -> Result<HttpResponse, ApiError> {
    let other = parse_id(&payload.other_user_id)?;
    let chat = data.repo.get_or_create_chat(auth.id, other).await?;
    Ok(HttpResponse::Ok().json(chat))
}

#[utoipa::path(
    get,
    path = "/chats/",
    responses((status = 200, description = "Caller's chats, newest-first", body = [Chat]))
)]
pub async fn list_chats(
    auth: AuthUser,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let chats = data.repo.list_chats(auth.id).await?;
    Ok(HttpResponse::Ok().json(chats))
}

#[derive(serde::Deserialize, utoipa::ToSchema)]
pub struct ChatMessageCreate {
    pub content: String,
}

#[utoipa::path(
    post,
    path = "/chats/{id}/messages",
    request_body = ChatMessageCreate,
    responses(
        (status = 200, description = "Message appended", body = ChatMessage),
        (status = 404, description = "Chat missing or caller not a participant")
    )
)]
pub async fn send_chat_message(
    auth: AuthUser,
    data: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<ChatMessageCreate>,
) -> Result<HttpResponse, ApiError> {
    let chat_id = parse_id(&path)?;
    let chat = data.repo.get_chat(chat_id).await?;
    // Membership is enforced on send as well as on read; outsiders see
    // the same 404 as for an absent chat.
    if !chat.has_participant(auth.id) {
        return Err(ApiError::NotFound);
    }
    let msg = data
        .repo
        .create_message(NewChatMessage {
            chat_id,
            sender_id: auth.id,
            content: payload.into_inner().content,
        })
        .await?;
    Ok(HttpResponse::Ok().json(msg))
}

#[utoipa::path(
    get,
    path = "/chats/{id}/messages",
    params(("id" = Uuid, Path, description = "Chat id")),
    responses(
        (status = 200, description = "Full history, ascending created_at", body = [ChatMessage]),
        (status = 404, description = "Chat missing or caller not a participant")
    )
)]
pub async fn get_chat_messages(
    auth: AuthUser,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let chat_id = parse_id(&path)?;
    let chat = data.repo.get_chat(chat_id).await?;
    if !chat.has_participant(auth.id) {
        return Err(ApiError::NotFound);
    }
    let messages = data.repo.list_messages(chat_id).await?;
    Ok(HttpResponse::Ok().json(messages))
}

pub async fn healthz() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}
