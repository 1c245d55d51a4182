use crate::models::{Chat, ChatMessage, Comment, Post, PostView, User};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::upload_post,
        crate::routes::get_feed,
        crate::routes::search_posts,
        crate::routes::liked_posts,
        crate::routes::delete_post,
        crate::routes::list_comments,
        crate::routes::create_comment,
        crate::routes::delete_comment,
        crate::routes::toggle_like,
        crate::routes::get_likes,
        crate::routes::create_chat,
        crate::routes::list_chats,
        crate::routes::send_chat_message,
        crate::routes::get_chat_messages,
    ),
    components(schemas(
        User, Post, PostView, Comment, Chat, ChatMessage,
        crate::routes::CommentForm,
        crate::routes::ChatCreate,
        crate::routes::ChatMessageCreate,
    )),
    tags(
        (name = "posts", description = "Upload, feed, search and deletion"),
        (name = "social", description = "Comments and likes"),
        (name = "chats", description = "Two-party chats and messages"),
    )
)]
pub struct ApiDoc;
