use crate::{
    config::Config,
    services::{
        auth::AuthService,
        category::CategoryService,
        comment::CommentService,
        like::LikeService,
        message::MessageService,
        notification::NotificationService,
        post::PostService,
        user::UserService,
    },
};

/// Shared application state: configuration plus one instance of every
/// service. Handlers receive it as `State<Arc<AppState>>`.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,

    pub auth_service: AuthService,

    pub user_service: UserService,

    pub post_service: PostService,

    pub category_service: CategoryService,

    pub comment_service: CommentService,

    pub like_service: LikeService,

    pub message_service: MessageService,

    pub notification_service: NotificationService,
}
