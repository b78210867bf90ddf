pub mod auth;
pub mod category;
pub mod comment;
pub mod database;
pub mod like;
pub mod message;
pub mod notification;
pub mod post;
pub mod typing;
pub mod user;

pub use auth::AuthService;
pub use category::CategoryService;
pub use comment::CommentService;
pub use database::Database;
pub use like::LikeService;
pub use message::MessageService;
pub use notification::NotificationService;
pub use post::PostService;
pub use typing::TypingStatusStore;
pub use user::UserService;
