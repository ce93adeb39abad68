// Handlers module

pub mod conversations;
pub mod error;
pub mod health;
pub mod messages;
pub mod models;
pub mod stream;

pub use conversations::{
    create_conversation_handler, delete_conversation_handler, get_conversation_handler,
    list_conversations_handler, update_conversation_handler,
};
pub use error::{handle_rejection, ApiError};
pub use health::{health_handler, status_handler};
pub use messages::{list_messages_handler, send_message_handler};
pub use models::list_models_handler;
pub use stream::stream_handler;
