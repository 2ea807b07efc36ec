pub mod constants;
pub mod gateway;
pub mod prompt;
pub mod server;
pub mod session;

pub use gateway::{GatewayError, ModelGateway, TextModel};
pub use server::{AppState, ChatMessage, ChatResponse};
pub use session::{Exchange, SessionStore};
