pub mod health;
pub mod metrics;
pub mod publish;
pub mod response;
pub mod stream;

// Re-export commonly used types
pub use publish::{handle_publish, PublishResponse};
pub use response::ApiResponse;
