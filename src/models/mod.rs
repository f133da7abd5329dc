// Data models and DTOs
// Publish payloads and the persisted location record

pub mod location;
pub mod publish;

pub use location::Location;
pub use publish::{Command, CommandAction, Identity, LocationReport, PublishRejection, PublishRequest};
