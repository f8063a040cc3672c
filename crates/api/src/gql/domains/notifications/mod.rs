pub mod resolvers;
pub mod service;
pub mod types;
pub mod vars;

pub use resolvers::{NotificationMutation, NotificationQuery};
