pub mod binder;
pub mod catalog;
pub mod new_users;
pub mod pipeline;
pub mod prompts;
pub mod registry;
pub mod resources;
pub mod transcript;
