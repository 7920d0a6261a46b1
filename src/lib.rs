pub mod adapters;
pub mod card;
pub mod compose;
pub mod config;
pub mod draft;
pub mod error;
pub mod generator;
pub mod http;
pub mod inline;
pub mod profile;
pub mod publish;
pub mod server;
pub mod validate;
