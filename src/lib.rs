//! cubebot — conversational class-schedule assistant.

pub mod auth;
pub mod catalog;
pub mod channels;
pub mod config;
pub mod error;
pub mod matcher;
pub mod render;
pub mod router;
pub mod search;
pub mod session;
pub mod store;
