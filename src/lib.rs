//! Client library for PromptCron: author recurring AI-prompt-to-email
//! schedules and manage them through the schedules REST API.

pub mod api;
pub mod config;
pub mod draft;
pub mod errors;
pub mod log;
pub mod session;
pub mod template;
pub mod view;
pub mod wire;
