//! `TopicChat`: terminal client core for topic-threaded chat.

pub mod app;
pub mod composer;
pub mod config;
pub mod presenter;
pub mod reactions;
pub mod sender;
pub mod ui;
