//! Shared data model for `TopicChat`: message records, reactions, and the
//! message submission request/response shapes.

pub mod message;
pub mod request;
