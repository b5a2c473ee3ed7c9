//! The three probe operations: model listing, chat, embeddings.

pub mod chat;
pub mod embeddings;
pub mod models;
