//! Typed client for the Second Brain REST backend.
//!
//! The backend stores tasks, notes, resources and study sessions per user
//! and hands out bearer tokens from `POST /token`. This crate wraps those
//! endpoints in [`ApiClient`].

mod client;
mod config;
mod error;
mod types;

pub use client::ApiClient;
pub use config::{
    token_from_env, ApiConfig, Credentials, API_URL_VAR, DEFAULT_API_URL, PASSWORD_VAR,
    TOKEN_VAR, USER_VAR,
};
pub use error::ApiError;
pub use types::{
    split_tags, NewNote, NewResource, NewStudySession, NewTask, NewUser, Note, Priority, Resource,
    Stats, StudySession, Task, TaskStatus, Token, User,
};
