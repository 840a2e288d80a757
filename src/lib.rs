//! Monero Tutor is a terminal chat client that teaches Monero through any
//! OpenAI-compatible chat-completions API.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the chat session controller: the preference store and
//!   model catalog, model resolution with self-healing fallback, the
//!   persisted conversation log, and the completion request pipeline.
//! - [`auth`] stores per-model API keys in the system keyring.
//! - [`cli`] exposes the command-line surface that drives the core.
//! - [`api`] defines the chat-completions wire payloads.
//!
//! The binary (`src/main.rs`) routes straight into [`crate::cli::main`].

pub mod api;
pub mod auth;
pub mod cli;
pub mod core;
pub mod utils;
