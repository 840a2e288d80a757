pub mod builtin_models;
pub mod completion;
pub mod config;
pub mod constants;
pub mod conversation;
pub mod keyring;
pub mod message;
pub mod resolver;
pub mod session;
pub mod storage;
