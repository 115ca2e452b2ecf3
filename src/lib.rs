pub mod cli;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod document;
pub mod engine;
pub mod errors;
pub mod session;
