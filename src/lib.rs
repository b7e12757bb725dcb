pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod list;
pub mod mutation;
pub mod record;
pub mod remote;
pub mod screen;
pub mod session;
