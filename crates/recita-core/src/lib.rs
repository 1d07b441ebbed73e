pub mod config;
pub mod logging;

pub mod catalog;
pub mod fetch;
pub mod layout;
pub mod migrate;
pub mod pipeline;
pub mod retry;
pub mod sweep;
pub mod transcode;
