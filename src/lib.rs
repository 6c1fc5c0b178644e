pub mod aggregate;
pub mod classify;
pub mod config;
pub mod dataset;
pub mod diagram;
pub mod endpoints;
pub mod export;
pub mod fake_plays;
pub mod play;
pub mod query;
pub mod sequencer;
pub mod situation;
pub mod store;
pub mod summary;
