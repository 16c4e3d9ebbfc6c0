// Public API - the runner and the configuration it consumes
pub mod config;
pub mod runner;

// Internal modules - organized by subsystem
mod broker;
mod delivery;
mod envelope;
mod error;
mod source;
mod spool;
