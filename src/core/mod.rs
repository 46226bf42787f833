pub mod brand;
pub mod config;
pub mod flags;
pub mod hardware;
pub mod report;
pub mod runtime;
