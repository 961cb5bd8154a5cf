//! Core data types for pinion: configuration, channels, repository metadata
//! access and the lockfile written after a successful resolution.

pub mod channel;
pub mod config;
pub mod lockfile;
pub mod repodata;
