//! Command implementations

pub mod init;
pub mod process;
pub mod rules;
