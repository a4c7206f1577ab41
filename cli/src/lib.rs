pub mod job;
pub mod profile;
pub mod stealth_commands;
#[macro_use]
extern crate log;
