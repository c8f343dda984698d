//! Route handlers

pub mod control;
pub mod prompts;
pub mod reminders;
pub mod status;
