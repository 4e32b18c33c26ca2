//! `tasksync`: local/remote task list reconciliation and importance ranking.

pub mod config;
pub mod tasks;
