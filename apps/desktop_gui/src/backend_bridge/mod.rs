//! Bridge between the UI thread and the tokio-backed upload worker.

pub mod commands;
pub mod runtime;
