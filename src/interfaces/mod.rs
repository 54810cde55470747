//! Outer surface: CSV command input, report output and the handler between them.

pub mod csv;
pub mod handler;
