//! Port traits for the collaborators the core never touches directly.

pub mod config_port;
pub mod data_port;
pub mod report_port;
