// Presentation layer - Command line and output handlers
pub mod cli;
pub mod handlers;
