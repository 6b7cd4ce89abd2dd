pub mod error;
pub mod memory;
pub mod output;
pub mod processor;
