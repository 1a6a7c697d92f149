pub mod config;
pub mod forget;
pub mod list;
pub mod read;
pub mod simulate;
