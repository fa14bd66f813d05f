pub mod compositor;
pub mod config;
pub mod error;
pub mod motion;
pub mod trajectory;
