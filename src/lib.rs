pub mod config;
pub mod dates;
pub mod error;
pub mod history;
pub mod logger;
pub mod request;
pub mod service;
pub mod status;
pub mod utils;
pub mod workflow;
