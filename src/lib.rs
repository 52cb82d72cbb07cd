pub mod config;
pub mod convert;
pub mod error;
pub mod mapping;
pub mod matching;
pub mod report;
