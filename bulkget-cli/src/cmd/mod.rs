pub mod config;
pub mod demo;
pub mod fetch;
pub mod migrate;
pub mod seed;
