pub mod config;
pub mod engine;
pub mod ensemble;
pub mod error;
pub mod models;
pub mod provider;
pub mod risk;
#[cfg(test)]
pub mod test_helpers;
