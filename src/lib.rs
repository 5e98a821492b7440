// Core infrastructure modules
pub mod core;

// Front ends
pub mod cli;
pub mod config;

#[cfg(test)]
pub mod test_utils;
