pub mod classifier;
pub mod community;
pub mod config;
pub mod errors;
pub mod models;
pub mod mood;
pub mod storage;
#[cfg(test)]
pub mod test_helpers;
pub mod trading;
