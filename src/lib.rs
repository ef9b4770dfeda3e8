pub mod analyzer;
pub mod cli;
pub mod config;
pub mod matcher;
pub mod model;
pub mod normalizer;
pub mod reconcile;
pub mod source;
pub mod storage;
