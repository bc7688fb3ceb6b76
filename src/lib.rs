// src/lib.rs

//! Stock and news data-orchestration library

pub mod controller;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;

#[cfg(test)]
mod testing;
