//! Library crate for quizline, exposing modules for the binary and integration tests.

pub mod config;
pub mod dao;
pub mod dto;
pub mod error;
pub mod server;
pub mod services;
pub mod state;
