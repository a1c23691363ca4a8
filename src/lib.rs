// src/lib.rs

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod scoring;
pub mod seed;
pub mod state;
pub mod utils;

pub use routes::create_router;
