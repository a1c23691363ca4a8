// src/models/mod.rs

pub mod question;
pub mod quiz;
pub mod result;
pub mod user;

/// Treats a missing or blank field of a partial update as "leave unchanged".
pub fn provided(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
