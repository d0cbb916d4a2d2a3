// src/models/mod.rs

pub mod dashboard;
pub mod quiz;
pub mod response;
pub mod user;
