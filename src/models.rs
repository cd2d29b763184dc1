// src/models.rs

pub mod applicant;
pub mod application;
pub mod auth;
pub mod branch;
pub mod layout;
pub mod stall;
pub mod status;
