// src/handlers.rs

pub mod applicants;
pub mod applications;
pub mod auth;
pub mod branches;
pub mod health;
pub mod landing;
pub mod layout;
pub mod stalls;
