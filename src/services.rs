pub mod auth;
pub mod branch_service;
pub mod layout_service;
pub mod stall_service;
pub mod landing_service;
pub mod applicant_service;
pub mod application_service;
