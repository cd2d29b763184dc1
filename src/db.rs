pub mod account_repo;
pub use account_repo::AccountRepository;
pub mod branch_repo;
pub use branch_repo::BranchRepository;
pub mod floor_repo;
pub use floor_repo::FloorRepository;
pub mod section_repo;
pub use section_repo::SectionRepository;
pub mod stall_repo;
pub use stall_repo::StallRepository;
pub mod landing_repo;
pub use landing_repo::LandingRepository;
pub mod applicant_repo;
pub use applicant_repo::ApplicantRepository;
pub mod application_repo;
pub use application_repo::ApplicationRepository;
