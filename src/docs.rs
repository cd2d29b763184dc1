// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::admin_login,
        handlers::auth::branch_manager_login,
        handlers::auth::get_me,
        handlers::auth::verify_token,
        handlers::auth::logout,
        handlers::auth::branch_manager_info,

        // --- Branches ---
        handlers::branches::list_branches,
        handlers::branches::create_branch,
        handlers::branches::get_branch,
        handlers::branches::update_branch,
        handlers::branches::delete_branch,
        handlers::branches::assign_manager,
        handlers::branches::deactivate_manager,

        // --- Layout ---
        handlers::layout::list_floors,
        handlers::layout::create_floor,
        handlers::layout::get_floor,
        handlers::layout::update_floor,
        handlers::layout::delete_floor,
        handlers::layout::list_sections,
        handlers::layout::create_section,
        handlers::layout::get_section,
        handlers::layout::update_section,
        handlers::layout::delete_section,

        // --- Stalls ---
        handlers::stalls::list_stalls,
        handlers::stalls::filter_stalls,
        handlers::stalls::create_stall,
        handlers::stalls::get_stall,
        handlers::stalls::update_stall,
        handlers::stalls::delete_stall,

        // --- Landing ---
        handlers::landing::list_stalls,
        handlers::landing::get_stall,
        handlers::landing::list_areas,
        handlers::landing::stalls_by_area,
        handlers::landing::locations_by_area,
        handlers::landing::filter_stalls,

        // --- Applicants ---
        handlers::applicants::create_applicant,
        handlers::applicants::list_applicants,
        handlers::applicants::get_applicant,
        handlers::applicants::update_applicant,
        handlers::applicants::delete_applicant,

        // --- Applications ---
        handlers::applications::create_application,
        handlers::applications::list_applications,
        handlers::applications::application_stats,
        handlers::applications::get_application,
        handlers::applications::update_application_status,
        handlers::applications::delete_application,

        // --- Health ---
        handlers::health::health_check,
    ),
    components(
        schemas(
            // --- Status ---
            models::status::RecordStatus,
            models::status::ApplicationStatus,

            // --- Auth ---
            models::auth::Role,
            models::auth::LoginPayload,
            models::auth::SessionUser,
            models::auth::AuthResponse,
            models::auth::TokenStatus,
            models::auth::BranchManagerInfo,

            // --- Branches ---
            models::branch::Branch,
            models::branch::BranchOverview,
            models::branch::BranchManager,
            models::branch::CreateBranchPayload,
            models::branch::UpdateBranchPayload,
            models::branch::AssignManagerPayload,

            // --- Layout ---
            models::layout::Floor,
            models::layout::Section,
            models::layout::CreateFloorPayload,
            models::layout::UpdateFloorPayload,
            models::layout::CreateSectionPayload,
            models::layout::UpdateSectionPayload,

            // --- Stalls ---
            models::stall::StallDetail,
            models::stall::CreateStallPayload,
            models::stall::UpdateStallPayload,
            models::stall::SortOrder,
            models::stall::AreaSummary,
            models::stall::LocationEntry,

            // --- Applicants ---
            models::applicant::Applicant,
            models::applicant::BusinessInformation,
            models::applicant::Spouse,
            models::applicant::OtherInformation,
            models::applicant::ApplicantDetail,
            models::applicant::ApplicantSummary,
            models::applicant::BusinessInformationInput,
            models::applicant::SpouseInput,
            models::applicant::OtherInformationInput,
            models::applicant::CreateApplicantPayload,
            models::applicant::UpdateApplicantPayload,

            // --- Applications ---
            models::application::Application,
            models::application::ApplicationListItem,
            models::application::ApplicationDetail,
            models::application::StatusCount,
            models::application::ApplicationStats,
            models::application::CreateApplicationPayload,
            models::application::UpdateApplicationStatusPayload,
            models::application::StatusChange,
        )
    ),
    tags(
        (name = "Auth", description = "Login de admin e gerentes, sessão pelo token"),
        (name = "Branches", description = "Filiais e seus gerentes (somente admin)"),
        (name = "Layout", description = "Andares e seções da filial"),
        (name = "Stalls", description = "Bancas dentro do escopo do chamador"),
        (name = "Landing", description = "Catálogo público de bancas"),
        (name = "Applicants", description = "Candidatos e seus dados complementares"),
        (name = "Applications", description = "Candidaturas e aprovação de bancas"),
        (name = "Health", description = "Disponibilidade do serviço")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
