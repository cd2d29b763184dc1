// src/app.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use utoipa::OpenApi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

/// Monta o router completo da API.
pub fn build_router(app_state: AppState) -> Router {
    // --- Rotas públicas ---
    let public_routes = Router::new()
        .route("/api/health", get(handlers::health::health_check))
        .route("/api/docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .route("/api/auth/admin/login", post(handlers::auth::admin_login))
        .route("/api/auth/branch_manager/login", post(handlers::auth::branch_manager_login))
        // Formulários da landing page
        .route("/api/applicants", post(handlers::applicants::create_applicant))
        .route("/api/applications", post(handlers::applications::create_application))
        .nest("/api/landing/stalls", landing_routes());

    // --- Rotas protegidas: token obrigatório; papel e escopo nos extratores ---
    let protected_routes = Router::new()
        .nest("/api/auth", session_routes())
        .nest("/api/branches", branch_routes())
        .nest("/api/floors", floor_routes())
        .nest("/api/sections", section_routes())
        .nest("/api/stalls", stall_routes())
        .nest("/api/applicants", applicant_routes())
        .nest("/api/applications", application_routes())
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(app_state)
}

fn landing_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::landing::list_stalls))
        .route("/areas", get(handlers::landing::list_areas))
        .route("/by-area", get(handlers::landing::stalls_by_area))
        .route("/locations", get(handlers::landing::locations_by_area))
        .route("/filter", get(handlers::landing::filter_stalls))
        .route("/{id}", get(handlers::landing::get_stall))
}

fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/verify-token", get(handlers::auth::verify_token))
        .route("/logout", post(handlers::auth::logout))
        .route("/branch-manager-info", get(handlers::auth::branch_manager_info))
}

fn branch_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::branches::list_branches).post(handlers::branches::create_branch),
        )
        .route(
            "/{id}",
            get(handlers::branches::get_branch)
                .put(handlers::branches::update_branch)
                .delete(handlers::branches::delete_branch),
        )
        .route("/{id}/assign-manager", put(handlers::branches::assign_manager))
        .route("/{id}/manager", delete(handlers::branches::deactivate_manager))
}

fn floor_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::layout::list_floors).post(handlers::layout::create_floor),
        )
        .route(
            "/{id}",
            get(handlers::layout::get_floor)
                .put(handlers::layout::update_floor)
                .delete(handlers::layout::delete_floor),
        )
}

fn section_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::layout::list_sections).post(handlers::layout::create_section),
        )
        .route(
            "/{id}",
            get(handlers::layout::get_section)
                .put(handlers::layout::update_section)
                .delete(handlers::layout::delete_section),
        )
}

fn stall_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::stalls::list_stalls).post(handlers::stalls::create_stall),
        )
        .route("/filter", get(handlers::stalls::filter_stalls))
        .route(
            "/{id}",
            get(handlers::stalls::get_stall)
                .put(handlers::stalls::update_stall)
                .delete(handlers::stalls::delete_stall),
        )
}

// O POST (cadastro público) fica nas rotas públicas
fn applicant_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::applicants::list_applicants))
        .route(
            "/{id}",
            get(handlers::applicants::get_applicant)
                .put(handlers::applicants::update_applicant)
                .delete(handlers::applicants::delete_applicant),
        )
}

fn application_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::applications::list_applications))
        .route("/stats", get(handlers::applications::application_stats))
        .route(
            "/{id}",
            get(handlers::applications::get_application).delete(handlers::applications::delete_application),
        )
        .route("/{id}/status", put(handlers::applications::update_application_status))
}
