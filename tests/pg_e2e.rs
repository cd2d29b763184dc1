#![cfg(feature = "pg-tests")]
//! Testes ponta a ponta contra um Postgres real.
//!
//! Rode com `DATABASE_URL=postgres://... cargo test --features pg-tests --test pg_e2e`.
//! Cada teste cria filiais e contas com nomes únicos, então podem rodar em paralelo
//! sobre o mesmo banco.

mod common;

use std::time::{Duration, Instant};

use axum::{Router, http::StatusCode};
use serde_json::{Value, json};
use sqlx::{PgPool, postgres::PgPoolOptions};
use uuid::Uuid;

use common::{app_with_pool, request, send};
use stall_backend::services::auth::hash_password;

struct Harness {
    app: Router,
    pool: PgPool,
    admin_token: String,
}

async fn harness() -> Harness {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for pg-tests");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&url)
        .await
        .expect("connect");
    sqlx::migrate!().run(&pool).await.expect("migrations");

    let username = format!("admin-{}", Uuid::new_v4().simple());
    let password_hash = hash_password("admin-pass").await.expect("hash");
    sqlx::query("INSERT INTO admins (username, password_hash) VALUES ($1, $2)")
        .bind(&username)
        .bind(&password_hash)
        .execute(&pool)
        .await
        .expect("seed admin");

    let app = app_with_pool(pool.clone());
    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/auth/admin/login",
            None,
            Some(json!({ "username": username, "password": "admin-pass" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let admin_token = body["data"]["token"].as_str().expect("token").to_owned();

    Harness { app, pool, admin_token }
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

fn id_of(body: &Value) -> String {
    body["data"]["id"].as_str().expect("id").to_owned()
}

impl Harness {
    async fn call(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        send(&self.app, request(method, uri, token, body)).await
    }

    async fn create_branch(&self) -> String {
        let (status, body) = self
            .call(
                "POST",
                "/api/branches",
                Some(&self.admin_token),
                Some(json!({ "name": unique("branch"), "area": unique("area"), "location": "Centro" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        id_of(&body)
    }

    /// Atribui um gerente à filial e devolve o token dele.
    async fn manager_for(&self, branch_id: &str) -> String {
        let username = unique("mgr");
        let (status, body) = self
            .call(
                "PUT",
                &format!("/api/branches/{branch_id}/assign-manager"),
                Some(&self.admin_token),
                Some(json!({
                    "username": username,
                    "password": "manager-pass",
                    "firstName": "Maria",
                    "lastName": "Santos"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");

        let (status, body) = self
            .call(
                "POST",
                "/api/auth/branch_manager/login",
                None,
                Some(json!({ "username": username, "password": "manager-pass" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["user"]["branchId"], branch_id);
        body["data"]["token"].as_str().expect("token").to_owned()
    }

    /// Andar 1, seção "A" e uma banca com o número informado.
    async fn stall_for(&self, manager_token: &str, stall_no: &str) -> String {
        let (status, floor) = self
            .call(
                "POST",
                "/api/floors",
                Some(manager_token),
                Some(json!({ "floorNumber": 1, "floorName": "Ground" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{floor}");

        let (status, section) = self
            .call(
                "POST",
                "/api/sections",
                Some(manager_token),
                Some(json!({ "floorId": id_of(&floor), "sectionName": "Dry goods", "sectionCode": "A" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{section}");

        self.add_stall(manager_token, &id_of(&section), stall_no).await
    }

    async fn add_stall(&self, manager_token: &str, section_id: &str, stall_no: &str) -> String {
        let (status, body) = self
            .call(
                "POST",
                "/api/stalls",
                Some(manager_token),
                Some(stall_payload(section_id, stall_no)),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(body["message"], "Stall added successfully");
        id_of(&body)
    }

    async fn stall_is_available(&self, stall_id: &str) -> bool {
        sqlx::query_scalar("SELECT is_available FROM stalls WHERE id = $1::uuid")
            .bind(stall_id)
            .fetch_one(&self.pool)
            .await
            .expect("stall row")
    }

    async fn submit_application(&self, stall_id: &str) -> String {
        let (status, applicant) = self
            .call(
                "POST",
                "/api/applicants",
                None,
                Some(json!({ "fullName": "Juan Dela Cruz", "contactNumber": "09171234567" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{applicant}");

        let (status, application) = self
            .call(
                "POST",
                "/api/applications",
                None,
                Some(json!({ "stallId": stall_id, "applicantId": id_of(&applicant) })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{application}");
        assert_eq!(application["data"]["status"], "Pending");
        id_of(&application)
    }
}

fn stall_payload(section_id: &str, stall_no: &str) -> Value {
    json!({
        "sectionId": section_id,
        "stallNo": stall_no,
        "stallLocation": "Near the entrance",
        "size": "3x3",
        "rentalPrice": 1500.0
    })
}

#[tokio::test]
async fn manager_sees_only_their_own_stalls() {
    let h = harness().await;
    let branch_one = h.create_branch().await;
    let branch_two = h.create_branch().await;
    let m1 = h.manager_for(&branch_one).await;
    let m2 = h.manager_for(&branch_two).await;

    let stall_id = h.stall_for(&m1, "S-01").await;

    let (status, body) = h.call("GET", "/api/stalls", Some(&m1), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["stallNo"], "S-01");

    let (status, body) = h.call("GET", "/api/stalls", Some(&m2), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);

    // Fora do escopo é indistinguível de inexistente
    let uri = format!("/api/stalls/{stall_id}");
    let (status, body) = h.call("GET", &uri, Some(&m2), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Stall not found");
    let (status, _) = h.call("DELETE", &uri, Some(&m2), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // O admin vê tudo
    let (status, _) = h.call("GET", &uri, Some(&h.admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn stall_numbers_are_unique_per_branch() {
    let h = harness().await;
    let branch_one = h.create_branch().await;
    let branch_two = h.create_branch().await;
    let m1 = h.manager_for(&branch_one).await;
    let m2 = h.manager_for(&branch_two).await;

    let stall_id = h.stall_for(&m1, "S-01").await;
    let (_, stall) = h.call("GET", &format!("/api/stalls/{stall_id}"), Some(&m1), None).await;
    let section_id = stall["data"]["sectionId"].as_str().unwrap().to_owned();

    let (status, body) = h
        .call("POST", "/api/stalls", Some(&m1), Some(stall_payload(&section_id, "S-01")))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Stall number already exists in this branch");

    // Mesmo número em outra filial é permitido
    h.stall_for(&m2, "S-01").await;

    // Seção de outra filial não pode ser usada
    let (status, _) = h
        .call("POST", "/api/stalls", Some(&m2), Some(stall_payload(&section_id, "S-99")))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn a_branch_has_at_most_one_active_manager() {
    let h = harness().await;
    let branch_id = h.create_branch().await;
    h.manager_for(&branch_id).await;

    let (status, body) = h
        .call(
            "PUT",
            &format!("/api/branches/{branch_id}/assign-manager"),
            Some(&h.admin_token),
            Some(json!({
                "username": unique("mgr"),
                "password": "manager-pass",
                "firstName": "Pedro",
                "lastName": "Reyes"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Branch already has an active manager");

    // Depois de desativar o atual, a atribuição volta a ser possível
    let (status, _) = h
        .call("DELETE", &format!("/api/branches/{branch_id}/manager"), Some(&h.admin_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    h.manager_for(&branch_id).await;
}

#[tokio::test]
async fn approval_toggles_stall_availability() {
    let h = harness().await;
    let branch_id = h.create_branch().await;
    let manager = h.manager_for(&branch_id).await;
    let stall_id = h.stall_for(&manager, "S-01").await;
    let application_id = h.submit_application(&stall_id).await;
    let status_uri = format!("/api/applications/{application_id}/status");

    // Alvo inválido: nada muda
    let (status, _) = h
        .call("PUT", &status_uri, Some(&manager), Some(json!({ "status": "Archived" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(h.stall_is_available(&stall_id).await);

    let (status, body) = h
        .call("PUT", &status_uri, Some(&manager), Some(json!({ "status": "Approved" })))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["stallIsAvailable"], false);
    assert!(!h.stall_is_available(&stall_id).await);

    // Banca ocupada não recebe novas candidaturas
    let (status, applicant) = h
        .call(
            "POST",
            "/api/applicants",
            None,
            Some(json!({ "fullName": "Ana Cruz", "contactNumber": "09170000000" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = h
        .call(
            "POST",
            "/api/applications",
            None,
            Some(json!({ "stallId": stall_id, "applicantId": id_of(&applicant) })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = h
        .call("PUT", &status_uri, Some(&manager), Some(json!({ "status": "Cancelled" })))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["stallIsAvailable"], true);
    assert!(h.stall_is_available(&stall_id).await);
}

#[tokio::test]
async fn branch_with_stalls_cannot_be_deleted() {
    let h = harness().await;
    let branch_id = h.create_branch().await;
    let manager = h.manager_for(&branch_id).await;
    let stall_id = h.stall_for(&manager, "S-01").await;

    let (status, body) = h
        .call("DELETE", &format!("/api/branches/{branch_id}"), Some(&h.admin_token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Cannot delete branch with existing stalls. Please remove all stalls first."
    );

    let (status, _) = h
        .call("GET", &format!("/api/stalls/{stall_id}"), Some(&h.admin_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    // Uma filial vazia pode ser removida
    let empty = h.create_branch().await;
    let (status, _) = h
        .call("DELETE", &format!("/api/branches/{empty}"), Some(&h.admin_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn applicants_are_scoped_through_their_applications() {
    let h = harness().await;
    let branch_one = h.create_branch().await;
    let branch_two = h.create_branch().await;
    let m1 = h.manager_for(&branch_one).await;
    let m2 = h.manager_for(&branch_two).await;
    let stall_id = h.stall_for(&m1, "S-01").await;
    let application_id = h.submit_application(&stall_id).await;

    let (status, application) = h
        .call("GET", &format!("/api/applications/{application_id}"), Some(&m1), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let applicant_id = application["data"]["applicantId"].as_str().unwrap().to_owned();

    let applicant_uri = format!("/api/applicants/{applicant_id}");
    let (status, _) = h.call("GET", &applicant_uri, Some(&m1), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = h.call("GET", &applicant_uri, Some(&m2), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = h
        .call("GET", &format!("/api/applications/{application_id}"), Some(&m2), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn landing_catalog_shows_only_active_open_stalls() {
    let h = harness().await;
    let branch_id = h.create_branch().await;
    let manager = h.manager_for(&branch_id).await;
    let stall_id = h.stall_for(&manager, "S-01").await;
    let (_, stall) = h.call("GET", &format!("/api/stalls/{stall_id}"), Some(&manager), None).await;
    let by_area = format!("/api/landing/stalls/by-area?area={}", stall["data"]["area"].as_str().unwrap());

    let listed = |body: &Value| body["data"].as_array().unwrap().iter().any(|s| s["id"] == stall_id.as_str());

    let (status, body) = h.call("GET", "/api/landing/stalls", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(listed(&body));
    let (_, body) = h.call("GET", &by_area, None, None).await;
    assert_eq!(body["count"], 1);

    // Banca alugada sai das listagens públicas
    let application_id = h.submit_application(&stall_id).await;
    let (status, _) = h
        .call(
            "PUT",
            &format!("/api/applications/{application_id}/status"),
            Some(&manager),
            Some(json!({ "status": "Approved" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = h.call("GET", "/api/landing/stalls", None, None).await;
    assert!(!listed(&body));
    let (_, body) = h.call("GET", &by_area, None, None).await;
    assert_eq!(body["count"], 0);
    let (status, _) = h.call("GET", &format!("/api/landing/stalls/{stall_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);

    // Banca inativa não aparece nem pelo id
    let (status, _) = h
        .call(
            "PUT",
            &format!("/api/stalls/{stall_id}"),
            Some(&manager),
            Some(json!({ "status": "Inactive" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = h.call("GET", &format!("/api/landing/stalls/{stall_id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn changing_a_stall_number_rechecks_branch_uniqueness() {
    let h = harness().await;
    let branch_id = h.create_branch().await;
    let manager = h.manager_for(&branch_id).await;
    let first = h.stall_for(&manager, "S-01").await;
    let (_, stall) = h.call("GET", &format!("/api/stalls/{first}"), Some(&manager), None).await;
    let second = h
        .add_stall(&manager, stall["data"]["sectionId"].as_str().unwrap(), "S-02")
        .await;

    let uri = format!("/api/stalls/{second}");
    let (status, body) = h
        .call("PUT", &uri, Some(&manager), Some(json!({ "stallNo": "S-01" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Stall number already exists in this branch");

    let (_, body) = h.call("GET", &uri, Some(&manager), None).await;
    assert_eq!(body["data"]["stallNo"], "S-02");

    // Manter o próprio número não é conflito
    let (status, _) = h
        .call("PUT", &uri, Some(&manager), Some(json!({ "stallNo": "S-02", "size": "4x4" })))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn floors_and_sections_of_another_branch_are_not_found() {
    let h = harness().await;
    let branch_one = h.create_branch().await;
    let branch_two = h.create_branch().await;
    let m1 = h.manager_for(&branch_one).await;
    let m2 = h.manager_for(&branch_two).await;
    let stall_id = h.stall_for(&m1, "S-01").await;
    let (_, stall) = h.call("GET", &format!("/api/stalls/{stall_id}"), Some(&m1), None).await;
    let floor_uri = format!("/api/floors/{}", stall["data"]["floorId"].as_str().unwrap());
    let section_uri = format!("/api/sections/{}", stall["data"]["sectionId"].as_str().unwrap());

    let (status, body) = h
        .call("PUT", &floor_uri, Some(&m2), Some(json!({ "floorName": "Taken over" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Floor not found");
    let (status, _) = h.call("DELETE", &floor_uri, Some(&m2), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = h
        .call("PUT", &section_uri, Some(&m2), Some(json!({ "sectionName": "Taken over" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Section not found");
    let (status, _) = h.call("DELETE", &section_uri, Some(&m2), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Nada mudou para o dono
    let (_, floor) = h.call("GET", &floor_uri, Some(&m1), None).await;
    assert_eq!(floor["data"]["floorName"], "Ground");
    let (_, section) = h.call("GET", &section_uri, Some(&m1), None).await;
    assert_eq!(section["data"]["sectionName"], "Dry goods");
}

async fn side_record_count(pool: &PgPool, table: &str, applicant_id: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table} WHERE applicant_id = $1::uuid"))
        .bind(applicant_id)
        .fetch_one(pool)
        .await
        .expect("count")
}

#[tokio::test]
async fn applicant_and_side_records_are_written_together() {
    let h = harness().await;

    let (status, body) = h
        .call(
            "POST",
            "/api/applicants",
            None,
            Some(json!({
                "fullName": "Rosa Mendoza",
                "contactNumber": "09171112222",
                "civilStatus": "Married",
                "businessInformation": { "natureOfBusiness": "Fish vending", "capitalization": 5000.0 },
                "spouse": { "fullName": "Carlos Mendoza" },
                "otherInformation": { "emailAddress": "rosa@example.com" }
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let applicant_id = id_of(&body);
    for table in ["business_information", "spouses", "other_information"] {
        assert_eq!(side_record_count(&h.pool, table, &applicant_id).await, 1, "{table}");
    }

    // Falha num registro lateral desfaz o candidato
    let full_name = unique("applicant");
    let (status, _) = h
        .call(
            "POST",
            "/api/applicants",
            None,
            Some(json!({
                "fullName": full_name,
                "contactNumber": "09173334444",
                "businessInformation": { "natureOfBusiness": "Rice retail", "capitalization": 1000000000000000.0 }
            })),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM applicants WHERE full_name = $1")
        .bind(&full_name)
        .fetch_one(&h.pool)
        .await
        .expect("count");
    assert_eq!(stored, 0);
}

async fn fastest_rejected_login(h: &Harness, username: &str) -> Duration {
    let mut fastest = Duration::MAX;
    for _ in 0..3 {
        let started = Instant::now();
        let (status, body) = h
            .call(
                "POST",
                "/api/auth/admin/login",
                None,
                Some(json!({ "username": username, "password": "not-the-password" })),
            )
            .await;
        fastest = fastest.min(started.elapsed());
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid username or password");
    }
    fastest
}

#[tokio::test]
async fn unknown_username_costs_as_much_as_a_wrong_password() {
    let h = harness().await;
    let username = unique("admin");
    let password_hash = hash_password("the-password").await.expect("hash");
    sqlx::query("INSERT INTO admins (username, password_hash) VALUES ($1, $2)")
        .bind(&username)
        .bind(&password_hash)
        .execute(&h.pool)
        .await
        .expect("seed admin");

    let known = fastest_rejected_login(&h, &username).await;
    let unknown = fastest_rejected_login(&h, &unique("ghost")).await;

    // Os dois caminhos pagam um bcrypt completo
    assert!(unknown * 3 >= known, "unknown {unknown:?} vs known {known:?}");
}
