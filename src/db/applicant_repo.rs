// src/db/applicant_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    middleware::tenancy::TenantScope,
    models::applicant::{
        Applicant, ApplicantSummary, BusinessInformation, BusinessInformationInput, CreateApplicantPayload,
        OtherInformation, OtherInformationInput, Spouse, SpouseInput, UpdateApplicantPayload,
    },
};

const SUMMARY_SELECT: &str = r#"
    SELECT ap.id, ap.full_name, ap.contact_number, ap.address, ap.civil_status,
           bi.nature_of_business, bi.capitalization,
           sp.full_name AS spouse_full_name,
           oi.email_address,
           ap.created_at
    FROM applicants ap
    LEFT JOIN business_information bi ON bi.applicant_id = ap.id
    LEFT JOIN spouses sp ON sp.applicant_id = ap.id
    LEFT JOIN other_information oi ON oi.applicant_id = ap.id
    WHERE TRUE
"#;

/// O gerente só enxerga candidatos com alguma candidatura para bancas da sua filial.
fn push_applicant_scope(qb: &mut QueryBuilder<'_, Postgres>, scope: &TenantScope) {
    if scope.is_admin() {
        return;
    }
    qb.push(
        r#" AND EXISTS (
            SELECT 1 FROM applications a
            INNER JOIN stalls s ON s.id = a.stall_id
            INNER JOIN sections sc ON sc.id = s.section_id
            INNER JOIN floors f ON f.id = sc.floor_id
            INNER JOIN branches b ON b.id = f.branch_id
            WHERE a.applicant_id = ap.id"#,
    );
    scope.push_ownership(qb, "b");
    qb.push(")");
}

#[derive(Clone)]
pub struct ApplicantRepository {
    pool: PgPool,
}

impl ApplicantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, scope: &TenantScope) -> Result<Vec<ApplicantSummary>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(SUMMARY_SELECT);
        push_applicant_scope(&mut qb, scope);
        qb.push(" ORDER BY ap.created_at DESC");

        let applicants = qb.build_query_as::<ApplicantSummary>().fetch_all(&self.pool).await?;
        Ok(applicants)
    }

    pub async fn find_scoped<'e, E>(&self, executor: E, scope: &TenantScope, id: Uuid) -> Result<Option<Applicant>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ap.* FROM applicants ap WHERE ap.id = ");
        qb.push_bind(id);
        push_applicant_scope(&mut qb, scope);

        let applicant = qb.build_query_as::<Applicant>().fetch_optional(executor).await?;
        Ok(applicant)
    }

    pub async fn exists<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM applicants WHERE id = $1)")
            .bind(id)
            .fetch_one(executor)
            .await?;
        Ok(exists)
    }

    pub async fn insert<'e, E>(&self, executor: E, payload: &CreateApplicantPayload) -> Result<Applicant, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let applicant = sqlx::query_as::<_, Applicant>(
            r#"
            INSERT INTO applicants
                (full_name, contact_number, address, birthdate, civil_status, educational_attainment)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&payload.full_name)
        .bind(&payload.contact_number)
        .bind(&payload.address)
        .bind(payload.birthdate)
        .bind(&payload.civil_status)
        .bind(&payload.educational_attainment)
        .fetch_one(executor)
        .await?;
        Ok(applicant)
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, payload: &UpdateApplicantPayload) -> Result<Applicant, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE applicants SET updated_at = NOW()");
        if let Some(name) = &payload.full_name {
            qb.push(", full_name = ").push_bind(name.clone());
        }
        if let Some(contact) = &payload.contact_number {
            qb.push(", contact_number = ").push_bind(contact.clone());
        }
        if let Some(address) = &payload.address {
            qb.push(", address = ").push_bind(address.clone());
        }
        if let Some(birthdate) = payload.birthdate {
            qb.push(", birthdate = ").push_bind(birthdate);
        }
        if let Some(civil_status) = &payload.civil_status {
            qb.push(", civil_status = ").push_bind(civil_status.clone());
        }
        if let Some(attainment) = &payload.educational_attainment {
            qb.push(", educational_attainment = ").push_bind(attainment.clone());
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" RETURNING *");

        let applicant = qb.build_query_as::<Applicant>().fetch_one(executor).await?;
        Ok(applicant)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM applicants WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    // ---
    // Registros laterais (1:1, gravados com upsert)
    // ---

    pub async fn upsert_business<'e, E>(
        &self,
        executor: E,
        applicant_id: Uuid,
        input: &BusinessInformationInput,
    ) -> Result<BusinessInformation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, BusinessInformation>(
            r#"
            INSERT INTO business_information
                (applicant_id, nature_of_business, capitalization, source_of_capital,
                 previous_business_experience, relative_stall_owner)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'No'))
            ON CONFLICT (applicant_id) DO UPDATE SET
                nature_of_business = EXCLUDED.nature_of_business,
                capitalization = EXCLUDED.capitalization,
                source_of_capital = EXCLUDED.source_of_capital,
                previous_business_experience = EXCLUDED.previous_business_experience,
                relative_stall_owner = EXCLUDED.relative_stall_owner
            RETURNING *
            "#,
        )
        .bind(applicant_id)
        .bind(&input.nature_of_business)
        .bind(input.capitalization)
        .bind(&input.source_of_capital)
        .bind(&input.previous_business_experience)
        .bind(&input.relative_stall_owner)
        .fetch_one(executor)
        .await?;
        Ok(record)
    }

    pub async fn upsert_spouse<'e, E>(&self, executor: E, applicant_id: Uuid, input: &SpouseInput) -> Result<Spouse, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, Spouse>(
            r#"
            INSERT INTO spouses
                (applicant_id, full_name, birthdate, educational_attainment, contact_number, occupation)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (applicant_id) DO UPDATE SET
                full_name = EXCLUDED.full_name,
                birthdate = EXCLUDED.birthdate,
                educational_attainment = EXCLUDED.educational_attainment,
                contact_number = EXCLUDED.contact_number,
                occupation = EXCLUDED.occupation
            RETURNING *
            "#,
        )
        .bind(applicant_id)
        .bind(&input.full_name)
        .bind(input.birthdate)
        .bind(&input.educational_attainment)
        .bind(&input.contact_number)
        .bind(&input.occupation)
        .fetch_one(executor)
        .await?;
        Ok(record)
    }

    pub async fn delete_spouse<'e, E>(&self, executor: E, applicant_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM spouses WHERE applicant_id = $1")
            .bind(applicant_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn upsert_other<'e, E>(
        &self,
        executor: E,
        applicant_id: Uuid,
        input: &OtherInformationInput,
    ) -> Result<OtherInformation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, OtherInformation>(
            r#"
            INSERT INTO other_information
                (applicant_id, signature_ref, house_sketch_ref, valid_id_ref, email_address)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (applicant_id) DO UPDATE SET
                signature_ref = EXCLUDED.signature_ref,
                house_sketch_ref = EXCLUDED.house_sketch_ref,
                valid_id_ref = EXCLUDED.valid_id_ref,
                email_address = EXCLUDED.email_address
            RETURNING *
            "#,
        )
        .bind(applicant_id)
        .bind(&input.signature_ref)
        .bind(&input.house_sketch_ref)
        .bind(&input.valid_id_ref)
        .bind(&input.email_address)
        .fetch_one(executor)
        .await?;
        Ok(record)
    }

    pub async fn business<'e, E>(&self, executor: E, applicant_id: Uuid) -> Result<Option<BusinessInformation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, BusinessInformation>(
            "SELECT * FROM business_information WHERE applicant_id = $1",
        )
        .bind(applicant_id)
        .fetch_optional(executor)
        .await?;
        Ok(record)
    }

    pub async fn spouse<'e, E>(&self, executor: E, applicant_id: Uuid) -> Result<Option<Spouse>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, Spouse>("SELECT * FROM spouses WHERE applicant_id = $1")
            .bind(applicant_id)
            .fetch_optional(executor)
            .await?;
        Ok(record)
    }

    pub async fn other<'e, E>(&self, executor: E, applicant_id: Uuid) -> Result<Option<OtherInformation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, OtherInformation>(
            "SELECT * FROM other_information WHERE applicant_id = $1",
        )
        .bind(applicant_id)
        .fetch_optional(executor)
        .await?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_sees_every_applicant() {
        let mut qb = QueryBuilder::<Postgres>::new(SUMMARY_SELECT);
        push_applicant_scope(&mut qb, &TenantScope::Admin);
        assert!(!qb.sql().contains("applications a"));
    }

    #[test]
    fn manager_sees_applicants_through_their_stalls() {
        let mut qb = QueryBuilder::<Postgres>::new(SUMMARY_SELECT);
        push_applicant_scope(&mut qb, &TenantScope::Manager(Uuid::new_v4()));
        let sql = qb.sql();
        assert!(sql.contains("a.applicant_id = ap.id"));
        assert!(sql.contains("bm.branch_id = b.id"));
        assert!(sql.trim_end().ends_with(")"));
    }
}
