use super::{PgQueryAs, Record};
use crate::models::{Patient, PatientInput};
use crate::validation::{self, ValidationError};

impl Record for Patient {
    type Input = PatientInput;

    const RESOURCE: &'static str = "patient";
    const TABLE: &'static str = "patients";
    const COLUMNS: &'static [&'static str] = &[
        "first_name",
        "last_name",
        "email",
        "phone",
        "date_of_birth",
        "medical_record_number",
        "insurance_provider",
        "insurance_id",
        "emergency_contact_name",
        "emergency_contact_phone",
        "active",
    ];
    const READ_COLUMNS: &'static str = "id, first_name, last_name, email, phone, date_of_birth, \
        medical_record_number, insurance_provider, insurance_id, emergency_contact_name, \
        emergency_contact_phone, active, created_at";
    const ORDER_BY: &'static str = "id ASC";

    fn validate(input: &PatientInput) -> Result<(), ValidationError> {
        validation::patient(input)
    }

    fn bind<'q, O>(input: &'q PatientInput, query: PgQueryAs<'q, O>) -> PgQueryAs<'q, O> {
        query
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(input.date_of_birth)
            .bind(&input.medical_record_number)
            .bind(&input.insurance_provider)
            .bind(&input.insurance_id)
            .bind(&input.emergency_contact_name)
            .bind(&input.emergency_contact_phone)
            .bind(input.active)
    }
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use crate::error::DbError;
    use crate::models::Patient;
    use crate::repo::Repo;
    use crate::repo::fixtures::patient_input;

    #[sqlx::test(migrator = "crate::db::MIGRATOR")]
    #[ignore = "requires database"]
    async fn create_get_update_delete(pool: PgPool) {
        let repo = Repo::<Patient>::new(&pool);
        let input = patient_input("john");
        let created = repo.create(&input).await.unwrap();
        assert_eq!(created.first_name, "John");
        assert_eq!(created.date_of_birth, input.date_of_birth);
        assert_eq!(created.insurance_id.as_deref(), Some("INS123456"));

        let mut changed = input.clone();
        changed.phone = Some("+1111111111".into());
        changed.insurance_provider = None;
        let updated = repo.update(created.id, &changed).await.unwrap();
        assert_eq!(updated.phone.as_deref(), Some("+1111111111"));
        assert_eq!(updated.insurance_provider, None);
        assert_eq!(updated.created_at, created.created_at);

        repo.delete(created.id).await.unwrap();
        assert!(matches!(repo.get(created.id).await, Err(DbError::NotFound { .. })));
    }

    #[sqlx::test(migrator = "crate::db::MIGRATOR")]
    #[ignore = "requires database"]
    async fn medical_record_number_is_unique(pool: PgPool) {
        let repo = Repo::<Patient>::new(&pool);
        repo.create(&patient_input("a")).await.unwrap();
        let mut dup = patient_input("b");
        dup.medical_record_number = Some("MRN-a".into());
        assert!(matches!(
            repo.create(&dup).await,
            Err(DbError::ConstraintViolation(_))
        ));
    }
}
