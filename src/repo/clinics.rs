use super::{PgQueryAs, Record};
use crate::models::{Clinic, ClinicInput};
use crate::validation::{self, ValidationError};

impl Record for Clinic {
    type Input = ClinicInput;

    const RESOURCE: &'static str = "clinic";
    const TABLE: &'static str = "clinics";
    const COLUMNS: &'static [&'static str] = &["name", "address", "phone", "email", "active"];
    const READ_COLUMNS: &'static str = "id, name, address, phone, email, active";
    const ORDER_BY: &'static str = "id ASC";

    fn validate(input: &ClinicInput) -> Result<(), ValidationError> {
        validation::clinic(input)
    }

    fn bind<'q, O>(input: &'q ClinicInput, query: PgQueryAs<'q, O>) -> PgQueryAs<'q, O> {
        query
            .bind(&input.name)
            .bind(&input.address)
            .bind(&input.phone)
            .bind(&input.email)
            .bind(input.active)
    }
}
