use super::{PgQueryAs, Record};
use crate::models::{Employee, EmployeeInput};
use crate::validation::{self, ValidationError};

impl Record for Employee {
    type Input = EmployeeInput;

    const RESOURCE: &'static str = "employee";
    const TABLE: &'static str = "employees";
    const COLUMNS: &'static [&'static str] = &[
        "clinic_id",
        "first_name",
        "last_name",
        "email",
        "phone",
        "license_number",
        "specialty",
        "timezone",
        "active",
    ];
    const READ_COLUMNS: &'static str = "id, clinic_id, first_name, last_name, email, phone, \
        license_number, specialty, timezone, active, created_at";
    const ORDER_BY: &'static str = "id ASC";

    fn validate(input: &EmployeeInput) -> Result<(), ValidationError> {
        validation::employee(input)
    }

    fn bind<'q, O>(input: &'q EmployeeInput, query: PgQueryAs<'q, O>) -> PgQueryAs<'q, O> {
        query
            .bind(input.clinic_id)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.license_number)
            .bind(&input.specialty)
            .bind(&input.timezone)
            .bind(input.active)
    }
}
