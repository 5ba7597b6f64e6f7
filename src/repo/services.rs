use super::{PgQueryAs, Record};
use crate::models::{Service, ServiceInput};
use crate::validation::{self, ValidationError};

impl Record for Service {
    type Input = ServiceInput;

    const RESOURCE: &'static str = "service";
    const TABLE: &'static str = "services";
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "description",
        "duration_minutes",
        "price",
        "specialty_required",
        "active",
    ];
    const READ_COLUMNS: &'static str =
        "id, name, description, duration_minutes, price, specialty_required, active";
    const ORDER_BY: &'static str = "id ASC";

    fn validate(input: &ServiceInput) -> Result<(), ValidationError> {
        validation::service(input)
    }

    fn bind<'q, O>(input: &'q ServiceInput, query: PgQueryAs<'q, O>) -> PgQueryAs<'q, O> {
        query
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.duration_minutes)
            .bind(input.price)
            .bind(&input.specialty_required)
            .bind(input.active)
    }
}
