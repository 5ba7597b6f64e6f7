use super::{PgQueryAs, Record};
use crate::models::{WaitingListEntry, WaitingListInput};
use crate::validation::ValidationError;

impl Record for WaitingListEntry {
    type Input = WaitingListInput;

    const RESOURCE: &'static str = "waiting list entry";
    const TABLE: &'static str = "waiting_list";
    const COLUMNS: &'static [&'static str] = &[
        "patient_id",
        "service_id",
        "preferred_employee_id",
        "requested_date",
        "urgency_level",
        "notes",
        "status",
    ];
    const READ_COLUMNS: &'static str = "id, patient_id, service_id, preferred_employee_id, \
        requested_date, urgency_level, notes, status, created_at";
    const ORDER_BY: &'static str = "created_at DESC, id DESC";

    // Enum-typed fields are checked by deserialization; nothing else to enforce.
    fn validate(_input: &WaitingListInput) -> Result<(), ValidationError> {
        Ok(())
    }

    fn bind<'q, O>(input: &'q WaitingListInput, query: PgQueryAs<'q, O>) -> PgQueryAs<'q, O> {
        query
            .bind(input.patient_id)
            .bind(input.service_id)
            .bind(input.preferred_employee_id)
            .bind(input.requested_date)
            .bind(input.urgency_level)
            .bind(&input.notes)
            .bind(input.status)
    }
}
