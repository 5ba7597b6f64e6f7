//! Shape checks run before any statement reaches the store.

use chrono::Utc;
use rust_decimal::Decimal;

use crate::models::{
    AppointmentInput, ClinicInput, EmployeeInput, PatientInput, ServiceInput,
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    #[error("{field} must not be negative")]
    Negative { field: &'static str },

    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("end_datetime must be after start_datetime")]
    EmptyInterval,
}

fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(())
}

/// Money columns are NUMERIC(12,2): at most ten integer digits and two decimals.
const MONEY_SCALE: u32 = 2;
const MONEY_LIMIT: Decimal = Decimal::from_parts(1_410_065_408, 2, 0, false, 0); // 10^10

fn money(field: &'static str, value: Option<Decimal>) -> Result<(), ValidationError> {
    let Some(v) = value else {
        return Ok(());
    };
    if v < Decimal::ZERO {
        return Err(ValidationError::Negative { field });
    }
    if v >= MONEY_LIMIT {
        return Err(ValidationError::Invalid {
            field,
            reason: format!("must be less than {MONEY_LIMIT}"),
        });
    }
    if v.normalize().scale() > MONEY_SCALE {
        return Err(ValidationError::Invalid {
            field,
            reason: "at most 2 decimal places".into(),
        });
    }
    Ok(())
}

pub fn clinic(input: &ClinicInput) -> Result<(), ValidationError> {
    require_text("name", &input.name)
}

pub fn patient(input: &PatientInput) -> Result<(), ValidationError> {
    require_text("first_name", &input.first_name)?;
    require_text("last_name", &input.last_name)?;
    if let Some(dob) = input.date_of_birth {
        if dob > Utc::now().date_naive() {
            return Err(ValidationError::Invalid {
                field: "date_of_birth",
                reason: "must not be in the future".into(),
            });
        }
    }
    Ok(())
}

pub fn employee(input: &EmployeeInput) -> Result<(), ValidationError> {
    require_text("first_name", &input.first_name)?;
    require_text("last_name", &input.last_name)?;
    input
        .timezone
        .parse::<chrono_tz::Tz>()
        .map_err(|_| ValidationError::Invalid {
            field: "timezone",
            reason: format!("unknown timezone '{}'", input.timezone),
        })?;
    Ok(())
}

pub fn service(input: &ServiceInput) -> Result<(), ValidationError> {
    require_text("name", &input.name)?;
    if input.duration_minutes <= 0 {
        return Err(ValidationError::NotPositive { field: "duration_minutes" });
    }
    money("price", input.price)
}

pub fn appointment(input: &AppointmentInput) -> Result<(), ValidationError> {
    if input.end_datetime <= input.start_datetime {
        return Err(ValidationError::EmptyInterval);
    }
    money("payment_amount", input.payment_amount)
}
