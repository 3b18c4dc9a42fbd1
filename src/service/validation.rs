use std::str::FromStr;

use chrono::NaiveDate;

use crate::model::attendance::{AttendanceInput, AttendanceType, LOCATION_OTHER};
use crate::models::FieldError;
use crate::utils::time::{parse_date, parse_time};

const MIN_NAME_CHARS: usize = 2;
const REQUIRED: &str = "This field is required";

/// Form values that passed validation, trimmed and typed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidForm {
    pub employee_name: String,
    pub department: String,
    pub attendance_date: NaiveDate,
    pub attendance_time: String,
    pub attendance_type: AttendanceType,
    pub location: String,
    pub custom_location: String,
    pub notes: String,
}

fn trimmed(value: &Option<String>) -> &str {
    value.as_deref().map(str::trim).unwrap_or("")
}

/// Checks every field and reports all failures together.
pub fn validate(input: &AttendanceInput, today: NaiveDate) -> Result<ValidForm, Vec<FieldError>> {
    let mut errors = Vec::new();

    let employee_name = trimmed(&input.employee_name);
    if employee_name.is_empty() {
        errors.push(FieldError::new("employeeName", REQUIRED));
    } else if employee_name.chars().count() < MIN_NAME_CHARS {
        errors.push(FieldError::new(
            "employeeName",
            format!("Name must be at least {MIN_NAME_CHARS} characters"),
        ));
    }

    let department = trimmed(&input.department);
    if department.is_empty() {
        errors.push(FieldError::new("department", REQUIRED));
    }

    let raw_date = trimmed(&input.attendance_date);
    let attendance_date = if raw_date.is_empty() {
        errors.push(FieldError::new("attendanceDate", REQUIRED));
        None
    } else {
        match parse_date(raw_date) {
            Some(date) if date > today => {
                errors.push(FieldError::new("attendanceDate", "Date cannot be in the future"));
                None
            }
            Some(date) => Some(date),
            None => {
                errors.push(FieldError::new("attendanceDate", "Date must be YYYY-MM-DD"));
                None
            }
        }
    };

    let raw_time = trimmed(&input.attendance_time);
    let attendance_time = if raw_time.is_empty() {
        errors.push(FieldError::new("attendanceTime", REQUIRED));
        None
    } else {
        match parse_time(raw_time) {
            Some(time) => Some(time.format("%H:%M").to_string()),
            None => {
                errors.push(FieldError::new("attendanceTime", "Time must be HH:MM"));
                None
            }
        }
    };

    let raw_type = trimmed(&input.attendance_type);
    let attendance_type = if raw_type.is_empty() {
        errors.push(FieldError::new("attendanceType", "Please choose check-in or check-out"));
        None
    } else {
        match AttendanceType::from_str(raw_type) {
            Ok(t) => Some(t),
            Err(_) => {
                errors.push(FieldError::new(
                    "attendanceType",
                    "Attendance type must be checkin or checkout",
                ));
                None
            }
        }
    };

    let location = trimmed(&input.location);
    if location.is_empty() {
        errors.push(FieldError::new("location", REQUIRED));
    }

    let custom_location = trimmed(&input.custom_location);
    if location == LOCATION_OTHER && custom_location.is_empty() {
        errors.push(FieldError::new("customLocation", "Please describe the other location"));
    }

    match (attendance_date, attendance_time, attendance_type) {
        (Some(attendance_date), Some(attendance_time), Some(attendance_type)) if errors.is_empty() => {
            Ok(ValidForm {
                employee_name: employee_name.to_string(),
                department: department.to_string(),
                attendance_date,
                attendance_time,
                attendance_type,
                location: location.to_string(),
                // only meaningful for "other"
                custom_location: if location == LOCATION_OTHER {
                    custom_location.to_string()
                } else {
                    String::new()
                },
                notes: trimmed(&input.notes).to_string(),
            })
        }
        _ => Err(errors),
    }
}
