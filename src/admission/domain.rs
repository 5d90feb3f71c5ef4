//! Admission application domain types and request validation.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{Error, database_id::AdmissionId, validation::FieldErrors};

/// The format for dates of birth, e.g. "2008-05-17".
const DATE_OF_BIRTH_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// The review state of an admission application.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdmissionStatus {
    /// Submitted but not yet reviewed.
    Pending,
    /// An admin accepted the applicant.
    Approved,
    /// An admin turned the applicant down.
    Rejected,
}

impl AdmissionStatus {
    /// Parse an admission status from its storage form, ignoring case.
    pub fn parse(text: &str) -> Option<Self> {
        if text.eq_ignore_ascii_case("pending") {
            Some(Self::Pending)
        } else if text.eq_ignore_ascii_case("approved") {
            Some(Self::Approved)
        } else if text.eq_ignore_ascii_case("rejected") {
            Some(Self::Rejected)
        } else {
            None
        }
    }

    /// The canonical storage and wire form of the admission status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl Display for AdmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated admission application ready to insert.
#[derive(Debug)]
pub struct NewAdmission {
    /// The applicant's full name.
    pub name: String,
    /// The applicant's father's name.
    pub father_name: String,
    /// The applicant's mother's name.
    pub mother_name: String,
    /// The applicant's email address.
    pub email: String,
    /// The applicant's phone number.
    pub phone: String,
    /// The applicant's gender, recorded as given.
    pub gender: String,
    /// The applicant's date of birth.
    pub date_of_birth: Date,
}

/// The body of a create-admission request.
///
/// Every field defaults to empty so that missing fields show up in the
/// validation error map instead of failing JSON extraction.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdmissionForm {
    /// The applicant's full name.
    pub name: String,
    /// The applicant's father's name.
    pub father_name: String,
    /// The applicant's mother's name.
    pub mother_name: String,
    /// The applicant's email address.
    pub email: String,
    /// The applicant's phone number.
    pub phone: String,
    /// The applicant's gender.
    pub gender: String,
    /// The applicant's date of birth, e.g. "2008-05-17".
    pub date_of_birth: String,
}

impl AdmissionForm {
    /// Validate the form, collecting an error for every failing field.
    pub fn validate(self) -> Result<NewAdmission, Error> {
        let mut errors = FieldErrors::new();

        let name = require_non_empty("name", self.name, &mut errors);
        let father_name = require_non_empty("fatherName", self.father_name, &mut errors);
        let mother_name = require_non_empty("motherName", self.mother_name, &mut errors);
        let email = require_non_empty("email", self.email, &mut errors);
        let phone = require_non_empty("phone", self.phone, &mut errors);
        let gender = require_non_empty("gender", self.gender, &mut errors);

        let date_of_birth = Date::parse(self.date_of_birth.trim(), DATE_OF_BIRTH_FORMAT);
        if date_of_birth.is_err() {
            errors.insert(
                "dateOfBirth",
                "Date of birth must be a valid date such as 2008-05-17",
            );
        }

        match (date_of_birth, errors.into_result()) {
            (Ok(date_of_birth), Ok(())) => Ok(NewAdmission {
                name,
                father_name,
                mother_name,
                email,
                phone,
                gender,
                date_of_birth,
            }),
            (_, Err(error)) => Err(error),
            // Unreachable: a failed date parse always records a field error.
            _ => Err(Error::Validation(FieldErrors::new())),
        }
    }
}

/// An admission application as stored and listed for admins.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionRecord {
    /// The application's ID in the database.
    pub id: AdmissionId,
    /// When the application was submitted, as stored in the database.
    pub created_at: String,
    /// The applicant's full name.
    pub name: String,
    /// The applicant's father's name.
    pub father_name: String,
    /// The applicant's mother's name.
    pub mother_name: String,
    /// The applicant's email address.
    pub email: String,
    /// The applicant's phone number.
    pub phone: String,
    /// The applicant's gender.
    pub gender: String,
    /// The applicant's date of birth, e.g. "2008-05-17".
    pub date_of_birth: String,
    /// The review state of the application.
    pub status: AdmissionStatus,
    /// The bKash transaction reference for the admission fee, once the
    /// applicant has reported their payment.
    pub bkash_transaction_id: Option<String>,
}

fn require_non_empty(field: &'static str, value: String, errors: &mut FieldErrors) -> String {
    let value = value.trim().to_string();
    if value.is_empty() {
        errors.insert(field, "This field is required and must not be blank");
    }

    value
}
