//! Payment domain types and request validation.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{Error, database_id::PaymentId, validation::FieldErrors};

/// The fee categories a payment can cover.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentType {
    /// The recurring monthly training fee.
    Monthly,
    /// A belt exam fee.
    Exam,
    /// The one-off registration fee for new members.
    Registration,
    /// A fee for a tournament or seminar.
    Event,
}

impl PaymentType {
    /// Parse a payment type from its wire or storage form, ignoring case.
    pub fn parse(text: &str) -> Option<Self> {
        if text.eq_ignore_ascii_case("monthly") {
            Some(Self::Monthly)
        } else if text.eq_ignore_ascii_case("exam") {
            Some(Self::Exam)
        } else if text.eq_ignore_ascii_case("registration") {
            Some(Self::Registration)
        } else if text.eq_ignore_ascii_case("event") {
            Some(Self::Event)
        } else {
            None
        }
    }

    /// The canonical storage and wire form of the payment type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "MONTHLY",
            Self::Exam => "EXAM",
            Self::Registration => "REGISTRATION",
            Self::Event => "EVENT",
        }
    }
}

/// The review state of a payment.
///
/// New payments start out PENDING. Admins may move a payment between states
/// freely, e.g. confirming a payment that was rejected by mistake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Recorded but not yet reviewed by an admin.
    Pending,
    /// An admin verified the payment against the payment provider.
    Confirmed,
    /// An admin rejected the payment.
    Rejected,
}

impl PaymentStatus {
    /// Parse a payment status from its storage form, ignoring case.
    pub fn parse(text: &str) -> Option<Self> {
        if text.eq_ignore_ascii_case("pending") {
            Some(Self::Pending)
        } else if text.eq_ignore_ascii_case("confirmed") {
            Some(Self::Confirmed)
        } else if text.eq_ignore_ascii_case("rejected") {
            Some(Self::Rejected)
        } else {
            None
        }
    }

    /// The canonical storage and wire form of the payment status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fee amount in taka, held as a string with exactly two decimal places.
///
/// Keeping the normalized string form means what was validated is exactly
/// what gets stored and listed, with no floating point drift in between.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Amount(String);

impl Amount {
    /// Validate and normalize a raw amount from a request body.
    ///
    /// The client may send a JSON number or a decimal string. Values that do
    /// not parse as a number, are not finite, or are not strictly positive
    /// are rejected. More than two decimal places are rounded to the nearest
    /// cent.
    pub fn parse(raw: &serde_json::Value) -> Option<Self> {
        let number = match raw {
            serde_json::Value::Number(number) => number.as_f64(),
            serde_json::Value::String(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        };

        match number {
            Some(number) if number.is_finite() && number > 0.0 => {
                Some(Self(format!("{number:.2}")))
            }
            _ => None,
        }
    }

    /// Wrap an already normalized amount string read from the database.
    pub fn new_unchecked(raw: &str) -> Self {
        Self(raw.to_string())
    }

    /// The normalized two-decimal string form, e.g. "1500.00".
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A validated payment ready to insert into the ledger.
#[derive(Debug)]
pub struct NewPayment {
    /// The fee category the payment covers.
    pub payment_type: PaymentType,
    /// The amount paid, normalized to two decimal places.
    pub amount: Amount,
    /// The payment provider's transaction reference, unique ledger-wide.
    pub transaction_id: String,
}

/// The body of a create-payment request.
///
/// Every field defaults to empty so that missing fields show up in the
/// validation error map instead of failing JSON extraction.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaymentForm {
    /// The fee category, e.g. "monthly".
    #[serde(rename = "type")]
    pub payment_type: String,
    /// The amount paid, as a JSON number or a decimal string.
    pub amount: serde_json::Value,
    /// The payment provider's transaction reference.
    pub transaction_id: String,
}

impl PaymentForm {
    /// Validate the form, collecting an error for every failing field.
    pub fn validate(self) -> Result<NewPayment, Error> {
        let mut errors = FieldErrors::new();

        let payment_type = PaymentType::parse(self.payment_type.trim());
        if payment_type.is_none() {
            errors.insert(
                "type",
                "Type must be one of monthly, exam, registration, or event",
            );
        }

        let amount = Amount::parse(&self.amount);
        if amount.is_none() {
            errors.insert("amount", "Amount must be a number greater than zero");
        }

        let transaction_id = self.transaction_id.trim().to_string();
        if transaction_id.is_empty() {
            errors.insert("transactionId", "Transaction ID must not be empty");
        }

        match (payment_type, amount, errors.into_result()) {
            (Some(payment_type), Some(amount), Ok(())) => Ok(NewPayment {
                payment_type,
                amount,
                transaction_id,
            }),
            (_, _, Err(error)) => Err(error),
            // Unreachable: a failed parse always records a field error.
            _ => Err(Error::Validation(FieldErrors::new())),
        }
    }
}

/// The display identity of a payment's owner, resolved at read time.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSummary {
    /// The owner's display name.
    pub name: String,
    /// The owner's email address.
    pub email: String,
    /// The URL of the owner's profile image, or a Gravatar fallback.
    pub profile_image: String,
}

impl OwnerSummary {
    /// The identity shown for payments whose owner no longer exists.
    pub fn placeholder() -> Self {
        Self {
            name: "Deleted member".to_string(),
            email: String::new(),
            profile_image: String::new(),
        }
    }
}

/// A payment as listed for admins: the ledger record plus its owner's
/// display identity.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentWithOwner {
    /// The payment's ID in the database.
    pub id: PaymentId,
    /// When the payment was recorded, as stored in the database.
    pub created_at: String,
    /// The fee category the payment covers.
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    /// The amount paid, normalized to two decimal places.
    pub amount: Amount,
    /// The payment provider's transaction reference.
    pub transaction_id: String,
    /// The review state of the payment.
    pub status: PaymentStatus,
    /// The display identity of the member who recorded the payment.
    pub owner: OwnerSummary,
}
