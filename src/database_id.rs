//! Database ID type definitions.

/// Alias for the integer type used for payment record IDs.
pub type PaymentId = i64;
/// Alias for the integer type used for admission record IDs.
pub type AdmissionId = i64;
