mod create_endpoint;
mod db;
mod delete_endpoint;
mod domain;
mod list_endpoint;
mod status_endpoint;

pub use create_endpoint::create_payment_endpoint;
pub use db::{create_payment, create_payment_table, delete_payment, set_payment_status};
pub use delete_endpoint::delete_payment_endpoint;
pub use domain::{
    Amount, NewPayment, OwnerSummary, PaymentForm, PaymentStatus, PaymentType, PaymentWithOwner,
};
pub use list_endpoint::list_payments_endpoint;
pub use status_endpoint::{confirm_payment_endpoint, reject_payment_endpoint};
