mod create_endpoint;
mod db;
mod domain;
mod link_endpoint;
mod list_endpoint;
mod status_endpoint;

pub use create_endpoint::create_admission_endpoint;
pub use db::{attach_payment_reference, create_admission, create_admission_table, get_admissions};
pub use domain::{AdmissionForm, AdmissionRecord, AdmissionStatus, NewAdmission};
pub use link_endpoint::{PaymentReferenceForm, admission_payment_endpoint};
pub use list_endpoint::list_admissions_endpoint;
pub use status_endpoint::{approve_admission_endpoint, reject_admission_endpoint};
