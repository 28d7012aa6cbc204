pub mod client_ip;
pub mod pipeline;
pub mod record;
pub mod validate;

pub use record::{DocumentId, NewRecord, NewRegistration, Receipt, RegistrationRecord};
pub use validate::ValidationError;
