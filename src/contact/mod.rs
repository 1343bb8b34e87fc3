pub mod email;
pub mod error;
pub mod handlers;
pub mod model;
pub mod service;
pub mod validation;


pub use error::ContactError;
pub use model::{ContactSubmission, RawSubmission, Reference, RequestMeta};
pub use service::ContactService;
