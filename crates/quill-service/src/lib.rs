//! Account and content services for Quill.
//!
//! Both services are stateless and generic over the storage traits in
//! [`quill_core::store`]. Every operation returns a typed error implementing
//! [`Failure`], which maps onto the [`Envelope`] response contract seen by
//! clients.

pub mod account;
pub mod content;
pub mod envelope;

pub use account::{AccountService, SignInError, SignUpError};
pub use content::{ContentError, ContentService};
pub use envelope::{Envelope, Failure, Success};
