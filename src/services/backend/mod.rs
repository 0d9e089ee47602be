pub mod client;
pub mod gotrue;

pub use client::{
    AuthBackend, BackendError, BackendResult, Credentials, Session, SignUpOutcome, User,
};
pub use gotrue::GoTrueBackend;

#[cfg(test)]
pub(crate) mod fake;
