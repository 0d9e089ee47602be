pub mod bearer;
pub mod factory;
pub mod pkce;
pub mod resolver;
pub mod verifier;

pub use factory::{build_backend, build_identity_resolver};
pub use resolver::{Identity, IdentityResolver, IdentitySource};
pub use verifier::TokenVerifier;
