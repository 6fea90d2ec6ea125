//! Trust-key promise protocol core.
//!
//! A requester first *creates* a promise: the core validates the request,
//! checks that the target server is connected and that the round timestamp is
//! aligned to the server's round duration, and issues a fresh random seed
//! bound to that server and round. Later the requester *resolves* the promise
//! by handing the create result back verbatim. Once the trust key committed for
//! that round has been marked trusted, the seed is XORed with an Argon2d
//! keystream derived from the trust key, producing output that neither the
//! seed generator nor the trust-key holder could have predicted alone.
//!
//! Preconditions enforced by collaborators, not by this crate:
//! - the requester never learns the committed secret before its seed is issued;
//! - a trust key is never altered after its round has started.
//!
//! Both operations are stateless: no promise is stored between create and
//! resolve, and concurrent calls share only the read-only collaborators.

pub mod config;
pub mod derivation;
pub mod error;
pub mod request;
pub mod response;
pub mod round;
pub mod seed;
pub mod service;
pub mod spans;
pub mod validator;

pub use config::{ConfigError, CostLimits, PromiseConfig};
pub use derivation::{DerivationPool, KeystreamJob};
pub use error::{ErrorCode, PromiseError};
pub use request::{CreatePromiseRequest, ResolvePromiseRequest, SeedInput};
pub use response::{CreatePromiseResult, PromiseResponse, PromiseResult};
pub use round::{check_alignment, RoundAlignment};
pub use seed::generate_seed;
pub use service::PromiseService;
pub use validator::{validate_create, validate_resolve, Violation};
