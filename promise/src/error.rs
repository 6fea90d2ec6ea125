//! Error taxonomy for the promise protocol.
//!
//! Every failure maps to a stable numeric [`ErrorCode`]. Codes are part of the
//! external contract and are never reused for a different meaning. Nothing is
//! retried internally; retry policy belongs to the caller.

use std::time::Duration;

use roundseed_store::StoreError;
use roundseed_types::{RoundTimestamp, ServerId, TrustKeyRecord};
use thiserror::Error;

use crate::validator::Violation;

/// Stable numeric error codes reported in responses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ErrorCode {
    ValidationFailed = 1,
    ServerUnavailable = 2,
    MisalignedRound = 3,
    StoreLookupFailed = 4,
    TrustKeyUntrusted = 5,
    TrustKeyNotFound = 6,
    UndecodableSeed = 7,
    DerivationFailed = 8,
    DerivationTimedOut = 9,
    SeedGenerationFailed = 10,
}

impl ErrorCode {
    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// Human-readable message reported alongside the code.
    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "Request validation failed",
            ErrorCode::ServerUnavailable => "Server is unknown or not connected",
            ErrorCode::MisalignedRound => "Trust key timestamp is not aligned to the server round time",
            ErrorCode::StoreLookupFailed => "Trust key lookup failed",
            ErrorCode::TrustKeyUntrusted => "Trust key is not trusted yet",
            ErrorCode::TrustKeyNotFound => "Trust key not found",
            ErrorCode::UndecodableSeed => "Seed is missing or cannot be decoded",
            ErrorCode::DerivationFailed => "Keystream derivation failed",
            ErrorCode::DerivationTimedOut => "Keystream derivation timed out",
            ErrorCode::SeedGenerationFailed => "Seed generation failed",
        }
    }
}

#[derive(Debug, Error)]
pub enum PromiseError {
    #[error("request validation failed: {}", format_violations(.0))]
    Validation(Vec<Violation>),

    #[error("server {0} is unknown or not connected")]
    ServerUnavailable(ServerId),

    #[error("round {round} is not a multiple of the {round_duration}s round duration")]
    MisalignedRound {
        round: RoundTimestamp,
        round_duration: u64,
    },

    #[error("trust key lookup failed: {0}")]
    StoreLookup(#[from] StoreError),

    #[error("trust key for round {} is not trusted", .0.round)]
    Untrusted(Box<TrustKeyRecord>),

    #[error("no trust key committed for round {0}")]
    TrustKeyNotFound(RoundTimestamp),

    #[error("seed is missing or not decodable: {0}")]
    UndecodableSeed(String),

    #[error("keystream derivation failed: {0}")]
    Derivation(String),

    #[error("keystream derivation timed out after {0:?}")]
    DerivationTimeout(Duration),

    #[error("seed generation failed: {0}")]
    SeedGeneration(String),
}

impl PromiseError {
    pub fn code(&self) -> ErrorCode {
        match self {
            PromiseError::Validation(_) => ErrorCode::ValidationFailed,
            PromiseError::ServerUnavailable(_) => ErrorCode::ServerUnavailable,
            PromiseError::MisalignedRound { .. } => ErrorCode::MisalignedRound,
            PromiseError::StoreLookup(_) => ErrorCode::StoreLookupFailed,
            PromiseError::Untrusted(_) => ErrorCode::TrustKeyUntrusted,
            PromiseError::TrustKeyNotFound(_) => ErrorCode::TrustKeyNotFound,
            PromiseError::UndecodableSeed(_) => ErrorCode::UndecodableSeed,
            PromiseError::Derivation(_) => ErrorCode::DerivationFailed,
            PromiseError::DerivationTimeout(_) => ErrorCode::DerivationTimedOut,
            PromiseError::SeedGeneration(_) => ErrorCode::SeedGenerationFailed,
        }
    }
}

fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
