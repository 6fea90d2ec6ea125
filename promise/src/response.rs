//! Response shaping.
//!
//! Every outcome, success or failure, is returned as a [`PromiseResponse`].
//! Only the fields relevant to the outcome are serialized.

use serde::{Deserialize, Serialize};

use roundseed_types::{serde_b64, CostOverrides, RoundTimestamp, ServerId, TrustKeyRecord};

use crate::error::PromiseError;
use crate::request::{ResolvePromiseRequest, SeedInput};
use crate::validator::Violation;

/// The opaque promise handed to the requester by `create`.
///
/// It must be handed back verbatim to `resolve`. The requested length is not
/// carried; it is implied by the seed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePromiseResult {
    pub server_id: ServerId,
    pub trustkey_ts: RoundTimestamp,
    #[serde(with = "serde_b64")]
    pub seed: Vec<u8>,
    /// Exactly the overrides present in the create request.
    #[serde(flatten)]
    pub costs: CostOverrides,
}

impl CreatePromiseResult {
    /// Turn the promise back into the request that resolves it.
    pub fn into_resolve_request(self) -> ResolvePromiseRequest {
        ResolvePromiseRequest {
            server_id: self.server_id,
            trustkey_ts: self.trustkey_ts,
            seed: Some(SeedInput::Raw(self.seed)),
            costs: self.costs,
        }
    }
}

/// Success payload of either operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PromiseResult {
    Created(CreatePromiseResult),
    /// The combined output, base64 encoded.
    Resolved(#[serde(with = "serde_b64")] Vec<u8>),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromiseResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<PromiseResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<Vec<Violation>>,
    /// The offending record when the trust key is not trusted yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trustkey: Option<TrustKeyRecord>,
    /// Underlying store failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_error: Option<String>,
}

impl PromiseResponse {
    fn success(result: PromiseResult) -> Self {
        Self {
            success: true,
            result: Some(result),
            error_code: None,
            error: None,
            validation_errors: None,
            trustkey: None,
            db_error: None,
        }
    }

    pub fn created(result: CreatePromiseResult) -> Self {
        Self::success(PromiseResult::Created(result))
    }

    pub fn resolved(output: Vec<u8>) -> Self {
        Self::success(PromiseResult::Resolved(output))
    }

    /// Shape a failure: the stable code and message, plus whatever detail the
    /// error carries.
    pub fn from_error(err: &PromiseError) -> Self {
        let code = err.code();
        let mut response = Self {
            success: false,
            result: None,
            error_code: Some(code.as_u32()),
            error: Some(code.message().to_string()),
            validation_errors: None,
            trustkey: None,
            db_error: None,
        };
        match err {
            PromiseError::Validation(violations) => {
                response.validation_errors = Some(violations.clone());
            }
            PromiseError::Untrusted(record) => {
                response.trustkey = Some(record.as_ref().clone());
            }
            PromiseError::StoreLookup(store_err) => {
                response.db_error = Some(store_err.to_string());
            }
            _ => {}
        }
        response
    }

    /// The created promise, if this is a successful create response.
    pub fn created_result(&self) -> Option<&CreatePromiseResult> {
        match &self.result {
            Some(PromiseResult::Created(result)) => Some(result),
            _ => None,
        }
    }

    /// The combined output, if this is a successful resolve response.
    pub fn resolved_output(&self) -> Option<&[u8]> {
        match &self.result {
            Some(PromiseResult::Resolved(output)) => Some(output),
            _ => None,
        }
    }
}

impl From<PromiseError> for PromiseResponse {
    fn from(err: PromiseError) -> Self {
        Self::from_error(&err)
    }
}
