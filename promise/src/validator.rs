//! Request validation.
//!
//! Untyped JSON requests are converted into typed requests field by field.
//! Every violation is collected (missing fields, wrong primitive types, values
//! out of range) before the request is rejected, so the caller sees the whole
//! list at once. Primitive types are strict: a string is never coerced to an
//! integer and a float is never truncated.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use roundseed_crypto::MIN_KEYSTREAM_LEN;
use roundseed_types::{CostOverrides, RoundTimestamp, ServerId};

use crate::config::{CostLimits, PromiseConfig, MIN_MEMORY_PER_LANE};
use crate::request::{CreatePromiseRequest, ResolvePromiseRequest, SeedInput};

/// A single field-level validation failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate and convert an untyped create request.
pub fn validate_create(
    raw: &Value,
    config: &PromiseConfig,
) -> Result<CreatePromiseRequest, Vec<Violation>> {
    let mut reader = FieldReader::new(raw)?;

    let server_id = reader.required_str("server_id").map(ServerId::new);
    let trustkey_ts = reader.required_u64("trustkey_ts").map(RoundTimestamp::new);
    let n_bytes = reader.required_u64("n_bytes");
    let costs = reader.cost_overrides();

    let mut violations = reader.into_violations();
    if let Some(id) = &server_id {
        check_server_id(id, &mut violations);
    }
    let n_bytes = n_bytes.and_then(|n| match usize::try_from(n) {
        Ok(n) => Some(n),
        Err(_) => {
            violations.push(Violation::new("n_bytes", "is too large"));
            None
        }
    });
    if let Some(n) = n_bytes {
        check_seed_length("n_bytes", n, &config.limits, &mut violations);
    }
    if let Some(costs) = &costs {
        check_costs(costs, config, &mut violations);
    }

    match (server_id, trustkey_ts, n_bytes, costs) {
        (Some(server_id), Some(trustkey_ts), Some(n_bytes), Some(costs)) if violations.is_empty() => {
            Ok(CreatePromiseRequest {
                server_id,
                trustkey_ts,
                n_bytes,
                costs,
            })
        }
        _ => Err(violations),
    }
}

/// Validate and convert an untyped resolve request.
///
/// The seed is not a validated field: it is carried through as-is (or as
/// `None` when absent) and judged only when it is decoded.
pub fn validate_resolve(
    raw: &Value,
    config: &PromiseConfig,
) -> Result<ResolvePromiseRequest, Vec<Violation>> {
    let mut reader = FieldReader::new(raw)?;

    let server_id = reader.required_str("server_id").map(ServerId::new);
    let trustkey_ts = reader.required_u64("trustkey_ts").map(RoundTimestamp::new);
    let costs = reader.cost_overrides();
    let seed = reader.seed();

    let mut violations = reader.into_violations();
    if let Some(id) = &server_id {
        check_server_id(id, &mut violations);
    }
    if let Some(costs) = &costs {
        check_costs(costs, config, &mut violations);
    }

    match (server_id, trustkey_ts, costs) {
        (Some(server_id), Some(trustkey_ts), Some(costs)) if violations.is_empty() => {
            Ok(ResolvePromiseRequest {
                server_id,
                trustkey_ts,
                seed,
                costs,
            })
        }
        _ => Err(violations),
    }
}

pub fn check_server_id(server_id: &ServerId, violations: &mut Vec<Violation>) {
    if server_id.is_empty() {
        violations.push(Violation::new("server_id", "must not be empty"));
    }
}

/// Seed lengths must be producible by Argon2 and within the configured cap.
pub fn check_seed_length(
    field: &str,
    len: usize,
    limits: &CostLimits,
    violations: &mut Vec<Violation>,
) {
    if !(MIN_KEYSTREAM_LEN..=limits.max_seed_bytes).contains(&len) {
        violations.push(Violation::new(
            field,
            format!(
                "must be between {} and {} bytes, got {}",
                MIN_KEYSTREAM_LEN, limits.max_seed_bytes, len
            ),
        ));
    }
}

/// Every present override must be positive and within its cap; the effective
/// costs must satisfy Argon2's memory-per-lane minimum.
pub fn check_costs(
    costs: &CostOverrides,
    config: &PromiseConfig,
    violations: &mut Vec<Violation>,
) {
    let limits = &config.limits;
    let before = violations.len();
    check_cost("time_cost", costs.time_cost, limits.max_time_cost, violations);
    check_cost("memory_cost", costs.memory_cost, limits.max_memory_cost, violations);
    check_cost("parallelism", costs.parallelism, limits.max_parallelism, violations);
    if violations.len() != before {
        return;
    }

    let effective = config.default_costs.with_overrides(costs);
    let minimum = MIN_MEMORY_PER_LANE.saturating_mul(effective.parallelism);
    if effective.memory_cost < minimum {
        violations.push(Violation::new(
            "memory_cost",
            format!(
                "must be at least {} KiB for parallelism {}, got {}",
                minimum, effective.parallelism, effective.memory_cost
            ),
        ));
    }
}

fn check_cost(field: &str, value: Option<u32>, max: u32, violations: &mut Vec<Violation>) {
    match value {
        Some(0) => violations.push(Violation::new(field, "must be positive")),
        Some(v) if v > max => violations.push(Violation::new(
            field,
            format!("must be at most {max}, got {v}"),
        )),
        _ => {}
    }
}

/// Reads typed fields out of a JSON object, recording a violation for every
/// field that is missing or has the wrong type.
struct FieldReader<'a> {
    object: &'a Map<String, Value>,
    violations: Vec<Violation>,
}

impl<'a> FieldReader<'a> {
    fn new(raw: &'a Value) -> Result<Self, Vec<Violation>> {
        match raw.as_object() {
            Some(object) => Ok(Self {
                object,
                violations: Vec::new(),
            }),
            None => Err(vec![Violation::new(
                "request",
                format!("must be an object, got {}", json_type(raw)),
            )]),
        }
    }

    fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    fn required(&mut self, field: &str) -> Option<&'a Value> {
        match self.object.get(field) {
            Some(Value::Null) | None => {
                self.violations.push(Violation::new(field, "is required"));
                None
            }
            Some(value) => Some(value),
        }
    }

    fn optional(&self, field: &str) -> Option<&'a Value> {
        match self.object.get(field) {
            Some(Value::Null) | None => None,
            Some(value) => Some(value),
        }
    }

    fn required_str(&mut self, field: &str) -> Option<String> {
        let value = self.required(field)?;
        match value.as_str() {
            Some(s) => Some(s.to_string()),
            None => {
                self.type_mismatch(field, "a string", value);
                None
            }
        }
    }

    fn required_u64(&mut self, field: &str) -> Option<u64> {
        let value = self.required(field)?;
        self.as_u64(field, value)
    }

    fn as_u64(&mut self, field: &str, value: &Value) -> Option<u64> {
        if let Some(n) = value.as_u64() {
            return Some(n);
        }
        if value.is_i64() {
            self.violations
                .push(Violation::new(field, "must be a non-negative integer"));
        } else {
            self.type_mismatch(field, "an integer", value);
        }
        None
    }

    fn optional_u32(&mut self, field: &str) -> Result<Option<u32>, ()> {
        let Some(value) = self.optional(field) else {
            return Ok(None);
        };
        let n = self.as_u64(field, value).ok_or(())?;
        match u32::try_from(n) {
            Ok(n) => Ok(Some(n)),
            Err(_) => {
                self.violations.push(Violation::new(field, "is too large"));
                Err(())
            }
        }
    }

    /// `None` if any present override is malformed.
    fn cost_overrides(&mut self) -> Option<CostOverrides> {
        let time_cost = self.optional_u32("time_cost");
        let memory_cost = self.optional_u32("memory_cost");
        let parallelism = self.optional_u32("parallelism");
        Some(CostOverrides {
            time_cost: time_cost.ok()?,
            memory_cost: memory_cost.ok()?,
            parallelism: parallelism.ok()?,
        })
    }

    fn seed(&self) -> Option<SeedInput> {
        let value = self.optional("seed")?;
        Some(match value {
            Value::String(encoded) => SeedInput::Base64(encoded.clone()),
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_u64().and_then(|n| u8::try_from(n).ok()))
                .collect::<Option<Vec<u8>>>()
                .map(SeedInput::Raw)
                .unwrap_or_else(|| SeedInput::Unsupported("an array of non-byte values".into())),
            other => SeedInput::Unsupported(json_type(other).to_string()),
        })
    }

    fn type_mismatch(&mut self, field: &str, expected: &str, got: &Value) {
        self.violations.push(Violation::new(
            field,
            format!("must be {expected}, got {}", json_type(got)),
        ));
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "a float",
        Value::Number(_) => "an integer",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
