//! RDMA endpoint records and the registration payload agents send.
//!
//! On the wire a record is a six-element array:
//!   [ip_address, gid, lid, qpn, declared_time, updated_time]
//!
//! A registration carries the same fields (minus `updated_time`) as a JSON
//! object `{ip_address, gid, lid, qpn, dtime}`. Agents send `lid` and `qpn`
//! as strings, so both strings and numbers are accepted.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One registered endpoint, keyed by `ip_address` in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "RecordRow", from = "RecordRow")]
pub struct AddressRecord {
    pub ip_address: String,
    /// RDMA global identifier, opaque.
    pub gid: String,
    /// RDMA local identifier.
    pub lid: i64,
    /// Queue-pair number.
    pub qpn: i64,
    /// Timestamp string as declared by the agent. Never parsed.
    pub declared_time: String,
    /// Epoch seconds of the last successful registration. Drives expiry.
    pub updated_time: u64,
}

#[derive(Serialize, Deserialize)]
struct RecordRow(String, String, i64, i64, String, u64);

impl From<AddressRecord> for RecordRow {
    fn from(r: AddressRecord) -> Self {
        RecordRow(
            r.ip_address,
            r.gid,
            r.lid,
            r.qpn,
            r.declared_time,
            r.updated_time,
        )
    }
}

impl From<RecordRow> for AddressRecord {
    fn from(row: RecordRow) -> Self {
        let RecordRow(ip_address, gid, lid, qpn, declared_time, updated_time) = row;
        Self {
            ip_address,
            gid,
            lid,
            qpn,
            declared_time,
            updated_time,
        }
    }
}

impl AddressRecord {
    /// Seconds since this record was last refreshed, saturating at zero.
    pub fn age(&self, now: u64) -> u64 {
        now.saturating_sub(self.updated_time)
    }
}

// ── Registration ──────────────────────────────────────────────────────────────

/// Raw registration as submitted by an agent. Every field is optional until
/// `validate` has run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AddressRegistration {
    pub ip_address: Option<String>,
    pub gid: Option<String>,
    pub lid: Option<String>,
    pub qpn: Option<String>,
    pub dtime: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing or empty field: {0}")]
    Missing(&'static str),
    #[error("field {0} is not an integer: {1:?}")]
    NotAnInteger(&'static str, String),
}

impl AddressRegistration {
    /// Pull the five fields out of a JSON object.
    ///
    /// Strings are taken verbatim and numbers are rendered to text. Any other
    /// JSON type (null, bool, array, object) counts as absent.
    pub fn from_json_object(obj: &Map<String, Value>) -> Self {
        let field = |name: &str| obj.get(name).and_then(scalar_text);
        Self {
            ip_address: field("ip_address"),
            gid: field("gid"),
            lid: field("lid"),
            qpn: field("qpn"),
            dtime: field("dtime"),
        }
    }

    /// Check presence and integer fields, and stamp the record with `now`.
    pub fn validate(self, now: u64) -> Result<AddressRecord, ValidationError> {
        let ip_address = required(self.ip_address, "ip_address")?;
        let gid = required(self.gid, "gid")?;
        let lid = integer(required(self.lid, "lid")?, "lid")?;
        let qpn = integer(required(self.qpn, "qpn")?, "qpn")?;
        let declared_time = required(self.dtime, "dtime")?;

        Ok(AddressRecord {
            ip_address,
            gid,
            lid,
            qpn,
            declared_time,
            updated_time: now,
        })
    }
}

fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn required(v: Option<String>, name: &'static str) -> Result<String, ValidationError> {
    match v {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(ValidationError::Missing(name)),
    }
}

fn integer(s: String, name: &'static str) -> Result<i64, ValidationError> {
    s.trim()
        .parse()
        .map_err(|_| ValidationError::NotAnInteger(name, s))
}
