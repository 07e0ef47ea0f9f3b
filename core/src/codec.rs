//! Scalar value kinds and the codecs converting between client JSON and
//! store values.
//!
//! Codecs never see `NULL`: [`ScalarDescriptor`](crate::model::ScalarDescriptor)
//! maps `null` both ways before delegating.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, SecondsFormat};
use serde_json::Value as Json;

use crate::error::{GraphError, Result};
use crate::schema::ColumnKind;
use crate::value::Value;

/// Value kind of a scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// Sole primary-key column, exposed as a string.
    Id { integer: bool },
    Int,
    Float,
    String,
    Boolean,
    Date,
    Json,
    Binary,
}

impl ScalarType {
    /// Kind of a column; the sole primary-key column of a table is an id.
    pub fn for_column(kind: ColumnKind, sole_primary_key: bool) -> Self {
        if sole_primary_key {
            return ScalarType::Id {
                integer: kind == ColumnKind::Integer,
            };
        }
        match kind {
            ColumnKind::String => ScalarType::String,
            ColumnKind::Integer => ScalarType::Int,
            ColumnKind::Numeric => ScalarType::Float,
            ColumnKind::Date => ScalarType::Date,
            ColumnKind::Boolean => ScalarType::Boolean,
            ColumnKind::Binary => ScalarType::Binary,
            ColumnKind::Json => ScalarType::Json,
        }
    }
}

/// Converts one scalar kind between its client and store representations.
pub trait ScalarCodec: Debug + Send + Sync {
    /// Client JSON to a store value. Never called with `null`.
    fn encode(&self, value: &Json) -> Result<Value>;

    /// Store value to client JSON. Never called with `NULL`.
    fn decode(&self, value: Value) -> Result<Json>;
}

/// Codec lookup by scalar kind.
#[derive(Debug, Clone)]
pub struct Codecs {
    codecs: HashMap<ScalarType, Arc<dyn ScalarCodec>>,
}

impl Default for Codecs {
    fn default() -> Self {
        let kinds = [
            ScalarType::Id { integer: true },
            ScalarType::Id { integer: false },
            ScalarType::Int,
            ScalarType::Float,
            ScalarType::String,
            ScalarType::Boolean,
            ScalarType::Date,
            ScalarType::Json,
            ScalarType::Binary,
        ];
        Self {
            codecs: kinds.into_iter().map(|kind| (kind, builtin(kind))).collect(),
        }
    }
}

impl Codecs {
    /// Replaces the codec used for `kind`.
    pub fn with(mut self, kind: ScalarType, codec: Arc<dyn ScalarCodec>) -> Self {
        self.codecs.insert(kind, codec);
        self
    }

    pub fn get(&self, kind: ScalarType) -> Arc<dyn ScalarCodec> {
        self.codecs
            .get(&kind)
            .map_or_else(|| builtin(kind), Arc::clone)
    }
}

fn builtin(kind: ScalarType) -> Arc<dyn ScalarCodec> {
    match kind {
        ScalarType::Id { integer } => Arc::new(IdCodec { integer }),
        ScalarType::Int => Arc::new(IntCodec),
        ScalarType::Float => Arc::new(FloatCodec),
        ScalarType::String => Arc::new(StringCodec),
        ScalarType::Boolean => Arc::new(BooleanCodec),
        ScalarType::Date => Arc::new(DateCodec),
        ScalarType::Json => Arc::new(JsonCodec),
        ScalarType::Binary => Arc::new(BinaryCodec),
    }
}

fn unexpected(kind: &str, value: impl Debug) -> GraphError {
    GraphError::Codec(format!("expected {kind}, received {value:?}"))
}

#[derive(Debug)]
pub struct IdCodec {
    integer: bool,
}

impl ScalarCodec for IdCodec {
    fn encode(&self, value: &Json) -> Result<Value> {
        match value {
            Json::String(s) if self.integer => s
                .parse::<i64>()
                .map(Value::Integer)
                .or_else(|_| Ok(Value::Text(s.clone()))),
            Json::String(s) => Ok(Value::Text(s.clone())),
            Json::Number(n) if self.integer => {
                n.as_i64().map(Value::Integer).ok_or_else(|| unexpected("id", n))
            }
            Json::Number(n) => Ok(Value::Text(n.to_string())),
            other => Err(unexpected("id", other)),
        }
    }

    fn decode(&self, value: Value) -> Result<Json> {
        match value {
            Value::Integer(i) => Ok(Json::String(i.to_string())),
            Value::Real(r) => Ok(Json::String(r.to_string())),
            Value::Text(s) => Ok(Json::String(s)),
            other => Err(unexpected("id", other)),
        }
    }
}

#[derive(Debug)]
pub struct IntCodec;

impl ScalarCodec for IntCodec {
    fn encode(&self, value: &Json) -> Result<Value> {
        match value {
            Json::Number(n) => n.as_i64().map(Value::Integer).ok_or_else(|| unexpected("int", n)),
            Json::String(s) => s
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| unexpected("int", s)),
            other => Err(unexpected("int", other)),
        }
    }

    fn decode(&self, value: Value) -> Result<Json> {
        match value {
            Value::Integer(i) => Ok(Json::from(i)),
            // Whole values only; NaN and infinities fail the fract check.
            Value::Real(r) if r.fract() == 0.0 && r >= i64::MIN as f64 && r < i64::MAX as f64 => {
                Ok(Json::from(r as i64))
            }
            Value::Text(s) => s
                .parse::<i64>()
                .map(Json::from)
                .map_err(|_| unexpected("int", s)),
            other => Err(unexpected("int", other)),
        }
    }
}

#[derive(Debug)]
pub struct FloatCodec;

impl ScalarCodec for FloatCodec {
    fn encode(&self, value: &Json) -> Result<Value> {
        match value {
            Json::Number(n) => n.as_f64().map(Value::Real).ok_or_else(|| unexpected("float", n)),
            Json::String(s) => s
                .parse::<f64>()
                .map(Value::Real)
                .map_err(|_| unexpected("float", s)),
            other => Err(unexpected("float", other)),
        }
    }

    fn decode(&self, value: Value) -> Result<Json> {
        match value {
            Value::Integer(i) => Ok(Json::from(i as f64)),
            Value::Real(r) => Ok(Json::from(r)),
            Value::Text(s) => s
                .parse::<f64>()
                .map(Json::from)
                .map_err(|_| unexpected("float", s)),
            other => Err(unexpected("float", other)),
        }
    }
}

#[derive(Debug)]
pub struct StringCodec;

impl ScalarCodec for StringCodec {
    fn encode(&self, value: &Json) -> Result<Value> {
        match value {
            Json::String(s) => Ok(Value::Text(s.clone())),
            Json::Number(n) => Ok(Value::Text(n.to_string())),
            other => Err(unexpected("string", other)),
        }
    }

    fn decode(&self, value: Value) -> Result<Json> {
        match value {
            Value::Blob(b) => Err(unexpected("string", b)),
            Value::Null => Ok(Json::Null),
            other => Ok(Json::String(other.to_string())),
        }
    }
}

#[derive(Debug)]
pub struct BooleanCodec;

impl ScalarCodec for BooleanCodec {
    fn encode(&self, value: &Json) -> Result<Value> {
        match value {
            Json::Bool(b) => Ok(Value::Integer(i64::from(*b))),
            Json::Number(n) => match n.as_i64() {
                Some(i @ (0 | 1)) => Ok(Value::Integer(i)),
                _ => Err(unexpected("boolean", n)),
            },
            other => Err(unexpected("boolean", other)),
        }
    }

    fn decode(&self, value: Value) -> Result<Json> {
        match value {
            Value::Integer(i) => Ok(Json::Bool(i != 0)),
            Value::Text(s) if s.eq_ignore_ascii_case("true") => Ok(Json::Bool(true)),
            Value::Text(s) if s.eq_ignore_ascii_case("false") => Ok(Json::Bool(false)),
            other => Err(unexpected("boolean", other)),
        }
    }
}

/// Integer dates are epoch milliseconds and render as RFC 3339 in UTC. Text
/// dates are passed through unchanged.
#[derive(Debug)]
pub struct DateCodec;

impl ScalarCodec for DateCodec {
    fn encode(&self, value: &Json) -> Result<Value> {
        match value {
            Json::Number(n) => n.as_i64().map(Value::Integer).ok_or_else(|| unexpected("date", n)),
            Json::String(s) => Ok(Value::Text(s.clone())),
            other => Err(unexpected("date", other)),
        }
    }

    fn decode(&self, value: Value) -> Result<Json> {
        let millis = match value {
            Value::Text(s) => return Ok(Json::String(s)),
            Value::Integer(i) => i,
            Value::Real(r) => r as i64,
            other => return Err(unexpected("date", other)),
        };
        DateTime::from_timestamp_millis(millis)
            .map(|date| Json::String(date.to_rfc3339_opts(SecondsFormat::Millis, true)))
            .ok_or_else(|| unexpected("date", millis))
    }
}

/// JSON documents stored as text. Empty text reads as `null`.
#[derive(Debug)]
pub struct JsonCodec;

impl ScalarCodec for JsonCodec {
    fn encode(&self, value: &Json) -> Result<Value> {
        serde_json::to_string(value)
            .map(Value::Text)
            .map_err(|e| GraphError::Codec(e.to_string()))
    }

    fn decode(&self, value: Value) -> Result<Json> {
        match value {
            Value::Text(s) if s.trim().is_empty() => Ok(Json::Null),
            Value::Text(s) => serde_json::from_str(&s).map_err(|e| GraphError::Codec(e.to_string())),
            Value::Blob(b) => serde_json::from_slice(&b).map_err(|e| GraphError::Codec(e.to_string())),
            Value::Integer(i) => Ok(Json::from(i)),
            Value::Real(r) => Ok(Json::from(r)),
            Value::Null => Ok(Json::Null),
        }
    }
}

/// Blobs exchanged as standard base64 text.
#[derive(Debug)]
pub struct BinaryCodec;

impl ScalarCodec for BinaryCodec {
    fn encode(&self, value: &Json) -> Result<Value> {
        match value {
            Json::String(s) => STANDARD
                .decode(s)
                .map(Value::Blob)
                .map_err(|e| GraphError::Codec(format!("invalid base64: {e}"))),
            other => Err(unexpected("base64 string", other)),
        }
    }

    fn decode(&self, value: Value) -> Result<Json> {
        match value {
            Value::Blob(b) => Ok(Json::String(STANDARD.encode(b))),
            Value::Text(s) => Ok(Json::String(STANDARD.encode(s.as_bytes()))),
            other => Err(unexpected("blob", other)),
        }
    }
}
