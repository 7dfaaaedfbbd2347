//! Turns the raw sales payload into flat [`NewOrderRecord`]s.
//!
//! The feed answers in one of two shapes: an object mapping cart ids to lists of orders, or a plain list of orders.
//! The shape is resolved once into a [`RawFeed`], after which every order is validated on its own. A bad order is
//! reported in [`NormalizeResult::rejected`] and never takes the rest of the batch down with it.
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::*;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::db_types::{NewOrderRecord, OrderId};

const UNKNOWN_ORDER: &str = "<unknown>";
const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Unsupported feed shape. Expected an object of carts or a list of orders, but got {0}")]
    UnsupportedShape(&'static str),
    #[error("Cart '{0}' does not contain a list of orders")]
    InvalidGroup(String),
    #[error("Entry {0} of the feed is not an order object")]
    NotAnObject(usize),
    #[error("Order {order_id} is missing the required field '{field}'")]
    MissingField { order_id: String, field: &'static str },
    #[error("Order {order_id} has an invalid value for '{field}': {value}")]
    InvalidField { order_id: String, field: &'static str, value: String },
}

/// The two shapes the feed can take, resolved once at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum RawFeed {
    /// `{ "<cart id>": [order, ...], ... }`
    Grouped(Vec<(String, Vec<Value>)>),
    /// `[order, ...]`
    Flat(Vec<Value>),
}

impl RawFeed {
    /// Resolves the payload shape. Entries of a grouped feed that are not lists are returned separately so that the
    /// remaining carts can still be processed.
    pub fn resolve(value: Value) -> Result<(Self, Vec<ValidationError>), ValidationError> {
        match value {
            Value::Array(orders) => Ok((Self::Flat(orders), Vec::new())),
            Value::Object(carts) => {
                let mut groups = Vec::with_capacity(carts.len());
                let mut rejected = Vec::new();
                for (cart_id, orders) in carts {
                    match orders {
                        Value::Array(orders) => groups.push((cart_id, orders)),
                        _ => rejected.push(ValidationError::InvalidGroup(cart_id)),
                    }
                }
                Ok((Self::Grouped(groups), rejected))
            },
            Value::Null => Ok((Self::Flat(Vec::new()), Vec::new())),
            Value::Bool(_) => Err(ValidationError::UnsupportedShape("a boolean")),
            Value::Number(_) => Err(ValidationError::UnsupportedShape("a number")),
            Value::String(_) => Err(ValidationError::UnsupportedShape("a string")),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Grouped(groups) => groups.iter().map(|(_, orders)| orders.len()).sum(),
            Self::Flat(orders) => orders.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct NormalizeResult {
    pub records: Vec<NewOrderRecord>,
    pub rejected: Vec<ValidationError>,
}

/// Normalizes a raw payload. Only a payload of the wrong shape altogether is an error.
pub fn normalize_value(value: Value) -> Result<NormalizeResult, ValidationError> {
    let (feed, rejected) = RawFeed::resolve(value)?;
    let mut result = normalize(feed);
    result.rejected.extend(rejected);
    Ok(result)
}

pub fn normalize(feed: RawFeed) -> NormalizeResult {
    let entries: Vec<(Option<&str>, &Value)> = match &feed {
        RawFeed::Grouped(groups) => groups
            .iter()
            .flat_map(|(cart_id, orders)| orders.iter().map(move |o| (Some(cart_id.as_str()), o)))
            .collect(),
        RawFeed::Flat(orders) => orders.iter().map(|o| (None, o)).collect(),
    };
    let mut result = NormalizeResult::default();
    for (index, (group_key, entry)) in entries.into_iter().enumerate() {
        let outcome = match entry {
            Value::Object(fields) => parse_order(fields, group_key),
            _ => Err(ValidationError::NotAnObject(index)),
        };
        match outcome {
            Ok(record) => result.records.push(record),
            Err(e) => {
                warn!("🧹️ Skipping order: {e}");
                result.rejected.push(e);
            },
        }
    }
    debug!("🧹️ Normalized {} orders, rejected {}", result.records.len(), result.rejected.len());
    result
}

fn parse_order(fields: &Map<String, Value>, group_key: Option<&str>) -> Result<NewOrderRecord, ValidationError> {
    let order_id = first_text(fields, &["order", "order_id"]).filter(|s| !s.trim().is_empty());
    let context = order_id.clone().unwrap_or_else(|| UNKNOWN_ORDER.to_string());
    let order_id = order_id.ok_or_else(|| missing(&context, "order_id"))?;
    let sku = first_text(fields, &["sku"]).filter(|s| !s.trim().is_empty()).ok_or_else(|| missing(&context, "sku"))?;
    let status = first_text(fields, &["status"]).ok_or_else(|| missing(&context, "status"))?;
    let store = first_text(fields, &["store"]).ok_or_else(|| missing(&context, "store"))?;
    let quantity = quantity(fields, &context)?.ok_or_else(|| missing(&context, "quantity"))?;
    let total_value = number(fields, "total_value", &context)?.ok_or_else(|| missing(&context, "total_value"))?;
    let payment_timestamp = timestamp(fields, &context)?.ok_or_else(|| missing(&context, "payment_timestamp"))?;
    let optional = |field: &'static str, default: f64| number(fields, field, &context).map(|v| v.unwrap_or(default));
    Ok(NewOrderRecord {
        order_id: OrderId::from(order_id),
        cart_id: first_text(fields, &["cart", "cart_id"]).filter(|s| !s.is_empty()),
        group_key: group_key.map(String::from),
        ad: first_text(fields, &["ad"]).unwrap_or_default(),
        sku,
        title: first_text(fields, &["title"]).unwrap_or_default(),
        quantity,
        total_value,
        payment_timestamp,
        status,
        cost: optional("cost", 0.0)?,
        gross_profit: optional("gross_profit", 0.0)?,
        taxes: optional("taxes", 0.0)?,
        freight: optional("freight", 0.0)?,
        committee: optional("committee", 0.0)?,
        fraction: optional("fraction", 1.0)?,
        profitability: optional("profitability", 0.0)?,
        rentability: optional("rentability", 0.0)?,
        store,
        profit: optional("profit", 0.0)?,
    })
}

fn missing(order_id: &str, field: &'static str) -> ValidationError {
    ValidationError::MissingField { order_id: order_id.to_string(), field }
}

fn invalid(order_id: &str, field: &'static str, value: &Value) -> ValidationError {
    ValidationError::InvalidField { order_id: order_id.to_string(), field, value: value.to_string() }
}

/// The first of `keys` that holds a usable scalar, rendered as text.
fn first_text(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match fields.get(*k) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Numbers are accepted as JSON numbers or numeric strings. `null` and blank strings count as absent.
fn number(fields: &Map<String, Value>, field: &'static str, order_id: &str) -> Result<Option<f64>, ValidationError> {
    let value = match fields.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(v) => v,
    };
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => return Ok(None),
        Value::String(s) => parse_decimal(s),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(invalid(order_id, field, value)),
    }
}

fn parse_decimal(s: &str) -> Option<f64> {
    let s = s.trim();
    s.parse::<f64>().ok().or_else(|| {
        // Decimal comma, e.g. "12,50"
        if s.contains('.') {
            None
        } else {
            s.replace(',', ".").parse::<f64>().ok()
        }
    })
}

fn quantity(fields: &Map<String, Value>, order_id: &str) -> Result<Option<i64>, ValidationError> {
    let Some(q) = number(fields, "quantity", order_id)? else {
        return Ok(None);
    };
    if q.fract() != 0.0 || q.abs() > i64::MAX as f64 {
        let value = fields.get("quantity").cloned().unwrap_or(Value::Null);
        return Err(invalid(order_id, "quantity", &value));
    }
    Ok(Some(q as i64))
}

fn timestamp(fields: &Map<String, Value>, order_id: &str) -> Result<Option<NaiveDateTime>, ValidationError> {
    let value = match fields.get("payment_date").or_else(|| fields.get("payment_timestamp")) {
        None | Some(Value::Null) => return Ok(None),
        Some(v) => v,
    };
    let Value::String(s) = value else {
        return Err(invalid(order_id, "payment_timestamp", value));
    };
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    parse_timestamp(s).map(Some).ok_or_else(|| invalid(order_id, "payment_timestamp", value))
}

/// Accepts `YYYY-MM-DD HH:MM:SS`, ISO-8601 with or without fractional seconds, RFC 3339 (converted to UTC) and bare
/// dates (midnight).
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_utc()))
        .or_else(|| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0)))
}
