use std::fmt::Display;

use chrono::{DateTime, NaiveDateTime, Utc};
use sales_common::Secret;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};

/// The provider type under which ARP Commerce session tokens are stored.
pub const ARP_COMMERCE: &str = "arpcommerce";

/// The label used for orders whose SKU has no niche mapping.
pub const UNMAPPED_NICHE: &str = "Sem nicho";

//--------------------------------------     OrderId       ---------------------------------------------------------
/// The order id assigned by the commerce platform. Unique per user, not globally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<S: Into<String>> From<S> for OrderId {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

//--------------------------------------   NewOrderRecord    ---------------------------------------------------------
/// A normalized sale line, as it comes out of the feed and before it is stored.
///
/// `payment_timestamp` is still in the feed's clock. The store applies the timezone correction on the way in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrderRecord {
    pub order_id: OrderId,
    /// The cart id carried by the record itself, if any.
    pub cart_id: Option<String>,
    /// The key of the group the record was found under, for feeds that group orders by cart.
    pub group_key: Option<String>,
    pub ad: String,
    pub sku: String,
    pub title: String,
    pub quantity: i64,
    pub total_value: f64,
    pub payment_timestamp: NaiveDateTime,
    pub status: String,
    pub cost: f64,
    pub gross_profit: f64,
    pub taxes: f64,
    pub freight: f64,
    pub committee: f64,
    pub fraction: f64,
    pub profitability: f64,
    pub rentability: f64,
    pub store: String,
    pub profit: f64,
}

impl NewOrderRecord {
    /// A record with the required fields set and every optional field at its default.
    pub fn new<S: Into<String>>(
        order_id: OrderId,
        sku: S,
        quantity: i64,
        total_value: f64,
        payment_timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            order_id,
            cart_id: None,
            group_key: None,
            ad: String::new(),
            sku: sku.into(),
            title: String::new(),
            quantity,
            total_value,
            payment_timestamp,
            status: "paid".to_string(),
            cost: 0.0,
            gross_profit: 0.0,
            taxes: 0.0,
            freight: 0.0,
            committee: 0.0,
            fraction: 1.0,
            profitability: 0.0,
            rentability: 0.0,
            store: String::new(),
            profit: 0.0,
        }
    }

    pub fn with_profit(mut self, profit: f64) -> Self {
        self.profit = profit;
        self
    }

    pub fn with_ad<S: Into<String>>(mut self, ad: S) -> Self {
        self.ad = ad.into();
        self
    }

    pub fn with_cart_id<S: Into<String>>(mut self, cart_id: S) -> Self {
        self.cart_id = Some(cart_id.into());
        self
    }

    /// The explicit cart id wins. Otherwise the record inherits the key of the group it was found in.
    pub fn resolved_cart_id(&self) -> Option<&str> {
        self.cart_id.as_deref().filter(|s| !s.is_empty()).or(self.group_key.as_deref())
    }
}

//--------------------------------------     OrderRecord      ---------------------------------------------------------
/// A stored order line joined with the user's niche mapping for its SKU.
///
/// `payment_timestamp` is local wall-clock time.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: i64,
    pub order_id: OrderId,
    pub user_id: i64,
    pub cart_id: Option<String>,
    pub ad: String,
    pub sku: String,
    pub title: String,
    pub quantity: i64,
    pub total_value: f64,
    pub payment_timestamp: NaiveDateTime,
    pub status: String,
    pub cost: f64,
    pub gross_profit: f64,
    pub taxes: f64,
    pub freight: f64,
    pub committee: f64,
    pub fraction: f64,
    pub profitability: f64,
    pub rentability: f64,
    pub store: String,
    pub profit: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub niche: Option<String>,
}

impl OrderRecord {
    pub fn niche_label(&self) -> &str {
        self.niche.as_deref().unwrap_or(UNMAPPED_NICHE)
    }
}

//--------------------------------------     Integration      ---------------------------------------------------------
#[derive(Debug, Clone, FromRow)]
pub struct Integration {
    pub id: i64,
    pub user_id: i64,
    pub integration_type: String,
    pub token_value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user's session token for one provider. The token is never printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrationCredential {
    pub user_id: i64,
    pub provider: String,
    pub token: Secret<String>,
}

impl From<Integration> for IntegrationCredential {
    fn from(value: Integration) -> Self {
        Self { user_id: value.user_id, provider: value.integration_type, token: Secret::new(value.token_value) }
    }
}
