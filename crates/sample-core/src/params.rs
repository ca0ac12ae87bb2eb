//! Caller-supplied event parameters
//!
//! Every field the analytics endpoint recognizes has a slot here. Anything
//! else can only travel in the six free-form `parameterN` slots.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::{Error, Result};

/// Number of free-form parameter slots
pub const PARAMETER_SLOTS: usize = 6;

/// Fields whose values are sent as text
pub const TEXT_FIELDS: &[&str] = &[
    "platform",
    "client",
    "client_version",
    "module",
    "content_id",
    "content_type",
    "page_id",
    "translation",
    "pur_provider",
    "pur_currency",
    "pur_country_code",
    "pur_product_sku",
    "pur_product_category",
    "pur_receipt_identifier",
    "email",
    "locale",
    "ad_referer",
    "ad_campaign",
    "ad_placement",
    "country_code",
    "facebook_id",
    "target_group",
    "host",
];

/// Optional per-event fields.
///
/// Build with struct update syntax:
///
/// ```
/// use sample_core::EventParams;
///
/// let params = EventParams {
///     locale: Some("en-US".to_string()),
///     ..Default::default()
/// }
/// .parameter(1, "Black Stab")
/// .parameter(2, 21);
/// assert_eq!(params.parameter1, Some(serde_json::json!("Black Stab")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventParams {
    /// Client platform, e.g. `ios` or `web`
    #[serde(deserialize_with = "lenient::text")]
    pub platform: Option<String>,
    /// Client name
    #[serde(deserialize_with = "lenient::text")]
    pub client: Option<String>,
    /// Client version
    #[serde(deserialize_with = "lenient::text")]
    pub client_version: Option<String>,
    /// Event time in epoch seconds, overrides the tracker clock
    #[serde(deserialize_with = "lenient::seconds")]
    pub timestamp: Option<i64>,
    /// Module or area of the app the event belongs to
    #[serde(deserialize_with = "lenient::text")]
    pub module: Option<String>,
    /// Id of the content the event refers to
    #[serde(deserialize_with = "lenient::text")]
    pub content_id: Option<String>,
    /// Ids of several referenced contents
    #[serde(deserialize_with = "lenient::text_list")]
    pub content_ids: Option<Vec<String>>,
    /// Kind of the referenced content
    #[serde(deserialize_with = "lenient::text")]
    pub content_type: Option<String>,
    /// Id of the page the event happened on
    #[serde(deserialize_with = "lenient::text")]
    pub page_id: Option<String>,
    /// Translation or language variant shown
    #[serde(deserialize_with = "lenient::text")]
    pub translation: Option<String>,

    /// Free-form slot 1
    pub parameter1: Option<Value>,
    /// Free-form slot 2
    pub parameter2: Option<Value>,
    /// Free-form slot 3
    pub parameter3: Option<Value>,
    /// Free-form slot 4
    pub parameter4: Option<Value>,
    /// Free-form slot 5
    pub parameter5: Option<Value>,
    /// Free-form slot 6
    pub parameter6: Option<Value>,

    /// Payment provider
    #[serde(deserialize_with = "lenient::text")]
    pub pur_provider: Option<String>,
    /// Gross amount paid
    #[serde(deserialize_with = "lenient::number")]
    pub pur_gross: Option<Number>,
    /// Currency code of the amounts
    #[serde(deserialize_with = "lenient::text")]
    pub pur_currency: Option<String>,
    /// Country of the purchase
    #[serde(deserialize_with = "lenient::text")]
    pub pur_country_code: Option<String>,
    /// Amount left after provider fees
    #[serde(deserialize_with = "lenient::number")]
    pub pur_earnings: Option<Number>,
    /// Purchased product
    #[serde(deserialize_with = "lenient::text")]
    pub pur_product_sku: Option<String>,
    /// Category of the purchased product
    #[serde(deserialize_with = "lenient::text")]
    pub pur_product_category: Option<String>,
    /// Provider receipt
    #[serde(deserialize_with = "lenient::text")]
    pub pur_receipt_identifier: Option<String>,

    /// User email
    #[serde(deserialize_with = "lenient::text")]
    pub email: Option<String>,
    /// User locale
    #[serde(deserialize_with = "lenient::text")]
    pub locale: Option<String>,
    /// Ad network that referred the user
    #[serde(deserialize_with = "lenient::text")]
    pub ad_referer: Option<String>,
    /// Ad campaign
    #[serde(deserialize_with = "lenient::text")]
    pub ad_campaign: Option<String>,
    /// Ad placement
    #[serde(deserialize_with = "lenient::text")]
    pub ad_placement: Option<String>,
    /// Geo longitude
    #[serde(deserialize_with = "lenient::number")]
    pub longitude: Option<Number>,
    /// Geo latitude
    #[serde(deserialize_with = "lenient::number")]
    pub latitude: Option<Number>,
    /// User country
    #[serde(deserialize_with = "lenient::text")]
    pub country_code: Option<String>,
    /// Facebook user id
    #[serde(deserialize_with = "lenient::text")]
    pub facebook_id: Option<String>,
    /// Target group the user belongs to
    #[serde(deserialize_with = "lenient::text")]
    pub target_group: Option<String>,
    /// Host the event was sent from
    #[serde(deserialize_with = "lenient::text")]
    pub host: Option<String>,
}

impl EventParams {
    /// Build params from a free-form JSON object.
    ///
    /// Keys that are not recognized are dropped. Numbers and booleans given
    /// for text fields are sent as their text, numeric text is accepted for
    /// numeric fields. Objects or arrays in a scalar field are an error.
    pub fn from_map(map: Map<String, Value>) -> Result<Self> {
        serde_json::from_value(Value::Object(map)).map_err(|e| Error::InvalidParams(e.to_string()))
    }

    /// Set free-form slot `index` (1 to 6). Other indices are ignored.
    pub fn parameter(mut self, index: usize, value: impl Into<Value>) -> Self {
        let value = Some(value.into());
        match index {
            1 => self.parameter1 = value,
            2 => self.parameter2 = value,
            3 => self.parameter3 = value,
            4 => self.parameter4 = value,
            5 => self.parameter5 = value,
            6 => self.parameter6 = value,
            _ => {}
        }
        self
    }

    /// Free-form slots in order
    pub fn parameters(&self) -> [Option<&Value>; PARAMETER_SLOTS] {
        [
            self.parameter1.as_ref(),
            self.parameter2.as_ref(),
            self.parameter3.as_ref(),
            self.parameter4.as_ref(),
            self.parameter5.as_ref(),
            self.parameter6.as_ref(),
        ]
    }

    /// Set the gross purchase amount. Non-finite amounts are ignored.
    pub fn with_gross(mut self, gross: f64) -> Self {
        self.pur_gross = Number::from_f64(gross);
        self
    }

    /// Set the purchase earnings. Non-finite amounts are ignored.
    pub fn with_earnings(mut self, earnings: f64) -> Self {
        self.pur_earnings = Number::from_f64(earnings);
        self
    }

    /// Set the geo position. Non-finite coordinates are ignored.
    pub fn with_position(mut self, longitude: f64, latitude: f64) -> Self {
        self.longitude = Number::from_f64(longitude);
        self.latitude = Number::from_f64(latitude);
        self
    }
}

/// Field deserializers that accept the loosely typed values callers send
mod lenient {
    use serde::de::{Deserializer, Error as _};
    use serde::Deserialize;
    use serde_json::{Number, Value};

    fn scalar_text(value: Value) -> Result<Option<String>, String> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            Value::Number(n) => Ok(Some(n.to_string())),
            Value::Bool(b) => Ok(Some(b.to_string())),
            other => Err(format!("expected text, found {}", other)),
        }
    }

    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        scalar_text(Value::deserialize(deserializer)?).map_err(D::Error::custom)
    }

    pub fn text_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let items = match Value::deserialize(deserializer)? {
            Value::Null => return Ok(None),
            Value::Array(items) => items,
            single => vec![single],
        };

        let mut list = Vec::with_capacity(items.len());
        for item in items {
            if let Some(text) = scalar_text(item).map_err(D::Error::custom)? {
                list.push(text);
            }
        }
        Ok(Some(list))
    }

    pub fn number<'de, D>(deserializer: D) -> Result<Option<Number>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(None),
            Value::Number(n) => Ok(Some(n)),
            Value::String(s) if s.trim().is_empty() => Ok(None),
            Value::String(s) => s
                .trim()
                .parse::<Number>()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("expected a number, found \"{}\"", s))),
            other => Err(D::Error::custom(format!("expected a number, found {}", other))),
        }
    }

    pub fn seconds<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match number(deserializer)? {
            None => Ok(None),
            Some(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {}", n))),
        }
    }
}
