//! Event payload construction
//!
//! [`build_payload`] turns tracker state plus one call's parameters into the
//! flat, ordered field map the endpoint receives. Only the fields listed here
//! are ever emitted.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::params::EventParams;
use crate::tracker::TrackerState;

/// SDK name reported with every event
pub const SDK_NAME: &str = "Sample.rs";

/// SDK version reported with every event
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Category used when the caller passes an empty one
pub const DEFAULT_CATEGORY: &str = "custom";

/// Events that carry the purchase block
pub const PURCHASE_EVENTS: [&str; 2] = ["purchase", "chargeback"];

/// Events that carry the session/account block
pub const SESSION_EVENTS: [&str; 3] = ["session_start", "session_update", "session_resume"];

/// Category that carries the session/account block
pub const ACCOUNT_CATEGORY: &str = "account";

/// Ordered, whitelisted field map for one event.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EventPayload(Map<String, Value>);

/// Wire envelope: `{"p": payload}`
#[derive(Serialize)]
struct Envelope<'a> {
    p: &'a EventPayload,
}

impl EventPayload {
    /// Empty payload
    pub fn new() -> Self {
        Self::default()
    }

    /// Field value by name
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Whether a field was emitted
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Field names in emission order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of emitted fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no field was emitted
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Underlying map
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Request body for this payload
    pub fn to_body(&self) -> serde_json::Result<String> {
        serde_json::to_string(&Envelope { p: self })
    }

    /// Add `field` with `value`, else `default`, else nothing.
    ///
    /// A candidate counts as present when it is neither missing, `null`, nor
    /// the integer zero. Empty strings and `false` are present.
    pub fn add(&mut self, field: &str, value: Option<Value>, default: Option<Value>) {
        if field.is_empty() {
            return;
        }
        if let Some(chosen) = value.filter(is_present).or(default.filter(is_present)) {
            self.0.insert(field.to_string(), chosen);
        }
    }
}

/// Integer zero counts as absent; `0.0`, `""` and `false` do not.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Number(n) => !(n.as_i64() == Some(0) || n.as_u64() == Some(0)),
        _ => true,
    }
}

fn text(value: &Option<String>) -> Option<Value> {
    value.as_ref().map(|v| Value::from(v.as_str()))
}

fn json<T: Into<Value> + Clone>(value: &Option<T>) -> Option<Value> {
    value.clone().map(Into::into)
}

/// Merge tracker state and call parameters into the payload for one event.
///
/// `now` is the wall-clock epoch second used when neither the params nor a
/// forced timestamp supply one.
pub fn build_payload(
    state: &TrackerState,
    event_name: &str,
    event_category: &str,
    params: &EventParams,
    now: i64,
) -> EventPayload {
    let config = &state.config;
    let profile = &config.profile;
    let mut payload = EventPayload::new();

    payload.add("sdk", Some(SDK_NAME.into()), None);
    payload.add("sdk_version", Some(SDK_VERSION.into()), None);
    payload.add("server_side", Some(config.server_side.into()), None);

    payload.add("platform", text(&params.platform), text(&profile.platform));
    payload.add("client", text(&params.client), text(&profile.client));
    payload.add(
        "client_version",
        text(&params.client_version),
        text(&profile.client_version),
    );

    payload.add("event_name", Some(event_name.into()), None);
    payload.add("app_token", text(&config.app_token), None);
    payload.add("debug", json(&profile.debug_mode), None);
    payload.add(
        "timestamp",
        json(&params.timestamp),
        Some(state.event_timestamp(now).into()),
    );
    payload.add("user_id", text(&state.user_id), None);

    let category = Some(event_category)
        .filter(|c| !c.is_empty())
        .map(Value::from);
    payload.add("event_category", category, Some(DEFAULT_CATEGORY.into()));
    payload.add("module", text(&params.module), text(&profile.module));
    payload.add("content_id", text(&params.content_id), None);
    payload.add("content_ids", json(&params.content_ids), None);
    payload.add("content_type", text(&params.content_type), None);
    payload.add("page_id", text(&params.page_id), None);
    payload.add("translation", text(&params.translation), None);

    for (index, slot) in params.parameters().into_iter().enumerate() {
        payload.add(&format!("parameter{}", index + 1), slot.cloned(), None);
    }

    if PURCHASE_EVENTS.contains(&event_name) {
        payload.add("pur_provider", text(&params.pur_provider), None);
        payload.add("pur_gross", json(&params.pur_gross), None);
        payload.add("pur_currency", text(&params.pur_currency), None);
        payload.add("pur_country_code", text(&params.pur_country_code), None);
        payload.add("pur_earnings", json(&params.pur_earnings), None);
        payload.add("pur_product_sku", text(&params.pur_product_sku), None);
        payload.add(
            "pur_product_category",
            text(&params.pur_product_category),
            None,
        );
        payload.add(
            "pur_receipt_identifier",
            text(&params.pur_receipt_identifier),
            None,
        );
    }

    if SESSION_EVENTS.contains(&event_name) || event_category == ACCOUNT_CATEGORY {
        payload.add("email", text(&params.email), text(&profile.email));
        payload.add("locale", text(&params.locale), text(&profile.locale));

        payload.add(
            "ad_referer",
            text(&params.ad_referer),
            text(&profile.ad_referer),
        );
        payload.add(
            "ad_campaign",
            text(&params.ad_campaign),
            text(&profile.ad_campaign),
        );
        payload.add(
            "ad_placement",
            text(&params.ad_placement),
            text(&profile.ad_placement),
        );

        // Legacy collectors also accepted the misspelled `longitute`; only the
        // corrected key is sent
        payload.add("longitude", json(&params.longitude), json(&profile.longitude));
        payload.add("latitude", json(&params.latitude), json(&profile.latitude));

        payload.add(
            "country_code",
            text(&params.country_code),
            text(&profile.country_code),
        );
        payload.add(
            "facebook_id",
            text(&params.facebook_id),
            text(&profile.facebook_id),
        );

        payload.add("target_group", text(&params.target_group), None);

        payload.add("host", text(&params.host), text(&profile.host));
    }

    payload
}
