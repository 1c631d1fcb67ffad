//! Client-reputation enrichment.
//!
//! Projects only carry an `owner_id`; the owner's reputation and location
//! come from a single bulk user lookup. Enrichment is best-effort: if the
//! lookup fails, the scan or search proceeds with placeholder client blocks
//! instead of failing.

use crate::client::MarketplaceClient;
use crate::metrics_defs;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// Employer rating block, entire-history figures.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ClientRating {
    pub overall: Option<f64>,
    pub on_budget: Option<f64>,
    pub on_time: Option<f64>,
    pub positive: Option<f64>,
    pub reviews: Option<u64>,
    pub completion_rate: Option<f64>,
}

/// Condensed view of a project's owner.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClientSummary {
    pub id: Option<u64>,
    pub username: String,
    pub display_name: String,
    pub country: String,
    pub city: Option<String>,
    pub registration_date: Option<i64>,
    pub payment_verified: Option<bool>,
    pub email_verified: Option<bool>,
    pub rating: ClientRating,
}

impl ClientSummary {
    /// Build a summary from one entry of the bulk user-lookup response.
    #[must_use]
    pub fn from_user(id: Option<u64>, user: &JsonValue) -> Self {
        let entire_history = user.pointer("/employer_reputation/entire_history");
        let rating_field = |field: &str| {
            entire_history
                .and_then(|history| history.get(field))
                .and_then(JsonValue::as_f64)
        };

        ClientSummary {
            id,
            username: text_or_na(user.get("username")),
            display_name: text_or_na(user.get("display_name")),
            country: text_or_na(user.pointer("/location/country/name")),
            city: user
                .pointer("/location/city")
                .and_then(JsonValue::as_str)
                .map(str::to_string),
            registration_date: user.get("registration_date").and_then(JsonValue::as_i64),
            payment_verified: user
                .pointer("/status/payment_verified")
                .and_then(JsonValue::as_bool),
            email_verified: user
                .pointer("/status/email_verified")
                .and_then(JsonValue::as_bool),
            rating: ClientRating {
                overall: rating_field("overall"),
                on_budget: rating_field("on_budget"),
                on_time: rating_field("on_time"),
                positive: rating_field("positive"),
                reviews: entire_history
                    .and_then(|history| history.get("reviews"))
                    .and_then(JsonValue::as_u64),
                completion_rate: rating_field("completion_rate"),
            },
        }
    }

    /// The block emitted when no client data is available for an owner.
    #[must_use]
    pub fn placeholder(id: Option<u64>) -> Self {
        ClientSummary {
            id,
            username: "N/A".to_string(),
            display_name: "N/A".to_string(),
            country: "N/A".to_string(),
            city: None,
            registration_date: None,
            payment_verified: None,
            email_verified: None,
            rating: ClientRating::default(),
        }
    }
}

fn text_or_na(value: Option<&JsonValue>) -> String {
    value
        .and_then(JsonValue::as_str)
        .unwrap_or("N/A")
        .to_string()
}

/// Look up the owners of `projects` in bulk.
///
/// Returns a map keyed by owner id as a string (the lookup response's own
/// keying). Any failure degrades to an empty map.
pub async fn enrich(
    client: &MarketplaceClient,
    projects: &[JsonValue],
) -> HashMap<String, ClientSummary> {
    let mut owner_ids: Vec<u64> = projects
        .iter()
        .filter_map(|project| project.get("owner_id").and_then(JsonValue::as_u64))
        .collect();
    owner_ids.sort_unstable();
    owner_ids.dedup();

    if owner_ids.is_empty() {
        return HashMap::new();
    }

    match client.lookup_users(&owner_ids).await {
        Ok(users) => users
            .into_iter()
            .map(|(key, user)| {
                let id = key.parse::<u64>().ok();
                let summary = ClientSummary::from_user(id, &user);
                (key, summary)
            })
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, "client enrichment failed");
            metrics::counter!(metrics_defs::ENRICH_FAILURES).increment(1);
            HashMap::new()
        }
    }
}
