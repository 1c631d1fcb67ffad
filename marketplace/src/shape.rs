//! Caller-facing shaping of raw marketplace project records.
//!
//! Pure functions only; no I/O. Missing fields become explicit defaults so
//! the output schema is always fully populated.

use crate::enrich::ClientSummary;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Budget {
    pub minimum: f64,
    pub maximum: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Currency {
    pub code: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct BidStats {
    pub bid_count: u64,
    pub bid_avg: f64,
}

/// A project record as returned to callers.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FormattedProject {
    pub id: Option<u64>,
    pub seo_url: Option<String>,
    pub title: String,
    pub preview_description: String,
    pub description: String,
    pub budget: Budget,
    pub currency: Currency,
    pub bid_stats: BidStats,
    pub bidperiod: Option<i64>,
    pub client: ClientSummary,
}

/// Shape raw project records for the caller, embedding each owner's client
/// summary. Output order matches input order.
#[must_use]
pub fn shape(
    projects: &[JsonValue],
    clients: &HashMap<String, ClientSummary>,
) -> Vec<FormattedProject> {
    projects
        .iter()
        .map(|project| shape_one(project, clients))
        .collect()
}

fn shape_one(project: &JsonValue, clients: &HashMap<String, ClientSummary>) -> FormattedProject {
    let owner_id = project.get("owner_id").and_then(JsonValue::as_u64);
    let client = owner_id
        .and_then(|id| clients.get(&id.to_string()).cloned())
        .unwrap_or_else(|| ClientSummary::placeholder(owner_id));

    FormattedProject {
        id: project.get("id").and_then(JsonValue::as_u64),
        seo_url: project
            .get("seo_url")
            .and_then(JsonValue::as_str)
            .map(str::to_string),
        title: trimmed_text(project.get("title")),
        preview_description: trimmed_text(project.get("preview_description")),
        description: trimmed_text(project.get("description")),
        budget: Budget {
            minimum: number_or_zero(project.pointer("/budget/minimum")),
            maximum: number_or_zero(project.pointer("/budget/maximum")),
        },
        currency: Currency {
            code: project
                .pointer("/currency/code")
                .and_then(JsonValue::as_str)
                .unwrap_or("NA")
                .to_string(),
        },
        bid_stats: BidStats {
            bid_count: project
                .pointer("/bid_stats/bid_count")
                .and_then(JsonValue::as_u64)
                .unwrap_or(0),
            bid_avg: round2(number_or_zero(project.pointer("/bid_stats/bid_avg"))),
        },
        bidperiod: project.get("bidperiod").and_then(JsonValue::as_i64),
        client,
    }
}

fn trimmed_text(value: Option<&JsonValue>) -> String {
    value
        .and_then(JsonValue::as_str)
        .unwrap_or("")
        .trim()
        .to_string()
}

fn number_or_zero(value: Option<&JsonValue>) -> f64 {
    value.and_then(JsonValue::as_f64).unwrap_or(0.0)
}

/// Round to two decimals, half away from zero on the 100-scaled value.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_project() -> JsonValue {
        json!({
            "id": 1000,
            "seo_url": "build-a-site-1000",
            "title": "  Build a site  ",
            "preview_description": " Short blurb ",
            "description": "Long description.\n",
            "owner_id": 55,
            "budget": {"minimum": 250.0, "maximum": 750.0},
            "currency": {"code": "USD"},
            "bid_stats": {"bid_count": 14, "bid_avg": 312.333},
            "bidperiod": 7
        })
    }

    #[test]
    fn shape_extracts_and_trims_fields() {
        let shaped = shape(&[raw_project()], &HashMap::new());

        assert_eq!(shaped.len(), 1);
        let project = &shaped[0];
        assert_eq!(project.id, Some(1000));
        assert_eq!(project.title, "Build a site");
        assert_eq!(project.preview_description, "Short blurb");
        assert_eq!(project.description, "Long description.");
        assert_eq!(project.budget.minimum, 250.0);
        assert_eq!(project.budget.maximum, 750.0);
        assert_eq!(project.currency.code, "USD");
        assert_eq!(project.bid_stats.bid_count, 14);
        assert_eq!(project.bid_stats.bid_avg, 312.33);
        assert_eq!(project.bidperiod, Some(7));
    }

    #[test]
    fn shape_defaults_missing_fields() {
        let shaped = shape(&[json!({})], &HashMap::new());

        let project = &shaped[0];
        assert_eq!(project.id, None);
        assert_eq!(project.title, "");
        assert_eq!(project.budget, Budget::default());
        assert_eq!(project.currency.code, "NA");
        assert_eq!(project.bid_stats.bid_count, 0);
        assert_eq!(project.bid_stats.bid_avg, 0.0);
        assert_eq!(project.client, ClientSummary::placeholder(None));
    }

    #[test]
    fn shape_embeds_known_clients_and_placeholders_for_unknown() {
        let mut clients = HashMap::new();
        let mut summary = ClientSummary::placeholder(Some(55));
        summary.username = "acme".to_string();
        summary.rating.overall = Some(4.8);
        clients.insert("55".to_string(), summary);

        let projects = vec![raw_project(), json!({"id": 1001, "owner_id": 99})];
        let shaped = shape(&projects, &clients);

        assert_eq!(shaped[0].client.username, "acme");
        assert_eq!(shaped[0].client.rating.overall, Some(4.8));
        assert_eq!(shaped[1].client, ClientSummary::placeholder(Some(99)));
    }

    #[test]
    fn shape_preserves_input_order_and_is_idempotent() {
        let projects = vec![
            json!({"id": 3, "title": "c"}),
            json!({"id": 1, "title": "a"}),
            json!({"id": 2, "title": "b"}),
        ];
        let clients = HashMap::new();

        let first = shape(&projects, &clients);
        let second = shape(&projects, &clients);

        let ids: Vec<_> = first.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![Some(3), Some(1), Some(2)]);
        assert_eq!(first, second);
    }

    #[test]
    fn bid_avg_rounding_is_pinned() {
        // Half-away-from-zero applied to the 100-scaled f64: 12.345 scales
        // to exactly 1234.5 and rounds up, while 1.005 scales to just under
        // the midpoint and rounds down. Pinned so a rule change is caught.
        let shaped = shape(
            &[
                json!({"bid_stats": {"bid_avg": 12.345}}),
                json!({"bid_stats": {"bid_avg": 12.344}}),
                json!({"bid_stats": {"bid_avg": 1.005}}),
                json!({"bid_stats": {"bid_avg": 100.0}}),
                json!({"bid_stats": {}}),
            ],
            &HashMap::new(),
        );

        assert_eq!(shaped[0].bid_stats.bid_avg, 12.35);
        assert_eq!(shaped[1].bid_stats.bid_avg, 12.34);
        assert_eq!(shaped[2].bid_stats.bid_avg, 1.0);
        assert_eq!(shaped[3].bid_stats.bid_avg, 100.0);
        assert_eq!(shaped[4].bid_stats.bid_avg, 0.0);
    }
}
