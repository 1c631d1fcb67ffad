//! CRUD and reporting operations for the `bids` table.
//!
//! One row per bid a user submitted (or tried to submit) through the
//! gateway. The submission outcome travels as [`BidStatus`] and is stored
//! under the external wire strings `sent` / `error` / `not_sent`.

use crate::error::{Result, StoreError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Row, Sqlite};
use std::collections::BTreeMap;

/// Outcome of the external submission attempt for a stored bid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BidStatus {
    /// The marketplace accepted the bid.
    #[serde(rename = "sent")]
    Sent,
    /// The marketplace rejected the bid or was unreachable.
    #[serde(rename = "error")]
    Error,
    /// No submission was attempted; the bid only exists locally.
    #[serde(rename = "not_sent")]
    StoredLocally,
}

impl std::fmt::Display for BidStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sent => write!(f, "sent"),
            Self::Error => write!(f, "error"),
            Self::StoredLocally => write!(f, "not_sent"),
        }
    }
}

impl BidStatus {
    /// Parse from the stored string representation.
    ///
    /// Unknown values fall back to `StoredLocally`; early rows written by
    /// the manual CRUD endpoints carried free-text statuses like `stored`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "sent" => Self::Sent,
            "error" => Self::Error,
            _ => Self::StoredLocally,
        }
    }
}

/// A stored bid.
#[derive(Debug, Clone, Serialize)]
pub struct Bid {
    pub id: String,
    pub user_email: String,
    pub title: String,
    pub link: String,
    pub amount: f64,
    pub period: i64,
    pub bid_text: String,
    pub status: BidStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a bid row.
#[derive(Debug, Clone)]
pub struct NewBid {
    pub user_email: String,
    pub title: String,
    pub link: String,
    pub amount: f64,
    pub period: i64,
    pub bid_text: String,
    pub status: BidStatus,
}

/// Partial update for a bid row. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BidPatch {
    pub title: Option<String>,
    pub link: Option<String>,
    pub amount: Option<f64>,
    pub period: Option<i64>,
    pub bid_text: Option<String>,
    pub status: Option<BidStatus>,
}

impl BidPatch {
    /// True when the patch would change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.link.is_none()
            && self.amount.is_none()
            && self.period.is_none()
            && self.bid_text.is_none()
            && self.status.is_none()
    }
}

/// One bid entry in the monthly insight report.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InsightEntry {
    pub time: String,
    pub title: String,
    pub link: String,
    pub amount: f64,
    pub period: i64,
    pub bid: String,
    pub status: BidStatus,
}

/// Monthly report: user email -> day (YYYY-MM-DD) -> bids placed that day.
pub type MonthlyInsight = BTreeMap<String, BTreeMap<String, Vec<InsightEntry>>>;

/// Insert a new bid row and return it.
///
/// # Errors
/// Returns `StoreError` if the insert fails.
pub async fn create(pool: &Pool<Sqlite>, new_bid: NewBid) -> Result<Bid> {
    let id = uuid::Uuid::new_v4().to_string();
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO bids (id, user_email, title, link, amount, period, bid_text, status,
                           created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&new_bid.user_email)
    .bind(&new_bid.title)
    .bind(&new_bid.link)
    .bind(new_bid.amount)
    .bind(new_bid.period)
    .bind(&new_bid.bid_text)
    .bind(new_bid.status.to_string())
    .bind(now.to_rfc3339())
    .bind(now.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(Bid {
        id,
        user_email: new_bid.user_email,
        title: new_bid.title,
        link: new_bid.link,
        amount: new_bid.amount,
        period: new_bid.period,
        bid_text: new_bid.bid_text,
        status: new_bid.status,
        created_at: now,
        updated_at: now,
    })
}

/// All bids belonging to one user, newest first.
///
/// # Errors
/// Returns `StoreError` if the query fails.
pub async fn list_for_user(pool: &Pool<Sqlite>, user_email: &str) -> Result<Vec<Bid>> {
    let rows = sqlx::query(
        "SELECT id, user_email, title, link, amount, period, bid_text, status,
                created_at, updated_at
         FROM bids
         WHERE user_email = ?
         ORDER BY created_at DESC",
    )
    .bind(user_email)
    .fetch_all(pool)
    .await?;

    parse_bids_from_rows(rows)
}

/// Every stored bid, newest first.
///
/// # Errors
/// Returns `StoreError` if the query fails.
pub async fn list_all(pool: &Pool<Sqlite>) -> Result<Vec<Bid>> {
    let rows = sqlx::query(
        "SELECT id, user_email, title, link, amount, period, bid_text, status,
                created_at, updated_at
         FROM bids
         ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await?;

    parse_bids_from_rows(rows)
}

/// Apply a partial update to a bid. Returns false when no row matched.
///
/// # Errors
/// Returns `StoreError` if the update fails.
pub async fn update(pool: &Pool<Sqlite>, bid_id: &str, patch: &BidPatch) -> Result<bool> {
    let updated_at = Utc::now().to_rfc3339();

    let result = sqlx::query(
        "UPDATE bids
         SET title = COALESCE(?, title),
             link = COALESCE(?, link),
             amount = COALESCE(?, amount),
             period = COALESCE(?, period),
             bid_text = COALESCE(?, bid_text),
             status = COALESCE(?, status),
             updated_at = ?
         WHERE id = ?",
    )
    .bind(&patch.title)
    .bind(&patch.link)
    .bind(patch.amount)
    .bind(patch.period)
    .bind(&patch.bid_text)
    .bind(patch.status.map(|s| s.to_string()))
    .bind(&updated_at)
    .bind(bid_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a bid. Returns false when no row matched.
///
/// # Errors
/// Returns `StoreError` if the delete fails.
pub async fn delete(pool: &Pool<Sqlite>, bid_id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM bids WHERE id = ?")
        .bind(bid_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// True when the user already has a bid stored for the given project link.
///
/// # Errors
/// Returns `StoreError` if the query fails.
pub async fn has_bid_on(pool: &Pool<Sqlite>, user_email: &str, link: &str) -> Result<bool> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM bids WHERE user_email = ? AND link = ?")
            .bind(user_email)
            .bind(link)
            .fetch_one(pool)
            .await?;

    Ok(count > 0)
}

/// Group one month's bids as user -> day -> entries.
///
/// `month` must be of the form `YYYY-MM`. When `user_email` is given, only
/// that user's bids are reported.
///
/// # Errors
/// Returns `StoreError::InvalidMonth` for a malformed month filter, or the
/// underlying query error.
pub async fn monthly_insight(
    pool: &Pool<Sqlite>,
    month: &str,
    user_email: Option<&str>,
) -> Result<MonthlyInsight> {
    // Reject anything that is not a real YYYY-MM before it reaches the query.
    NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
        .map_err(|_| StoreError::InvalidMonth(month.to_string()))?;

    let rows = match user_email {
        Some(email) => {
            sqlx::query(
                "SELECT id, user_email, title, link, amount, period, bid_text, status,
                        created_at, updated_at
                 FROM bids
                 WHERE substr(created_at, 1, 7) = ? AND user_email = ?
                 ORDER BY created_at ASC",
            )
            .bind(month)
            .bind(email)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query(
                "SELECT id, user_email, title, link, amount, period, bid_text, status,
                        created_at, updated_at
                 FROM bids
                 WHERE substr(created_at, 1, 7) = ?
                 ORDER BY created_at ASC",
            )
            .bind(month)
            .fetch_all(pool)
            .await?
        }
    };

    let bids = parse_bids_from_rows(rows)?;

    let mut report = MonthlyInsight::new();
    for bid in bids {
        let day = bid.created_at.format("%Y-%m-%d").to_string();
        let entry = InsightEntry {
            time: bid.created_at.format("%H:%M:%S").to_string(),
            title: bid.title,
            link: bid.link,
            amount: bid.amount,
            period: bid.period,
            bid: bid.bid_text,
            status: bid.status,
        };

        report
            .entry(bid.user_email)
            .or_default()
            .entry(day)
            .or_default()
            .push(entry);
    }

    Ok(report)
}

/// Helper to parse bid rows.
fn parse_bids_from_rows(rows: Vec<sqlx::sqlite::SqliteRow>) -> Result<Vec<Bid>> {
    let mut bids = Vec::new();

    for row in rows {
        let created_at_str: String = row.try_get("created_at")?;
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));

        let updated_at_str: String = row.try_get("updated_at")?;
        let updated_at = DateTime::parse_from_rfc3339(&updated_at_str)
            .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));

        let status_str: String = row.try_get("status")?;

        bids.push(Bid {
            id: row.try_get("id")?,
            user_email: row.try_get("user_email")?,
            title: row.try_get("title")?,
            link: row.try_get("link")?,
            amount: row.try_get("amount")?,
            period: row.try_get("period")?,
            bid_text: row.try_get("bid_text")?,
            status: BidStatus::parse(&status_str),
            created_at,
            updated_at,
        });
    }

    Ok(bids)
}
