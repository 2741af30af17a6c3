//! Diesel model structs for users, their sync preferences, and sync logs.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::sync::{SyncResult, SyncType};
use crate::schema;

#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = schema::users)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = schema::preferences)]
pub struct Preference {
    pub id: i64,
    pub user_id: i64,
    pub city: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<f64>,
    pub timezone: String,
    pub calculation_method: i32,
    pub school: i32,
    pub adjustments: Option<String>,
    pub reminder_minutes: i32,
    pub auto_sync_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = schema::sync_logs)]
pub struct SyncLog {
    pub id: i64,
    /// NULL for env-driven on-demand runs with no stored principal.
    pub user_id: Option<i64>,
    pub sync_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: String,
    pub events_created: i32,
    pub events_updated: i32,
    pub events_failed: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, Serialize, Deserialize)]
#[diesel(table_name = schema::sync_logs)]
pub struct NewSyncLog {
    pub user_id: Option<i64>,
    pub sync_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: String,
    pub events_created: i32,
    pub events_updated: i32,
    pub events_failed: i32,
    pub error_message: Option<String>,
}

impl NewSyncLog {
    /// Row for a batch that ran to completion (possibly with unit failures).
    pub fn from_result(
        user_id: Option<i64>,
        sync_type: SyncType,
        start_date: NaiveDate,
        end_date: NaiveDate,
        result: &SyncResult,
    ) -> Self {
        NewSyncLog {
            user_id,
            sync_type: sync_type.as_str().to_string(),
            start_date,
            end_date,
            status: result.status().as_str().to_string(),
            events_created: result.events_created as i32,
            events_updated: result.events_updated as i32,
            events_failed: result.events_failed as i32,
            error_message: result.joined_errors(),
        }
    }

    /// Row for a batch that aborted before completing.
    pub fn aborted(
        user_id: Option<i64>,
        sync_type: SyncType,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: &str,
    ) -> Self {
        NewSyncLog {
            user_id,
            sync_type: sync_type.as_str().to_string(),
            start_date,
            end_date,
            status: crate::models::sync::SyncStatus::Failed.as_str().to_string(),
            events_created: 0,
            events_updated: 0,
            events_failed: 0,
            error_message: Some(reason.to_string()),
        }
    }
}
