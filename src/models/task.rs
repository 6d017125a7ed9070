use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::timestamp_to_rfc3339;

/// Social-media action category for a catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskCategory {
    YoutubeWatch,
    YoutubeSub,
    FacebookFollow,
    TiktokFollow,
    InstagramLike,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Active,
    Inactive,
}

/// Task catalog entry stored in redb
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: TaskCategory,
    pub points: i64,
    /// External URL the client opens when the task is started
    pub link: String,
    /// Minimum dwell before a claim is accepted
    pub timer_seconds: u32,
    pub status: TaskStatus,
    pub created_at: i64,
}

impl TaskRecord {
    pub fn new(
        title: String,
        description: String,
        category: TaskCategory,
        points: i64,
        link: String,
        timer_seconds: u32,
        now: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            description,
            category,
            points,
            link,
            timer_seconds,
            status: TaskStatus::Active,
            created_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == TaskStatus::Active
    }
}

/// Task view for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: TaskCategory,
    pub points: i64,
    pub link: String,
    pub timer_seconds: u32,
    pub status: TaskStatus,
    pub created_at: String,
}

impl From<&TaskRecord> for Task {
    fn from(record: &TaskRecord) -> Self {
        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            description: record.description.clone(),
            category: record.category,
            points: record.points,
            link: record.link.clone(),
            timer_seconds: record.timer_seconds,
            status: record.status,
            created_at: timestamp_to_rfc3339(record.created_at),
        }
    }
}
