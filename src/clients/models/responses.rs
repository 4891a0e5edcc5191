use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::clients::models::common::Exercise;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub pages: u32,
}

// Envelope returned by GET /rutinas and GET /rutinas/buscar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedRoutines {
    pub items: Vec<Routine>,
    pub meta: PaginationMeta,
}

// GET /rutinas/estadisticas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total_routines: u64,
    pub total_exercises: u64,
    #[serde(default)]
    pub exercises_per_day: BTreeMap<String, u64>,
}

// The server emits naive ISO timestamps; treat them as UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}
