use serde::{Deserialize, Serialize};

use crate::clients::models::common::Exercise;

/// Body of `POST /rutinas` and `PUT /rutinas/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutinePayload {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}
