use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DayOfWeek {
    Lunes,
    Martes,
    #[serde(rename = "Miércoles")]
    Miercoles,
    Jueves,
    Viernes,
    #[serde(rename = "Sábado")]
    Sabado,
    Domingo,
}

impl DayOfWeek {
    /// Canonical week order, Monday first.
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Lunes,
        DayOfWeek::Martes,
        DayOfWeek::Miercoles,
        DayOfWeek::Jueves,
        DayOfWeek::Viernes,
        DayOfWeek::Sabado,
        DayOfWeek::Domingo,
    ];

    /// Sort key used wherever exercises are grouped by day.
    pub fn rank(self) -> usize {
        match self {
            DayOfWeek::Lunes => 0,
            DayOfWeek::Martes => 1,
            DayOfWeek::Miercoles => 2,
            DayOfWeek::Jueves => 3,
            DayOfWeek::Viernes => 4,
            DayOfWeek::Sabado => 5,
            DayOfWeek::Domingo => 6,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DayOfWeek::Lunes => "Lunes",
            DayOfWeek::Martes => "Martes",
            DayOfWeek::Miercoles => "Miércoles",
            DayOfWeek::Jueves => "Jueves",
            DayOfWeek::Viernes => "Viernes",
            DayOfWeek::Sabado => "Sábado",
            DayOfWeek::Domingo => "Domingo",
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayOfWeek {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        let day = match wanted.as_str() {
            "lunes" => DayOfWeek::Lunes,
            "martes" => DayOfWeek::Martes,
            "miércoles" | "miercoles" => DayOfWeek::Miercoles,
            "jueves" => DayOfWeek::Jueves,
            "viernes" => DayOfWeek::Viernes,
            "sábado" | "sabado" => DayOfWeek::Sabado,
            "domingo" => DayOfWeek::Domingo,
            _ => return Err(anyhow::anyhow!("Unknown day of week: {}", s)),
        };
        Ok(day)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub day_of_week: DayOfWeek,
    pub series: i32,
    pub repetitions: i32,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default = "default_order")]
    pub order: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routine_id: Option<i64>,
}

fn default_order() -> i32 {
    1
}

impl Exercise {
    /// Fresh editor row: no identity, Monday, 3x10, no weight.
    pub fn blank(order: i32) -> Self {
        Self {
            id: None,
            name: String::new(),
            day_of_week: DayOfWeek::Lunes,
            series: 3,
            repetitions: 10,
            weight: None,
            notes: Some(String::new()),
            order,
            routine_id: None,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty()
    }
}
