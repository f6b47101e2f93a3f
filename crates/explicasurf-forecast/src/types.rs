use chrono::{DateTime, Utc};
use explicasurf_core::SkillLevel;
use serde::{Deserialize, Serialize};

use crate::error::ForecastError;

/// Wave energy category reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnergyLevel {
    Low,
    Medium,
    High,
}

impl EnergyLevel {
    /// Parse the backend's label; accepts English and Portuguese spellings.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "low" | "baixa" => Some(Self::Low),
            "medium" | "média" | "media" => Some(Self::Medium),
            "high" | "alta" => Some(Self::High),
            _ => None,
        }
    }

    pub fn label_pt(&self) -> &'static str {
        match self {
            Self::Low => "Baixa",
            Self::Medium => "Média",
            Self::High => "Alta",
        }
    }

    pub fn label_en(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

/// High or low water.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtremeKind {
    High,
    Low,
}

impl ExtremeKind {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "high" => Some(Self::High),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TideNow {
    pub height_m: f64,
}

/// A predicted tide extreme.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TideExtreme {
    pub at: DateTime<Utc>,
    pub kind: ExtremeKind,
    pub height_m: Option<f64>,
}

/// One forecast record with every field alias resolved.
///
/// Each field is independently optional: `None` means the upstream payload
/// did not carry a usable value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalMeasurement {
    pub wave_height_m: Option<f64>,
    pub wave_period_s: Option<f64>,
    pub swell_direction_deg: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
    pub wind_direction_deg: Option<f64>,
    pub energy: Option<f64>,
    pub energy_level: Option<EnergyLevel>,
    pub temp_c: Option<f64>,
    pub precip_mm: Option<f64>,
    pub precip_probability_pct: Option<f64>,
    pub clouds_pct: Option<f64>,
    pub tide_now: Option<TideNow>,
    pub tide_next_extreme: Option<TideExtreme>,
}

/// Anything placed on a time axis.
pub trait Timestamped {
    fn timestamp(&self) -> DateTime<Utc>;
}

/// A canonical measurement at one forecast step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    pub timestamp: DateTime<Utc>,
    pub measurement: CanonicalMeasurement,
}

impl Timestamped for ForecastSample {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// One point of the tide height curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TideHeight {
    pub timestamp: DateTime<Utc>,
    pub height_m: f64,
}

impl Timestamped for TideHeight {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Tide curve and its extremes for the selected day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TideTimeline {
    pub heights: Vec<TideHeight>,
    pub extremes: Vec<TideExtreme>,
}

/// Body of `GET /api/explain`, exactly as received.
///
/// Sections are kept as raw JSON; only the reconciler interprets them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExplainResponse {
    #[serde(default)]
    pub forecast_now: serde_json::Value,
    #[serde(default)]
    pub forecast_day: serde_json::Value,
    #[serde(default, deserialize_with = "series_or_empty")]
    pub forecast_series: Vec<serde_json::Value>,
    #[serde(default)]
    pub explanation_pt: Option<String>,
}

fn series_or_empty<'de, D>(deserializer: D) -> Result<Vec<serde_json::Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => items,
        _ => Vec::new(),
    })
}

/// Forecast day relative to today: 0, 1 or 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DayOffset(u8);

impl DayOffset {
    pub const TODAY: DayOffset = DayOffset(0);
    pub const MAX: u8 = 2;

    pub fn new(day: u8) -> Result<Self, ForecastError> {
        if day > Self::MAX {
            return Err(ForecastError::InvalidSelection(format!(
                "day offset must be between 0 and {}, got {}",
                Self::MAX,
                day
            )));
        }
        Ok(Self(day))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn label_pt(self) -> &'static str {
        match self.0 {
            0 => "Hoje",
            1 => "Amanhã",
            _ => "Depois",
        }
    }
}

impl<'de> Deserialize<'de> for DayOffset {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let day = u8::deserialize(deserializer)?;
        DayOffset::new(day).map_err(serde::de::Error::custom)
    }
}

/// The user's current choice of skill level and day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub level: SkillLevel,
    pub day: DayOffset,
}

impl Selection {
    pub fn new(level: SkillLevel, day: DayOffset) -> Self {
        Self { level, day }
    }

    /// Stable cache key, e.g. `iniciante-0`.
    pub fn cache_key(&self) -> String {
        format!("{}-{}", self.level.as_str(), self.day.get())
    }
}

/// Surfer profile sent along when asking for an AI explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurferProfile {
    pub name: String,
    pub stance: String,
    pub experience_months: u32,
}

impl Default for SurferProfile {
    fn default() -> Self {
        Self {
            name: "Surfista".to_string(),
            stance: "regular".to_string(),
            experience_months: 0,
        }
    }
}

/// A fully reconciled `/api/explain` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastView {
    pub now: CanonicalMeasurement,
    pub day: CanonicalMeasurement,
    pub series: Vec<ForecastSample>,
    pub tide: TideTimeline,
    pub explanation: Option<String>,
}

impl ForecastView {
    /// Record shown on the conditions card: "now" for today, the day summary otherwise.
    pub fn card(&self, day: DayOffset) -> &CanonicalMeasurement {
        if day == DayOffset::TODAY {
            &self.now
        } else {
            &self.day
        }
    }
}
