//! Field reconciliation: turns the backend's loosely shaped records into
//! [`CanonicalMeasurement`]s.
//!
//! The backend has renamed several fields across releases. Each concept maps
//! to an ordered list of source paths; the first path holding a finite number
//! wins. Nothing here fails: absent or malformed fields become `None`.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

use crate::types::{
    CanonicalMeasurement, EnergyLevel, ExplainResponse, ExtremeKind, ForecastSample,
    ForecastView, TideExtreme, TideHeight, TideNow, TideTimeline,
};

/// A numeric quantity the presentation layer knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Concept {
    WaveHeight,
    WavePeriod,
    SwellDirection,
    WindSpeed,
    WindDirection,
    Energy,
    Temperature,
    Precipitation,
    PrecipProbability,
    Clouds,
    TideNowHeight,
    TideExtremeHeight,
}

/// Versioned mapping from concept to source paths, highest priority first.
///
/// Paths are dot separated for nested objects (`tide.now.height_m`).
#[derive(Debug)]
pub struct AliasTable {
    pub version: &'static str,
    entries: &'static [(Concept, &'static [&'static str])],
}

pub const ALIASES_V2: AliasTable = AliasTable {
    version: "v2",
    entries: &[
        (Concept::WaveHeight, &["wave_height_m"]),
        (Concept::WavePeriod, &["wave_period_s", "period_s"]),
        (Concept::SwellDirection, &["wave_direction_deg", "wave_dir_deg"]),
        (Concept::WindSpeed, &["wind_speed_kmh"]),
        (Concept::WindDirection, &["wind_dir_deg", "wind_wave_direction_deg"]),
        (Concept::Energy, &["energy"]),
        (Concept::Temperature, &["temp_c"]),
        (Concept::Precipitation, &["precip_mm"]),
        (Concept::PrecipProbability, &["precip_probability"]),
        (Concept::Clouds, &["clouds"]),
        (Concept::TideNowHeight, &["tide.now.height_m"]),
        (Concept::TideExtremeHeight, &["tide.next_extreme.height"]),
    ],
};

/// Keys carrying a sample's time, highest priority first.
const TIMESTAMP_KEYS: &[&str] = &["time", "date"];

/// Keys carrying a tide curve point's height.
const TIDE_HEIGHT_KEYS: &[&str] = &["height", "height_m"];

impl AliasTable {
    /// Source paths for `concept`, in priority order.
    pub fn sources(&self, concept: Concept) -> &'static [&'static str] {
        self.entries
            .iter()
            .find(|(c, _)| *c == concept)
            .map(|(_, paths)| *paths)
            .unwrap_or(&[])
    }

    /// First finite number found under one of the concept's paths.
    pub fn resolve(&self, raw: &Value, concept: Concept) -> Option<f64> {
        first_number(raw, self.sources(concept))
    }
}

/// Reconcile one raw record with the current alias table.
pub fn reconcile(raw: &Value) -> CanonicalMeasurement {
    reconcile_with(&ALIASES_V2, raw)
}

pub fn reconcile_with(table: &AliasTable, raw: &Value) -> CanonicalMeasurement {
    let get = |concept| table.resolve(raw, concept);

    CanonicalMeasurement {
        wave_height_m: get(Concept::WaveHeight),
        wave_period_s: get(Concept::WavePeriod),
        swell_direction_deg: get(Concept::SwellDirection),
        wind_speed_kmh: get(Concept::WindSpeed),
        wind_direction_deg: get(Concept::WindDirection),
        energy: get(Concept::Energy),
        energy_level: lookup(raw, "energy_level")
            .and_then(Value::as_str)
            .and_then(EnergyLevel::from_label),
        temp_c: get(Concept::Temperature),
        precip_mm: get(Concept::Precipitation),
        precip_probability_pct: get(Concept::PrecipProbability),
        clouds_pct: get(Concept::Clouds),
        tide_now: get(Concept::TideNowHeight).map(|height_m| TideNow { height_m }),
        tide_next_extreme: lookup(raw, "tide.next_extreme").and_then(|extreme| {
            parse_extreme(extreme, get(Concept::TideExtremeHeight))
        }),
    }
}

/// Reconcile the hourly series, dropping samples without a usable time.
pub fn reconcile_series(raw: &[Value]) -> Vec<ForecastSample> {
    let series: Vec<ForecastSample> = raw
        .iter()
        .filter_map(|record| {
            let timestamp = first_timestamp(record)?;
            Some(ForecastSample {
                timestamp,
                measurement: reconcile(record),
            })
        })
        .collect();

    if series.len() < raw.len() {
        tracing::debug!(
            "Dropped {} forecast samples without a timestamp",
            raw.len() - series.len()
        );
    }
    series
}

/// Extract the tide curve and extremes from a day record.
pub fn reconcile_tide(day: &Value) -> TideTimeline {
    let heights = lookup(day, "tide.heights")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|p| {
                    Some(TideHeight {
                        timestamp: first_timestamp(p)?,
                        height_m: first_number(p, TIDE_HEIGHT_KEYS)?,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let extremes = lookup(day, "tide.extremes")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|e| parse_extreme(e, first_number(e, TIDE_HEIGHT_KEYS)))
                .collect()
        })
        .unwrap_or_default();

    TideTimeline { heights, extremes }
}

impl ForecastView {
    /// Reconcile every section of a backend response.
    pub fn from_response(response: &ExplainResponse) -> Self {
        Self {
            now: reconcile(&response.forecast_now),
            day: reconcile(&response.forecast_day),
            series: reconcile_series(&response.forecast_series),
            tide: reconcile_tide(&response.forecast_day),
            explanation: response
                .explanation_pt
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }
}

/// Parse an upstream timestamp.
///
/// RFC 3339 strings keep their offset; naive ISO strings are read as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn parse_extreme(raw: &Value, height_m: Option<f64>) -> Option<TideExtreme> {
    let kind = raw
        .get("type")
        .and_then(Value::as_str)
        .and_then(ExtremeKind::from_label)?;
    let at = raw
        .get("date")
        .and_then(Value::as_str)
        .and_then(parse_timestamp)?;
    Some(TideExtreme { at, kind, height_m })
}

fn lookup<'a>(raw: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(raw, |node, key| node.get(key))
}

fn first_number(raw: &Value, paths: &[&str]) -> Option<f64> {
    paths
        .iter()
        .find_map(|path| lookup(raw, path).and_then(Value::as_f64).filter(|v| v.is_finite()))
}

fn first_timestamp(raw: &Value) -> Option<DateTime<Utc>> {
    TIMESTAMP_KEYS.iter().find_map(|key| {
        raw.get(*key)
            .and_then(Value::as_str)
            .and_then(parse_timestamp)
    })
}
