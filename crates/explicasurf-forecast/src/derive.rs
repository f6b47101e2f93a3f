//! Presentation-only values derived from canonical measurements.
//!
//! Every function here is total: missing or odd input maps to a neutral
//! result (`"--"`, the gray bucket, `None`), never to an error.

use chrono::{DateTime, Duration, FixedOffset, Offset, Utc};
use explicasurf_core::Locale;
use serde::Serialize;

use crate::types::{EnergyLevel, ExtremeKind, TideExtreme, TideHeight};

/// Shown wherever a value is unknown.
pub const PLACEHOLDER: &str = "--";

/// Hex color handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Color(pub &'static str);

impl Color {
    pub const GRAY: Color = Color("#95a5a6");

    pub fn hex(&self) -> &'static str {
        self.0
    }
}

/// Clock used for every displayed time, from the configured offset in minutes.
pub fn display_offset(utc_offset_minutes: i32) -> FixedOffset {
    utc_offset_minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix())
}

// ===================== Sky =====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkyCondition {
    Rain,
    Overcast,
    PartlyCloudy,
    MostlyClear,
    Clear,
}

impl SkyCondition {
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Rain => "🌧️",
            Self::Overcast => "☁️",
            Self::PartlyCloudy => "⛅",
            Self::MostlyClear => "🌤️",
            Self::Clear => "☀️",
        }
    }

    pub fn label(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Self::Rain, Locale::PtBr) => "Chuva",
            (Self::Overcast, Locale::PtBr) => "Encoberto",
            (Self::PartlyCloudy, Locale::PtBr) => "Parcialmente nublado",
            (Self::MostlyClear, Locale::PtBr) => "Poucas nuvens",
            (Self::Clear, Locale::PtBr) => "Céu limpo",
            (Self::Rain, Locale::En) => "rain",
            (Self::Overcast, Locale::En) => "overcast",
            (Self::PartlyCloudy, Locale::En) => "partly cloudy",
            (Self::MostlyClear, Locale::En) => "mostly clear",
            (Self::Clear, Locale::En) => "clear",
        }
    }
}

/// Classify the sky. Rain chance outranks cloud cover; a missing input never
/// meets its threshold.
pub fn sky_condition(clouds_pct: Option<f64>, precip_probability_pct: Option<f64>) -> SkyCondition {
    let meets = |v: Option<f64>, threshold: f64| v.is_some_and(|v| v >= threshold);

    if meets(precip_probability_pct, 70.0) {
        SkyCondition::Rain
    } else if meets(clouds_pct, 70.0) {
        SkyCondition::Overcast
    } else if meets(clouds_pct, 40.0) {
        SkyCondition::PartlyCloudy
    } else if meets(clouds_pct, 10.0) {
        SkyCondition::MostlyClear
    } else {
        SkyCondition::Clear
    }
}

// ===================== Compass =====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CardinalDirection {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl CardinalDirection {
    const ALL: [CardinalDirection; 8] = [
        Self::N,
        Self::NE,
        Self::E,
        Self::SE,
        Self::S,
        Self::SW,
        Self::W,
        Self::NW,
    ];

    pub fn label(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::En => ["N", "NE", "E", "SE", "S", "SW", "W", "NW"][*self as usize],
            Locale::PtBr => ["N", "NE", "L", "SE", "S", "SO", "O", "NO"][*self as usize],
        }
    }
}

/// Eight-point compass bucket, 45° wide and starting at each point.
pub fn cardinal_direction(deg: f64) -> Option<CardinalDirection> {
    if !deg.is_finite() {
        return None;
    }
    let normalized = deg.rem_euclid(360.0);
    let index = (normalized / 45.0).floor() as usize % 8;
    Some(CardinalDirection::ALL[index])
}

pub fn cardinal_label(deg: Option<f64>, locale: Locale) -> &'static str {
    deg.and_then(cardinal_direction)
        .map(|d| d.label(locale))
        .unwrap_or(PLACEHOLDER)
}

// ===================== Tide =====================

/// Samples further than this from "now" cannot anchor a trend.
pub const TREND_TOLERANCE_MINUTES: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TideTrend {
    Rising,
    Falling,
}

impl TideTrend {
    pub fn label(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Self::Rising, Locale::PtBr) => "Maré subindo (enchente)",
            (Self::Falling, Locale::PtBr) => "Maré descendo (vazante)",
            (Self::Rising, Locale::En) => "rising",
            (Self::Falling, Locale::En) => "falling",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Rising => Color("#38bdf8"),
            Self::Falling => Color("#0ea5e9"),
        }
    }
}

pub fn trend_label(trend: Option<TideTrend>, locale: Locale) -> &'static str {
    match (trend, locale) {
        (Some(t), _) => t.label(locale),
        (None, Locale::PtBr) => "Sem dados de tendência",
        (None, Locale::En) => "no trend data",
    }
}

/// Rising or falling tide around `now`.
///
/// Anchors on the sample closest to `now` (within the tolerance) and compares
/// its two neighbours. Needs a sample on each side of the anchor.
pub fn tide_trend(series: &[TideHeight], now: DateTime<Utc>) -> Option<TideTrend> {
    let tolerance = Duration::minutes(TREND_TOLERANCE_MINUTES);

    let (anchor, _) = series
        .iter()
        .enumerate()
        .map(|(i, p)| (i, (p.timestamp - now).abs()))
        .filter(|(_, distance)| *distance < tolerance)
        .min_by_key(|(_, distance)| *distance)?;

    if anchor == 0 || anchor + 1 >= series.len() {
        return None;
    }

    let preceding = series[anchor - 1].height_m;
    let following = series[anchor + 1].height_m;
    Some(if following > preceding {
        TideTrend::Rising
    } else {
        TideTrend::Falling
    })
}

/// Wording for the next high/low water, e.g. "fully high at 14:05".
pub fn next_extreme_phrase(
    extreme: Option<&TideExtreme>,
    offset: FixedOffset,
    locale: Locale,
) -> String {
    let Some(extreme) = extreme else {
        return PLACEHOLDER.to_string();
    };
    let time = extreme.at.with_timezone(&offset).format("%H:%M");

    match (extreme.kind, locale) {
        (ExtremeKind::High, Locale::PtBr) => format!("Maré toda cheia às {}", time),
        (ExtremeKind::Low, Locale::PtBr) => format!("Maré toda seca às {}", time),
        (ExtremeKind::High, Locale::En) => format!("fully high at {}", time),
        (ExtremeKind::Low, Locale::En) => format!("fully low at {}", time),
    }
}

// ===================== Tiers =====================

/// One discrete bucket of a threshold ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierBand {
    pub color: Color,
    pub label_pt: &'static str,
    pub label_en: &'static str,
}

impl TierBand {
    pub fn label(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::PtBr => self.label_pt,
            Locale::En => self.label_en,
        }
    }
}

pub const UNKNOWN_BAND: TierBand = TierBand {
    color: Color::GRAY,
    label_pt: PLACEHOLDER,
    label_en: PLACEHOLDER,
};

/// Ordered thresholds mapping a continuous value to a band.
///
/// Evaluated top-down: the first bound the value is strictly below wins;
/// anything at or above the last bound lands in `terminal`.
#[derive(Debug)]
pub struct TierLadder {
    pub bounded: &'static [(f64, TierBand)],
    pub terminal: TierBand,
}

impl TierLadder {
    pub fn classify(&self, value: Option<f64>) -> TierBand {
        let Some(value) = value.filter(|v| v.is_finite()) else {
            return UNKNOWN_BAND;
        };
        self.bounded
            .iter()
            .find(|(bound, _)| value < *bound)
            .map(|(_, band)| *band)
            .unwrap_or(self.terminal)
    }

    /// Every band in ladder order, for chart legends.
    pub fn legend(&self) -> impl Iterator<Item = &TierBand> {
        self.bounded
            .iter()
            .map(|(_, band)| band)
            .chain(std::iter::once(&self.terminal))
    }
}

const fn band(color: &'static str, label_pt: &'static str, label_en: &'static str) -> TierBand {
    TierBand {
        color: Color(color),
        label_pt,
        label_en,
    }
}

pub const WIND_SPEED_LADDER: TierLadder = TierLadder {
    bounded: &[
        (10.0, band("#38bdf8", "Fraco", "Light")),
        (20.0, band("#22c55e", "Moderado", "Moderate")),
        (30.0, band("#facc15", "Forte", "Strong")),
        (40.0, band("#f97316", "Muito forte", "Very strong")),
    ],
    terminal: band("#ef4444", "Extremo", "Extreme"),
};

pub const WAVE_PERIOD_LADDER: TierLadder = TierLadder {
    bounded: &[
        (6.0, band("#06b6d4", "<6s", "<6s")),
        (8.0, band("#22c55e", "6–8s", "6–8s")),
        (10.0, band("#facc15", "8–10s", "8–10s")),
        (12.0, band("#f97316", "10–12s", "10–12s")),
        (14.0, band("#ef4444", "12–14s", "12–14s")),
        (16.0, band("#a855f7", "14–16s", "14–16s")),
    ],
    terminal: band("#7e22ce", "16+", "16+"),
};

pub fn speed_tier(speed_kmh: Option<f64>) -> TierBand {
    WIND_SPEED_LADDER.classify(speed_kmh)
}

pub fn period_tier(period_s: Option<f64>) -> TierBand {
    WAVE_PERIOD_LADDER.classify(period_s)
}

pub fn energy_tier_color(level: Option<EnergyLevel>) -> Color {
    match level {
        Some(EnergyLevel::Low) => Color("#2ecc71"),
        Some(EnergyLevel::Medium) => Color("#f1c40f"),
        Some(EnergyLevel::High) => Color("#e74c3c"),
        None => Color::GRAY,
    }
}

pub fn energy_label(level: Option<EnergyLevel>, locale: Locale) -> &'static str {
    match (level, locale) {
        (Some(l), Locale::PtBr) => l.label_pt(),
        (Some(l), Locale::En) => l.label_en(),
        (None, _) => PLACEHOLDER,
    }
}

// ===================== Formatting =====================

/// `value` with fixed decimals and a unit suffix, or `"--"`.
pub fn format_value(value: Option<f64>, decimals: usize, unit: &str) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{:.*}{}", decimals, v, unit),
        None => PLACEHOLDER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::TimeZone;

    fn heights(values: &[f64], start: DateTime<Utc>) -> Vec<TideHeight> {
        values
            .iter()
            .enumerate()
            .map(|(i, h)| TideHeight {
                timestamp: start + Duration::hours(i as i64),
                height_m: *h,
            })
            .collect()
    }

    #[test]
    fn test_sky_rain_outranks_clouds() {
        assert_eq!(sky_condition(Some(80.0), Some(75.0)), SkyCondition::Rain);
    }

    #[test]
    fn test_sky_cloud_ladder() {
        assert_eq!(sky_condition(Some(70.0), Some(69.9)), SkyCondition::Overcast);
        assert_eq!(sky_condition(Some(40.0), None), SkyCondition::PartlyCloudy);
        assert_eq!(sky_condition(Some(10.0), None), SkyCondition::MostlyClear);
        assert_eq!(sky_condition(Some(9.9), None), SkyCondition::Clear);
    }

    #[test]
    fn test_sky_missing_inputs_fall_to_clear() {
        assert_eq!(sky_condition(None, None), SkyCondition::Clear);
        assert_eq!(sky_condition(None, Some(10.0)), SkyCondition::Clear);
        assert_eq!(SkyCondition::Clear.icon(), "☀️");
    }

    #[test]
    fn test_cardinal_boundaries() {
        assert_eq!(cardinal_direction(0.0), Some(CardinalDirection::N));
        assert_eq!(cardinal_direction(44.0), Some(CardinalDirection::N));
        assert_eq!(cardinal_direction(45.0), Some(CardinalDirection::NE));
        assert_eq!(cardinal_direction(360.0), Some(CardinalDirection::N));
        assert_eq!(cardinal_direction(337.5), Some(CardinalDirection::NW));
        assert_eq!(cardinal_direction(359.0), Some(CardinalDirection::NW));
        assert_eq!(cardinal_direction(89.9), Some(CardinalDirection::NE));
        assert_eq!(cardinal_direction(225.0), Some(CardinalDirection::SW));
    }

    #[test]
    fn test_cardinal_normalizes_out_of_range() {
        assert_eq!(cardinal_direction(-90.0), Some(CardinalDirection::W));
        assert_eq!(cardinal_direction(765.0), Some(CardinalDirection::NE));
        assert_eq!(cardinal_direction(f64::NAN), None);
    }

    #[test]
    fn test_cardinal_labels() {
        assert_eq!(cardinal_label(Some(90.0), Locale::PtBr), "L");
        assert_eq!(cardinal_label(Some(270.0), Locale::En), "W");
        assert_eq!(cardinal_label(None, Locale::En), "--");
    }

    #[test]
    fn test_tide_trend_rising_and_falling() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        let now = start + Duration::hours(1);

        let rising = heights(&[1.0, 1.2, 1.5], start);
        assert_eq!(tide_trend(&rising, now), Some(TideTrend::Rising));

        let falling = heights(&[1.5, 1.2, 1.0], start);
        assert_eq!(tide_trend(&falling, now), Some(TideTrend::Falling));
    }

    #[test]
    fn test_tide_trend_needs_neighbours() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        let series = heights(&[1.0, 1.2, 1.5], start);
        assert_eq!(tide_trend(&series, start), None);
        assert_eq!(tide_trend(&series, start + Duration::hours(2)), None);
    }

    #[test]
    fn test_tide_trend_outside_tolerance() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        let series = heights(&[1.0, 1.2, 1.5], start);
        assert_eq!(tide_trend(&series, start + Duration::hours(6)), None);
        assert_eq!(tide_trend(&[], start), None);
    }

    #[test]
    fn test_tide_trend_tolerance_is_exclusive() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        // samples three hours apart so only the middle one can anchor
        let series: Vec<TideHeight> = [0.4, 0.8, 1.3]
            .iter()
            .enumerate()
            .map(|(i, h)| TideHeight {
                timestamp: start + Duration::hours(3 * i as i64),
                height_m: *h,
            })
            .collect();
        let middle = start + Duration::hours(3);

        assert_eq!(tide_trend(&series, middle + Duration::minutes(60)), None);
        assert_eq!(tide_trend(&series, middle - Duration::minutes(60)), None);
        assert_eq!(
            tide_trend(&series, middle + Duration::minutes(59)),
            Some(TideTrend::Rising)
        );
        assert_eq!(
            tide_trend(&series, middle - Duration::minutes(59)),
            Some(TideTrend::Rising)
        );
    }

    #[test]
    fn test_tide_trend_picks_closest_sample() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        // samples every 30 minutes; index 1 and 2 are both within an hour
        let series: Vec<TideHeight> = [0.5, 0.7, 0.6, 0.4]
            .iter()
            .enumerate()
            .map(|(i, h)| TideHeight {
                timestamp: start + Duration::minutes(30 * i as i64),
                height_m: *h,
            })
            .collect();
        // closest to index 2: compares 0.7 -> 0.4
        let now = start + Duration::minutes(55);
        assert_eq!(tide_trend(&series, now), Some(TideTrend::Falling));
    }

    #[test]
    fn test_next_extreme_phrase() {
        let extreme = TideExtreme {
            at: Utc.with_ymd_and_hms(2025, 3, 1, 17, 5, 0).unwrap(),
            kind: ExtremeKind::High,
            height_m: Some(1.8),
        };
        let brt = display_offset(-180);
        assert_eq!(
            next_extreme_phrase(Some(&extreme), brt, Locale::En),
            "fully high at 14:05"
        );
        let low = TideExtreme {
            kind: ExtremeKind::Low,
            ..extreme
        };
        assert_eq!(
            next_extreme_phrase(Some(&low), brt, Locale::PtBr),
            "Maré toda seca às 14:05"
        );
        assert_eq!(next_extreme_phrase(None, brt, Locale::En), "--");
    }

    #[test]
    fn test_speed_ladder() {
        assert_eq!(speed_tier(Some(0.0)).label_en, "Light");
        assert_eq!(speed_tier(Some(9.99)).label_en, "Light");
        assert_eq!(speed_tier(Some(10.0)).label_en, "Moderate");
        assert_eq!(speed_tier(Some(39.9)).label_en, "Very strong");
        assert_eq!(speed_tier(Some(40.0)).label_en, "Extreme");
        assert_eq!(speed_tier(Some(120.0)).color, Color("#ef4444"));
    }

    #[test]
    fn test_unknown_inputs_land_in_gray_bucket() {
        assert_eq!(speed_tier(None), UNKNOWN_BAND);
        assert_eq!(period_tier(Some(f64::INFINITY)), UNKNOWN_BAND);
        assert_eq!(energy_tier_color(None), Color::GRAY);
    }

    #[test]
    fn test_period_ladder() {
        assert_eq!(period_tier(Some(5.0)).color, Color("#06b6d4"));
        assert_eq!(period_tier(Some(6.0)).color, Color("#22c55e"));
        assert_eq!(period_tier(Some(15.9)).color, Color("#a855f7"));
        assert_eq!(period_tier(Some(16.0)).color, Color("#7e22ce"));
        assert_eq!(WAVE_PERIOD_LADDER.legend().count(), 7);
        assert_eq!(WIND_SPEED_LADDER.legend().count(), 5);
    }

    #[test]
    fn test_energy_colors() {
        assert_eq!(energy_tier_color(Some(EnergyLevel::Low)), Color("#2ecc71"));
        assert_eq!(energy_tier_color(Some(EnergyLevel::Medium)), Color("#f1c40f"));
        assert_eq!(energy_tier_color(Some(EnergyLevel::High)), Color("#e74c3c"));
        assert_eq!(energy_label(Some(EnergyLevel::Medium), Locale::PtBr), "Média");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(Some(1.234), 2, " m"), "1.23 m");
        assert_eq!(format_value(Some(40.0), 0, "%"), "40%");
        assert_eq!(format_value(None, 1, " s"), "--");
    }

    #[test]
    fn test_display_offset_out_of_range_is_utc() {
        assert_eq!(display_offset(-180).local_minus_utc(), -10800);
        assert_eq!(display_offset(100_000).local_minus_utc(), 0);
    }
}
