//! Chart- and card-ready records built from canonical data.
//!
//! Adapters are pure: they expect reconciled input, pick the fields their
//! visualization needs and attach colors and labels from [`crate::derive`].

use chrono::{DateTime, FixedOffset, Utc};
use explicasurf_core::Locale;
use serde::Serialize;

use crate::derive::{
    cardinal_label, energy_label, energy_tier_color, format_value, next_extreme_phrase,
    period_tier, sky_condition, speed_tier, tide_trend, trend_label, Color, SkyCondition,
    TideTrend, PLACEHOLDER,
};
use crate::segment::{nearest_to, segment_by_day, SegmentedSeries};
use crate::types::{
    CanonicalMeasurement, EnergyLevel, ExtremeKind, ForecastSample, ForecastView, TideNow,
    TideTimeline,
};

/// Rendering context shared by every adapter.
#[derive(Debug, Clone, Copy)]
pub struct ChartOptions {
    pub offset: FixedOffset,
    pub locale: Locale,
    /// Leading samples kept by the wind chart
    pub wind_window: usize,
    pub now: DateTime<Utc>,
}

// ===================== Card =====================

/// The "conditions" card: every indicator formatted, `"--"` when unknown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionsCard {
    pub temperature: String,
    pub sky_icon: &'static str,
    pub sky: String,
    pub rain_chance: String,
    pub precipitation: String,
    pub wave_height: String,
    pub period: String,
    pub swell_direction: String,
    pub wind: String,
    pub energy: String,
    pub tide_now: String,
    pub tide_next: String,
}

pub fn conditions_card(
    m: &CanonicalMeasurement,
    offset: FixedOffset,
    locale: Locale,
) -> ConditionsCard {
    let sky = sky_condition(m.clouds_pct, m.precip_probability_pct);

    let swell_direction = match m.swell_direction_deg {
        Some(deg) => format!(
            "{:.0}° ({})",
            deg,
            cardinal_label(Some(deg), locale)
        ),
        None => PLACEHOLDER.to_string(),
    };

    let wind = match (m.wind_speed_kmh, m.wind_direction_deg) {
        (None, _) => PLACEHOLDER.to_string(),
        (Some(speed), None) => format!("{:.1} km/h", speed),
        (Some(speed), Some(deg)) => format!(
            "{:.1} km/h @ {:.0}° ({})",
            speed,
            deg,
            cardinal_label(Some(deg), locale)
        ),
    };

    let energy = match m.energy {
        Some(e) => format!("{:.1} ({})", e, energy_label(m.energy_level, locale)),
        None => PLACEHOLDER.to_string(),
    };

    ConditionsCard {
        temperature: format_value(m.temp_c, 1, "°C"),
        sky_icon: sky.icon(),
        sky: format_value(m.clouds_pct, 0, "%"),
        rain_chance: format_value(m.precip_probability_pct, 0, "%"),
        precipitation: format_value(m.precip_mm, 1, " mm"),
        wave_height: format_value(m.wave_height_m, 1, " m"),
        period: format_value(m.wave_period_s, 1, " s"),
        swell_direction,
        wind,
        energy,
        tide_now: format_value(m.tide_now.map(|t| t.height_m), 2, " m"),
        tide_next: next_extreme_phrase(m.tide_next_extreme.as_ref(), offset, locale),
    }
}

// ===================== Wave =====================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WavePoint {
    pub timestamp: DateTime<Utc>,
    pub height_m: f64,
    pub period_s: Option<f64>,
    pub color: Color,
    pub label: &'static str,
}

/// Wave height bars colored by period. Samples without a height are skipped.
pub fn wave_points(series: &[ForecastSample], locale: Locale) -> Vec<WavePoint> {
    series
        .iter()
        .filter_map(|s| {
            let height_m = s.measurement.wave_height_m?;
            let tier = period_tier(s.measurement.wave_period_s);
            Some(WavePoint {
                timestamp: s.timestamp,
                height_m,
                period_s: s.measurement.wave_period_s,
                color: tier.color,
                label: tier.label(locale),
            })
        })
        .collect()
}

// ===================== Wind =====================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindPoint {
    pub timestamp: DateTime<Utc>,
    pub speed_kmh: Option<f64>,
    pub direction_deg: Option<f64>,
    pub direction_label: &'static str,
    pub color: Color,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindSummary {
    /// Mean over samples that carry a speed
    pub average_kmh: Option<f64>,
    pub max_kmh: Option<f64>,
    /// Index into `points` closest to now
    pub now_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindChart {
    pub points: Vec<WindPoint>,
    pub summary: WindSummary,
}

pub fn wind_chart(series: &[ForecastSample], opts: &ChartOptions) -> WindChart {
    let window = &series[..series.len().min(opts.wind_window)];

    let points: Vec<WindPoint> = window
        .iter()
        .map(|s| {
            let tier = speed_tier(s.measurement.wind_speed_kmh);
            WindPoint {
                timestamp: s.timestamp,
                speed_kmh: s.measurement.wind_speed_kmh,
                direction_deg: s.measurement.wind_direction_deg,
                direction_label: cardinal_label(s.measurement.wind_direction_deg, opts.locale),
                color: tier.color,
                label: tier.label(opts.locale),
            }
        })
        .collect();

    let speeds: Vec<f64> = points.iter().filter_map(|p| p.speed_kmh).collect();
    let average_kmh = if speeds.is_empty() {
        None
    } else {
        Some(speeds.iter().sum::<f64>() / speeds.len() as f64)
    };
    let max_kmh = speeds.iter().copied().reduce(f64::max);

    WindChart {
        summary: WindSummary {
            average_kmh,
            max_kmh,
            now_index: nearest_to(window, opts.now),
        },
        points,
    }
}

// ===================== Tide =====================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TidePoint {
    pub timestamp: DateTime<Utc>,
    pub height_m: f64,
    pub color: Color,
    /// Trend phrase shown in the point's tooltip
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TideMarker {
    pub at: DateTime<Utc>,
    pub height_m: Option<f64>,
    pub kind: ExtremeKind,
    pub color: Color,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TideChart {
    pub points: Vec<TidePoint>,
    pub extremes: Vec<TideMarker>,
    pub trend: Option<TideTrend>,
    pub trend_label: &'static str,
    pub current_height_m: Option<f64>,
}

pub fn tide_chart(tide: &TideTimeline, current: Option<TideNow>, opts: &ChartOptions) -> TideChart {
    let trend = tide_trend(&tide.heights, opts.now);
    // unknown trend draws in the falling color
    let line = trend.unwrap_or(TideTrend::Falling).color();
    let label = trend_label(trend, opts.locale);

    let points = tide
        .heights
        .iter()
        .map(|h| TidePoint {
            timestamp: h.timestamp,
            height_m: h.height_m,
            color: line,
            label,
        })
        .collect();

    let extremes = tide
        .extremes
        .iter()
        .map(|e| {
            let (arrow, color) = match e.kind {
                ExtremeKind::High => ("⬆", Color("#1e3a8a")),
                ExtremeKind::Low => ("⬇", Color("#0ea5e9")),
            };
            TideMarker {
                at: e.at,
                height_m: e.height_m,
                kind: e.kind,
                color,
                label: format!(
                    "{} {} • {}",
                    arrow,
                    format_value(e.height_m, 1, " m"),
                    e.at.with_timezone(&opts.offset).format("%H:%M")
                ),
            }
        })
        .collect();

    TideChart {
        points,
        extremes,
        trend,
        trend_label: label,
        current_height_m: current.map(|t| t.height_m),
    }
}

// ===================== Weather =====================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherPoint {
    pub timestamp: DateTime<Utc>,
    pub precip_probability_pct: Option<f64>,
    pub clouds_pct: Option<f64>,
    pub precip_mm: Option<f64>,
    pub temp_c: Option<f64>,
    pub sky: SkyCondition,
    pub icon: &'static str,
    pub color: Color,
    pub label: &'static str,
}

const PRECIP_LINE: Color = Color("#0077ff");

pub fn weather_points(series: &[ForecastSample], locale: Locale) -> Vec<WeatherPoint> {
    series
        .iter()
        .map(|s| {
            let m = &s.measurement;
            let sky = sky_condition(m.clouds_pct, m.precip_probability_pct);
            WeatherPoint {
                timestamp: s.timestamp,
                precip_probability_pct: m.precip_probability_pct,
                clouds_pct: m.clouds_pct,
                precip_mm: m.precip_mm,
                temp_c: m.temp_c,
                sky,
                icon: sky.icon(),
                color: PRECIP_LINE,
                label: sky.label(locale),
            }
        })
        .collect()
}

// ===================== Energy =====================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyPoint {
    pub timestamp: DateTime<Utc>,
    pub energy: Option<f64>,
    pub level: Option<EnergyLevel>,
    pub color: Color,
    pub label: &'static str,
}

pub fn energy_points(series: &[ForecastSample], locale: Locale) -> Vec<EnergyPoint> {
    series
        .iter()
        .map(|s| EnergyPoint {
            timestamp: s.timestamp,
            energy: s.measurement.energy,
            level: s.measurement.energy_level,
            color: energy_tier_color(s.measurement.energy_level),
            label: energy_label(s.measurement.energy_level, locale),
        })
        .collect()
}

// ===================== Bundle =====================

/// Everything the dashboard draws for one forecast.
#[derive(Debug, Clone)]
pub struct ChartSet<'a> {
    pub wave: Vec<WavePoint>,
    pub wind: WindChart,
    pub tide: TideChart,
    pub weather: Vec<WeatherPoint>,
    pub energy: Vec<EnergyPoint>,
    pub days: SegmentedSeries<'a, ForecastSample>,
}

pub fn build_charts<'a>(view: &'a ForecastView, opts: &ChartOptions) -> ChartSet<'a> {
    ChartSet {
        wave: wave_points(&view.series, opts.locale),
        wind: wind_chart(&view.series, opts),
        tide: tide_chart(&view.tide, view.day.tide_now, opts),
        weather: weather_points(&view.series, opts.locale),
        energy: energy_points(&view.series, opts.locale),
        days: segment_by_day(&view.series, opts.offset, opts.now),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::derive::display_offset;
    use crate::types::{TideExtreme, TideHeight};
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn opts(now: DateTime<Utc>) -> ChartOptions {
        ChartOptions {
            offset: display_offset(0),
            locale: Locale::En,
            wind_window: 72,
            now,
        }
    }

    fn sample(hour: i64, m: CanonicalMeasurement) -> ForecastSample {
        ForecastSample {
            timestamp: start() + Duration::hours(hour),
            measurement: m,
        }
    }

    #[test]
    fn test_card_all_missing_shows_placeholders() {
        let card = conditions_card(&CanonicalMeasurement::default(), display_offset(0), Locale::En);
        assert_eq!(card.temperature, "--");
        assert_eq!(card.wind, "--");
        assert_eq!(card.energy, "--");
        assert_eq!(card.tide_next, "--");
        assert_eq!(card.sky_icon, "☀️");
    }

    #[test]
    fn test_card_formats_values() {
        let m = CanonicalMeasurement {
            temp_c: Some(23.44),
            clouds_pct: Some(45.0),
            wave_period_s: Some(9.0),
            swell_direction_deg: Some(135.0),
            wind_speed_kmh: Some(12.0),
            wind_direction_deg: Some(200.0),
            energy: Some(150.3),
            energy_level: Some(EnergyLevel::High),
            tide_now: Some(TideNow { height_m: 0.8 }),
            ..Default::default()
        };
        let card = conditions_card(&m, display_offset(0), Locale::PtBr);
        assert_eq!(card.temperature, "23.4°C");
        assert_eq!(card.sky_icon, "⛅");
        assert_eq!(card.sky, "45%");
        assert_eq!(card.period, "9.0 s");
        assert_eq!(card.swell_direction, "135° (SE)");
        assert_eq!(card.wind, "12.0 km/h @ 200° (S)");
        assert_eq!(card.energy, "150.3 (Alta)");
        assert_eq!(card.tide_now, "0.80 m");
    }

    #[test]
    fn test_wave_points_skip_missing_height() {
        let series = vec![
            sample(
                0,
                CanonicalMeasurement {
                    wave_height_m: Some(1.2),
                    wave_period_s: Some(11.0),
                    ..Default::default()
                },
            ),
            sample(1, CanonicalMeasurement::default()),
            sample(
                2,
                CanonicalMeasurement {
                    wave_height_m: Some(0.9),
                    ..Default::default()
                },
            ),
        ];
        let points = wave_points(&series, Locale::En);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].color, Color("#f97316"));
        assert_eq!(points[0].label, "10–12s");
        assert_eq!(points[1].color, Color::GRAY);
    }

    #[test]
    fn test_wind_chart_window_and_summary() {
        let series: Vec<ForecastSample> = (0..100)
            .map(|h| {
                sample(
                    h,
                    CanonicalMeasurement {
                        wind_speed_kmh: if h == 1 { None } else { Some((h % 3) as f64 * 10.0) },
                        wind_direction_deg: Some(90.0),
                        ..Default::default()
                    },
                )
            })
            .collect();

        let chart = wind_chart(&series, &opts(start() + Duration::hours(5)));
        assert_eq!(chart.points.len(), 72);
        assert_eq!(chart.summary.now_index, Some(5));
        assert_eq!(chart.summary.max_kmh, Some(20.0));
        assert_eq!(chart.points[1].label, "--");
        assert_eq!(chart.points[2].label, "Strong");
        assert_eq!(chart.points[0].direction_label, "E");
    }

    #[test]
    fn test_wind_chart_empty() {
        let chart = wind_chart(&[], &opts(start()));
        assert!(chart.points.is_empty());
        assert_eq!(chart.summary.average_kmh, None);
        assert_eq!(chart.summary.max_kmh, None);
        assert_eq!(chart.summary.now_index, None);
    }

    #[test]
    fn test_tide_chart_trend_and_markers() {
        let tide = TideTimeline {
            heights: [0.4, 0.7, 1.1]
                .iter()
                .enumerate()
                .map(|(i, h)| TideHeight {
                    timestamp: start() + Duration::hours(i as i64),
                    height_m: *h,
                })
                .collect(),
            extremes: vec![TideExtreme {
                at: start() + Duration::minutes(150),
                kind: ExtremeKind::High,
                height_m: Some(1.84),
            }],
        };
        let chart = tide_chart(
            &tide,
            Some(TideNow { height_m: 0.7 }),
            &opts(start() + Duration::hours(1)),
        );
        assert_eq!(chart.trend, Some(TideTrend::Rising));
        assert_eq!(chart.trend_label, "rising");
        assert!(chart.points.iter().all(|p| p.color == Color("#38bdf8")));
        assert!(chart.points.iter().all(|p| p.label == "rising"));
        assert_eq!(chart.extremes[0].label, "⬆ 1.8 m • 14:30");
        assert_eq!(chart.current_height_m, Some(0.7));
    }

    #[test]
    fn test_tide_points_without_trend() {
        let tide = TideTimeline {
            heights: vec![TideHeight {
                timestamp: start(),
                height_m: 0.9,
            }],
            extremes: Vec::new(),
        };
        let chart = tide_chart(&tide, None, &opts(start() + Duration::hours(5)));
        assert_eq!(chart.trend, None);
        assert_eq!(chart.points[0].label, "no trend data");
        assert_eq!(chart.points[0].color, TideTrend::Falling.color());
    }

    #[test]
    fn test_weather_and_energy_points() {
        let series = vec![sample(
            0,
            CanonicalMeasurement {
                precip_probability_pct: Some(80.0),
                clouds_pct: Some(90.0),
                energy: Some(42.0),
                energy_level: Some(EnergyLevel::Low),
                ..Default::default()
            },
        )];
        let weather = weather_points(&series, Locale::En);
        assert_eq!(weather[0].sky, SkyCondition::Rain);
        assert_eq!(weather[0].label, "rain");

        let energy = energy_points(&series, Locale::En);
        assert_eq!(energy[0].color, Color("#2ecc71"));
        assert_eq!(energy[0].label, "Low");
    }

    #[test]
    fn test_build_charts_bundles_everything() {
        let view = ForecastView {
            series: (0..30)
                .map(|h| {
                    sample(
                        h,
                        CanonicalMeasurement {
                            wave_height_m: Some(1.0),
                            ..Default::default()
                        },
                    )
                })
                .collect(),
            ..Default::default()
        };
        let charts = build_charts(&view, &opts(start()));
        assert_eq!(charts.wave.len(), 30);
        assert_eq!(charts.weather.len(), 30);
        // 12:00 + 29h crosses one midnight
        assert_eq!(charts.days.buckets.len(), 2);
        assert_eq!(charts.days.boundaries.len(), 1);
        assert_eq!(charts.tide.trend, None);
    }
}
