use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use explicasurf_core::{AppError, Config, SkillLevel};
use explicasurf_forecast::derive::{display_offset, format_value};
use explicasurf_forecast::{
    build_charts, conditions_card, CachePolicy, ChartOptions, ChartSet, DayOffset, ForecastCache,
    ForecastClient, ForecastSession, ForecastView, LoadOutcome, Selection, SurferProfile,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Surf conditions explained for your level", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the conditions card and chart summaries
    Show {
        /// Skill level (iniciante, intermediario, avancado)
        #[arg(short, long)]
        level: Option<SkillLevel>,

        /// Day offset: 0 today, 1 tomorrow, 2 the day after
        #[arg(short, long)]
        day: Option<u8>,

        /// Print machine-readable JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Ask for an AI explanation personalized for a surfer
    Explain {
        #[arg(short, long)]
        level: Option<SkillLevel>,

        #[arg(short, long)]
        day: Option<u8>,

        #[arg(long, default_value = "Surfista")]
        name: String,

        /// regular or goofy
        #[arg(long, default_value = "regular")]
        stance: String,

        #[arg(long, default_value_t = 0)]
        experience_months: u32,
    },
    /// Wake the backend up ahead of the first request
    Warmup,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    explicasurf_core::init()?;
    let (config, _) = Config::load_validated().map_err(report)?;

    let client = ForecastClient::new(&config.backend).map_err(report)?;
    let cache = Arc::new(ForecastCache::new(CachePolicy::from(&config.cache)));
    let session = ForecastSession::new(client, cache);

    match cli.command {
        Command::Show { level, day, json } => {
            let selection = resolve_selection(&config, level, day)?;
            show(&config, &session, selection, json).await
        }
        Command::Explain {
            level,
            day,
            name,
            stance,
            experience_months,
        } => {
            let selection = resolve_selection(&config, level, day)?;
            let profile = SurferProfile {
                name,
                stance,
                experience_months,
            };
            session.select(selection);
            let explanation = session
                .explain(&profile)
                .await
                .map_err(report)?;
            println!("{}", explanation.as_deref().unwrap_or("Sem explicação disponível."));
            Ok(())
        }
        Command::Warmup => {
            session
                .client()
                .warmup()
                .await
                .map_err(report)?;
            println!("Backend pronto em {}", session.client().base_url());
            Ok(())
        }
    }
}

fn resolve_selection(config: &Config, level: Option<SkillLevel>, day: Option<u8>) -> Result<Selection> {
    let level = level.unwrap_or(config.defaults.level);
    let day = DayOffset::new(day.unwrap_or(config.defaults.day)).map_err(report)?;
    Ok(Selection::new(level, day))
}

/// Log the full error and hand back its user-facing message.
fn report(err: impl Into<AppError>) -> anyhow::Error {
    let err = err.into();
    tracing::error!("{}", err);
    anyhow::anyhow!(err.user_message())
}

async fn show(
    config: &Config,
    session: &ForecastSession,
    selection: Selection,
    json: bool,
) -> Result<()> {
    let view = match session.request(selection).await {
        Ok(LoadOutcome::Applied(view)) => view,
        Ok(LoadOutcome::Stale) => anyhow::bail!("A seleção mudou durante o carregamento"),
        Err(e) => return Err(report(e)),
    };

    let opts = ChartOptions {
        offset: display_offset(config.display.utc_offset_minutes),
        locale: config.display.locale,
        wind_window: config.charts.wind_window,
        now: Utc::now(),
    };
    let charts = build_charts(&view, &opts);

    if json {
        print_json(&view, &charts, selection, &opts)
    } else {
        print_text(&view, &charts, selection, &opts);
        Ok(())
    }
}

fn print_text(view: &ForecastView, charts: &ChartSet<'_>, selection: Selection, opts: &ChartOptions) {
    let card = conditions_card(view.card(selection.day), opts.offset, opts.locale);

    println!(
        "ExplicaSurf - {} - {}",
        selection.level.display_name(),
        selection.day.label_pt()
    );
    println!();
    println!("  Temperatura:   {}", card.temperature);
    println!("  Céu:           {} {}", card.sky_icon, card.sky);
    println!("  Chuva:         {} ({})", card.rain_chance, card.precipitation);
    println!("  Ondas:         {} / {}", card.wave_height, card.period);
    println!("  Swell:         {}", card.swell_direction);
    println!("  Vento:         {}", card.wind);
    println!("  Energia:       {}", card.energy);
    println!("  Maré agora:    {}", card.tide_now);
    println!("  Próxima maré:  {}", card.tide_next);

    if let Some(text) = &view.explanation {
        println!();
        println!("{}", text);
    }

    println!();
    let max_wave = charts.wave.iter().map(|p| p.height_m).reduce(f64::max);
    println!(
        "Ondas: {} pontos, máx {}",
        charts.wave.len(),
        format_value(max_wave, 1, " m")
    );
    println!(
        "Vento: média {}, máx {}",
        format_value(charts.wind.summary.average_kmh, 1, " km/h"),
        format_value(charts.wind.summary.max_kmh, 1, " km/h")
    );
    println!("Maré: {}", charts.tide.trend_label);
    for marker in &charts.tide.extremes {
        println!("  {}", marker.label);
    }

    for bucket in &charts.days.buckets {
        let (weekday, date) = bucket.legend(opts.locale);
        println!("{} {}: {} amostras", weekday, date, bucket.len());
    }
}

fn print_json(
    view: &ForecastView,
    charts: &ChartSet<'_>,
    selection: Selection,
    opts: &ChartOptions,
) -> Result<()> {
    let days: Vec<_> = charts
        .days
        .buckets
        .iter()
        .map(|b| {
            serde_json::json!({
                "day": b.day,
                "start_index": b.start_index,
                "len": b.len(),
            })
        })
        .collect();

    let output = serde_json::json!({
        "selection": selection,
        "card": conditions_card(view.card(selection.day), opts.offset, opts.locale),
        "explanation": view.explanation,
        "wave": charts.wave,
        "wind": charts.wind,
        "tide": charts.tide,
        "weather": charts.weather,
        "energy": charts.energy,
        "days": days,
        "boundaries": charts.days.boundaries,
        "nearest_now": charts.days.nearest_now,
        "locale": opts.locale,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
