use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;

use soccer_odds::{EventRow, OddsApi, OddsApiConfig};

const DEFAULT_LEAGUE: &str = "ENG-Premier League";

fn main() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if let Some(unknown) = unknown_flag(&args) {
        return Err(anyhow!(
            "unknown argument {unknown}; usage: soccer_odds [--league <name>]... [--force-cache] [--no-store] [--sports] [--leagues]"
        ));
    }

    let mut cfg = OddsApiConfig::from_env().context("invalid odds api configuration")?;
    if has_flag(&args, "--force-cache") {
        cfg.force_cache = true;
    }
    if has_flag(&args, "--no-store") {
        cfg.no_store = true;
    }
    let api = OddsApi::new(cfg).context("failed to set up odds api client")?;

    if has_flag(&args, "--leagues") {
        let data_dir = &api.config().data_dir;
        for league in api.leagues().leagues() {
            let sport_key = api.leagues().sport_key(league)?;
            let cached = if api.cache_path(league).is_file() { "cached" } else { "-" };
            println!("{league:<30} {sport_key:<36} {cached}");
        }
        println!("cache dir: {}", data_dir.display());
        return Ok(());
    }

    if has_flag(&args, "--sports") {
        let sports = api.get_sports().context("sports request failed")?;
        for sport in sports.iter().filter(|s| s.active) {
            println!("{:<40} {:<20} {}", sport.key, sport.group, sport.title);
        }
        return Ok(());
    }

    let mut leagues = parse_league_args(&args);
    if leagues.is_empty() {
        leagues.push(DEFAULT_LEAGUE.to_string());
    }
    for league in &leagues {
        let rows = api
            .read_bookie_odds(league)
            .with_context(|| format!("failed to read odds for {league}"))?;
        println!("{league}: {} events", rows.len());
        for row in &rows {
            println!("  {}", format_row(row));
        }
    }
    Ok(())
}

fn format_row(row: &EventRow) -> String {
    format!(
        "{:<34} {:>24} - {:<24} {:>6.2} {:>6.2} {:>6.2}",
        row.id.to_string(),
        row.home_team,
        row.away_team,
        row.bookie_home_odds,
        row.bookie_draw_odds,
        row.bookie_away_odds
    )
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn parse_league_args(args: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(name) = arg.strip_prefix("--league=") {
            let trimmed = name.trim();
            if !trimmed.is_empty() {
                out.push(trimmed.to_string());
            }
        }
        if arg == "--league" {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                out.push(next.trim().to_string());
            }
        }
    }
    out
}

fn unknown_flag(args: &[String]) -> Option<&str> {
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        match arg.as_str() {
            "--league" => skip_next = true,
            "--force-cache" | "--no-store" | "--sports" | "--leagues" => {}
            other if other.starts_with("--league=") => {}
            other => return Some(other),
        }
    }
    None
}
