use clap::Parser;
use finboard::application::payload::Payload;
use finboard::application::query_cache::CacheEntry;
use finboard::cli::commands::{Cli, Commands};
use finboard::domain::entities::ai_answer::AiAnswer;
use finboard::domain::entities::asset_quote::{AssetQuote, QuoteRow};
use finboard::domain::entities::market_overview::MarketOverview;
use finboard::domain::entities::price_chart::PriceChart;
use finboard::domain::entities::stock_quote::StockQuote;
use finboard::domain::values::display::{format_change, format_currency, NOT_AVAILABLE};
use finboard::Finboard;
use serde::Serialize;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();

    let fb = match Finboard::from_env() {
        Ok(fb) => fb,
        Err(e) => {
            eprintln!("Error initializing finboard: {e}");
            std::process::exit(1);
        }
    };

    let result = run_command(&fb, cli.command, cli.json).await;
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_command(fb: &Finboard, cmd: Commands, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Ask { query } => {
            let answer = fb.ask(&query).await?;
            if json {
                print_json(&answer)?;
            } else {
                print_answer(&answer);
            }
        }
        Commands::Crypto { limit } => {
            let quotes = fb.crypto(limit).await?;
            if json {
                print_json(&quotes)?;
            } else {
                print_quotes(&quotes);
            }
        }
        Commands::Bitcoin => {
            let snapshot = fb.bitcoin().await?;
            if json {
                print_json(&snapshot)?;
            } else {
                print_rows(&[snapshot.to_row()]);
            }
        }
        Commands::News { query, limit } => {
            let items = fb.news(&query, limit).await?;
            if json {
                print_json(&items)?;
            } else {
                for item in &items {
                    println!("{}", item.title);
                    let meta: Vec<&str> = [item.source.as_deref(), item.published_at.as_deref()]
                        .into_iter()
                        .flatten()
                        .collect();
                    if !meta.is_empty() {
                        println!("  {}", meta.join(" | "));
                    }
                    if let Some(description) = &item.description {
                        println!("  {description}");
                    }
                    println!("  {}", item.url);
                }
            }
        }
        Commands::Search { query } => {
            let payload = fb.search(&query).await?;
            if json {
                print_json(&payload)?;
            } else {
                println!("Results for {:?}:", payload.query);
                for (i, hit) in payload.results.iter().enumerate() {
                    println!("{}. {}\n   {}", i + 1, hit.title, hit.url);
                    if let Some(snippet) = &hit.snippet {
                        println!("   {snippet}");
                    }
                }
            }
        }
        Commands::Health => {
            let healthy = fb.health().await?;
            if json {
                print_json(&serde_json::json!({ "healthy": healthy }))?;
            } else {
                println!("{}", if healthy { "healthy" } else { "unhealthy" });
            }
            if !healthy {
                return Err("backend reported unhealthy".into());
            }
        }
        Commands::Stocks => {
            let stocks = fb.stocks().await?;
            if json {
                print_json(&stocks)?;
            } else {
                print_stocks(&stocks);
            }
        }
        Commands::Market => {
            let overview = fb.market_overview().await?;
            if json {
                print_json(&overview)?;
            } else {
                print_overview(&overview);
            }
        }
        Commands::Chart { coin_id, days } => {
            let chart = fb.chart(&coin_id, days).await?;
            if json {
                print_json(&chart)?;
            } else {
                print_chart(&chart);
            }
        }
        Commands::Watch {
            limit,
            interval_secs,
            updates,
        } => {
            if interval_secs == 0 {
                return Err("--interval-secs must be at least 1".into());
            }
            let mut subscription = fb.watch_crypto(limit, Duration::from_secs(interval_secs));
            let first = subscription.settled().await;
            print_entry(&first, json)?;
            let mut seen = 1;
            while updates.map_or(true, |max| seen < max) {
                tokio::select! {
                    entry = subscription.changed() => {
                        let Some(entry) = entry else { break };
                        if entry.status.is_settled() {
                            print_entry(&entry, json)?;
                            seen += 1;
                        }
                    }
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
        }
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_entry(entry: &CacheEntry<Payload>, json: bool) -> Result<(), serde_json::Error> {
    if json {
        return print_json(&serde_json::json!({
            "key": entry.key,
            "status": entry.status,
            "fetched_at": entry.fetched_at,
            "error": entry.error.as_ref().map(|e| e.to_string()),
            "value": entry.value,
        }));
    }

    let fetched = entry
        .fetched_at
        .map(|t| t.format("%H:%M:%S UTC").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    println!("[{}] fetched {fetched}", entry.status);
    match (&entry.value, &entry.error) {
        (None, Some(err)) => println!("Failed to load: {err}"),
        (None, None) => println!("No data yet"),
        (Some(value), err) => {
            if let (true, Some(err)) = (entry.is_outdated(), err) {
                println!("Showing last known data, refresh failed: {err}");
            }
            if let Some(quotes) = value.as_quotes() {
                print_quotes(quotes);
            }
        }
    }
    println!();
    Ok(())
}

fn print_answer(answer: &AiAnswer) {
    println!("{}", answer.plain_summary());
    if !answer.key_facts.is_empty() {
        println!();
        for fact in &answer.key_facts {
            println!("  {:<24} {:>16}  ({})", fact.label, fact.value, fact.polarity);
        }
    }
    if !answer.sources.is_empty() {
        println!();
        for source in &answer.sources {
            println!("[{}] {} {}", source.ordinal, source.title, source.url);
        }
    }
}

fn print_quotes(quotes: &[AssetQuote]) {
    println!(
        "{:<5} {:<8} {:<20} {:>14} {:>9} {:>10} {:>10}",
        "#", "SYMBOL", "NAME", "PRICE", "24H", "VOLUME", "MCAP"
    );
    for quote in quotes {
        let rank = quote
            .market_cap_rank
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".into());
        let row = quote.to_row();
        println!(
            "{rank:<5} {:<8} {:<20} {:>14} {:>9} {:>10} {:>10}",
            row.symbol, row.name, row.price, row.change, row.volume, row.market_cap
        );
    }
}

fn print_rows(rows: &[QuoteRow]) {
    println!(
        "{:<8} {:<20} {:>14} {:>9} {:>10} {:>10}",
        "SYMBOL", "NAME", "PRICE", "24H", "VOLUME", "MCAP"
    );
    for row in rows {
        println!(
            "{:<8} {:<20} {:>14} {:>9} {:>10} {:>10}",
            row.symbol, row.name, row.price, row.change, row.volume, row.market_cap
        );
    }
}

fn print_stocks(stocks: &[StockQuote]) {
    println!("{:<8} {:>14} {:>9} {:>10}", "SYMBOL", "PRICE", "CHANGE", "VOLUME");
    for stock in stocks {
        let (symbol, price, change, volume) = stock.display_fields();
        println!("{symbol:<8} {price:>14} {change:>9} {volume:>10}");
    }
}

fn print_overview(overview: &MarketOverview) {
    if let Some(ts) = overview.timestamp {
        println!("As of {}", ts.to_rfc3339());
    }
    if !overview.crypto.is_empty() {
        println!("\nCrypto");
        print_quotes(&overview.crypto);
    }
    if !overview.stocks.is_empty() {
        println!("\nStocks");
        print_stocks(&overview.stocks);
    }
    if !overview.forex.is_empty() {
        println!("\nForex");
        println!("{:<10} {:>12} {:>9}", "PAIR", "RATE", "CHANGE");
        for fx in &overview.forex {
            let (pair, rate, change) = fx.display_fields();
            println!("{pair:<10} {rate:>12} {change:>9}");
        }
    }
}

fn print_chart(chart: &PriceChart) {
    let change = chart
        .period_change()
        .map(format_change)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    println!("{} over {} days: {change}", chart.symbol, chart.days);
    let first = chart.prices.first().map(|(_, p)| format_currency(*p));
    let last = chart.prices.last().map(|(_, p)| format_currency(*p));
    if let (Some(first), Some(last)) = (first, last) {
        println!("  {first} -> {last} ({} points)", chart.prices.len());
    }
}
