//! Runs a fixed set of example queries against a catalog file and prints the
//! parsed vector, the top matches and each match's score breakdown.
//!
//! Usage: `query_demo [catalog.json] [top_n]` (catalog defaults to the configured path).

use std::path::PathBuf;

use esg_stock_ranker::config::AppConfig;
use esg_stock_ranker::ranker::{Direction, ScoreBreakdown};
use esg_stock_ranker::{load_catalog_file, RankedResult, RankingEngine};

const EXAMPLE_QUERIES: &[&str] = &[
    "Find stocks with low risk and high environmental scores",
    "Show me companies with excellent governance and social responsibility",
    "I want to invest in companies that are environmentally friendly with minimal controversy",
    "Which companies have the best overall ESG ratings?",
    "Find technology companies with strong social scores",
    "I need stocks with very low risk that are still good for the environment",
    "Show me health care companies with strong governance",
    "Which companies have the highest environmental scores but also low risk?",
    "Find companies with extremely good social responsibility",
    "I want to invest in utilities with strong environmental practices",
];

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let mut args = std::env::args().skip(1);
    let path = match args.next() {
        Some(p) => PathBuf::from(p),
        None => AppConfig::load()?.catalog_path,
    };
    let top_n: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(5);

    let catalog = load_catalog_file(&path)?;
    println!("Loaded {} stocks from {}", catalog.len(), path.display());
    let engine = RankingEngine::with_catalog(catalog);

    for query in EXAMPLE_QUERIES {
        run_query(&engine, query, top_n);
    }
    Ok(())
}

fn run_query(engine: &RankingEngine, query: &str, top_n: usize) {
    println!("\n{}", "=".repeat(80));
    println!("QUERY: \"{query}\"");
    println!("{}", "=".repeat(80));

    let (vector, breakdowns) = engine.explain(query, top_n);

    println!("\nQUERY VECTOR:");
    if vector.is_empty() {
        println!("  No specific criteria identified in query");
    }
    for (key, weight) in vector.weights() {
        println!("  {key}: {weight:.2}");
    }
    if let Some(sectors) = vector.specified_sectors() {
        println!("  specified_sectors: {sectors:?}");
    }

    let results = engine.rank(query);
    if results.is_empty() {
        println!("\nNo matching stocks found for this query.");
        return;
    }

    println!("\nTop {} matches:", top_n.min(results.len()));
    for (i, (result, breakdown)) in results.iter().zip(breakdowns.iter()).enumerate() {
        print_result(i + 1, result, breakdown);
        println!("{}", "-".repeat(40));
    }
}

fn print_result(index: usize, r: &RankedResult, b: &ScoreBreakdown) {
    println!(
        "{index}. {} - {} (Score: {:.3})",
        r.symbol, r.name, r.score
    );
    println!("   Sector: {}", r.sector);
    println!(
        "   ESG Scores: Environmental={:.2}, Social={:.2}, Governance={:.2}",
        r.environment_score, r.social_score, r.governance_score
    );
    println!("   Total ESG: {:.2}, Risk Level: {}", r.total_esg, r.overall_risk);
    println!("\n   SCORE CALCULATION:");
    for c in &b.contributions {
        let direction = match c.direction {
            Direction::HigherIsBetter => "Higher is better",
            Direction::LowerIsBetter => "Lower is better",
        };
        println!(
            "   - {}: {:.2} x weight {:.2} -> contribution: {:.3} ({direction})",
            c.field, c.value, c.weight, c.contribution
        );
    }
}
