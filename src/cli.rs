use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tabled::{settings::Style, Table, Tabled};

use crate::research::{
    PageCapture, ResearchConfig, ResearchPipeline, ResearchReport, SearchResult,
};

#[derive(Parser)]
#[command(
    name = "web-research",
    version,
    about = "Open-web research from the command line"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Research a topic end to end and print the report
    Research {
        topic: String,
        /// Number of sources to analyze in depth
        #[arg(short = 'n', long, default_value_t = 5)]
        sources: usize,
        /// Skip link, media and structured-data extraction
        #[arg(long)]
        shallow: bool,
        /// Overall deadline in seconds
        #[arg(long)]
        deadline: Option<u64>,
    },
    /// Query the search backends and list results
    Search {
        query: String,
        #[arg(short = 'c', long, default_value_t = 10)]
        count: usize,
    },
    /// Fetch one URL and print the extracted page
    Fetch {
        url: String,
        /// Also extract links, media and structured data
        #[arg(long)]
        deep: bool,
    },
    /// Probe a URL with a HEAD request
    Check { url: String },
}

#[derive(Tabled)]
struct SearchResultDisplay {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "📰 Title")]
    title: String,
    #[tabled(rename = "🔗 URL")]
    url: String,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Research {
            topic,
            sources,
            shallow,
            deadline,
        } => {
            let mut config = ResearchConfig::default();
            config.concurrency.deadline_secs = deadline;

            let pipeline = ResearchPipeline::new(config)?;
            let report = pipeline.research(&topic, sources, !shallow).await?;
            print_report(&report)?;
        }
        Command::Search { query, count } => {
            let pipeline = ResearchPipeline::new(ResearchConfig::default())?;

            let spinner = network_spinner(&format!("Searching for '{}'...", query));
            let results = pipeline.search(&query, count).await;
            spinner.finish_with_message(
                format!("Found {} results", results.len()).green().to_string(),
            );

            display_results_table(&results);
        }
        Command::Fetch { url, deep } => {
            let pipeline = ResearchPipeline::new(ResearchConfig::default())?;

            let spinner = network_spinner(&format!("Fetching {}...", url));
            match pipeline.extract(&url, deep).await {
                Ok(capture) => {
                    spinner.finish_with_message("Page extracted".green().to_string());
                    print_capture(&capture)?;
                }
                Err(e) => {
                    spinner.finish_with_message("✗ Fetch failed".red().to_string());
                    return Err(e.into());
                }
            }
        }
        Command::Check { url } => {
            let pipeline = ResearchPipeline::new(ResearchConfig::default())?;
            let status = pipeline.check_url(&url).await?;
            println!(
                "{} {} {}",
                if status.status_code < 400 { "✅" } else { "❌" },
                status.status_code,
                status.final_url
            );
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }

    Ok(())
}

fn network_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn display_results_table(results: &[SearchResult]) {
    if results.is_empty() {
        println!("{} No results found", "⚠".yellow());
        return;
    }

    let rows: Vec<SearchResultDisplay> = results
        .iter()
        .map(|result| SearchResultDisplay {
            position: result.position,
            title: clip(&result.title, 60),
            url: clip(&result.url, 60),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::modern());

    println!("{}", "Search Results:".cyan().bold());
    println!("{}", table);
}

fn print_report(report: &ResearchReport) -> anyhow::Result<()> {
    println!();
    println!("{}", "Research Report".cyan().bold());
    println!("{}", "=".repeat(50));
    println!("📋 Topic: {}", report.topic);
    println!(
        "🏷  Quality: {}",
        report.executive_summary.research_quality
    );
    println!(
        "📊 Sources: {} analyzed of {} discovered",
        report.research_metrics.sources_analyzed, report.research_metrics.sources_discovered
    );
    println!(
        "✅ Success rate: {:.1}%",
        report.research_metrics.success_rate
    );
    for insight in &report.key_insights {
        println!("💡 {}", insight);
    }
    println!();
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

fn print_capture(capture: &PageCapture) -> anyhow::Result<()> {
    println!();
    println!("{}", "Page Extraction".cyan().bold());
    println!("{}", "=".repeat(50));
    println!("🔗 URL: {}", capture.url);
    println!(
        "📊 Status: {} {}",
        if capture.status_code < 400 { "✅" } else { "❌" },
        capture.status_code
    );
    if !capture.metadata.title.is_empty() {
        println!("📰 Title: {}", capture.metadata.title);
    }
    println!("   • Word count: {}", capture.content.word_count);
    println!(
        "   • Reading time: {} minutes",
        capture.analysis.estimated_reading_minutes
    );
    if capture.total_links > 0 {
        println!("   • Links found: {}", capture.total_links);
    }
    println!();
    println!("{}", serde_json::to_string_pretty(capture)?);
    Ok(())
}

fn clip(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        format!("{}…", text.chars().take(max_chars).collect::<String>())
    }
}
