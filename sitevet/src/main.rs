use anyhow::Context;
use clap::ArgMatches;
use colored::Colorize;
use commands::command_argument_builder;
use indicatif::{ProgressBar, ProgressStyle};
use sitevet_core::report::{generate_report, save_report, ReportData, ReportFormat};
use sitevet_core::scan::{execute_scan, normalize_target, ScanOptions};
use sitevet_core::print_banner;
use sitevet_scanner::intruder::{default_payloads, run_intruder};
use sitevet_scanner::repeater::{run_repeater, RepeaterOptions};
use sitevet_scanner::{build_client, ScanOutcome};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

mod commands;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let matches = command_argument_builder().get_matches();
    let quiet = matches.get_flag("quiet");

    if !quiet {
        print_banner();
    }

    run(&matches, quiet).await
}

async fn run(matches: &ArgMatches, quiet: bool) -> anyhow::Result<()> {
    let target = normalize_target(matches.get_one::<String>("URL").expect("URL is required"));
    let depth = *matches.get_one::<usize>("depth").expect("has default");
    let timeout = *matches.get_one::<u64>("timeout").expect("has default");
    let max_urls = matches.get_one::<usize>("max-urls").copied();
    let iterations = *matches.get_one::<usize>("iterations").expect("has default");
    let output = matches.get_one::<PathBuf>("output");
    let format = ReportFormat::from_str(matches.get_one::<String>("format").expect("has default"))
        .expect("clap restricts the format values");

    if !quiet {
        println!("Scanning {} (depth {})\n", target.bold(), depth);
    }

    // Single spinner fed by the crawler's progress callback.
    let spinner = if quiet {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("static template"),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting crawl...");
        Some(Arc::new(pb))
    };

    let progress_callback = spinner.as_ref().map(|pb| {
        let pb = pb.clone();
        let callback: sitevet_scanner::crawler::ProgressCallback =
            Arc::new(move |visited, url| {
                pb.set_message(format!("[{}] {}", visited, url));
            });
        callback
    });

    let options = ScanOptions {
        url: target.clone(),
        max_depth: depth,
        max_urls,
        timeout_secs: timeout,
    };

    let outcome = match execute_scan(options, progress_callback).await {
        Ok(outcome) => outcome,
        Err(e) => {
            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }
            eprintln!("{} {}", "error:".red().bold(), e);
            std::process::exit(1);
        }
    };

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    if !quiet {
        print_summary(&outcome);
    }

    let mut data = ReportData::new(&target, outcome);

    if let Some(param) = matches.get_one::<String>("intruder") {
        if !quiet {
            println!("Running intruder on {} with param {}", target, param);
        }
        let client = build_client(timeout);
        match run_intruder(&client, &target, param, &default_payloads()).await {
            Ok(entries) => data = data.with_intruder(entries),
            Err(e) => eprintln!("{} intruder failed: {}", "error:".red().bold(), e),
        }
    }

    if matches.get_flag("repeater") {
        if !quiet {
            println!("Running repeater on {} ({} iterations)", target, iterations);
        }
        let client = build_client(timeout);
        let repeater_options = RepeaterOptions {
            url: target.clone(),
            method: "GET".to_string(),
            iterations,
            ..Default::default()
        };
        data = data.with_repeater(run_repeater(&client, &repeater_options).await);
    }

    let report = generate_report(&data, &format)
        .map_err(|e| anyhow::anyhow!("failed to generate report: {}", e))?;

    match output {
        Some(path) => {
            save_report(&report, path)
                .with_context(|| format!("failed to save report to {}", path.display()))?;
            if !quiet {
                println!("\nReport saved to {}", path.display());
            }
        }
        None => print!("{}", report),
    }

    Ok(())
}

fn print_summary(outcome: &ScanOutcome) {
    let total_issues: usize = outcome.findings.iter().map(|f| f.issue_count()).sum();

    println!("{}", "Scan complete.".green().bold());
    println!("  Pages visited:   {}", outcome.pages_visited);
    println!(
        "  Vulnerable URLs: {}",
        if outcome.findings.is_empty() {
            outcome.findings.len().to_string().green()
        } else {
            outcome.findings.len().to_string().red()
        }
    );
    println!("  Total issues:    {}", total_issues);
    println!("  Forms found:     {}\n", outcome.forms.len());
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
