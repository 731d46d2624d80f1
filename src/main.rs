// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use reduzo::logging::{init_logging, LogTarget};
use reduzo::{check_list, export_to_path, AppConfig, Workspace};

#[derive(Parser)]
#[command(name = "reduzo", version, about = "Procurement desk: quotations, shopping lists and suppliers")]
struct Cli {
    /// Configuration file (defaults to $REDUZO_CONFIG, then ./reduzo.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive dashboard (default)
    Ui,

    /// Pre-purchase checks for one shopping list
    Check { list_id: String },

    /// Write one shopping list as CSV
    Export { list_id: String, path: PathBuf },

    /// Quotation statistics
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let command = cli.command.unwrap_or(Command::Ui);
    let target = match command {
        Command::Ui => LogTarget::FileOnly,
        _ => LogTarget::Terminal,
    };
    init_logging(&config.logging, target).context("Failed to initialise logging")?;

    let workspace = load_workspace(&config)?;

    match command {
        Command::Ui => run_ui_mode(workspace, &config),
        Command::Check { list_id } => run_check(&workspace, &list_id),
        Command::Export { list_id, path } => run_export(&workspace, &list_id, &path),
        Command::Stats => run_stats(workspace),
    }
}

fn load_workspace(config: &AppConfig) -> Result<Workspace> {
    match &config.seed.path {
        Some(path) => Workspace::from_seed_file(path)
            .with_context(|| format!("Failed to load seed data from {}", path.display())),
        None => Ok(Workspace::demo(Utc::now())),
    }
}

fn run_check(workspace: &Workspace, list_id: &str) -> Result<()> {
    let list = workspace.lists.get(list_id)?;
    let report = check_list(list);

    println!("🔍 {}", report.summary());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for finding in &report.findings {
        let item = finding
            .item
            .as_ref()
            .map(|i| format!(" / {}", i))
            .unwrap_or_default();
        println!("[{}] {}{}: {}", finding.severity.as_str(), finding.supplier, item, finding.issue);
        println!("    → {}", finding.recommendation);
    }

    let mark = if report.has_critical_issues() || !report.blocked_suppliers.is_empty() {
        "❌"
    } else if report.is_clean() {
        "✅"
    } else {
        "⚠️ "
    };
    println!("{} {}", mark, report.verdict());
    Ok(())
}

fn run_export(workspace: &Workspace, list_id: &str, path: &Path) -> Result<()> {
    let list = workspace.lists.get(list_id)?;
    let rows = export_to_path(list, path)
        .with_context(|| format!("Failed to export list #{} to {}", list_id, path.display()))?;

    println!("✓ Wrote {} rows to {}", rows, path.display());
    Ok(())
}

fn run_stats(mut workspace: Workspace) -> Result<()> {
    workspace.quotations.refresh_statuses(Utc::now());
    let stats = workspace.quotation_stats();

    println!("📊 Quotations: {} ({} answered)", stats.total, stats.answered);
    println!("   Response rate: {:.1}% ({:?})", stats.response_rate, stats.response_rate_band);
    if let Some(best) = stats.best_price {
        println!("   Best quoted total: R$ {:.2}", best);
    }

    println!("\n⚡ Fastest suppliers");
    for entry in &stats.fastest_suppliers {
        println!("   {:<32} {}", entry.supplier_name, entry.label);
    }

    println!("\n🏆 Top performers");
    for entry in &stats.top_performers {
        println!("   {:<32} {}%", entry.supplier_name, entry.score);
    }
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(mut workspace: Workspace, config: &AppConfig) -> Result<()> {
    workspace.quotations.refresh_statuses(Utc::now());
    tracing::info!("starting dashboard");

    let mut app = ui::App::new(workspace, config.dashboard.public_base_url.clone());
    ui::run_ui(&mut app)?;

    println!("✅ Dashboard closed");
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_workspace: Workspace, _config: &AppConfig) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the API: cargo run --bin reduzo-server --features server");
    std::process::exit(1);
}
