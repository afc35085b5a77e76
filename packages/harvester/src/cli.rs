//! Command-line interface for the harvester.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{validate_bwb_id, validate_date};
use crate::error::{HarvesterError, Result};
use crate::harvester::download_law;
use crate::yaml::save_yaml;

/// RegelRecht Harvester - Download Dutch legislation from BWB repository.
#[derive(Parser)]
#[command(name = "regelrecht-harvester")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download a law by BWB ID and convert to YAML.
    Download {
        /// BWB identifier (e.g., BWBR0018451)
        bwb_id: String,

        /// Effective date in YYYY-MM-DD format (default: today)
        #[arg(short, long)]
        date: Option<String>,

        /// Output directory (default: regulation/nl/)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Download {
            bwb_id,
            date,
            output,
        } => download_command(&bwb_id, date.as_deref(), output.as_deref()),
    }
}

/// Execute the download command.
fn download_command(
    bwb_id: &str,
    date: Option<&str>,
    output: Option<&std::path::Path>,
) -> Result<()> {
    // Use today if no date provided
    let effective_date = date
        .map(String::from)
        .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string());

    // Validate inputs before making HTTP requests
    validate_bwb_id(bwb_id)?;
    validate_date(&effective_date)?;

    // Validate output directory exists (if specified) before downloading
    if let Some(output_dir) = output {
        if !output_dir.exists() {
            return Err(HarvesterError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Output directory does not exist: {}", output_dir.display()),
            )));
        }
        if !output_dir.is_dir() {
            return Err(HarvesterError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Output path is not a directory: {}", output_dir.display()),
            )));
        }
    }

    println!(
        "{} {} for date {}",
        style("Downloading").bold(),
        style(bwb_id).cyan(),
        style(&effective_date).green()
    );
    println!();

    // Create progress spinner
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );

    // Download and parse
    pb.set_message("Downloading WTI metadata...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let law = match download_law(bwb_id, &effective_date) {
        Ok(law) => law,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.set_message("Processing articles...");

    println!("  Title: {}", style(&law.metadata.title).green());
    println!("  Type: {}", law.metadata.regulatory_layer.as_str());
    println!("  Articles: {}", law.articles.len());
    if !law.warnings.is_empty() {
        println!("  Warnings: {}", style(law.warnings.len()).yellow().bold());
    }

    // Save to YAML
    pb.set_message("Saving YAML...");

    let output_path = match save_yaml(&law, &effective_date, output) {
        Ok(path) => path,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.finish_and_clear();

    println!();
    println!(
        "{} {}",
        style("Saved to:").green().bold(),
        output_path.display()
    );

    Ok(())
}
