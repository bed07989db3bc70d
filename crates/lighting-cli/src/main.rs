use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use colored::*;
use lighting_core::{report, CalculationRequest, Catalog, LightingPlan, Planner, RunRecord};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "lighting")]
#[command(about = "Lighting Planner - Fixture counts and layouts for a room", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan fixture layouts for a room
    Calculate {
        /// Input file (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for result (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also export the results as CSV
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Also export a PDF report
        #[arg(long)]
        pdf: Option<PathBuf>,

        /// Append this run to a JSON run log
        #[arg(long)]
        log: Option<PathBuf>,

        /// Alternate catalog (YAML or JSON)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// List known place types
    Places {
        /// Alternate catalog (YAML or JSON)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Generate SVG layout drawing from a plan
    Generate {
        /// Input plan file (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output SVG file
        #[arg(short, long)]
        output: PathBuf,

        /// Alternate catalog (YAML or JSON)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Export every logged run to CSV
    History {
        /// Run log written by `calculate --log`
        #[arg(short, long)]
        log: PathBuf,

        /// Output CSV file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Calculate {
            input,
            output,
            csv,
            pdf,
            log,
            catalog,
        } => {
            calculate_command(input, output, csv, pdf, log, catalog)?;
        }
        Commands::Places { catalog } => {
            places_command(catalog)?;
        }
        Commands::Generate {
            input,
            output,
            catalog,
        } => {
            generate_command(input, output, catalog)?;
        }
        Commands::History { log, output } => {
            history_command(log, output)?;
        }
    }

    Ok(())
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml")
    )
}

fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    let Some(path) = path else {
        return Ok(Catalog::default());
    };
    let content = std::fs::read_to_string(path)?;
    let catalog = if is_yaml(path) {
        Catalog::from_yaml_str(&content)?
    } else {
        Catalog::from_json_str(&content)?
    };
    Ok(catalog)
}

fn load_request(path: &Path) -> Result<CalculationRequest> {
    let content = std::fs::read_to_string(path)?;
    parse_request(&content, is_yaml(path))
}

fn parse_request(content: &str, yaml: bool) -> Result<CalculationRequest> {
    let request: CalculationRequest = if yaml {
        serde_yaml::from_str(content)?
    } else {
        serde_json::from_str(content)?
    };
    Ok(request)
}

/// A missing log file is an empty log.
fn read_run_log(path: &Path) -> Result<Vec<RunRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(&content)?)
}

fn append_run_log(path: &Path, record: RunRecord) -> Result<()> {
    let mut records = read_run_log(path)?;
    records.push(record);
    std::fs::write(path, serde_json::to_string_pretty(&records)?)?;
    Ok(())
}

fn calculate_command(
    input: PathBuf,
    output: Option<PathBuf>,
    csv: Option<PathBuf>,
    pdf: Option<PathBuf>,
    log: Option<PathBuf>,
    catalog: Option<PathBuf>,
) -> Result<()> {
    println!("{}", "🔍 Loading input...".bright_blue());

    let request = load_request(&input)?;
    let planner = Planner::new(load_catalog(catalog.as_deref())?)?;

    println!("  Place: {}", request.place.bright_white().bold());
    println!(
        "  Sides: {} m, height {} m",
        request
            .sides
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(" / ")
            .bright_white(),
        request.height.to_string().bright_white()
    );
    println!();

    println!("{}", "💡 Planning layouts...".bright_blue());

    let plan = planner.plan(&request.place, request.sides, request.height)?;

    println!();
    println!("{}", "✅ Planning complete!".bright_green().bold());
    println!();

    println!("{}", "📊 Results:".bright_yellow().bold());
    println!(
        "  Zone: {}, area {:.2} m², bounding {} x {} m",
        plan.zone.to_string().bright_white(),
        plan.area,
        plan.length,
        plan.width
    );
    if plan.results.is_empty() {
        println!("  {}", "No combination meets the target".bright_red());
    }
    for result in &plan.results {
        println!(
            "    • {} {} W @ {} lm/W: {} fixtures ({} x {}), {:.1} lx, {} W total",
            result.luminaire.bright_white(),
            result.power,
            result.efficacy,
            result.fixtures.to_string().bright_white().bold(),
            result.columns,
            result.rows,
            result.average_lux,
            result.total_power
        );
    }
    println!();

    if let Some(csv_path) = csv {
        let content = report::results_csv(&plan.results, &request.project_info)?;
        std::fs::write(&csv_path, content)?;
        println!(
            "💾 Saved CSV to {}",
            csv_path.display().to_string().bright_white()
        );
    }

    if let Some(pdf_path) = pdf {
        let content = report::results_pdf(&plan.results, &request.project_info)?;
        std::fs::write(&pdf_path, content)?;
        println!(
            "💾 Saved PDF report to {}",
            pdf_path.display().to_string().bright_white()
        );
    }

    if let Some(log_path) = log {
        append_run_log(
            &log_path,
            RunRecord {
                project_info: request.project_info.clone(),
                results: plan.results.clone(),
            },
        )?;
        println!(
            "🗂  Logged run to {}",
            log_path.display().to_string().bright_white()
        );
    }

    // Save output
    let json = serde_json::to_string_pretty(&plan)?;
    if let Some(output_path) = output {
        std::fs::write(&output_path, json)?;
        println!(
            "💾 Saved result to {}",
            output_path.display().to_string().bright_white()
        );
    } else {
        // Print to stdout
        println!("{}", json);
    }

    Ok(())
}

fn places_command(catalog: Option<PathBuf>) -> Result<()> {
    let catalog = load_catalog(catalog.as_deref())?;

    println!("{}", "🏢 Place types:".bright_yellow().bold());
    for name in catalog.places() {
        let profile = catalog.profile_for(name)?;
        println!(
            "  • {}: {} lx, uniformity {}",
            name.bright_white(),
            profile.required_lux,
            profile.required_uniformity
        );
    }

    Ok(())
}

fn generate_command(input: PathBuf, output: PathBuf, catalog: Option<PathBuf>) -> Result<()> {
    println!("{}", "🔍 Loading plan...".bright_blue());

    let content = std::fs::read_to_string(&input)?;
    let plan: LightingPlan = serde_json::from_str(&content)?;
    let catalog = load_catalog(catalog.as_deref())?;

    println!("{}", "🎨 Generating SVG...".bright_blue());

    let svg = report::layout_svg(&plan, &catalog)?;
    std::fs::write(&output, svg)?;

    println!();
    println!(
        "{} Saved SVG to {}",
        "✅".bright_green(),
        output.display().to_string().bright_white()
    );

    Ok(())
}

fn history_command(log: PathBuf, output: PathBuf) -> Result<()> {
    let records = read_run_log(&log)?;
    if records.is_empty() {
        bail!("No runs recorded in {}", log.display());
    }

    let csv = report::history_csv(&records)?;
    std::fs::write(&output, csv)?;

    println!(
        "{} Exported {} runs to {}",
        "✅".bright_green(),
        records.len(),
        output.display().to_string().bright_white()
    );

    Ok(())
}
