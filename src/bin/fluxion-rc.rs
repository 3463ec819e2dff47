use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use fluxion_rc::validation::{vdi6007, ReferenceTable};
use fluxion_rc::Scenario;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fluxion-rc")]
#[command(about = "Reduced-order RC thermal zone simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Markdown,
    Csv,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs VDI 6007 test case 1 and compares it with reference results
    Validate {
        /// Reference table with day blocks 1, 10 and 60
        #[arg(short, long)]
        reference: Option<PathBuf>,

        /// Accepted hourly deviation in K
        #[arg(short, long, default_value_t = vdi6007::DEFAULT_TOLERANCE)]
        tolerance: f64,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Markdown)]
        format: Format,

        /// Output file path
        #[arg(short, long)]
        output_file: Option<PathBuf>,
    },
    /// Runs a scenario given as JSON and writes per-step results as CSV
    Simulate {
        /// Scenario with zone parameters, config and boundary series
        #[arg(short, long)]
        scenario: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output_file: Option<PathBuf>,
    },
}

fn emit(output: String, output_file: Option<PathBuf>) -> anyhow::Result<()> {
    if let Some(path) = output_file {
        std::fs::write(&path, output).with_context(|| format!("writing {:?}", path))?;
        println!("Results saved to {:?}", path);
    } else {
        println!("{}", output);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate {
            reference,
            tolerance,
            format,
            output_file,
        } => {
            let table = reference
                .map(|path| {
                    ReferenceTable::from_path(&path)
                        .with_context(|| format!("loading reference {:?}", path))
                })
                .transpose()?;

            let report = vdi6007::validate_case01(table.as_ref(), tolerance)?;
            let output = match format {
                Format::Markdown => report.to_markdown(),
                Format::Csv => report.to_csv(),
                Format::Json => report.to_json()?,
            };
            emit(output, output_file)?;

            if table.is_some() && !report.passed() {
                anyhow::bail!(
                    "{} exceeds the tolerance of {} K (max deviation {:.4} K)",
                    report.case_id,
                    tolerance,
                    report.max_deviation().unwrap_or(f64::NAN)
                );
            }
        }
        Commands::Simulate {
            scenario,
            output_file,
        } => {
            let text = std::fs::read_to_string(&scenario)
                .with_context(|| format!("reading scenario {:?}", scenario))?;
            let scenario: Scenario =
                serde_json::from_str(&text).context("parsing scenario JSON")?;
            let output = scenario.run()?;
            emit(output.to_csv(), output_file)?;
        }
    }

    Ok(())
}
