use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ingredient_tagger_clean::{
    CleanConfig, IdScheme, LabelNormalizer, clean_file, clean_files_batch, load_config_from_file,
};

#[derive(Parser)]
#[command(name = "tagger-clean")]
#[command(about = "Clean tagged-ingredient phrase data for sequence-tagger training")]
struct Cli {
    /// TOML configuration file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean one token file
    Clean {
        /// Token-per-line input (six columns, no header)
        input: PathBuf,
        /// Cleaned phrase_id,text,label output
        output: PathBuf,
        /// Also write the grouped table (all input columns plus phrase id)
        #[arg(long)]
        grouped_output: Option<PathBuf>,
        /// Phrase id scheme: counter or hash
        #[arg(long)]
        id_scheme: Option<IdScheme>,
        /// Accept token indexes that do not count up by one
        #[arg(long)]
        no_sequence_check: bool,
    },
    /// Clean several token files in parallel
    Batch {
        /// Input files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Directory for <stem>.cleaned.csv outputs
        #[arg(long)]
        output_dir: PathBuf,
    },
    /// Print the canonical form of a raw label
    NormalizeLabel {
        /// Raw label, e.g. B-INDEX
        label: String,
    },
}

fn load_config(path: Option<&Path>) -> Result<CleanConfig, Box<dyn std::error::Error>> {
    match path {
        Some(p) => Ok(load_config_from_file(p)?),
        None => Ok(CleanConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Clean {
            input,
            output,
            grouped_output,
            id_scheme,
            no_sequence_check,
        } => {
            if let Some(scheme) = id_scheme {
                config.grouping.id_scheme = scheme;
            }
            if no_sequence_check {
                config.grouping.check_sequence = false;
            }
            let report = clean_file(&input, &output, grouped_output.as_deref(), &config)?;
            print!("{report}");
            println!(
                "Wrote {} rows ({} phrases) to {}",
                report.rows_out(),
                report.phrases_out(),
                output.display()
            );
        }
        Commands::Batch { inputs, output_dir } => {
            let outcomes = clean_files_batch(&inputs, &output_dir, &config)?;
            let mut failed = 0;
            for outcome in &outcomes {
                match &outcome.result {
                    Ok(report) => println!(
                        "{} -> {}: {} rows, {} phrases",
                        outcome.input.display(),
                        outcome.output.display(),
                        report.rows_out(),
                        report.phrases_out()
                    ),
                    Err(e) => {
                        failed += 1;
                        eprintln!("{}: {}", outcome.input.display(), e);
                    }
                }
            }
            if failed > 0 {
                return Err(format!("{failed} of {} files failed", outcomes.len()).into());
            }
        }
        Commands::NormalizeLabel { label } => {
            let normalizer = LabelNormalizer::new(&config.labels);
            match normalizer.normalize(&label) {
                Some(canonical) => println!("{canonical}"),
                None => return Err(format!("unknown label '{label}'").into()),
            }
        }
    }

    Ok(())
}
