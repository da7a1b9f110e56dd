mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "taxtract",
    version,
    about = "Extract withholding-tax slip fields from PDF batches"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract fields from one or more PDFs and write the spreadsheet and renamed archive
    Extract {
        /// PDF files, in upload order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Built-in template (v1, v2) or path to a JSON template
        #[arg(short, long, default_value = taxtract_core::templates::builtin::DEFAULT_PRESET)]
        template: String,

        /// Directory to write "Extracted File.xlsx" and "Renamed_PDFs.zip" into
        #[arg(short = 'd', long, default_value = ".")]
        out_dir: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Process files in the given order instead of newest first
        #[arg(long)]
        keep_order: bool,

        /// Record failing files in the results instead of aborting
        #[arg(long)]
        continue_on_error: bool,

        /// Skip writing the renamed PDF archive
        #[arg(long)]
        no_archive: bool,
    },
    /// Inspect and validate templates
    Templates {
        #[command(subcommand)]
        action: TemplatesAction,
    },
}

#[derive(Subcommand)]
enum TemplatesAction {
    /// List built-in templates
    List,
    /// Show the regions of a template
    Show {
        /// Built-in name (e.g., "v2") or path to a JSON template
        template: String,
    },
    /// Validate a custom template file
    Validate {
        /// Path to JSON template file
        file: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract {
            files,
            template,
            out_dir,
            output,
            keep_order,
            continue_on_error,
            no_archive,
        } => commands::extract::run(commands::extract::ExtractArgs {
            files,
            template,
            out_dir,
            output_format: output,
            keep_order,
            continue_on_error,
            write_archive: !no_archive,
        }),
        Commands::Templates { action } => match action {
            TemplatesAction::List => commands::templates::list(),
            TemplatesAction::Show { template } => commands::templates::show(&template),
            TemplatesAction::Validate { file } => commands::templates::validate(&file),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
