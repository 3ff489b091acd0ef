// Bilingual identity card extraction from the command line

use clap::{Parser, Subcommand};
use idscan::{
    models::{BilingualRecord, Field, Script},
    processing::ImageUpload,
    Config, ExtractionError, IdCardExtractor,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "idscan", version, about = "Extract identity card fields in Latin and Arabic script")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print a readable report instead of JSON
    #[arg(long, global = true)]
    report: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run OCR on a card image and extract its fields
    Scan {
        image: PathBuf,
        /// IMAGE holds a base64-encoded payload instead of raw bytes
        #[arg(long)]
        base64: bool,
        /// File name for a base64 payload, used for the extension check
        #[arg(long, requires = "base64")]
        name: Option<String>,
    },
    /// Extract fields from text that was already recognized
    Parse {
        #[arg(long)]
        latin: PathBuf,
        #[arg(long)]
        arabic: PathBuf,
    },
}

// Function to print a detailed extraction report
fn print_detailed_report(record: &BilingualRecord) {
    println!("\n===============================================");
    println!("      IDENTITY CARD EXTRACTION REPORT");
    println!("===============================================\n");

    for (title, script) in [("LATIN SCRIPT", Script::Latin), ("ARABIC SCRIPT", Script::Arabic)] {
        println!("{}:", title);
        let fields = record.fields(script);
        for field in Field::ALL {
            let value = fields.get(field);
            println!(
                "  {:<16} {}",
                field.label(script),
                if value.is_empty() { "-" } else { value }
            );
        }
        println!();
    }
}

fn run(cli: &Cli) -> Result<BilingualRecord, ExtractionError> {
    let config = Config::load(cli.config.as_deref())?;
    let extractor = IdCardExtractor::new(config)?;

    match &cli.command {
        Command::Scan { image, base64, name } => {
            let upload = if *base64 {
                ImageUpload::from_base64_path(image, name.as_deref())?
            } else {
                ImageUpload::from_path(image)?
            };
            extractor.extract(&upload)
        }
        Command::Parse { latin, arabic } => {
            let latin = std::fs::read_to_string(latin)?;
            let arabic = std::fs::read_to_string(arabic)?;
            extractor.extract_from_text(&latin, &arabic)
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(record) => {
            if cli.report {
                print_detailed_report(&record);
                return ExitCode::SUCCESS;
            }
            match record.to_json() {
                Ok(json) => {
                    println!("{}", json);
                    ExitCode::SUCCESS
                }
                Err(err) => {
                    eprintln!("Failed to serialize record: {}", err);
                    ExitCode::FAILURE
                }
            }
        }
        Err(err) => {
            eprintln!("{}", err.to_json());
            ExitCode::FAILURE
        }
    }
}
