use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "medassist", version, about = "Medical document analysis")]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze documents and save a report
    Analyze {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(long, default_value = "reports", help = "Directory for saved reports")]
        out: PathBuf,
        #[arg(long, default_value = "patient", help = "Patient name used in the report")]
        patient: String,
        #[arg(long, default_value_t = false, help = "Print the report without saving it")]
        no_save: bool,
    },
    /// Print the detected kind of each path
    Classify {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Print a previously saved JSON report
    Show {
        report: PathBuf,
    },
}
