mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use medassist_core::agents::{classify, progress_channel};
use medassist_core::report::{load_report, render_text, ReportWriter};
use medassist_core::{AnalysisConfig, AnalysisReport, Coordinator};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    medassist_core::init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            paths,
            out,
            patient,
            no_save,
        } => analyze(paths, out, patient, no_save, cli.json).await,
        Commands::Classify { paths } => {
            for path in &paths {
                println!("{}\t{}", classify(path), path.display());
            }
            Ok(())
        }
        Commands::Show { report } => load_report(&report).and_then(|r| print_report(&r, "-", cli.json)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn analyze(
    paths: Vec<PathBuf>,
    out: PathBuf,
    patient: String,
    no_save: bool,
    json: bool,
) -> Result<(), String> {
    let config = AnalysisConfig::load();
    let coordinator = Coordinator::new(&config)?;

    let abort = Arc::new(AtomicBool::new(false));
    let ctrl_c_flag = abort.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("[Host] Interrupt received, stopping after the current document");
            ctrl_c_flag.store(true, Ordering::SeqCst);
        }
    });

    let (sink, mut events) = progress_channel(64);
    let run = tokio::spawn(async move {
        coordinator
            .analyze_documents_with_abort(&paths, Some(&sink), &abort)
            .await
    });

    // The sender drops when the run finishes, closing the channel
    while let Some(event) = events.recv().await {
        if json {
            continue;
        }
        match event.current_file {
            Some(file) => eprintln!("[{}/{}] {}: {}", event.current, event.total, file, event.message),
            None => eprintln!("[{}/{}] {}", event.current, event.total, event.message),
        }
    }

    let report = run
        .await
        .map_err(|e| format!("Analysis task failed: {}", e))?;

    print_report(&report, &patient, json)?;

    if !no_save {
        let (json_path, text_path) = ReportWriter::new(out).write(&report, &patient)?;
        eprintln!("Saved {}", json_path.display());
        eprintln!("Saved {}", text_path.display());
    }
    Ok(())
}

fn print_report(report: &AnalysisReport, patient: &str, json: bool) -> Result<(), String> {
    if json {
        let body = serde_json::to_string_pretty(report)
            .map_err(|e| format!("Failed to serialize report: {}", e))?;
        println!("{}", body);
    } else {
        let date = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        println!("{}", render_text(report, patient, &date));
    }
    Ok(())
}
