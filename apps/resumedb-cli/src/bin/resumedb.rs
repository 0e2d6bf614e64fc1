use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

use resumedb_cli::{init_logging, load_settings, preview, Services};
use resumedb_vector::{dump_records, list_collections};

#[derive(Parser, Debug)]
#[command(name = "resumedb", about = "Ingest resumes into a vector store and match them against job descriptions")]
struct Cli {
    /// Configuration file (defaults to ./config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract, chunk, embed and store every document in a directory
    Ingest {
        /// Directory to ingest (defaults to `data_directory`)
        dir: Option<PathBuf>,
    },
    /// Find the resumes closest to a query
    Retrieve {
        query: String,
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// List collections and dump stored records
    Inspect {
        #[arg(long)]
        collection: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;
    let writes = matches!(cli.command, Command::Ingest { .. });
    let services = Services::from_settings(settings, writes).await?;

    match cli.command {
        Command::Ingest { dir } => {
            let dir = dir.unwrap_or_else(|| services.settings.data_directory.clone());
            println!("Ingesting from {}", dir.display());
            let pb = ProgressBar::new_spinner();
            pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {pos} files {msg}")?);
            pb.enable_steady_tick(Duration::from_millis(120));

            let report = services.ingester()?.run_with_progress(&dir, &pb).await?;
            println!(
                "Ingested {} files ({} chunks), {} failed",
                report.ingested.len(),
                report.total_chunks(),
                report.failed.len()
            );
            for failed in &report.failed {
                println!("  failed: {}: {}", failed.path.display(), failed.error);
            }
        }
        Command::Retrieve { query, top_k } => {
            let top_k = top_k.unwrap_or(services.settings.top_k);
            let groups = services.store().retrieve_matching_resumes(&query, top_k).await?;
            if groups.is_empty() {
                println!("No matches");
            }
            for (rank, group) in groups.iter().enumerate() {
                println!("{}. {} ({} chunks)", rank + 1, group.resume_id, group.chunks.len());
                for chunk in &group.chunks {
                    println!("   - {}", preview(chunk, 100));
                }
            }
        }
        Command::Inspect { collection } => {
            let collections = list_collections(&services.db).await?;
            println!("Collections: {}", collections.join(", "));
            let name = collection.unwrap_or_else(|| services.settings.collection.clone());
            let records = dump_records(&services.db, &name).await?;
            println!("{} records in {name}", records.len());
            for record in records {
                println!("{}  {}", record.id, serde_json::to_string(&record.metadata)?);
            }
        }
    }
    Ok(())
}
