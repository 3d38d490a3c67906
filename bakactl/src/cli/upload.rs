use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::{Args, Subcommand};
use tracing::{info, warn};
use uuid::Uuid;

use client::{QueueError, UploadFilter, UploadQueue, collect_files};

use super::{Command, CommandError, Context};
use crate::views;

const PROGRESS_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Args, Debug)]
pub struct UploadCommand {
    #[command(subcommand)]
    command: UploadSubCommand,
}

#[derive(Subcommand, Debug)]
#[command(about = "Upload images and manage server-side upload tasks")]
enum UploadSubCommand {
    #[command(about = "Upload files, or every file under directories")]
    Files {
        #[arg(required = true, num_args = 1..)]
        paths: Vec<PathBuf>,
        #[arg(short, long, help = "Walk directories recursively")]
        recursive: bool,
        #[arg(short = 'j', long, help = "Parallel uploads, defaults to upload.concurrency")]
        concurrency: Option<usize>,
        #[arg(long, help = "Skip the extension and size checks")]
        no_check: bool,
        #[arg(long)]
        json: bool,
    },
    #[command(about = "Show pending, processing and failed server tasks")]
    Tasks {
        #[arg(long)]
        json: bool,
    },
    #[command(about = "Retry a failed task")]
    Retry { id: Uuid },
    #[command(about = "Delete a task")]
    Delete { id: Uuid },
    #[command(about = "Clear all failed tasks")]
    Clear,
}

impl Command for UploadCommand {
    fn execute(&self, ctx: &mut Context) -> Result<(), CommandError> {
        match &self.command {
            UploadSubCommand::Files {
                paths,
                recursive,
                concurrency,
                no_check,
                json,
            } => upload_files(
                ctx,
                paths,
                *recursive || ctx.config.upload.recursive,
                concurrency.unwrap_or(ctx.config.upload.concurrency),
                ctx.config.upload.check && !*no_check,
                *json,
            )?,
            UploadSubCommand::Tasks { json } => {
                let tasks = ctx.client.upload().tasks()?;
                if *json {
                    println!("{}", serde_json::to_string_pretty(&tasks)?);
                } else if tasks.is_idle() && tasks.failed_tasks.is_empty() {
                    println!("No upload tasks");
                } else {
                    println!("{}", views::tasks_table(&tasks));
                }
            }
            UploadSubCommand::Retry { id } => {
                ctx.client.upload().retry(id)?;
                println!("Task {id} queued again");
            }
            UploadSubCommand::Delete { id } => {
                ctx.client.upload().delete(id)?;
                println!("Task {id} deleted");
            }
            UploadSubCommand::Clear => {
                ctx.client.upload().clear_failed()?;
                println!("Failed tasks cleared");
            }
        }
        Ok(())
    }
}

fn upload_files(
    ctx: &Context,
    paths: &[PathBuf],
    recursive: bool,
    concurrency: usize,
    check: bool,
    json: bool,
) -> Result<(), CommandError> {
    let files = collect_files(paths, recursive)?;
    if files.is_empty() {
        return Err(CommandError::Generic("No files to upload".to_string()));
    }

    let mut queue = UploadQueue::new(Arc::clone(&ctx.client), concurrency)?;
    if check {
        let settings = ctx.client.system().settings()?;
        queue = queue.with_filter(UploadFilter::from_settings(&settings));
    }
    info!(
        "Uploading {} file(s) with {} worker(s)",
        files.len(),
        queue.concurrency()
    );

    let mut rejected = 0_usize;
    for file in files {
        match queue.add(file) {
            Ok(()) => {}
            Err(QueueError::Rejected { path, reason }) => {
                warn!("Skipping {}: {reason}", path.display());
                rejected = rejected.saturating_add(1);
            }
            Err(e @ (QueueError::Closed | QueueError::Spawn(_))) => return Err(e.into()),
        }
    }

    let show_progress = !json && io::stderr().is_terminal();
    while show_progress {
        let stats = queue.stats();
        eprint!("\r{}", views::queue_progress(&stats));
        io::stderr().flush()?;
        if stats.is_idle() {
            eprintln!();
            break;
        }
        thread::sleep(PROGRESS_INTERVAL);
    }

    let report = queue.finish();
    if json {
        let failures: Vec<serde_json::Value> = report
            .failures
            .iter()
            .map(|f| serde_json::json!({ "path": f.path, "error": f.error }))
            .collect();
        let summary = serde_json::json!({
            "completed": report.stats.completed,
            "failed": report.stats.failed,
            "rejected": rejected,
            "failures": failures,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        views::print_upload_report(&report);
        if rejected > 0 {
            println!("{rejected} file(s) skipped by the upload checks");
        }
    }

    if report.stats.failed > 0 {
        return Err(CommandError::Generic(format!(
            "{} upload(s) failed",
            report.stats.failed
        )));
    }
    Ok(())
}
