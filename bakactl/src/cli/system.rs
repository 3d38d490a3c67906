use std::path::PathBuf;

use clap::{Args, Subcommand};
use tracing::warn;

use common::Settings;

use super::{Command, CommandError, Context, write_output};
use crate::views;

#[derive(Args, Debug)]
pub struct SystemCommand {
    #[command(subcommand)]
    command: SystemSubCommand,
}

#[derive(Subcommand, Debug)]
#[command(about = "Backend settings and maintenance")]
enum SystemSubCommand {
    #[command(about = "Show system settings")]
    Settings {
        #[arg(long, help = "Print secret values in clear")]
        reveal: bool,
        #[arg(long)]
        json: bool,
    },
    #[command(about = "Change settings, as key=value pairs")]
    Set {
        #[arg(required = true, num_args = 1.., value_parser = parse_key_value)]
        pairs: Vec<(String, String)>,
    },
    #[command(about = "Clear the backend caches")]
    ClearCache,
    #[command(about = "Download a full backup")]
    Backup {
        #[arg(short, long, value_name = "FILE", default_value = "bakabooru-backup.zip")]
        output: PathBuf,
    },
    #[command(about = "Restore a backup archive")]
    Restore {
        file: PathBuf,
        #[arg(long, help = "Do not ask for confirmation")]
        yes: bool,
    },
    #[command(about = "Delete every image and reset the settings")]
    Reset {
        #[arg(long, help = "Do not ask for confirmation")]
        yes: bool,
    },
}

impl Command for SystemCommand {
    fn execute(&self, ctx: &mut Context) -> Result<(), CommandError> {
        let system = ctx.client.system();
        match &self.command {
            SystemSubCommand::Settings { reveal, json } => {
                let settings = system.settings()?;
                if *json {
                    println!("{}", serde_json::to_string_pretty(&settings)?);
                } else {
                    println!("{}", views::settings_table(&settings, *reveal));
                }
            }
            SystemSubCommand::Set { pairs } => {
                let settings: Settings = pairs.iter().cloned().collect();
                system.update_settings(&settings)?;
                println!("Updated {} setting(s)", settings.len());
            }
            SystemSubCommand::ClearCache => {
                system.clear_cache()?;
                println!("Cache cleared");
            }
            SystemSubCommand::Backup { output } => {
                let written = write_output(output, |w| system.download_backup(w))?;
                println!(
                    "Backup written to {} ({})",
                    output.display(),
                    views::format_size(written)
                );
            }
            SystemSubCommand::Restore { file, yes } => {
                if !file.is_file() {
                    return Err(CommandError::Generic(format!(
                        "Backup file not found: {}",
                        file.display()
                    )));
                }
                confirm("Restoring replaces the current gallery", *yes)?;
                system.restore_backup(file)?;
                println!("Backup restored");
            }
            SystemSubCommand::Reset { yes } => {
                confirm("Reset deletes every image and setting", *yes)?;
                system.reset()?;
                warn!("Backend data reset");
                println!("System reset");
            }
        }
        Ok(())
    }
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

fn confirm(what: &str, yes: bool) -> Result<(), CommandError> {
    if yes {
        return Ok(());
    }
    eprint!("{what}. Type 'yes' to continue: ");
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    if answer.trim() == "yes" {
        Ok(())
    } else {
        Err(CommandError::Generic("Aborted".to_string()))
    }
}
