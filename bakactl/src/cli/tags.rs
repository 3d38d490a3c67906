use clap::{Args, Subcommand};

use common::TagType;

use super::{Command, CommandError, Context};
use crate::views;

#[derive(Args, Debug)]
pub struct TagsCommand {
    #[command(subcommand)]
    command: TagsSubCommand,
}

#[derive(Subcommand, Debug)]
#[command(about = "Browse tags")]
enum TagsSubCommand {
    #[command(about = "List tags, optionally filtered by name")]
    List {
        #[arg(help = "Name filter")]
        query: Option<String>,
        #[arg(long = "type", value_name = "TYPE", help = "Only show this tag type")]
        kind: Option<TagType>,
        #[arg(short, long)]
        quiet: bool,
        #[arg(long, conflicts_with = "quiet")]
        json: bool,
    },
}

impl Command for TagsCommand {
    fn execute(&self, ctx: &mut Context) -> Result<(), CommandError> {
        match &self.command {
            TagsSubCommand::List {
                query,
                kind,
                quiet,
                json,
            } => {
                let mut tags = ctx.client.tags().list(query.as_deref())?;
                if let Some(kind) = kind {
                    tags.retain(|t| &t.kind == kind);
                }
                let palette = ctx.palette();
                if *json {
                    println!("{}", serde_json::to_string_pretty(&tags)?);
                } else if tags.is_empty() {
                    println!("No tags found");
                } else if *quiet {
                    for tag in &tags {
                        println!("{}", palette.tag(&tag.name, &tag.kind));
                    }
                } else {
                    println!("{}", views::tags_table(&tags, palette));
                }
            }
        }
        Ok(())
    }
}
