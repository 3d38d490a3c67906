use std::path::PathBuf;

use clap::{Args, Subcommand};

use common::{ImageUpdate, TagRef, TagType};

use super::{Command, CommandError, Context, write_output};
use crate::views;

#[derive(Args, Debug)]
pub struct ImagesCommand {
    #[command(subcommand)]
    command: ImagesSubCommand,
}

#[derive(Subcommand, Debug)]
#[command(about = "Inspect and edit images")]
enum ImagesSubCommand {
    #[command(about = "Show an image and its tags")]
    Get {
        id: u64,
        #[arg(long)]
        json: bool,
    },
    #[command(about = "Rename an image")]
    Update {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        file_name: Option<String>,
        #[arg(long)]
        json: bool,
    },
    #[command(about = "Delete one or more images")]
    Delete {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<u64>,
    },
    #[command(about = "Download images as a zip archive")]
    Download {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<u64>,
        #[arg(short, long, value_name = "FILE", default_value = "images.zip")]
        output: PathBuf,
    },
    #[command(about = "Run the tagger again on an image")]
    RegenerateTags {
        id: u64,
        #[arg(long)]
        json: bool,
    },
    #[command(about = "Attach a tag to an image")]
    AddTag {
        id: u64,
        #[arg(help = "Tag name, or numeric tag id with --by-id")]
        tag: String,
        #[arg(long = "type", value_name = "TYPE", help = "Tag type for a new tag")]
        kind: Option<TagType>,
        #[arg(long, conflicts_with = "kind")]
        by_id: bool,
        #[arg(long)]
        json: bool,
    },
    #[command(about = "Detach a tag from an image")]
    RemoveTag {
        id: u64,
        tag_id: u64,
        #[arg(long)]
        json: bool,
    },
}

impl Command for ImagesCommand {
    fn execute(&self, ctx: &mut Context) -> Result<(), CommandError> {
        let palette = ctx.palette();
        let gallery = ctx.client.gallery();
        let (image, json) = match &self.command {
            ImagesSubCommand::Get { id, json } => (gallery.get(*id)?, *json),
            ImagesSubCommand::Update {
                id,
                title,
                file_name,
                json,
            } => {
                let update = ImageUpdate {
                    title: title.clone(),
                    file_name: file_name.clone(),
                };
                if update.is_empty() {
                    return Err(CommandError::Generic(
                        "Nothing to update, pass --title and/or --file-name".to_string(),
                    ));
                }
                (gallery.update(*id, &update)?, *json)
            }
            ImagesSubCommand::Delete { ids } => {
                if let [id] = ids.as_slice() {
                    gallery.delete(*id)?;
                } else {
                    gallery.delete_many(ids)?;
                }
                println!("Deleted {} image(s)", ids.len());
                return Ok(());
            }
            ImagesSubCommand::Download { ids, output } => {
                let written = write_output(output, |w| gallery.download_many(ids, w))?;
                println!(
                    "Wrote {} to {}",
                    views::format_size(written),
                    output.display()
                );
                return Ok(());
            }
            ImagesSubCommand::RegenerateTags { id, json } => (gallery.regenerate_tags(*id)?, *json),
            ImagesSubCommand::AddTag {
                id,
                tag,
                kind,
                by_id,
                json,
            } => {
                let tag_ref = tag_ref(tag, kind.clone(), *by_id)?;
                (gallery.add_tag(*id, &tag_ref)?, *json)
            }
            ImagesSubCommand::RemoveTag { id, tag_id, json } => {
                (gallery.remove_tag(*id, *tag_id)?, *json)
            }
        };

        if json {
            println!("{}", serde_json::to_string_pretty(&image)?);
        } else {
            views::print_image(&image, palette);
        }
        Ok(())
    }
}

fn tag_ref(tag: &str, kind: Option<TagType>, by_id: bool) -> Result<TagRef, CommandError> {
    if by_id {
        let id = tag
            .trim()
            .parse()
            .map_err(|_| CommandError::Generic(format!("Invalid tag id: '{tag}'")))?;
        return Ok(TagRef::by_id(id));
    }
    TagRef::by_name(tag, kind).map_err(|e| CommandError::Generic(e.to_string()))
}
