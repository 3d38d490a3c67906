use clap::{Args, Subcommand};

use common::TagType;

use super::{Command, CommandError, Context};

#[derive(Args, Debug)]
pub struct ThemeCommand {
    #[command(subcommand)]
    command: ThemeSubCommand,
}

#[derive(Subcommand, Debug)]
#[command(about = "Terminal colour theme")]
enum ThemeSubCommand {
    #[command(about = "Show the current theme and its tag colours")]
    Show,
    #[command(about = "Switch between dark and light")]
    Toggle,
}

const SAMPLE_TYPES: [TagType; 7] = [
    TagType::Copyright,
    TagType::Character,
    TagType::Artist,
    TagType::General,
    TagType::Meta,
    TagType::Rating,
    TagType::Year,
];

impl Command for ThemeCommand {
    fn execute(&self, ctx: &mut Context) -> Result<(), CommandError> {
        match &self.command {
            ThemeSubCommand::Show => {
                println!("Theme: {}", ctx.theme.theme());
                let palette = ctx.palette();
                let sample: Vec<String> = SAMPLE_TYPES
                    .iter()
                    .map(|kind| palette.tag(kind.as_str(), kind))
                    .collect();
                println!("{}", sample.join(" "));
            }
            ThemeSubCommand::Toggle => {
                let theme = ctx.theme.toggle(&mut ctx.storage)?;
                println!("Theme: {theme}");
            }
        }
        Ok(())
    }
}
