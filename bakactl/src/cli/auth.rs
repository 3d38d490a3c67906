use clap::{Args, Subcommand};
use tracing::info;

use client::STORAGE_KEY_TOKEN;

use super::{Command, CommandError, Context, read_password};
use crate::views;

#[derive(Args, Debug)]
pub struct AuthCommand {
    #[command(subcommand)]
    command: AuthSubCommand,
}

#[derive(Subcommand, Debug)]
#[command(about = "Authentication")]
enum AuthSubCommand {
    #[command(about = "Show whether the backend is initialized and password protected")]
    Status {
        #[arg(long)]
        json: bool,
    },
    #[command(about = "Log in and store the session token")]
    Login {
        #[arg(help = "Password, read from stdin when omitted")]
        password: Option<String>,
    },
    #[command(about = "Forget the stored session token")]
    Logout,
    #[command(about = "Set the initial password of a fresh backend")]
    Setup {
        #[arg(help = "Password, read from stdin when omitted")]
        password: Option<String>,
    },
    #[command(about = "Change the password")]
    Password {
        #[arg(help = "New password, read from stdin when omitted")]
        password: Option<String>,
    },
}

impl Command for AuthCommand {
    fn execute(&self, ctx: &mut Context) -> Result<(), CommandError> {
        match &self.command {
            AuthSubCommand::Status { json } => {
                let status = ctx.client.auth().status()?;
                if *json {
                    println!("{}", serde_json::to_string_pretty(&status)?);
                } else {
                    views::print_login(&status, ctx.client.has_token());
                }
            }
            AuthSubCommand::Login { password } => {
                let password = read_password(password.as_deref())?;
                let response = ctx.client.auth().login(&password)?;
                ctx.storage.set(STORAGE_KEY_TOKEN, &response.token)?;
                info!("Session token stored in {}", ctx.storage.path().display());
                println!("Logged in");
            }
            AuthSubCommand::Logout => {
                ctx.client.clear_token();
                if ctx.storage.remove(STORAGE_KEY_TOKEN)? {
                    println!("Logged out");
                } else {
                    println!("No session token stored");
                }
            }
            AuthSubCommand::Setup { password } => {
                let password = read_password(password.as_deref())?;
                ctx.client.auth().setup(&password)?;
                println!("Password set, run 'bakactl auth login' to start a session");
            }
            AuthSubCommand::Password { password } => {
                let password = read_password(password.as_deref())?;
                ctx.client.auth().update_password(&password)?;
                println!("Password updated");
            }
        }
        Ok(())
    }
}
