use clap::Args;

use super::{Command, CommandError, Context};
use crate::router::{Route, RouteError};
use crate::views;

/// Render the screen behind a route path such as `/gallery` or `#/upload`.
#[derive(Args, Debug)]
pub struct OpenCommand {
    #[arg(default_value = "/", help = "Route path: /gallery, /upload, /settings or /login")]
    path: String,
}

impl OpenCommand {
    pub fn route(&self) -> Result<Route, RouteError> {
        Route::resolve(&self.path)
    }
}

impl Command for OpenCommand {
    fn execute(&self, ctx: &mut Context) -> Result<(), CommandError> {
        let route = self.route()?;
        println!("{}", ctx.palette().highlight(route.name()));
        views::render(route, &ctx.client, ctx.palette())?;
        Ok(())
    }
}
