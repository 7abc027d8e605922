use crate::app::{App, Cli, FrontEnd};
use crate::config::Config;
use clap::Parser;

mod app;
mod config;
mod detector;
mod library;
mod location;
mod map;
mod playback;
mod playlist;
mod presentation;
mod risk_oracle;
mod video_source;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;

    let app = App::new(config);

    app.start(cli.front_end.unwrap_or(FrontEnd::Desktop))?;

    Ok(())
}
