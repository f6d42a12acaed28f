//! Print the effective configuration.

use anyhow::Result;
use colored::Colorize;

use crate::config::Config;

pub fn run() -> Result<()> {
    let config = Config::load()?;
    println!("{}", "# effective gmix configuration".dimmed());
    print!("{}", config.to_toml()?);
    Ok(())
}
