//! CLI command definitions

use clap::{Args, Parser, Subcommand};
use healthscope_core::assessment::Condition;
use healthscope_core::prompt::FieldValue;
use std::path::PathBuf;

/// CLI arguments for healthscope
#[derive(Parser, Debug)]
#[command(name = "healthscope")]
#[command(author, version, about = "Grounded health-risk explanations and health plans")]
#[command(long_about = r#"
Healthscope scores health risk locally and streams an explanation or a
personalised plan from a chat-completion endpoint.

Configuration is loaded from (in priority order):
1. --config <path>                       Explicit config file
2. ~/.config/healthscope/config.yaml     Global config

The API key comes from the config's api_key, or from the key store
managed with `healthscope key`.

Example:
  healthscope key set sk-...
  healthscope assess diabetes --field glucose=150 --field bmi=31.2 --field age=50 \
      --field pedigree=0.3 --field insulin=80 --explain
  healthscope plan --age 34 --weight 90 --height 180 --goal "Lose Weight"
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Wait for the whole response instead of streaming it
    #[arg(long, global = true)]
    pub no_stream: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage the stored API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Score risk for a condition, optionally explaining the result
    Assess(AssessArgs),

    /// Generate a personalised diet and fitness plan
    Plan(PlanArgs),
}

#[derive(Subcommand, Debug)]
pub enum KeyAction {
    /// Store an API key
    Set {
        /// The key; an empty value removes the stored key
        key: String,
    },
    /// Remove the stored API key
    Clear,
    /// Show whether a key is configured
    Status,
}

#[derive(Args, Debug)]
pub struct AssessArgs {
    /// Condition to assess (diabetes, heart, parkinsons)
    pub condition: Condition,

    /// Input value as name=value (repeatable, order is kept)
    #[arg(short, long = "field", value_name = "NAME=VALUE", value_parser = parse_field)]
    pub fields: Vec<(String, FieldValue)>,

    /// Stream an explanation of the result
    #[arg(long)]
    pub explain: bool,
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Age in years
    #[arg(long, default_value_t = 50)]
    pub age: u32,

    /// Weight in kg
    #[arg(long, default_value_t = 70.0)]
    pub weight: f64,

    /// Height in cm
    #[arg(long, default_value_t = 175.0)]
    pub height: f64,

    #[arg(long, default_value = "Male")]
    pub sex: String,

    #[arg(long, default_value = "Moderately Active")]
    pub activity: String,

    #[arg(long, default_value = "Balanced")]
    pub diet: String,

    #[arg(long, default_value = "Stay Fit")]
    pub goal: String,
}

fn parse_field(raw: &str) -> Result<(String, FieldValue), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", raw))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing field name in '{}'", raw));
    }

    let value: FieldValue = match value.trim().parse() {
        Ok(value) => value,
        Err(never) => match never {},
    };
    Ok((name.to_string(), value))
}
