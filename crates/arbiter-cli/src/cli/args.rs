use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "arbiter",
    version,
    about = "Evaluate LLM prompt variants against a judge model"
)]
pub struct Cli {
    /// Debug-level logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run an evaluation and write the result document
    Run(RunArgs),
    /// Write a sample config using the bundled Sydney inputs
    Init(InitArgs),
    /// Load and validate a config without calling any provider
    Validate(ValidateArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderKind {
    Openai,
    /// Offline scripted responses; no network
    Fake,
}

#[derive(Parser, Clone)]
pub struct RunArgs {
    pub config: PathBuf,

    /// Result document path. Printed to stdout when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "openai")]
    pub provider: ProviderKind,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "OPENAI_BASE_URL")]
    pub base_url: Option<String>,

    /// Skip the known-model check for OpenAI-compatible endpoints
    #[arg(long)]
    pub allow_any_model: bool,
}

#[derive(Parser, Clone)]
pub struct InitArgs {
    #[arg(long, default_value = "eval.yaml")]
    pub path: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

#[derive(Parser, Clone)]
pub struct ValidateArgs {
    pub config: PathBuf,
}
