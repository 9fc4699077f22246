use clap::{Parser, Subcommand};
use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "webresource")]
#[command(about = "Retrieve web resources as typed models", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Retrieve a URL and report the resource it resolves to
    Fetch(FetchArgs),
}

#[derive(clap::Args, Debug)]
pub struct FetchArgs {
    /// URL to retrieve
    pub url: Url,

    /// Additional allowed content type (type/subtype), repeatable
    #[arg(long = "allow", value_name = "TYPE/SUBTYPE")]
    pub allowed_content_types: Vec<String>,

    /// Reject content types that are not explicitly allowed
    #[arg(long)]
    pub strict: bool,

    /// Request header as `Name: value`, repeatable
    #[arg(long = "header", short = 'H', value_name = "NAME: VALUE")]
    pub headers: Vec<String>,

    /// Configuration file (overrides WEBRESOURCE_CONFIG)
    #[arg(long)]
    pub config: Option<PathBuf>,
}
