pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "related-posts")]
#[command(about = "Render a related-posts widget for a Blogger page", long_about = None)]
pub struct Cli {
    /// Options file (default: ~/.config/related-posts/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the feed and print the rendered widget as HTML
    Render {
        #[command(flatten)]
        page: PageArgs,

        /// Seed for the post shuffle
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the feed address the widget would request
    Address {
        #[command(flatten)]
        page: PageArgs,
    },
}

/// Describes the page the widget is mounted on.
#[derive(Args, Debug, Clone, Default)]
pub struct PageArgs {
    /// Blog origin, e.g. https://example.blogspot.com
    #[arg(long)]
    pub blog_url: Option<String>,

    /// URL of the current post
    #[arg(long)]
    pub page_url: Option<String>,

    /// HTML of the current page, read for meta tags
    #[arg(long)]
    pub page_html: Option<PathBuf>,

    /// Label of the current post (repeatable)
    #[arg(short, long = "label")]
    pub labels: Vec<String>,

    /// Number of posts to show
    #[arg(short, long)]
    pub max_posts: Option<i64>,
}
