use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use related_posts::app::AppContext;
use related_posts::cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render { page, seed } => {
            let options = commands::load_options(cli.config.as_deref(), &page)?;
            let host = commands::host_page(&page)?;
            let mut ctx = AppContext::headless()?;
            if let Some(seed) = seed {
                ctx = ctx.with_seed(seed);
            }
            println!("{}", commands::render(&ctx, options, &host).await?);
        }
        Commands::Address { page } => {
            let options = commands::load_options(cli.config.as_deref(), &page)?;
            let host = commands::host_page(&page)?;
            println!("{}", commands::feed_address(options, &host)?);
        }
    }

    Ok(())
}
