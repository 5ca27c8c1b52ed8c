//! CLI entry point for mdxsite

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mdxsite")]
#[command(version)]
#[command(about = "A static site generator for an MDX personal blog", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new post or page
    New {
        /// Title of the new document
        title: String,

        /// Topic directory for the post
        #[arg(short, long)]
        topic: Option<String>,

        /// Create a standalone page instead of a post
        #[arg(long)]
        page: bool,
    },

    /// Build the static site
    #[command(alias = "b")]
    Build {
        /// Watch for file changes and rebuild
        #[arg(short, long)]
        watch: bool,
    },

    /// Start a local server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Enable static mode (no file watching)
        #[arg(long)]
        r#static: bool,
    },

    /// Remove generated output
    Clean,

    /// List site content
    List {
        /// Type of content to list (post, page, topic, tag)
        #[arg(default_value = "post")]
        r#type: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        "mdxsite=debug,info"
    } else {
        "mdxsite=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::New { title, topic, page } => {
            let site = mdxsite::Site::new(&base_dir)?;
            site.new_document(&title, topic.as_deref(), page)?;
        }

        Commands::Build { watch } => {
            let site = mdxsite::Site::new(&base_dir)?;
            site.build()?;

            if watch {
                mdxsite::commands::build::watch(&site).await?;
            }
        }

        Commands::Serve {
            port,
            ip,
            r#static,
        } => {
            let site = mdxsite::Site::new(&base_dir)?;
            site.build()?;
            mdxsite::server::start(&site, &ip, port, !r#static).await?;
        }

        Commands::Clean => {
            let site = mdxsite::Site::new(&base_dir)?;
            site.clean()?;
        }

        Commands::List { r#type } => {
            let site = mdxsite::Site::new(&base_dir)?;
            mdxsite::commands::list::run(&site, &r#type)?;
        }
    }

    Ok(())
}
