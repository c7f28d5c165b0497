//! CLI entry point for spacetraveling

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spacetraveling::Blog;

#[derive(Parser)]
#[command(name = "spacetraveling")]
#[command(version)]
#[command(about = "A blog front-end for a headless CMS, rendered statically or on demand", long_about = None)]
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
    /// Write a default _config.yml
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Render the site into the public folder
    #[command(alias = "g")]
    Generate {
        /// Render every listed post, not only the static paths
        #[arg(short, long)]
        all: bool,
    },

    /// Serve the site, rendering pages on demand
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,
    },

    /// Clean the public folder
    Clean,

    /// List content from the CMS
    List {
        /// Type of content to list (post, path)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "spacetraveling=debug,tower_http=debug,info"
    } else {
        "spacetraveling=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            spacetraveling::commands::init::init_site(&target_dir)?;
            println!("Initialized site in {:?}", target_dir);
        }

        Commands::Generate { all } => {
            let blog = Blog::new(&base_dir)?;
            let cms = blog.cms()?;
            tracing::info!("Generating static files...");
            blog.generate(cms.as_ref(), all).await?;
            println!("Generated successfully!");
        }

        Commands::Server { port, ip, open } => {
            let blog = Blog::new(&base_dir)?;
            let cms = blog.cms()?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            spacetraveling::server::start(&blog, cms, &ip, port, open).await?;
        }

        Commands::Clean => {
            let blog = Blog::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            blog.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            let blog = Blog::new(&base_dir)?;
            let cms = blog.cms()?;
            spacetraveling::commands::list::run(&blog, cms.as_ref(), &r#type).await?;
        }

        Commands::Version => {
            println!("spacetraveling version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
