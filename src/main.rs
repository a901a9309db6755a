mod dispatcher;

use clap::{Parser, Subcommand};
use metzia_channels::whatsapp::WhatsAppChannel;
use metzia_core::{config, traits::Channel};
use metzia_products::affiliate::AffiliateResolver;
use metzia_products::build_source;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "metzia",
    version,
    about = "Metzia — WhatsApp bot for Hebrew product search with affiliate links"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot.
    Start,
    /// Check configuration and channel status.
    Status,
    /// Run one product search from the command line and print the captions.
    Search {
        /// The search keyword.
        #[arg(trailing_var_arg = true)]
        keyword: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Start => {
            let cfg = config::load(&cli.config)?;

            let source = build_source(&cfg.search);
            let resolver = AffiliateResolver::new(cfg.search.clone());

            // Build channels.
            let mut channels: HashMap<String, Arc<dyn Channel>> = HashMap::new();

            if let Some(ref wa) = cfg.channel.whatsapp {
                if wa.enabled {
                    let channel = WhatsAppChannel::new(wa.clone(), &cfg.bot.data_dir);
                    channels.insert("whatsapp".to_string(), Arc::new(channel));
                }
            }

            if channels.is_empty() {
                anyhow::bail!(
                    "No channels enabled. Enable [channel.whatsapp] in config.toml."
                );
            }

            println!(
                "Metzia — starting bot ({} mode)...",
                if cfg.search.use_mock() { "mock" } else { "live" }
            );
            let dispatcher = Arc::new(dispatcher::Dispatcher::new(source, resolver, channels));
            dispatcher.run().await?;
        }
        Commands::Status => {
            let cfg = config::load(&cli.config)?;
            println!("Metzia — Status Check\n");
            println!("Config: {}", cli.config);
            println!(
                "Search mode: {}",
                if cfg.search.use_mock() { "mock (no app key)" } else { "live" }
            );
            println!(
                "API base: {}",
                cfg.search.api_base.as_deref().unwrap_or("not set")
            );
            println!(
                "Locale: {} / {} / {}",
                cfg.search.country, cfg.search.currency, cfg.search.language
            );
            println!();

            match cfg.channel.whatsapp {
                Some(ref wa) if wa.enabled => {
                    if wa.allowed_users.is_empty() {
                        println!("  whatsapp: enabled (all senders)");
                    } else {
                        println!("  whatsapp: enabled ({} allowed senders)", wa.allowed_users.len());
                    }
                }
                Some(_) => println!("  whatsapp: disabled"),
                None => println!("  whatsapp: not configured"),
            }
        }
        Commands::Search { keyword } => {
            if keyword.is_empty() {
                anyhow::bail!("no keyword provided. Usage: metzia search <keyword>");
            }

            let keyword = keyword.join(" ");
            let cfg = config::load(&cli.config)?;
            let source = build_source(&cfg.search);
            let resolver = AffiliateResolver::new(cfg.search.clone());

            let products = source.search(&keyword).await?;
            for product in products.into_iter().take(dispatcher::MAX_PRODUCTS) {
                let resolved = resolver.resolve_product(product).await;
                println!("{}\n", metzia_products::caption::product_caption(&resolved));
            }
        }
    }

    Ok(())
}
