mod cli;

use medialog::{config, search::SearchService, server};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&std::path::Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    // CLI flags win over file and environment
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config::validate_config(&config)?;

    tracing::info!("Starting medialog server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    server::start_server(config).await
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "medialog=trace,medialog_common=debug,tower_http=debug".to_string()
        } else {
            "medialog=debug,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Search { query, json } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_search(&query, json, cli.config.as_deref()))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("medialog {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn run_search(
    query: &str,
    json: bool,
    config_path: Option<&std::path::Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let service = SearchService::from_config(&config)?;

    let outcome = service.search(Some(query)).await?;
    let response = outcome.response;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!("Query: {}", response.query);
    println!("Cache: {}", outcome.cache_status);
    println!(
        "Results: {} (movies {}, tv {}, anime {}, books {})",
        response.total,
        response.breakdown.movies,
        response.breakdown.tv,
        response.breakdown.anime,
        response.breakdown.books
    );
    for result in &response.results {
        print!("  [{:<5}] {}", result.kind.to_string(), result.title);
        if let Some(year) = result.year {
            print!(" ({})", year);
        }
        println!("  {}", result.id);
    }

    Ok(())
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            config::load_config(p)?
        }
        None => {
            println!("No config file specified, using defaults and environment");
            config::load_config_or_default(None)?
        }
    };

    let service = SearchService::from_config(&config)?;

    println!("✓ Configuration is valid");
    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!(
        "  Search: max query {} chars, {}s per source, {} results per source",
        config.search.max_query_length,
        config.search.source_timeout_secs,
        config.search.results_per_source
    );
    println!("  Cache: {}", service.cache_mode());
    println!("  Sources:");
    for source in service.sources() {
        let status = if source.available { "✓" } else { "✗" };
        println!("    {} {} ({})", status, source.name, source.kind);
    }

    Ok(())
}
