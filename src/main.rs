use anyhow::Context;
use clap::{Parser, Subcommand};
use parts_catalog::catalog::{Catalog, YearStep};
use parts_catalog::client::CatalogClient;
use parts_catalog::config::Config;
use parts_catalog::models::CatalogEntry;
use parts_catalog::search::{IncrementalSearch, RecordingNavigator};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "parts-catalog")]
#[command(about = "Browse and search the vehicle parts catalog", long_about = None)]
#[command(version)]
struct Cli {
    /// Print Prometheus metrics after the command finishes
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog types
    Types {
        #[arg(short, long, default_value = "1")]
        page: u32,
    },

    /// List the models of a type
    Models {
        #[arg(value_name = "TYPE_ID")]
        type_id: String,
    },

    /// List the submodels of a model
    Submodels {
        #[arg(value_name = "MODEL_ID")]
        model_id: String,
    },

    /// List the model years of a submodel
    Years {
        #[arg(value_name = "SUBMODEL_ID")]
        submodel_id: String,
    },

    /// List the versions of a model year
    Versions {
        #[arg(value_name = "MODEL_YEAR_ID")]
        model_year_id: String,
    },

    /// List the parts of a model year
    Parts {
        #[arg(value_name = "MODEL_YEAR_ID")]
        model_year_id: String,

        #[arg(short, long)]
        version: Option<String>,
    },

    /// Type-ahead search
    Search {
        #[arg(value_name = "QUERY")]
        query: String,

        /// Number of result pages to load
        #[arg(short, long, default_value = "1")]
        pages: u32,

        /// Select the result at this index and print its detail path
        #[arg(short, long)]
        select: Option<usize>,
    },
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("parts_catalog={}", config.observability.log_level).into()
    });
    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries command output
    if config.observability.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_entries<E: CatalogEntry>(entries: &[E]) {
    if entries.is_empty() {
        println!("(none)");
        return;
    }
    for entry in entries {
        println!("{:>8}  {}", entry.id(), entry.name());
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("Using default configuration");
        Config::default()
    });

    init_tracing(&config);
    tracing::debug!(
        base_url = %config.api.base_url,
        dark_theme = config.ui.dark_theme,
        "Starting parts-catalog v{}",
        env!("CARGO_PKG_VERSION")
    );

    if config.observability.metrics_enabled {
        if let Err(e) = parts_catalog::metrics::init_metrics() {
            tracing::warn!("Failed to initialize metrics: {}", e);
        }
    }

    let client = Arc::new(CatalogClient::new(&config.api).context("Failed to create catalog client")?);
    let catalog = Catalog::new(client.clone(), &config.cache);

    match cli.command {
        Commands::Search {
            query,
            pages,
            select,
        } => {
            let navigator = RecordingNavigator::new();
            let mut search = IncrementalSearch::new(client, navigator.clone(), config.search.clone());

            search.on_query_change(query);
            search.settle().await;

            for _ in 1..pages {
                if !search.on_load_more() {
                    break;
                }
                search.settle().await;
            }

            for (index, item) in search.results().iter().enumerate() {
                println!("{:>4}  {}  [{}]", index, item.label(), item.breadcrumb());
            }
            println!(
                "{} results, page {}{}",
                search.results().len(),
                search.cursor().page,
                if search.has_more() { ", more available" } else { "" }
            );

            if let Some(index) = select {
                let item = search
                    .results()
                    .get(index)
                    .cloned()
                    .with_context(|| format!("No result at index {}", index))?;

                match search.on_select(&item) {
                    Some(path) => println!("{}", path),
                    None => println!("Result {} has no detail page", index),
                }
            }
        }

        Commands::Types { page } => {
            let listing = catalog.types(page).await?;
            print_entries(&listing.data);

            let pager: Vec<String> = listing
                .links
                .iter()
                .map(|link| match (link.active, link.page_number()) {
                    (true, _) => format!("[{}]", link.display_label()),
                    (false, Some(_)) => link.display_label(),
                    (false, None) => format!("({})", link.display_label()),
                })
                .collect();
            if !pager.is_empty() {
                println!("{}", pager.join(" "));
            }
        }
        Commands::Models { type_id } => print_entries(&catalog.models(&type_id).await?),
        Commands::Submodels { model_id } => {
            print_entries(&catalog.submodels(&model_id).await?)
        }
        Commands::Years { submodel_id } => {
            print_entries(&catalog.model_years(&submodel_id).await?)
        }
        Commands::Versions { model_year_id } => {
            match catalog.year_step(&model_year_id).await? {
                YearStep::Versions(versions) => print_entries(&versions),
                YearStep::Parts => {
                    println!("No versions; showing parts");
                    print_entries(&catalog.parts(&model_year_id, None).await?);
                }
            }
        }
        Commands::Parts {
            model_year_id,
            version,
        } => print_entries(&catalog.parts(&model_year_id, version.as_deref()).await?),
    }

    if cli.metrics {
        print!("{}", parts_catalog::metrics::gather_metrics());
    }

    Ok(())
}
