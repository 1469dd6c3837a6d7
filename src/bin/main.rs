//! Joinstep CLI - Inspect catalogs and replay join step sessions
//!
//! Usage:
//!   joinstep tables [--database <id>] [--catalog <catalog.toml>]
//!   joinstep suggest --source <table> --target <table>
//!   joinstep replay --script <actions.json> [--source <table>]
//!
//! Examples:
//!   joinstep tables --database 1
//!   joinstep suggest --source Orders --target Products
//!   joinstep replay --script session.json --source Orders

use clap::{Parser, Subcommand};
use joinstep::config::Settings;
use joinstep::join_step::{JoinStepAction, JoinStepController, QueryLog};
use joinstep::metadata::{
    sample, CachedProvider, Catalog, DatabaseId, MetadataProvider, StaticProvider, TableId,
    TableMetadata,
};
use joinstep::query::{Query, QueryFacade};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "joinstep")]
#[command(about = "Joinstep - Build query joins from table and column picks")]
#[command(version)]
struct Cli {
    /// Catalog file (defaults to the configured catalog, then the sample database)
    #[arg(short, long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the tables of a database
    Tables {
        /// Database id
        #[arg(short, long, default_value_t = 1)]
        database: u32,
    },

    /// Show the join suggested between two tables
    Suggest {
        /// Table the query reads from (name or id)
        #[arg(short, long)]
        source: String,

        /// Table to join (name or id)
        #[arg(short, long)]
        target: String,
    },

    /// Apply a JSON list of join step actions to a new join
    Replay {
        /// Path to the actions file
        #[arg(long)]
        script: PathBuf,

        /// Table the query reads from (name or id)
        #[arg(short, long, default_value = "Orders")]
        source: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match Settings::load() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.logging.filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let catalog = match load_catalog(cli.catalog, &settings) {
        Ok(c) => Arc::new(c),
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Tables { database } => cmd_tables(catalog, &settings, DatabaseId(database)).await,
        Commands::Suggest { source, target } => cmd_suggest(&catalog, &source, &target),
        Commands::Replay { script, source } => cmd_replay(catalog, &settings, script, &source).await,
    }
}

fn load_catalog(flag: Option<PathBuf>, settings: &Settings) -> Result<Catalog, String> {
    let path = match flag {
        Some(path) => Some(path),
        None => settings
            .metadata
            .resolved_catalog_path()
            .map_err(|e| format!("Invalid catalog path: {}", e))?,
    };

    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading catalog");
            Catalog::from_file(&path)
                .map_err(|e| format!("Error loading catalog '{}': {}", path.display(), e))
        }
        None => Ok(Catalog::sample()),
    }
}

fn resolve_table<'a>(catalog: &'a Catalog, name: &str) -> Result<&'a TableMetadata, String> {
    let by_id = name.parse::<u32>().ok().and_then(|id| catalog.table(TableId(id)));
    by_id
        .or_else(|| catalog.table_named(name))
        .ok_or_else(|| format!("Unknown table: {}", name))
}

async fn cmd_tables(catalog: Arc<Catalog>, settings: &Settings, database: DatabaseId) -> ExitCode {
    let provider = StaticProvider::new(catalog);
    let tables = if settings.metadata.cache_enabled {
        CachedProvider::new(provider).list_tables(database).await
    } else {
        provider.list_tables(database).await
    };

    match tables {
        Ok(tables) => {
            println!("Database {}:", database);
            for table in &tables {
                println!("  - {} {} ({} fields)", table.id, table.label(), table.fields.len());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_suggest(catalog: &Catalog, source: &str, target: &str) -> ExitCode {
    let (source, target) = match (resolve_table(catalog, source), resolve_table(catalog, target)) {
        (Ok(s), Ok(t)) => (s, t),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let query = Query::from_table(source.database, source.id);
    let facade = QueryFacade::new(catalog);
    match facade.suggested_join(&query, 0, None, target.id) {
        Ok(Some(join)) => match serde_json::to_string_pretty(&join) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        },
        Ok(None) => {
            println!(
                "No suggested condition between {} and {}",
                source.label(),
                target.label()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn cmd_replay(
    catalog: Arc<Catalog>,
    settings: &Settings,
    script: PathBuf,
    source: &str,
) -> ExitCode {
    let content = match fs::read_to_string(&script) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", script.display(), e);
            return ExitCode::FAILURE;
        }
    };
    let actions: Vec<JoinStepAction> = match serde_json::from_str(&content) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error parsing '{}': {}", script.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let query = match resolve_table(&catalog, source) {
        Ok(t) => Query::from_table(t.database, t.id),
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let site_url = match settings.metadata.resolved_site_url() {
        Ok(url) => url,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let provider = StaticProvider::new(Arc::clone(&catalog))
        .with_recents(vec![sample::PRODUCTS_ID, sample::PEOPLE_ID]);
    let mut controller = match JoinStepController::new(
        catalog,
        query,
        0,
        None,
        settings.join.clone(),
        QueryLog::new(),
    ) {
        Ok(c) => c.with_site_url(&site_url),
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut rejected = 0;
    for (step, action) in actions.into_iter().enumerate() {
        if let Err(e) = controller.dispatch(action) {
            eprintln!("Step {}: rejected: {}", step + 1, e);
            rejected += 1;
        }
        controller.load_tables(&provider).await;
    }

    for query in controller.host().queries() {
        match serde_json::to_string_pretty(query) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    println!();
    for view in controller.condition_views() {
        println!(
            "{} {} {} {}",
            controller.left_table_label(),
            view.lhs.text(),
            view.operator,
            view.rhs.text()
        );
    }
    println!("Right table: {}", controller.right_table_label());
    if let Some(link) = controller.right_table_link() {
        println!("Data source: {}", link.url);
    }

    if rejected > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
