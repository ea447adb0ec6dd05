mod platform;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use catalog_core::{
    account_access, selected_id_from_url, AccountAccess, PageKind, SessionData, SessionGate,
    SortMode,
};
use catalog_logging::{catalog_debug, catalog_info, current_attempt};
use chrono::{SecondsFormat, Utc};
use clap::{Args, Parser, Subcommand};

use platform::app::{PageInput, PageSession};
use platform::config::SiteConfig;
use platform::effects::EffectRunner;
use platform::persistence::FileSessionStore;

#[derive(Debug, Parser)]
#[command(name = "catalog", version, about = "Renders blog and course pages from a JSON feed")]
struct Cli {
    /// Path to the RON site configuration.
    #[arg(long, default_value = "catalog.ron", global = true)]
    config: PathBuf,

    /// Feed location; overrides `data_source` from the configuration.
    #[arg(long, global = true)]
    source: Option<String>,

    /// Retries to issue after a failed load.
    #[arg(long, default_value_t = 0, global = true)]
    retries: u32,

    /// Enable debug logging.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Render the listing page.
    List {
        /// Case-insensitive text matched against title, body and author.
        #[arg(long)]
        search: Option<String>,
        /// newest, oldest or az; anything else sorts newest first.
        #[arg(long, default_value = "newest")]
        sort: String,
        /// Entity to show in the detail panel next to the listing.
        #[arg(long)]
        id: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Render the detail page for one entity.
    Show {
        #[arg(long, conflicts_with = "page_url")]
        id: Option<String>,
        /// Page URL whose `id` query parameter selects the entity.
        #[arg(long)]
        page_url: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Store a mock session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: Option<String>,
    },
    /// Remove the stored session.
    Logout,
    /// Show the account gate decision.
    Account,
}

#[derive(Debug, Args)]
struct OutputArgs {
    /// Write HTML here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = SiteConfig::load(&cli.config)
        .with_context(|| format!("loading configuration from {:?}", cli.config))?;
    if let Some(source) = &cli.source {
        config.data_source = source.clone();
    }
    platform::logging::initialize(config.log, cli.verbose);
    catalog_debug!("configuration: {:?}", config);

    match cli.command {
        Commands::List {
            search,
            sort,
            id,
            output,
        } => {
            let input = PageInput {
                search,
                sort: Some(SortMode::from_selector(&sort)),
                retries: cli.retries,
            };
            render_page(&config, PageKind::Listing, id, &input, output.out.as_deref())
        }
        Commands::Show {
            id,
            page_url,
            output,
        } => {
            let selected = id.or_else(|| page_url.as_deref().and_then(selected_id_from_url));
            let input = PageInput {
                retries: cli.retries,
                ..PageInput::default()
            };
            render_page(&config, PageKind::Detail, selected, &input, output.out.as_deref())
        }
        Commands::Login { email, name } => {
            let store = FileSessionStore::new(&config.session_dir);
            let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
            let session = SessionData::for_login(&email, name.as_deref(), created_at);
            let path = store.save(&session).context("storing session")?;
            println!("Sesión iniciada como {} ({})", session.name, path.display());
            Ok(())
        }
        Commands::Logout => {
            FileSessionStore::new(&config.session_dir)
                .clear()
                .context("clearing session")?;
            println!("Sesión cerrada");
            Ok(())
        }
        Commands::Account => {
            let store = FileSessionStore::new(&config.session_dir);
            catalog_info!("account gate: has_session={}", store.has_session());
            match account_access(&store) {
                AccountAccess::Granted(session) => {
                    println!("{} <{}>", session.name, session.email);
                    if let Some(created_at) = &session.created_at {
                        println!("Miembro desde {created_at}");
                    }
                }
                AccountAccess::RedirectToLogin => println!("Sin sesión: redirigir a login.html"),
            }
            Ok(())
        }
    }
}

fn render_page(
    config: &SiteConfig,
    kind: PageKind,
    selected_id: Option<String>,
    input: &PageInput,
    out: Option<&Path>,
) -> Result<()> {
    let settings = config.fetch_settings()?;
    let runner = EffectRunner::new(settings).context("starting fetch engine")?;
    let mut session = PageSession::new(config.page(kind, selected_id), runner);

    let view = session.run(input);
    catalog_info!(
        "attempt {} rendered {:?}: {} of {} entities",
        current_attempt(),
        view.status,
        view.shown(),
        view.total
    );
    let html = platform::render::render(&view);

    match out {
        Some(path) => {
            fs::write(path, html).with_context(|| format!("writing {:?}", path))?;
        }
        None => print!("{html}"),
    }
    Ok(())
}
