use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use common::DocumentId;
use landing::headless::{HeadlessLoader, HeadlessTemplates};
use landing::{
    ChannelPopups, LandingPage, Page, PageConfig, PageDeps, SessionAuth, SignalBus, StubSource,
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Runs one landing page lifecycle without a browser.
#[derive(Parser, Debug)]
#[command(name = "landing", version)]
struct Args {
    /// Start with a logged-in session.
    #[arg(long)]
    logged_in: bool,

    /// Publish the login signal before bootstrap starts.
    #[arg(long)]
    login_early: bool,

    /// Number of placeholder documents to show.
    #[arg(long, default_value_t = 8)]
    documents: u64,

    /// Click the rendered document with this id after bootstrap (repeatable).
    #[arg(long = "click")]
    clicks: Vec<u64>,

    /// Click the add control after bootstrap.
    #[arg(long)]
    add: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let config = PageConfig::default();

    let bus = Arc::new(SignalBus::new());
    let auth = Arc::new(SessionAuth::new(Arc::clone(&bus), args.logged_in));
    let (popups, intents) = ChannelPopups::bounded(config.popup_capacity);
    let templates = Arc::new(HeadlessTemplates::new());
    let markup = Page::with_control(&config.add_control_id);

    let deps = PageDeps {
        bus: Arc::clone(&bus),
        auth: auth.clone(),
        popups: Arc::new(popups),
        loader: Arc::new(HeadlessLoader::new()),
        templates: templates.clone(),
        source: Arc::new(StubSource::new(args.documents)),
    };

    let page = match LandingPage::new(deps, &markup, config) {
        Ok(page) => page,
        Err(e) => {
            error!(error = %e, "could not build landing page");
            return ExitCode::FAILURE;
        }
    };

    if args.login_early {
        auth.set_logged_in(true);
    }

    if let Err(e) = page.bootstrap().await {
        error!(error = %e, "landing page failed");
        return ExitCode::FAILURE;
    }

    if let Some(rendered) = templates.last() {
        for id in args.clicks {
            if !rendered.click(DocumentId(id)) {
                error!(id, "no such document on the page");
            }
        }
    }
    if args.add {
        page.affordance().control().click();
    }

    for intent in intents.try_iter() {
        info!(kind = %intent.kind(), id = ?intent.document_id(), "popup opened");
    }

    let control = page.affordance().control();
    println!(
        "phase={} documents={} add_enabled={} add_listeners={}",
        page.phase(),
        page.instantiator().manager().map(|m| m.len()).unwrap_or(0),
        control.is_enabled(),
        control.listener_count(),
    );

    page.teardown();
    ExitCode::SUCCESS
}
