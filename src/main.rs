use inbox_kit::adapters::InMemoryMessageSource;
use inbox_kit::config::{InboxConfig, InboxCustomizations};
use inbox_kit::impressions::AppState;
use inbox_kit::inbox::{Inbox, ListSurface};
use inbox_kit::models::{DeleteSource, HtmlContent, InboxMessage};

use chrono::{Duration, Utc};
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const VERSION: &str = env!("CARGO_PKG_VERSION");

const USAGE: &str = "usage: inbox-demo [MESSAGES.json] [--config CUSTOMIZATIONS.json]";

#[derive(Debug, Default)]
struct DemoArgs {
    messages: Option<PathBuf>,
    config: Option<PathBuf>,
}

fn parse_args() -> Result<DemoArgs> {
    let mut parsed = DemoArgs::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| eyre!("--config needs a path\n{}", USAGE))?;
                parsed.config = Some(PathBuf::from(path));
            }
            flag if flag.starts_with("--") => return Err(eyre!("unknown flag {}\n{}", flag, USAGE)),
            path => parsed.messages = Some(PathBuf::from(path)),
        }
    }
    Ok(parsed)
}

/// Messages used when no fixture file is given.
fn sample_messages() -> Vec<InboxMessage> {
    let now = Utc::now();
    vec![
        InboxMessage::new("welcome")
            .with_created_at(now - Duration::days(3))
            .with_title("Welcome aboard")
            .with_subtitle("Everything you need to get started"),
        InboxMessage::new("sale")
            .with_created_at(now - Duration::hours(5))
            .with_title("Weekend sale")
            .with_subtitle("20% off everything")
            .with_icon("https://example.com/sale.png"),
        InboxMessage::new("receipt")
            .with_created_at(now - Duration::days(1))
            .with_title("Your receipt")
            .with_read(true),
        InboxMessage::new("quiet")
            .with_created_at(now - Duration::minutes(10))
            .with_title("Silent update")
            .with_silent_inbox(true),
    ]
}

fn load_messages(path: Option<&PathBuf>) -> Result<Vec<InboxMessage>> {
    let Some(path) = path else {
        return Ok(sample_messages());
    };
    let raw = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("reading messages from {}", path.display()))?;
    serde_json::from_str(&raw).wrap_err_with(|| format!("parsing messages in {}", path.display()))
}

fn print_surface(inbox: &Inbox<InMemoryMessageSource>) -> Result<()> {
    println!("== {} ==", inbox.nav_title());
    match inbox.list_surface() {
        ListSurface::Loading => println!("(loading)"),
        ListSurface::Empty { title, body } => println!("{}\n{}", title, body),
        ListSurface::Rows(rows) => println!("{}", serde_json::to_string_pretty(rows)?),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::args().any(|arg| arg == "--version") {
        println!("inbox-demo {}", VERSION);
        return Ok(());
    }

    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = parse_args()?;
    let messages = load_messages(args.messages.as_ref())?;

    let mut config = InboxConfig::new().with_slide_duration(Duration::milliseconds(50));
    if let Some(path) = &args.config {
        config = config.with_customizations(InboxCustomizations::from_json_file(path)?);
    }

    let source = Arc::new(InMemoryMessageSource::with_messages(messages));
    for message in source.messages() {
        let html = format!("<h1>{}</h1>", message.message_id);
        source.set_content(message.message_id, HtmlContent::new(html));
    }

    info!("Starting inbox demo with {} messages", source.messages().len());
    let mut inbox = Inbox::new(Arc::clone(&source), config);
    inbox.mount().await;
    inbox.update_visible_range(0..3);
    print_surface(&inbox)?;

    let ids: Vec<String> = inbox.rows().iter().map(|r| r.message_id().to_string()).collect();
    let contents = futures::future::join_all(ids.iter().map(|id| inbox.request_content(id))).await;
    info!(
        "Prefetched {} of {} message bodies",
        contents.iter().filter(|c| c.is_ok()).count(),
        ids.len()
    );

    if !inbox.rows().is_empty() {
        inbox.select_row(0)?;
        let content = inbox.selected_content().await?;
        println!("-- detail --\n{}", content.html);

        tokio::time::sleep(std::time::Duration::from_millis(60)).await;
        inbox.tick();
        inbox.return_to_list(None);
        tokio::time::sleep(std::time::Duration::from_millis(60)).await;
        inbox.tick();
    }

    // backgrounding closes the session, coming back opens a new one
    inbox.set_app_state(AppState::Background);
    inbox.set_app_state(AppState::Active);

    if let Some(last) = ids.last() {
        inbox.delete_row(last, DeleteSource::InboxSwipe).await;
    }
    print_surface(&inbox)?;

    inbox.unmount();

    println!("-- sessions --");
    println!(
        "{}",
        serde_json::to_string_pretty(&source.session_summaries())?
    );
    Ok(())
}
