mod config;
mod diagnostics;
mod fetch;
mod render;
mod users;
mod view;

use anyhow::Result;
use clap::Parser;
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::render::{DateStyle, Frame, OutputFormat, Renderer};
use crate::view::UsersView;

#[derive(Parser)]
#[command(name = "userlist", about = "Show the user list, most recently created first")]
pub struct Args {
    #[arg(long, env = "USERLIST_ENDPOINT", help = "Users endpoint URL")]
    pub endpoint: Option<String>,

    #[arg(long, value_enum, help = "Output format")]
    pub format: Option<OutputFormat>,

    #[arg(long, help = "Locale for dates (e.g., de_DE); default from LC_ALL/LC_TIME/LANG")]
    pub locale: Option<String>,

    #[arg(long, help = "Config file path")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Append diagnostics as JSON lines to this file")]
    pub log_file: Option<PathBuf>,

    #[arg(long, help = "Debug logging")]
    pub debug: bool,
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Mount the view, optionally draw the loading frame, then draw the settled one
fn run<W: Write>(
    view: &mut UsersView,
    renderer: &dyn Renderer,
    style: &DateStyle,
    show_loading: bool,
    out: &mut W,
) -> Result<()> {
    view.mount();

    if show_loading {
        view.pump();
        if view.state().is_loading() {
            write!(out, "{}", renderer.render(&Frame::from_state(view.state(), style))?)?;
            out.flush()?;
        }
    }

    view.wait();
    write!(out, "{}", renderer.render(&Frame::from_state(view.state(), style))?)?;
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.debug);

    let mut cfg = if let Some(config_path) = &args.config {
        config::Config::load_from(config_path)?
    } else {
        config::Config::load().unwrap_or_else(|e| {
            tracing::warn!("ignoring unreadable config: {}", e);
            config::Config::default()
        })
    };

    // CLI flags override config
    if let Some(endpoint) = &args.endpoint {
        cfg.endpoint = endpoint.clone();
    }
    if let Some(format) = args.format {
        cfg.format = format;
    }
    if args.locale.is_some() {
        cfg.locale = args.locale.clone();
    }
    if args.log_file.is_some() {
        cfg.log_file = args.log_file.clone();
    }

    if let Err(errors) = cfg.validate() {
        let list: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        return Err(anyhow::anyhow!("Invalid configuration:\n  {}", list.join("\n  ")));
    }
    tracing::debug!(endpoint = %cfg.endpoint, format = ?cfg.format, "configuration");

    let diagnostics = match &cfg.log_file {
        Some(path) => diagnostics::Diagnostics::with_log_file(path)?,
        None => diagnostics::Diagnostics::new(),
    };

    if let Some(path) = diagnostics.log_path() {
        tracing::debug!(path = %path.display(), "diagnostics log attached");
    }

    let source = Arc::new(fetch::HttpSource::new(&cfg.endpoint));
    let source_name = source.url().to_string();
    let mut view = UsersView::new(source, &source_name, diagnostics);

    let stdout = std::io::stdout();
    let tty = stdout.is_terminal();
    let style = DateStyle::detect(cfg.locale.as_deref());
    let renderer = render::renderer_for(cfg.format, tty)?;
    let show_loading = tty && cfg.format == OutputFormat::Text;

    run(&mut view, renderer.as_ref(), &style, show_loading, &mut stdout.lock())
}
