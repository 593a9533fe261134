use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Timelike};
use clap::{Args, Parser, Subcommand};
use tokio::sync::RwLock;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use epg_guide::{
    config::Config,
    guide::GuideView,
    models::{ChannelFilter, ProgramRange},
    print::{paginate, print_range, render_grid, render_page},
    scheduling::{Clock, NowTicker, RefreshPoller, SystemClock, Visibility, follow_now},
    sources::{GuideDataSource, HttpGuideSource, StaticGuideSource, load_snapshot},
};

#[derive(Parser)]
#[command(name = "epg-guide")]
#[command(version)]
#[command(about = "Time-grid program guide over a channel/EPG backend")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path (defaults to $CONFIG_FILE, then config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read channels, EPG entries and programs from a JSON snapshot instead of HTTP
    #[arg(long, value_name = "FILE")]
    source_file: Option<PathBuf>,

    /// Backend base URL (overrides config file)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the visible rows of one guide window
    Grid {
        #[command(flatten)]
        selection: Selection,

        /// Vertical scroll offset in pixels
        #[arg(long, default_value_t = 0.0)]
        scroll: f64,

        /// Viewport height in pixels (defaults to guide.viewport_height_px)
        #[arg(long)]
        viewport: Option<f64>,
    },
    /// Render paginated print pages
    Print {
        #[command(flatten)]
        selection: Selection,

        /// Total hours to print
        #[arg(long, default_value_t = 24)]
        hours: i64,
    },
    /// Keep the guide refreshed and re-render on every change until Ctrl-C
    Watch {
        #[command(flatten)]
        selection: Selection,
    },
}

#[derive(Args)]
struct Selection {
    /// Local date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Local start hour (0-23); defaults to the current hour
    #[arg(long)]
    hour: Option<u32>,

    /// Case-insensitive channel name search
    #[arg(long)]
    search: Option<String>,

    /// Exact channel group
    #[arg(long)]
    group: Option<String>,
}

impl Selection {
    fn filter(&self) -> ChannelFilter {
        ChannelFilter {
            search: self.search.clone(),
            group: self.group.clone(),
        }
    }

    /// Local date and start hour, falling back to "now" in `view`'s timezone
    fn resolve(&self, view: &GuideView) -> (NaiveDate, u32) {
        let now_local = view.now().with_timezone(&view.timezone());
        (
            self.date.unwrap_or_else(|| now_local.date_naive()),
            self.hour.unwrap_or_else(|| now_local.hour()),
        )
    }

    fn apply(&self, view: &mut GuideView) -> (NaiveDate, u32) {
        let (date, hour) = self.resolve(view);
        view.set_filter(self.filter());
        view.select(date, hour);
        (date, hour)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("epg_guide={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting EPG guide v{}", env!("CARGO_PKG_VERSION"));

    let config_path = Config::resolve_path(cli.config.as_deref(), |key| std::env::var(key).ok());
    let mut config = Config::load_from_file(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    info!("Configuration loaded from: {}", config_path.display());

    if let Some(base_url) = cli.base_url {
        config.source.base_url = base_url;
    }

    let source: Arc<dyn GuideDataSource> = match &cli.source_file {
        Some(path) => Arc::new(StaticGuideSource::from_file(path).await?),
        None => {
            info!("Using guide backend: {}", config.source.base_url);
            Arc::new(HttpGuideSource::new(&config.source)?)
        }
    };

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let tz = config.guide.tz()?;
    let mut view = GuideView::new(tz, config.layout, config.guide.overscan, clock.now());

    match cli.command {
        Command::Grid {
            selection,
            scroll,
            viewport,
        } => {
            selection.apply(&mut view);
            let window = view.window();
            load_into(source.as_ref(), &mut view, window.into()).await?;
            view.on_resize(viewport.unwrap_or(config.guide.viewport_height_px));
            view.on_scroll(scroll);
            print!("{}", render_grid(&view));
        }
        Command::Print { selection, hours } => {
            let (date, hour) = selection.apply(&mut view);
            let range = print_range(date, hour, hours, &tz);
            load_into(source.as_ref(), &mut view, range.into()).await?;

            let pages = paginate(&range, view.row_count(), &config.print);
            info!("Printing {} pages", pages.len());
            for page in &pages {
                println!("{}", render_page(&view, page, pages.len()));
            }
        }
        Command::Watch { selection } => {
            selection.apply(&mut view);
            let window = view.window();
            load_into(source.as_ref(), &mut view, window.into()).await?;
            view.on_resize(config.guide.viewport_height_px);
            watch(source, clock, view, &config).await?;
        }
    }

    Ok(())
}

async fn load_into(
    source: &dyn GuideDataSource,
    view: &mut GuideView,
    range: ProgramRange,
) -> Result<()> {
    let snapshot = load_snapshot(source, range).await?;
    if snapshot.rejected_programs > 0 {
        warn!(
            "{} programs were dropped during ingestion",
            snapshot.rejected_programs
        );
    }
    view.set_channels(snapshot.channels);
    view.set_epg_entries(snapshot.epg_entries);
    view.set_programs(snapshot.programs);
    info!(
        "Guide loaded: {} channels, {} programs",
        view.channel_count(),
        view.index().program_count()
    );
    Ok(())
}

async fn watch(
    source: Arc<dyn GuideDataSource>,
    clock: Arc<dyn Clock>,
    view: GuideView,
    config: &Config,
) -> Result<()> {
    let view = Arc::new(RwLock::new(view));
    let visibility = Visibility::default();

    let ticker = NowTicker::start(clock, config.guide.now_refresh_interval, &visibility);
    let poller = RefreshPoller::start(
        source.clone(),
        view.clone(),
        config.guide.poll_interval,
        &visibility,
    );
    let mut now_rx = ticker.subscribe();

    print!("{}", render_grid(&*view.read().await));
    info!(
        "Watching guide (now every {}, refresh every {}); Ctrl-C to stop",
        humantime::format_duration(config.guide.now_refresh_interval),
        humantime::format_duration(config.guide.poll_interval)
    );

    // The poller swaps programs in place; repaint on the same cadence
    let mut repaint = tokio::time::interval(config.guide.poll_interval);
    repaint.tick().await;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
            changed = now_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let now = *now_rx.borrow_and_update();
                if let Err(e) = follow_now(source.as_ref(), &view, now).await {
                    warn!("Guide refresh for the new window failed: {}", e);
                }
                print!("{}", render_grid(&*view.read().await));
            }
            _ = repaint.tick() => {
                print!("{}", render_grid(&*view.read().await));
            }
        }
    }

    ticker.stop();
    poller.stop();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_config_flag_is_optional() {
        let cli = Cli::try_parse_from(["epg-guide", "watch"]).unwrap();
        assert_eq!(cli.config, None);

        let cli = Cli::try_parse_from(["epg-guide", "-c", "guide.toml", "watch"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("guide.toml")));
    }

    #[test]
    fn test_parse_grid_arguments() {
        let cli = Cli::try_parse_from([
            "epg-guide",
            "--source-file",
            "guide.json",
            "grid",
            "--date",
            "2024-03-01",
            "--hour",
            "9",
            "--scroll",
            "3000",
        ])
        .unwrap();

        assert_eq!(cli.source_file, Some(PathBuf::from("guide.json")));
        match cli.command {
            Command::Grid {
                selection, scroll, ..
            } => {
                assert_eq!(selection.date, NaiveDate::from_ymd_opt(2024, 3, 1));
                assert_eq!(selection.hour, Some(9));
                assert_eq!(scroll, 3000.0);
            }
            _ => panic!("expected grid"),
        }
    }
}
