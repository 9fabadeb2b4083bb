mod clock;
mod config;
mod countdown;
mod dua;
mod error;
mod geolocation;
mod render;
mod session;
mod time_format;
mod timings;

use std::io::Write;
use std::pin::pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Local;
use futures::StreamExt;
use tokio::sync::watch;
use tracing::{Instrument, debug, error, info, span, warn};
use tracing_subscriber::EnvFilter;

use crate::clock::{Clock, SystemClock, TICK};
use crate::config::Config;
use crate::countdown::{CountdownEngine, UrgencyStatus};
use crate::dua::DuaTabs;
use crate::error::AppError;
use crate::session::{FetchOutcome, Session};
use crate::timings::{Location, TimingsClient};

/// How often the background task checks whether the day has turned over.
const STALE_CHECK_PERIOD: Duration = Duration::from_secs(60);

const DEFAULT_WATCH_SECS: usize = 10;

const HELP: &str = "\
Commands:
  show                      redraw the dashboard
  times                     list every event of the day
  refresh                   fetch today's timings again
  city <city>, <country>    switch to a named city
  coords <lat> <lng>        switch to coordinates
  locate                    switch to the detected position
  dua [sehri|aftari|note]   open a dua tab (or `dua close`)
  watch [seconds]           follow the clock and countdown
  help                      show this list
  exit                      quit";

/// The main function initializes the tracing subscriber, loads today's timings,
/// starts the countdown engine and the daily refresher, and then reads commands
/// until the user inputs "exit".
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    debug!(?config, "Configuration loaded");

    let client = TimingsClient::new(config.api_base.clone(), config.method, config.school);
    let session = Arc::new(Session::new(config.location.clone()));
    let countdown = CountdownEngine::spawn(session.subscribe(), SystemClock);

    if let Err(e) = session
        .refresh(&client)
        .instrument(span!(tracing::Level::INFO, "initial_load"))
        .await
    {
        error!("Failed to load timings: {}", e);
    }

    let announcer = tokio::spawn(announce_urgency(countdown.subscribe()));
    let refresher = tokio::spawn(refresh_daily(Arc::clone(&session), client.clone()));

    let mut app = App {
        label: location_label(&config.location),
        tabs: DuaTabs::new(config.dua_auto_close, Instant::now()),
        config,
        client,
        session,
        countdown,
    };
    println!("{}", app.dashboard());
    info!("Type `help` for commands, `exit` to stop");

    // read commands until the user sends `exit`
    let mut buffer = String::new();
    print!("> ");
    std::io::stdout().flush()?;
    let mut read = std::io::stdin().read_line(&mut buffer)?;

    while read > 0 && buffer.trim() != "exit" {
        let command = buffer.trim();

        if !command.is_empty() {
            let result = app
                .handle(command)
                .instrument(span!(tracing::Level::INFO, "command", command))
                .await;
            if let Err(e) = result {
                error!("{}", e);
            }
        }

        print!("> ");
        std::io::stdout().flush()?;

        buffer.clear();
        read = std::io::stdin().read_line(&mut buffer)?;
    }

    info!("Shutting down");
    refresher.abort();
    announcer.abort();
    Ok(())
}

struct App {
    config: Config,
    client: TimingsClient,
    session: Arc<Session>,
    countdown: CountdownEngine,
    tabs: DuaTabs,
    /// Shown on the sunrise/sunset card
    label: String,
}

impl App {
    async fn handle(&mut self, command: &str) -> Result<(), AppError> {
        let (name, args) = command
            .split_once(char::is_whitespace)
            .map(|(name, args)| (name, args.trim()))
            .unwrap_or((command, ""));

        match name {
            "show" => println!("{}", self.dashboard()),
            "help" => println!("{HELP}"),
            "times" => println!("{}", render::all_timings(self.session.snapshot().as_deref())),
            "refresh" => match self.session.refresh(&self.client).await? {
                FetchOutcome::Applied => println!("{}", self.dashboard()),
                FetchOutcome::Discarded => println!("Location changed while refreshing"),
            },
            "city" => {
                let (city, country) = args
                    .split_once(',')
                    .map(|(city, country)| (city.trim(), country.trim()))
                    .filter(|(city, country)| !city.is_empty() && !country.is_empty())
                    .ok_or_else(|| {
                        AppError::MissingParameter("usage: city <city>, <country>".to_string())
                    })?;
                self.switch_to(Location::city(city, country), city.to_string())
                    .await?;
            }
            "coords" => {
                let location = parse_coordinates(args)?;
                let label = location.to_string();
                self.switch_to(location, label).await?;
            }
            "locate" => match geolocation::locate().await {
                Ok(position) => self.switch_to(position.location, position.label).await?,
                Err(e) => {
                    warn!("Position request failed: {:?}", e);
                    println!("{e}");
                }
            },
            "dua" => {
                let now = Instant::now();
                match args {
                    "" => {}
                    "close" => self.tabs.close(),
                    tab => self.tabs.select(tab.parse()?, now),
                }
                println!("{}", render::dua(self.tabs.active(now)));
            }
            "watch" => {
                let secs = match args {
                    "" => DEFAULT_WATCH_SECS,
                    secs => secs.parse().map_err(|_| {
                        AppError::MissingParameter(format!("watch takes seconds, got {secs:?}"))
                    })?,
                };
                self.watch(secs).await;
            }
            other => return Err(AppError::UnknownCommand(other.to_string())),
        }
        Ok(())
    }

    async fn switch_to(&mut self, location: Location, label: String) -> Result<(), AppError> {
        match self.session.fetch(&self.client, location).await? {
            FetchOutcome::Applied => {
                self.label = label;
                println!("{}", self.dashboard());
            }
            FetchOutcome::Discarded => println!("{label} was overtaken by a newer switch"),
        }
        Ok(())
    }

    /// Prints the clock, and the banner while one is showing, once per tick.
    async fn watch(&self, secs: usize) {
        let snapshot = self.session.snapshot();
        let mut ticks = pin!(clock::ticks(TICK).take(secs));
        while ticks.next().await.is_some() {
            println!("{}", render::clock(SystemClock.now(), snapshot.as_deref()));
            if let Some(banner) = render::banner(self.countdown.status()) {
                println!("{banner}");
            }
        }
    }

    fn dashboard(&self) -> String {
        let snapshot = self.session.snapshot();
        let snapshot = snapshot.as_deref();
        let mut panels = vec![
            render::header(snapshot, self.config.hijri_adjustment),
            render::clock(SystemClock.now(), snapshot),
            render::sun_card(&self.label, snapshot),
            render::prayer_list(snapshot),
        ];
        panels.extend(render::banner(self.countdown.status()));
        panels.push(render::dua(self.tabs.active(Instant::now())));
        panels.join("\n\n")
    }
}

fn location_label(location: &Location) -> String {
    match location {
        Location::City { city, .. } => city.clone(),
        Location::Coordinates { .. } => location.to_string(),
    }
}

fn parse_coordinates(args: &str) -> Result<Location, AppError> {
    let usage = || AppError::MissingParameter("usage: coords <lat> <lng>".to_string());
    let mut parts = args.split(|c: char| c.is_whitespace() || c == ',').filter(|p| !p.is_empty());

    let latitude: f64 = parts.next().ok_or_else(usage)?.parse().map_err(|_| usage())?;
    let longitude: f64 = parts.next().ok_or_else(usage)?.parse().map_err(|_| usage())?;
    if parts.next().is_some()
        || !(-90.0..=90.0).contains(&latitude)
        || !(-180.0..=180.0).contains(&longitude)
    {
        return Err(usage());
    }
    Ok(Location::coordinates(latitude, longitude))
}

/// Prints the urgency banner on every status change while a window is open.
async fn announce_urgency(mut status: watch::Receiver<UrgencyStatus>) {
    while status.changed().await.is_ok() {
        let current = *status.borrow_and_update();
        if let Some(banner) = render::banner(current) {
            println!("\n{banner}");
        }
    }
}

/// Re-fetches once the local date moves past the snapshot's date.
async fn refresh_daily(session: Arc<Session>, client: TimingsClient) {
    let mut ticks = pin!(clock::ticks(STALE_CHECK_PERIOD));
    while ticks.next().await.is_some() {
        let today = Local::now().date_naive();
        if session.snapshot().is_some() && session.is_stale(today) {
            info!("Timings are from another day, refreshing for {}", today);
            if let Err(e) = session.refresh(&client).await {
                warn!("Daily refresh failed, keeping stale timings: {}", e);
            }
        }
    }
}
