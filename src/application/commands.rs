//! CLI commands and handlers
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::application::refund_monitor::RefundMonitor;
use crate::application::services::{DayDepartures, ScheduleService};
use crate::domain::departure::DepartureSnapshot;
use crate::domain::monitor::MonitorSettings;
use crate::domain::notification::{AlertMessage, Notifier};
use crate::infrastructure::api_clients::{BookingScheduleClient, ScheduleSource};
use crate::infrastructure::console::table::{print_departures, render_details};
use crate::infrastructure::console::{ConsoleDecision, ConsoleSink, Prompter};
use crate::infrastructure::mail::SmtpNotifier;
use crate::shared::config::DEFAULT_CONFIG_PATH;
use crate::shared::errors::AppError;
use crate::shared::types::WatchConfig;
use crate::shared::utils::{parse_date, parse_departure_time, DATE_FORMAT};

#[derive(Parser)]
#[command(name = "refund-watch", version)]
#[command(about = "Watch a sold-out bus departure and alert when refunded tickets appear")]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the day's departures, split into available and sold out
    Classes {
        /// Travel date (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,
    },

    /// Pick a sold-out departure and watch it for refunds
    Watch(WatchArgs),

    /// Send a test email with the configured settings
    TestEmail,
}

/// Values given here skip the matching prompt
#[derive(Args, Debug, Default)]
pub struct WatchArgs {
    /// Travel date (YYYY-MM-DD)
    #[arg(short, long)]
    pub date: Option<String>,

    /// Departure time of a sold-out departure (HH:MM)
    #[arg(short, long)]
    pub time: Option<String>,

    /// Seconds between checks
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Alert when at least this many seats appear
    #[arg(long)]
    pub threshold: Option<u32>,

    /// Start without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Do not ring the terminal bell on a refund alert
    #[arg(long)]
    pub no_bell: bool,
}

/// Everything the watch flow collects before monitoring starts
struct WatchPlan {
    departure: DepartureSnapshot,
    settings: MonitorSettings,
}

pub struct CommandExecutor;

impl CommandExecutor {
    /// Execute the selected command
    pub async fn execute(command: Commands, config: WatchConfig) -> Result<(), AppError> {
        match command {
            Commands::Classes { date } => Self::execute_classes_command(&date, &config).await,
            Commands::Watch(args) => Self::execute_watch_command(args, config).await,
            Commands::TestEmail => Self::execute_test_email_command(&config).await,
        }
    }

    fn schedule_client(config: &WatchConfig) -> Result<Arc<BookingScheduleClient>, AppError> {
        Ok(Arc::new(BookingScheduleClient::new(&config.api, config.route.clone())?))
    }

    fn require_date(input: &str) -> Result<chrono::NaiveDate, AppError> {
        parse_date(input)
            .ok_or_else(|| AppError::InvalidInput(format!("invalid date '{}', expected YYYY-MM-DD", input)))
    }

    fn print_day(route: &str, date: chrono::NaiveDate, day: &DayDepartures) {
        println!(
            "\n{} on {}: {} departures",
            route.bold(),
            date.format(DATE_FORMAT),
            day.total()
        );
        print_departures("With tickets", &day.available);
        print_departures("Sold out", &day.sold_out);
    }

    /// Execute classes command
    async fn execute_classes_command(date: &str, config: &WatchConfig) -> Result<(), AppError> {
        let date = Self::require_date(date)?;
        let client = Self::schedule_client(config)?;
        let service = ScheduleService::new(client, config.route.clone());

        let day = service.day_departures(date).await?;
        if day.is_empty() {
            println!("No departures found for {}", date.format(DATE_FORMAT));
            return Ok(());
        }

        Self::print_day(&config.route.describe(), date, &day);
        Ok(())
    }

    /// Execute watch command
    async fn execute_watch_command(args: WatchArgs, config: WatchConfig) -> Result<(), AppError> {
        let client = Self::schedule_client(&config)?;
        let service = ScheduleService::new(client.clone(), config.route.clone());

        // The prompter holds the stdin lock; it must be gone before the
        // decision prompt reads stdin from its own thread.
        let plan = {
            let mut prompter = Prompter::stdio();
            match Self::plan_watch(&mut prompter, &service, &args, &config).await? {
                Some(plan) => plan,
                None => return Ok(()),
            }
        };

        let source: Arc<dyn ScheduleSource> = client;
        let monitor = RefundMonitor::new(
            source,
            Arc::new(SmtpNotifier::new(config.email.clone())),
            Arc::new(ConsoleDecision::stdin()),
            Arc::new(ConsoleSink::new(!args.no_bell)),
            config.route.clone(),
            plan.settings,
        );

        let cancel = CancellationToken::new();
        let ctrl_c = Self::cancel_on_ctrl_c(cancel.clone());

        info!(
            departure = %plan.departure.departure_time,
            route = %config.route.describe(),
            "Starting watch"
        );
        let report = monitor.run(cancel).await;
        ctrl_c.abort();

        info!(checks = report.checks, reason = report.stop_reason.describe(), "Watch finished");
        Ok(())
    }

    fn cancel_on_ctrl_c(cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Interrupt received, stopping");
                    cancel.cancel();
                }
                Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
            }
        })
    }

    /// Collect date, departure, interval and threshold; `None` when there is nothing to watch
    async fn plan_watch<R, W>(
        prompter: &mut Prompter<R, W>,
        service: &ScheduleService,
        args: &WatchArgs,
        config: &WatchConfig,
    ) -> Result<Option<WatchPlan>, AppError>
    where
        R: std::io::BufRead,
        W: std::io::Write,
    {
        let date = match &args.date {
            Some(input) => Self::require_date(input)?,
            None => prompter.read_date()?,
        };

        let day = service.day_departures(date).await?;
        if day.is_empty() {
            println!("No departures found for {}", date.format(DATE_FORMAT));
            return Ok(None);
        }
        Self::print_day(&config.route.describe(), date, &day);

        if day.sold_out.is_empty() {
            println!("{}", "Every departure still has tickets, nothing to watch.".green());
            return Ok(None);
        }

        let departure = match &args.time {
            Some(input) => {
                let time = parse_departure_time(input)
                    .ok_or_else(|| AppError::InvalidInput(format!("invalid time '{}', expected HH:MM", input)))?;
                day.sold_out_at(&time).cloned().ok_or_else(|| {
                    AppError::InvalidInput(format!("no sold-out departure at {} on {}", time, date))
                })?
            }
            None => match prompter.choose_departure(day.sold_out.len())? {
                Some(index) => day.sold_out[index].clone(),
                None => return Ok(None),
            },
        };

        println!("\n{}", "Selected departure".bold());
        println!("{}", render_details(&departure));

        let interval = match args.interval {
            Some(secs) => secs,
            None => prompter.read_interval(config.monitor.interval_secs)?,
        };
        let threshold = match args.threshold {
            Some(value) => value,
            None => prompter.read_threshold(config.monitor.alert_threshold)?,
        };

        if !args.yes && !prompter.confirm("Start monitoring?", true)? {
            println!("Monitoring not started.");
            return Ok(None);
        }

        let settings = MonitorSettings::new(
            date,
            departure.departure_time.clone(),
            Duration::from_secs(interval),
            threshold,
        )?;
        Ok(Some(WatchPlan { departure, settings }))
    }

    /// Execute test-email command
    async fn execute_test_email_command(config: &WatchConfig) -> Result<(), AppError> {
        let notifier = SmtpNotifier::new(config.email.clone());
        let message = AlertMessage::test();

        info!(
            channel = notifier.channel_type(),
            receiver = %config.email.receiver_email,
            "Sending test email"
        );
        notifier.notify(&message.subject, &message.body).await?;

        println!("{} {}", "Test email sent to".green(), config.email.receiver_email);
        Ok(())
    }
}
