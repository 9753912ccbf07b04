//! Console rendering of monitor events

use async_trait::async_trait;
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::thread;
use tokio::sync::oneshot;
use tracing::warn;

use crate::domain::departure::DepartureSnapshot;
use crate::domain::monitor::{DecisionProvider, EventSink, MonitorEvent, TransitionEvent};
use crate::infrastructure::console::prompts::parse_yes_no;
use crate::shared::utils::{clock_now, format_price, DATE_FORMAT};

const RULE_WIDTH: usize = 40;
const BELLS: usize = 3;

/// Status lines, transition blocks and the terminal bell
pub struct ConsoleSink {
    bell: bool,
}

impl ConsoleSink {
    pub fn new(bell: bool) -> Self {
        Self { bell }
    }

    /// Bell characters written after a refund block
    fn bell_sequence(&self) -> String {
        if self.bell {
            "\x07".repeat(BELLS)
        } else {
            String::new()
        }
    }

    fn ring(&self) {
        let bells = self.bell_sequence();
        if bells.is_empty() {
            return;
        }
        let mut stdout = io::stdout();
        let _ = write!(stdout, "{}", bells);
        let _ = stdout.flush();
    }
}

/// Text for one event, without colour or bell
pub fn render_event(event: &MonitorEvent) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let now = clock_now();

    match event {
        MonitorEvent::Started { settings, .. } => format!(
            "\nWatching for refund tickets\nDate: {}\nDeparture: {}\nCheck interval: {}s\nAlert threshold: {}\n{}",
            settings.date.format(DATE_FORMAT),
            settings.departure_time,
            settings.interval.as_secs(),
            settings.alert_threshold,
            "=".repeat(RULE_WIDTH + 10),
        ),
        MonitorEvent::Reading { check, transition, departure } => match transition.event {
            TransitionEvent::Initial => format!("[{}] Initial state: {} seats", now, transition.current),
            TransitionEvent::NoChange if transition.current == 0 => format!(
                "[{}] Check #{}: {} seats - waiting for refund tickets...",
                now, check, transition.current
            ),
            TransitionEvent::NoChange => format!(
                "[{}] Check #{}: {} seats - tickets already available, stopping",
                now, check, transition.current
            ),
            TransitionEvent::RefundDetected => format!(
                "\n{}\n[{}] Seats changed: {} -> {}\nRefund tickets found! {} seats on sale\nDeparture id: {}\nRunning time: {} min\nPrice: {}\nGo book now!\n{}\n",
                rule,
                now,
                transition.previous.unwrap_or(0),
                transition.current,
                transition.current,
                departure.id.as_deref().unwrap_or("N/A"),
                departure.running_minutes,
                format_price(departure.price),
                rule,
            ),
            TransitionEvent::Increase | TransitionEvent::Decrease => {
                let delta = transition.delta();
                let trend = if delta > 0 {
                    format!("Seats up: +{}", delta)
                } else {
                    format!("Seats down: {}", delta)
                };
                format!(
                    "\n{}\n[{}] Seats changed: {} -> {}\n{}\n{}\n",
                    rule,
                    now,
                    transition.previous.unwrap_or(0),
                    transition.current,
                    trend,
                    rule,
                )
            }
        },
        MonitorEvent::ReadFailed { attempt, error } => {
            format!("[{}] Attempt #{}: could not read departure ({})", now, attempt, error)
        }
        MonitorEvent::Notification { subject, outcome: Ok(()) } => {
            format!("[Email] Sent: {}", subject)
        }
        MonitorEvent::Notification { outcome: Err(reason), .. } => {
            format!("[Email] Failed: {}", reason)
        }
        MonitorEvent::Stopped { report } => format!(
            "\nMonitoring ended ({}), {} checks in total",
            report.stop_reason.describe(),
            report.checks
        ),
    }
}

impl EventSink for ConsoleSink {
    fn emit(&self, event: &MonitorEvent) {
        let text = render_event(event);
        match event {
            MonitorEvent::Reading { transition, .. } if transition.event == TransitionEvent::RefundDetected => {
                println!("{}", text.green().bold());
                self.ring();
            }
            MonitorEvent::Reading { transition, .. } if transition.event.is_change() => {
                println!("{}", text.yellow());
            }
            MonitorEvent::ReadFailed { .. } => println!("{}", text.red()),
            MonitorEvent::Notification { outcome: Err(_), .. } => println!("{}", text.red()),
            _ => println!("{}", text),
        }
    }
}

type InputFactory = Arc<dyn Fn() -> Box<dyn BufRead> + Send + Sync>;

/// Reads the post-alert decision from a line reader; blank means yes
pub struct ConsoleDecision {
    input: InputFactory,
}

impl ConsoleDecision {
    pub fn stdin() -> Self {
        Self::with_input(|| Box::new(io::stdin().lock()))
    }

    /// `input` is called on the reading thread for every question
    pub fn with_input<F>(input: F) -> Self
    where
        F: Fn() -> Box<dyn BufRead> + Send + Sync + 'static,
    {
        Self { input: Arc::new(input) }
    }
}

#[async_trait]
impl DecisionProvider for ConsoleDecision {
    async fn continue_after_alert(&self, _departure: &DepartureSnapshot) -> bool {
        print!("\nRefund tickets found! Keep monitoring? (Y/n): ");
        let _ = io::stdout().flush();

        let (tx, rx) = oneshot::channel();
        let input = Arc::clone(&self.input);

        // Detached thread, not the blocking pool: runtime shutdown must not
        // wait for a read that a cancelled session abandoned.
        let spawned = thread::Builder::new()
            .name("decision-prompt".into())
            .spawn(move || {
                let mut reader = input();
                let mut line = String::new();
                let _ = tx.send(reader.read_line(&mut line).map(|read| (read, line)));
            });
        if let Err(e) = spawned {
            warn!("Failed to start decision prompt: {}", e);
            return false;
        }

        match rx.await {
            Ok(Ok((0, _))) => false,
            Ok(Ok((_, line))) => parse_yes_no(&line, true),
            Ok(Err(e)) => {
                warn!("Failed to read decision: {}", e);
                false
            }
            Err(_) => {
                warn!("Decision prompt ended without an answer");
                false
            }
        }
    }
}
