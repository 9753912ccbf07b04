//! Refund monitoring loop

use std::sync::Arc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::domain::departure::{locate, DepartureSnapshot};
use crate::domain::monitor::{
    DecisionProvider, EventSink, MonitorEvent, MonitorReport, MonitorSession, MonitorSettings,
    StopReason, Verdict,
};
use crate::domain::notification::{AlertMessage, Notifier};
use crate::infrastructure::api_clients::ScheduleSource;
use crate::shared::errors::LocateError;
use crate::shared::types::RouteConfig;

/// Polls one departure and raises an alert when refund tickets appear
pub struct RefundMonitor {
    source: Arc<dyn ScheduleSource>,
    notifier: Arc<dyn Notifier>,
    decisions: Arc<dyn DecisionProvider>,
    sink: Arc<dyn EventSink>,
    route: RouteConfig,
    settings: MonitorSettings,
}

impl RefundMonitor {
    pub fn new(
        source: Arc<dyn ScheduleSource>,
        notifier: Arc<dyn Notifier>,
        decisions: Arc<dyn DecisionProvider>,
        sink: Arc<dyn EventSink>,
        route: RouteConfig,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            source,
            notifier,
            decisions,
            sink,
            route,
            settings,
        }
    }

    /// Run until cancelled, tickets turn out to be on sale, or the operator declines.
    ///
    /// Every exit goes through the same cleanup, so the returned report and the
    /// final `Stopped` event always carry the session totals.
    pub async fn run(&self, cancel: CancellationToken) -> MonitorReport {
        let mut session = MonitorSession::new(self.settings.clone());
        session.start();

        info!(
            session = %session.id(),
            date = %self.settings.date,
            departure = %self.settings.departure_time,
            interval_secs = self.settings.interval.as_secs(),
            threshold = self.settings.alert_threshold,
            "Refund monitoring started"
        );
        self.sink.emit(&MonitorEvent::Started {
            session_id: session.id().to_string(),
            settings: self.settings.clone(),
        });

        let reason = loop {
            if cancel.is_cancelled() {
                break StopReason::Cancelled;
            }

            let attempt = session.begin_attempt();
            let reading = tokio::select! {
                biased;
                _ = cancel.cancelled() => break StopReason::Cancelled,
                reading = self.read_departure() => reading,
            };

            match reading {
                Err(e) => {
                    match &e {
                        LocateError::Fetch(fetch) if fetch.is_transport() => {
                            warn!(attempt, error = %e, "Booking service unreachable, retrying next cycle")
                        }
                        _ => warn!(attempt, error = %e, "Departure read failed, retrying next cycle"),
                    }
                    self.sink.emit(&MonitorEvent::ReadFailed { attempt, error: e });
                }
                Ok(departure) => {
                    let (transition, verdict) = session.record_reading(departure.available_seats);
                    debug!(
                        check = session.check_count(),
                        event = transition.event.as_str(),
                        seats = transition.current,
                        "Seat count read"
                    );
                    self.sink.emit(&MonitorEvent::Reading {
                        check: session.check_count(),
                        transition,
                        departure: departure.clone(),
                    });

                    match verdict {
                        Verdict::Continue => {}
                        Verdict::Stop(reason) => break reason,
                        Verdict::AwaitDecision => {
                            info!(
                                seats = departure.available_seats,
                                departure = %departure.departure_time,
                                "Refund tickets detected"
                            );

                            tokio::select! {
                                biased;
                                _ = cancel.cancelled() => break StopReason::Cancelled,
                                _ = self.send_alert(&departure) => session.record_alert(),
                            }

                            let keep_going = tokio::select! {
                                biased;
                                _ = cancel.cancelled() => break StopReason::Cancelled,
                                answer = self.decisions.continue_after_alert(&departure) => answer,
                            };
                            if !keep_going {
                                break StopReason::OperatorDeclined;
                            }
                            session.resume();
                            info!("Operator chose to keep monitoring");
                        }
                    }
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break StopReason::Cancelled,
                _ = sleep(self.settings.interval) => {}
            }
        };

        let report = session.stop(reason);
        info!(
            session = %report.session_id,
            checks = report.checks,
            attempts = report.attempts,
            alerts = report.alerts,
            reason = report.stop_reason.describe(),
            "Refund monitoring stopped"
        );
        self.sink.emit(&MonitorEvent::Stopped { report: report.clone() });
        report
    }

    async fn read_departure(&self) -> Result<DepartureSnapshot, LocateError> {
        let schedule = self.source.fetch_day(self.settings.date).await?;
        locate(&schedule, &self.route, self.settings.date, &self.settings.departure_time)
    }

    /// One delivery attempt; failures are reported and never stop the loop
    async fn send_alert(&self, departure: &DepartureSnapshot) {
        let message = AlertMessage::refund(self.settings.date, departure);
        let outcome = self.notifier.notify(&message.subject, &message.body).await;

        match &outcome {
            Ok(()) => info!(channel = self.notifier.channel_type(), subject = %message.subject, "Alert delivered"),
            Err(e) => error!(channel = self.notifier.channel_type(), error = %e, "Alert delivery failed"),
        }

        self.sink.emit(&MonitorEvent::Notification {
            subject: message.subject,
            outcome: outcome.map_err(|e| e.to_string()),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::domain::departure::fixtures::{date, route_entry};
    use crate::domain::departure::DaySchedule;
    use crate::domain::monitor::{FixedDecision, TransitionEvent};
    use crate::shared::errors::{FetchError, NotificationError};

    enum Step {
        Seats(u32),
        Fail(FetchError),
        NoRoute,
        NoDeparture,
    }

    /// Replays scripted polls, then cancels the session
    struct ScriptedSource {
        steps: Mutex<VecDeque<Step>>,
        cancel: CancellationToken,
    }

    impl ScriptedSource {
        fn new(steps: Vec<Step>, cancel: &CancellationToken) -> Arc<Self> {
            Arc::new(Self {
                steps: Mutex::new(steps.into()),
                cancel: cancel.clone(),
            })
        }
    }

    #[async_trait]
    impl ScheduleSource for ScriptedSource {
        async fn fetch_day(&self, day: NaiveDate) -> Result<DaySchedule, FetchError> {
            let step = self.steps.lock().unwrap().pop_front();
            let routes = match step {
                Some(Step::Seats(seats)) => vec![route_entry("North Gate", "Airport", &[("08:00", seats)])],
                Some(Step::Fail(e)) => return Err(e),
                Some(Step::NoRoute) => vec![route_entry("North Gate", "Harbour", &[("08:00", 9)])],
                Some(Step::NoDeparture) => vec![route_entry("North Gate", "Airport", &[("09:30", 9)])],
                None => {
                    self.cancel.cancel();
                    return Err(FetchError::Transport("script exhausted".into()));
                }
            };
            Ok(DaySchedule::new(day, routes))
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        fail: bool,
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        fn channel_type(&self) -> &'static str {
            "memory"
        }

        async fn notify(&self, subject: &str, _body: &str) -> Result<(), NotificationError> {
            self.sent.lock().unwrap().push(subject.to_string());
            if self.fail {
                Err(NotificationError::Authentication("535 login rejected".into()))
            } else {
                Ok(())
            }
        }
    }

    struct ScriptedDecisions {
        answers: Mutex<VecDeque<bool>>,
        asked: AtomicUsize,
    }

    impl ScriptedDecisions {
        fn new(answers: &[bool]) -> Arc<Self> {
            Arc::new(Self {
                answers: Mutex::new(answers.iter().copied().collect()),
                asked: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl DecisionProvider for ScriptedDecisions {
        async fn continue_after_alert(&self, _departure: &DepartureSnapshot) -> bool {
            self.asked.fetch_add(1, Ordering::SeqCst);
            self.answers.lock().unwrap().pop_front().unwrap_or(false)
        }
    }

    /// Cancels the session while the operator is being asked
    struct InterruptedDecision {
        cancel: CancellationToken,
    }

    #[async_trait]
    impl DecisionProvider for InterruptedDecision {
        async fn continue_after_alert(&self, _departure: &DepartureSnapshot) -> bool {
            self.cancel.cancel();
            std::future::pending::<bool>().await
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<MonitorEvent>>,
    }

    impl RecordingSink {
        fn readings(&self) -> Vec<TransitionEvent> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter_map(|event| match event {
                    MonitorEvent::Reading { transition, .. } => Some(transition.event),
                    _ => None,
                })
                .collect()
        }

        fn count(&self, matches: fn(&MonitorEvent) -> bool) -> usize {
            self.events.lock().unwrap().iter().filter(|e| matches(e)).count()
        }

        fn last(&self) -> Option<MonitorEvent> {
            self.events.lock().unwrap().last().cloned()
        }
    }

    impl EventSink for RecordingSink {
        fn emit(&self, event: &MonitorEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    fn route() -> RouteConfig {
        RouteConfig {
            start_node_name: "North Gate".into(),
            arrival_node_name: "Airport".into(),
            ..Default::default()
        }
    }

    fn settings(threshold: u32) -> MonitorSettings {
        MonitorSettings::new(date(), "08:00", Duration::from_millis(1), threshold).unwrap()
    }

    fn monitor(
        source: Arc<dyn ScheduleSource>,
        notifier: Arc<dyn Notifier>,
        decisions: Arc<dyn DecisionProvider>,
        sink: Arc<RecordingSink>,
        threshold: u32,
    ) -> RefundMonitor {
        RefundMonitor::new(source, notifier, decisions, sink, route(), settings(threshold))
    }

    fn is_failure(event: &MonitorEvent) -> bool {
        matches!(event, MonitorEvent::ReadFailed { .. })
    }

    fn is_notification(event: &MonitorEvent) -> bool {
        matches!(event, MonitorEvent::Notification { .. })
    }

    #[tokio::test]
    async fn test_refund_after_sold_out_alerts_once() {
        let cancel = CancellationToken::new();
        let source = ScriptedSource::new(vec![Step::Seats(0), Step::Seats(0), Step::Seats(3)], &cancel);
        let notifier = Arc::new(RecordingNotifier::default());
        let decisions = ScriptedDecisions::new(&[true]);
        let sink = Arc::new(RecordingSink::default());

        let report = monitor(source, notifier.clone(), decisions.clone(), sink.clone(), 1)
            .run(cancel)
            .await;

        assert_eq!(
            sink.readings(),
            vec![TransitionEvent::Initial, TransitionEvent::NoChange, TransitionEvent::RefundDetected]
        );
        assert_eq!(*notifier.sent.lock().unwrap(), vec!["[Refund ticket] 2026-02-14 08:00 departure"]);
        assert_eq!(decisions.asked.load(Ordering::SeqCst), 1);
        assert_eq!(report.stop_reason, StopReason::Cancelled);
        assert_eq!(report.checks, 3);
        assert_eq!(report.alerts, 1);
        assert_eq!(report.last_seen, Some(3));
    }

    #[tokio::test]
    async fn test_sell_out_does_not_alert() {
        let cancel = CancellationToken::new();
        let source = ScriptedSource::new(vec![Step::Seats(2), Step::Seats(0)], &cancel);
        let notifier = Arc::new(RecordingNotifier::default());
        let sink = Arc::new(RecordingSink::default());

        let report = monitor(source, notifier.clone(), Arc::new(FixedDecision(true)), sink.clone(), 1)
            .run(cancel)
            .await;

        assert_eq!(sink.readings(), vec![TransitionEvent::Initial, TransitionEvent::Decrease]);
        assert!(notifier.sent.lock().unwrap().is_empty());
        assert_eq!(report.last_seen, Some(0));
        assert_eq!(report.stop_reason, StopReason::Cancelled);
    }

    #[tokio::test]
    async fn test_declined_decision_stops_after_one_alert() {
        let cancel = CancellationToken::new();
        let source = ScriptedSource::new(vec![Step::Seats(0), Step::Seats(5), Step::Seats(5)], &cancel);
        let notifier = Arc::new(RecordingNotifier::default());
        let decisions = ScriptedDecisions::new(&[false]);
        let sink = Arc::new(RecordingSink::default());

        let report = monitor(source, notifier.clone(), decisions.clone(), sink.clone(), 1)
            .run(cancel.clone())
            .await;

        assert_eq!(report.stop_reason, StopReason::OperatorDeclined);
        assert_eq!(report.checks, 2);
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
        assert_eq!(decisions.asked.load(Ordering::SeqCst), 1);
        assert!(!cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_failures_keep_baseline_untouched() {
        let cancel = CancellationToken::new();
        let steps = vec![
            Step::Fail(FetchError::Transport("connection reset".into())),
            Step::Fail(FetchError::Status(502)),
            Step::Fail(FetchError::Payload("not json".into())),
            Step::Seats(4),
        ];
        let source = ScriptedSource::new(steps, &cancel);
        let sink = Arc::new(RecordingSink::default());

        let report = monitor(
            source,
            Arc::new(RecordingNotifier::default()),
            Arc::new(FixedDecision(true)),
            sink.clone(),
            1,
        )
        .run(cancel)
        .await;

        assert_eq!(sink.readings(), vec![TransitionEvent::Initial]);
        assert_eq!(report.checks, 1);
        assert_eq!(report.attempts, 5);
        assert_eq!(report.last_seen, Some(4));
        assert_eq!(sink.count(is_failure), 4);
    }

    #[tokio::test]
    async fn test_missing_route_or_departure_is_a_failed_read() {
        let cancel = CancellationToken::new();
        let steps = vec![Step::NoRoute, Step::Seats(0), Step::NoDeparture, Step::Seats(0)];
        let source = ScriptedSource::new(steps, &cancel);
        let sink = Arc::new(RecordingSink::default());

        let report = monitor(
            source,
            Arc::new(RecordingNotifier::default()),
            Arc::new(FixedDecision(true)),
            sink.clone(),
            1,
        )
        .run(cancel)
        .await;

        assert_eq!(sink.readings(), vec![TransitionEvent::Initial, TransitionEvent::NoChange]);
        assert_eq!(report.checks, 2);

        let events = sink.events.lock().unwrap();
        assert!(events.iter().any(|e| matches!(
            e,
            MonitorEvent::ReadFailed { error: LocateError::RouteNotFound { .. }, .. }
        )));
        assert!(events.iter().any(|e| matches!(
            e,
            MonitorEvent::ReadFailed { error: LocateError::DepartureNotFound(_), .. }
        )));
    }

    #[tokio::test]
    async fn test_tickets_already_on_sale_stops() {
        let cancel = CancellationToken::new();
        let source = ScriptedSource::new(vec![Step::Seats(5), Step::Seats(5), Step::Seats(5)], &cancel);
        let notifier = Arc::new(RecordingNotifier::default());
        let sink = Arc::new(RecordingSink::default());

        let report = monitor(source, notifier.clone(), Arc::new(FixedDecision(true)), sink.clone(), 1)
            .run(cancel.clone())
            .await;

        assert_eq!(report.stop_reason, StopReason::TicketsAlreadyAvailable);
        assert_eq!(report.checks, 2);
        assert!(notifier.sent.lock().unwrap().is_empty());
        assert!(!cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_increase_below_threshold_is_not_a_refund() {
        let cancel = CancellationToken::new();
        let source = ScriptedSource::new(vec![Step::Seats(0), Step::Seats(1)], &cancel);
        let notifier = Arc::new(RecordingNotifier::default());
        let sink = Arc::new(RecordingSink::default());

        monitor(source, notifier.clone(), Arc::new(FixedDecision(true)), sink.clone(), 2)
            .run(cancel)
            .await;

        assert_eq!(sink.readings(), vec![TransitionEvent::Initial, TransitionEvent::Increase]);
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_stop_loop() {
        let cancel = CancellationToken::new();
        let source = ScriptedSource::new(vec![Step::Seats(0), Step::Seats(3), Step::Seats(3)], &cancel);
        let notifier = Arc::new(RecordingNotifier {
            fail: true,
            ..Default::default()
        });
        let sink = Arc::new(RecordingSink::default());

        let report = monitor(source, notifier.clone(), Arc::new(FixedDecision(true)), sink.clone(), 1)
            .run(cancel)
            .await;

        assert_eq!(report.stop_reason, StopReason::TicketsAlreadyAvailable);
        assert_eq!(report.checks, 3);
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
        assert_eq!(sink.count(is_notification), 1);

        let events = sink.events.lock().unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e, MonitorEvent::Notification { outcome: Err(_), .. })));
    }

    #[tokio::test]
    async fn test_cancel_before_first_poll() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let source = ScriptedSource::new(vec![Step::Seats(0)], &cancel);
        let sink = Arc::new(RecordingSink::default());

        let report = monitor(
            source,
            Arc::new(RecordingNotifier::default()),
            Arc::new(FixedDecision(true)),
            sink.clone(),
            1,
        )
        .run(cancel)
        .await;

        assert_eq!(report.stop_reason, StopReason::Cancelled);
        assert_eq!(report.checks, 0);
        assert_eq!(report.attempts, 0);
        assert!(matches!(sink.last(), Some(MonitorEvent::Stopped { .. })));
    }

    #[tokio::test]
    async fn test_cancel_during_decision_still_reports() {
        let cancel = CancellationToken::new();
        let source = ScriptedSource::new(vec![Step::Seats(0), Step::Seats(2)], &cancel);
        let decisions = Arc::new(InterruptedDecision { cancel: cancel.clone() });
        let notifier = Arc::new(RecordingNotifier::default());
        let sink = Arc::new(RecordingSink::default());

        let report = monitor(source, notifier.clone(), decisions, sink.clone(), 1)
            .run(cancel)
            .await;

        assert_eq!(report.stop_reason, StopReason::Cancelled);
        assert_eq!(report.checks, 2);
        assert_eq!(report.alerts, 1);
        match sink.last() {
            Some(MonitorEvent::Stopped { report: emitted }) => assert_eq!(emitted, report),
            other => panic!("expected final Stopped event, got {:?}", other),
        }
    }
}
