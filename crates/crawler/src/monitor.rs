use std::sync::Arc;
use std::time::{Duration, Instant};

use ewe_channels::mspc::{create, create_bounded, ReceiveChannel};

use crate::scheduler::Scheduler;

const MIN_INTERVAL: Duration = Duration::from_millis(1);
const MIN_MAX_IDLE_COUNT: u32 = 1000;

/// Severity tag for [`watch`]'s `record` sink (§4.9 `Monitor`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

/// Tuning knobs for [`watch`] (§4.9 `Monitor`).
#[derive(Debug, Clone, Copy)]
pub struct MonitorArgs {
    /// How often the idleness loop samples [`Scheduler::idle`].
    pub interval: Duration,
    /// Consecutive idle samples before the crawl is declared idle.
    pub max_idle_count: u32,
    /// Whether to call [`Scheduler::stop`] once idleness is declared.
    pub auto_stop: bool,
    /// Whether summary-diff records use [`crate::scheduler::SchedSummary::detail`]
    /// instead of the default `Display`.
    pub detailed: bool,
}

impl Default for MonitorArgs {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            max_idle_count: MIN_MAX_IDLE_COUNT,
            auto_stop: true,
            detailed: false,
        }
    }
}

/// Spawns the three cooperating loops of §4.9: an error drain, a
/// summary-diff logger, and an idleness checker.
///
/// `interval` is clamped to at least 1 ms and `max_idle_count` to at least
/// 1000 samples, guarding against parameters small enough to thrash a live
/// crawl. The idleness loop sends two stop notifications — one per sibling
/// loop — on exit, and publishes the number of idleness samples taken on the
/// returned channel.
#[must_use]
pub fn watch(
    scheduler: Arc<Scheduler>,
    args: MonitorArgs,
    record: impl Fn(Level, String) + Send + Sync + Clone + 'static,
) -> ReceiveChannel<u64> {
    let interval = args.interval.max(MIN_INTERVAL);
    let max_idle_count = args.max_idle_count.max(MIN_MAX_IDLE_COUNT);

    let (done_send, done_recv) = create::<u64>();
    let (stop_notify_send, stop_notify_recv) = create_bounded::<u8>(2);
    let error_stop_notify = stop_notify_recv.clone();

    spawn_error_drain(scheduler.clone(), record.clone(), error_stop_notify);
    spawn_summary_diff(scheduler.clone(), args.detailed, record.clone(), stop_notify_recv);
    spawn_idleness_check(scheduler, interval, max_idle_count, args.auto_stop, record, stop_notify_send, done_send);

    done_recv
}

async fn wait_for_scheduler_start(scheduler: &Scheduler) {
    while !scheduler.running() {
        tokio::time::sleep(MIN_INTERVAL).await;
    }
}

fn spawn_error_drain(
    scheduler: Arc<Scheduler>,
    record: impl Fn(Level, String) + Send + 'static,
    mut stop_notify: ReceiveChannel<u8>,
) {
    tokio::spawn(async move {
        wait_for_scheduler_start(&scheduler).await;
        loop {
            if stop_notify.try_receive().is_ok() {
                return;
            }
            let Some(mut err_recv) = scheduler.error_chan() else {
                return;
            };
            if let Ok(error) = err_recv.async_receive().await {
                record(Level::Error, format!("Error (received from error channel):{error}"));
            }
            tokio::time::sleep(MIN_INTERVAL).await;
        }
    });
}

fn spawn_summary_diff(
    scheduler: Arc<Scheduler>,
    detailed: bool,
    record: impl Fn(Level, String) + Send + 'static,
    mut stop_notify: ReceiveChannel<u8>,
) {
    tokio::spawn(async move {
        wait_for_scheduler_start(&scheduler).await;
        let start_time = Instant::now();
        let mut record_count: u64 = 1;
        let mut previous = None;

        loop {
            if stop_notify.try_receive().is_ok() {
                return;
            }

            let current = scheduler.summary(" ");
            let changed = previous.as_ref().is_none_or(|p| !current.same(p));
            if changed {
                let summary_str = if detailed { current.detail() } else { current.to_string() };
                record(
                    Level::Info,
                    format!(
                        "Monitor - Collected information[{record_count}]:\n  Scheduler:\n{summary_str}\n  Escaped time: {:?}\n",
                        start_time.elapsed()
                    ),
                );
                previous = Some(current);
                record_count += 1;
            }

            tokio::time::sleep(Duration::from_micros(1)).await;
        }
    });
}

#[allow(clippy::too_many_arguments)]
fn spawn_idleness_check(
    scheduler: Arc<Scheduler>,
    interval: Duration,
    max_idle_count: u32,
    auto_stop: bool,
    record: impl Fn(Level, String) + Send + 'static,
    mut stop_notify: ewe_channels::mspc::SendChannel<u8>,
    mut done_send: ewe_channels::mspc::SendChannel<u64>,
) {
    tokio::spawn(async move {
        wait_for_scheduler_start(&scheduler).await;

        let mut check_count: u64 = 0;
        let mut idle_count: u32 = 0;
        let mut first_idle_time = Instant::now();

        loop {
            if scheduler.idle() {
                idle_count += 1;
                if idle_count == 1 {
                    first_idle_time = Instant::now();
                }
                if idle_count >= max_idle_count {
                    record(
                        Level::Info,
                        format!("The scheduler has been idle for a period of time (about {:?}). Now consider what stop it.", first_idle_time.elapsed()),
                    );
                    if scheduler.idle() {
                        if auto_stop {
                            let result = if scheduler.stop() { "success" } else { "failing" };
                            record(Level::Info, format!("Stop scheduler...{result}."));
                        }
                        break;
                    }
                    idle_count = 0;
                }
            } else {
                idle_count = 0;
            }

            check_count += 1;
            tokio::time::sleep(interval).await;
        }

        let _ = stop_notify.try_send(1);
        let _ = stop_notify.try_send(2);
        let _ = done_send.try_send(check_count);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{ChannelArgs, PoolBaseArgs, Request};
    use crate::scheduler::SchedulerArgs;
    use reqwest::Url;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_args() -> SchedulerArgs {
        SchedulerArgs {
            channel_args: ChannelArgs::new(8, 8, 8, 8),
            pool_args: PoolBaseArgs::new(2, 2),
            max_depth: 3,
            parsers: vec![],
            item_processors: vec![],
            fail_fast: false,
            http_client_factory: Arc::new(reqwest::Client::new),
        }
    }

    #[tokio::test]
    async fn declares_idle_after_max_idle_count_unchanged_polls_and_auto_stops() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let scheduler = Arc::new(Scheduler::new(test_args()));
        let seed = Request::new(Url::parse(&server.uri()).unwrap(), 0);
        scheduler.start(seed).unwrap();

        let infos: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let infos_clone = infos.clone();
        let seen_errors = Arc::new(AtomicUsize::new(0));
        let seen_errors_clone = seen_errors.clone();

        let args = MonitorArgs {
            interval: Duration::from_millis(1),
            max_idle_count: 5,
            auto_stop: true,
            detailed: false,
        };

        let mut done = watch(scheduler.clone(), args, move |level, message| {
            if level == Level::Error {
                seen_errors_clone.fetch_add(1, Ordering::SeqCst);
            }
            infos_clone.lock().unwrap().push(message);
        });

        let checks = done.async_receive().await.unwrap();
        assert!(checks >= u64::from(MIN_MAX_IDLE_COUNT));
        assert!(!scheduler.running());
        assert_eq!(seen_errors.load(Ordering::SeqCst), 0);
        assert!(infos.lock().unwrap().iter().any(|m| m.contains("Stop scheduler")));
    }
}
