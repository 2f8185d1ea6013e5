use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use thiserror::Error;

use crate::analyzer::{Analyzer, ParseResponse};
use crate::base::{ArgsError, ChannelArgs, CrawlerError, Data, ErrorKind, PoolBaseArgs, Request, Response};
use crate::cache::RequestCache;
use crate::channels::ChannelManager;
use crate::domain::{self, DomainError};
use crate::downloader::Downloader;
use crate::id::IdGenerator;
use crate::itempipeline::{ItemPipeline, ProcessItem};
use crate::pool::Pool;
use crate::stopsign::StopSign;

const RUNNING_IDLE: u8 = 0;
const RUNNING_ACTIVE: u8 = 1;
const RUNNING_STOPPED: u8 = 2;

const DISPATCH_INTERVAL: Duration = Duration::from_millis(10);

const DOWNLOADER_CODE: &str = "downloader";
const ANALYZER_CODE: &str = "analyzer";
const ITEM_PIPELINE_CODE: &str = "item_pipeline";
const SCHEDULER_CODE: &str = "Scheduler";

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("scheduler is already running")]
    AlreadyRunning,

    #[error("the seed request's host is invalid: {0}")]
    InvalidSeedHost(DomainError),

    #[error(transparent)]
    Channel(#[from] crate::channels::ChannelManagerError),

    #[error(transparent)]
    Args(#[from] ArgsError),

    #[error("start panicked: {0}")]
    Panicked(String),
}

/// Configuration and worker sets required to start a [`Scheduler`] (§4.8).
pub struct SchedulerArgs {
    pub channel_args: ChannelArgs,
    pub pool_args: PoolBaseArgs,
    pub max_depth: u32,
    pub parsers: Vec<Option<Arc<ParseResponse>>>,
    pub item_processors: Vec<Arc<ProcessItem>>,
    pub fail_fast: bool,
    /// Called once per downloader slot to build that downloader's HTTP
    /// client (§6 Public API `http_client_factory`).
    pub http_client_factory: Arc<dyn Fn() -> reqwest::Client + Send + Sync>,
}

/// Orchestrates a crawl (§4.8 `Scheduler`): wires the channel manager, the
/// downloader and analyzer pools, the item pipeline, the request cache, the
/// seen-set, and the [`StopSign`], then drives the pipeline across four
/// `tokio::spawn`ed loops until told to stop or the pipeline goes idle.
///
/// `tokio::spawn` is used in place of the reference implementation's
/// lighter single-future spawn helper: a crawl keeps many requests and
/// responses concurrently in flight across the downloader/analyzer pools,
/// which is exactly the workload that helper is unsuited to
/// (`SPEC_FULL.md` §9 REDESIGN FLAGS).
pub struct Scheduler {
    running: AtomicU8,
    channels: Arc<ChannelManager>,
    stop_sign: Arc<StopSign>,
    seen: Arc<Mutex<HashSet<String>>>,
    req_cache: Arc<RwLock<Arc<RequestCache>>>,
    downloader_pool: Arc<Pool<Downloader>>,
    analyzer_pool: Arc<Pool<Analyzer>>,
    item_pipeline: Arc<ItemPipeline>,
    parsers: Arc<Vec<Option<Arc<ParseResponse>>>>,
    primary_domain: Arc<RwLock<Option<String>>>,
    max_depth: u32,
    channel_args: ChannelArgs,
    pool_args: PoolBaseArgs,
}

impl Scheduler {
    #[must_use]
    pub fn new(args: SchedulerArgs) -> Self {
        let downloader_ids = IdGenerator::new();
        let http_client_factory = args.http_client_factory.clone();
        let downloader_pool = Pool::new(args.pool_args.downloader_pool_size(), move || {
            Downloader::new(downloader_ids.next(), http_client_factory())
        });

        let analyzer_ids = IdGenerator::new();
        let analyzer_pool = Pool::new(args.pool_args.analyzer_pool_size(), || Analyzer::new(analyzer_ids.next()));

        Self {
            running: AtomicU8::new(RUNNING_IDLE),
            channels: Arc::new(ChannelManager::new()),
            stop_sign: Arc::new(StopSign::new()),
            seen: Arc::new(Mutex::new(HashSet::new())),
            req_cache: Arc::new(RwLock::new(Arc::new(RequestCache::new()))),
            downloader_pool: Arc::new(downloader_pool),
            analyzer_pool: Arc::new(analyzer_pool),
            item_pipeline: Arc::new(ItemPipeline::new(args.item_processors, args.fail_fast)),
            parsers: Arc::new(args.parsers),
            primary_domain: Arc::new(RwLock::new(None)),
            max_depth: args.max_depth,
            channel_args: args.channel_args,
            pool_args: args.pool_args,
        }
    }

    /// Validates the scheduler's args, computes the seed's primary domain,
    /// admits the seed into a fresh request cache, and spawns the
    /// dispatch/download/analyze/item-pipeline driver loops (§4.8).
    ///
    /// A panic unwinding out of this call is caught at the boundary, logged
    /// at the `error` level, and returned as [`SchedulerError::Panicked`]
    /// rather than propagated to the caller (§4.8).
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Args`] if `channel_args`/`pool_args` failed
    /// [`ChannelArgs::check`]/[`PoolBaseArgs::check`] (checked before
    /// touching the running flag), [`SchedulerError::AlreadyRunning`] if
    /// called twice without an intervening [`Self::stop`], or
    /// [`SchedulerError::InvalidSeedHost`] if the seed's host is empty or
    /// matches no known domain suffix (§4.8.2).
    pub fn start(&self, seed: Request) -> Result<(), SchedulerError> {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| self.start_inner(seed))) {
            Ok(result) => result,
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic payload".to_string());
                ewe_logs::error!("Scheduler::start panicked: {message}");
                self.running.store(RUNNING_IDLE, Ordering::SeqCst);
                Err(SchedulerError::Panicked(message))
            }
        }
    }

    fn start_inner(&self, seed: Request) -> Result<(), SchedulerError> {
        self.channel_args.check()?;
        self.pool_args.check()?;

        if self.running.swap(RUNNING_ACTIVE, Ordering::SeqCst) != RUNNING_IDLE {
            self.running.store(RUNNING_ACTIVE, Ordering::SeqCst);
            return Err(SchedulerError::AlreadyRunning);
        }

        let host = seed.url().host_str().unwrap_or("").to_string();
        let primary_domain = match domain::primary_domain(&host) {
            Ok(pd) => pd,
            Err(e) => {
                self.running.store(RUNNING_IDLE, Ordering::SeqCst);
                return Err(SchedulerError::InvalidSeedHost(e));
            }
        };

        self.stop_sign.reset();
        if let Err(e) = self.channels.init(self.channel_args, true) {
            self.running.store(RUNNING_IDLE, Ordering::SeqCst);
            return Err(e.into());
        }

        *self.primary_domain.write().expect("primary domain lock poisoned") = Some(primary_domain.clone());
        self.seen.lock().expect("seen set mutex poisoned").clear();
        *self.req_cache.write().expect("request cache lock poisoned") = Arc::new(RequestCache::new());
        self.item_pipeline.set_fail_fast(true);

        let (req_send, req_recv) = self.channels.req_chan()?;
        let (resp_send, resp_recv) = self.channels.resp_chan()?;
        let (item_send, item_recv) = self.channels.item_chan()?;
        let (err_send, _err_recv) = self.channels.err_chan()?;

        let cache = self.req_cache.read().expect("request cache lock poisoned").clone();
        if admit(&self.seen, &primary_domain, self.max_depth, &seed) {
            cache.put(seed);
        } else {
            ewe_logs::warn!("seed request rejected before crawl start");
        }

        self.spawn_dispatch_loop(req_send);
        self.spawn_download_driver(req_recv, resp_send, err_send.clone());
        self.spawn_analyze_driver(resp_recv, item_send, err_send.clone());
        self.spawn_item_pipeline_driver(item_recv, err_send);

        Ok(())
    }

    fn spawn_dispatch_loop(&self, mut req_send: ewe_channels::mspc::SendChannel<Request>) {
        let cache = self.req_cache.clone();
        let stop_sign = self.stop_sign.clone();

        tokio::spawn(async move {
            loop {
                if stop_sign.signed() {
                    stop_sign.deal(SCHEDULER_CODE);
                    break;
                }

                let cache = cache.read().expect("request cache lock poisoned").clone();
                let capacity = req_send.capacity().ok().flatten().unwrap_or(usize::MAX);
                let pending = req_send.pending_message_count().unwrap_or(0);
                let mut slack = capacity.saturating_sub(pending);

                while slack > 0 {
                    let Some(req) = cache.get() else { break };
                    if stop_sign.signed() {
                        stop_sign.deal(SCHEDULER_CODE);
                        return;
                    }
                    let _ = req_send.try_send(req);
                    slack -= 1;
                }

                tokio::time::sleep(DISPATCH_INTERVAL).await;
            }
        });
    }

    fn spawn_download_driver(
        &self,
        mut req_recv: ewe_channels::mspc::ReceiveChannel<Request>,
        resp_send: ewe_channels::mspc::SendChannel<Response>,
        mut err_send: ewe_channels::mspc::SendChannel<CrawlerError>,
    ) {
        let pool = self.downloader_pool.clone();
        let stop_sign = self.stop_sign.clone();

        tokio::spawn(async move {
            loop {
                let Ok(req) = req_recv.async_receive().await else { break };

                let Ok(downloader) = pool.take() else {
                    send_error(&stop_sign, &mut err_send, ErrorKind::Scheduler, SCHEDULER_CODE, "downloader pool exhausted");
                    continue;
                };

                let mut resp_send = resp_send.clone();
                let mut err_send_task = err_send.clone();
                let pool = pool.clone();
                let stop_sign = stop_sign.clone();
                let code = format!("{DOWNLOADER_CODE}-{}", downloader.id());

                tokio::spawn(async move {
                    match downloader.download(&req).await {
                        Ok(resp) => send_resp(&stop_sign, &mut resp_send, &code, resp).await,
                        Err(e) => send_error(&stop_sign, &mut err_send_task, ErrorKind::Downloader, &code, &e.to_string()),
                    }
                    let _ = pool.give_back(downloader);
                });
            }
        });
    }

    fn spawn_analyze_driver(
        &self,
        mut resp_recv: ewe_channels::mspc::ReceiveChannel<Response>,
        item_send: ewe_channels::mspc::SendChannel<Data>,
        mut err_send: ewe_channels::mspc::SendChannel<CrawlerError>,
    ) {
        let pool = self.analyzer_pool.clone();
        let parsers = self.parsers.clone();
        let stop_sign = self.stop_sign.clone();
        let seen = self.seen.clone();
        let req_cache = self.req_cache.clone();
        let primary_domain = self.primary_domain.clone();
        let max_depth = self.max_depth;

        tokio::spawn(async move {
            loop {
                let Ok(resp) = resp_recv.async_receive().await else { break };

                let Ok(analyzer) = pool.take() else {
                    send_error(&stop_sign, &mut err_send, ErrorKind::Scheduler, SCHEDULER_CODE, "analyzer pool exhausted");
                    continue;
                };

                let pool = pool.clone();
                let parsers = parsers.clone();
                let stop_sign = stop_sign.clone();
                let seen = seen.clone();
                let req_cache = req_cache.clone();
                let primary_domain = primary_domain.clone();
                let mut item_send = item_send.clone();
                let err_send_task = err_send.clone();
                let code = format!("{ANALYZER_CODE}-{}", analyzer.id());

                tokio::spawn(async move {
                    let (produced, errors) = analyzer.analyze(&parsers, &resp);
                    let _ = pool.give_back(analyzer);

                    for error in errors {
                        let mut err_send = err_send_task.clone();
                        send_error(&stop_sign, &mut err_send, ErrorKind::Analyzer, &code, &error.to_string());
                    }

                    let domain = primary_domain.read().expect("primary domain lock poisoned").clone().unwrap_or_default();
                    let cache = req_cache.read().expect("request cache lock poisoned").clone();

                    for datum in produced {
                        match datum {
                            Data::Request(req) => {
                                save_req_to_cache(&seen, &cache, &stop_sign, &domain, max_depth, req, &code);
                            }
                            Data::Item(item) => {
                                send_item(&stop_sign, &mut item_send, &code, Data::Item(item)).await;
                            }
                        }
                    }
                });
            }
        });
    }

    fn spawn_item_pipeline_driver(
        &self,
        mut item_recv: ewe_channels::mspc::ReceiveChannel<Data>,
        err_send: ewe_channels::mspc::SendChannel<CrawlerError>,
    ) {
        let item_pipeline = self.item_pipeline.clone();
        let stop_sign = self.stop_sign.clone();

        tokio::spawn(async move {
            loop {
                let Ok(data) = item_recv.async_receive().await else { break };

                let item_pipeline = item_pipeline.clone();
                let stop_sign = stop_sign.clone();
                let mut err_send = err_send.clone();

                tokio::spawn(async move {
                    let item = match data {
                        Data::Item(item) => Some(item),
                        Data::Request(_) => None,
                    };

                    for error in item_pipeline.send(item) {
                        send_error(&stop_sign, &mut err_send, ErrorKind::ItemProcessor, ITEM_PIPELINE_CODE, &error.to_string());
                    }
                });
            }
        });
    }

    /// Latches the stop sign, closes the channel manager (terminating every
    /// driver loop whose read loop observes the channel close), and closes
    /// the request cache.
    pub fn stop(&self) -> bool {
        if self.running.swap(RUNNING_STOPPED, Ordering::SeqCst) != RUNNING_ACTIVE {
            self.running.store(RUNNING_STOPPED, Ordering::SeqCst);
            return false;
        }
        self.stop_sign.sign();
        self.channels.close();
        self.req_cache.read().expect("request cache lock poisoned").close();
        true
    }

    #[must_use]
    pub fn running(&self) -> bool {
        self.running.load(Ordering::SeqCst) == RUNNING_ACTIVE
    }

    /// The error-receiving half of the error channel, or `None` once the
    /// scheduler has been stopped (§6 Public API).
    #[must_use]
    pub fn error_chan(&self) -> Option<ewe_channels::mspc::ReceiveChannel<CrawlerError>> {
        if !self.running() {
            return None;
        }
        self.channels.err_chan().ok().map(|(_, recv)| recv)
    }

    /// True iff the downloader pool, analyzer pool, and item pipeline are
    /// all unoccupied (§4.8.4). In-flight channel buffer contents are NOT
    /// counted.
    #[must_use]
    pub fn idle(&self) -> bool {
        self.downloader_pool.used() == 0 && self.analyzer_pool.used() == 0 && self.item_pipeline.processing_number() == 0
    }

    #[must_use]
    pub fn summary(&self, prefix: &str) -> SchedSummary {
        let channels = self.channels.summary().unwrap_or_else(|_| "not initialized".to_string());
        let req_cache = self.req_cache.read().expect("request cache lock poisoned").summary();

        SchedSummary {
            prefix: prefix.to_string(),
            running: self.running.load(Ordering::SeqCst),
            channel_args: self.channel_args,
            pool_args: self.pool_args,
            max_depth: self.max_depth,
            channels,
            req_cache,
            seen: self.seen.lock().expect("seen set mutex poisoned").len(),
            downloader_used: self.downloader_pool.used(),
            downloader_total: self.downloader_pool.total(),
            analyzer_used: self.analyzer_pool.used(),
            analyzer_total: self.analyzer_pool.total(),
            item_pipeline: self.item_pipeline.summary(),
            stop_sign: self.stop_sign.summary(),
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn save_req_to_cache(
    seen: &Mutex<HashSet<String>>,
    cache: &RequestCache,
    stop_sign: &StopSign,
    primary_domain: &str,
    max_depth: u32,
    req: Request,
    code: &str,
) -> bool {
    if stop_sign.signed() {
        stop_sign.deal(code);
        ewe_logs::warn!("request to {} dropped: stop signalled", req.url());
        return false;
    }
    if !admit(seen, primary_domain, max_depth, &req) {
        return false;
    }
    cache.put(req)
}

/// Applies the admission rules of §4.8.2: URL scheme must be `http`, the
/// URL must not already be in the seen-set, its host's primary domain must
/// match the crawl's scope, and its depth must not exceed `max_depth`. Every
/// rejection is logged at `warn`, naming the reason (§4.8.2, §10 Logging).
fn admit(seen: &Mutex<HashSet<String>>, primary_domain: &str, max_depth: u32, req: &Request) -> bool {
    if req.url().scheme().to_lowercase() != "http" {
        ewe_logs::warn!("request to {} rejected: scheme {} is not http", req.url(), req.url().scheme());
        return false;
    }
    if req.depth() > max_depth {
        ewe_logs::warn!("request to {} rejected: depth {} exceeds max_depth {max_depth}", req.url(), req.depth());
        return false;
    }
    let Some(host) = req.url().host_str() else {
        ewe_logs::warn!("request to {} rejected: no host", req.url());
        return false;
    };
    let Ok(host_domain) = domain::primary_domain(host) else {
        ewe_logs::warn!("request to {} rejected: host {host} matches no known domain suffix", req.url());
        return false;
    };
    if host_domain != primary_domain {
        ewe_logs::warn!(
            "request to {} rejected: domain {host_domain} is out of scope (primary domain {primary_domain})",
            req.url()
        );
        return false;
    }

    let mut seen_set = seen.lock().expect("seen set mutex poisoned");
    let inserted = seen_set.insert(req.url().to_string());
    if !inserted {
        ewe_logs::warn!("request to {} rejected: already seen", req.url());
    }
    inserted
}

/// Delivers `error` on the error channel unless the stop sign has fired.
/// Spawns a task so the caller never blocks on it; that task first tries a
/// non-blocking send and falls back to an awaiting `async_send` when the
/// channel is momentarily full, per §5 Backpressure ("producers block on
/// full channels") rather than dropping the error.
fn send_error(
    stop_sign: &StopSign,
    err_send: &mut ewe_channels::mspc::SendChannel<CrawlerError>,
    kind: ErrorKind,
    code: &str,
    message: &str,
) {
    if stop_sign.signed() {
        stop_sign.deal(code);
        return;
    }
    let mut err_send = err_send.clone();
    let error = CrawlerError::new(kind, message);
    tokio::spawn(async move {
        if err_send.try_send(error.clone()).is_err() {
            let _ = err_send.async_send(error).await;
        }
    });
}

/// Delivers `resp` on the response channel unless the stop sign has fired,
/// falling back to an awaiting `async_send` when `try_send` reports the
/// channel full (§5 Backpressure).
async fn send_resp(stop_sign: &StopSign, resp_send: &mut ewe_channels::mspc::SendChannel<Response>, code: &str, resp: Response) {
    if stop_sign.signed() {
        stop_sign.deal(code);
        return;
    }
    if resp_send.try_send(resp.clone()).is_err() {
        let _ = resp_send.async_send(resp).await;
    }
}

/// Delivers `data` on the item channel unless the stop sign has fired,
/// falling back to an awaiting `async_send` when `try_send` reports the
/// channel full (§5 Backpressure).
async fn send_item(stop_sign: &StopSign, item_send: &mut ewe_channels::mspc::SendChannel<Data>, code: &str, data: Data) {
    if stop_sign.signed() {
        stop_sign.deal(code);
        return;
    }
    if item_send.try_send(data.clone()).is_err() {
        let _ = item_send.async_send(data).await;
    }
}

/// A point-in-time snapshot of scheduler state (§4.8.5), comparable across
/// polls via [`SchedSummary::same`] to drive the monitor's idleness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedSummary {
    prefix: String,
    running: u8,
    channel_args: ChannelArgs,
    pool_args: PoolBaseArgs,
    max_depth: u32,
    channels: String,
    req_cache: String,
    seen: usize,
    downloader_used: usize,
    downloader_total: usize,
    analyzer_used: usize,
    analyzer_total: usize,
    item_pipeline: String,
    stop_sign: String,
}

impl SchedSummary {
    #[must_use]
    pub fn detail(&self) -> String {
        format!(
            "{}running: {}, channel_args: {{{}}}, pool_args: {{{}}}, max_depth: {}, channels: {{{}}}, \
             req_cache: {{{}}}, seen: {}, downloaders: {}/{}, analyzers: {}/{}, item_pipeline: {{{}}}, stop_sign: {{{}}}",
            self.prefix,
            self.running == RUNNING_ACTIVE,
            self.channel_args,
            self.pool_args,
            self.max_depth,
            self.channels,
            self.req_cache,
            self.seen,
            self.downloader_used,
            self.downloader_total,
            self.analyzer_used,
            self.analyzer_total,
            self.item_pipeline,
            self.stop_sign,
        )
    }

    /// Equality ignoring `prefix`, used by the monitor to detect whether a
    /// crawl has gone idle between two polls.
    #[must_use]
    pub fn same(&self, other: &SchedSummary) -> bool {
        self.running == other.running
            && self.channel_args == other.channel_args
            && self.pool_args == other.pool_args
            && self.max_depth == other.max_depth
            && self.channels == other.channels
            && self.req_cache == other.req_cache
            && self.seen == other.seen
            && self.downloader_used == other.downloader_used
            && self.analyzer_used == other.analyzer_used
            && self.item_pipeline == other.item_pipeline
            && self.stop_sign == other.stop_sign
    }
}

impl fmt::Display for SchedSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.detail())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Url;

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

    #[test]
    fn admit_deduplicates_scopes_to_primary_domain_and_enforces_max_depth() {
        let seen = Mutex::new(HashSet::new());
        let in_scope = Request::new(Url::parse("http://example.com/a").unwrap(), 0);
        assert!(admit(&seen, "example.com", 3, &in_scope));
        assert!(!admit(&seen, "example.com", 3, &in_scope));

        let out_of_scope = Request::new(Url::parse("http://other.com/a").unwrap(), 0);
        assert!(!admit(&seen, "example.com", 3, &out_of_scope));

        let too_deep = Request::new(Url::parse("http://example.com/b").unwrap(), 4);
        assert!(!admit(&seen, "example.com", 3, &too_deep));
    }

    #[test]
    fn idle_before_start() {
        let scheduler = Scheduler::new(test_args());
        assert!(scheduler.idle());
        assert!(!scheduler.running());
    }

    #[tokio::test]
    async fn start_rejects_a_second_concurrent_start() {
        let scheduler = Scheduler::new(test_args());
        let seed = Request::new(Url::parse("http://example.com/").unwrap(), 0);
        scheduler.start(seed.clone()).unwrap();
        assert!(matches!(scheduler.start(seed), Err(SchedulerError::AlreadyRunning)));
        scheduler.stop();
    }

    #[tokio::test]
    async fn start_rejects_a_seed_with_an_empty_host() {
        let scheduler = Scheduler::new(test_args());
        let seed = Request::new(Url::parse("file:///tmp/x").unwrap(), 0);
        assert!(matches!(scheduler.start(seed), Err(SchedulerError::InvalidSeedHost(_))));
        assert!(!scheduler.running());
    }

    #[tokio::test]
    async fn error_chan_is_none_after_stop() {
        let scheduler = Scheduler::new(test_args());
        let seed = Request::new(Url::parse("http://example.com/").unwrap(), 0);
        scheduler.start(seed).unwrap();
        assert!(scheduler.error_chan().is_some());
        scheduler.stop();
        assert!(scheduler.error_chan().is_none());
    }

    #[test]
    fn summary_reports_seen_and_pool_usage() {
        let scheduler = Scheduler::new(test_args());
        let summary = scheduler.summary("crawl: ");
        let detail = summary.detail();
        assert!(detail.starts_with("crawl: running: false"));
        assert!(detail.contains("max_depth: 3"));
        assert!(detail.contains("seen: 0"));
    }

    #[test]
    fn start_rejects_zero_capacity_channel_args_before_touching_running_flag() {
        let mut args = test_args();
        args.channel_args = ChannelArgs::new(0, 8, 8, 8);
        let scheduler = Scheduler::new(args);
        let seed = Request::new(Url::parse("http://example.com/").unwrap(), 0);
        assert!(matches!(scheduler.start(seed), Err(SchedulerError::Args(_))));
        assert!(!scheduler.running());
    }
}
