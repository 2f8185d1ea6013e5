//! A polite, bounded, in-process web crawler engine built as a multi-stage
//! concurrent pipeline: a request cache feeds a downloader pool, downloaded
//! responses feed an analyzer pool, and analyzers fan their output back into
//! further requests or into an item pipeline. See [`scheduler::Scheduler`]
//! for the orchestrator that wires these stages together.

pub mod analyzer;
pub mod base;
pub mod cache;
pub mod channels;
pub mod domain;
pub mod downloader;
pub mod id;
pub mod itempipeline;
pub mod monitor;
pub mod pool;
pub mod scheduler;
pub mod stopsign;

pub use analyzer::{Analyzer, ParseResponse};
pub use base::{ArgsError, ChannelArgs, CrawlerError, Data, ErrorKind, Item, PoolBaseArgs, Request, Response};
pub use cache::RequestCache;
pub use channels::{ChannelManager, ChannelManagerError};
pub use domain::{primary_domain, DomainError};
pub use downloader::Downloader;
pub use id::IdGenerator;
pub use itempipeline::{ItemPipeline, ProcessItem};
pub use monitor::{watch, Level, MonitorArgs};
pub use pool::{Pool, PoolError};
pub use scheduler::{SchedSummary, Scheduler, SchedulerArgs, SchedulerError};
pub use stopsign::StopSign;
