use std::sync::RwLock;

use ewe_channels::mspc::{create_bounded, ChannelError, ReceiveChannel, SendChannel};
use thiserror::Error;

use crate::base::{ChannelArgs, CrawlerError, Data, Request, Response};

#[derive(Error, Debug)]
pub enum ChannelManagerError {
    #[error("channel manager must be initialized before use")]
    NotInitialized,

    #[error(transparent)]
    Channel(#[from] ChannelError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Uninitialized,
    Initialized,
    Closed,
}

/// Owns the four bounded channels threading data between pipeline stages
/// (§4.2 `ChannelManager`): requests, responses, produced items, and errors.
///
/// Built around `ewe_channels::mspc`'s bounded constructor rather than
/// `tokio::sync::mpsc` so `summary` can report live length/capacity without
/// a side channel.
pub struct ChannelManager {
    state: RwLock<State>,
    req: RwLock<Option<(SendChannel<Request>, ReceiveChannel<Request>)>>,
    resp: RwLock<Option<(SendChannel<Response>, ReceiveChannel<Response>)>>,
    item: RwLock<Option<(SendChannel<Data>, ReceiveChannel<Data>)>>,
    err: RwLock<Option<(SendChannel<CrawlerError>, ReceiveChannel<CrawlerError>)>>,
}

impl Default for ChannelManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::Uninitialized),
            req: RwLock::new(None),
            resp: RwLock::new(None),
            item: RwLock::new(None),
            err: RwLock::new(None),
        }
    }

    /// Builds the four channels from `args`.
    ///
    /// Calling `init` again while already `Initialized` is a no-op unless
    /// `reset` is set, in which case fresh channels replace the old ones
    /// (§4.2).
    #[allow(clippy::missing_errors_doc)]
    pub fn init(&self, args: ChannelArgs, reset: bool) -> Result<(), ChannelManagerError> {
        let mut state = self.state.write().expect("channel manager state lock poisoned");
        if *state == State::Initialized && !reset {
            return Ok(());
        }

        *self.req.write().expect("channel manager req lock poisoned") = Some(create_bounded(args.req_chan_len()));
        *self.resp.write().expect("channel manager resp lock poisoned") = Some(create_bounded(args.resp_chan_len()));
        *self.item.write().expect("channel manager item lock poisoned") = Some(create_bounded(args.item_chan_len()));
        *self.err.write().expect("channel manager err lock poisoned") = Some(create_bounded(args.error_chan_len()));
        *state = State::Initialized;
        Ok(())
    }

    /// Closes all four channels exactly once (§4.2). Uses
    /// [`SendChannel::close_channel`] rather than dropping the stored
    /// handle: driver loops hold their own cloned senders (e.g. the analyze
    /// driver re-publishes to the request channel), so only a close that
    /// propagates to every clone actually unblocks their `recv` calls.
    pub fn close(&self) {
        let mut state = self.state.write().expect("channel manager state lock poisoned");
        if let Some((sender, _)) = self.req.write().expect("channel manager req lock poisoned").take() {
            let _ = sender.close_channel();
        }
        if let Some((sender, _)) = self.resp.write().expect("channel manager resp lock poisoned").take() {
            let _ = sender.close_channel();
        }
        if let Some((sender, _)) = self.item.write().expect("channel manager item lock poisoned").take() {
            let _ = sender.close_channel();
        }
        if let Some((sender, _)) = self.err.write().expect("channel manager err lock poisoned").take() {
            let _ = sender.close_channel();
        }
        *state = State::Closed;
    }

    /// # Errors
    ///
    /// Returns [`ChannelManagerError::NotInitialized`] unless [`Self::init`]
    /// has run (and [`Self::close`] has not since been called).
    pub fn req_chan(&self) -> Result<(SendChannel<Request>, ReceiveChannel<Request>), ChannelManagerError> {
        self.clone_pair(&self.req)
    }

    /// # Errors
    ///
    /// Returns [`ChannelManagerError::NotInitialized`] unless [`Self::init`]
    /// has run (and [`Self::close`] has not since been called).
    pub fn resp_chan(&self) -> Result<(SendChannel<Response>, ReceiveChannel<Response>), ChannelManagerError> {
        self.clone_pair(&self.resp)
    }

    /// # Errors
    ///
    /// Returns [`ChannelManagerError::NotInitialized`] unless [`Self::init`]
    /// has run (and [`Self::close`] has not since been called).
    pub fn item_chan(&self) -> Result<(SendChannel<Data>, ReceiveChannel<Data>), ChannelManagerError> {
        self.clone_pair(&self.item)
    }

    /// # Errors
    ///
    /// Returns [`ChannelManagerError::NotInitialized`] unless [`Self::init`]
    /// has run (and [`Self::close`] has not since been called).
    pub fn err_chan(&self) -> Result<(SendChannel<CrawlerError>, ReceiveChannel<CrawlerError>), ChannelManagerError> {
        self.clone_pair(&self.err)
    }

    fn clone_pair<T>(
        &self,
        slot: &RwLock<Option<(SendChannel<T>, ReceiveChannel<T>)>>,
    ) -> Result<(SendChannel<T>, ReceiveChannel<T>), ChannelManagerError> {
        if *self.state.read().expect("channel manager state lock poisoned") != State::Initialized {
            return Err(ChannelManagerError::NotInitialized);
        }
        slot.read()
            .expect("channel manager slot lock poisoned")
            .as_ref()
            .map(|(sender, receiver)| (sender.clone(), receiver.clone()))
            .ok_or(ChannelManagerError::NotInitialized)
    }

    /// # Errors
    ///
    /// Returns [`ChannelManagerError::NotInitialized`] unless [`Self::init`]
    /// has run (and [`Self::close`] has not since been called).
    pub fn summary(&self) -> Result<String, ChannelManagerError> {
        let (req_send, _) = self.req_chan()?;
        let (resp_send, _) = self.resp_chan()?;
        let (item_send, _) = self.item_chan()?;
        let (err_send, _) = self.err_chan()?;

        Ok(format!(
            "req: {}/{:?}, resp: {}/{:?}, item: {}/{:?}, err: {}/{:?}",
            req_send.pending_message_count_or_zero(),
            req_send.capacity()?,
            resp_send.pending_message_count_or_zero(),
            resp_send.capacity()?,
            item_send.pending_message_count_or_zero(),
            item_send.capacity()?,
            err_send.pending_message_count_or_zero(),
            err_send.capacity()?,
        ))
    }
}

trait PendingOrZero {
    fn pending_message_count_or_zero(&self) -> usize;
}

impl<T> PendingOrZero for SendChannel<T> {
    fn pending_message_count_or_zero(&self) -> usize {
        let mut clone = self.clone();
        clone.pending_message_count().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ChannelArgs {
        ChannelArgs::new(2, 2, 2, 2)
    }

    #[test]
    fn channels_are_unusable_before_init() {
        let manager = ChannelManager::new();
        assert!(matches!(manager.req_chan(), Err(ChannelManagerError::NotInitialized)));
    }

    #[test]
    fn init_without_reset_is_a_no_op_once_initialized() {
        let manager = ChannelManager::new();
        manager.init(args(), false).unwrap();
        let (mut sender, _) = manager.req_chan().unwrap();
        sender.try_send(Request::new(reqwest::Url::parse("http://example.com").unwrap(), 0)).unwrap();

        manager.init(args(), false).unwrap();
        let (_, mut receiver) = manager.req_chan().unwrap();
        assert!(receiver.try_receive().is_ok(), "no-op init must not discard the existing channels");

        manager.init(args(), true).unwrap();
        let (_, mut receiver) = manager.req_chan().unwrap();
        assert!(receiver.try_receive().is_err(), "reset=true must allocate fresh channels");
    }

    #[test]
    fn send_and_receive_round_trip_through_cloned_handles() {
        let manager = ChannelManager::new();
        manager.init(args(), false).unwrap();

        let (mut sender, mut receiver) = manager.req_chan().unwrap();
        sender
            .try_send(Request::new(reqwest::Url::parse("http://example.com").unwrap(), 0))
            .unwrap();
        let received = receiver.try_receive().unwrap();
        assert_eq!(received.depth(), 0);
    }

    #[test]
    fn close_tears_every_channel_down() {
        let manager = ChannelManager::new();
        manager.init(args(), false).unwrap();
        manager.close();
        assert!(matches!(manager.req_chan(), Err(ChannelManagerError::NotInitialized)));
    }
}
