use std::fmt;

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgsError {
    #[error("the {0} must be greater than 0")]
    MustBePositive(&'static str),
}

/// Capacities for the four pipeline channels (§4.2 `ChannelManager`).
///
/// Implements [`serde::Deserialize`] so a caller may load scheduler tuning
/// from a config file as well as constructing it directly; both paths run
/// the same [`ChannelArgs::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ChannelArgs {
    req_chan_len: usize,
    resp_chan_len: usize,
    item_chan_len: usize,
    error_chan_len: usize,
}

impl ChannelArgs {
    #[must_use]
    pub fn new(req_chan_len: usize, resp_chan_len: usize, item_chan_len: usize, error_chan_len: usize) -> Self {
        Self {
            req_chan_len,
            resp_chan_len,
            item_chan_len,
            error_chan_len,
        }
    }

    #[must_use]
    pub fn req_chan_len(&self) -> usize {
        self.req_chan_len
    }

    #[must_use]
    pub fn resp_chan_len(&self) -> usize {
        self.resp_chan_len
    }

    #[must_use]
    pub fn item_chan_len(&self) -> usize {
        self.item_chan_len
    }

    #[must_use]
    pub fn error_chan_len(&self) -> usize {
        self.error_chan_len
    }

    /// # Errors
    ///
    /// Returns [`ArgsError::MustBePositive`] if any capacity is zero.
    pub fn check(&self) -> Result<(), ArgsError> {
        if self.req_chan_len == 0 {
            return Err(ArgsError::MustBePositive("reqChanLen"));
        }
        if self.resp_chan_len == 0 {
            return Err(ArgsError::MustBePositive("respChanLen"));
        }
        if self.item_chan_len == 0 {
            return Err(ArgsError::MustBePositive("itemChanLen"));
        }
        if self.error_chan_len == 0 {
            return Err(ArgsError::MustBePositive("errorChanLen"));
        }
        Ok(())
    }
}

impl fmt::Display for ChannelArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "reqChanLen: {}, respChanLen: {}, itemChanLen: {}, errorChanLen: {}",
            self.req_chan_len, self.resp_chan_len, self.item_chan_len, self.error_chan_len
        )
    }
}

/// Capacities for the downloader and analyzer worker pools (§4.1 `Pool`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PoolBaseArgs {
    downloader_pool_size: usize,
    analyzer_pool_size: usize,
}

impl PoolBaseArgs {
    #[must_use]
    pub fn new(downloader_pool_size: usize, analyzer_pool_size: usize) -> Self {
        Self {
            downloader_pool_size,
            analyzer_pool_size,
        }
    }

    #[must_use]
    pub fn downloader_pool_size(&self) -> usize {
        self.downloader_pool_size
    }

    #[must_use]
    pub fn analyzer_pool_size(&self) -> usize {
        self.analyzer_pool_size
    }

    /// # Errors
    ///
    /// Returns [`ArgsError::MustBePositive`] if either pool size is zero.
    pub fn check(&self) -> Result<(), ArgsError> {
        if self.downloader_pool_size == 0 {
            return Err(ArgsError::MustBePositive("downloaderPoolSize"));
        }
        if self.analyzer_pool_size == 0 {
            return Err(ArgsError::MustBePositive("analyzerPoolSize"));
        }
        Ok(())
    }
}

impl fmt::Display for PoolBaseArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "downloaderPoolSize: {}, analyzerPoolSize: {}",
            self.downloader_pool_size, self.analyzer_pool_size
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_args_rejects_zero_capacities() {
        assert!(ChannelArgs::new(0, 1, 1, 1).check().is_err());
        assert!(ChannelArgs::new(1, 0, 1, 1).check().is_err());
        assert!(ChannelArgs::new(1, 1, 0, 1).check().is_err());
        assert!(ChannelArgs::new(1, 1, 1, 0).check().is_err());
        assert!(ChannelArgs::new(1, 1, 1, 1).check().is_ok());
    }

    #[test]
    fn pool_base_args_rejects_zero_sizes() {
        assert!(PoolBaseArgs::new(0, 1).check().is_err());
        assert!(PoolBaseArgs::new(1, 0).check().is_err());
        assert!(PoolBaseArgs::new(1, 1).check().is_ok());
    }
}
