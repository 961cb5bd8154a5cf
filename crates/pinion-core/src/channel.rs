//! Channel priority derived from the configured channel order.
//!
//! Priorities are plain integers where larger wins:
//! - the empty channel name (an already installed package) outranks everything
//! - the channel at position `i` of `channels` gets `len - i`
//! - `defaults` expands to every channel in `default-channels`, all sharing the
//!   priority of the `defaults` entry itself
//! - a channel listed more than once keeps its first priority
//! - anything unlisted gets `0`

use std::collections::HashMap;

use crate::config::ResolverConfig;

/// Name of the meta-channel that expands to the configured default channels.
pub const DEFAULTS: &str = "defaults";

/// Channel name used for packages that are already installed locally.
pub const INSTALLED: &str = "";

/// Lookup table from channel name to priority.
#[derive(Debug, Clone)]
pub struct ChannelPriority {
    priorities: HashMap<String, u32>,
    installed: u32,
}

impl ChannelPriority {
    pub fn new(channels: &[String], default_channels: &[String]) -> Self {
        let mut priorities = HashMap::new();
        let len = channels.len() as u32;
        for (i, channel) in channels.iter().enumerate() {
            let priority = len - i as u32;
            if channel == DEFAULTS {
                for concrete in default_channels {
                    priorities.entry(concrete.clone()).or_insert(priority);
                }
            }
            // First mention wins if a channel is listed twice.
            priorities.entry(channel.clone()).or_insert(priority);
        }
        Self {
            priorities,
            installed: len + 1,
        }
    }

    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::new(&config.channels, &config.default_channels)
    }

    /// Priority of a channel; higher is preferred.
    pub fn priority(&self, channel: &str) -> u32 {
        if channel == INSTALLED {
            return self.installed;
        }
        self.priorities.get(channel).copied().unwrap_or(0)
    }

    /// Whether the channel appears in the configured order (directly or via `defaults`).
    pub fn is_known(&self, channel: &str) -> bool {
        channel == INSTALLED || self.priorities.contains_key(channel)
    }
}

impl Default for ChannelPriority {
    fn default() -> Self {
        Self::from_config(&ResolverConfig::default())
    }
}
