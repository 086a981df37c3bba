//! Editor configuration with sensible defaults.
//!
//! # Examples
//!
//! ```ignore
//! let config = EditorConfig::default()
//!     .with_scratch_dir_name("scratch")
//!     .with_manage_gitignore(false);
//! ```

use std::time::Duration;

/// Timing rules for reclaiming scratch documents.
///
/// A scratch document that the host still has open is never reclaimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepPolicy {
    /// Age after which a tracked scratch document the host no longer has open
    /// is reclaimed. Default: 30 minutes.
    pub stale_after: Duration,
    /// Age after which an untracked (orphaned) scratch document is reclaimed.
    /// Default: 5 minutes.
    pub orphan_after: Duration,
    /// Period of the background sweeper. Default: 10 minutes.
    pub interval: Duration,
    /// Delay before the first background sweep. Default: 2 seconds.
    pub initial_delay: Duration,
    /// Delay between a host closing a scratch document and the extra sweep
    /// that follows it. Default: 1 second.
    pub close_delay: Duration,
}

impl Default for SweepPolicy {
    fn default() -> Self {
        Self {
            stale_after: Duration::from_secs(30 * 60),
            orphan_after: Duration::from_secs(5 * 60),
            interval: Duration::from_secs(10 * 60),
            initial_delay: Duration::from_secs(2),
            close_delay: Duration::from_secs(1),
        }
    }
}

impl SweepPolicy {
    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    pub fn with_orphan_after(mut self, orphan_after: Duration) -> Self {
        self.orphan_after = orphan_after;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    pub fn with_close_delay(mut self, close_delay: Duration) -> Self {
        self.close_delay = close_delay;
        self
    }
}

/// Configuration for an [`EditorWorkspace`](crate::workspace::EditorWorkspace).
#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// Directory (relative to the workspace root) that holds scratch
    /// documents. Default: `"temp"`.
    pub scratch_dir_name: String,
    /// Keep `<root>/.gitignore` listing the scratch directory. Default: `true`.
    pub manage_gitignore: bool,
    /// Scratch reclamation timing.
    pub sweep: SweepPolicy,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            scratch_dir_name: "temp".to_string(),
            manage_gitignore: true,
            sweep: SweepPolicy::default(),
        }
    }
}

impl EditorConfig {
    pub fn with_scratch_dir_name(mut self, name: impl Into<String>) -> Self {
        self.scratch_dir_name = name.into();
        self
    }

    pub fn with_manage_gitignore(mut self, manage: bool) -> Self {
        self.manage_gitignore = manage;
        self
    }

    pub fn with_sweep_policy(mut self, sweep: SweepPolicy) -> Self {
        self.sweep = sweep;
        self
    }

    /// The `.gitignore` line that covers the scratch directory.
    pub fn gitignore_pattern(&self) -> String {
        format!("{}/", self.scratch_dir_name.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reclaim_schedule() {
        let config = EditorConfig::default();
        assert_eq!(config.scratch_dir_name, "temp");
        assert!(config.manage_gitignore);
        assert_eq!(config.sweep.stale_after, Duration::from_secs(1800));
        assert_eq!(config.sweep.orphan_after, Duration::from_secs(300));
        assert_eq!(config.sweep.interval, Duration::from_secs(600));
        assert_eq!(config.sweep.initial_delay, Duration::from_secs(2));
        assert_eq!(config.sweep.close_delay, Duration::from_secs(1));
    }

    #[test]
    fn builders_override_fields() {
        let config = EditorConfig::default()
            .with_scratch_dir_name("scratch/")
            .with_manage_gitignore(false)
            .with_sweep_policy(SweepPolicy::default().with_orphan_after(Duration::ZERO));
        assert_eq!(config.gitignore_pattern(), "scratch/");
        assert!(!config.manage_gitignore);
        assert_eq!(config.sweep.orphan_after, Duration::ZERO);
    }
}
