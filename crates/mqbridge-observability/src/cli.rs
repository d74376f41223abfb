// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! CLI argument parsing for per-crate debug flags
//!
//! Supports flags like `--debug-mqbridge-transport` and `--debug-all` to
//! raise individual crates to debug level.

use std::collections::BTreeSet;
use std::env;

use crate::KNOWN_CRATES;

/// Crates whose logs should be emitted at debug level
///
/// # Example
/// ```rust
/// use mqbridge_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_args(vec!["--debug-mqbridge-transport".to_string()]);
/// assert!(flags.is_enabled("mqbridge-transport"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrateDebugFlags {
    enabled_crates: BTreeSet<String>,
}

impl CrateDebugFlags {
    /// Parse debug flags from command-line arguments
    ///
    /// Looks for arguments matching `--debug-{crate-name}`; `--debug-all`
    /// enables every known crate.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = Self::default();
        for arg in args {
            if arg == "--debug-all" {
                flags.enable_all();
            } else if let Some(crate_name) = arg.strip_prefix("--debug-") {
                flags.enable(crate_name);
            }
        }
        flags
    }

    /// Enable debug for each name in a comma-separated list (`"all"` enables every crate)
    pub fn from_list(list: &str) -> Self {
        let mut flags = Self::default();
        flags.extend_from_list(list);
        flags
    }

    pub fn enable(&mut self, crate_name: &str) {
        let crate_name = crate_name.trim();
        if !crate_name.is_empty() {
            self.enabled_crates.insert(normalize(crate_name));
        }
    }

    pub fn enable_all(&mut self) {
        for crate_name in KNOWN_CRATES {
            self.enable(crate_name);
        }
    }

    fn extend_from_list(&mut self, list: &str) {
        if list.trim() == "all" {
            self.enable_all();
        } else {
            for crate_name in list.split(',') {
                self.enable(crate_name);
            }
        }
    }

    /// Union of both flag sets
    pub fn merge(mut self, other: &CrateDebugFlags) -> Self {
        self.enabled_crates
            .extend(other.enabled_crates.iter().cloned());
        self
    }

    /// Check if debug is enabled for a specific crate
    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled_crates.contains(&normalize(crate_name))
    }

    pub fn enabled_crates(&self) -> impl Iterator<Item = &str> {
        self.enabled_crates.iter().map(String::as_str)
    }

    pub fn any_enabled(&self) -> bool {
        !self.enabled_crates.is_empty()
    }

    /// `DEBUG` for enabled crates, `INFO` otherwise
    pub fn log_level(&self, crate_name: &str) -> tracing::Level {
        if self.is_enabled(crate_name) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Filter directives for `EnvFilter`
    ///
    /// Format: `"mqbridge_transport=debug,info"`. Tracing targets use module
    /// paths, so hyphens in crate names become underscores.
    pub fn to_filter_string(&self, default_level: &str) -> String {
        self.enabled_crates
            .iter()
            .map(|name| format!("{}=debug", name.replace('-', "_")))
            .chain(std::iter::once(default_level.to_string()))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Crate names are stored with hyphens so `mqbridge_transport` and
/// `mqbridge-transport` are the same flag
fn normalize(crate_name: &str) -> String {
    crate_name.replace('_', "-")
}

/// Debug flags from the process arguments and the `MQBRIDGE_DEBUG` environment variable
///
/// Environment variable format: comma-separated crate names, or `all`.
pub fn parse_debug_flags() -> CrateDebugFlags {
    let mut flags = CrateDebugFlags::from_args(env::args());
    if let Ok(env_var) = env::var("MQBRIDGE_DEBUG") {
        flags.extend_from_list(&env_var);
    }
    flags
}

/// Help text for debug flags
pub fn debug_flags_help() -> String {
    format!(
        r#"Debug Flags:
  --debug-all                    Enable debug logging for all crates
  --debug-{{crate-name}}          Enable debug logging for specific crate

Available crates:
  {}

Environment Variable:
  MQBRIDGE_DEBUG={{crate-name}}[,{{crate-name}}]  Enable debug for crates (comma-separated)
  MQBRIDGE_DEBUG=all                             Enable debug for all crates

Examples:
  --debug-mqbridge-transport
  MQBRIDGE_DEBUG=mqbridge-transport,mqbridge-config
"#,
        KNOWN_CRATES.join(", ")
    )
}
