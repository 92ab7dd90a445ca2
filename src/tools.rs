//! # External Tool Registry Module
//!
//! Availability probing for the external codec tools. The registry is an
//! explicitly constructed value passed by reference, never a process-wide
//! singleton, so tests can build isolated instances.
//!
//! Probing shells out to `which` (or `where` on Windows) through
//! `tokio::process::Command`; results are memoized for the lifetime of the
//! registry.

use std::collections::HashMap;
use std::sync::Mutex;

/// Tracks which external codec tools exist on this system
pub struct ToolRegistry {
    which_command: &'static str,
    // Memoized probe results, keyed by base tool name
    probed: Mutex<HashMap<String, bool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        let which_command = if cfg!(windows) { "where" } else { "which" };
        Self {
            which_command,
            probed: Mutex::new(HashMap::new()),
        }
    }

    /// Get the platform-specific command name
    pub fn command_name(&self, base_name: &str) -> String {
        if cfg!(windows) {
            format!("{}.exe", base_name)
        } else {
            base_name.to_string()
        }
    }

    /// Check if a command is available on the system, memoizing the result
    pub async fn is_available(&self, base_name: &str) -> bool {
        if let Some(&known) = self.probed.lock().unwrap().get(base_name) {
            return known;
        }

        let command_name = self.command_name(base_name);
        let result = tokio::process::Command::new(self.which_command)
            .arg(&command_name)
            .output()
            .await;

        let available = match result {
            Ok(output) => output.status.success(),
            Err(_) => false,
        };

        self.probed
            .lock()
            .unwrap()
            .insert(base_name.to_string(), available);
        available
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
