//! Event handling and line output

use bubz2_events::{AppEvent, GeneralEvent, SyncEvent};
use console::{style, Term};
use tracing::Level;

/// Prints one line per event while a sync runs
pub struct EventHandler {
    stdout: Term,
    stderr: Term,
    colors_enabled: bool,
    /// Events are only logged; stdout is reserved for the JSON result
    quiet: bool,
    debug_enabled: bool,
}

impl EventHandler {
    /// Create new event handler
    pub fn new(colors_enabled: bool, quiet: bool, debug_enabled: bool) -> Self {
        Self {
            stdout: Term::stdout(),
            stderr: Term::stderr(),
            colors_enabled,
            quiet,
            debug_enabled,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, event: AppEvent) {
        crate::logging::log_event_with_tracing(&event);

        if self.quiet {
            return;
        }
        if let Some(line) = self.format_event(&event) {
            if goes_to_stderr(&event) {
                let _ = self.stderr.write_line(&line);
            } else {
                let _ = self.stdout.write_line(&line);
            }
        }
    }

    /// The line printed for `event`, if any
    fn format_event(&self, event: &AppEvent) -> Option<String> {
        match event {
            AppEvent::Sync(SyncEvent::FileIgnored { path }) => {
                Some(self.paint_dim(&format!("!{}", path.display())))
            }
            AppEvent::Sync(SyncEvent::FileCompressed {
                source,
                destination,
                ..
            }) => Some(format!(
                "{} {} {}",
                source.display(),
                self.paint_dim("=>"),
                destination.display()
            )),
            AppEvent::Sync(SyncEvent::CompressionFailed { source, failure }) => {
                let mut line = format!(
                    "{} {}: {}",
                    self.paint_error("failed"),
                    source.display(),
                    failure.message
                );
                if let Some(hint) = &failure.hint {
                    line.push_str("\n  Hint: ");
                    line.push_str(hint);
                }
                Some(line)
            }
            AppEvent::Sync(SyncEvent::FileUpToDate { path }) if self.debug_enabled => {
                Some(self.paint_dim(&format!("={}", path.display())))
            }
            AppEvent::General(GeneralEvent::Warning { message, context }) => {
                let mut line = format!("{} {message}", self.paint_warning("warning:"));
                if let Some(context) = context {
                    line.push_str(&format!(" ({context})"));
                }
                Some(line)
            }
            _ => None,
        }
    }

    fn paint_dim(&self, text: &str) -> String {
        if self.colors_enabled {
            style(text).dim().to_string()
        } else {
            text.to_string()
        }
    }

    fn paint_warning(&self, text: &str) -> String {
        if self.colors_enabled {
            style(text).yellow().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn paint_error(&self, text: &str) -> String {
        if self.colors_enabled {
            style(text).red().bold().to_string()
        } else {
            text.to_string()
        }
    }
}

/// Warnings and failures go to stderr, everything else to stdout
fn goes_to_stderr(event: &AppEvent) -> bool {
    event.log_level() <= Level::WARN
}

#[cfg(test)]
mod tests {
    use super::*;
    use bubz2_events::FailureContext;
    use std::path::PathBuf;

    fn handler(debug_enabled: bool) -> EventHandler {
        EventHandler::new(false, false, debug_enabled)
    }

    #[test]
    fn test_ignored_line_shows_source_path() {
        let path = PathBuf::from("cstrike").join("maps").join("a.nav");
        let event = AppEvent::Sync(SyncEvent::FileIgnored { path: path.clone() });
        let line = handler(false).format_event(&event).unwrap();
        assert_eq!(line, format!("!{}", path.display()));
        assert!(!goes_to_stderr(&event));
    }

    #[test]
    fn test_compressed_line() {
        let event = AppEvent::Sync(SyncEvent::FileCompressed {
            source: PathBuf::from("a.bsp"),
            destination: PathBuf::from("a.bsp.bz2"),
            bytes_in: 10,
            bytes_out: 5,
        });
        let line = handler(false).format_event(&event).unwrap();
        assert_eq!(line, "a.bsp => a.bsp.bz2");
        assert!(!goes_to_stderr(&event));
    }

    #[test]
    fn test_failure_goes_to_stderr() {
        let event = AppEvent::Sync(SyncEvent::CompressionFailed {
            source: PathBuf::from("a.bsp"),
            failure: FailureContext::new(
                Some("compression.encode_failed"),
                "disk full",
                None::<String>,
                true,
            ),
        });
        let line = handler(false).format_event(&event).unwrap();
        assert_eq!(line, "failed a.bsp: disk full");
        assert!(goes_to_stderr(&event));
    }

    #[test]
    fn test_warning_goes_to_stderr() {
        let event = AppEvent::General(GeneralEvent::warning_with_context(
            "path is not valid UTF-8, its time is not recorded",
            "sound/caf?.wav",
        ));
        let line = handler(false).format_event(&event).unwrap();
        assert_eq!(
            line,
            "warning: path is not valid UTF-8, its time is not recorded (sound/caf?.wav)"
        );
        assert!(goes_to_stderr(&event));
    }

    #[test]
    fn test_up_to_date_only_in_debug() {
        let event = AppEvent::Sync(SyncEvent::FileUpToDate {
            path: PathBuf::from("a.bsp"),
        });
        assert!(handler(false).format_event(&event).is_none());
        assert_eq!(handler(true).format_event(&event).unwrap(), "=a.bsp");
        assert!(!goes_to_stderr(&event));
    }
}
