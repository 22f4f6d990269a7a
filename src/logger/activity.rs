//! Activity log: typed session events mapped onto JSONL entries.
//!
//! The UI is single-threaded, so the writer is owned directly instead of
//! living behind a channel. A disabled log is a no-op sink.

#![allow(missing_docs)]

use std::path::PathBuf;

use crate::core::config::LoggingConfig;
use crate::core::errors::PgError;
use crate::engine::controller::{Action, Controller, Dispatch, Mutation, SessionStats};
use crate::engine::filter::BulkToggle;
use crate::logger::jsonl::{EventType, JsonlConfig, JsonlWriter, LogEntry, Severity};

/// Events recorded during a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityEvent {
    SessionStarted {
        deck: String,
        fingerprint: String,
        config_hash: String,
        eligible: usize,
    },
    Drawn {
        prompt: Option<String>,
        eligible: usize,
    },
    CellToggled {
        combo: String,
        active: bool,
    },
    RowToggled {
        level: u32,
        outcome: BulkToggle,
    },
    ColumnToggled {
        category: String,
        outcome: BulkToggle,
    },
    ActionIgnored {
        action: &'static str,
        reason: String,
    },
    SessionStopped {
        stats: SessionStats,
    },
    Error {
        code: String,
        message: String,
    },
}

impl ActivityEvent {
    /// Wrap a [`PgError`] as an error event.
    #[must_use]
    pub fn from_error(err: &PgError) -> Self {
        Self::Error {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }

    /// Convert to a JSONL entry.
    #[must_use]
    pub fn to_entry(&self) -> LogEntry {
        match self {
            Self::SessionStarted {
                deck,
                fingerprint,
                config_hash,
                eligible,
            } => {
                let mut e = LogEntry::new(EventType::SessionStart, Severity::Info);
                e.deck = Some(deck.clone());
                e.details = Some(format!("fingerprint={fingerprint}"));
                e.config_hash = Some(config_hash.clone());
                e.eligible = Some(*eligible);
                e
            }
            Self::Drawn { prompt, eligible } => {
                let severity = if prompt.is_some() {
                    Severity::Info
                } else {
                    Severity::Warning
                };
                let mut e = LogEntry::new(EventType::Draw, severity);
                e.prompt.clone_from(prompt);
                e.eligible = Some(*eligible);
                e
            }
            Self::CellToggled { combo, active } => {
                let mut e = LogEntry::new(EventType::ToggleCell, Severity::Info);
                e.combo = Some(combo.clone());
                e.outcome = Some(if *active { "on" } else { "off" }.to_string());
                e
            }
            Self::RowToggled { level, outcome } => {
                let mut e = LogEntry::new(EventType::ToggleRow, Severity::Info);
                e.level = Some(*level);
                e.outcome = Some(bulk_label(*outcome).to_string());
                e
            }
            Self::ColumnToggled { category, outcome } => {
                let mut e = LogEntry::new(EventType::ToggleColumn, Severity::Info);
                e.category = Some(category.clone());
                e.outcome = Some(bulk_label(*outcome).to_string());
                e
            }
            Self::ActionIgnored { action, reason } => {
                let mut e = LogEntry::new(EventType::IgnoredAction, Severity::Warning);
                e.details = Some(format!("{action}: {reason}"));
                e
            }
            Self::SessionStopped { stats } => {
                let mut e = LogEntry::new(EventType::SessionStop, Severity::Info);
                e.details = Some(format!(
                    "draws={} toggles={} empty_draws={} refused={}",
                    stats.draws, stats.toggles, stats.empty_draws, stats.refused
                ));
                e
            }
            Self::Error { code, message } => {
                let mut e = LogEntry::new(EventType::Error, Severity::Critical);
                e.error_code = Some(code.clone());
                e.details = Some(message.clone());
                e
            }
        }
    }
}

const fn bulk_label(outcome: BulkToggle) -> &'static str {
    match outcome {
        BulkToggle::Cleared => "cleared",
        BulkToggle::Set => "set",
        BulkToggle::NoOp => "noop",
    }
}

/// Events describing one dispatch: the mutation (if any) followed by the draw,
/// or a single ignored-action event when the controller refused it.
#[must_use]
pub fn events_for_dispatch(
    action: &Action,
    dispatch: &Dispatch,
    controller: &Controller,
) -> Vec<ActivityEvent> {
    match dispatch {
        Dispatch::Refused(refusal) => vec![ActivityEvent::ActionIgnored {
            action: action.kind(),
            reason: refusal.describe(),
        }],
        Dispatch::Redrawn {
            mutation, eligible, ..
        } => {
            let mut events = Vec::with_capacity(2);
            match (action, mutation) {
                (Action::ToggleCell(key), Mutation::Cell { active }) => {
                    events.push(ActivityEvent::CellToggled {
                        combo: key.to_string(),
                        active: *active,
                    });
                }
                (Action::ToggleRow(level), Mutation::Bulk(outcome)) => {
                    events.push(ActivityEvent::RowToggled {
                        level: level.get(),
                        outcome: *outcome,
                    });
                }
                (Action::ToggleColumn(category), Mutation::Bulk(outcome)) => {
                    events.push(ActivityEvent::ColumnToggled {
                        category: category.to_string(),
                        outcome: *outcome,
                    });
                }
                _ => {}
            }
            events.push(ActivityEvent::Drawn {
                prompt: controller.current().map(|r| r.text.clone()),
                eligible: *eligible,
            });
            events
        }
    }
}

/// Session activity sink. Disabled logs drop every event.
pub struct ActivityLog {
    writer: Option<JsonlWriter>,
    recorded: u64,
}

impl ActivityLog {
    /// A log that records nothing.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            writer: None,
            recorded: 0,
        }
    }

    /// Open the log described by `config`; disabled when logging is off.
    #[must_use]
    pub fn from_config(config: &LoggingConfig) -> Self {
        if !config.enabled {
            return Self::disabled();
        }
        Self::open(
            config.activity_log.clone(),
            config.max_size_bytes,
            config.max_rotated_files,
        )
    }

    /// Open a log at `path` regardless of configuration.
    #[must_use]
    pub fn open(path: PathBuf, max_size_bytes: u64, max_rotated_files: u32) -> Self {
        Self {
            writer: Some(JsonlWriter::open(JsonlConfig {
                path,
                max_size_bytes,
                max_rotated_files,
            })),
            recorded: 0,
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    /// Number of events accepted since open.
    #[must_use]
    pub const fn recorded(&self) -> u64 {
        self.recorded
    }

    pub fn record(&mut self, event: &ActivityEvent) {
        if let Some(writer) = self.writer.as_mut() {
            writer.write_entry(&event.to_entry());
            self.recorded += 1;
        }
    }

    pub fn record_all(&mut self, events: &[ActivityEvent]) {
        for event in events {
            self.record(event);
        }
    }

    pub fn flush(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush();
        }
    }
}
