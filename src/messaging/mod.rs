//! Typed publish/subscribe message bus
//!
//! User and IDE intents, status notices and lifecycle transitions all
//! travel as [`Message`] values. Subscribers register per concrete message
//! kind; within one kind, delivery to each subscriber follows publish
//! order. Across kinds no ordering is promised.

mod queue;

use std::path::PathBuf;

pub use queue::{MessageListener, MessageQueue};

/// The closed set of messages the core handles
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Bring the main window to the front
    ActivateWindow,
    /// A valid license key was entered; leave trial mode
    EnteredLicense,
    /// The analyzer finished writing to storage
    FinishedParsing,
    /// Open the project described by a settings file
    LoadProject {
        project_settings_path: PathBuf,
        force_refresh: bool,
    },
    /// Refresh views and optionally the project data
    Refresh {
        all: bool,
        ui_only: bool,
        load_style: bool,
    },
    /// Load a different color scheme and repaint
    SwitchColorScheme { color_scheme_path: PathBuf },
    /// One-line user-visible notice
    Status {
        text: String,
        is_error: bool,
        is_transient: bool,
    },
    /// Show the start screen overlay
    ShowStartScreen,
}

/// Tag identifying each message variant; keys the subscriber registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    ActivateWindow,
    EnteredLicense,
    FinishedParsing,
    LoadProject,
    Refresh,
    SwitchColorScheme,
    Status,
    ShowStartScreen,
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::ActivateWindow => MessageKind::ActivateWindow,
            Message::EnteredLicense => MessageKind::EnteredLicense,
            Message::FinishedParsing => MessageKind::FinishedParsing,
            Message::LoadProject { .. } => MessageKind::LoadProject,
            Message::Refresh { .. } => MessageKind::Refresh,
            Message::SwitchColorScheme { .. } => MessageKind::SwitchColorScheme,
            Message::Status { .. } => MessageKind::Status,
            Message::ShowStartScreen => MessageKind::ShowStartScreen,
        }
    }

    /// A refresh that repaints views without touching project data
    pub fn refresh_ui_only() -> Message {
        Message::Refresh {
            all: false,
            ui_only: true,
            load_style: true,
        }
    }

    /// A transient, non-error status notice
    pub fn status(text: impl Into<String>) -> Message {
        Message::Status {
            text: text.into(),
            is_error: false,
            is_transient: true,
        }
    }

    /// A persistent error status notice
    pub fn status_error(text: impl Into<String>) -> Message {
        Message::Status {
            text: text.into(),
            is_error: true,
            is_transient: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(Message::ActivateWindow.kind(), MessageKind::ActivateWindow);
        assert_eq!(
            Message::status("hello").kind(),
            MessageKind::Status
        );
        assert_eq!(
            Message::LoadProject {
                project_settings_path: PathBuf::from("p.prj"),
                force_refresh: false,
            }
            .kind(),
            MessageKind::LoadProject
        );
    }

    #[test]
    fn test_refresh_ui_only_defaults() {
        match Message::refresh_ui_only() {
            Message::Refresh {
                all,
                ui_only,
                load_style,
            } => {
                assert!(!all);
                assert!(ui_only);
                assert!(load_style);
            }
            _ => unreachable!(),
        }
    }
}
