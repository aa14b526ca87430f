//! Terminal host UI state: prompt line, notification banner and the region
//! cursor. None of this is form state; it only exists in the TUI host.

use std::time::{Duration, Instant};

use compact_str::CompactString;

/// Notification levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NotificationLevel {
    Info = 0,
    Error = 1,
}

/// Compact notification with timestamp
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: CompactString,
    pub level: NotificationLevel,
    pub timestamp: Instant,
    pub auto_dismiss_ms: Option<u32>,
}

impl Notification {
    pub fn is_expired(&self, now: Instant) -> bool {
        self.auto_dismiss_ms
            .is_some_and(|ms| now.duration_since(self.timestamp) >= Duration::from_millis(ms.into()))
    }
}

/// What the prompt line is collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Country,
    AvatarPath,
}

impl PromptKind {
    pub const fn title(self) -> &'static str {
        match self {
            Self::Country => "Country id (empty clears)",
            Self::AvatarPath => "Avatar file path",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPrompt {
    pub kind: PromptKind,
    pub buffer: String,
}

impl InputPrompt {
    pub fn new(kind: PromptKind, initial: impl Into<String>) -> Self {
        Self {
            kind,
            buffer: initial.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UIState {
    pub prompt: Option<InputPrompt>,
    pub notification: Option<Notification>,
    pub region_cursor: usize,
    redraw: bool,
}

impl Default for UIState {
    fn default() -> Self {
        Self::new()
    }
}

impl UIState {
    pub fn new() -> Self {
        Self {
            prompt: None,
            notification: None,
            region_cursor: 0,
            redraw: true,
        }
    }

    #[inline]
    pub fn request_redraw(&mut self) {
        self.redraw = true;
    }

    #[inline]
    pub fn clear_redraw(&mut self) {
        self.redraw = false;
    }

    #[inline]
    pub fn needs_redraw(&self) -> bool {
        self.redraw
    }

    pub fn open_prompt(&mut self, kind: PromptKind, initial: impl Into<String>) {
        self.prompt = Some(InputPrompt::new(kind, initial));
        self.request_redraw();
    }

    /// Closes the prompt and returns what was typed.
    pub fn take_prompt(&mut self) -> Option<InputPrompt> {
        self.request_redraw();
        self.prompt.take()
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<CompactString>) {
        self.notification = Some(Notification {
            message: message.into(),
            level,
            timestamp: Instant::now(),
            auto_dismiss_ms: match level {
                NotificationLevel::Info => Some(3000),
                NotificationLevel::Error => None,
            },
        });
        self.request_redraw();
    }

    pub fn show_info(&mut self, message: impl Into<CompactString>) {
        self.notify(NotificationLevel::Info, message);
    }

    pub fn show_error(&mut self, message: impl Into<CompactString>) {
        self.notify(NotificationLevel::Error, message);
    }

    /// Drops an expired notification; returns `true` if one was dropped.
    pub fn expire_notification(&mut self, now: Instant) -> bool {
        if self.notification.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.notification = None;
            self.request_redraw();
            true
        } else {
            false
        }
    }

    /// Moves the region cursor by `delta`, clamped to `len` entries.
    pub fn move_region_cursor(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.region_cursor = 0;
            return;
        }
        let next = self.region_cursor.saturating_add_signed(delta);
        self.region_cursor = next.min(len - 1);
        self.request_redraw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_lifecycle() {
        let mut ui = UIState::new();
        ui.clear_redraw();

        ui.open_prompt(PromptKind::Country, "UA");
        assert!(ui.needs_redraw());
        ui.prompt.as_mut().unwrap().buffer.push('X');

        let prompt = ui.take_prompt().unwrap();
        assert_eq!(prompt.kind, PromptKind::Country);
        assert_eq!(prompt.buffer, "UAX");
        assert!(ui.prompt.is_none());
    }

    #[test]
    fn test_region_cursor_is_clamped() {
        let mut ui = UIState::new();
        ui.move_region_cursor(-1, 3);
        assert_eq!(ui.region_cursor, 0);
        ui.move_region_cursor(10, 3);
        assert_eq!(ui.region_cursor, 2);
        ui.move_region_cursor(1, 0);
        assert_eq!(ui.region_cursor, 0);
    }

    #[test]
    fn test_errors_do_not_auto_dismiss() {
        let mut ui = UIState::new();
        ui.show_error("boom");
        let later = Instant::now() + Duration::from_secs(60);
        assert!(!ui.expire_notification(later));

        ui.show_info("saved");
        assert!(ui.expire_notification(later));
        assert!(ui.notification.is_none());
    }
}
