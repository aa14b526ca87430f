//! src/controller/actions.rs
//! ============================================================================
//! # Actions: Registration Form Commands
//!
//! Every user interaction and background completion reaches the controller
//! as one `Action`, so the event loop has a single dispatch point.

use std::path::PathBuf;

use crate::controller::event_loop::TaskResult;
use crate::model::form_state::RegistrationTab;

#[derive(Debug, Clone)]
pub enum Action {
    /// Page finished loading.
    Initialize,

    /// Country selector changed; blank or `None` means cleared.
    CountryChanged(Option<String>),

    /// Region selector changed.
    RegionSelected(Option<String>),

    /// A registration tab was clicked.
    TabChanged(RegistrationTab),

    FopCheckboxChanged(bool),

    /// Avatar input changed; `None` when the file dialog was dismissed.
    AvatarFileSelected(Option<PathBuf>),

    /// A background task finished.
    TaskResult(TaskResult),

    /// Stop the event loop.
    Quit,
}

impl Action {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::CountryChanged(_) => "country_changed",
            Self::RegionSelected(_) => "region_selected",
            Self::TabChanged(_) => "tab_changed",
            Self::FopCheckboxChanged(_) => "fop_checkbox_changed",
            Self::AvatarFileSelected(_) => "avatar_file_selected",
            Self::TaskResult(_) => "task_result",
            Self::Quit => "quit",
        }
    }
}
