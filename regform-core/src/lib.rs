pub mod error;

pub mod config;

pub mod controller {

    pub mod actions;
    pub use actions::Action;

    pub mod event_loop;
    pub use event_loop::{EventLoop, LoopMetrics, TaskResult};

    pub mod form_controller;
    pub use form_controller::RegistrationFormController;
}

pub mod model {
    pub mod avatar;
    pub use avatar::AvatarPreview;

    pub mod form_state;
    pub use form_state::{FieldRequirements, FormField, FormState, RegistrationTab, RegistrationType};

    pub mod region_list;
    pub use region_list::{CountryId, Region, RegionListState, SelectOption};

    pub mod ui_state;
    pub use ui_state::{InputPrompt, Notification, NotificationLevel, PromptKind, UIState};
}

pub mod lookup {
    pub mod traits;
    pub use traits::{LookupError, RegionLookup};

    pub mod http;
    pub use http::HttpRegionLookup;

    pub mod fixture;
    pub use fixture::FixtureRegionLookup;
}

pub mod tasks {
    pub mod avatar_task;

    pub mod region_task;
}

pub mod view {
    pub mod bindings;
    pub use bindings::{ElementId, EventSubscriptions, FormEvent, SubscriptionId};

    pub mod snapshots;
    pub use snapshots::{FormSnapshot, SnapshotView};

    pub mod traits;
    pub use traits::FormView;

    pub mod ui;
}

pub mod logging;
pub use logging::Logger;

pub mod util {
    pub mod sequence;
    pub use sequence::{RequestSequencer, RequestToken};
}

pub use error::AppError;

pub use controller::RegistrationFormController;
