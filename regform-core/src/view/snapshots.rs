//! src/view/snapshots.rs
//! ============================================================
//! In-memory rendition of the registration page.
//!
//! `FormSnapshot` is the complete DOM-facing state of the form:
//! the user inputs plus everything the controller writes.
//! `SnapshotView` implements `FormView` on top of it and is what
//! the terminal host draws from; tests compare snapshots.

use crate::config::FormConfig;
use crate::model::form_state::{FormField, RegistrationTab, RegistrationType};
use crate::model::region_list::SelectOption;
use crate::view::traits::FormView;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSnapshot {
    pub legal_tab_active: bool,
    pub individual_tab_active: bool,

    /// Hidden user-type field; empty until the first form update
    pub user_type: Option<RegistrationType>,

    pub fop_block_visible: bool,
    pub fop_checked: bool,

    pub country: Option<String>,

    pub region_options: Vec<SelectOption>,
    pub region_enabled: bool,
    pub region_value: Option<String>,

    pub requisites_visible: bool,
    pub company_required: bool,
    pub okpo_required: bool,

    pub avatar_src: Option<String>,
    pub avatar_placeholder_visible: bool,
}

impl FormSnapshot {
    pub fn tab_active(&self, tab: RegistrationTab) -> bool {
        match tab {
            RegistrationTab::Legal => self.legal_tab_active,
            RegistrationTab::Individual => self.individual_tab_active,
        }
    }

    pub fn region_labels(&self) -> Vec<&str> {
        self.region_options.iter().map(|o| o.label.as_str()).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SnapshotView {
    snapshot: FormSnapshot,
    writes: u64,
}

impl SnapshotView {
    /// Page as served: `tab` carries the active marker, the region
    /// selector is enabled and the placeholder graphic is showing.
    pub fn new(tab: RegistrationTab) -> Self {
        let mut snapshot = FormSnapshot {
            region_enabled: true,
            avatar_placeholder_visible: true,
            ..FormSnapshot::default()
        };
        match tab {
            RegistrationTab::Legal => snapshot.legal_tab_active = true,
            RegistrationTab::Individual => snapshot.individual_tab_active = true,
        }
        Self {
            snapshot,
            writes: 0,
        }
    }

    pub fn from_config(form: &FormConfig) -> Self {
        Self::new(form.initial_tab)
            .with_fop_checked(form.fop_checked)
            .with_country(form.initial_country.as_deref())
            .with_region(form.initial_region.as_deref())
    }

    #[must_use]
    pub fn with_fop_checked(mut self, checked: bool) -> Self {
        self.snapshot.fop_checked = checked;
        self
    }

    #[must_use]
    pub fn with_country(mut self, country: Option<&str>) -> Self {
        self.snapshot.country = country.map(str::to_string);
        self
    }

    #[must_use]
    pub fn with_region(mut self, region: Option<&str>) -> Self {
        self.snapshot.region_value = region.map(str::to_string);
        self
    }

    pub fn snapshot(&self) -> &FormSnapshot {
        &self.snapshot
    }

    /// Number of controller writes received so far.
    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// User typed into the country selector.
    pub fn input_country(&mut self, country: Option<&str>) {
        self.snapshot.country = country.map(str::to_string);
    }

    /// User toggled the FOP checkbox.
    pub fn input_fop_checked(&mut self, checked: bool) {
        self.snapshot.fop_checked = checked;
    }

    /// User picked a region option.
    pub fn input_region(&mut self, region: Option<&str>) {
        self.snapshot.region_value = region.map(str::to_string);
    }

    fn touch(&mut self) -> &mut FormSnapshot {
        self.writes += 1;
        &mut self.snapshot
    }
}

impl FormView for SnapshotView {
    fn active_tab(&self) -> RegistrationTab {
        if self.snapshot.legal_tab_active {
            RegistrationTab::Legal
        } else if self.snapshot.individual_tab_active {
            RegistrationTab::Individual
        } else {
            RegistrationTab::default()
        }
    }

    fn fop_checked(&self) -> bool {
        self.snapshot.fop_checked
    }

    fn country_value(&self) -> Option<String> {
        self.snapshot.country.clone()
    }

    fn region_value(&self) -> Option<String> {
        self.snapshot.region_value.clone()
    }

    fn set_region_options(&mut self, options: &[SelectOption]) {
        self.touch().region_options = options.to_vec();
    }

    fn set_region_enabled(&mut self, enabled: bool) {
        self.touch().region_enabled = enabled;
    }

    fn set_region_value(&mut self, value: Option<&str>) {
        self.touch().region_value = value.map(str::to_string);
    }

    fn set_tab_active(&mut self, tab: RegistrationTab, active: bool) {
        let snap = self.touch();
        match tab {
            RegistrationTab::Legal => snap.legal_tab_active = active,
            RegistrationTab::Individual => snap.individual_tab_active = active,
        }
    }

    fn set_user_type(&mut self, registration_type: RegistrationType) {
        self.touch().user_type = Some(registration_type);
    }

    fn set_fop_block_visible(&mut self, visible: bool) {
        self.touch().fop_block_visible = visible;
    }

    fn set_requisites_visible(&mut self, visible: bool) {
        self.touch().requisites_visible = visible;
    }

    fn set_field_required(&mut self, field: FormField, required: bool) {
        let snap = self.touch();
        match field {
            FormField::CompanyName => snap.company_required = required,
            FormField::Okpo => snap.okpo_required = required,
        }
    }

    fn set_avatar_preview(&mut self, src: Option<&str>) {
        self.touch().avatar_src = src.map(str::to_string);
    }

    fn set_avatar_placeholder_visible(&mut self, visible: bool) {
        self.touch().avatar_placeholder_visible = visible;
    }
}
