//! ``src/controller/form_controller.rs``
//! ============================================================================
//! # Registration Form Controller
//!
//! Keeps derived form state consistent with user input:
//! - registration type, requisites visibility and requiredness derived from
//!   the active tab and the FOP checkbox
//! - the cascading country -> region selector backed by a `RegionLookup`
//! - the avatar preview
//!
//! The page is reached only through the injected `FormView`; the lookup
//! only through the injected `RegionLookup`. Async completions come back as
//! `TaskResult`s and are applied only when their token is still current, so
//! a slow answer for an old country never overwrites a newer one.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, instrument, warn};

use crate::config::{AvatarConfig, Config, RegionLabels};
use crate::controller::event_loop::TaskResult;
use crate::lookup::traits::RegionLookup;
use crate::model::avatar::AvatarPreview;
use crate::model::form_state::{
    FieldRequirements, FormField, FormState, RegistrationTab, RegistrationType,
};
use crate::model::region_list::{CountryId, RegionListState};
use crate::tasks::{avatar_task::spawn_avatar_read, region_task::spawn_region_lookup};
use crate::util::sequence::RequestSequencer;
use crate::view::bindings::{ElementId, EventSubscriptions, FormEvent, SubscriptionId};
use crate::view::traits::FormView;

pub struct RegistrationFormController<V: FormView> {
    view: V,
    lookup: Arc<dyn RegionLookup>,
    task_tx: mpsc::UnboundedSender<TaskResult>,

    labels: RegionLabels,
    avatar_config: AvatarConfig,

    state: FormState,
    regions: RegionListState,
    selected_region: Option<String>,
    avatar: AvatarPreview,

    region_seq: RequestSequencer,
    avatar_seq: RequestSequencer,
    region_task: Option<JoinHandle<()>>,
    avatar_task: Option<JoinHandle<()>>,

    subscriptions: EventSubscriptions,
}

impl<V: FormView> RegistrationFormController<V> {
    pub fn new(
        view: V,
        lookup: Arc<dyn RegionLookup>,
        task_tx: mpsc::UnboundedSender<TaskResult>,
    ) -> Self {
        Self {
            view,
            lookup,
            task_tx,
            labels: RegionLabels::default(),
            avatar_config: AvatarConfig::default(),
            state: FormState::default(),
            regions: RegionListState::Unselected,
            selected_region: None,
            avatar: AvatarPreview::Placeholder,
            region_seq: RequestSequencer::new(),
            avatar_seq: RequestSequencer::new(),
            region_task: None,
            avatar_task: None,
            subscriptions: EventSubscriptions::new(),
        }
    }

    pub fn from_config(
        view: V,
        lookup: Arc<dyn RegionLookup>,
        task_tx: mpsc::UnboundedSender<TaskResult>,
        config: &Config,
    ) -> Self {
        Self::new(view, lookup, task_tx)
            .with_labels(config.labels.clone())
            .with_avatar_config(config.avatar.clone())
    }

    #[must_use]
    pub fn with_labels(mut self, labels: RegionLabels) -> Self {
        self.labels = labels;
        self
    }

    #[must_use]
    pub fn with_avatar_config(mut self, avatar_config: AvatarConfig) -> Self {
        self.avatar_config = avatar_config;
        self
    }

    /* ------------------------------ accessors ----------------------------- */

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn registration_type(&self) -> RegistrationType {
        self.state.registration_type()
    }

    pub fn regions(&self) -> &RegionListState {
        &self.regions
    }

    pub fn selected_region(&self) -> Option<&str> {
        self.selected_region.as_deref()
    }

    pub fn avatar(&self) -> &AvatarPreview {
        &self.avatar
    }

    pub fn labels(&self) -> &RegionLabels {
        &self.labels
    }

    pub fn subscribe<F>(&mut self, element: ElementId, listener: F) -> SubscriptionId
    where
        F: FnMut(&FormEvent) + Send + 'static,
    {
        self.subscriptions.subscribe(element, listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscriptions.unsubscribe(id)
    }

    /* ------------------------------ operations ---------------------------- */

    /// Reads the page as served and brings every derived element in line.
    #[instrument(level = "debug", skip(self))]
    pub fn initialize(&mut self) {
        self.state = FormState::new(self.view.active_tab(), self.view.fop_checked());
        self.selected_region = self.view.region_value().filter(|v| !v.is_empty());

        info!(
            marker = "FORM_CONTROLLER",
            operation_type = "initialize",
            tab = self.state.active_tab.as_str(),
            fop_checked = self.state.fop_checked,
            "Initializing registration form"
        );

        match CountryId::parse(self.view.country_value().as_deref()) {
            Some(country) => self.start_region_lookup(country),
            None => self.set_regions(RegionListState::Unselected),
        }

        self.apply_tabs();
        self.update_form_state();
    }

    #[instrument(level = "debug", skip(self))]
    pub fn on_country_changed(&mut self, country: Option<&str>) {
        self.selected_region = None;

        match CountryId::parse(country) {
            Some(country) => self.start_region_lookup(country),
            None => {
                // Any answer still in flight belongs to a country that is gone.
                self.region_seq.invalidate();
                self.abort_region_task();
                debug!(
                    marker = "FORM_CONTROLLER",
                    operation_type = "country_cleared",
                    "Country cleared"
                );
                self.set_regions(RegionListState::Unselected);
            }
        }
    }

    /// Returns `false` if `value` is not one of the current regions.
    pub fn on_region_selected(&mut self, value: Option<&str>) -> bool {
        let value = value.filter(|v| !v.is_empty());
        if let Some(id) = value
            && !self.regions.contains(id)
        {
            warn!(
                marker = "FORM_CONTROLLER",
                operation_type = "region_rejected",
                region = id,
                "Region is not in the current list"
            );
            return false;
        }

        self.selected_region = value.map(str::to_string);
        self.view.set_region_value(value);
        self.emit_region_changed();
        true
    }

    pub fn on_tab_changed(&mut self, tab: RegistrationTab) {
        self.state.active_tab = tab;
        self.apply_tabs();
        self.update_form_state();
    }

    pub fn on_fop_checkbox_changed(&mut self, checked: bool) {
        self.state.fop_checked = checked;
        self.update_form_state();
    }

    pub fn on_avatar_file_selected(&mut self, file: Option<PathBuf>) {
        let Some(path) = file else {
            return;
        };

        let token = self.avatar_seq.issue();
        if let Some(task) = self.avatar_task.take() {
            task.abort();
        }

        info!(
            marker = "FORM_CONTROLLER",
            operation_type = "avatar_selected",
            token = token.get(),
            path = %path.display(),
            "Reading avatar preview"
        );

        self.avatar = AvatarPreview::Loading { path: path.clone() };
        self.apply_avatar();
        self.avatar_task = Some(spawn_avatar_read(
            token,
            path,
            self.avatar_config.clone(),
            self.task_tx.clone(),
        ));
    }

    /// Applies the tab/checkbox derived state to the page. Writes absolute
    /// values only, so calling it again without a change is a no-op for the
    /// page.
    pub fn update_form_state(&mut self) -> FieldRequirements {
        let req = self.state.requirements();

        self.view.set_user_type(req.registration_type);
        self.view.set_fop_block_visible(req.fop_block_visible);
        self.view.set_requisites_visible(req.requisites_visible);
        for field in FormField::REQUISITES {
            self.view.set_field_required(field, req.is_required(field));
        }

        debug!(
            marker = "FORM_CONTROLLER",
            operation_type = "form_state_applied",
            registration_type = req.registration_type.as_str(),
            requisites_visible = req.requisites_visible,
            "Form state applied"
        );
        req
    }

    /// Applies a background completion. Returns `false` if it was stale.
    pub fn handle_task_result(&mut self, result: TaskResult) -> bool {
        match result {
            TaskResult::RegionsLoaded {
                token,
                country,
                result,
            } => {
                if !self.region_seq.is_current(token) {
                    debug!(
                        marker = "FORM_CONTROLLER",
                        operation_type = "stale_regions_discarded",
                        token = token.get(),
                        latest = self.region_seq.latest(),
                        country = %country,
                        "Discarding stale region lookup"
                    );
                    return false;
                }
                self.region_task = None;
                self.set_regions(RegionListState::from_lookup(country, result));
                true
            }

            TaskResult::AvatarRead {
                token,
                path,
                result,
            } => {
                if !self.avatar_seq.is_current(token) {
                    debug!(
                        marker = "FORM_CONTROLLER",
                        operation_type = "stale_avatar_discarded",
                        token = token.get(),
                        "Discarding stale avatar read"
                    );
                    return false;
                }
                self.avatar_task = None;
                self.avatar = match result {
                    Ok(data_url) => AvatarPreview::Ready { path, data_url },
                    Err(e) => AvatarPreview::ReadError {
                        path,
                        reason: e.to_string(),
                    },
                };
                self.apply_avatar();
                true
            }
        }
    }

    /* ------------------------------ internals ----------------------------- */

    fn start_region_lookup(&mut self, country: CountryId) {
        let token = self.region_seq.issue();
        self.abort_region_task();

        info!(
            marker = "FORM_CONTROLLER",
            operation_type = "region_lookup_issued",
            token = token.get(),
            country = %country,
            "Issuing region lookup"
        );

        self.set_regions(RegionListState::Loading {
            country: country.clone(),
        });
        self.region_task = Some(spawn_region_lookup(
            token,
            country,
            self.lookup.clone(),
            self.task_tx.clone(),
        ));
    }

    fn abort_region_task(&mut self) {
        if let Some(task) = self.region_task.take() {
            task.abort();
        }
    }

    fn set_regions(&mut self, regions: RegionListState) {
        self.regions = regions;

        let terminal = self.regions.is_terminal();
        if terminal
            && self
                .selected_region
                .as_deref()
                .is_some_and(|id| !self.regions.contains(id))
        {
            self.selected_region = None;
        }

        let options = self.regions.options(&self.labels);
        self.view.set_region_options(&options);
        self.view.set_region_enabled(self.regions.selector_enabled());
        self.view.set_region_value(if terminal {
            self.selected_region.as_deref()
        } else {
            None
        });

        debug!(
            marker = "FORM_CONTROLLER",
            operation_type = "regions_applied",
            state = self.regions.name(),
            options = options.len(),
            "Region list applied"
        );

        if terminal {
            self.emit_region_changed();
        }
    }

    fn apply_tabs(&mut self) {
        for tab in RegistrationTab::ALL {
            self.view.set_tab_active(tab, tab == self.state.active_tab);
        }
    }

    fn apply_avatar(&mut self) {
        self.view.set_avatar_preview(self.avatar.image_src());
        self.view
            .set_avatar_placeholder_visible(self.avatar.placeholder_visible());
    }

    fn emit_region_changed(&mut self) {
        let event = FormEvent::Changed {
            element: ElementId::Region,
            value: self.selected_region.clone(),
        };
        self.subscriptions.emit(&event);
    }
}

impl<V: FormView> Drop for RegistrationFormController<V> {
    fn drop(&mut self) {
        self.abort_region_task();
        if let Some(task) = self.avatar_task.take() {
            task.abort();
        }
    }
}

impl<V: FormView + std::fmt::Debug> std::fmt::Debug for RegistrationFormController<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationFormController")
            .field("view", &self.view)
            .field("state", &self.state)
            .field("regions", &self.regions.name())
            .field("selected_region", &self.selected_region)
            .field("avatar", &self.avatar)
            .finish_non_exhaustive()
    }
}
