//! ``src/controller/event_loop.rs``
//! ============================================================================
//! # Event Loop
//!
//! Single-threaded cooperative dispatch: user actions and background task
//! results are merged into one stream of `Action`s and applied to the
//! controller one at a time. The controller is never touched concurrently.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{debug, info, trace};

use crate::AppError;
use crate::controller::actions::Action;
use crate::controller::form_controller::RegistrationFormController;
use crate::lookup::traits::LookupError;
use crate::model::region_list::{CountryId, Region};
use crate::util::sequence::RequestToken;
use crate::view::traits::FormView;

/// Completion of a background task, tagged with the token it started with.
#[derive(Debug, Clone)]
pub enum TaskResult {
    RegionsLoaded {
        token: RequestToken,
        country: CountryId,
        result: Result<Vec<Region>, LookupError>,
    },

    AvatarRead {
        token: RequestToken,
        path: PathBuf,
        result: Result<String, AppError>,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopMetrics {
    pub actions: u64,
    pub tasks: u64,
    pub stale_tasks: u64,
    pub total_dispatch: Duration,
}

impl LoopMetrics {
    pub fn avg_dispatch(&self) -> Duration {
        let count = self.actions + self.tasks;
        if count == 0 {
            Duration::ZERO
        } else {
            self.total_dispatch / u32::try_from(count).unwrap_or(u32::MAX)
        }
    }
}

pub struct EventLoop<V: FormView> {
    controller: RegistrationFormController<V>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    task_rx: mpsc::UnboundedReceiver<TaskResult>,
    metrics: LoopMetrics,
    actions_open: bool,
    tasks_open: bool,
}

impl<V: FormView> EventLoop<V> {
    /// `task_rx` must be the receiving end of the sender the controller
    /// was built with.
    pub fn new(
        controller: RegistrationFormController<V>,
        action_rx: mpsc::UnboundedReceiver<Action>,
        task_rx: mpsc::UnboundedReceiver<TaskResult>,
    ) -> Self {
        info!("Initializing registration form event loop");
        Self {
            controller,
            action_rx,
            task_rx,
            metrics: LoopMetrics::default(),
            actions_open: true,
            tasks_open: true,
        }
    }

    pub fn controller(&self) -> &RegistrationFormController<V> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut RegistrationFormController<V> {
        &mut self.controller
    }

    pub fn into_controller(self) -> RegistrationFormController<V> {
        self.controller
    }

    pub fn metrics(&self) -> LoopMetrics {
        self.metrics
    }

    /// Waits for the next action or task result. Yields `Quit` once the
    /// host stops sending actions.
    pub async fn next_action(&mut self) -> Action {
        loop {
            if !self.actions_open {
                return Action::Quit;
            }

            tokio::select! {
                action = self.action_rx.recv() => match action {
                    Some(action) => return action,
                    None => {
                        debug!("Action channel closed");
                        self.actions_open = false;
                    }
                },

                task = self.task_rx.recv(), if self.tasks_open => match task {
                    Some(task) => return Action::TaskResult(task),
                    None => {
                        debug!("Task channel closed");
                        self.tasks_open = false;
                    }
                },
            }
        }
    }

    /// Applies one action. Returns `false` when the loop should stop.
    pub fn dispatch(&mut self, action: Action) -> bool {
        let start = Instant::now();
        trace!(action = action.name(), "dispatch");
        if !matches!(action, Action::TaskResult(_)) {
            self.metrics.actions += 1;
        }

        let keep_running = match action {
            Action::Initialize => {
                self.controller.initialize();
                true
            }
            Action::CountryChanged(country) => {
                self.controller.on_country_changed(country.as_deref());
                true
            }
            Action::RegionSelected(region) => {
                self.controller.on_region_selected(region.as_deref());
                true
            }
            Action::TabChanged(tab) => {
                self.controller.on_tab_changed(tab);
                true
            }
            Action::FopCheckboxChanged(checked) => {
                self.controller.on_fop_checkbox_changed(checked);
                true
            }
            Action::AvatarFileSelected(path) => {
                self.controller.on_avatar_file_selected(path);
                true
            }
            Action::TaskResult(result) => {
                self.metrics.tasks += 1;
                if !self.controller.handle_task_result(result) {
                    self.metrics.stale_tasks += 1;
                }
                true
            }
            Action::Quit => false,
        };

        self.metrics.total_dispatch += start.elapsed();
        keep_running
    }

    /// Drives the loop until `Quit` or until the action channel closes.
    pub async fn run(mut self) -> Self {
        loop {
            let action = self.next_action().await;
            if !self.dispatch(action) {
                break;
            }
        }

        info!(
            actions = self.metrics.actions,
            tasks = self.metrics.tasks,
            stale_tasks = self.metrics.stale_tasks,
            avg_dispatch_us = self.metrics.avg_dispatch().as_micros(),
            "Event loop terminated"
        );
        self
    }
}
