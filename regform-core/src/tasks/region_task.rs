//! ``src/tasks/region_task.rs``
//! ============================================================================
//! # Region Task: background country -> region lookup
//!
//! Runs one lookup off the event loop and reports back as
//! `TaskResult::RegionsLoaded`, tagged with the token it was started with.
//! Whether the result is still wanted is decided by the receiver.

use std::sync::Arc;
use std::time::Instant;

use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{Instrument, info, info_span, warn};

use crate::controller::event_loop::TaskResult;
use crate::lookup::traits::RegionLookup;
use crate::model::region_list::CountryId;
use crate::util::sequence::RequestToken;

pub fn spawn_region_lookup(
    token: RequestToken,
    country: CountryId,
    lookup: Arc<dyn RegionLookup>,
    task_tx: mpsc::UnboundedSender<TaskResult>,
) -> JoinHandle<()> {
    let span = info_span!("region_lookup", token = token.get(), country = %country);

    tokio::spawn(
        async move {
            let start = Instant::now();
            info!(
                marker = "REGION_TASK",
                operation_type = "lookup_start",
                "Starting region lookup"
            );

            let result = lookup.regions(&country).await;

            match &result {
                Ok(regions) => info!(
                    marker = "REGION_TASK",
                    operation_type = "lookup_complete",
                    count = regions.len(),
                    duration_ms = start.elapsed().as_millis(),
                    "Region lookup completed"
                ),
                Err(e) => warn!(
                    marker = "REGION_TASK",
                    operation_type = "lookup_failed",
                    error = %e,
                    duration_ms = start.elapsed().as_millis(),
                    "Region lookup failed"
                ),
            }

            if task_tx
                .send(TaskResult::RegionsLoaded {
                    token,
                    country,
                    result,
                })
                .is_err()
            {
                warn!(
                    marker = "REGION_TASK",
                    operation_type = "result_dropped",
                    "Event loop gone; region lookup result dropped"
                );
            }
        }
        .instrument(span),
    )
}
