//! Background catalog fetches.
//!
//! The controller hands out a [`FetchTicket`]; the network call runs on a
//! spawned task without the controller lock, and the lock is taken again
//! only to apply the result.

use flowshelf_core::controller::{FetchTicket, Navigation};
use tokio::task::JoinHandle;

use crate::state::AppState;

/// Run the fetch described by `ticket` and apply its outcome.
pub async fn run_fetch(state: AppState, ticket: FetchTicket) -> Navigation {
    let generation = ticket.generation();
    let result = state.source.fetch(ticket.settings()).await;

    let applied = state
        .with_controller_blocking(move |controller| {
            let navigation = controller.complete_fetch(ticket, result);
            tracing::debug!(
                generation,
                state = controller.state().name(),
                path = controller.path(),
                ?navigation,
                "Fetch applied"
            );
            navigation
        })
        .await;

    match applied {
        Ok(navigation) => navigation,
        Err(e) => {
            tracing::error!(generation, error = %e, "Could not apply fetch result");
            Navigation::Stay
        }
    }
}

/// Spawn [`run_fetch`] on the runtime.
pub fn spawn_fetch(state: AppState, ticket: FetchTicket) -> JoinHandle<Navigation> {
    tokio::spawn(run_fetch(state, ticket))
}

/// Start the controller at `initial_path` and kick off the startup fetch.
///
/// Returns `None` when the settings are incomplete and the controller went
/// straight to the settings screen.
pub async fn start(state: &AppState, initial_path: &str) -> Option<JoinHandle<Navigation>> {
    let ticket = state.controller.lock().await.start(initial_path)?;
    Some(spawn_fetch(state.clone(), ticket))
}
