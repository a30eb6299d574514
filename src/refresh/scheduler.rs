//! Daily refresh scheduler.
//!
//! A single long-lived task: compute the time to the next local midnight,
//! sleep, run the forced rebuild, loop. The watch channel is the shutdown
//! hook; dropping the sender side stops the loop at the next wakeup point.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use tokio::sync::watch;

use crate::refresh;
use crate::state::AppState;

pub async fn run(state: Arc<AppState>, mut shutdown: watch::Receiver<bool>) {
    loop {
        let wait = duration_until_next_midnight(Local::now().naive_local());
        tracing::info!("next scheduled refresh in {:?}", wait);

        tokio::select! {
            _ = tokio::time::sleep(wait) => {
                refresh::run_scheduled_refresh(&state).await;
            }
            _ = shutdown.changed() => {
                tracing::info!("refresh scheduler stopping");
                return;
            }
        }
    }
}

fn duration_until_next_midnight(now: NaiveDateTime) -> Duration {
    let next = now
        .date()
        .succ_opt()
        .and_then(|day| day.and_hms_opt(0, 0, 0));

    match next {
        Some(next) => (next - now).to_std().unwrap_or(Duration::ZERO),
        // Only reachable at the end of representable time.
        None => Duration::from_secs(24 * 60 * 60),
    }
}
