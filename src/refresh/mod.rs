//! Rebuild-and-publish paths.
//!
//! Every way an index rebuild can start funnels through here so the
//! single-build-in-flight lock and the publish step stay in one place.
//! Queries keep reading the previously published snapshot throughout; a
//! failed rebuild leaves the served index untouched.

use std::sync::Arc;

use crate::core::errors::ApiError;
use crate::state::AppState;

pub mod scheduler;

/// Operator-triggered forced rebuild.
///
/// Rejects with a conflict when another build is already running instead
/// of queueing, so the operator gets immediate feedback.
pub async fn run_manual_refresh(state: &Arc<AppState>) -> Result<usize, ApiError> {
    let Ok(_guard) = state.build_lock.try_lock() else {
        return Err(ApiError::Conflict(
            "A refresh is already in progress".to_string(),
        ));
    };

    let records = state
        .builder
        .build(true, false)
        .await
        .map_err(ApiError::internal)?;
    let count = records.len();
    state.index.publish(records).await;
    Ok(count)
}

/// Scheduled forced rebuild. Waits for any build in flight rather than
/// skipping the day's refresh; failures are logged and the previously
/// served index stays up.
pub async fn run_scheduled_refresh(state: &Arc<AppState>) {
    let _guard = state.build_lock.lock().await;

    match state.builder.build(true, false).await {
        Ok(records) => {
            tracing::info!("scheduled refresh published {} records", records.len());
            state.index.publish(records).await;
        }
        Err(err) => {
            tracing::error!("scheduled refresh failed, keeping served index: {}", err);
        }
    }
}

/// Startup population: serve a valid cache immediately, resume an
/// interrupted build if one left a partial behind.
pub async fn load_initial(state: &Arc<AppState>) {
    let _guard = state.build_lock.lock().await;

    match state.builder.build(false, true).await {
        Ok(records) => {
            tracing::info!("initial load published {} records", records.len());
            state.index.publish(records).await;
        }
        Err(err) => {
            tracing::warn!("initial load failed, index stays empty until refresh: {}", err);
        }
    }
}
