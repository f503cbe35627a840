use recruitment_assessment::{
    config::{get_config, init_config},
    services::{eligibility_service::refresh_gate, transport::ReqwestTransport},
    AppState,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    init_config()?;
    let config = get_config();

    let transport = ReqwestTransport::new(Duration::from_secs(config.request_timeout_secs))?;
    let state = AppState::new(config, Arc::new(transport))?;

    if config.watch_job_ids.is_empty() {
        warn!("WATCH_JOB_IDS is empty, nothing to check");
        return Ok(());
    }
    info!(
        api_root = %config.api_root,
        jobs = config.watch_job_ids.len(),
        "Checking quiz eligibility"
    );

    let mut lookups = JoinSet::new();
    for job_id in &config.watch_job_ids {
        let state = state.clone();
        let job_id = job_id.clone();
        lookups.spawn(async move {
            let view = refresh_gate(
                &state.history_service,
                &state.eligibility_gate,
                &job_id,
                state.candidate_id.as_deref(),
            )
            .await;
            (job_id, view)
        });
    }

    while let Some(joined) = lookups.join_next().await {
        match joined {
            Ok((job_id, Ok(view))) => {
                info!(
                    job_id = %job_id,
                    apply_enabled = view.apply_enabled,
                    label = %view.label,
                    "Eligibility"
                )
            }
            Ok((job_id, Err(e))) => {
                error!(job_id = %job_id, error = %e, "Eligibility check failed")
            }
            Err(e) => error!(error = %e, "Eligibility task panicked"),
        }
    }

    Ok(())
}
