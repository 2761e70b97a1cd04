use color_eyre::Result;
use tokio::task::JoinError;
use tracing::info;

use crate::{
    http_server::{routes, run_server},
    AppState,
};

pub(crate) async fn serve() -> Result<()> {
    let app_state = AppState::from_env().await?;

    info!("Spawning Tasks");
    let futures = vec![
        tokio::spawn(run_server(
            routes::make_router().with_state(app_state.clone()),
            app_state.app.port,
        )),
        tokio::spawn(
            app_state
                .recipe_costs
                .clone()
                .run_sweeper(app_state.app.cache_sweep_interval),
        ),
    ];
    info!("Tasks Spawned");

    let results = futures::future::join_all(futures).await;
    let results: Result<Vec<Result<()>>, JoinError> = results.into_iter().collect();
    results?.into_iter().collect::<Result<Vec<()>>>()?;

    info!("Main Returning");

    Ok(())
}
