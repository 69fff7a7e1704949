use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use reservation_hours::api::{dispatch, ActionRequest, ApiResponse};
use reservation_hours::app::build_engine;
use reservation_hours::domain::ports::SharedStore;
use reservation_hours::utils::{logger, validation::Validate};
use reservation_hours::{AvailabilityEngine, LambdaConfig};
use std::sync::Arc;

async fn function_handler(
    engine: &AvailabilityEngine<SharedStore>,
    event: LambdaEvent<ActionRequest>,
) -> Result<ApiResponse<serde_json::Value>, Error> {
    let request = event.payload;
    tracing::info!(action = ?request.action, request_id = %event.context.request_id, "handling action");
    Ok(dispatch(engine, &request).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = LambdaConfig::from_env()?;
    logger::init_json_logger(&config.log_level);

    config.validate()?;
    let engine = Arc::new(build_engine(&config)?);
    tracing::info!(timezone = %config.timezone, "availability function ready");

    run(service_fn(move |event: LambdaEvent<ActionRequest>| {
        let engine = Arc::clone(&engine);
        async move { function_handler(&engine, event).await }
    }))
    .await
}
