//! Lambda invocation handling.

use lambda_runtime::{LambdaEvent, service_fn};
use serde_json::Value;
use thiserror::Error;
use tracing::{Instrument, error, info, info_span};

use asg_schedule_controller::{AutoScalingApi, ControllerError, ScaleController};

use crate::dispatch::{DispatchError, parse_request};

/// Failure of one invocation, returned to the invoker as its message.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Scale(#[from] ControllerError),
}

/// Serve Lambda invocations until the runtime shuts the process down.
pub async fn serve<P: AutoScalingApi>(
    controller: ScaleController<P>,
) -> Result<(), lambda_runtime::Error> {
    let controller = &controller;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        let span = info_span!("invocation", request_id = %event.context.request_id);
        invoke(controller, &event.payload)
            .instrument(span)
            .await
            .map_err(lambda_runtime::Error::from)
    }))
    .await
}

/// Dispatch one trigger payload to the matching controller pass.
pub async fn invoke<P: AutoScalingApi>(
    controller: &ScaleController<P>,
    payload: &Value,
) -> Result<(), InvocationError> {
    let action = parse_request(payload).inspect_err(|e| error!(error = %e, "rejected request"))?;

    info!(%action, "received request action");
    controller
        .run(action)
        .await
        .inspect_err(|e| error!(%action, error = %e, "request action failed"))?;
    Ok(())
}
