//! `ps`: list the services known to the daemon.

use serde_json::Value;

use super::NoParams;
use crate::context::AppContext;
use crate::errors::AppError;
use crate::rpc::RpcError;

pub(crate) async fn ps(context: &AppContext) -> Result<(), AppError> {
    let daemon = context.daemon();
    daemon.start().await?;
    let table = daemon.call("status", NoParams {}).await?;
    let Value::Object(services) = table else {
        return Err(RpcError::UnexpectedResponse {
            method: String::from("status"),
            detail: format!("expected an object of services, got {table}"),
        }
        .into());
    };
    for (name, entry) in &services {
        context.say(format_args!("{name}\t{}", status_text(entry)))?;
    }
    context.shutdown().request_shutdown();
    Ok(())
}

fn status_text(entry: &Value) -> String {
    match entry.get("status") {
        Some(Value::String(status)) => status.clone(),
        Some(other) => other.to_string(),
        None => Value::Null.to_string(),
    }
}
