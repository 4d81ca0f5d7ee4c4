// Protocol client
//
// Wraps the codec and the one-shot transport with the controller's
// command set. Every operation runs encode -> call -> decode -> error
// check -> map; the error check is applied uniformly, so a non-zero
// `data.error` never reaches a caller as data.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::codec::{self, Data, Request, Response};
use crate::error::Error;
use crate::models::{ActionRecord, ActionValue, LocationRecord};
use crate::transport::{self, Endpoint};

/// Command names understood by the controller.
pub mod commands {
    pub const SYSTEM_INFO: &str = "systeminfo";
    pub const LIST_ACTIONS: &str = "listactions";
    pub const LIST_LOCATIONS: &str = "listlocations";
    pub const EXECUTE_ACTIONS: &str = "executeactions";
}

/// Client for a single controller endpoint.
///
/// Holds configuration only; each call opens and closes its own
/// connection. Replace the client (don't mutate it) when the endpoint
/// changes.
#[derive(Debug, Clone)]
pub struct NikoClient {
    endpoint: Endpoint,
}

impl NikoClient {
    pub fn new(endpoint: Endpoint) -> Self {
        Self { endpoint }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Free-form controller information (`systeminfo`).
    pub async fn system_info(&self) -> Result<Map<String, Value>, Error> {
        let response = self.send(&Request::new(commands::SYSTEM_INFO)).await?;
        match response.data {
            Data::Object(map) => Ok(map),
            Data::Empty => Ok(Map::new()),
            other => Err(unexpected_shape(commands::SYSTEM_INFO, "an object", &other)),
        }
    }

    /// All controllable actions (`listactions`).
    pub async fn list_actions(&self) -> Result<Vec<ActionRecord>, Error> {
        let response = self.send(&Request::new(commands::LIST_ACTIONS)).await?;
        let records: Vec<ActionRecord> = list_payload(commands::LIST_ACTIONS, response.data)?;
        debug!(count = records.len(), "listed actions");
        Ok(records)
    }

    /// All locations (`listlocations`), including the reserved id 0.
    pub async fn list_locations(&self) -> Result<Vec<LocationRecord>, Error> {
        let response = self.send(&Request::new(commands::LIST_LOCATIONS)).await?;
        let records: Vec<LocationRecord> = list_payload(commands::LIST_LOCATIONS, response.data)?;
        debug!(count = records.len(), "listed locations");
        Ok(records)
    }

    /// Set the primary value of one action.
    ///
    /// `{"cmd": "executeactions", "actions": [{"id", "value1"}]}`
    pub async fn execute_action(&self, id: i64, value: i64) -> Result<(), Error> {
        self.execute_actions(&[ActionValue::new(id, value)], Map::new())
            .await
    }

    /// Set the primary value of one action from a loosely typed value,
    /// merging `extra` pass-through fields into the top-level request.
    pub async fn execute_action_with(
        &self,
        id: i64,
        value: &Value,
        extra: Map<String, Value>,
    ) -> Result<(), Error> {
        let action = ActionValue::coerce(id, value)?;
        self.execute_actions(&[action], extra).await
    }

    /// Execute several actions in one request.
    pub async fn execute_actions(
        &self,
        actions: &[ActionValue],
        extra: Map<String, Value>,
    ) -> Result<(), Error> {
        if actions.is_empty() {
            return Err(Error::invalid_request("at least one action is required"));
        }
        if extra.contains_key("actions") {
            return Err(Error::invalid_request(
                "extra fields must not override 'actions'",
            ));
        }

        let actions = serde_json::to_value(actions)
            .map_err(|e| Error::invalid_request(format!("unserializable actions: {e}")))?;
        debug!(%actions, "executing actions");

        let request = Request::new(commands::EXECUTE_ACTIONS)
            .with_fields(extra)
            .with_field("actions", actions);
        self.send(&request).await?;
        Ok(())
    }

    /// Send an arbitrary command and return the decoded response.
    ///
    /// No domain mapping; controller error codes still surface as
    /// [`Error::Protocol`].
    pub async fn raw_command(
        &self,
        cmd: &str,
        fields: Map<String, Value>,
    ) -> Result<Response, Error> {
        self.send(&Request::new(cmd).with_fields(fields)).await
    }

    /// Send a pre-built request.
    pub async fn send(&self, request: &Request) -> Result<Response, Error> {
        let bytes = codec::encode(request)?;
        debug!(cmd = request.command(), endpoint = %self.endpoint, "sending command");

        let raw = transport::call(&self.endpoint, &bytes).await?;
        let response = codec::decode(&raw)?;
        check(request, response)
    }
}

/// Raise controller-reported errors. The command is taken from the
/// response echo, falling back to the request.
fn check(request: &Request, response: Response) -> Result<Response, Error> {
    if let Data::Error { code, message } = &response.data {
        let command = if response.cmd.is_empty() {
            request.command()
        } else {
            response.cmd.as_str()
        };
        warn!(code, command, "controller reported an error");
        return Err(Error::protocol(*code, command, message.clone()));
    }
    Ok(response)
}

fn list_payload<T: DeserializeOwned>(cmd: &str, data: Data) -> Result<Vec<T>, Error> {
    match data {
        Data::List(items) => items
            .into_iter()
            .map(|item| {
                serde_json::from_value(item).map_err(|e| Error::MalformedResponse {
                    message: format!("bad {cmd} entry: {e}"),
                    body: String::new(),
                })
            })
            .collect(),
        Data::Empty => Ok(Vec::new()),
        other => Err(unexpected_shape(cmd, "a list", &other)),
    }
}

fn unexpected_shape(cmd: &str, expected: &str, data: &Data) -> Error {
    Error::MalformedResponse {
        message: format!("{cmd} returned {} data, expected {expected}", kind(data)),
        body: data.to_value().to_string(),
    }
}

fn kind(data: &Data) -> &'static str {
    match data {
        Data::Empty => "empty",
        Data::Object(_) => "object",
        Data::List(_) => "list",
        Data::Error { .. } => "error",
        Data::Other(_) => "scalar",
    }
}
