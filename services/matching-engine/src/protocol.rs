//! JSON line protocol for the gateway boundary
//!
//! One request per line in, one response per line out. Decoding failures
//! become `INVALID_ORDER` responses; nothing a caller sends can take the
//! engine down.

use serde::{Deserialize, Serialize};
use serde_json::json;
use types::errors::EngineError;

use crate::book::BookSnapshot;
use crate::engine::{
    AddOrderRequest, AddOrderResponse, CancelOrderRequest, CancelOrderResponse, MatchingEngine,
    ModifyOrderRequest,
};

/// A decoded request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Add(AddOrderRequest),
    Cancel(CancelOrderRequest),
    Modify(ModifyOrderRequest),
    Status { instrument: String },
}

/// Successful result payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reply {
    Added(AddOrderResponse),
    Cancelled(CancelOrderResponse),
    Modified(AddOrderResponse),
    Status(BookSnapshot),
}

/// Error payload, mirroring the gateway's `{ error, message }` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl From<&EngineError> for ErrorBody {
    fn from(err: &EngineError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

/// One response line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Reply>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl Response {
    pub fn success(reply: Reply) -> Self {
        Self {
            ok: true,
            result: Some(reply),
            error: None,
        }
    }

    pub fn failure(err: &EngineError) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(err.into()),
        }
    }

    /// Encode as a single JSON line (without the trailing newline)
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|err| {
            json!({
                "ok": false,
                "error": { "code": "INTERNAL", "message": err.to_string() }
            })
            .to_string()
        })
    }
}

/// Run one decoded request against the engine
pub fn dispatch(engine: &MatchingEngine, request: Request) -> Response {
    let result = match request {
        Request::Add(add) => engine.add_order(add).map(Reply::Added),
        Request::Cancel(cancel) => engine.cancel_order(cancel).map(Reply::Cancelled),
        Request::Modify(modify) => engine.modify_order(modify).map(Reply::Modified),
        Request::Status { instrument } => Ok(Reply::Status(engine.get_status(&instrument))),
    };

    match result {
        Ok(reply) => Response::success(reply),
        Err(err) => Response::failure(&err),
    }
}

/// Decode a request line, dispatch it and encode the response
pub fn handle_line(engine: &MatchingEngine, line: &str) -> String {
    let response = match serde_json::from_str::<Request>(line) {
        Ok(request) => dispatch(engine, request),
        Err(err) => Response::failure(&EngineError::InvalidOrder(format!("malformed request: {err}"))),
    };
    response.to_json_line()
}
