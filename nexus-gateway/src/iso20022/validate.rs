//! `POST /v1/iso20022/validate?messageType=` — run C1 alone and return the
//! result, without persisting anything.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use nexus_core::types::MessageType;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct Params {
    #[serde(rename = "messageType")]
    pub message_type: Option<String>,
}

fn parse_message_type(name: &str) -> Option<MessageType> {
    [
        MessageType::Pacs008,
        MessageType::Pacs002,
        MessageType::Acmt023,
        MessageType::Acmt024,
        MessageType::Camt054,
        MessageType::Camt103,
        MessageType::Pain001,
        MessageType::Pacs004,
        MessageType::Pacs028,
        MessageType::Camt056,
        MessageType::Camt029,
    ]
    .into_iter()
    .find(|mt| mt.short_name() == name || mt.schema_id() == name)
}

/// `POST /v1/iso20022/validate?messageType=pacs.008`
pub async fn validate(State(state): State<AppState>, Query(params): Query<Params>, body: String) -> Response {
    let message_type = params.message_type.as_deref().and_then(parse_message_type);
    let result = state.schemas.validate(&body, message_type);
    Json(result).into_response()
}
