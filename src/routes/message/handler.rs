use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};

use super::model::{MessageForm, SendMessageResponse};
use crate::AppState;
use crate::error::RelayError;

#[axum::debug_handler]
pub async fn send_message(
    State(state): State<AppState>,
    MessageForm(form): MessageForm,
) -> Result<impl IntoResponse, RelayError> {
    let has_image = form.image.is_some();
    let data = state.relay.relay(form).await?;
    tracing::debug!("sendMessage completed (image: {})", has_image);

    Ok((
        StatusCode::OK,
        Json(SendMessageResponse {
            message: "Message sent successfully!",
            data,
        }),
    ))
}
