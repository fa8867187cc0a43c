use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream::Stream;
use tracing::{info, instrument, warn};

use crate::{auth::services::AuthUser, state::AppState};

/// GET /events: server-sent stream of the caller's changes.
#[instrument(skip(state))]
pub async fn stream_events(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut subscription = state.feed.subscribe(user_id);
    info!(%user_id, subscribers = state.feed.subscriber_count(), "change feed stream opened");

    let stream = async_stream::stream! {
        yield Ok(Event::default().event("connected").data(user_id.to_string()));

        while let Some(change) = subscription.recv().await {
            match Event::default().event(change.kind.as_str()).json_data(&change) {
                Ok(event) => yield Ok(event),
                Err(e) => warn!(error = %e, %user_id, "failed to encode change event"),
            }
        }
        info!(%user_id, "change feed stream closed");
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
