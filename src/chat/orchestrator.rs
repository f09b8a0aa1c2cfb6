//! Submit orchestration
//!
//! One submission at a time: the user message is appended optimistically,
//! the in-flight flag blocks overlapping submits, and the single backend
//! call settles into exactly one of three outcomes, each appended as a
//! system message. The flag is cleared on every path, including transport
//! failure, so the user can always submit again.

use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::chat::client::GenerationClient;
use crate::chat::conversation::{
    presentation_ready, Conversation, Message, REPLY_DECLINED, REPLY_TRY_AGAIN,
};

/// How a submission settled. `Rejected` means nothing was appended and no
/// request was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Rejected,
    Success,
    SoftFailure,
    HardFailure,
}

/// Submit a topic to the generation backend on behalf of the conversation.
///
/// A blank topic, a missing token, or an outstanding submission makes this a
/// no-op; the caller is responsible for having obtained a usable access
/// token from the session layer first.
pub async fn submit(
    conversation: &Mutex<Conversation>,
    backend: &GenerationClient,
    topic: &str,
    access_token: &str,
) -> SubmitOutcome {
    let topic = topic.trim();
    if topic.is_empty() || access_token.is_empty() {
        return SubmitOutcome::Rejected;
    }

    {
        let mut convo = conversation.lock().await;
        if convo.is_in_flight() {
            warn!("submission refused: another request is in flight");
            return SubmitOutcome::Rejected;
        }
        convo.set_in_flight(true);
        convo.append(Message::user(topic));
    }

    info!(topic, "forwarding generation request");
    let result = backend.generate(topic, access_token).await;

    // Lock re-acquired after the await so the conversation stays readable
    // while the backend works.
    let mut convo = conversation.lock().await;
    convo.set_in_flight(false);

    match result {
        Ok(response) => {
            let link = if response.success { response.url } else { None };
            match link {
                Some(url) => {
                    info!(%url, "generation succeeded");
                    convo.append(Message::system(presentation_ready(&url)));
                    SubmitOutcome::Success
                }
                None => {
                    warn!("backend declined the generation request");
                    convo.append(Message::system(REPLY_DECLINED));
                    SubmitOutcome::SoftFailure
                }
            }
        }
        Err(e) => {
            error!("generation request failed: {e}");
            convo.append(Message::system(REPLY_TRY_AGAIN));
            SubmitOutcome::HardFailure
        }
    }
}
