use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::auth::Session;
use crate::error::{ApiError, ApiResult};
use crate::message::model::{ListMessagesQuery, Message, SendMessageRequest};
use crate::store::RecordStore;

#[derive(Clone)]
pub struct MessageService {
    store: Arc<dyn RecordStore>,
}

impl MessageService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn send_message(
        &self,
        session: &Session,
        request: SendMessageRequest,
    ) -> ApiResult<Message> {
        request.validate()?;

        if request.recipient_id == session.user_id {
            return Err(ApiError::ValidationError(
                "Cannot send a message to yourself".to_string(),
            ));
        }
        if self.store.get_user(request.recipient_id).await?.is_none() {
            return Err(ApiError::NotFound("Recipient not found".to_string()));
        }

        let message = Message::new(session.user_id, request.recipient_id, request.content);
        match self.store.insert_message(&message).await {
            Ok(message) => {
                tracing::debug!(message_id = %message.id, "Message sent");
                Ok(message)
            }
            Err(e) => {
                tracing::warn!(
                    sender_id = %session.user_id,
                    recipient_id = %message.recipient_id,
                    error = %e,
                    "Failed to send message"
                );
                Err(e)
            }
        }
    }

    /// Conversation history of the caller, oldest first. Messages an admin
    /// removed are left out.
    pub async fn list_messages(
        &self,
        session: &Session,
        query: ListMessagesQuery,
    ) -> ApiResult<Vec<Message>> {
        let messages = self.store.list_messages_for_user(session.user_id).await?;
        Ok(messages
            .into_iter()
            .filter(|m| !m.is_removed())
            .filter(|m| match query.with {
                Some(other) => m.involves(other),
                None => true,
            })
            .collect())
    }

    /// The recipient reports a message for admin review
    pub async fn flag_message(&self, session: &Session, message_id: Uuid) -> ApiResult<Message> {
        let message = self
            .store
            .get_message(message_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Message not found".to_string()))?;

        if message.recipient_id != session.user_id {
            return Err(ApiError::Forbidden(
                "Only the recipient can flag a message".to_string(),
            ));
        }
        if message.is_reviewed() {
            return Err(ApiError::Conflict(
                "Message has already been reviewed".to_string(),
            ));
        }

        let flagged = self
            .store
            .flag_message(message_id)
            .await?
            .ok_or_else(|| ApiError::Conflict("Message has already been reviewed".to_string()))?;

        tracing::info!(message_id = %flagged.id, flagged_by = %session.user_id, "Message flagged");
        Ok(flagged)
    }
}
