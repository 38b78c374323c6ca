//! Application state shared across handlers

use std::sync::Arc;

use crate::auth::SessionResolver;
use crate::message::MessageService;
use crate::moderation::ModerationService;
use crate::profile::ProfileService;
use crate::review::ReviewService;
use crate::skill::SkillService;
use crate::store::{ObjectStorage, RecordStore};
use crate::swap::SwapService;
use crate::verification::VerificationService;

use axum::extract::FromRef;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub session_resolver: Arc<SessionResolver>,
    pub profile_service: Arc<ProfileService>,
    pub skill_service: Arc<SkillService>,
    pub swap_service: Arc<SwapService>,
    pub review_service: Arc<ReviewService>,
    pub message_service: Arc<MessageService>,
    pub verification_service: Arc<VerificationService>,
    pub moderation_service: Arc<ModerationService>,
}

impl AppState {
    /// Wire every service onto one record store and one object store
    pub fn new(
        store: Arc<dyn RecordStore>,
        objects: Arc<dyn ObjectStorage>,
        jwt_secret: String,
    ) -> Self {
        let swap_service = Arc::new(SwapService::new(store.clone()));

        Self {
            session_resolver: Arc::new(SessionResolver::new(jwt_secret, store.clone())),
            profile_service: Arc::new(ProfileService::new(store.clone())),
            skill_service: Arc::new(SkillService::new(store.clone())),
            review_service: Arc::new(ReviewService::new(store.clone())),
            message_service: Arc::new(MessageService::new(store.clone())),
            verification_service: Arc::new(VerificationService::new(store.clone(), objects)),
            moderation_service: Arc::new(ModerationService::new(
                store.clone(),
                swap_service.clone(),
            )),
            swap_service,
            store,
        }
    }
}

impl FromRef<AppState> for Arc<dyn RecordStore> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.store.clone()
    }
}

impl FromRef<AppState> for Arc<SessionResolver> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.session_resolver.clone()
    }
}

impl FromRef<AppState> for Arc<ProfileService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.profile_service.clone()
    }
}

impl FromRef<AppState> for Arc<SkillService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.skill_service.clone()
    }
}

impl FromRef<AppState> for Arc<SwapService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.swap_service.clone()
    }
}

impl FromRef<AppState> for Arc<ReviewService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.review_service.clone()
    }
}

impl FromRef<AppState> for Arc<MessageService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.message_service.clone()
    }
}

impl FromRef<AppState> for Arc<VerificationService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.verification_service.clone()
    }
}

impl FromRef<AppState> for Arc<ModerationService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.moderation_service.clone()
    }
}
