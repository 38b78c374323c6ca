//! Admin moderation overlay over the in-memory stores

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use uuid::Uuid;

    use skillswap_server::auth::Session;
    use skillswap_server::error::ApiError;
    use skillswap_server::message::{MessageReviewStatus, MessageService, SendMessageRequest};
    use skillswap_server::models::User;
    use skillswap_server::moderation::{
        DecideVerificationRequest, ModerateRequest, ModerationAction, ModerationService,
        ResolveDisputeRequest, VerificationDecision,
    };
    use skillswap_server::review::{CreateReviewRequest, ReviewService, ReviewStatus};
    use skillswap_server::skill::{CreateSkillRequest, ExperienceLevel, Skill, SkillService};
    use skillswap_server::store::{InMemoryObjectStorage, InMemoryRecordStore, RecordStore};
    use skillswap_server::swap::{
        CreateSwapRequest, DisputeStatus, OpenDisputeRequest, SkillSwapRequest, SwapService,
        SwapStatus,
    };
    use skillswap_server::verification::{
        UploadedFile, VerificationService, VerificationStatus, VERIFICATION_BUCKET,
    };

    struct Harness {
        store: Arc<InMemoryRecordStore>,
        objects: Arc<InMemoryObjectStorage>,
        moderation: ModerationService,
        swaps: Arc<SwapService>,
        skills: SkillService,
        reviews: ReviewService,
        messages: MessageService,
        verification: VerificationService,
        admin: Session,
    }

    fn harness() -> Harness {
        let store = Arc::new(InMemoryRecordStore::new());
        let objects = Arc::new(InMemoryObjectStorage::new());
        let swaps = Arc::new(SwapService::new(store.clone()));

        Harness {
            moderation: ModerationService::new(store.clone(), swaps.clone()),
            skills: SkillService::new(store.clone()),
            reviews: ReviewService::new(store.clone()),
            messages: MessageService::new(store.clone()),
            verification: VerificationService::new(store.clone(), objects.clone()),
            admin: Session::admin(Uuid::new_v4()),
            swaps,
            store,
            objects,
        }
    }

    async fn register(h: &Harness, name: &str) -> Session {
        let user = User::new(
            Uuid::new_v4(),
            name.to_string(),
            format!("{}@example.com", name.to_lowercase()),
        );
        h.store.insert_user(&user).await.unwrap();
        Session::user(user.id)
    }

    async fn list_skill(h: &Harness, owner: &Session, name: &str) -> Skill {
        h.skills
            .create_skill(
                owner,
                CreateSkillRequest {
                    name: name.to_string(),
                    category: "General".to_string(),
                    description: String::new(),
                    experience_level: ExperienceLevel::Beginner,
                    tags: vec![],
                },
            )
            .await
            .unwrap()
    }

    /// B asks A for `requested`, offering `offered`, and A accepts
    async fn accepted_swap(
        h: &Harness,
        a: &Session,
        b: &Session,
        requested: &Skill,
        offered: &Skill,
    ) -> SkillSwapRequest {
        let request = h
            .swaps
            .create_request(
                b,
                CreateSwapRequest {
                    provider_id: a.user_id,
                    requested_skill_id: requested.id,
                    offered_skill_id: offered.id,
                    message: "Let's trade".to_string(),
                },
            )
            .await
            .unwrap();
        h.swaps
            .update_status(a, request.id, SwapStatus::Accepted)
            .await
            .unwrap()
    }

    fn moderate(action: ModerationAction) -> ModerateRequest {
        ModerateRequest {
            action,
            notes: Some("checked".to_string()),
        }
    }

    #[tokio::test]
    async fn test_verification_decisions() {
        let h = harness();
        let user = register(&h, "A").await;
        let documents = h
            .verification
            .submit_identity(
                &user,
                vec![
                    UploadedFile {
                        name: "passport.pdf".to_string(),
                        bytes: vec![1],
                    },
                    UploadedFile {
                        name: "utility-bill.pdf".to_string(),
                        bytes: vec![2],
                    },
                ],
            )
            .await
            .unwrap();

        let stats = h.moderation.dashboard(&h.admin).await.unwrap();
        assert_eq!(stats.pending_verifications, 2);

        let approved = h
            .moderation
            .decide_verification(
                &h.admin,
                documents[0].id,
                DecideVerificationRequest {
                    decision: VerificationDecision::Approve,
                    notes: Some("matches profile".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(approved.status, VerificationStatus::Approved);
        assert!(approved.reviewed_at.is_some());
        assert_eq!(approved.admin_notes.as_deref(), Some("matches profile"));

        let rejected = h
            .moderation
            .decide_verification(
                &h.admin,
                documents[1].id,
                DecideVerificationRequest {
                    decision: VerificationDecision::Reject,
                    notes: Some("blurry".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(rejected.status, VerificationStatus::Rejected);
        assert!(rejected.reviewed_at.is_some());

        let stats = h.moderation.dashboard(&h.admin).await.unwrap();
        assert_eq!(stats.pending_verifications, 0);
        assert!(h
            .moderation
            .pending_verifications(&h.admin)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_approved_evidence_survives_resubmission() {
        let h = harness();
        let user = register(&h, "A").await;
        let passport = |bytes: &[u8]| UploadedFile {
            name: "passport.pdf".to_string(),
            bytes: bytes.to_vec(),
        };

        let first = h
            .verification
            .submit_identity(&user, vec![passport(b"REAL")])
            .await
            .unwrap();
        h.moderation
            .decide_verification(
                &h.admin,
                first[0].id,
                DecideVerificationRequest {
                    decision: VerificationDecision::Approve,
                    notes: None,
                },
            )
            .await
            .unwrap();

        let second = h
            .verification
            .submit_identity(&user, vec![passport(b"FORGED")])
            .await
            .unwrap();

        assert_ne!(first[0].file_path, second[0].file_path);
        assert_eq!(
            h.objects.get(VERIFICATION_BUCKET, &first[0].file_path).await,
            Some(b"REAL".to_vec())
        );
        let approved = h
            .verification
            .document_status(&user, first[0].id)
            .await
            .unwrap();
        assert_eq!(approved.status, VerificationStatus::Approved);
        assert_eq!(approved.file_path, first[0].file_path);
    }

    #[tokio::test]
    async fn test_skill_approval_marks_skill_verified() {
        let h = harness();
        let user = register(&h, "A").await;
        let skill = list_skill(&h, &user, "Carpentry").await;
        let documents = h
            .verification
            .submit_skill(
                &user,
                skill.id,
                vec![UploadedFile {
                    name: "guild.pdf".to_string(),
                    bytes: vec![1],
                }],
            )
            .await
            .unwrap();

        let queue = h.moderation.pending_verifications(&h.admin).await.unwrap();
        assert_eq!(queue[0].skill_name.as_deref(), Some("Carpentry"));

        h.moderation
            .decide_verification(
                &h.admin,
                documents[0].id,
                DecideVerificationRequest {
                    decision: VerificationDecision::Approve,
                    notes: None,
                },
            )
            .await
            .unwrap();
        assert!(h.store.get_skill(skill.id).await.unwrap().unwrap().is_verified);
    }

    #[tokio::test]
    async fn test_message_review_approve_and_remove() {
        let h = harness();
        let a = register(&h, "A").await;
        let b = register(&h, "B").await;

        let mut sent = Vec::new();
        for content in ["first", "second"] {
            let message = h
                .messages
                .send_message(
                    &a,
                    SendMessageRequest {
                        recipient_id: b.user_id,
                        content: content.to_string(),
                    },
                )
                .await
                .unwrap();
            h.messages.flag_message(&b, message.id).await.unwrap();
            sent.push(message);
        }

        let queue = h.moderation.flagged_messages(&h.admin).await.unwrap();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue[0].sender.as_ref().unwrap().name, "A");
        assert_eq!(
            h.moderation.dashboard(&h.admin).await.unwrap().flagged_messages,
            2
        );

        let approved = h
            .moderation
            .review_message(&h.admin, sent[0].id, moderate(ModerationAction::Approve))
            .await
            .unwrap();
        assert!(!approved.is_flagged);
        assert_eq!(
            approved.admin_review.as_ref().unwrap().status,
            MessageReviewStatus::Reviewed
        );

        let removed = h
            .moderation
            .review_message(&h.admin, sent[1].id, moderate(ModerationAction::Remove))
            .await
            .unwrap();
        assert!(removed.is_flagged);
        assert_eq!(
            removed.admin_review.as_ref().unwrap().status,
            MessageReviewStatus::Reviewed
        );

        assert_eq!(
            h.moderation.dashboard(&h.admin).await.unwrap().flagged_messages,
            0
        );

        let err = h
            .moderation
            .review_message(&h.admin, sent[1].id, moderate(ModerationAction::Approve))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));

        let visible = h
            .messages
            .list_messages(&b, Default::default())
            .await
            .unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].content, "first");
    }

    #[tokio::test]
    async fn test_review_counter_matches_flagged_queue() {
        let h = harness();
        let a = register(&h, "A").await;
        let b = register(&h, "B").await;
        let web = list_skill(&h, &a, "Web Development").await;
        let marketing = list_skill(&h, &b, "Digital Marketing").await;
        accepted_swap(&h, &a, &b, &web, &marketing).await;

        let mut reviews = Vec::new();
        for rating in [1, 5] {
            reviews.push(
                h.reviews
                    .create_review(
                        &b,
                        CreateReviewRequest {
                            skill_id: web.id,
                            rating,
                            comment: "Review".to_string(),
                        },
                    )
                    .await
                    .unwrap(),
            );
        }

        // Unflagged reviews are not in the moderation queue
        assert_eq!(h.moderation.dashboard(&h.admin).await.unwrap().pending_reviews, 0);

        h.reviews.flag_review(&a, reviews[0].id).await.unwrap();
        let queue = h.moderation.flagged_reviews(&h.admin).await.unwrap();
        let stats = h.moderation.dashboard(&h.admin).await.unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(stats.pending_reviews, queue.len() as i64);
        assert_eq!(queue[0].skill_name.as_deref(), Some("Web Development"));

        let removed = h
            .moderation
            .moderate_review(&h.admin, reviews[0].id, moderate(ModerationAction::Remove))
            .await
            .unwrap();
        assert_eq!(removed.status, ReviewStatus::Removed);

        let visible = h.reviews.list_for_skill(web.id).await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, reviews[1].id);
    }

    #[tokio::test]
    async fn test_rating_bounds_rejected() {
        let h = harness();
        let a = register(&h, "A").await;
        let b = register(&h, "B").await;
        let web = list_skill(&h, &a, "Web Development").await;
        let marketing = list_skill(&h, &b, "Digital Marketing").await;
        accepted_swap(&h, &a, &b, &web, &marketing).await;

        for rating in [0, 6] {
            let err = h
                .reviews
                .create_review(
                    &b,
                    CreateReviewRequest {
                        skill_id: web.id,
                        rating,
                        comment: String::new(),
                    },
                )
                .await
                .unwrap_err();
            assert!(matches!(err, ApiError::ValidationError(_)));
        }
    }

    #[tokio::test]
    async fn test_dispute_queue_and_resolution() {
        let h = harness();
        let a = register(&h, "A").await;
        let b = register(&h, "B").await;
        let web = list_skill(&h, &a, "Web Development").await;
        let marketing = list_skill(&h, &b, "Digital Marketing").await;
        let request = accepted_swap(&h, &a, &b, &web, &marketing).await;

        h.swaps
            .open_dispute(
                &a,
                request.id,
                OpenDisputeRequest {
                    reason: "Sessions never happened".to_string(),
                },
            )
            .await
            .unwrap();

        let queue = h.moderation.active_disputes(&h.admin).await.unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].requester.as_ref().unwrap().name, "B");
        assert_eq!(queue[0].provider.as_ref().unwrap().name, "A");
        assert_eq!(queue[0].requested_skill_name.as_deref(), Some("Web Development"));
        assert_eq!(queue[0].offered_skill_name.as_deref(), Some("Digital Marketing"));
        assert_eq!(h.moderation.dashboard(&h.admin).await.unwrap().active_disputes, 1);

        let resolved = h
            .moderation
            .resolve_dispute(
                &h.admin,
                request.id,
                ResolveDisputeRequest {
                    resolution: "Swap cancelled".to_string(),
                    notes: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(resolved.dispute.unwrap().status, DisputeStatus::Resolved);
        assert!(h.moderation.active_disputes(&h.admin).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_promote_leaves_others_alone() {
        let h = harness();
        let a = register(&h, "A").await;
        let b = register(&h, "B").await;

        let err = h
            .moderation
            .promote_to_admin(&h.admin, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        for session in [&a, &b] {
            let user = h.store.get_user(session.user_id).await.unwrap().unwrap();
            assert!(!user.is_admin);
        }

        h.moderation.promote_to_admin(&h.admin, a.user_id).await.unwrap();
        assert!(h.store.get_user(a.user_id).await.unwrap().unwrap().is_admin);
        assert!(!h.store.get_user(b.user_id).await.unwrap().unwrap().is_admin);
    }

    #[tokio::test]
    async fn test_moderation_requires_admin() {
        let h = harness();
        let user = register(&h, "A").await;

        let err = h.moderation.dashboard(&user).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
        let err = h
            .moderation
            .pending_verifications(&user)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }
}
