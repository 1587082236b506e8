//! Decision engine behaviour against the standard collection table

use async_trait::async_trait;
use mockall::mock;
use serde_json::json;
use std::sync::Arc;

use fwc_rbac::{
    AccessDecision, AccessEngine, AccessRequest, Action, Document, Filter, Identity,
    PolicyTable, ProfileRecord, ProfileStore, ProfileStoreError, RbacConfig, RbacError, RecordId,
    ResourceType, Role, RouteContext, WriteDecision,
};

mock! {
    pub Profiles {}

    #[async_trait]
    impl ProfileStore for Profiles {
        async fn find_first_by_user(
            &self,
            user_id: &RecordId,
        ) -> Result<Option<ProfileRecord>, ProfileStoreError>;
        async fn find_by_id(&self, id: &RecordId) -> Result<Option<ProfileRecord>, ProfileStoreError>;
    }
}

fn engine(store: MockProfiles) -> AccessEngine {
    AccessEngine::new(
        Arc::new(PolicyTable::standard()),
        Arc::new(store),
        RbacConfig::default(),
    )
}

fn profile(id: i32, user: i32) -> ProfileRecord {
    ProfileRecord {
        id: id.into(),
        user: Some(user.into()),
    }
}

#[tokio::test]
async fn test_sufficient_role_skips_profile_lookup() {
    let mut store = MockProfiles::new();
    store.expect_find_first_by_user().never();
    let engine = engine(store);

    let pastor = Identity::new(3).with_role(Role::Pastor);
    let request = AccessRequest::new(ResourceType::Profiles, Action::Update)
        .by(&pastor)
        .on_id(999);

    assert_eq!(engine.decide(&request).await.unwrap(), AccessDecision::Allow);
}

#[tokio::test]
async fn test_owner_path_looks_up_profile_once() {
    let mut store = MockProfiles::new();
    store
        .expect_find_first_by_user()
        .withf(|user_id| user_id.as_str() == "3")
        .times(1)
        .returning(|_| Ok(Some(profile(40, 3))));
    let engine = engine(store);

    let member = Identity::new(3).with_role(Role::Member);
    let request = AccessRequest::new(ResourceType::Profiles, Action::Update)
        .by(&member)
        .on_id(40);

    assert_eq!(engine.decide(&request).await.unwrap(), AccessDecision::Allow);
}

#[tokio::test]
async fn test_profile_store_failure_rejects_filtered_allow() {
    let mut store = MockProfiles::new();
    store
        .expect_find_first_by_user()
        .returning(|_| Err(ProfileStoreError::new("connection reset")));
    let engine = engine(store);

    let student = Identity::new(5).with_role(Role::Student);
    let request = AccessRequest::new(ResourceType::Submissions, Action::Read).by(&student);

    let err = engine.decide(&request).await.unwrap_err();
    assert!(matches!(err, RbacError::ProfileResolution { ref user_id, .. } if user_id == "5"));
}

#[tokio::test]
async fn test_embedded_profile_builds_filter_without_lookup() {
    let mut store = MockProfiles::new();
    store.expect_find_first_by_user().never();
    let engine = engine(store);

    let learner = Identity::new(5).with_role(Role::Student).with_profile(77);
    let request = AccessRequest::new(ResourceType::EnrollmentRequests, Action::Read).by(&learner);

    let decision = engine.decide(&request).await.unwrap();
    assert_eq!(decision, AccessDecision::FilteredAllow(Filter::equals("profile", "77")));
    assert_eq!(
        serde_json::to_value(decision.filter().unwrap()).unwrap(),
        json!({"profile": {"equals": "77"}})
    );
}

#[tokio::test]
async fn test_private_cohort_membership_scenario() {
    let engine = engine(MockProfiles::new());
    let cohort = Document::new(json!({"id": 1, "visibility": "private", "members": [7]}));

    let member = Identity::new(7);
    let outsider = Identity::new(8);

    let request = AccessRequest::new(ResourceType::Cohorts, Action::Read)
        .by(&member)
        .on(&cohort);
    assert_eq!(engine.decide(&request).await.unwrap(), AccessDecision::Allow);

    let request = AccessRequest::new(ResourceType::Cohorts, Action::Read)
        .by(&outsider)
        .on(&cohort);
    assert_eq!(engine.decide(&request).await.unwrap(), AccessDecision::Deny);
}

#[tokio::test]
async fn test_public_cohort_visible_to_anonymous() {
    let engine = engine(MockProfiles::new());
    let cohort = Document::new(json!({"visibility": "public", "members": []}));

    assert!(engine
        .is_visible(None, ResourceType::Cohorts, &cohort)
        .await
        .unwrap());

    let request = AccessRequest::new(ResourceType::Cohorts, Action::Read).on(&cohort);
    assert_eq!(engine.decide(&request).await.unwrap(), AccessDecision::Allow);
}

#[tokio::test]
async fn test_prayer_request_query_filter() {
    let mut store = MockProfiles::new();
    store
        .expect_find_first_by_user()
        .times(1)
        .returning(|_| Ok(Some(profile(12, 4))));
    let engine = engine(store);

    let member = Identity::new(4).with_role(Role::Member);
    let decision = engine
        .visibility_filter(Some(&member), ResourceType::PrayerRequests)
        .await
        .unwrap();

    let filter = decision.filter().unwrap();
    assert!(filter.matches(&Document::new(json!({"visibility": "prayer-team"}))));
    assert!(filter.matches(&Document::new(json!({"visibility": "private", "profile": {"id": 12}}))));
    assert!(!filter.matches(&Document::new(json!({"visibility": "private", "profile": 13}))));
}

#[tokio::test]
async fn test_journal_entry_self_assignment() {
    let engine = engine(MockProfiles::new());
    let student = Identity::new(9).with_role(Role::Student);
    let request = AccessRequest::new(ResourceType::JournalEntries, Action::Create).by(&student);

    let own = Document::new(json!({"user": 9, "title": "Week one"}));
    assert_eq!(
        engine.authorize_write(&request, &own).await.unwrap(),
        WriteDecision::Allowed { filter: None }
    );

    let other = Document::new(json!({"user": 10, "title": "Week one", "flagReason": "x"}));
    assert_eq!(
        engine.authorize_write(&request, &other).await.unwrap(),
        WriteDecision::FieldsRejected(vec!["flagReason".to_string(), "user".to_string()])
    );

    let leader = Identity::new(2).with_role(Role::Leader);
    let request = AccessRequest::new(ResourceType::JournalEntries, Action::Create).by(&leader);
    assert!(engine.authorize_write(&request, &other).await.unwrap().is_allowed());
}

#[tokio::test]
async fn test_admin_route_allows_field_writes() {
    let engine = engine(MockProfiles::new());
    let viewer = Identity::new(1).with_role(Role::Viewer);
    let stored = Document::new(json!({"id": 1}));
    let request = AccessRequest::new(ResourceType::Users, Action::Update)
        .by(&viewer)
        .on(&stored)
        .via(RouteContext::admin());

    let data = Document::new(json!({"roles": ["admin"]}));
    assert!(engine.authorize_write(&request, &data).await.unwrap().is_allowed());

    let request = request.via(RouteContext::public());
    assert_eq!(
        engine.authorize_write(&request, &data).await.unwrap(),
        WriteDecision::FieldsRejected(vec!["roles".to_string()])
    );
}

#[tokio::test]
async fn test_admin_route_still_needs_a_caller_for_fields() {
    let engine = engine(MockProfiles::new());
    let stored = Document::new(json!({"id": 40, "bio": "old"}));
    let request = AccessRequest::new(ResourceType::Profiles, Action::Update)
        .on(&stored)
        .via(RouteContext::admin());

    assert_eq!(engine.decide(&request).await.unwrap(), AccessDecision::Allow);

    let data = Document::new(json!({"bio": "x", "roles": ["admin"]}));
    assert!(!engine.check_field(&request, "bio", &data).await.unwrap());
    assert!(!engine.check_field(&request, "roles", &data).await.unwrap());
    assert_eq!(
        engine.authorize_write(&request, &data).await.unwrap(),
        WriteDecision::FieldsRejected(vec!["bio".to_string(), "roles".to_string()])
    );
}

#[tokio::test]
async fn test_member_creates_own_linked_profile() {
    let engine = engine(MockProfiles::new());
    let member = Identity::new(4).with_role(Role::Member);
    let request = AccessRequest::new(ResourceType::Profiles, Action::Create).by(&member);

    let own = Document::new(json!({"displayName": "Ana", "user": 4}));
    assert_eq!(
        engine.authorize_write(&request, &own).await.unwrap(),
        WriteDecision::Allowed { filter: None }
    );

    let other = Document::new(json!({"displayName": "Ana", "user": 5}));
    assert_eq!(
        engine.authorize_write(&request, &other).await.unwrap(),
        WriteDecision::FieldsRejected(vec!["user".to_string()])
    );

    let stored = Document::new(json!({"id": 40, "user": 4}));
    let relink = AccessRequest::new(ResourceType::Profiles, Action::Update)
        .by(&member)
        .on(&stored);
    assert!(!engine.check_field(&relink, "user", &own).await.unwrap());
}

#[tokio::test]
async fn test_unproven_field_ownership_rejects_field() {
    let mut store = MockProfiles::new();
    store
        .expect_find_first_by_user()
        .returning(|_| Ok(Some(profile(40, 3))));
    let engine = engine(store);

    let member = Identity::new(3).with_role(Role::Member);
    let request = AccessRequest::new(ResourceType::Profiles, Action::Update).by(&member);
    let data = Document::new(json!({"bio": "new"}));

    assert_eq!(
        engine.decide(&request).await.unwrap(),
        AccessDecision::FilteredAllow(Filter::equals("id", "40"))
    );
    assert!(!engine.check_field(&request, "bio", &data).await.unwrap());
    assert_eq!(
        engine.authorize_write(&request, &data).await.unwrap(),
        WriteDecision::FieldsRejected(vec!["bio".to_string()])
    );

    let staff = Identity::new(2).with_role(Role::Staff);
    let request = AccessRequest::new(ResourceType::Profiles, Action::Update).by(&staff);
    assert!(engine.check_field(&request, "bio", &data).await.unwrap());
}

#[tokio::test]
async fn test_unknown_slug_is_programmer_error() {
    let table = PolicyTable::standard();
    let err = table.get_by_slug("hymnals").unwrap_err();
    assert!(err.is_programmer_error());
}
