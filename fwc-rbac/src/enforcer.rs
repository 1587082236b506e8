//! Access decision engine
//!
//! [`AccessEngine`] is the single point every document-level check flows
//! through. Evaluation order for one request:
//!
//! 1. the admin-route override allows unconditionally
//! 2. constant policies answer without looking at the caller
//! 3. visibility policies delegate to the resource's [`VisibilityRule`]
//! 4. anonymous callers are denied
//! 5. role, membership and ownership policies run against the identity
//!
//! Ownership checks may need the caller's profile id, which can cost one
//! lookup against the [`ProfileStore`]. A failed lookup is an error, never a
//! denial.
//!
//! [`VisibilityRule`]: crate::visibility::VisibilityRule

use std::sync::Arc;

use crate::config::RbacConfig;
use crate::decision::{AccessDecision, RouteContext, WriteDecision};
use crate::error::{RbacError, RbacResult};
use crate::fields::FieldPolicy;
use crate::filter::Filter;
use crate::identity::{Identity, RecordId};
use crate::models::{Action, Document, ResourceType};
use crate::policies::{Owner, Policy, PolicyTable, ResourcePolicy};
use crate::predicates::{has_any_role, has_role_at_least, holds_role_at_least};
use crate::profile::{resolve_profile_id, ProfileStore};
use crate::request::AccessRequest;

/// Access decision engine
#[derive(Clone)]
pub struct AccessEngine {
    table: Arc<PolicyTable>,
    profiles: Arc<dyn ProfileStore>,
    config: RbacConfig,
}

impl AccessEngine {
    /// Create a new engine over a policy table and profile store
    pub fn new(table: Arc<PolicyTable>, profiles: Arc<dyn ProfileStore>, config: RbacConfig) -> Self {
        Self {
            table,
            profiles,
            config,
        }
    }

    pub fn table(&self) -> &PolicyTable {
        &self.table
    }

    pub fn profiles(&self) -> &dyn ProfileStore {
        self.profiles.as_ref()
    }

    pub fn config(&self) -> &RbacConfig {
        &self.config
    }

    /// Classify an inbound request path
    pub fn route_for(&self, path: &str) -> RouteContext {
        self.config.route_for(path)
    }

    /// Decide a document-level request
    pub async fn decide(&self, request: &AccessRequest<'_>) -> RbacResult<AccessDecision> {
        let policy = self.table.get(request.resource)?;
        let decision = self.evaluate(request, policy).await?;
        self.record(request, &decision);
        Ok(decision)
    }

    /// Resolve the caller's profile id, embedded or looked up
    pub async fn resolve_profile(&self, identity: &Identity) -> RbacResult<Option<RecordId>> {
        resolve_profile_id(identity, self.profiles.as_ref()).await
    }

    /// Post-fetch visibility of one document
    pub async fn is_visible(
        &self,
        identity: Option<&Identity>,
        resource: ResourceType,
        doc: &Document,
    ) -> RbacResult<bool> {
        let rule = self
            .table
            .get(resource)?
            .visibility_rule()
            .ok_or_else(|| no_visibility_rule(resource))?;
        rule.is_visible(identity, doc, self.profiles.as_ref()).await
    }

    /// Query-time visibility filter for list reads
    pub async fn visibility_filter(
        &self,
        identity: Option<&Identity>,
        resource: ResourceType,
    ) -> RbacResult<AccessDecision> {
        let rule = self
            .table
            .get(resource)?
            .visibility_rule()
            .ok_or_else(|| no_visibility_rule(resource))?;
        rule.read_filter(identity, self.profiles.as_ref()).await
    }

    /// Keep only the fetched documents the caller may read
    pub async fn retain_readable(
        &self,
        identity: Option<&Identity>,
        resource: ResourceType,
        route: RouteContext,
        docs: Vec<Document>,
    ) -> RbacResult<Vec<Document>> {
        let request = AccessRequest::new(resource, Action::Read)
            .by_optional(identity)
            .via(route);
        let decision = self.decide(&request).await?;
        Ok(docs.into_iter().filter(|doc| decision.permits(doc)).collect())
    }

    /// Per-field hook for a create or update
    ///
    /// `data` is the incoming document; `request.instance` is the stored
    /// document for updates. Ownership must be provable from those two.
    pub async fn check_field(
        &self,
        request: &AccessRequest<'_>,
        field: &str,
        data: &Document,
    ) -> RbacResult<bool> {
        let resource_policy = self.table.get(request.resource)?;
        let Some(access) = resource_policy.field_rules().get(field) else {
            return Ok(true);
        };
        let policy = match request.action {
            Action::Create => access.create,
            Action::Update => access.update,
            Action::Read | Action::Delete => None,
        };
        let Some(policy) = policy else {
            return Ok(true);
        };

        let Some(identity) = request.identity else {
            return Ok(false);
        };
        if request.route.is_admin() {
            return Ok(true);
        }
        if has_role_at_least(identity, policy.minimum()) {
            return Ok(true);
        }

        match policy {
            FieldPolicy::RoleAtLeast(_) => Ok(false),
            FieldPolicy::SelfAssignedOrRole(_) => Ok(data.references(field, identity.id())),
            FieldPolicy::SelfOrRole(_) => {
                let owner = owner_of(request.resource, resource_policy)?;
                let target = match request.action {
                    Action::Create => AccessRequest { instance: Some(data), ..request.clone() },
                    _ => request.clone(),
                };
                let decision = self.ownership(&target, identity, owner).await?;
                Ok(matches!(decision, AccessDecision::Allow))
            }
        }
    }

    /// Authorize a create or update together with its incoming data
    ///
    /// A document-level deny is final. Otherwise every field the data
    /// touches is checked; if any is forbidden the whole write is rejected.
    pub async fn authorize_write(
        &self,
        request: &AccessRequest<'_>,
        data: &Document,
    ) -> RbacResult<WriteDecision> {
        if !request.action.is_write() {
            return Err(RbacError::internal(format!(
                "{} is not a write action",
                request.action
            )));
        }

        let filter = match self.decide(request).await? {
            AccessDecision::Deny => return Ok(WriteDecision::Deny),
            AccessDecision::Allow => None,
            AccessDecision::FilteredAllow(filter) => Some(filter),
        };

        let mut rejected = Vec::new();
        for field in data.field_names() {
            if !self.check_field(request, field, data).await? {
                rejected.push(field.to_string());
            }
        }

        if rejected.is_empty() {
            Ok(WriteDecision::Allowed { filter })
        } else {
            rejected.sort();
            tracing::debug!(
                resource = %request.resource,
                action = %request.action,
                fields = ?rejected,
                "Write rejected by field rules"
            );
            Ok(WriteDecision::FieldsRejected(rejected))
        }
    }

    async fn evaluate(
        &self,
        request: &AccessRequest<'_>,
        resource_policy: &ResourcePolicy,
    ) -> RbacResult<AccessDecision> {
        if request.route.is_admin() {
            tracing::debug!(
                resource = %request.resource,
                action = %request.action,
                "Admin route override"
            );
            return Ok(AccessDecision::Allow);
        }

        match resource_policy.policy_for(request.action) {
            Policy::Constant(allowed) => Ok(AccessDecision::from_bool(*allowed)),
            Policy::Visibility => self.visibility_decision(request, resource_policy).await,
            Policy::SignedIn => Ok(AccessDecision::from_bool(request.identity.is_some())),
            Policy::RoleAtLeast(minimum) => Ok(AccessDecision::from_bool(holds_role_at_least(
                request.identity,
                *minimum,
            ))),
            Policy::AnyRole(roles) => Ok(AccessDecision::from_bool(
                request
                    .identity
                    .is_some_and(|identity| has_any_role(identity, roles)),
            )),
            Policy::OwnerOnly => match request.identity {
                None => Ok(AccessDecision::Deny),
                Some(identity) => {
                    let owner = owner_of(request.resource, resource_policy)?;
                    self.ownership(request, identity, owner).await
                }
            },
            Policy::SelfOrRole(minimum) => match request.identity {
                None => Ok(AccessDecision::Deny),
                Some(identity) if has_role_at_least(identity, *minimum) => Ok(AccessDecision::Allow),
                Some(identity) => {
                    let owner = owner_of(request.resource, resource_policy)?;
                    self.ownership(request, identity, owner).await
                }
            },
        }
    }

    async fn visibility_decision(
        &self,
        request: &AccessRequest<'_>,
        resource_policy: &ResourcePolicy,
    ) -> RbacResult<AccessDecision> {
        let rule = resource_policy
            .visibility_rule()
            .ok_or_else(|| no_visibility_rule(request.resource))?;

        match request.instance {
            Some(doc) => {
                let visible = rule
                    .is_visible(request.identity, doc, self.profiles.as_ref())
                    .await?;
                Ok(AccessDecision::from_bool(visible))
            }
            None => rule.read_filter(request.identity, self.profiles.as_ref()).await,
        }
    }

    /// Compare the target against the caller's user or profile id
    async fn ownership(
        &self,
        request: &AccessRequest<'_>,
        identity: &Identity,
        owner: &Owner,
    ) -> RbacResult<AccessDecision> {
        let subject = if owner.needs_profile() {
            match self.resolve_profile(identity).await? {
                Some(profile) => profile,
                None => {
                    tracing::debug!(user_id = %identity.id(), "No profile for ownership check");
                    return Ok(AccessDecision::Deny);
                }
            }
        } else {
            identity.id().clone()
        };

        let decision = match owner {
            Owner::UserRecord | Owner::ProfileRecord => match request.target_id() {
                Some(target) => AccessDecision::from_bool(target == subject),
                None => AccessDecision::FilteredAllow(Filter::references("id", &subject)),
            },
            Owner::UserField(field) | Owner::ProfileField(field) => match request.instance {
                Some(doc) => AccessDecision::from_bool(doc.references(field, &subject)),
                None => AccessDecision::FilteredAllow(Filter::references(field.clone(), &subject)),
            },
        };
        Ok(decision)
    }

    fn record(&self, request: &AccessRequest<'_>, decision: &AccessDecision) {
        let user_id = request.user_id().map(RecordId::as_str).unwrap_or("anonymous");
        if self.config.enable_audit_logging {
            tracing::info!(
                target: "fwc_rbac::audit",
                resource = %request.resource,
                action = %request.action,
                user_id,
                decision = decision.label(),
                "Access decision"
            );
        } else {
            tracing::debug!(
                resource = %request.resource,
                action = %request.action,
                user_id,
                decision = decision.label(),
                "Access decision"
            );
        }
    }
}

fn owner_of(resource: ResourceType, policy: &ResourcePolicy) -> RbacResult<&Owner> {
    policy
        .owner_rule()
        .ok_or_else(|| RbacError::invalid_config(format!("{resource} declares no owner")))
}

fn no_visibility_rule(resource: ResourceType) -> RbacError {
    RbacError::invalid_config(format!("{resource} declares no visibility rule"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{editable_by_self_or_role, staff_only_field, FieldAccess};
    use crate::policies::{admin_only, allow_roles, public_read, self_or_role, signed_in};
    use crate::profile::testing::MemoryProfileStore;
    use crate::roles::Role;
    use serde_json::json;

    fn engine_with(table: PolicyTable, store: Arc<MemoryProfileStore>) -> AccessEngine {
        AccessEngine::new(Arc::new(table), store, RbacConfig::default())
    }

    fn profiles_table() -> PolicyTable {
        PolicyTable::new().with(
            ResourceType::Profiles,
            ResourcePolicy::new()
                .read(public_read())
                .create(signed_in())
                .update(self_or_role(Role::Staff))
                .delete(admin_only())
                .owner(Owner::ProfileRecord)
                .field("bio", FieldAccess::both(editable_by_self_or_role(Role::Staff)))
                .field("leaderNotes", FieldAccess::both(staff_only_field())),
        )
    }

    #[tokio::test]
    async fn test_admin_route_overrides_deny() {
        let store = Arc::new(MemoryProfileStore::default());
        let table = PolicyTable::new().with(
            ResourceType::ApiKeys,
            ResourcePolicy::new().write(Policy::Constant(false)),
        );
        let engine = engine_with(table, store);

        let request = AccessRequest::new(ResourceType::ApiKeys, Action::Delete);
        assert_eq!(engine.decide(&request).await.unwrap(), AccessDecision::Deny);

        let request = request.via(RouteContext::admin());
        assert_eq!(engine.decide(&request).await.unwrap(), AccessDecision::Allow);
    }

    #[tokio::test]
    async fn test_anonymous_only_passes_public_read() {
        let store = Arc::new(MemoryProfileStore::default());
        let engine = engine_with(profiles_table(), store);

        let read = AccessRequest::new(ResourceType::Profiles, Action::Read);
        assert_eq!(engine.decide(&read).await.unwrap(), AccessDecision::Allow);

        for action in [Action::Create, Action::Update, Action::Delete] {
            let request = AccessRequest::new(ResourceType::Profiles, action).on_id(1);
            assert_eq!(engine.decide(&request).await.unwrap(), AccessDecision::Deny);
        }
    }

    #[tokio::test]
    async fn test_self_or_role_checks_role_first() {
        let store = Arc::new(MemoryProfileStore::with(vec![(50, 1)]));
        let engine = engine_with(profiles_table(), store.clone());

        let staff = Identity::new(1).with_role(Role::Staff);
        let request = AccessRequest::new(ResourceType::Profiles, Action::Update)
            .by(&staff)
            .on_id(99);
        assert_eq!(engine.decide(&request).await.unwrap(), AccessDecision::Allow);
        assert_eq!(store.lookups(), 0);

        let member = Identity::new(1).with_role(Role::Member);
        let own = AccessRequest::new(ResourceType::Profiles, Action::Update)
            .by(&member)
            .on_id(50);
        assert_eq!(engine.decide(&own).await.unwrap(), AccessDecision::Allow);
        let other = AccessRequest::new(ResourceType::Profiles, Action::Update)
            .by(&member)
            .on_id(51);
        assert_eq!(engine.decide(&other).await.unwrap(), AccessDecision::Deny);
        assert_eq!(store.lookups(), 2);
    }

    #[tokio::test]
    async fn test_missing_profile_denies_and_failure_errors() {
        let table = profiles_table();
        let engine = engine_with(table.clone(), Arc::new(MemoryProfileStore::default()));
        let caller = Identity::new(1);
        let request = AccessRequest::new(ResourceType::Profiles, Action::Update)
            .by(&caller)
            .on_id(50);
        assert_eq!(engine.decide(&request).await.unwrap(), AccessDecision::Deny);

        let engine = engine_with(table, Arc::new(MemoryProfileStore::failing()));
        let err = engine.decide(&request).await.unwrap_err();
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn test_owner_filter_without_instance() {
        let table = PolicyTable::new().with(
            ResourceType::Submissions,
            ResourcePolicy::new()
                .read(self_or_role(Role::Instructor))
                .owner(Owner::profile_field("profile")),
        );
        let engine = engine_with(table, Arc::new(MemoryProfileStore::with(vec![(8, 3)])));

        let student = Identity::new(3).with_role(Role::Student);
        let request = AccessRequest::new(ResourceType::Submissions, Action::Read).by(&student);
        assert_eq!(
            engine.decide(&request).await.unwrap(),
            AccessDecision::FilteredAllow(Filter::equals("profile", "8"))
        );

        let docs = vec![
            Document::new(json!({"id": 1, "profile": 8})),
            Document::new(json!({"id": 2, "profile": {"id": 9}})),
        ];
        let visible = engine
            .retain_readable(Some(&student), ResourceType::Submissions, RouteContext::public(), docs)
            .await
            .unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id(), Some(RecordId::from(1)));
    }

    #[tokio::test]
    async fn test_any_role_is_exact_membership() {
        let table = PolicyTable::new().with(
            ResourceType::Tags,
            ResourcePolicy::new().create(allow_roles(&[Role::Admin, Role::Staff])),
        );
        let engine = engine_with(table, Arc::new(MemoryProfileStore::default()));

        let pastor = Identity::new(1).with_role(Role::Pastor);
        let staff = Identity::new(2).with_role(Role::Staff);
        let pastor_request = AccessRequest::new(ResourceType::Tags, Action::Create).by(&pastor);
        let staff_request = AccessRequest::new(ResourceType::Tags, Action::Create).by(&staff);
        assert!(engine.decide(&pastor_request).await.unwrap().is_denied());
        assert!(engine.decide(&staff_request).await.unwrap().is_allowed());
    }

    #[tokio::test]
    async fn test_unregistered_resource() {
        let engine = engine_with(PolicyTable::new(), Arc::new(MemoryProfileStore::default()));
        let request = AccessRequest::new(ResourceType::Events, Action::Read);
        let err = engine.decide(&request).await.unwrap_err();
        assert!(matches!(err, RbacError::UnknownResource { .. }));
    }

    #[tokio::test]
    async fn test_write_rejects_whole_request_on_forbidden_field() {
        let engine = engine_with(profiles_table(), Arc::new(MemoryProfileStore::with(vec![(50, 1)])));
        let member = Identity::new(1).with_role(Role::Member);
        let stored = Document::new(json!({"id": 50, "bio": "old"}));
        let request = AccessRequest::new(ResourceType::Profiles, Action::Update)
            .by(&member)
            .on(&stored);

        let ok = Document::new(json!({"bio": "new"}));
        assert_eq!(
            engine.authorize_write(&request, &ok).await.unwrap(),
            WriteDecision::Allowed { filter: None }
        );

        let mixed = Document::new(json!({"bio": "new", "leaderNotes": "x"}));
        assert_eq!(
            engine.authorize_write(&request, &mixed).await.unwrap(),
            WriteDecision::FieldsRejected(vec!["leaderNotes".to_string()])
        );
    }

    #[tokio::test]
    async fn test_document_deny_is_final() {
        let engine = engine_with(profiles_table(), Arc::new(MemoryProfileStore::with(vec![(50, 1)])));
        let member = Identity::new(1).with_role(Role::Member);
        let stored = Document::new(json!({"id": 51}));
        let request = AccessRequest::new(ResourceType::Profiles, Action::Update)
            .by(&member)
            .on(&stored);
        let data = Document::new(json!({"displayName": "Not mine"}));
        assert_eq!(
            engine.authorize_write(&request, &data).await.unwrap(),
            WriteDecision::Deny
        );
    }

    #[tokio::test]
    async fn test_authorize_write_rejects_read() {
        let engine = engine_with(profiles_table(), Arc::new(MemoryProfileStore::default()));
        let request = AccessRequest::new(ResourceType::Profiles, Action::Read);
        let err = engine
            .authorize_write(&request, &Document::new(json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, RbacError::Internal { .. }));
    }
}
