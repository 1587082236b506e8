//! Visibility rules
//!
//! A visibility rule narrows which documents of a readable resource type a
//! caller may see, using data the role system does not hold: an audience
//! tier on the document and its membership relations.
//!
//! For a single document the rule runs a first-match-wins cascade:
//!
//! 1. the public tier is visible to everyone
//! 2. anonymous callers see nothing else
//! 3. audience tiers open to any signed-in caller, or to callers holding a
//!    minimum role
//! 4. callers at or above the oversight role see everything
//! 5. callers referenced by a membership relation see the document
//! 6. nothing else is visible
//!
//! [`VisibilityRule::read_filter`] builds the where-clause equivalent of the
//! same cascade for list queries.

use crate::decision::AccessDecision;
use crate::error::{RbacError, RbacResult};
use crate::filter::Filter;
use crate::identity::Identity;
use crate::models::Document;
use crate::predicates::has_role_at_least;
use crate::profile::{resolve_profile_id, ProfileStore};
use crate::roles::Role;

/// Cascade step that decided a document's visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityStep {
    Public,
    Anonymous,
    Audience,
    Oversight,
    Member,
    Hidden,
}

impl VisibilityStep {
    pub fn is_visible(self) -> bool {
        matches!(
            self,
            VisibilityStep::Public
                | VisibilityStep::Audience
                | VisibilityStep::Oversight
                | VisibilityStep::Member
        )
    }
}

/// Visibility rule of one resource type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityRule {
    tier_field: String,
    public_tier: String,
    signed_in_tiers: Vec<String>,
    role_tiers: Vec<(String, Role)>,
    oversight: Role,
    user_members: Vec<String>,
    profile_members: Vec<String>,
}

impl VisibilityRule {
    pub fn new(tier_field: impl Into<String>, public_tier: impl Into<String>, oversight: Role) -> Self {
        Self {
            tier_field: tier_field.into(),
            public_tier: public_tier.into(),
            signed_in_tiers: Vec::new(),
            role_tiers: Vec::new(),
            oversight,
            user_members: Vec::new(),
            profile_members: Vec::new(),
        }
    }

    /// Tier readable by any signed-in caller
    pub fn signed_in_tier(mut self, tier: impl Into<String>) -> Self {
        self.signed_in_tiers.push(tier.into());
        self
    }

    /// Tier readable by callers holding `minimum` or better
    pub fn role_tier(mut self, tier: impl Into<String>, minimum: Role) -> Self {
        self.role_tiers.push((tier.into(), minimum));
        self
    }

    /// Relation to users whose members may see the document
    pub fn user_member(mut self, field: impl Into<String>) -> Self {
        self.user_members.push(field.into());
        self
    }

    /// Relation to profiles whose members may see the document
    pub fn profile_member(mut self, field: impl Into<String>) -> Self {
        self.profile_members.push(field.into());
        self
    }

    pub fn tier_field(&self) -> &str {
        &self.tier_field
    }

    pub fn public_tier(&self) -> &str {
        &self.public_tier
    }

    pub fn oversight(&self) -> Role {
        self.oversight
    }

    /// Non-public tiers the caller may read through its audience
    fn open_tiers(&self, identity: &Identity) -> Vec<&str> {
        let signed_in = self.signed_in_tiers.iter().map(String::as_str);
        let by_role = self
            .role_tiers
            .iter()
            .filter(|(_, minimum)| has_role_at_least(identity, *minimum))
            .map(|(tier, _)| tier.as_str());
        signed_in.chain(by_role).collect()
    }

    /// Run the cascade for one document
    pub async fn evaluate(
        &self,
        identity: Option<&Identity>,
        doc: &Document,
        profiles: &dyn ProfileStore,
    ) -> RbacResult<VisibilityStep> {
        let tier = doc.str_field(&self.tier_field);
        if tier == Some(self.public_tier.as_str()) {
            return Ok(VisibilityStep::Public);
        }

        let Some(identity) = identity else {
            return Ok(VisibilityStep::Anonymous);
        };

        if let Some(tier) = tier {
            if self.open_tiers(identity).contains(&tier) {
                return Ok(VisibilityStep::Audience);
            }
        }

        if has_role_at_least(identity, self.oversight) {
            return Ok(VisibilityStep::Oversight);
        }

        if self
            .user_members
            .iter()
            .any(|field| doc.references(field, identity.id()))
        {
            return Ok(VisibilityStep::Member);
        }

        if !self.profile_members.is_empty() {
            if let Some(profile) = resolve_profile_id(identity, profiles).await? {
                if self
                    .profile_members
                    .iter()
                    .any(|field| doc.references(field, &profile))
                {
                    return Ok(VisibilityStep::Member);
                }
            }
        }

        Ok(VisibilityStep::Hidden)
    }

    /// Post-fetch predicate
    pub async fn is_visible(
        &self,
        identity: Option<&Identity>,
        doc: &Document,
        profiles: &dyn ProfileStore,
    ) -> RbacResult<bool> {
        let step = self.evaluate(identity, doc, profiles).await?;
        tracing::trace!(?step, "Visibility cascade");
        Ok(step.is_visible())
    }

    /// Query-time equivalent of [`VisibilityRule::is_visible`]
    pub async fn read_filter(
        &self,
        identity: Option<&Identity>,
        profiles: &dyn ProfileStore,
    ) -> RbacResult<AccessDecision> {
        let public = Filter::equals(self.tier_field.clone(), self.public_tier.clone());

        let Some(identity) = identity else {
            return Ok(AccessDecision::FilteredAllow(public));
        };

        if has_role_at_least(identity, self.oversight) {
            return Ok(AccessDecision::Allow);
        }

        let mut clauses = vec![public];

        let open = self.open_tiers(identity);
        if !open.is_empty() {
            clauses.push(Filter::one_of(self.tier_field.clone(), open));
        }

        for field in &self.user_members {
            clauses.push(Filter::references(field.clone(), identity.id()));
        }

        if !self.profile_members.is_empty() {
            if let Some(profile) = resolve_profile_id(identity, profiles).await? {
                for field in &self.profile_members {
                    clauses.push(Filter::references(field.clone(), &profile));
                }
            }
        }

        Ok(AccessDecision::FilteredAllow(Filter::any(clauses)))
    }

    /// Check the rule is internally consistent
    pub fn validate(&self) -> RbacResult<()> {
        if self.tier_field.is_empty() || self.public_tier.is_empty() {
            return Err(RbacError::invalid_config(
                "visibility rule needs a tier field and a public tier",
            ));
        }

        let audience = self
            .signed_in_tiers
            .iter()
            .chain(self.role_tiers.iter().map(|(tier, _)| tier));
        for tier in audience {
            if tier == &self.public_tier {
                return Err(RbacError::invalid_config(format!(
                    "tier '{tier}' is already public"
                )));
            }
        }

        Ok(())
    }
}
