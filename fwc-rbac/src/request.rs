//! Access requests

use crate::decision::RouteContext;
use crate::identity::{Identity, RecordId};
use crate::models::{Action, Document, ResourceType};

/// One access check: who wants to do what, to which document, from where
#[derive(Debug, Clone)]
pub struct AccessRequest<'a> {
    pub resource: ResourceType,
    pub action: Action,
    pub identity: Option<&'a Identity>,
    pub instance: Option<&'a Document>,
    pub instance_id: Option<RecordId>,
    pub route: RouteContext,
}

impl<'a> AccessRequest<'a> {
    /// Anonymous request on the public surface
    pub fn new(resource: ResourceType, action: Action) -> Self {
        Self {
            resource,
            action,
            identity: None,
            instance: None,
            instance_id: None,
            route: RouteContext::public(),
        }
    }

    pub fn by(mut self, identity: &'a Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn by_optional(mut self, identity: Option<&'a Identity>) -> Self {
        self.identity = identity;
        self
    }

    /// Target a fetched document
    pub fn on(mut self, instance: &'a Document) -> Self {
        self.instance = Some(instance);
        self
    }

    /// Target a document known only by id
    pub fn on_id(mut self, id: impl Into<RecordId>) -> Self {
        self.instance_id = Some(id.into());
        self
    }

    pub fn via(mut self, route: RouteContext) -> Self {
        self.route = route;
        self
    }

    /// Id of the targeted document: the explicit id, else the document's own
    pub fn target_id(&self) -> Option<RecordId> {
        self.instance_id
            .clone()
            .or_else(|| self.instance.and_then(Document::id))
    }

    pub fn user_id(&self) -> Option<&RecordId> {
        self.identity.map(Identity::id)
    }
}
