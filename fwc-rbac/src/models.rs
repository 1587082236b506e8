//! Resource types, actions and documents

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::RbacError;
use crate::identity::RecordId;

/// Document-level operation subject to access control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Read, Action::Create, Action::Update, Action::Delete];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }

    /// True for actions that carry an incoming document
    pub fn is_write(self) -> bool {
        matches!(self, Action::Create | Action::Update)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! resource_types {
    ($($variant:ident => $slug:literal),+ $(,)?) => {
        /// Collection registered with the content system
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum ResourceType {
            $($variant),+
        }

        impl ResourceType {
            /// Every registered resource type
            pub const ALL: &'static [ResourceType] = &[$(ResourceType::$variant),+];

            /// Collection slug used in URLs and where-clauses
            pub fn slug(self) -> &'static str {
                match self {
                    $(ResourceType::$variant => $slug),+
                }
            }
        }
    };
}

resource_types! {
    Users => "users",
    Profiles => "profiles",
    Media => "media",
    Cohorts => "cohorts",
    Applications => "applications",
    Courses => "courses",
    Modules => "modules",
    Lessons => "lessons",
    JournalEntries => "journal-entries",
    Assignments => "assignments",
    AssignmentTypes => "assignment-types",
    Assessments => "assessments",
    Submissions => "submissions",
    Enrollments => "enrollments",
    EnrollmentRequests => "enrollment-requests",
    EnrollmentAttendance => "enrollment-attendance",
    Progress => "progress",
    SermonSeries => "sermon-series",
    SermonMedia => "sermons",
    Sermons => "sermons-content",
    Devotionals => "devotionals",
    BlogPosts => "blog-posts",
    Tags => "tags",
    Credentials => "credentials",
    PathwaysPhases => "pathways-phases",
    PathwaysPrograms => "pathways-programs",
    Mentors => "mentors",
    Instructors => "instructors",
    LearnerProfiles => "learner-profiles",
    WeeklyExperiences => "weekly-experiences",
    Announcements => "announcements",
    UserNotifications => "user-notifications",
    Resources => "resources",
    PrayerRequests => "prayer-requests",
    Events => "events",
    Sessions => "sessions",
    FormationPractices => "formation-practices",
    Households => "households",
    Ministries => "ministries",
    Donations => "donations",
    GivingCampaigns => "giving-campaigns",
    ApiKeys => "api-keys",
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ResourceType {
    type Err = RbacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceType::ALL
            .iter()
            .copied()
            .find(|resource| resource.slug() == s)
            .ok_or_else(|| RbacError::UnknownResource {
                slug: s.to_string(),
            })
    }
}

/// A stored or incoming document, kept as loosely typed JSON
///
/// Relation fields may hold a bare id, an expanded object with an `id`, or
/// an array of either; the accessors here normalise all of those shapes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Value);

impl Document {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Document id, if present
    pub fn id(&self) -> Option<RecordId> {
        self.0.get("id").and_then(scalar_id)
    }

    /// Raw field value
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|value| !value.is_null())
    }

    /// String value of a field, e.g. a select such as `visibility`
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    /// Names of the top-level fields present in the document
    pub fn field_names(&self) -> Vec<&str> {
        match &self.0 {
            Value::Object(map) => map.keys().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Normalised ids referenced by a relation field
    pub fn relation_ids(&self, name: &str) -> Vec<RecordId> {
        self.field(name).map(value_ids).unwrap_or_default()
    }

    /// True if the relation field references `id`
    pub fn references(&self, name: &str, id: &RecordId) -> bool {
        self.relation_ids(name).iter().any(|candidate| candidate == id)
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Id of a scalar or expanded single value
fn scalar_id(value: &Value) -> Option<RecordId> {
    match value {
        Value::String(s) => Some(RecordId::new(s.clone())),
        Value::Number(n) => Some(RecordId::new(n.to_string())),
        Value::Object(map) => map.get("id").and_then(scalar_id),
        _ => None,
    }
}

/// All ids carried by a field value; arrays contribute each element
pub(crate) fn value_ids(value: &Value) -> Vec<RecordId> {
    match value {
        Value::Array(items) => items.iter().filter_map(scalar_id).collect(),
        other => scalar_id(other).into_iter().collect(),
    }
}
