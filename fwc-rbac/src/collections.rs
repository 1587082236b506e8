//! Standard collection policies
//!
//! The access rules of every collection in the content system. Resource
//! types that declare nothing for an action fall back to requiring a
//! signed-in caller.

use crate::fields::{
    admin_only_field, editable_by_self_or_role, self_assigned_or_role, staff_only_field,
    FieldAccess, FieldPolicy,
};
use crate::models::ResourceType;
use crate::policies::{
    admin_only, allow_roles, instructors_only, lms_read, lms_write, mentors_only, nobody,
    public_read, self_or_role, signed_in, staff_only, visible, Owner, Policy, PolicyTable,
    ResourcePolicy,
};
use crate::roles::Role;
use crate::visibility::VisibilityRule;

const EDITORS: [Role; 4] = [Role::Admin, Role::Pastor, Role::Leader, Role::Staff];
const CURATORS: [Role; 3] = [Role::Admin, Role::Pastor, Role::Leader];
const AUTHORS: [Role; 4] = [Role::Admin, Role::Pastor, Role::Leader, Role::Instructor];

fn admins() -> Policy {
    allow_roles(&[Role::Admin])
}

fn leaders() -> Policy {
    Policy::RoleAtLeast(Role::Leader)
}

/// Course material readable by students, written by instructors
fn lms() -> ResourcePolicy {
    ResourcePolicy::new().read(lms_read()).write(lms_write())
}

/// Public content curated by leaders
fn leader_curated() -> ResourcePolicy {
    ResourcePolicy::new()
        .read(public_read())
        .create(leaders())
        .update(leaders())
        .delete(admin_only())
}

/// Public content edited by an explicit editor set
fn editorial(editors: &[Role]) -> ResourcePolicy {
    ResourcePolicy::new()
        .read(public_read())
        .create(allow_roles(editors))
        .update(allow_roles(editors))
        .delete(admins())
}

/// Public uploads any signed-in caller may add
fn uploads() -> ResourcePolicy {
    ResourcePolicy::new()
        .read(public_read())
        .create(signed_in())
        .update(signed_in())
        .delete(admins())
}

/// Public listings managed by staff
fn staff_managed() -> ResourcePolicy {
    ResourcePolicy::new()
        .read(public_read())
        .create(staff_only())
        .update(staff_only())
        .delete(admin_only())
}

/// Directory entries visible to signed-in callers and managed by leaders
fn directory() -> ResourcePolicy {
    ResourcePolicy::new()
        .read(signed_in())
        .create(leaders())
        .update(leaders())
        .delete(admin_only())
}

pub fn cohort_visibility() -> VisibilityRule {
    VisibilityRule::new("visibility", "public", Role::Leader)
        .role_tier("members", Role::Member)
        .user_member("mentors")
        .user_member("facilitators")
        .user_member("members")
}

pub fn prayer_request_visibility() -> VisibilityRule {
    VisibilityRule::new("visibility", "public", Role::Leader)
        .signed_in_tier("leaders")
        .signed_in_tier("prayer-team")
        .profile_member("profile")
}

pub fn journal_entry_visibility() -> VisibilityRule {
    VisibilityRule::new("visibility", "public", Role::Leader)
        .role_tier("mentor", Role::Mentor)
        .role_tier("cohort", Role::Mentor)
        .user_member("user")
}

fn users() -> ResourcePolicy {
    ResourcePolicy::new()
        .read(admin_only())
        .create(admin_only())
        .update(self_or_role(Role::Admin))
        .delete(admin_only())
        .owner(Owner::UserRecord)
        .field("roles", FieldAccess::both(admin_only_field()))
        .field("auth0Id", FieldAccess::both(admin_only_field()))
        .field("neonUserId", FieldAccess::both(admin_only_field()))
}

fn profiles() -> ResourcePolicy {
    let self_editable = FieldAccess::new().on_update(editable_by_self_or_role(Role::Staff));
    let staff = FieldAccess::both(staff_only_field());

    ResourcePolicy::new()
        .read(public_read())
        .create(signed_in())
        .update(self_or_role(Role::Staff))
        .delete(admin_only())
        .owner(Owner::ProfileRecord)
        .field("displayName", self_editable)
        .field("bio", self_editable)
        .field("testimony", self_editable)
        .field("social", self_editable)
        .field(
            "user",
            FieldAccess::new()
                .on_create(self_assigned_or_role(Role::Staff))
                .on_update(staff_only_field()),
        )
        .field("leadershipTrackStatus", staff)
        .field("leadershipNotes", staff)
        .field("leaderNotes", staff)
        .field("roles", FieldAccess::both(admin_only_field()))
}

fn journal_entries() -> ResourcePolicy {
    let mentor = FieldAccess::both(FieldPolicy::RoleAtLeast(Role::Mentor));

    ResourcePolicy::new()
        .read(visible())
        .create(signed_in())
        .update(signed_in())
        .delete(admins())
        .visibility(journal_entry_visibility())
        .field(
            "user",
            FieldAccess::new()
                .on_create(self_assigned_or_role(Role::Leader))
                .on_update(FieldPolicy::RoleAtLeast(Role::Leader)),
        )
        .field("feedback", mentor)
        .field("flagReason", FieldAccess::both(FieldPolicy::RoleAtLeast(Role::Leader)))
}

fn standard_table() -> PolicyTable {
    use ResourceType::*;

    PolicyTable::new()
        .with(Users, users())
        .with(Profiles, profiles())
        .with(Media, uploads())
        .with(
            Cohorts,
            ResourcePolicy::new()
                .read(visible())
                .create(allow_roles(&CURATORS))
                .update(allow_roles(&CURATORS))
                .delete(admins())
                .visibility(cohort_visibility()),
        )
        .with(
            Applications,
            ResourcePolicy::new()
                .read(staff_only())
                .create(public_read())
                .update(staff_only())
                .delete(staff_only()),
        )
        .with(Courses, lms())
        .with(Modules, lms())
        .with(Lessons, lms())
        .with(Assignments, lms())
        .with(AssignmentTypes, lms())
        .with(Enrollments, lms())
        .with(JournalEntries, journal_entries())
        .with(
            Assessments,
            ResourcePolicy::new()
                .read(lms_read())
                .create(allow_roles(&AUTHORS))
                .update(allow_roles(&AUTHORS))
                .delete(admins()),
        )
        .with(
            Submissions,
            ResourcePolicy::new()
                .read(self_or_role(Role::Instructor))
                .create(signed_in())
                .update(self_or_role(Role::Instructor))
                .delete(instructors_only())
                .owner(Owner::profile_field("profile")),
        )
        .with(
            EnrollmentRequests,
            ResourcePolicy::new()
                .read(self_or_role(Role::Leader))
                .create(signed_in())
                .update(leaders())
                .delete(admin_only())
                .owner(Owner::profile_field("profile")),
        )
        .with(
            EnrollmentAttendance,
            ResourcePolicy::new()
                .read(self_or_role(Role::Mentor))
                .create(mentors_only())
                .update(mentors_only())
                .delete(admin_only())
                .owner(Owner::profile_field("profile")),
        )
        .with(
            Progress,
            ResourcePolicy::new()
                .read(signed_in())
                .create(signed_in())
                .update(signed_in())
                .delete(admins()),
        )
        .with(SermonSeries, uploads())
        .with(SermonMedia, uploads())
        .with(Sermons, editorial(&EDITORS))
        .with(Devotionals, editorial(&EDITORS))
        .with(BlogPosts, editorial(&EDITORS))
        .with(Tags, editorial(&EDITORS))
        .with(Credentials, editorial(&CURATORS))
        .with(PathwaysPhases, leader_curated())
        .with(PathwaysPrograms, leader_curated())
        .with(WeeklyExperiences, leader_curated())
        .with(FormationPractices, leader_curated())
        .with(Mentors, directory())
        .with(Instructors, directory())
        .with(
            LearnerProfiles,
            ResourcePolicy::new().delete(leaders()),
        )
        .with(Announcements, staff_managed())
        .with(Events, staff_managed())
        .with(Resources, staff_managed())
        .with(
            UserNotifications,
            ResourcePolicy::new()
                .read(self_or_role(Role::Leader))
                .create(signed_in())
                .update(signed_in())
                .delete(admin_only())
                .owner(Owner::user_field("user")),
        )
        .with(
            PrayerRequests,
            ResourcePolicy::new()
                .read(visible())
                .create(signed_in())
                .update(self_or_role(Role::Leader))
                .delete(admin_only())
                .owner(Owner::profile_field("profile"))
                .visibility(prayer_request_visibility()),
        )
        .with(
            Sessions,
            ResourcePolicy::new()
                .read(public_read())
                .create(instructors_only())
                .update(instructors_only())
                .delete(admin_only()),
        )
        .with(Households, ResourcePolicy::new().read(public_read()))
        .with(Ministries, ResourcePolicy::new().read(public_read()))
        .with(
            Donations,
            ResourcePolicy::new().read(allow_roles(&[Role::Admin, Role::Pastor])),
        )
        .with(GivingCampaigns, ResourcePolicy::new())
        .with(
            ApiKeys,
            ResourcePolicy::new().read(nobody()).create(admins()).update(admins()).delete(admins()),
        )
}

impl PolicyTable {
    /// The standard collection policies
    pub fn standard() -> Self {
        standard_table()
    }
}
