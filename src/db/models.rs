use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Handle for role and enrolment lookups scoped to one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub(crate) struct CourseContext {
    pub(crate) context_id: String,
    pub(crate) course_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub(crate) struct PlatformUser {
    pub(crate) id: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) email: String,
}

impl PlatformUser {
    pub(crate) fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub(crate) struct Role {
    pub(crate) id: String,
    pub(crate) short_name: String,
    pub(crate) name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub(crate) struct GroupMembership {
    pub(crate) group_id: String,
    pub(crate) user_id: String,
    pub(crate) group_name: String,
    pub(crate) course_short_name: String,
    pub(crate) user_display_name: String,
}
