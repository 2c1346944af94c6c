pub(crate) mod courses;
pub(crate) mod enrolments;
pub(crate) mod group_members;
pub(crate) mod log_events;
pub(crate) mod mail_outbox;
pub(crate) mod roles;
