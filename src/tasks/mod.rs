pub(crate) mod scheduler;
pub(crate) mod suspended_groups;
