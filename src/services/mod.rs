pub(crate) mod mailer;
pub(crate) mod notice;
pub(crate) mod platform;
