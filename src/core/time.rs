use time::{format_description::well_known::Rfc3339, Duration, OffsetDateTime, PrimitiveDateTime};

pub(crate) fn primitive_now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

pub(crate) fn format_primitive(value: PrimitiveDateTime) -> String {
    value.assume_utc().format(&Rfc3339).unwrap_or_else(|_| value.assume_utc().to_string())
}

/// Start of the lookback window ending at `now`.
pub(crate) fn lookback_cutoff(now: PrimitiveDateTime, lookback_seconds: u64) -> PrimitiveDateTime {
    let seconds = lookback_seconds.min(i64::MAX as u64) as i64;
    now.checked_sub(Duration::seconds(seconds)).unwrap_or(PrimitiveDateTime::MIN)
}
