use chrono::Utc;
use chrono_tz::Asia::Tokyo;

/// Server-assigned report timestamp: current time rendered in the
/// deployment's fixed zone. Sensor-reported wall-clock fields carry no
/// zone and are stored verbatim, never interpreted.
pub(crate) fn server_timestamp_now() -> String {
    Utc::now().with_timezone(&Tokyo).to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn server_timestamp_is_rfc3339_in_tokyo() {
        let raw = server_timestamp_now();
        let parsed = DateTime::parse_from_rfc3339(&raw).expect("rfc3339");
        assert_eq!(parsed.offset().local_minus_utc(), 9 * 3600);
    }
}
