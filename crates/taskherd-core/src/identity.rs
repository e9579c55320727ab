//! Job identity derivation.
//!
//! A job's identity is its source's base name, camel-cased:
//! `lib/scheduled_tasks/newsfeed_task.toml` becomes `NewsfeedTask`.

use taskherd_protocols::DiscoveryCause;

/// File stem of a source location, without directories or extensions.
pub fn base_name(location: &str) -> &str {
    let file = location.rsplit(['/', '\\']).next().unwrap_or(location);
    file.split('.').next().unwrap_or(file)
}

/// Camel-case a `snake_case` or `kebab-case` name.
///
/// Returns `None` when the name is empty, contains characters other than
/// ASCII alphanumerics, `_` and `-`, or would start with a digit.
pub fn camelize(name: &str) -> Option<String> {
    let valid = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return None;
    }

    let mut identity = String::with_capacity(name.len());
    for segment in name.split(['_', '-']).filter(|s| !s.is_empty()) {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            identity.push(first.to_ascii_uppercase());
            identity.push_str(chars.as_str());
        }
    }

    match identity.chars().next() {
        Some(first) if first.is_ascii_alphabetic() => Some(identity),
        _ => None,
    }
}

/// Derive the canonical job identity for a source location.
pub fn derive_identity(location: &str) -> Result<String, DiscoveryCause> {
    let base = base_name(location);
    camelize(base).ok_or_else(|| DiscoveryCause::InvalidIdentity(base.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("lib/scheduled_tasks/newsfeed_task.toml"), "newsfeed_task");
        assert_eq!(base_name("newsfeed_task"), "newsfeed_task");
        assert_eq!(base_name("jobs\\win_task.toml"), "win_task");
        assert_eq!(base_name("jobs/archive.tar.toml"), "archive");
        assert_eq!(base_name("jobs/"), "");
    }

    #[test]
    fn test_camelize() {
        assert_eq!(camelize("newsfeed_task").as_deref(), Some("NewsfeedTask"));
        assert_eq!(camelize("toadcamp-task").as_deref(), Some("ToadcampTask"));
        assert_eq!(camelize("heartbeat").as_deref(), Some("Heartbeat"));
        assert_eq!(camelize("send_daily_digest").as_deref(), Some("SendDailyDigest"));
        assert_eq!(camelize("_leading__double_").as_deref(), Some("LeadingDouble"));
        assert_eq!(camelize("s3Sync").as_deref(), Some("S3Sync"));
    }

    #[test]
    fn test_camelize_rejects_invalid() {
        assert!(camelize("").is_none());
        assert!(camelize("___").is_none());
        assert!(camelize("2fa_reset").is_none());
        assert!(camelize("news feed").is_none());
        assert!(camelize("naïve").is_none());
    }

    #[test]
    fn test_derive_identity() {
        assert_eq!(
            derive_identity("lib/scheduled_tasks/newsfeed_task.toml").unwrap(),
            "NewsfeedTask"
        );

        let err = derive_identity("lib/scheduled_tasks/.toml").unwrap_err();
        assert!(matches!(err, DiscoveryCause::InvalidIdentity(ref base) if base.is_empty()));
    }

    #[test]
    fn test_derive_identity_is_deterministic() {
        let a = derive_identity("x/report_task.toml").unwrap();
        let b = derive_identity("y/report_task.rb").unwrap();
        assert_eq!(a, b);
    }
}
