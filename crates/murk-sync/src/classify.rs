//! Apply-failure classification -- raw daemon errors onto a closed message
//! set.
//!
//! An ordered rule table, evaluated top to bottom, first match wins. The
//! trigger substrings mirror the daemon's error phrases and HTTP status
//! codes; changing them changes which category a failure lands in, so new
//! phrases are added as new rows rather than by touching control flow.

/// The closed set of apply-failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    MethodNotAllowed,
    AccessDenied,
    /// Bad request: the node key was missing from the request.
    MissingNodeKey,
    /// Bad request: the payload failed to parse.
    MalformedRequest,
    /// Bad request: some other parameter problem.
    BadRequest,
    PeerNotFound,
    PeerMissingProfile,
    /// Server error: the daemon has no network map.
    NetmapUnavailable,
    /// Server error: the daemon could not fetch the peer's profile.
    ServerFetchFailed,
    /// Server error: the daemon fetched but could not apply.
    ServerApplyFailed,
    /// Server error: anything else.
    ServerError,
    Timeout,
    NetworkUnavailable,
    FetchFailed,
    ApplyFailed,
    Unclassified,
}

struct Rule {
    /// Any of these substrings triggers the rule.
    needles: &'static [&'static str],
    /// Sub-case dispatch on the raw message once triggered.
    resolve: fn(&str) -> FailureCategory,
}

const RULES: &[Rule] = &[
    Rule {
        needles: &["405", "only POST allowed"],
        resolve: |_| FailureCategory::MethodNotAllowed,
    },
    Rule {
        needles: &["403", "access denied"],
        resolve: |_| FailureCategory::AccessDenied,
    },
    Rule {
        needles: &["400", "invalid JSON"],
        resolve: |raw| {
            if raw.contains("nodeKey required") {
                FailureCategory::MissingNodeKey
            } else if raw.contains("invalid JSON") {
                FailureCategory::MalformedRequest
            } else {
                FailureCategory::BadRequest
            }
        },
    },
    Rule {
        needles: &["404", "peer not found"],
        resolve: |_| FailureCategory::PeerNotFound,
    },
    Rule {
        needles: &["409", "no Amnezia-WG config"],
        resolve: |_| FailureCategory::PeerMissingProfile,
    },
    Rule {
        needles: &["500"],
        resolve: |raw| {
            if raw.contains("no netmap available") {
                FailureCategory::NetmapUnavailable
            } else if raw.contains("failed to fetch config") {
                FailureCategory::ServerFetchFailed
            } else if raw.contains("failed to apply config") {
                FailureCategory::ServerApplyFailed
            } else {
                FailureCategory::ServerError
            }
        },
    },
    Rule {
        needles: &["timeout", "Timeout"],
        resolve: |_| FailureCategory::Timeout,
    },
    Rule {
        needles: &["no netmap available"],
        resolve: |_| FailureCategory::NetworkUnavailable,
    },
    Rule {
        needles: &["failed to fetch config"],
        resolve: |_| FailureCategory::FetchFailed,
    },
    Rule {
        needles: &["failed to apply config"],
        resolve: |_| FailureCategory::ApplyFailed,
    },
];

/// Classify a raw failure message. Falls through to
/// [`FailureCategory::Unclassified`] when no rule triggers.
pub fn classify(raw: &str) -> FailureCategory {
    for rule in RULES {
        if rule.needles.iter().any(|needle| raw.contains(needle)) {
            return (rule.resolve)(raw);
        }
    }
    FailureCategory::Unclassified
}

/// One classified failure: the category plus the single user-facing string
/// for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedFailure {
    pub category: FailureCategory,
    pub message: String,
}

/// Classify and render in one step.
pub fn classify_apply_failure(raw: &str, hostname: &str) -> ClassifiedFailure {
    let category = classify(raw);
    let message = render(category, raw, hostname);
    ClassifiedFailure { category, message }
}

fn render(category: FailureCategory, raw: &str, hostname: &str) -> String {
    use FailureCategory::*;
    match category {
        MethodNotAllowed => "Request method error, only POST allowed".into(),
        AccessDenied => "Access denied, cannot apply AWG config".into(),
        MissingNodeKey => "NodeKey cannot be empty".into(),
        MalformedRequest => format!("Request format error - JSON parsing failed: {raw}"),
        BadRequest => format!("Request parameter error - Details: {raw}"),
        PeerNotFound => format!("Target peer {hostname} not in network or offline"),
        PeerMissingProfile => format!("Target peer {hostname} has no AWG config"),
        NetmapUnavailable => "Network map unavailable, please try again later".into(),
        ServerFetchFailed => "Cannot fetch config from target peer".into(),
        ServerApplyFailed => "Config apply failed, please check permissions".into(),
        ServerError => format!("Server internal error: {raw}"),
        Timeout => "Operation timeout, please retry".into(),
        NetworkUnavailable => "Network connection unavailable, please check network status".into(),
        FetchFailed => format!("Cannot fetch config from peer {hostname}, please check peer status"),
        ApplyFailed => "Apply config failed, please check local permissions".into(),
        Unclassified => format!("AWG config apply failed, raw error: {raw}"),
    }
}
