use regex::Regex;
use std::sync::LazyLock;

static SUBMISSION_CHECK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/submissions/detail/([^/]+)/check/").expect("valid submission check pattern")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlClass<'a> {
    /// Not a check request at all.
    NotSubmission,
    /// A check request without a recognisable submission id.
    Unrecognised,
    /// "Run code" or test-case execution.
    TestRun(&'a str),
    /// A graded submission.
    Submission(&'a str),
}

pub fn is_submission_url(url: &str) -> bool {
    url.contains("/check/")
}

pub fn extract_submission_id(url: &str) -> Option<&str> {
    SUBMISSION_CHECK
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Graded submissions carry purely numeric ids; test runs do not.
pub fn is_valid_submission_id(submission_id: &str) -> bool {
    !submission_id.is_empty() && submission_id.bytes().all(|b| b.is_ascii_digit())
}

pub fn classify(url: &str) -> UrlClass<'_> {
    if !is_submission_url(url) {
        return UrlClass::NotSubmission;
    }
    match extract_submission_id(url) {
        None => UrlClass::Unrecognised,
        Some(id) if is_valid_submission_id(id) => UrlClass::Submission(id),
        Some(id) => UrlClass::TestRun(id),
    }
}
