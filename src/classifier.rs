// src/classifier.rs
use std::fmt;

/// Soft status vocabulary. The store column stays TEXT and manual commands
/// may write arbitrary strings; this enum only covers what the classifier
/// can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationStatus {
    Applied,
    InReview,
    InterviewScheduled,
    Offer,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::InReview => "In Review",
            ApplicationStatus::InterviewScheduled => "Interview Scheduled",
            ApplicationStatus::Offer => "Offer",
            ApplicationStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword policy, version 1. Scanned top to bottom, first match wins, so
/// the declared order is part of the contract: an email containing both
/// "interview" and "rejected" classifies as Rejected. Do not reorder
/// without bumping the policy.
const STATUS_KEYWORDS: &[(&str, ApplicationStatus)] = &[
    ("rejected", ApplicationStatus::Rejected),
    ("declined", ApplicationStatus::Rejected),
    ("shortlisted", ApplicationStatus::InReview),
    ("viewed", ApplicationStatus::InReview),
    ("interview", ApplicationStatus::InterviewScheduled),
    ("hired", ApplicationStatus::Offer),
    ("offer", ApplicationStatus::Offer),
];

/// Classify an email by subject and full decoded body text.
///
/// Case-insensitive substring scan of both fields against the keyword
/// table; returns `Applied` when nothing matches.
pub fn classify(subject: &str, body: &str) -> ApplicationStatus {
    let subject = subject.to_lowercase();
    let body = body.to_lowercase();

    for (keyword, status) in STATUS_KEYWORDS {
        if subject.contains(keyword) || body.contains(keyword) {
            return *status;
        }
    }

    ApplicationStatus::Applied
}
