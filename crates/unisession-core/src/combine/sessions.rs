use std::collections::HashSet;

use serde::Serialize;

use crate::error::CombineError;

/// Session labels of one subject in processing order. Never empty, no
/// duplicates, every label known to the layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SessionOrder(Vec<String>);

impl SessionOrder {
    pub fn labels(&self) -> &[String] {
        &self.0
    }

    pub fn position(&self, label: &str) -> Option<usize> {
        self.0.iter().position(|s| s == label)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.position(label).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.0.iter().map(String::as_str).enumerate()
    }
}

/// Validate a requested session order against the discovered sessions, or
/// fall back to discovery order when nothing was requested.
pub fn resolve_session_order(
    subject: &str,
    requested: &[String],
    discovered: &[String],
) -> Result<SessionOrder, CombineError> {
    if discovered.is_empty() {
        return Err(CombineError::Discovery(format!(
            "subject {subject} has no sessions"
        )));
    }
    if requested.is_empty() {
        return Ok(SessionOrder(discovered.to_vec()));
    }

    let mut seen = HashSet::new();
    for session in requested {
        if !discovered.contains(session) {
            return Err(CombineError::Config(format!(
                "subject sub-{subject} does not have session {session} (found: {})",
                discovered.join(", ")
            )));
        }
        if !seen.insert(session.as_str()) {
            return Err(CombineError::Config(format!(
                "session {session} is listed more than once"
            )));
        }
    }
    Ok(SessionOrder(requested.to_vec()))
}
