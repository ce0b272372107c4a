use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::CombineError;
use crate::output::{GroupId, RunHeader};

pub const DEFAULT_DATASET_NAME: &str = "combined";

/// Parameters of one combine run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombineConfig {
    /// Root of the input BIDS dataset.
    pub bids_dir: PathBuf,
    /// Subject label without `sub-`.
    pub participant_label: String,
    /// Sessions to combine, in processing order. Empty means all sessions in
    /// discovery order.
    pub session_list: Vec<String>,
    /// Take T1w images only from this session.
    pub t1_session_label: Option<String>,
    /// Take T2w images only from this session.
    pub t2_session_label: Option<String>,
    /// Replaces `combined` in `<input>_desc-combined`.
    pub dataset_name: String,
    /// Group name or gid to own created paths.
    pub owner_group: Option<String>,
}

fn strip_label(label: &str, prefix: &str) -> String {
    label.strip_prefix(prefix).unwrap_or(label).to_string()
}

fn is_label(label: &str) -> bool {
    !label.is_empty() && label.chars().all(|c| c.is_ascii_alphanumeric())
}

impl CombineConfig {
    /// Labels given as `sub-01` or `ses-A` are accepted and stored bare.
    pub fn new(bids_dir: impl Into<PathBuf>, participant_label: &str) -> Self {
        Self {
            bids_dir: bids_dir.into(),
            participant_label: strip_label(participant_label, "sub-"),
            session_list: Vec::new(),
            t1_session_label: None,
            t2_session_label: None,
            dataset_name: DEFAULT_DATASET_NAME.to_string(),
            owner_group: None,
        }
    }

    pub fn with_sessions<S: AsRef<str>>(mut self, sessions: &[S]) -> Self {
        self.session_list = sessions
            .iter()
            .map(|s| strip_label(s.as_ref(), "ses-"))
            .collect();
        self
    }

    pub fn with_t1_session(mut self, session: Option<&str>) -> Self {
        self.t1_session_label = session.map(|s| strip_label(s, "ses-"));
        self
    }

    pub fn with_t2_session(mut self, session: Option<&str>) -> Self {
        self.t2_session_label = session.map(|s| strip_label(s, "ses-"));
        self
    }

    pub fn with_dataset_name(mut self, name: &str) -> Self {
        self.dataset_name = name.to_string();
        self
    }

    pub fn with_owner_group(mut self, group: Option<&str>) -> Self {
        self.owner_group = group.map(String::from);
        self
    }

    /// Check labels and names. Session existence is checked against the
    /// layout later, still before anything is written.
    pub fn validate(&self) -> Result<(), CombineError> {
        if !is_label(&self.participant_label) {
            return Err(CombineError::Config(format!(
                "Invalid participant label: {:?}",
                self.participant_label
            )));
        }
        if !is_label(&self.dataset_name) {
            return Err(CombineError::Config(format!(
                "Dataset name must be alphanumeric: {:?}",
                self.dataset_name
            )));
        }

        let mut seen = HashSet::new();
        for session in &self.session_list {
            if !is_label(session) {
                return Err(CombineError::Config(format!(
                    "Invalid session label: {session:?}"
                )));
            }
            if !seen.insert(session.as_str()) {
                return Err(CombineError::Config(format!(
                    "Session {session} is listed more than once"
                )));
            }
        }
        for session in [&self.t1_session_label, &self.t2_session_label]
            .into_iter()
            .flatten()
        {
            if !is_label(session) {
                return Err(CombineError::Config(format!(
                    "Invalid session label: {session:?}"
                )));
            }
        }
        Ok(())
    }

    /// Sibling of the input dataset: `<input-dir-name>_desc-<dataset-name>`.
    /// `input_root` is the canonical dataset root, as opened by the layout.
    pub fn output_root(&self, input_root: &Path) -> Result<PathBuf, CombineError> {
        let name = input_root.file_name().ok_or_else(|| {
            CombineError::Config(format!(
                "Cannot derive an output name from {}",
                input_root.display()
            ))
        })?;
        let parent = input_root.parent().unwrap_or(input_root);
        Ok(parent.join(format!(
            "{}_desc-{}",
            name.to_string_lossy(),
            self.dataset_name
        )))
    }

    pub fn owner_group_id(&self) -> Result<Option<GroupId>, CombineError> {
        self.owner_group.as_deref().map(GroupId::resolve).transpose()
    }

    pub fn run_header(&self) -> RunHeader {
        let sessions = if self.session_list.is_empty() {
            "(all, in discovery order)".to_string()
        } else {
            self.session_list.join(" ")
        };
        let or_none = |v: &Option<String>| v.clone().unwrap_or_else(|| "None".to_string());
        RunHeader::new()
            .parameter("BIDS directory", self.bids_dir.display())
            .parameter("Participant label", &self.participant_label)
            .parameter("Session list", sessions)
            .parameter("T1w session label", or_none(&self.t1_session_label))
            .parameter("T2w session label", or_none(&self.t2_session_label))
            .parameter("Dataset name", &self.dataset_name)
            .parameter("Owner group", or_none(&self.owner_group))
    }
}
