use std::path::Path;

use super::entities::record_from_path;
use super::LayoutQuery;
use crate::error::CombineError;
use crate::model::{Category, FileRecord};

/// A layout held entirely in memory. Lists come back in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryLayout {
    sessions: Vec<(String, String)>,
    records: Vec<FileRecord>,
}

impl MemoryLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_session(&mut self, subject: &str, session: &str) -> &mut Self {
        let known = self
            .sessions
            .iter()
            .any(|(sub, ses)| sub == subject && ses == session);
        if !known {
            self.sessions.push((subject.to_string(), session.to_string()));
        }
        self
    }

    pub fn add_record(&mut self, record: FileRecord) -> &mut Self {
        self.add_session(&record.subject, &record.session);
        self.records.push(record);
        self
    }

    /// Parse a dataset path such as `/d/sub-01/ses-A/func/sub-01_ses-A_task-rest_bold.nii.gz`
    /// and add it. The category comes from the parent directory name.
    pub fn add_path(&mut self, path: impl AsRef<Path>) -> Result<&mut Self, CombineError> {
        let path = path.as_ref();
        let category = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .and_then(Category::from_dir_name)
            .ok_or_else(|| {
                CombineError::Discovery(format!("{} is not in a datatype directory", path.display()))
            })?;
        let record = record_from_path(path, category).ok_or_else(|| {
            CombineError::Discovery(format!("{} is not a data file name", path.display()))
        })?;
        Ok(self.add_record(record))
    }
}

impl LayoutQuery for MemoryLayout {
    fn subjects(&self) -> Result<Vec<String>, CombineError> {
        let mut subjects: Vec<String> = Vec::new();
        for (subject, _) in &self.sessions {
            if !subjects.contains(subject) {
                subjects.push(subject.clone());
            }
        }
        Ok(subjects)
    }

    fn sessions(&self, subject: &str) -> Result<Vec<String>, CombineError> {
        let sessions: Vec<String> = self
            .sessions
            .iter()
            .filter(|(sub, _)| sub == subject)
            .map(|(_, ses)| ses.clone())
            .collect();
        if sessions.is_empty() {
            return Err(CombineError::Discovery(format!(
                "subject {subject} is not in the layout"
            )));
        }
        Ok(sessions)
    }

    fn files_for(
        &self,
        subject: &str,
        session: &str,
        category: Category,
    ) -> Result<Vec<FileRecord>, CombineError> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.subject == subject && r.session == session && r.category == category)
            .cloned()
            .collect())
    }
}
