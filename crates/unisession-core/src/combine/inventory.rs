use std::collections::BTreeMap;

use super::renumber::Ordered;
use super::sessions::SessionOrder;
use crate::error::CombineError;
use crate::layout::LayoutQuery;
use crate::model::{Category, FileRecord};

/// Every data file of the resolved sessions, queried once per session and
/// category and tagged with its session position and discovery index.
#[derive(Debug, Clone)]
pub struct Inventory {
    pub subject: String,
    pub order: SessionOrder,
    files: BTreeMap<Category, Vec<Ordered<FileRecord>>>,
}

impl Inventory {
    pub fn collect<L: LayoutQuery + ?Sized>(
        layout: &L,
        subject: &str,
        order: SessionOrder,
    ) -> Result<Self, CombineError> {
        let mut files: BTreeMap<Category, Vec<Ordered<FileRecord>>> = BTreeMap::new();
        for (session_pos, session) in order.iter() {
            for category in Category::ALL {
                let records = layout.files_for(subject, session, category)?;
                tracing::debug!(
                    "sub-{subject} ses-{session} {category}: {} file(s)",
                    records.len()
                );
                files.entry(category).or_default().extend(
                    records
                        .into_iter()
                        .enumerate()
                        .map(|(discovery_idx, item)| Ordered {
                            session_pos,
                            discovery_idx,
                            item,
                        }),
                );
            }
        }
        Ok(Self {
            subject: subject.to_string(),
            order,
            files,
        })
    }

    pub fn files(&self, category: Category) -> &[Ordered<FileRecord>] {
        self.files.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn sessions_label(&self) -> String {
        self.order.labels().join(", ")
    }
}
