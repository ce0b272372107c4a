pub mod anat;
pub mod fmap;
pub mod func;
pub mod inventory;
pub mod renumber;
pub mod sessions;

#[cfg(test)]
mod fixtures;

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::CombineConfig;
use crate::error::CombineError;
use crate::layout::{FsLayout, LayoutQuery};
use crate::model::{CombinePlan, PlannedFile, RenumberedFile, TransferRecord};
use crate::output::copy::{ensure_dir, CopyExecutor};
use crate::output::log::TransferLog;
use crate::output::sidecar::Sidecar;

pub use func::TargetMap;
pub use inventory::Inventory;
pub use sessions::{resolve_session_order, SessionOrder};

/// Name of the run log written into the output subject directory.
pub const LOG_FILE_NAME: &str = "README";

/// Outcome of an executed plan.
#[derive(Debug, Clone, Serialize)]
pub struct CombineReport {
    pub output_root: PathBuf,
    pub log_path: PathBuf,
    pub transfers: Vec<TransferRecord>,
    pub warnings: Vec<String>,
}

/// Plans a combine run for one subject against a layout.
pub struct Combiner<'a, L: LayoutQuery + ?Sized> {
    layout: &'a L,
    config: &'a CombineConfig,
}

impl<'a, L: LayoutQuery + ?Sized> Combiner<'a, L> {
    pub fn new(layout: &'a L, config: &'a CombineConfig) -> Self {
        Self { layout, config }
    }

    /// Resolve sessions, select and renumber every category, and prepare
    /// each sidecar. Reads the input only; all configuration errors surface
    /// here.
    pub fn plan(&self, output_root: &Path) -> Result<CombinePlan, CombineError> {
        let config = self.config;
        config.validate()?;
        let subject = config.participant_label.as_str();

        if !self.layout.subjects()?.iter().any(|s| s == subject) {
            return Err(CombineError::Config(format!(
                "subject {subject} is not in the layout of {}",
                config.bids_dir.display()
            )));
        }
        let discovered = self.layout.sessions(subject)?;
        let order = resolve_session_order(subject, &config.session_list, &discovered)?;
        let inventory = Inventory::collect(self.layout, subject, order)?;

        let mut warnings = Vec::new();
        let anat = anat::plan_anat(
            &inventory,
            config.t1_session_label.as_deref(),
            config.t2_session_label.as_deref(),
            output_root,
            &mut warnings,
        )?;
        let func = func::plan_func(&inventory, output_root, &mut warnings);
        let targets = TargetMap::from_files(&func);
        let fmap = fmap::plan_fmap(&inventory, output_root, &targets, &mut warnings)?;

        let plan = CombinePlan {
            subject: subject.to_string(),
            sessions: inventory.order.labels().to_vec(),
            output_root: output_root.to_path_buf(),
            anat: with_provenance(anat)?,
            func: with_provenance(func)?,
            fmap,
            warnings,
        };
        plan.check_destinations()?;
        Ok(plan)
    }
}

fn with_provenance(files: Vec<RenumberedFile>) -> Result<Vec<PlannedFile>, CombineError> {
    files
        .into_iter()
        .map(|file| {
            let mut metadata = Sidecar::for_record(&file.record)?;
            metadata.set_provenance(&file.record.path);
            Ok(PlannedFile { file, metadata })
        })
        .collect()
}

/// Write a plan: create the output subject directory, open the run log, and
/// copy every planned file in order (anat, func, fmap). Stops at the first
/// failure and leaves what was already written in place.
pub fn execute(plan: &CombinePlan, config: &CombineConfig) -> Result<CombineReport, CombineError> {
    let group = config.owner_group_id()?;
    let subject_dir = plan.subject_dir();
    ensure_dir(&subject_dir, group)?;

    let log_path = subject_dir.join(LOG_FILE_NAME);
    let log = TransferLog::open(&log_path, &config.run_header())?;
    let mut executor = CopyExecutor::new(group, log);
    for warning in &plan.warnings {
        executor.log_mut().warn(warning)?;
    }

    for planned in plan.files() {
        executor.transfer(planned)?;
    }
    let transfers = executor.finish();
    tracing::info!(
        "Combined {} file(s) for sub-{} into {}",
        plan.len(),
        plan.subject,
        subject_dir.display()
    );

    Ok(CombineReport {
        output_root: plan.output_root.clone(),
        log_path,
        transfers,
        warnings: plan.warnings.clone(),
    })
}

/// Plan against the filesystem layout of `config.bids_dir` without writing.
pub fn plan(config: &CombineConfig) -> Result<CombinePlan, CombineError> {
    let layout = FsLayout::open(&config.bids_dir)?;
    let output_root = config.output_root(layout.root())?;
    config.owner_group_id()?;
    Combiner::new(&layout, config).plan(&output_root)
}

/// Plan and execute a combine run on the filesystem.
pub fn combine(config: &CombineConfig) -> Result<CombineReport, CombineError> {
    let plan = plan(config)?;
    execute(&plan, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combine::fixtures::{input_path, memory_layout, tree, Dataset, ROOT};
    use crate::layout::MemoryLayout;
    use crate::model::Category;
    use serde_json::json;

    fn rest_layout() -> MemoryLayout {
        memory_layout(&[
            "ses-A/anat/sub-01_ses-A_T1w.nii.gz",
            "ses-A/func/sub-01_ses-A_task-rest_run-1_bold.nii.gz",
            "ses-A/func/sub-01_ses-A_task-rest_run-2_bold.nii.gz",
            "ses-B/anat/sub-01_ses-B_T1w.nii.gz",
            "ses-B/func/sub-01_ses-B_task-rest_run-1_bold.nii.gz",
        ])
    }

    #[test]
    fn test_two_sessions_rest_renumbered_with_provenance() {
        let layout = rest_layout();
        let config = CombineConfig::new(ROOT, "01").with_sessions(&["A", "B"]);
        let plan = Combiner::new(&layout, &config)
            .plan(Path::new("/out"))
            .unwrap();

        let func: Vec<_> = plan
            .func
            .iter()
            .map(|p| p.file.destination_file_name())
            .collect();
        assert_eq!(
            func,
            vec![
                "sub-01_task-rest_run-01_bold.nii.gz",
                "sub-01_task-rest_run-02_bold.nii.gz",
                "sub-01_task-rest_run-03_bold.nii.gz",
            ]
        );
        assert_eq!(
            plan.func[2].metadata.provenance(),
            Some(input_path("ses-B/func/sub-01_ses-B_task-rest_run-1_bold.nii.gz").as_str())
        );
        assert_eq!(plan.sessions, vec!["A", "B"]);
    }

    #[test]
    fn test_t1_session_label_selects_one_session() {
        let layout = rest_layout();
        let config = CombineConfig::new(ROOT, "01").with_t1_session(Some("B"));
        let plan = Combiner::new(&layout, &config)
            .plan(Path::new("/out"))
            .unwrap();

        assert_eq!(plan.anat.len(), 1);
        let t1 = &plan.anat[0].file;
        assert_eq!(t1.record.session, "B");
        assert_eq!(t1.run, 1);
        assert_eq!(
            t1.destination,
            Path::new("/out/sub-01/anat/sub-01_run-01_T1w.nii.gz")
        );
    }

    #[test]
    fn test_output_has_no_session_component() {
        let layout = rest_layout();
        let config = CombineConfig::new(ROOT, "01");
        let plan = Combiner::new(&layout, &config)
            .plan(Path::new("/out"))
            .unwrap();
        assert_eq!(plan.len(), 5);
        for planned in plan.files() {
            for dest in [&planned.file.destination, &planned.file.sidecar_destination] {
                assert!(!dest.to_string_lossy().contains("ses-"), "{}", dest.display());
            }
        }
        assert_eq!(plan.category(Category::Fmap).len(), 0);
        assert!(plan
            .warnings
            .iter()
            .any(|w| w.contains("No fmap data")));
    }

    #[test]
    fn test_unknown_subject_and_session_are_config_errors() {
        let layout = rest_layout();
        let config = CombineConfig::new(ROOT, "02");
        let err = Combiner::new(&layout, &config)
            .plan(Path::new("/out"))
            .unwrap_err();
        assert!(matches!(err, CombineError::Config(_)));

        let config = CombineConfig::new(ROOT, "01").with_sessions(&["A", "Z"]);
        let err = Combiner::new(&layout, &config)
            .plan(Path::new("/out"))
            .unwrap_err();
        assert!(matches!(err, CombineError::Config(_)));
    }

    #[test]
    fn test_plan_is_deterministic() {
        let layout = rest_layout();
        let config = CombineConfig::new(ROOT, "01");
        let combiner = Combiner::new(&layout, &config);
        let first = combiner.plan(Path::new("/out")).unwrap();
        let second = combiner.plan(Path::new("/out")).unwrap();
        assert_eq!(first, second);
    }

    fn populated_dataset() -> Dataset {
        let ds = Dataset::new();
        ds.add("ses-A/anat/sub-01_ses-A_T1w.nii.gz", Some(json!({"EchoTime": 0.002})));
        ds.add("ses-A/anat/sub-01_ses-A_T2w.nii.gz", Some(json!({"EchoTime": 0.5})));
        ds.add(
            "ses-A/func/sub-01_ses-A_task-rest_run-1_bold.nii.gz",
            Some(json!({"TaskName": "rest"})),
        );
        ds.add(
            "ses-A/func/sub-01_ses-A_task-rest_run-2_bold.nii.gz",
            Some(json!({"TaskName": "rest"})),
        );
        ds.add(
            "ses-B/func/sub-01_ses-B_task-rest_run-1_bold.nii.gz",
            Some(json!({"TaskName": "rest"})),
        );
        ds.add(
            "ses-B/fmap/sub-01_ses-B_dir-AP_epi.nii.gz",
            Some(json!({
                "IntendedFor": "ses-B/func/sub-01_ses-B_task-rest_run-1_bold.nii.gz"
            })),
        );
        ds
    }

    #[test]
    fn test_combine_writes_flat_session_tree() {
        let ds = populated_dataset();
        let report = combine(&ds.config()).unwrap();

        let out = ds.output_subject_dir();
        assert_eq!(
            tree(&out),
            vec![
                "README",
                "anat/sub-01_run-01_T1w.json",
                "anat/sub-01_run-01_T1w.nii.gz",
                "anat/sub-01_run-01_T2w.json",
                "anat/sub-01_run-01_T2w.nii.gz",
                "fmap/sub-01_dir-AP_run-01_epi.json",
                "fmap/sub-01_dir-AP_run-01_epi.nii.gz",
                "func/sub-01_task-rest_run-01_bold.json",
                "func/sub-01_task-rest_run-01_bold.nii.gz",
                "func/sub-01_task-rest_run-02_bold.json",
                "func/sub-01_task-rest_run-02_bold.nii.gz",
                "func/sub-01_task-rest_run-03_bold.json",
                "func/sub-01_task-rest_run-03_bold.nii.gz",
            ]
        );
        assert_eq!(report.transfers.len(), 12);

        // Data copied bit for bit; every provenance field names an input file.
        let run3 = out.join("func/sub-01_task-rest_run-03_bold.nii.gz");
        assert_eq!(
            std::fs::read_to_string(&run3).unwrap(),
            "ses-B/func/sub-01_ses-B_task-rest_run-1_bold.nii.gz"
        );
        for record in &report.transfers {
            if record.destination.extension().is_some_and(|e| e == "json") {
                let doc = Sidecar::load(&record.destination).unwrap();
                assert!(Path::new(doc.provenance().unwrap()).is_file());
            }
        }

        let fmap = Sidecar::load(&out.join("fmap/sub-01_dir-AP_run-01_epi.json")).unwrap();
        assert_eq!(
            fmap.get("IntendedFor"),
            Some(&json!("func/sub-01_task-rest_run-03_bold.nii.gz"))
        );

        let log = std::fs::read_to_string(&report.log_path).unwrap();
        assert!(log.contains("Participant label: 01"));
        assert_eq!(log.matches(" -> ").count(), 12);
    }

    #[test]
    fn test_non_canonical_input_gives_absolute_provenance() {
        let ds = populated_dataset();
        let config = CombineConfig::new(ds.root.join("sub-01").join(".."), "01");
        let plan = plan(&config).unwrap();

        assert_eq!(
            plan.output_root,
            ds.tmp.path().canonicalize().unwrap().join("niftis_desc-combined")
        );
        for planned in plan.files() {
            let source = planned.metadata.provenance().unwrap();
            assert!(Path::new(source).is_absolute(), "{source}");
            assert!(!source.contains(".."), "{source}");
            assert!(Path::new(source).is_file());
        }
    }

    #[test]
    fn test_second_run_collides_instead_of_overwriting() {
        let ds = populated_dataset();
        let config = ds.config();
        let first = plan(&config).unwrap();
        combine(&config).unwrap();

        let second = plan(&config).unwrap();
        assert_eq!(first, second);

        let err = execute(&second, &config).unwrap_err();
        assert!(matches!(err, CombineError::Collision { .. }), "{err}");
        let t1 = ds.output_subject_dir().join("anat/sub-01_run-01_T1w.nii.gz");
        assert_eq!(
            std::fs::read_to_string(t1).unwrap(),
            "ses-A/anat/sub-01_ses-A_T1w.nii.gz"
        );
    }

    #[test]
    fn test_config_error_writes_nothing() {
        let ds = populated_dataset();
        let config = ds.config().with_t2_session(Some("B"));
        let err = combine(&config).unwrap_err();
        assert!(matches!(err, CombineError::Config(_)));
        assert!(!ds.tmp.path().join("niftis_desc-combined").exists());
    }

    #[test]
    fn test_single_session_is_copy_and_renumber() {
        let ds = populated_dataset();
        let config = ds.config().with_sessions(&["B"]).with_dataset_name("single");
        let report = combine(&config).unwrap();
        let out = ds.tmp.path().join("niftis_desc-single/sub-01");
        assert!(out.join("func/sub-01_task-rest_run-01_bold.nii.gz").is_file());
        assert!(!out.join("anat").exists());
        assert_eq!(report.transfers.len(), 4);
        assert!(report.warnings.iter().any(|w| w.contains("No T1w data")));
    }
}
