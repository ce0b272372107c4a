use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use unisession_core::config::DEFAULT_DATASET_NAME;
use unisession_core::{execute, plan, CombineConfig};

use crate::output::format::{format_plan, format_report};
use crate::output::OutputFormat;

#[derive(Args)]
pub struct CombineArgs {
    /// Input BIDS dataset
    pub bids_dir: PathBuf,

    /// Subject to combine, as in sub-<participant_label> (the "sub-" is optional)
    pub participant_label: String,

    /// Sessions to combine, in the order their runs are numbered.
    /// Default: every session of the subject, in directory listing order
    #[arg(long, value_name = "SESSION-LABEL", num_args = 1..)]
    pub session_list: Vec<String>,

    /// Take T1w data only from this session (must be one of the combined sessions)
    #[arg(long)]
    pub t1_session_label: Option<String>,

    /// Take T2w data only from this session (must be one of the combined sessions)
    #[arg(long)]
    pub t2_session_label: Option<String>,

    /// Alphanumeric name for the output dataset: <bids_dir>_desc-<name>
    #[arg(long, default_value = DEFAULT_DATASET_NAME)]
    pub dataset_name: String,

    /// Group name or gid to own new directories and files
    #[arg(long)]
    pub owner_group: Option<String>,

    /// Only show what would be written (dry run)
    #[arg(long)]
    pub dry_run: bool,
}

impl CombineArgs {
    fn config(&self) -> CombineConfig {
        CombineConfig::new(&self.bids_dir, &self.participant_label)
            .with_sessions(self.session_list.as_slice())
            .with_t1_session(self.t1_session_label.as_deref())
            .with_t2_session(self.t2_session_label.as_deref())
            .with_dataset_name(&self.dataset_name)
            .with_owner_group(self.owner_group.as_deref())
    }
}

pub fn run(args: &CombineArgs, format: OutputFormat) -> Result<()> {
    let config = args.config();
    tracing::info!(
        "Planning sub-{} from {}",
        config.participant_label,
        args.bids_dir.display()
    );

    let plan = plan(&config).with_context(|| {
        format!(
            "Cannot combine sessions of sub-{} in {}",
            config.participant_label,
            args.bids_dir.display()
        )
    })?;

    tracing::info!(
        "Planned {} file(s) from session(s) {} into {}",
        plan.len(),
        plan.sessions.join(", "),
        plan.subject_dir().display()
    );

    if args.dry_run {
        print!("{}", format_plan(&plan, format));
        return Ok(());
    }

    let report = execute(&plan, &config).with_context(|| {
        format!(
            "Combining sub-{} into {} failed; files written so far are listed in {}",
            plan.subject,
            plan.output_root.display(),
            plan.subject_dir().join(unisession_core::combine::LOG_FILE_NAME).display()
        )
    })?;
    print!("{}", format_report(&report, format));
    Ok(())
}
