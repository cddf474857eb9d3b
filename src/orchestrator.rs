//! Plan orchestrator.
//!
//! Turns each job of a generation plan into a configtxgen invocation and runs
//! them in order. Output directories are created up front so the tool never
//! fails on a missing parent directory.

use crate::command::{ConfigTxGen, FailurePolicy};
use crate::config::{Config, Job};
use crate::process::runner::{ProcessRunner, SystemRunner};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::{info, warn};
use serde::Serialize;
use std::fs;
use std::sync::Arc;

/// What happened to one job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Planned,
    Succeeded,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub kind: String,
    pub binary: String,
    pub args: Vec<String>,
    pub command: String,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PlanReport {
    pub jobs: Vec<JobReport>,
}

impl PlanReport {
    pub fn failed(&self) -> usize {
        self.jobs.iter().filter(|j| j.status == JobStatus::Failed).count()
    }

    pub fn succeeded(&self) -> usize {
        self.jobs.iter().filter(|j| j.status == JobStatus::Succeeded).count()
    }
}

/// Options controlling a plan run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Only build and report the command lines
    pub dry_run: bool,
    /// Overrides the plan file's failure policy
    pub failure_policy: Option<FailurePolicy>,
}

/// Build the configtxgen command for a job
pub fn build_job(job: &Job, config: &Config, policy: FailurePolicy) -> ConfigTxGen {
    let mut cmd = ConfigTxGen::new(None).with_failure_policy(policy);
    job.apply(&mut cmd, config.tool.config_path.as_deref());
    cmd
}

/// Run a plan with the system process runner
pub fn run_plan(config: &Config, options: &RunOptions) -> Result<PlanReport> {
    let runner = match &config.tool.bin_dir {
        Some(dir) => SystemRunner::with_bin_dir(dir),
        None => SystemRunner::new(),
    };
    run_plan_with(config, options, Arc::new(runner))
}

/// Run a plan with an explicit runner.
///
/// Jobs run in order. With a propagating failure policy, the first failure
/// marks the remaining jobs as skipped and is returned in the report.
pub fn run_plan_with<R>(config: &Config, options: &RunOptions, runner: Arc<R>) -> Result<PlanReport>
where
    R: ProcessRunner + 'static,
{
    let policy = options
        .failure_policy
        .clone()
        .unwrap_or_else(|| config.failure_policy());
    info!("Running {} job(s) with failure policy {:?}", config.jobs.len(), policy);

    let mut report = PlanReport::default();
    let mut stop = false;

    for (index, job) in config.jobs.iter().enumerate() {
        let shared = Arc::clone(&runner);
        let cmd = build_job(job, config, policy.clone())
            .with_runner(move |binary: &str, args: &[String]| shared.run(binary, args));

        let command = cmd.build();
        let mut entry = JobReport {
            kind: job.kind().to_string(),
            binary: cmd.get_binary().to_string(),
            args: cmd.get_args(),
            command: command.clone(),
            status: JobStatus::Planned,
            error: None,
        };

        if stop {
            entry.status = JobStatus::Skipped;
            report.jobs.push(entry);
            continue;
        }

        if options.dry_run {
            info!("[{}/{}] {}", index + 1, config.jobs.len(), command);
            report.jobs.push(entry);
            continue;
        }

        if let Some(parent) = job.output().and_then(|p| p.parent()) {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).wrap_err_with(|| {
                    format!("Failed to create output directory '{}'", parent.display())
                })?;
            }
        }

        info!("[{}/{}] Generating {}", index + 1, config.jobs.len(), job.kind());
        match cmd.execute() {
            Ok(()) => entry.status = JobStatus::Succeeded,
            Err(err) => {
                warn!("Job {} ({}) failed, skipping remaining jobs", index, job.kind());
                entry.status = JobStatus::Failed;
                entry.error = Some(err.to_string());
                stop = true;
            }
        }
        report.jobs.push(entry);
    }

    info!(
        "Plan finished: {} succeeded, {} failed",
        report.succeeded(),
        report.failed()
    );
    Ok(report)
}
