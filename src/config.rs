//! Generation plan configuration.
//!
//! A plan file lists the artifacts to produce with configtxgen, in order,
//! plus tool-level defaults:
//!
//! ```yaml
//! general:
//!   log_level: info
//!   failure_policy: exit
//! tool:
//!   bin_dir: "~/fabric/bin"
//!   config_path: "./network"
//! jobs:
//!   - type: genesis_block
//!     profile: TwoOrgsOrdererGenesis
//!     channel_id: system-channel
//!     output: ./channel-artifacts/genesis.block
//!   - type: channel_create_tx
//!     profile: TwoOrgsChannel
//!     channel_id: mychannel
//!     output: ./channel-artifacts/channel.tx
//!   - type: anchor_peers_update
//!     profile: TwoOrgsChannel
//!     channel_id: mychannel
//!     as_org: Org1MSP
//!     output: ./channel-artifacts/Org1MSPanchors.tx
//! ```

use crate::command::{ConfigTxGen, FailurePolicy};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Failure policy as written in a plan file
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    /// Stop the whole run on the first failed job
    #[default]
    Exit,
    /// Report the failure and let the caller decide
    Propagate,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub tool: ToolConfig,
    pub jobs: Vec<Job>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct GeneralConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    #[serde(default)]
    pub failure_policy: FailureMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ToolConfig {
    /// Directory holding the Fabric binaries; `PATH` is used when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bin_dir: Option<String>,
    /// Default `--configPath` for every job that does not set its own
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<String>,
}

/// A single configtxgen invocation
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Job {
    GenesisBlock {
        profile: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        channel_id: Option<String>,
        output: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        config_path: Option<String>,
    },
    ChannelCreateTx {
        profile: String,
        channel_id: String,
        output: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        base_profile: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        config_path: Option<String>,
    },
    AnchorPeersUpdate {
        profile: String,
        channel_id: String,
        as_org: String,
        output: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        config_path: Option<String>,
    },
    InspectBlock {
        path: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        config_path: Option<String>,
    },
    InspectChannelCreateTx {
        path: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        config_path: Option<String>,
    },
    PrintOrg {
        org: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        config_path: Option<String>,
    },
    Version,
}

impl Job {
    /// Short name used in logs and reports
    pub fn kind(&self) -> &'static str {
        match self {
            Job::GenesisBlock { .. } => "genesis_block",
            Job::ChannelCreateTx { .. } => "channel_create_tx",
            Job::AnchorPeersUpdate { .. } => "anchor_peers_update",
            Job::InspectBlock { .. } => "inspect_block",
            Job::InspectChannelCreateTx { .. } => "inspect_channel_create_tx",
            Job::PrintOrg { .. } => "print_org",
            Job::Version => "version",
        }
    }

    /// Artifact file this job writes, if any
    pub fn output(&self) -> Option<&Path> {
        match self {
            Job::GenesisBlock { output, .. }
            | Job::ChannelCreateTx { output, .. }
            | Job::AnchorPeersUpdate { output, .. } => Some(Path::new(output)),
            _ => None,
        }
    }

    fn config_path(&self) -> Option<&str> {
        match self {
            Job::GenesisBlock { config_path, .. }
            | Job::ChannelCreateTx { config_path, .. }
            | Job::AnchorPeersUpdate { config_path, .. }
            | Job::InspectBlock { config_path, .. }
            | Job::InspectChannelCreateTx { config_path, .. }
            | Job::PrintOrg { config_path, .. } => config_path.as_deref(),
            Job::Version => None,
        }
    }

    /// Apply this job's options to a builder. The job's own config path wins
    /// over `default_config_path`.
    pub fn apply(&self, cmd: &mut ConfigTxGen, default_config_path: Option<&str>) {
        match self {
            Job::GenesisBlock { profile, channel_id, output, .. } => {
                cmd.set_profile(Some(profile))
                    .set_channel_id(channel_id.as_deref())
                    .set_output_block(Some(output));
            }
            Job::ChannelCreateTx { profile, channel_id, output, base_profile, .. } => {
                cmd.set_profile(Some(profile))
                    .set_channel_id(Some(channel_id))
                    .set_channel_create_tx_base_profile(base_profile.as_deref())
                    .set_output_create_channel_tx(Some(output));
            }
            Job::AnchorPeersUpdate { profile, channel_id, as_org, output, .. } => {
                cmd.set_profile(Some(profile))
                    .set_channel_id(Some(channel_id))
                    .set_as_org(Some(as_org))
                    .set_output_anchor_peers_update(Some(output));
            }
            Job::InspectBlock { path, .. } => {
                cmd.set_inspect_block(Some(path));
            }
            Job::InspectChannelCreateTx { path, .. } => {
                cmd.set_inspect_channel_create_tx(Some(path));
            }
            Job::PrintOrg { org, .. } => {
                cmd.set_print_org(Some(org));
            }
            Job::Version => {
                cmd.set_version(Some(true));
            }
        }

        if !matches!(self, Job::Version) {
            cmd.set_config_path(self.config_path().or(default_config_path));
        }
    }

    fn validate(&self, index: usize) -> Result<(), ValidationError> {
        let required: Vec<(&str, &String)> = match self {
            Job::GenesisBlock { profile, output, .. } => {
                vec![("profile", profile), ("output", output)]
            }
            Job::ChannelCreateTx { profile, channel_id, output, .. } => {
                vec![("profile", profile), ("channel_id", channel_id), ("output", output)]
            }
            Job::AnchorPeersUpdate { profile, channel_id, as_org, output, .. } => vec![
                ("profile", profile),
                ("channel_id", channel_id),
                ("as_org", as_org),
                ("output", output),
            ],
            Job::InspectBlock { path, .. } | Job::InspectChannelCreateTx { path, .. } => {
                vec![("path", path)]
            }
            Job::PrintOrg { org, .. } => vec![("org", org)],
            Job::Version => Vec::new(),
        };

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidJob(format!(
                    "job {} ({}): {} cannot be empty",
                    index,
                    self.kind(),
                    field
                )));
            }
        }
        Ok(())
    }
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.jobs.is_empty() {
            return Err(ValidationError::InvalidJob("plan contains no jobs".to_string()));
        }

        if let Some(code) = self.general.exit_code {
            if code == 0 {
                return Err(ValidationError::InvalidGeneral(
                    "exit_code must be non-zero".to_string(),
                ));
            }
        }

        if let Some(level) = &self.general.log_level {
            if level.parse::<log::LevelFilter>().is_err() {
                return Err(ValidationError::InvalidGeneral(format!(
                    "unknown log_level '{}'",
                    level
                )));
            }
        }

        if let Some(bin_dir) = &self.tool.bin_dir {
            if bin_dir.trim().is_empty() {
                return Err(ValidationError::InvalidTool("bin_dir cannot be empty".to_string()));
            }
        }

        for (index, job) in self.jobs.iter().enumerate() {
            job.validate(index)?;
        }

        Ok(())
    }

    /// Failure policy to hand to each builder
    pub fn failure_policy(&self) -> FailurePolicy {
        match self.general.failure_policy {
            FailureMode::Exit => FailurePolicy::Exit {
                code: self.general.exit_code.unwrap_or(1),
            },
            FailureMode::Propagate => FailurePolicy::Propagate,
        }
    }
}

/// Validation errors for plan files
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid job configuration: {0}")]
    InvalidJob(String),
    #[error("Invalid general configuration: {0}")]
    InvalidGeneral(String),
    #[error("Invalid tool configuration: {0}")]
    InvalidTool(String),
}
