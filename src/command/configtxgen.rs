//! Builder for `configtxgen` invocations.
//!
//! Every setter takes an `Option` so values coming from an optional upstream
//! source (a plan file, CLI flags) can be passed straight through: `None` is
//! a no-op. The flag names written to argv are the ones configtxgen expects,
//! e.g. `set_channel_id` produces `--channelID`.

use super::builder::{CommandBuilder, FailurePolicy};
use super::options::OptionStore;
use crate::logging::Logger;
use crate::process::runner::{ProcessRunner, RunError};
use crate::utils::binary::Binary;

pub const AS_ORG: &str = "asOrg";
pub const CHANNEL_CREATE_TX_BASE_PROFILE: &str = "channelCreateTxBaseProfile";
pub const CHANNEL_ID: &str = "channelID";
pub const CONFIG_PATH: &str = "configPath";
pub const INSPECT_BLOCK: &str = "inspectBlock";
pub const INSPECT_CHANNEL_CREATE_TX: &str = "inspectChannelCreateTx";
pub const OUTPUT_ANCHOR_PEERS_UPDATE: &str = "outputAnchorPeersUpdate";
pub const OUTPUT_BLOCK: &str = "outputBlock";
pub const OUTPUT_CREATE_CHANNEL_TX: &str = "outputCreateChannelTx";
pub const PRINT_ORG: &str = "printOrg";
pub const PROFILE: &str = "profile";
pub const VERSION: &str = "version";

#[derive(Debug)]
pub struct ConfigTxGen {
    command: CommandBuilder,
}

impl Default for ConfigTxGen {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ConfigTxGen {
    /// Create a builder. Without a logger, records are scoped to the
    /// `ConfigTxGen` type name.
    pub fn new(logger: Option<Logger>) -> Self {
        let logger = logger.unwrap_or_else(Logger::for_type::<Self>);
        Self {
            command: CommandBuilder::new(Binary::Configtxgen, Some(logger)),
        }
    }

    pub fn with_runner(mut self, runner: impl ProcessRunner + 'static) -> Self {
        self.command.set_runner(runner);
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.command.set_failure_policy(policy);
        self
    }

    /// The organization to perform an operation as (anchor peer updates)
    pub fn set_as_org<S: Into<String>>(&mut self, value: Option<S>) -> &mut Self {
        self.set_scalar(AS_ORG, value)
    }

    /// Profile used as the base when generating a channel creation tx
    pub fn set_channel_create_tx_base_profile<S: Into<String>>(&mut self, value: Option<S>) -> &mut Self {
        self.set_scalar(CHANNEL_CREATE_TX_BASE_PROFILE, value)
    }

    pub fn set_channel_id<S: Into<String>>(&mut self, value: Option<S>) -> &mut Self {
        self.set_scalar(CHANNEL_ID, value)
    }

    /// Directory containing `configtx.yaml`
    pub fn set_config_path<S: Into<String>>(&mut self, value: Option<S>) -> &mut Self {
        self.set_scalar(CONFIG_PATH, value)
    }

    pub fn set_inspect_block<S: Into<String>>(&mut self, value: Option<S>) -> &mut Self {
        self.set_scalar(INSPECT_BLOCK, value)
    }

    pub fn set_inspect_channel_create_tx<S: Into<String>>(&mut self, value: Option<S>) -> &mut Self {
        self.set_scalar(INSPECT_CHANNEL_CREATE_TX, value)
    }

    pub fn set_output_anchor_peers_update<S: Into<String>>(&mut self, value: Option<S>) -> &mut Self {
        self.set_scalar(OUTPUT_ANCHOR_PEERS_UPDATE, value)
    }

    /// Where to write the genesis block
    pub fn set_output_block<S: Into<String>>(&mut self, value: Option<S>) -> &mut Self {
        self.set_scalar(OUTPUT_BLOCK, value)
    }

    pub fn set_output_create_channel_tx<S: Into<String>>(&mut self, value: Option<S>) -> &mut Self {
        self.set_scalar(OUTPUT_CREATE_CHANNEL_TX, value)
    }

    /// Organization whose definition is printed as JSON
    pub fn set_print_org<S: Into<String>>(&mut self, value: Option<S>) -> &mut Self {
        self.set_scalar(PRINT_ORG, value)
    }

    pub fn set_profile<S: Into<String>>(&mut self, value: Option<S>) -> &mut Self {
        self.set_scalar(PROFILE, value)
    }

    /// Unlike the other setters this always records a value; `None` stores
    /// `false`, which is never emitted.
    pub fn set_version(&mut self, value: Option<bool>) -> &mut Self {
        self.command.set(VERSION, Some(value.unwrap_or(false)));
        self
    }

    fn set_scalar<S: Into<String>>(&mut self, key: &str, value: Option<S>) -> &mut Self {
        self.command.set(key, value.map(Into::<String>::into));
        self
    }

    pub fn options(&self) -> &OptionStore {
        self.command.options()
    }

    pub fn get_binary(&self) -> &'static str {
        self.command.get_binary()
    }

    pub fn get_args(&self) -> Vec<String> {
        self.command.get_args()
    }

    pub fn build(&self) -> String {
        self.command.build()
    }

    pub fn execute(&self) -> Result<(), RunError> {
        self.command.execute()
    }
}
