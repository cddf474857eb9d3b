//! # Fabgen - configtxgen command builder and runner
//!
//! This library builds and executes `configtxgen` invocations used to produce
//! blockchain network configuration artifacts: genesis blocks, channel
//! creation transactions and anchor peer updates.
//!
//! ## Overview
//!
//! Callers set named options on a [`command::ConfigTxGen`] builder. The
//! builder keeps them in first-set order, serializes them into discrete argv
//! tokens and hands the tokens to a [`process::ProcessRunner`].
//!
//! ## Architecture
//!
//! - `command`: option store, generic builder, configtxgen setters
//! - `process`: process runners and their errors
//! - `logging`: logger handle used by the builders
//! - `utils`: tool binary table and path resolution
//! - `config`: generation plan file structures and validation
//! - `config_loader`: plan file loading
//! - `orchestrator`: runs every job of a plan in order
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use fabgen::command::ConfigTxGen;
//!
//! let mut cmd = ConfigTxGen::new(None);
//! cmd.set_profile(Some("TwoOrgsChannel"))
//!     .set_channel_id(Some("mychannel"))
//!     .set_output_create_channel_tx(Some("./channel-artifacts/channel.tx"));
//!
//! assert_eq!(
//!     cmd.build(),
//!     "configtxgen --profile TwoOrgsChannel --channelID mychannel --outputCreateChannelTx ./channel-artifacts/channel.tx"
//! );
//! cmd.execute()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! Library errors are `thiserror` enums (`RunError`, `BinaryError`,
//! `ValidationError`). Plan loading and orchestration return
//! `color_eyre::Result` with context attached.
//!
//! A failed `execute` logs one error line and then follows the builder's
//! [`command::FailurePolicy`]: the library default propagates the error,
//! while the `fabgen` binary exits the process.

pub mod command;
pub mod config;
pub mod config_loader;
pub mod logging;
pub mod orchestrator;
pub mod process;
pub mod utils;
