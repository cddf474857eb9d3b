use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use fabgen::command::{ConfigTxGen, FailurePolicy};
use fabgen::config_loader;
use fabgen::orchestrator::{self, RunOptions};
use fabgen::process::SystemRunner;
use log::info;
use std::path::PathBuf;

/// Build and run configtxgen commands for network artifact generation
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run every job of a YAML generation plan
    Plan {
        /// Path to the generation plan YAML file
        #[arg(short, long)]
        config: PathBuf,

        /// Print the commands instead of running them
        #[arg(long)]
        dry_run: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,

        /// Override the plan's failure policy
        #[arg(long, value_enum)]
        on_failure: Option<OnFailure>,
    },
    /// Run a single configtxgen invocation
    Gen(GenArgs),
}

#[derive(ClapArgs, Debug)]
struct GenArgs {
    #[arg(long)]
    as_org: Option<String>,

    #[arg(long)]
    channel_create_tx_base_profile: Option<String>,

    #[arg(long)]
    channel_id: Option<String>,

    #[arg(long)]
    config_path: Option<String>,

    #[arg(long)]
    inspect_block: Option<String>,

    #[arg(long)]
    inspect_channel_create_tx: Option<String>,

    #[arg(long)]
    output_anchor_peers_update: Option<String>,

    #[arg(long)]
    output_block: Option<String>,

    #[arg(long)]
    output_create_channel_tx: Option<String>,

    #[arg(long)]
    print_org: Option<String>,

    #[arg(long)]
    profile: Option<String>,

    /// Ask configtxgen for its version
    #[arg(long = "tool-version")]
    tool_version: bool,

    /// Directory holding the Fabric binaries (defaults to PATH lookup)
    #[arg(long)]
    bin_dir: Option<PathBuf>,

    /// Print the command instead of running it
    #[arg(long)]
    dry_run: bool,

    #[arg(long, value_enum, default_value_t = OnFailure::Exit)]
    on_failure: OnFailure,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OnFailure {
    /// Exit the process with a non-zero status
    Exit,
    /// Return the error and report it
    Propagate,
}

impl From<OnFailure> for FailurePolicy {
    fn from(value: OnFailure) -> Self {
        match value {
            OnFailure::Exit => FailurePolicy::exit(),
            OnFailure::Propagate => FailurePolicy::Propagate,
        }
    }
}

impl GenArgs {
    fn to_command(&self) -> ConfigTxGen {
        let mut cmd = ConfigTxGen::new(None).with_failure_policy(self.on_failure.into());
        cmd.set_as_org(self.as_org.as_deref())
            .set_channel_create_tx_base_profile(self.channel_create_tx_base_profile.as_deref())
            .set_channel_id(self.channel_id.as_deref())
            .set_config_path(self.config_path.as_deref())
            .set_inspect_block(self.inspect_block.as_deref())
            .set_inspect_channel_create_tx(self.inspect_channel_create_tx.as_deref())
            .set_output_anchor_peers_update(self.output_anchor_peers_update.as_deref())
            .set_output_block(self.output_block.as_deref())
            .set_output_create_channel_tx(self.output_create_channel_tx.as_deref())
            .set_print_org(self.print_org.as_deref())
            .set_profile(self.profile.as_deref())
            .set_version(Some(self.tool_version));
        cmd
    }
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    // The plan file may carry its own default level; RUST_LOG still wins
    let default_level = match &args.command {
        Command::Plan { config, .. } => {
            config_loader::peek_log_level(config).unwrap_or_else(|| "info".to_string())
        }
        Command::Gen(_) => "info".to_string(),
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    match args.command {
        Command::Plan {
            config,
            dry_run,
            json,
            on_failure,
        } => {
            let plan = config_loader::load_config(&config)?;
            let options = RunOptions {
                dry_run,
                failure_policy: on_failure.map(FailurePolicy::from),
            };

            let report = orchestrator::run_plan(&plan, &options)?;
            if json {
                let rendered = serde_json::to_string_pretty(&report)
                    .wrap_err("Failed to serialize run report")?;
                println!("{}", rendered);
            } else if dry_run {
                for job in &report.jobs {
                    println!("{}", job.command);
                }
            }

            if report.failed() > 0 {
                return Err(color_eyre::eyre::eyre!(
                    "{} job(s) failed",
                    report.failed()
                ));
            }
        }
        Command::Gen(gen_args) => {
            let cmd = gen_args.to_command();
            if gen_args.dry_run {
                println!("{}", cmd.build());
                return Ok(());
            }

            let runner = match &gen_args.bin_dir {
                Some(dir) => SystemRunner::with_bin_dir(dir),
                None => SystemRunner::new(),
            };
            info!("Running: {}", cmd.build());
            cmd.with_runner(runner)
                .execute()
                .wrap_err("configtxgen invocation failed")?;
        }
    }

    info!("Done");
    Ok(())
}
