use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::config::{ClientConfig, DEFAULT_ENDPOINT, PollOverrides};
use crate::task::TaskKind;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect or wait for remote tasks
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },
    /// Merge a read-back snapshot over a declared one
    Merge(MergeArgs),
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Fetch the current status of a task once
    Status(TaskArgs),
    /// Block until a task reaches a terminal state
    Wait(WaitArgs),
}

#[derive(clap::Args, Debug)]
pub struct ConnectionArgs {
    #[arg(long, env = "OVH_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    #[arg(long, env = "OVH_ACCESS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

impl ConnectionArgs {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            endpoint: self.endpoint.clone(),
            access_token: self.token.clone(),
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct TaskArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[arg(long, value_enum)]
    pub kind: TaskKind,

    /// Owning service (server name, project id, zone, ...)
    #[arg(long)]
    pub service: String,

    #[arg(long)]
    pub task_id: String,
}

#[derive(clap::Args, Debug)]
pub struct WaitArgs {
    #[command(flatten)]
    pub task: TaskArgs,

    #[arg(long)]
    pub timeout_secs: Option<u64>,

    #[arg(long)]
    pub initial_delay_secs: Option<u64>,

    #[arg(long)]
    pub min_interval_secs: Option<u64>,
}

impl WaitArgs {
    pub fn overrides(&self) -> PollOverrides {
        PollOverrides {
            timeout: self.timeout_secs.map(Duration::from_secs),
            initial_delay: self.initial_delay_secs.map(Duration::from_secs),
            min_poll_interval: self.min_interval_secs.map(Duration::from_secs),
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct MergeArgs {
    /// JSON snapshot as read back from the API
    #[arg(long)]
    pub primary: PathBuf,

    /// JSON snapshot as declared before the mutation
    #[arg(long)]
    pub fallback: PathBuf,

    /// Print JSON instead of a tree
    #[arg(long)]
    pub json: bool,
}
