use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use ovh_reconcile::cli::{Cli, Command, MergeArgs, TaskArgs, TaskCommand};
use ovh_reconcile::{
    Attr, OperationHandle, OvhClient, PollConfig, StatusSource, await_completion, merge_attrs,
    output, providers,
};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Task { command } => match command {
            TaskCommand::Status(args) => {
                let (client, handle) = prepare(&args)?;
                let status = client.fetch_status(&handle).await?;
                println!("{}", output::status_table(&handle, &status));
            }
            TaskCommand::Wait(args) => {
                let (client, handle) = prepare(&args.task)?;
                let config = args
                    .overrides()
                    .apply(PollConfig::for_kind(args.task.kind))?;

                let cancel = CancellationToken::new();
                let on_interrupt = cancel.clone();
                tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        tracing::warn!("interrupt received, cancelling wait");
                        on_interrupt.cancel();
                    }
                });

                let status = await_completion(&client, &handle, &config, &cancel).await?;
                println!("{}", output::status_table(&handle, &status));
            }
        },
        Command::Merge(args) => run_merge(&args)?,
    }

    Ok(())
}

fn prepare(args: &TaskArgs) -> Result<(OvhClient, OperationHandle)> {
    let client = providers::connect(&args.connection.client_config())?;
    let handle = OperationHandle::new(&args.service, &args.task_id)?.with_kind(args.kind);
    Ok((client, handle))
}

fn run_merge(args: &MergeArgs) -> Result<()> {
    let primary = Attr::from_file(&args.primary)
        .wrap_err_with(|| format!("reading {}", args.primary.display()))?;
    let fallback = Attr::from_file(&args.fallback)
        .wrap_err_with(|| format!("reading {}", args.fallback.display()))?;

    let merged = merge_attrs(primary, &fallback)?;
    if merged.contains_unknown() {
        tracing::warn!("merged snapshot still has unknown attributes");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&merged.to_json())?);
    } else {
        println!("{}", output::attr_tree("snapshot".to_string(), &merged));
    }

    Ok(())
}
