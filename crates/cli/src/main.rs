// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `grid`, the operator CLI for `gridd` (spec §6 "Operator interface").

mod client;
mod commands;
mod env;
mod output;

use clap::{Parser, Subcommand};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "grid", about = "Operator CLI for the gridd scheduler daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Output format shared by every subcommand.
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Command {
    /// Show the daemon's role and listen addresses.
    Status,
    #[command(subcommand)]
    Task(TaskCommand),
    #[command(subcommand)]
    Run(RunCommand),
    #[command(subcommand)]
    Worker(WorkerCommand),
    #[command(subcommand)]
    Project(ProjectCommand),
}

#[derive(Subcommand)]
enum TaskCommand {
    /// Show a Task template.
    Get { task_id: String },
    /// Fire a Task immediately, bypassing its schedule.
    Trigger { task_id: String },
}

#[derive(Subcommand)]
enum RunCommand {
    /// Show a Run's current state.
    Get { run_id: String },
    /// Cancel an in-flight Run.
    Cancel {
        run_id: String,
        #[arg(long, default_value = "cancelled by operator")]
        reason: String,
    },
}

#[derive(Subcommand)]
enum WorkerCommand {
    /// Show a Worker's registration and health.
    Get { worker_id: String },
}

#[derive(Subcommand)]
enum ProjectCommand {
    /// Unpack a zip archive into a Project's draft tree.
    Edit { project_id: String, archive: std::path::PathBuf },
    /// Publish a new immutable version of a Project's artifact bundle.
    Publish { project_id: String },
    /// Show a published version's manifest (defaults to the latest).
    Manifest {
        project_id: String,
        #[arg(long)]
        version: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Status => commands::status::handle(cli.format).await,
        Command::Task(TaskCommand::Get { task_id }) => commands::task::get(task_id.into(), cli.format).await,
        Command::Task(TaskCommand::Trigger { task_id }) => commands::task::trigger(task_id.into(), cli.format).await,
        Command::Run(RunCommand::Get { run_id }) => commands::run::get(run_id.into(), cli.format).await,
        Command::Run(RunCommand::Cancel { run_id, reason }) => {
            commands::run::cancel(run_id.into(), reason, cli.format).await
        }
        Command::Worker(WorkerCommand::Get { worker_id }) => commands::worker::get(worker_id.into(), cli.format).await,
        Command::Project(ProjectCommand::Edit { project_id, archive }) => {
            commands::project::edit(project_id.into(), archive, cli.format).await
        }
        Command::Project(ProjectCommand::Publish { project_id }) => {
            commands::project::publish(project_id.into(), cli.format).await
        }
        Command::Project(ProjectCommand::Manifest { project_id, version }) => {
            commands::project::manifest(project_id.into(), version, cli.format).await
        }
    }
}
