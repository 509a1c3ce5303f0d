use code_tools_fs::ops::{
    Context, CopyRequest, DeleteRequest, GlobRequest, ListDirRequest, MovePathRequest,
    RemoveRequest, TreeRequest,
};
use code_tools_fs::summary;
use tokio_util::sync::CancellationToken;

use crate::error::CliError;
use crate::{Cli, Command, OutputFormat};

/// A response rendered both ways; the CLI prints one of them.
#[derive(Debug)]
pub(crate) struct CommandOutput {
    pub(crate) json: serde_json::Value,
    pub(crate) text: String,
}

pub(crate) fn run_with_context(cli: &Cli, ctx: &Context) -> Result<(), CliError> {
    let cancel = CancellationToken::new();
    let output = execute_command(ctx, &cli.command, &cancel)?;
    let rendered = match cli.format {
        OutputFormat::Json => crate::serialize_json(&output.json, cli.pretty)?,
        OutputFormat::Text => output.text,
    };
    crate::write_stdout_line(&rendered)?;
    Ok(())
}

fn output<T: serde::Serialize>(response: &T, text: String) -> Result<CommandOutput, CliError> {
    Ok(CommandOutput {
        json: serde_json::to_value(response)?,
        text,
    })
}

pub(crate) fn execute_command(
    ctx: &Context,
    command: &Command,
    cancel: &CancellationToken,
) -> Result<CommandOutput, CliError> {
    match command {
        Command::List {
            path,
            recursive,
            show_hidden,
            limit,
        } => {
            let response = ctx.list_dir(
                ListDirRequest {
                    path: path.clone(),
                    recursive: *recursive,
                    show_hidden: *show_hidden,
                    limit: *limit,
                },
                cancel,
            )?;
            output(&response, summary::list_dir(&response))
        }
        Command::Tree {
            path,
            depth,
            show_hidden,
            limit,
        } => {
            let response = ctx.tree(
                TreeRequest {
                    path: path.clone(),
                    depth: *depth,
                    show_hidden: *show_hidden,
                    limit: *limit,
                },
                cancel,
            )?;
            output(&response, summary::tree(&response))
        }
        Command::Glob {
            pattern,
            path,
            limit,
        } => {
            let response = ctx.glob_paths(
                GlobRequest {
                    pattern: pattern.clone(),
                    path: path.clone(),
                    limit: *limit,
                },
                cancel,
            )?;
            output(&response, summary::glob(&response))
        }
        Command::Copy {
            source,
            destination,
            overwrite,
        } => {
            let response = ctx.copy_path(
                CopyRequest {
                    source: source.clone(),
                    destination: destination.clone(),
                    overwrite: *overwrite,
                },
                cancel,
            )?;
            output(&response, summary::copy(&response))
        }
        Command::Move {
            source,
            destination,
            overwrite,
        } => {
            let response = ctx.move_path(
                MovePathRequest {
                    source: source.clone(),
                    destination: destination.clone(),
                    overwrite: *overwrite,
                },
                cancel,
            )?;
            output(&response, summary::move_path(&response))
        }
        Command::Delete { path } => {
            let response = ctx.delete(DeleteRequest { path: path.clone() }, cancel)?;
            output(&response, summary::delete(&response))
        }
        Command::Remove { path, recursive } => {
            let response = ctx.remove(
                RemoveRequest {
                    path: path.clone(),
                    recursive: *recursive,
                },
                cancel,
            )?;
            output(&response, summary::remove(&response))
        }
    }
}
