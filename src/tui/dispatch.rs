use super::TuiCommand;
use crate::console::ProjectConsole;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// Apply TUI commands to the console until `Quit` or the channel closes.
///
/// Draft edits are applied inline, and `CreateProject` captures the draft
/// before anything later in the queue can edit it. Each remote command runs
/// as its own task, so requests overlap freely and complete in whatever order
/// the backend answers. On channel close, in-flight requests are awaited; on `Quit` they
/// are dropped.
pub async fn run_dispatcher(console: ProjectConsole, mut cmd_rx: mpsc::Receiver<TuiCommand>) {
    let mut in_flight = JoinSet::new();
    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                Some(TuiCommand::Quit) => return,
                Some(TuiCommand::DraftPush(c)) => console.push_draft_char(c),
                Some(TuiCommand::DraftPop) => console.pop_draft_char(),
                Some(TuiCommand::CreateProject) => {
                    let name = console.snapshot().project_name_draft;
                    let console = console.clone();
                    in_flight.spawn(async move { console.create_project(&name).await });
                }
                Some(remote) => {
                    let console = console.clone();
                    in_flight.spawn(async move { execute(&console, remote).await });
                }
                None => break,
            },
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                if let Err(e) = joined {
                    tracing::error!(error = %e, "console task failed");
                }
            }
        }
    }
    while in_flight.join_next().await.is_some() {}
}

async fn execute(console: &ProjectConsole, cmd: TuiCommand) {
    match cmd {
        TuiCommand::RefreshProjects => console.list_projects().await,
        TuiCommand::RunProject(id) => console.run_project(&id).await,
        TuiCommand::DeleteProject(id) => console.delete_project(&id).await,
        TuiCommand::FetchConfig => console.fetch_config().await,
        TuiCommand::Quit
        | TuiCommand::CreateProject
        | TuiCommand::DraftPush(_)
        | TuiCommand::DraftPop => {}
    }
}
