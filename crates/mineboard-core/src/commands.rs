use anyhow::{Context, anyhow};
use futures::executor::block_on;
use mineboard_client::{
    Declined, IdentityGate, IdentityStorage, NewTaskDraft, Settled, TaskBoard, TaskStore,
};
use mineboard_shared::{Category, CategoryId};
use tracing::{debug, info};

use crate::cli::Command;
use crate::render::Renderer;

/// Starts a board session, runs `command` through it and renders the
/// result.
#[tracing::instrument(skip(store, identity, categories, renderer))]
pub fn dispatch<S, I>(
    store: S,
    identity: IdentityGate<I>,
    categories: Vec<Category>,
    renderer: &Renderer,
    command: Command,
) -> anyhow::Result<()>
where
    S: TaskStore,
    I: IdentityStorage,
{
    let mut session = TaskBoard::new(categories, store, identity);
    let started = block_on(session.start()).map_err(declined)?;
    ensure_applied(started).context("failed to load tasks")?;

    match command {
        Command::List { category } => {
            if let Some(raw) = category {
                let id = resolve_category(session.board().categories(), &raw)?;
                session.set_active_category(id);
            }
            renderer.print_board(session.board())
        }
        Command::Refresh => {
            let settled = block_on(session.refresh()).map_err(declined)?;
            ensure_applied(settled).context("refresh failed")?;
            renderer.print_board(session.board())
        }
        Command::Add { title, categories } => {
            let ids = categories
                .iter()
                .map(|raw| resolve_category(session.board().categories(), raw))
                .collect::<anyhow::Result<Vec<CategoryId>>>()?;
            session.open_create_task();
            let settled = block_on(session.create_task(NewTaskDraft {
                title,
                categories: ids,
            }))
            .map_err(declined)?;
            ensure_applied(settled).context("failed to create task")?;
            info!("task created");
            renderer.print_board(session.board())
        }
        Command::Done { id } => {
            let settled = block_on(session.toggle_completion(id)).map_err(declined)?;
            ensure_applied(settled).with_context(|| format!("failed to toggle task {id}"))?;
            renderer.print_board(session.board())
        }
        Command::Join { id } => {
            let settled = block_on(session.toggle_assignment(id)).map_err(declined)?;
            ensure_applied(settled).with_context(|| format!("failed to join task {id}"))?;
            renderer.print_board(session.board())
        }
        Command::Nick { name: Some(name) } => {
            session.submit_identity(&name).map_err(declined)?;
            println!(
                "nickname set to {}",
                session.board().nickname().unwrap_or_default()
            );
            Ok(())
        }
        Command::Nick { name: None } => {
            match session.board().nickname() {
                Some(nickname) => println!("{nickname}"),
                None => println!("no nickname set"),
            }
            Ok(())
        }
        Command::Categories => renderer.print_categories(session.board()),
    }
}

/// Accepts a category id or a case-insensitive name.
pub fn resolve_category(categories: &[Category], raw: &str) -> anyhow::Result<CategoryId> {
    let raw = raw.trim().trim_start_matches('#').trim();
    if let Ok(id) = raw.parse::<CategoryId>() {
        if categories.iter().any(|c| c.id == id) {
            return Ok(id);
        }
    }

    let lowered = raw.to_lowercase();
    categories
        .iter()
        .find(|c| c.name.to_lowercase() == lowered)
        .map(|c| c.id)
        .ok_or_else(|| {
            let known = categories
                .iter()
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            anyhow!("unknown category {raw:?} (known: {known})")
        })
}

fn ensure_applied(settled: Settled) -> anyhow::Result<()> {
    match settled {
        Settled::Applied => Ok(()),
        Settled::Failed(err) => Err(anyhow!(err)),
    }
}

fn declined(reason: Declined) -> anyhow::Error {
    debug!(%reason, "operation declined");
    match reason {
        Declined::NoIdentity => {
            anyhow!("{reason}; run `board nick <name>` first")
        }
        other => anyhow!(other),
    }
}
