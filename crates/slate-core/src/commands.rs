use anyhow::anyhow;
use tracing::{debug, info, instrument};

use crate::cli::Invocation;
use crate::config::Config;
use crate::fallback::{DemoFallback, FallbackProvider};
use crate::filter::Filter;
use crate::render::Renderer;
use crate::session::TodoSession;
use crate::store::TaskStore;

pub fn known_command_names() -> Vec<&'static str> {
    vec![
        "add", "toggle", "delete", "list", "stats", "config", "help", "version",
    ]
}

pub fn expand_command_abbrev<'a>(token: &'a str, known: &[&'a str]) -> Option<&'a str> {
    if known.contains(&token) {
        return Some(token);
    }

    let mut matches = known.iter().copied().filter(|name| name.starts_with(token));
    let first = matches.next()?;
    if matches.next().is_some() {
        None
    } else {
        Some(first)
    }
}

#[instrument(skip(store, cfg, renderer, inv))]
pub async fn dispatch<S: TaskStore>(
    store: S,
    cfg: &Config,
    renderer: &mut Renderer,
    inv: Invocation,
) -> anyhow::Result<()> {
    debug!(command = %inv.command, args = ?inv.command_args, "dispatching command");

    match inv.command.as_str() {
        "config" => return cmd_config(cfg),
        "help" => return cmd_help(),
        "version" => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    let mut session = TodoSession::new(store, DemoFallback);
    session.load().await;
    renderer.print_notices(&session.take_notices())?;

    match inv.command.as_str() {
        "add" => cmd_add(&mut session, cfg, renderer, &inv.command_args).await,
        "toggle" => cmd_toggle(&mut session, cfg, renderer, &inv.command_args).await,
        "delete" => cmd_delete(&mut session, cfg, renderer, &inv.command_args).await,
        "list" => cmd_list(&mut session, cfg, renderer, &inv.command_args),
        "stats" => cmd_stats(&session, renderer),
        other => Err(anyhow!("unknown command: {other}")),
    }
}

#[instrument(skip(session, cfg, renderer, args))]
async fn cmd_add<S: TaskStore, F: FallbackProvider>(
    session: &mut TodoSession<S, F>,
    cfg: &Config,
    renderer: &mut Renderer,
    args: &[String],
) -> anyhow::Result<()> {
    info!("command add");

    session.set_draft(args.join(" "));
    session.add().await;
    renderer.print_notices(&session.take_notices())?;

    session.set_filter(resolve_filter(cfg, None)?);
    render_view(session, renderer)
}

#[instrument(skip(session, cfg, renderer, args))]
async fn cmd_toggle<S: TaskStore, F: FallbackProvider>(
    session: &mut TodoSession<S, F>,
    cfg: &Config,
    renderer: &mut Renderer,
    args: &[String],
) -> anyhow::Result<()> {
    info!("command toggle");

    let id = args
        .first()
        .ok_or_else(|| anyhow!("toggle requires a todo id"))?
        .clone();

    let Some(current) = session
        .tasks()
        .iter()
        .find(|task| task.id == id)
        .map(|task| task.is_complete)
    else {
        println!("No todo with id {id}.");
        return Ok(());
    };

    session.toggle(&id, current).await;
    renderer.print_notices(&session.take_notices())?;

    session.set_filter(resolve_filter(cfg, None)?);
    render_view(session, renderer)
}

#[instrument(skip(session, cfg, renderer, args))]
async fn cmd_delete<S: TaskStore, F: FallbackProvider>(
    session: &mut TodoSession<S, F>,
    cfg: &Config,
    renderer: &mut Renderer,
    args: &[String],
) -> anyhow::Result<()> {
    info!("command delete");

    let id = args
        .first()
        .ok_or_else(|| anyhow!("delete requires a todo id"))?
        .clone();

    if !session.tasks().iter().any(|task| task.id == id) {
        println!("No todo with id {id}.");
        return Ok(());
    }

    session.delete(&id).await;
    renderer.print_notices(&session.take_notices())?;

    session.set_filter(resolve_filter(cfg, None)?);
    render_view(session, renderer)
}

#[instrument(skip(session, cfg, renderer, args))]
fn cmd_list<S: TaskStore, F: FallbackProvider>(
    session: &mut TodoSession<S, F>,
    cfg: &Config,
    renderer: &mut Renderer,
    args: &[String],
) -> anyhow::Result<()> {
    info!("command list");

    let filter = resolve_filter(cfg, args.first().map(String::as_str))?;
    session.set_filter(filter);

    render_view(session, renderer)
}

#[instrument(skip(session, renderer))]
fn cmd_stats<S: TaskStore, F: FallbackProvider>(
    session: &TodoSession<S, F>,
    renderer: &mut Renderer,
) -> anyhow::Result<()> {
    info!("command stats");
    renderer.print_stats(&session.stats())
}

fn cmd_config(cfg: &Config) -> anyhow::Result<()> {
    let mut entries: Vec<(&String, &String)> = cfg.iter().collect();
    entries.sort();
    for (k, v) in entries {
        println!("{k}={v}");
    }
    Ok(())
}

fn cmd_help() -> anyhow::Result<()> {
    println!(
        "Implemented commands: add, toggle, delete, list (all|active|completed), stats, config, help, version"
    );
    Ok(())
}

fn resolve_filter(cfg: &Config, token: Option<&str>) -> anyhow::Result<Filter> {
    match token {
        Some(token) => Filter::parse(token),
        None => {
            let configured = cfg
                .get("default.filter")
                .unwrap_or_else(|| "all".to_string());
            Filter::parse(&configured)
        }
    }
}

fn render_view<S: TaskStore, F: FallbackProvider>(
    session: &TodoSession<S, F>,
    renderer: &mut Renderer,
) -> anyhow::Result<()> {
    renderer.print_tabs(session.filter(), &session.stats())?;
    renderer.print_task_table(&session.filtered_tasks(), session.filter())
}

#[cfg(test)]
mod tests {
    use super::{expand_command_abbrev, known_command_names};

    #[test]
    fn exact_and_prefix_abbreviations_expand() {
        let known = known_command_names();
        assert_eq!(expand_command_abbrev("delete", &known), Some("delete"));
        assert_eq!(expand_command_abbrev("del", &known), Some("delete"));
        assert_eq!(expand_command_abbrev("t", &known), Some("toggle"));
        assert_eq!(expand_command_abbrev("v", &known), Some("version"));
    }

    #[test]
    fn ambiguous_and_unknown_tokens_do_not_expand() {
        assert_eq!(expand_command_abbrev("march", &known_command_names()), None);

        let clashing = vec!["stash", "stats"];
        assert_eq!(expand_command_abbrev("sta", &clashing), None);
        assert_eq!(expand_command_abbrev("stat", &clashing), Some("stats"));
        assert_eq!(expand_command_abbrev("stash", &clashing), Some("stash"));
    }
}
