pub mod cli;
pub mod commands;
pub mod config;
pub mod fallback;
pub mod filter;
pub mod render;
pub mod session;
pub mod store;
pub mod task;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let pre =
    cli::preprocess_args(&raw_args)?;
  let cli = cli::GlobalCli::parse_from(
    pre.cleaned_args
  );

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting todo CLI"
  );
  debug!(?pre.rc_overrides, "preprocessed rc overrides");

  let mut cfg = config::Config::load(
    cli.slaterc.as_deref()
  )?;
  cfg.apply_env(std::env::vars());
  cfg.apply_overrides(
    pre.rc_overrides.into_iter().chain(
      cli
        .rc_overrides
        .into_iter()
        .map(|kv| (kv.key, kv.value))
    )
  );

  let store =
    store::HttpStore::new(&cfg)
      .context(
        "failed to build the task \
         store client"
      )?;

  let mut renderer =
    render::Renderer::new(&cfg)?;
  let inv = cli::Invocation::parse(
    &cfg, cli.rest
  )?;

  let runtime =
    tokio::runtime::Runtime::new()
      .context(
        "failed to start the async \
         runtime"
      )?;
  runtime.block_on(
    commands::dispatch(
      store,
      &cfg,
      &mut renderer,
      inv
    )
  )?;

  info!("done");
  Ok(())
}
