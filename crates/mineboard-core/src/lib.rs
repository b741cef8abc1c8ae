pub mod cli;
pub mod commands;
pub mod config;
pub mod datastore;
pub mod identity;
pub mod render;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use mineboard_client::IdentityGate;
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
    "starting mineboard CLI"
  );
  debug!(?pre.rc_overrides, "preprocessed rc overrides");

  let mut cfg = config::Config::load(
    cli.boardrc.as_deref()
  )?;
  cfg.apply_overrides(
    pre.rc_overrides.into_iter().chain(
      cli
        .rc_overrides
        .into_iter()
        .map(|kv| (kv.key, kv.value))
    )
  );

  let data_dir = cfg
    .data_dir(cli.data.as_deref())
    .context(
      "failed to resolve data \
       directory"
    )?;

  let store =
    datastore::DataStore::open(
      &data_dir
    )
    .with_context(|| {
      format!(
        "failed to open datastore at \
         {}",
        data_dir.display()
      )
    })?;
  let categories = store
    .load_categories()
    .context(
      "failed to load categories"
    )?;
  let identity = IdentityGate::with_key(
    identity::FileIdentityStorage::new(
      &data_dir
    ),
    cfg.identity_key()
  );

  let renderer =
    render::Renderer::new(&cfg)?;

  commands::dispatch(
    store,
    identity,
    categories,
    &renderer,
    cli.command.unwrap_or_default()
  )?;

  info!("done");
  Ok(())
}
