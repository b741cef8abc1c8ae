use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use mineboard_core::config::Config;
use mineboard_web_server::{
  AppState,
  build_app
};
use tracing::{
  error,
  info,
  warn
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{
  EnvFilter,
  fmt
};

#[derive(Parser, Debug)]
#[command(
  name = "mineboard-server",
  version,
  about = "Serves the task board API \
           and web UI"
)]
struct ServerArgs {
  #[arg(long = "boardrc")]
  boardrc: Option<PathBuf>,

  #[arg(long = "data")]
  data:    Option<PathBuf>,

  /// Overrides `server.bind`.
  #[arg(long = "bind")]
  bind:    Option<SocketAddr>,

  /// Overrides `server.ui_dir`.
  #[arg(long = "ui-dir")]
  ui_dir:  Option<PathBuf>
}

fn init_tracing() {
  let filter =
    EnvFilter::try_from_default_env()
      .or_else(|_| {
        EnvFilter::try_new(
          "info,mineboard_web_server=debug,\
           mineboard_core=debug,\
           tower_http=debug"
        )
      })
      .unwrap_or_else(|_| {
        EnvFilter::new("info")
      });

  let _ =
    tracing_subscriber::registry()
      .with(filter)
      .with(
        fmt::layer()
          .with_target(true)
          .with_line_number(true)
      )
      .try_init();
}

#[tokio::main]
async fn main() {
  init_tracing();

  if let Err(err) = serve().await {
    error!(error = %format!("{err:#}"), "server failed");
    std::process::exit(1);
  }
}

async fn serve() -> anyhow::Result<()> {
  let args = ServerArgs::parse();
  let cfg =
    Config::load(args.boardrc.as_deref())
      .context("failed to load boardrc")?;

  let data_dir =
    cfg.data_dir(args.data.as_deref())?;
  let bind = match args.bind {
    | Some(addr) => addr,
    | None => cfg.server_bind()?
  };
  let ui_dir = args
    .ui_dir
    .unwrap_or_else(|| cfg.ui_dir());

  if !ui_dir.is_dir() {
    warn!(
      ui_dir = %ui_dir.display(),
      "ui bundle directory missing; \
       only the API will respond"
    );
  }

  let state = AppState::open(&data_dir)?
    .with_info(cfg.server_info());
  let app = build_app(state, &ui_dir);

  let listener =
    tokio::net::TcpListener::bind(bind)
      .await
      .with_context(|| {
        format!("failed to bind {bind}")
      })?;
  info!(
    %bind,
    data_dir = %data_dir.display(),
    "mineboard server listening"
  );

  axum::serve(listener, app)
    .with_graceful_shutdown(
      wait_for_shutdown_signal()
    )
    .await
    .context("server error")?;

  warn!("shutdown signal received; stopped");
  Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
  use tokio::signal::unix::{
    SignalKind,
    signal
  };

  let mut sigterm = match signal(
    SignalKind::terminate()
  ) {
    | Ok(stream) => stream,
    | Err(error) => {
      error!(
        %error,
        "failed to register SIGTERM \
         handler; falling back to \
         ctrl_c"
      );
      let _ =
        tokio::signal::ctrl_c().await;
      return;
    }
  };

  tokio::select! {
    _ = tokio::signal::ctrl_c() => {}
    _ = sigterm.recv() => {}
  }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
  if let Err(error) =
    tokio::signal::ctrl_c().await
  {
    error!(
      %error,
      "failed waiting for ctrl_c \
       signal"
    );
  }
}
