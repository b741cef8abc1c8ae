use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::net::SocketAddr;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow,
  bail
};
use mineboard_client::DEFAULT_IDENTITY_KEY;
use mineboard_shared::{
  ServerInfo,
  ServerLink
};
use tracing::{
  debug,
  info,
  trace
};

pub const DEFAULT_SERVER_BIND: &str =
  "127.0.0.1:3000";

/// Keys every board starts with; an rc
/// file or `--rc` replaces them one by
/// one.
const DEFAULTS: &[(&str, &str)] = &[
  ("data.location", "~/.mineboard"),
  ("identity.key", DEFAULT_IDENTITY_KEY),
  ("color", "on"),
  ("server.bind", DEFAULT_SERVER_BIND),
  ("server.ui_dir", "dist"),
  ("server.name", "Mineboard")
];

/// Sidebar links, in display order.
const LINK_KEYS: &[(&str, &str)] = &[
  ("links.docs", "Tutoriais"),
  ("links.discord", "Discord"),
  ("links.github", "GitHub")
];

#[derive(Debug, Clone)]
pub struct Config {
  map:        HashMap<String, String>,
  pub source: Option<PathBuf>
}

impl Config {
  /// Built-in defaults only, no rc file.
  pub fn defaults() -> Self {
    Self {
      map:    DEFAULTS
        .iter()
        .map(|(k, v)| {
          (k.to_string(), v.to_string())
        })
        .collect(),
      source: None
    }
  }

  /// Defaults layered with the boardrc
  /// found by [`locate_boardrc`].
  #[tracing::instrument(skip(
    boardrc_override
  ))]
  pub fn load(
    boardrc_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Self::defaults();
    let Some(path) =
      locate_boardrc(boardrc_override)
    else {
      debug!("no boardrc; using defaults");
      return Ok(cfg);
    };

    let text = fs::read_to_string(&path)
      .with_context(|| {
        format!(
          "failed to read boardrc {}",
          path.display()
        )
      })?;
    let entries = parse_rc(&text)
      .with_context(|| {
        format!(
          "invalid boardrc {}",
          path.display()
        )
      })?;
    info!(
      boardrc = %path.display(),
      keys = entries.len(),
      "loaded boardrc"
    );
    cfg.map.extend(entries);
    cfg.source = Some(path);
    Ok(cfg)
  }

  /// `--rc` and bare `rc.key=value`
  /// words; the `rc.` prefix is
  /// optional.
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (key, value) in overrides {
      let key = match key
        .strip_prefix("rc.")
      {
        | Some(bare) => bare.to_string(),
        | None => key
      };
      debug!(%key, %value, "rc override");
      self.map.insert(key, value);
    }
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self.map.get(key).cloned()
  }

  fn non_blank(
    &self,
    key: &str
  ) -> Option<&str> {
    self
      .map
      .get(key)
      .map(|value| value.trim())
      .filter(|value| !value.is_empty())
  }

  pub fn identity_key(&self) -> String {
    self
      .non_blank("identity.key")
      .unwrap_or(DEFAULT_IDENTITY_KEY)
      .to_string()
  }

  pub fn color(
    &self
  ) -> anyhow::Result<bool> {
    match self
      .non_blank("color")
      .map(str::to_ascii_lowercase)
      .as_deref()
    {
      | None
      | Some("on" | "yes" | "true" | "1") => {
        Ok(true)
      }
      | Some("off" | "no" | "false" | "0") => {
        Ok(false)
      }
      | Some(other) => {
        bail!("invalid color setting: {other}")
      }
    }
  }

  pub fn server_bind(
    &self
  ) -> anyhow::Result<SocketAddr> {
    let raw = self
      .non_blank("server.bind")
      .unwrap_or(DEFAULT_SERVER_BIND);
    raw.parse().with_context(|| {
      format!(
        "invalid server.bind value: \
         {raw}"
      )
    })
  }

  pub fn ui_dir(&self) -> PathBuf {
    expand_tilde(Path::new(
      self
        .non_blank("server.ui_dir")
        .unwrap_or("dist")
    ))
  }

  /// What the web UI shows above the
  /// category list. Unset links are
  /// left out.
  pub fn server_info(&self) -> ServerInfo {
    ServerInfo {
      name:    self
        .non_blank("server.name")
        .unwrap_or("Mineboard")
        .to_string(),
      address: self
        .non_blank("server.address")
        .map(str::to_string),
      links:   LINK_KEYS
        .iter()
        .filter_map(|(key, label)| {
          self.non_blank(key).map(|url| {
            ServerLink {
              label: label.to_string(),
              url:   url.to_string()
            }
          })
        })
        .collect()
    }
  }

  /// `override_dir`, else
  /// `data.location`; created when
  /// missing.
  pub fn data_dir(
    &self,
    override_dir: Option<&Path>
  ) -> anyhow::Result<PathBuf> {
    let dir = match override_dir {
      | Some(path) => path.to_path_buf(),
      | None => {
        let raw = self
          .non_blank("data.location")
          .ok_or_else(|| {
            anyhow!(
              "data.location is empty"
            )
          })?;
        expand_tilde(Path::new(raw))
      }
    };

    fs::create_dir_all(&dir).with_context(
      || {
        format!(
          "failed to create data \
           directory {}",
          dir.display()
        )
      }
    )?;
    Ok(dir)
  }
}

/// `--boardrc`, then `$MINEBOARDRC`
/// (`/dev/null` turns the rc file off),
/// then `~/.mineboardrc` if it exists.
pub fn locate_boardrc(
  override_path: Option<&Path>
) -> Option<PathBuf> {
  if let Some(path) = override_path {
    return Some(path.to_path_buf());
  }

  match std::env::var_os("MINEBOARDRC") {
    | Some(env) if env == OsString::from("/dev/null") => None,
    | Some(env) => Some(PathBuf::from(env)),
    | None => dirs::home_dir()
      .map(|home| home.join(".mineboardrc"))
      .filter(|path| path.is_file())
  }
}

/// `key = value` lines. A `#` starts a
/// comment at the beginning of a line
/// or after whitespace, so URL
/// fragments survive.
fn parse_rc(
  text: &str
) -> anyhow::Result<Vec<(String, String)>>
{
  let mut entries = Vec::new();
  for (idx, raw) in text.lines().enumerate()
  {
    let line = strip_comment(raw).trim();
    if line.is_empty() {
      continue;
    }
    let Some((key, value)) =
      line.split_once('=')
    else {
      bail!(
        "line {}: expected key = value, \
         got {raw:?}",
        idx + 1
      );
    };
    let key = key.trim();
    if key.is_empty() {
      bail!("line {}: empty key", idx + 1);
    }
    trace!(key, "rc entry");
    entries.push((
      key.to_string(),
      value.trim().to_string()
    ));
  }
  Ok(entries)
}

fn strip_comment(line: &str) -> &str {
  if line.trim_start().starts_with('#') {
    return "";
  }
  match line.find(" #") {
    | Some(at) => &line[..at],
    | None => line
  }
}

fn expand_tilde(path: &Path) -> PathBuf {
  match (
    path.strip_prefix("~"),
    dirs::home_dir()
  ) {
    | (Ok(rest), Some(home)) => {
      home.join(rest)
    }
    | _ => path.to_path_buf()
  }
}

#[cfg(test)]
mod tests {
  use tempfile::tempdir;

  use super::*;

  #[test]
  fn rc_file_and_overrides_layer_on_defaults()
  {
    let temp = tempdir().expect("tempdir");
    let rc = temp.path().join("boardrc");
    fs::write(
      &rc,
      "# board settings\n\
       identity.key = NICK # trailing\n\
       \n\
       server.bind=0.0.0.0:8080\n"
    )
    .expect("write rc");

    let mut cfg = Config::load(Some(&rc))
      .expect("load config");
    assert_eq!(cfg.identity_key(), "NICK");
    assert_eq!(
      cfg
        .server_bind()
        .expect("bind")
        .port(),
      8080
    );
    assert!(cfg.color().expect("color"));

    cfg.apply_overrides([(
      "rc.color".to_string(),
      "off".to_string()
    )]);
    assert!(!cfg.color().expect("color"));
    assert_eq!(cfg.source, Some(rc));
  }

  #[test]
  fn malformed_line_is_an_error() {
    let temp = tempdir().expect("tempdir");
    let rc = temp.path().join("boardrc");
    fs::write(&rc, "just words\n")
      .expect("write rc");

    let err = Config::load(Some(&rc))
      .expect_err("malformed");
    assert!(
      format!("{err:#}")
        .contains("expected key = value")
    );
  }

  #[test]
  fn blank_identity_key_falls_back() {
    let mut cfg = Config::defaults();
    cfg.apply_overrides([(
      "identity.key".to_string(),
      " ".to_string()
    )]);
    assert_eq!(
      cfg.identity_key(),
      DEFAULT_IDENTITY_KEY
    );
  }

  #[test]
  fn invalid_color_is_rejected() {
    let mut cfg = Config::defaults();
    cfg.apply_overrides([(
      "color".to_string(),
      "sometimes".to_string()
    )]);
    assert!(cfg.color().is_err());
  }

  #[test]
  fn server_info_keeps_set_links_in_order() {
    let mut cfg = Config::defaults();
    cfg.apply_overrides([
      (
        "server.address".to_string(),
        "play.example.net".to_string()
      ),
      (
        "links.github".to_string(),
        "https://github.com/example/board"
          .to_string()
      ),
      (
        "links.docs".to_string(),
        "https://docs.example.net/#start"
          .to_string()
      )
    ]);

    let info = cfg.server_info();
    assert_eq!(info.name, "Mineboard");
    assert_eq!(
      info.address.as_deref(),
      Some("play.example.net")
    );
    let labels: Vec<&str> = info
      .links
      .iter()
      .map(|link| link.label.as_str())
      .collect();
    assert_eq!(labels, vec!["Tutoriais", "GitHub"]);
  }

  #[test]
  fn hash_inside_a_value_is_not_a_comment() {
    let entries = parse_rc(
      "links.docs=https://docs.example.net/#start # docs\n"
    )
    .expect("parse");
    assert_eq!(
      entries,
      vec![(
        "links.docs".to_string(),
        "https://docs.example.net/#start"
          .to_string()
      )]
    );
  }

  #[test]
  fn data_dir_override_is_created() {
    let temp = tempdir().expect("tempdir");
    let target = temp.path().join("nested/data");
    let dir = Config::defaults()
      .data_dir(Some(&target))
      .expect("resolve data dir");
    assert_eq!(dir, target);
    assert!(target.is_dir());
  }
}
