use std::collections::HashMap;
use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use tracing::{
  debug,
  info,
  trace,
  warn
};

#[derive(Debug, Clone)]
pub struct Config {
  map: HashMap<String, String>,
  pub loaded_files: Vec<PathBuf>
}

impl Config {
  #[tracing::instrument(skip(
    slaterc_override
  ))]
  pub fn load(
    slaterc_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Config {
      map:          HashMap::new(),
      loaded_files: vec![]
    };

    cfg.map.insert(
      "store.url".to_string(),
      "https://demo.supabase.co"
        .to_string()
    );
    cfg.map.insert(
      "store.key".to_string(),
      "demo_key".to_string()
    );
    cfg.map.insert(
      "default.command".to_string(),
      "list".to_string()
    );
    cfg.map.insert(
      "default.filter".to_string(),
      "all".to_string()
    );
    cfg.map.insert(
      "color".to_string(),
      "on".to_string()
    );

    let slaterc = resolve_slaterc_path(
      slaterc_override
    )?;
    if let Some(path) = slaterc {
      info!(slaterc = %path.display(), "loading slaterc");
      cfg.load_file(&path)?;
    } else {
      warn!(
        "no slaterc found; using \
         defaults"
      );
    }

    Ok(cfg)
  }

  #[tracing::instrument(skip(
    self, vars
  ))]
  pub fn apply_env<I>(
    &mut self,
    vars: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (name, value) in vars {
      let key = match name.as_str() {
        | "SLATE_SUPABASE_URL" => {
          "store.url"
        }
        | "SLATE_SUPABASE_KEY" => {
          "store.key"
        }
        | _ => continue
      };
      debug!(env = %name, key = %key, "applying environment value");
      self
        .map
        .insert(key.to_string(), value);
    }
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k
        .strip_prefix("rc.")
        .unwrap_or(&k)
        .to_string();
      debug!(key = %key, value = %v, "applying override");
      self.map.insert(key, v);
    }
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self.map.get(key).cloned()
  }

  pub fn iter(
    &self
  ) -> impl Iterator<Item = (&String, &String)>
  {
    self.map.iter()
  }

  #[tracing::instrument(skip(self))]
  fn load_file(
    &mut self,
    path: &Path
  ) -> anyhow::Result<()> {
    let path = expand_tilde(path);
    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;

    self
      .loaded_files
      .push(path.clone());

    let base_dir = path
      .parent()
      .map(|p| p.to_path_buf())
      .unwrap_or_else(|| {
        PathBuf::from(".")
      });

    for (line_num, raw_line) in
      text.lines().enumerate()
    {
      let mut line = raw_line.trim();
      if line.is_empty()
        || line.starts_with('#')
      {
        continue;
      }

      if let Some((before, _)) =
        line.split_once('#')
      {
        line = before.trim();
      }

      if line.is_empty() {
        continue;
      }

      if let Some(include_rest) =
        line.strip_prefix("include ")
      {
        let include_path =
          resolve_include_path(
            &base_dir,
            include_rest.trim()
          )?;
        debug!(
            file = %path.display(),
            include = %include_path.display(),
            line = line_num + 1,
            "processing include"
        );

        if include_path.exists() {
          self
            .load_file(&include_path)?;
        } else {
          warn!(include = %include_path.display(), "include file does not exist; skipping");
        }
        continue;
      }

      let (k, v) = line
        .split_once('=')
        .ok_or_else(|| {
          anyhow!(
            "invalid config line \
             {}:{}: {}",
            path.display(),
            line_num + 1,
            raw_line
          )
        })?;

      let key = k.trim().to_string();
      let value = v.trim().to_string();
      trace!(key = %key, value = %value, "loaded config key");
      self.map.insert(key, value);
    }

    Ok(())
  }
}

#[tracing::instrument(skip(
  override_path
))]
fn resolve_slaterc_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    return Ok(Some(path.to_path_buf()));
  }

  if let Ok(slaterc_env) =
    std::env::var("SLATERC")
  {
    if slaterc_env == "/dev/null" {
      return Ok(None);
    }
    return Ok(Some(PathBuf::from(
      slaterc_env
    )));
  }

  let home = dirs::home_dir()
    .ok_or_else(|| {
      anyhow!(
        "cannot determine home \
         directory"
      )
    })?;
  let candidate = home.join(".slaterc");
  if candidate.exists() {
    return Ok(Some(candidate));
  }

  Ok(None)
}

fn resolve_include_path(
  base_dir: &Path,
  include: &str
) -> anyhow::Result<PathBuf> {
  if include.trim().is_empty() {
    return Err(anyhow!(
      "include path cannot be empty"
    ));
  }

  let raw = PathBuf::from(include);
  let expanded = expand_tilde(&raw);
  if expanded.is_absolute() {
    Ok(expanded)
  } else {
    Ok(base_dir.join(expanded))
  }
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use std::fs;

  use tempfile::tempdir;

  use super::Config;

  #[test]
  fn defaults_cover_store_and_view_keys()
   {
    let temp =
      tempdir().expect("tempdir");
    let rc = temp.path().join("slaterc");
    fs::write(&rc, "")
      .expect("write empty rc");

    let cfg = Config::load(Some(&rc))
      .expect("load config");

    assert_eq!(
      cfg.get("store.url").as_deref(),
      Some("https://demo.supabase.co")
    );
    assert_eq!(
      cfg.get("store.key").as_deref(),
      Some("demo_key")
    );
    assert_eq!(
      cfg
        .get("default.command")
        .as_deref(),
      Some("list")
    );
    assert_eq!(
      cfg
        .get("default.filter")
        .as_deref(),
      Some("all")
    );
    assert_eq!(
      cfg.get("color").as_deref(),
      Some("on")
    );
  }

  #[test]
  fn rc_files_support_comments_and_includes()
   {
    let temp =
      tempdir().expect("tempdir");
    let sub = temp.path().join("sub.rc");
    fs::write(
      &sub,
      "default.filter = completed\n"
    )
    .expect("write sub rc");

    let rc = temp.path().join("slaterc");
    fs::write(
      &rc,
      "# main rc\n\
       store.url = https://db.example.co  # trailing\n\
       include sub.rc\n"
    )
    .expect("write rc");

    let cfg = Config::load(Some(&rc))
      .expect("load config");

    assert_eq!(
      cfg.get("store.url").as_deref(),
      Some("https://db.example.co")
    );
    assert_eq!(
      cfg
        .get("default.filter")
        .as_deref(),
      Some("completed")
    );
    assert_eq!(
      cfg.loaded_files.len(),
      2
    );
  }

  #[test]
  fn missing_includes_are_skipped() {
    let temp =
      tempdir().expect("tempdir");
    let rc = temp.path().join("slaterc");
    fs::write(
      &rc,
      "include nope.rc\ncolor = off\n"
    )
    .expect("write rc");

    let cfg = Config::load(Some(&rc))
      .expect("load config");
    assert_eq!(
      cfg.get("color").as_deref(),
      Some("off")
    );
  }

  #[test]
  fn malformed_lines_error_with_location()
   {
    let temp =
      tempdir().expect("tempdir");
    let rc = temp.path().join("slaterc");
    fs::write(&rc, "store url demo\n")
      .expect("write rc");

    let err = Config::load(Some(&rc))
      .expect_err("load should fail");
    assert!(
      err
        .to_string()
        .contains("invalid config line")
    );
  }

  #[test]
  fn overrides_and_env_rank_above_files()
   {
    let temp =
      tempdir().expect("tempdir");
    let rc = temp.path().join("slaterc");
    fs::write(
      &rc,
      "store.url = https://file.example\n"
    )
    .expect("write rc");

    let mut cfg = Config::load(Some(&rc))
      .expect("load config");

    cfg.apply_env(vec![
      (
        "SLATE_SUPABASE_URL".to_string(),
        "https://env.example".to_string()
      ),
      (
        "EDITOR".to_string(),
        "vi".to_string()
      ),
    ]);
    assert_eq!(
      cfg.get("store.url").as_deref(),
      Some("https://env.example")
    );
    assert_eq!(cfg.get("EDITOR"), None);

    cfg.apply_overrides(vec![(
      "rc.store.url".to_string(),
      "https://flag.example".to_string()
    )]);
    assert_eq!(
      cfg.get("store.url").as_deref(),
      Some("https://flag.example")
    );
  }
}
