//! Runtime configuration for the Quill server binary.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Environment variables with this prefix override file settings, e.g.
/// `QUILL_PORT=9000`.
pub const ENV_PREFIX: &str = "QUILL";

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and the
/// environment. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                      String,
  #[serde(default = "default_port")]
  pub port:                      u16,
  #[serde(default = "default_store_path")]
  pub store_path:                PathBuf,
  /// Per-post count lookups in flight when the batched count is unavailable.
  #[serde(default = "default_count_concurrency")]
  pub comment_count_concurrency: usize,
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("quill.db") }
fn default_count_concurrency() -> usize { 16 }

impl Default for ServerConfig {
  fn default() -> Self {
    ServerConfig {
      host:                      default_host(),
      port:                      default_port(),
      store_path:                default_store_path(),
      comment_count_concurrency: default_count_concurrency(),
    }
  }
}

impl ServerConfig {
  /// Layer the optional file at `path` under `QUILL_*` environment variables.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix(ENV_PREFIX))
      .build()?
      .try_deserialize()
  }

  /// `host:port`, ready for binding.
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// The store path with a leading `~` expanded.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
