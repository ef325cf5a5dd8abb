use std::{collections::HashMap, path::Path};

use anyhow::anyhow;
use config::{Config, File};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Section name of the client-side settings (`citation.bibliographies`).
pub const CONFIGURATION_SECTION: &str = "citation";

pub const DEFAULT_BIBLIOGRAPHIES: [&str; 1] = ["~/*.bib"];

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Bibliography files or globs. Paths starting with `.` are relative to
    /// each workspace folder.
    pub bibliographies: Vec<String>,
}

impl Settings {
    /// Settings from the user and workspace settings files, falling back to the defaults.
    pub fn new(root_dir: Option<&Path>) -> anyhow::Result<Settings> {
        let expanded = shellexpand::tilde("~/.config/citekey/settings");
        let mut builder = Config::builder()
            .add_source(File::with_name(&expanded).required(false))
            .set_default("bibliographies", DEFAULT_BIBLIOGRAPHIES.to_vec())?;

        if let Some(root_dir) = root_dir {
            builder = builder.add_source(
                File::with_name(&format!(
                    "{}/.citekey",
                    root_dir
                        .to_str()
                        .ok_or(anyhow!("Can't convert root_dir to str"))?
                ))
                .required(false),
            );
        }

        let settings = builder
            .build()
            .map_err(|err| anyhow!("Build err: {err}"))?;

        let settings = settings.try_deserialize::<Settings>()?;

        anyhow::Ok(settings)
    }

    /// Overlay settings sent by the client.
    pub fn apply(&mut self, client: ClientSettings) {
        if !client.unknown.is_empty() {
            debug!(
                "Ignoring unknown settings: {:?}",
                client.unknown.keys().collect::<Vec<_>>()
            );
        }
        if let Some(bibliographies) = client.bibliographies {
            self.bibliographies = bibliographies;
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            bibliographies: DEFAULT_BIBLIOGRAPHIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// The `citation` section as sent by the client.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
pub struct ClientSettings {
    pub bibliographies: Option<Vec<String>>,
    #[serde(flatten)]
    unknown: HashMap<String, Value>,
}

impl ClientSettings {
    /// Decode the contents of the `citation` section. `null` means the client
    /// has no such settings.
    pub fn from_section(value: Value) -> Option<ClientSettings> {
        if value.is_null() {
            return None;
        }

        serde_json::from_value(value)
            .map_err(|err| warn!("Ignoring malformed {CONFIGURATION_SECTION} settings: {err}"))
            .ok()
    }

    /// Decode the `citation` section out of a full settings object, as pushed
    /// by `workspace/didChangeConfiguration`.
    pub fn from_settings(settings: Value) -> Option<ClientSettings> {
        match settings {
            Value::Object(mut sections) => {
                ClientSettings::from_section(sections.remove(CONFIGURATION_SECTION)?)
            }
            other => {
                warn!("Ignoring settings that are not an object: {other}");
                None
            }
        }
    }
}
