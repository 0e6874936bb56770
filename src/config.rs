use std::path::Path;

use anyhow::anyhow;
use config::{Config, File};
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// How long a lone create/delete event stays pending before it is
    /// treated as a genuine create/delete rather than half of a rename.
    pub detection_window_ms: u64,
    /// Navigation config filename. Empty means probe `docs.json` then
    /// `mint.json` at the project root.
    pub navigation_file: String,
    /// Directory names excluded from project scans.
    pub ignored_dirs: Vec<String>,
}

impl Settings {
    pub fn new(root_dir: &Path) -> anyhow::Result<Settings> {
        let expanded = shellexpand::tilde("~/.config/mintsync/settings");
        let settings = Config::builder()
            .add_source(File::with_name(&expanded).required(false))
            .add_source(
                File::with_name(&format!(
                    "{}/.mintsync",
                    root_dir
                        .to_str()
                        .ok_or(anyhow!("Can't convert root_dir to str"))?
                ))
                .required(false),
            )
            .set_default("detection_window_ms", 1000u64)?
            .set_default("navigation_file", "")?
            .set_default("ignored_dirs", vec!["node_modules".to_string()])?
            .build()
            .map_err(|err| anyhow!("Build err: {err}"))?;

        let settings = settings.try_deserialize::<Settings>()?;

        anyhow::Ok(settings)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            detection_window_ms: 1000,
            navigation_file: "".to_string(),
            ignored_dirs: vec!["node_modules".to_string()],
        }
    }
}
