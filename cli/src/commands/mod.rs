pub mod inspect;
pub mod legend;
pub mod render;

use anyhow::Result;
use countymap::{DataPaths, FileConfig, MapSession, MapSurface, load_all, load_map_config};

use crate::cli::{Cli, DataArgs};

impl DataArgs {
    pub fn paths(&self, files: &FileConfig) -> DataPaths {
        DataPaths {
            geometry: self.geometry.clone().unwrap_or_else(|| self.data_dir.join(&files.geometry)),
            demographics: self.demographics.clone().unwrap_or_else(|| self.data_dir.join(&files.demographics)),
            elections: self.elections.clone().unwrap_or_else(|| self.data_dir.join(&files.elections)),
        }
    }
}

/// Load the configuration and the three data files into a new session.
/// Failed loads are reported and leave their dataset empty.
pub fn open_session<S: MapSurface>(cli: &Cli, data: &DataArgs, surface: S) -> Result<MapSession<S>> {
    let config = load_map_config(cli.config.as_deref());
    let paths = data.paths(&config.files);
    let mut session = MapSession::new(config, surface);

    let loaded = load_all(&paths);
    session.set_geometry(loaded.geometry)?;
    session.set_demographics(loaded.demographics)?;
    session.set_elections(loaded.elections)?;

    for err in session.load_errors() {
        eprintln!("[load] {err}");
    }

    Ok(session)
}
