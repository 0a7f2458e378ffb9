use anyhow::{Result, bail};
use countymap::RecordingSurface;

use crate::cli::{Cli, LegendArgs};

pub fn run(cli: &Cli, args: &LegendArgs) -> Result<()> {
    let mut session = super::open_session(cli, &args.data, RecordingSurface::new())?;
    if let Some(overlay) = args.overlay {
        session.set_overlay(overlay)?;
    }

    let overlay = session.state().overlay();
    let Some(legend) = session.legend() else {
        bail!("[legend] no {} data available", overlay.to_str());
    };

    print!("{}", legend.render_text());
    Ok(())
}
