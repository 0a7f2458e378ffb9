use anyhow::{Result, anyhow};
use countymap::RecordingSurface;

use crate::cli::{Cli, InspectArgs};

pub fn run(cli: &Cli, args: &InspectArgs) -> Result<()> {
    let session = super::open_session(cli, &args.data, RecordingSurface::new())?;
    let fips = session.resolve_county(&args.county)
        .ok_or_else(|| anyhow!("[inspect] no county matches {:?}", args.county))?;

    print!("{}", session.detail_for(fips.as_str()).render_text());
    Ok(())
}
