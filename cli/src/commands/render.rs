use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use countymap::{MapSession, PaintOutcome, PointerEvent, PointerKind, SvgSurface};

use crate::cli::{Cli, RenderArgs};

fn resolve(session: &MapSession<SvgSurface>, query: &str, flag: &str) -> Result<countymap::Fips> {
    session.resolve_county(query)
        .ok_or_else(|| anyhow!("[render] --{flag}: no county matches {query:?}"))
}

pub fn run(cli: &Cli, args: &RenderArgs) -> Result<()> {
    let mut session = super::open_session(cli, &args.data, SvgSurface::new(args.width, 10))?;
    if let Some(err) = session.geometry().error() {
        bail!("[render] cannot draw without geometry: {err}");
    }

    if let Some(overlay) = args.overlay {
        session.set_overlay(overlay)?;
    }
    let overlay = session.state().overlay();
    match session.last_paint() {
        PaintOutcome::Applied { colored } => {
            eprintln!("[render] {} overlay: {colored} counties colored", overlay.to_str());
        }
        outcome => eprintln!("[render] {} overlay not painted ({}); using base fill", overlay.to_str(), outcome.to_str()),
    }

    if let Some(query) = &args.hover {
        let fips = resolve(&session, query, "hover")?;
        session.handle_pointer(PointerEvent::moved(fips))?;
    }
    if let Some((lon, lat)) = args.hover_at {
        session.handle_pointer_at(PointerKind::Move, lon, lat)?;
        if session.state().hovered().is_none() {
            eprintln!("[render] --hover-at {lon},{lat}: no county at this position");
        }
    }
    if let Some(query) = &args.select {
        let fips = resolve(&session, query, "select")?;
        session.handle_pointer(PointerEvent::click(fips))?;
    }
    if let Some(detail) = session.detail() {
        print!("{}", detail.render_text());
    }

    let output = args.output.clone().unwrap_or_else(|| PathBuf::from("map.svg"));
    session.surface().write_to_file(&output)
        .with_context(|| format!("[render] failed to write {}", output.display()))?;
    eprintln!("[render] wrote {}", output.display());

    Ok(())
}
