use super::{AppContext, PadCommand};
use crate::fetch_ui::{self, ConsoleSink, Summary};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use urlpad::error::Result;
use urlpad::session::PadSession;

/// Reload the pad and re-derive every snapshot
#[derive(Debug, Clone)]
pub struct RefreshCommand;

impl PadCommand for RefreshCommand {
    fn execute(&self, ctx: &AppContext) -> Result<()> {
        let folder = match ctx.pad_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => ".".into(),
        };
        let spinner = fetch_ui::new_spinner("Refreshing snapshots");
        let summary = Rc::new(RefCell::new(Summary::default()));
        let sink = ConsoleSink::new(spinner.clone(), folder, 0, ctx.no_color, Rc::clone(&summary));

        let mut session = PadSession::open(ctx.pad_path, ctx.config, Box::new(sink))?;
        fetch_ui::wait_with_spinner(&mut session, &spinner, super::add::wait_limit(ctx));
        let pad = session.finish(Duration::ZERO);
        spinner.finish_and_clear();
        pad.save()?;

        let summary = summary.borrow();
        eprintln!(
            "Refreshed {} entries, {} snapshot(s) fell back to the placeholder",
            summary.added, summary.snapshots_failed
        );
        if summary.skipped_records > 0 {
            eprintln!("{} stored record(s) could not be read and were dropped", summary.skipped_records);
        }
        Ok(())
    }
}
