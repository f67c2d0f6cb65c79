use super::{AppContext, PadCommand};
use crate::fetch_ui::{self, ConsoleSink, Summary};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use urlpad::error::Result;
use urlpad::pad::Pad;
use urlpad::pipeline::Services;
use urlpad::session::PadSession;
use urlpad::tags;

#[derive(Debug, Clone)]
pub struct AddCommand {
    pub urls: Vec<String>,
    pub tag: Option<String>,
}

impl PadCommand for AddCommand {
    fn execute(&self, ctx: &AppContext) -> Result<()> {
        let (pad, failures) = Pad::open(ctx.pad_path, ctx.config.decode_policy)?;
        for failure in &failures {
            eprintln!("Skipped stored record: {}", failure);
        }
        let existing = pad.len();
        let folder = pad.folder();

        let spinner = fetch_ui::new_spinner(&format!("Fetching {} URL(s)", self.urls.len()));
        let summary = Rc::new(RefCell::new(Summary::default()));
        let sink = ConsoleSink::new(
            spinner.clone(),
            folder,
            existing,
            ctx.no_color,
            Rc::clone(&summary),
        );
        let mut session = PadSession::new(pad, Services::from_config(ctx.config)?, Box::new(sink))?;

        let tags = self.tag.as_deref().map(tags::parse_tags).unwrap_or_default();
        for url in &self.urls {
            if let Err(e) = session.add_url(url, &tags) {
                spinner.suspend(|| eprintln!("Skipping '{}': {}", url, e));
            }
        }

        let done = fetch_ui::wait_with_spinner(&mut session, &spinner, wait_limit(ctx));
        if !done {
            spinner.set_message("Waiting for remaining snapshots");
        }
        let pad = session.finish(Duration::ZERO);
        spinner.finish_and_clear();
        pad.save()?;

        let summary = summary.borrow();
        eprintln!(
            "Added {} of {} URL(s) to {}",
            summary.added,
            self.urls.len(),
            ctx.pad_path.display()
        );
        if summary.snapshots_failed > 0 {
            eprintln!("{} snapshot(s) fell back to the placeholder", summary.snapshots_failed);
        }
        Ok(())
    }
}

/// How long to show progress before blocking on the pools
pub fn wait_limit(ctx: &AppContext) -> Duration {
    Duration::from_secs(ctx.config.fetch_timeout_secs.saturating_mul(3).max(10))
}
