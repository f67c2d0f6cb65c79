use super::{AppContext, PadCommand};
use urlpad::error::{Result, UrlPadError};
use urlpad::pad::Pad;

#[derive(Debug, Clone)]
pub struct DeleteCommand {
    pub index: usize,
}

impl PadCommand for DeleteCommand {
    fn execute(&self, ctx: &AppContext) -> Result<()> {
        let (mut pad, _) = Pad::open(ctx.pad_path, ctx.config.decode_policy)?;
        let id = pad.get_index(self.index)?.id();
        let removed = pad
            .remove(id)
            .ok_or_else(|| UrlPadError::EntryNotFound(format!("#{}", self.index)))?;
        pad.save()?;
        eprintln!("Deleted {}. {}", self.index, removed.url);
        Ok(())
    }
}
