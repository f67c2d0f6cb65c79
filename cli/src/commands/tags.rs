use super::{AppContext, PadCommand};
use owo_colors::OwoColorize;
use urlpad::error::Result;
use urlpad::pad::Pad;

#[derive(Debug, Clone)]
pub struct TagsCommand;

impl PadCommand for TagsCommand {
    fn execute(&self, ctx: &AppContext) -> Result<()> {
        let (pad, _) = Pad::open(ctx.pad_path, ctx.config.decode_policy)?;
        let counts = pad.tag_counts();
        if counts.is_empty() {
            eprintln!("No tags in {}.", ctx.pad_path.display());
            return Ok(());
        }

        for (tag, count) in counts {
            if ctx.no_color {
                println!("{} ({})", tag, count);
            } else {
                println!("{} ({})", tag.blue(), count);
            }
        }
        Ok(())
    }
}
