use std::path::Path;
use urlpad::config::Config;
use urlpad::error::Result;

pub struct AppContext<'a> {
    pub config: &'a Config,
    pub pad_path: &'a Path,
    pub no_color: bool,
}

pub mod add;
pub mod delete;
pub mod list;
pub mod refresh;
pub mod tag;
pub mod tags;

pub trait PadCommand {
    fn execute(&self, ctx: &AppContext) -> Result<()>;
}

/// Enum-based dispatch for commands (avoids Box<dyn PadCommand>)
pub enum CommandEnum {
    Add(add::AddCommand),
    List(list::ListCommand),
    Tags(tags::TagsCommand),
    Tag(tag::TagCommand),
    Delete(delete::DeleteCommand),
    Refresh(refresh::RefreshCommand),
}

impl CommandEnum {
    pub fn execute(&self, ctx: &AppContext) -> Result<()> {
        match self {
            Self::Add(cmd) => cmd.execute(ctx),
            Self::List(cmd) => cmd.execute(ctx),
            Self::Tags(cmd) => cmd.execute(ctx),
            Self::Tag(cmd) => cmd.execute(ctx),
            Self::Delete(cmd) => cmd.execute(ctx),
            Self::Refresh(cmd) => cmd.execute(ctx),
        }
    }
}
