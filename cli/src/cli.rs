use crate::commands::{
    add::AddCommand, delete::DeleteCommand, list::ListCommand, refresh::RefreshCommand,
    tag::TagCommand, tags::TagsCommand, AppContext, CommandEnum,
};
use crate::format::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Keep a pad of web pages with titles and snapshots", long_about = None)]
pub struct Cli {
    /// Optional custom pad file path
    #[arg(long)]
    pub pad: Option<PathBuf>,

    /// Optional custom configuration file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Disable color output
    #[arg(long)]
    pub nc: bool,

    /// Show debug information
    #[arg(short = 'g', long = "debug")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch one or more URLs and add them to the pad
    Add {
        /// URLs to add
        #[arg(required = true)]
        urls: Vec<String>,

        /// Comma-separated tags for every added entry
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// Print the entries in the pad
    List {
        /// Only show entries carrying this tag
        #[arg(short, long)]
        tag: Option<String>,

        /// Print the stored JSON records instead
        #[arg(long)]
        json: bool,
    },

    /// Show every tag with the number of entries carrying it
    Tags,

    /// Edit the tags of one entry
    Tag {
        /// 1-based position in the pad
        index: usize,

        /// Comma-separated tags to add
        #[arg(short, long)]
        add: Option<String>,

        /// Tag to remove (repeatable)
        #[arg(short, long)]
        delete: Vec<String>,

        /// Remove every tag except "all"
        #[arg(long)]
        clear: bool,
    },

    /// Remove an entry from the pad
    Delete {
        /// 1-based position in the pad
        index: usize,
    },

    /// Re-derive the snapshot of every stored entry
    Refresh,
}

impl Commands {
    pub fn into_command(self, nc: bool) -> CommandEnum {
        match self {
            Commands::Add { urls, tag } => CommandEnum::Add(AddCommand { urls, tag }),
            Commands::List { tag, json } => {
                let format = if json {
                    OutputFormat::Json
                } else if nc {
                    OutputFormat::Plain
                } else {
                    OutputFormat::Colored
                };
                CommandEnum::List(ListCommand { tag, format })
            }
            Commands::Tags => CommandEnum::Tags(TagsCommand),
            Commands::Tag {
                index,
                add,
                delete,
                clear,
            } => CommandEnum::Tag(TagCommand {
                index,
                add,
                delete,
                clear,
            }),
            Commands::Delete { index } => CommandEnum::Delete(DeleteCommand { index }),
            Commands::Refresh => CommandEnum::Refresh(RefreshCommand),
        }
    }
}

pub fn handle_args(cli: Cli, ctx: &AppContext) -> urlpad::error::Result<()> {
    let command = cli.command.into_command(cli.nc);
    command.execute(ctx)
}
