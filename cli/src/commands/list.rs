use super::{AppContext, PadCommand};
use crate::format::OutputFormat;
use urlpad::error::Result;
use urlpad::models::Entry;
use urlpad::pad::Pad;
use urlpad::tags::ALL_TAG;

#[derive(Debug, Clone)]
pub struct ListCommand {
    pub tag: Option<String>,
    pub format: OutputFormat,
}

impl ListCommand {
    /// Entries to show with their 1-based positions
    fn select<'a>(&self, pad: &'a Pad) -> Vec<(usize, &'a Entry)> {
        let tag = self.tag.as_deref().unwrap_or(ALL_TAG);
        pad.entries()
            .iter()
            .enumerate()
            .filter(|(_, e)| e.tags.contains(tag))
            .map(|(i, e)| (i + 1, e))
            .collect()
    }
}

impl PadCommand for ListCommand {
    fn execute(&self, ctx: &AppContext) -> Result<()> {
        let (pad, failures) = Pad::open(ctx.pad_path, ctx.config.decode_policy)?;
        for failure in &failures {
            eprintln!("Skipped stored record: {}", failure);
        }

        let records = self.select(&pad);
        if records.is_empty() && self.format != OutputFormat::Json {
            match &self.tag {
                Some(tag) => eprintln!("No entries tagged '{}'.", tag),
                None => eprintln!("No entries to display."),
            }
            return Ok(());
        }

        println!("{}", self.format.render(&records, &pad.folder())?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::path::Path;

    fn pad() -> Pad {
        let mut pad = Pad::new(Path::new("pad.json"));
        for (url, tags) in [
            ("https://a.example", "rust"),
            ("https://b.example", ""),
            ("https://c.example", "rust,web"),
        ] {
            let mut entry = Entry::new(url);
            for tag in urlpad::tags::parse_tags(tags) {
                entry.add_tag(&tag);
            }
            pad.push(entry);
        }
        pad
    }

    #[rstest]
    #[case(None, vec![1, 2, 3])]
    #[case(Some("all"), vec![1, 2, 3])]
    #[case(Some("rust"), vec![1, 3])]
    #[case(Some("web"), vec![3])]
    #[case(Some("missing"), vec![])]
    fn test_select_keeps_positions(#[case] tag: Option<&str>, #[case] expected: Vec<usize>) {
        let pad = pad();
        let cmd = ListCommand {
            tag: tag.map(str::to_string),
            format: OutputFormat::Plain,
        };
        let positions: Vec<usize> = cmd.select(&pad).iter().map(|(i, _)| *i).collect();
        assert_eq!(positions, expected);
    }
}
