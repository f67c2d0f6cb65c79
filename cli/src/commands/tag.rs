use super::{AppContext, PadCommand};
use urlpad::error::{Result, UrlPadError};
use urlpad::models::Entry;
use urlpad::pad::Pad;
use urlpad::tags;

#[derive(Debug, Clone)]
pub struct TagCommand {
    pub index: usize,
    pub add: Option<String>,
    pub delete: Vec<String>,
    pub clear: bool,
}

impl TagCommand {
    /// Apply the edits in order: clear, delete, add
    fn apply(&self, entry: &mut Entry) -> Result<()> {
        if self.add.is_none() && self.delete.is_empty() && !self.clear {
            return Err(UrlPadError::InvalidInput(
                "nothing to do, use --add, --delete or --clear".to_string(),
            ));
        }

        if self.clear {
            entry.clear_tags();
        }
        for tag in &self.delete {
            if !entry.delete_tag(tag) {
                eprintln!("Tag '{}' not on entry {}", tag, self.index);
            }
        }
        if let Some(add) = &self.add {
            for tag in tags::parse_tags(add) {
                entry.add_tag(&tag);
            }
        }
        Ok(())
    }
}

impl PadCommand for TagCommand {
    fn execute(&self, ctx: &AppContext) -> Result<()> {
        let (mut pad, _) = Pad::open(ctx.pad_path, ctx.config.decode_policy)?;
        let entry = pad.get_index_mut(self.index)?;
        self.apply(entry)?;

        let shown: Vec<&str> = entry.tags.iter().collect();
        eprintln!("{}. {}: {}", self.index, entry.url, shown.join(", "));
        pad.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;
    use urlpad::config::Config;

    fn entry(tags: &[&str]) -> Entry {
        let mut entry = Entry::new("https://example.com");
        for tag in tags {
            entry.add_tag(tag);
        }
        entry
    }

    fn cmd(add: Option<&str>, delete: &[&str], clear: bool) -> TagCommand {
        TagCommand {
            index: 1,
            add: add.map(str::to_string),
            delete: delete.iter().map(|s| s.to_string()).collect(),
            clear,
        }
    }

    #[rstest]
    #[case(cmd(Some("rust, web"), &[], false), vec!["all", "old", "rust", "web"])]
    #[case(cmd(None, &["old"], false), vec!["all"])]
    #[case(cmd(None, &["all"], false), vec!["all", "old"])]
    #[case(cmd(Some("new"), &[], true), vec!["all", "new"])]
    #[case(cmd(Some("old"), &["old"], false), vec!["all", "old"])]
    fn test_apply(#[case] cmd: TagCommand, #[case] expected: Vec<&str>) {
        let mut entry = entry(&["old"]);
        cmd.apply(&mut entry).unwrap();
        assert_eq!(entry.tags.iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_apply_requires_an_edit() {
        let mut entry = entry(&[]);
        assert!(matches!(
            cmd(None, &[], false).apply(&mut entry),
            Err(UrlPadError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_execute_saves_pad() {
        let dir = TempDir::new().unwrap();
        let pad_path = dir.path().join("pad.json");
        let mut pad = Pad::new(&pad_path);
        pad.push(entry(&[]));
        pad.save().unwrap();

        let config = Config::default();
        let ctx = AppContext {
            config: &config,
            pad_path: &pad_path,
            no_color: true,
        };
        cmd(Some("saved"), &[], false).execute(&ctx).unwrap();

        let (pad, _) = Pad::open(&pad_path, config.decode_policy).unwrap();
        assert!(pad.get_index(1).unwrap().tags.contains("saved"));

        let missing = TagCommand { index: 7, ..cmd(Some("x"), &[], false) };
        assert!(matches!(
            missing.execute(&ctx),
            Err(UrlPadError::EntryNotFound(_))
        ));
    }
}
