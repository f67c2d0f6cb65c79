use owo_colors::OwoColorize;
use std::path::Path;
use urlpad::codec;
use urlpad::models::Entry;

pub trait Colorize {
    fn to_colored(&self) -> String;
}

/// Entry rendered with terminal colors
pub struct ColorizeEntry<'a> {
    index: usize,
    entry: &'a Entry,
    pad_folder: &'a Path,
}

impl<'a> ColorizeEntry<'a> {
    pub fn new(index: usize, entry: &'a Entry, pad_folder: &'a Path) -> Self {
        Self {
            index,
            entry,
            pad_folder,
        }
    }
}

impl<'a> Colorize for ColorizeEntry<'a> {
    fn to_colored(&self) -> String {
        let entry = self.entry;
        let mut s = String::new();
        let index = self.index.to_string();
        s.push_str(&format!(
            "{}. {} {}\n",
            index.bright_blue(),
            display_name(entry).bold().green(),
            format!("[{}]", codec::format_date(&entry.date_added)).dimmed(),
        ));
        let padding = index.len() + 3;
        s.push_str(&format!("{:>padding$} {}\n", ">".red(), entry.url.yellow()));

        if !entry.description.trim().is_empty() {
            s.push_str(&format!("{:>padding$} {}\n", "+".red(), entry.description));
        }

        let tags = user_tags(entry);
        if !tags.is_empty() {
            s.push_str(&format!("{:>padding$} {}\n", "#".red(), tags.blue()));
        }

        s.push_str(&format!(
            "{:>padding$} {}\n",
            "~".red(),
            entry.snapshot_uri(self.pad_folder).cyan()
        ));
        s
    }
}

/// Same layout as [`ColorizeEntry`] without escape codes
pub struct PlainEntry<'a> {
    index: usize,
    entry: &'a Entry,
    pad_folder: &'a Path,
}

impl<'a> PlainEntry<'a> {
    pub fn new(index: usize, entry: &'a Entry, pad_folder: &'a Path) -> Self {
        Self {
            index,
            entry,
            pad_folder,
        }
    }
}

impl<'a> Colorize for PlainEntry<'a> {
    fn to_colored(&self) -> String {
        let entry = self.entry;
        let index = self.index.to_string();
        let padding = index.len() + 3;
        let mut s = format!(
            "{}. {} [{}]\n{:>padding$} {}\n",
            index,
            display_name(entry),
            codec::format_date(&entry.date_added),
            ">",
            entry.url
        );
        if !entry.description.trim().is_empty() {
            s.push_str(&format!("{:>padding$} {}\n", "+", entry.description));
        }
        let tags = user_tags(entry);
        if !tags.is_empty() {
            s.push_str(&format!("{:>padding$} {}\n", "#", tags));
        }
        s.push_str(&format!(
            "{:>padding$} {}\n",
            "~",
            entry.snapshot_uri(self.pad_folder)
        ));
        s
    }
}

fn display_name(entry: &Entry) -> &str {
    if entry.name.trim().is_empty() {
        &entry.url
    } else {
        &entry.name
    }
}

fn user_tags(entry: &Entry) -> String {
    entry.tags.user_tags().collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use urlpad::models::{SnapshotState, PLACEHOLDER_SNAPSHOT};

    fn sample(tags: &[&str], description: &str) -> Entry {
        let mut entry = Entry::new("https://rust-lang.org");
        entry.apply_fetch(
            "Rust Programming Language".to_string(),
            description.to_string(),
        );
        for tag in tags {
            entry.add_tag(tag);
        }
        entry
    }

    #[test]
    fn test_colorize_output_structure() {
        let mut entry = sample(&["rust", "programming"], "Official Rust website");
        entry.snapshot = SnapshotState::Resolved("images/page-abc.png".to_string());
        let colorized = ColorizeEntry::new(42, &entry, Path::new("/pads")).to_colored();
        let lines: Vec<&str> = colorized.lines().collect();

        assert_eq!(lines.len(), 5);
        assert!(lines[0].contains("42"));
        assert!(lines[0].contains("Rust Programming Language"));
        assert!(lines[1].contains(">"));
        assert!(lines[1].contains("https://rust-lang.org"));
        assert!(lines[2].contains("Official Rust website"));
        assert!(lines[3].contains("programming, rust"));
        assert!(lines[4].contains("file:///pads/images/page-abc.png"));
    }

    #[test]
    fn test_sentinel_tag_not_shown() {
        let entry = sample(&[], "A page");
        let colorized = ColorizeEntry::new(1, &entry, Path::new("/pads")).to_colored();
        let has_tag_line = colorized.lines().any(|line| line.trim().starts_with('#'));
        assert!(!has_tag_line, "Should not have tag line for the sentinel alone");
    }

    #[test]
    fn test_empty_description_not_shown() {
        let entry = sample(&["rust"], "  ");
        let colorized = ColorizeEntry::new(1, &entry, Path::new("/pads")).to_colored();
        let has_desc_line = colorized.lines().any(|line| line.trim().starts_with('+'));
        assert!(!has_desc_line);
    }

    #[test]
    fn test_plain_has_no_escape_codes() {
        let entry = sample(&["rust"], "Official Rust website");
        let plain = PlainEntry::new(3, &entry, Path::new("/pads")).to_colored();
        assert!(!plain.contains('\x1b'));
        assert!(plain.starts_with("3. Rust Programming Language ["));
        assert!(plain.contains(&format!("file:///pads/{}", PLACEHOLDER_SNAPSHOT)));
    }

    #[rstest]
    #[case(1, 4)]
    #[case(42, 5)]
    #[case(999, 6)]
    fn test_plain_padding(#[case] index: usize, #[case] width: usize) {
        let entry = sample(&[], "");
        let plain = PlainEntry::new(index, &entry, Path::new("/pads")).to_colored();
        let url_line = plain.lines().nth(1).unwrap();
        assert_eq!(url_line.find('>'), Some(width - 1));
    }

    #[test]
    fn test_unnamed_entry_shows_url() {
        let entry = Entry::new("https://example.com");
        let plain = PlainEntry::new(1, &entry, Path::new(".")).to_colored();
        assert!(plain.starts_with("1. https://example.com ["));
    }
}
