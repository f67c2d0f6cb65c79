use crate::config::Config;
use crate::error::{Result, UrlPadError};
use reqwest::blocking::Client;
use reqwest::Url;
use std::time::Duration;
use tl::ParserOptions;

/// Text extracted from a fetched page
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageSummary {
    /// URL after redirects
    pub url: String,
    pub title: String,
    /// Text of the first `<p>` in document order
    pub description: String,
}

/// Anything that can turn a URL into a [`PageSummary`]
pub trait PageSource: Send + Sync {
    fn fetch(&self, url: &str) -> Result<PageSummary>;
}

/// Blocking HTTP fetcher with a browser-like user agent
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(8))
            .build()?;
        Ok(Self { client })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.user_agent,
            Duration::from_secs(config.fetch_timeout_secs),
        )
    }
}

impl PageSource for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<PageSummary> {
        let url = normalize_url(url)?;
        let resp = self.client.get(url.clone()).send()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(UrlPadError::remote_status(url.as_str(), status.as_u16()));
        }

        let final_url = resp.url().to_string();
        let body = resp.text()?;

        let mut summary = parse_html(&body)?;
        summary.url = final_url;
        Ok(summary)
    }
}

/// Parse a user-supplied URL, assuming https when the scheme is missing
pub fn normalize_url(url: &str) -> Result<Url> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(UrlPadError::Network("empty URL".to_string()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let parsed = Url::parse(&candidate)
        .map_err(|e| UrlPadError::Network(format!("invalid URL '{}': {}", trimmed, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(UrlPadError::Network(format!(
            "unsupported scheme '{}' in {}",
            other, trimmed
        ))),
    }
}

/// Parse HTML content and extract the title and first paragraph
pub fn parse_html(html: &str) -> Result<PageSummary> {
    let dom = tl::parse(html, ParserOptions::default())?;
    let parser = dom.parser();

    let title = first_text(&dom, parser, "title");
    let description = first_text(&dom, parser, "p");

    Ok(PageSummary {
        url: String::new(), // Filled in by the fetcher
        title,
        description,
    })
}

fn first_text(dom: &tl::VDom, parser: &tl::Parser, selector: &str) -> String {
    dom.query_selector(selector)
        .and_then(|mut iter| iter.next())
        .and_then(|handle| handle.get(parser))
        .map(|node| clean_text(&node.inner_text(parser)))
        .unwrap_or_default()
}

/// Collapse whitespace runs and decode the common entities
fn clean_text(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    decode_entities(&collapsed)
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let decoded = tail.find(';').filter(|end| *end <= 10).and_then(|end| {
            let name = &tail[1..end];
            let ch = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" | "#39" => Some('\''),
                "nbsp" => Some(' '),
                _ => numeric_entity(name),
            };
            ch.map(|c| (c, end))
        });

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn numeric_entity(name: &str) -> Option<char> {
    let digits = name.strip_prefix('#')?;
    let code = if let Some(hex) = digits.strip_prefix('x').or_else(|| digits.strip_prefix('X')) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        digits.parse().ok()?
    };
    char::from_u32(code)
}
