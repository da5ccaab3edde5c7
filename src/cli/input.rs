//! URL input handling for the grab-dl CLI
//!
//! URLs come from, in priority order: command-line arguments, a list file
//! (`downloads.txt` by default), or an interactive prompt.

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};

/// Where the URL queue came from
#[derive(Debug, Clone, PartialEq)]
pub enum UrlSource {
    Arguments,
    ListFile(String),
    Prompt,
}

/// Parses a URL list file: one URL per line, blank lines and `#` comments ignored
pub fn parse_list_file(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Splits interactive input on whitespace and/or commas
pub fn parse_prompt_input(input: &str) -> Vec<String> {
    input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reads URLs from the list file, or `None` if it does not exist
pub fn read_list_file(path: &Path) -> Result<Option<Vec<String>>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read URL list {}", path.display()))?;
    Ok(Some(parse_list_file(&contents)))
}

/// Asks the user for URLs on stderr and reads one line from `input`
pub fn prompt_for_urls(input: &mut impl BufRead) -> Result<Vec<String>> {
    eprint!("🔗 Enter URL(s) separated by spaces or commas: ");
    std::io::stderr().flush().context("Failed to flush prompt")?;

    let mut line = String::new();
    input.read_line(&mut line).context("Failed to read URLs from stdin")?;
    Ok(parse_prompt_input(&line))
}

/// Picks the URL queue: arguments first, then the list file, then the prompt
pub fn collect_urls(
    args: &[String],
    list_file: &Path,
    input: &mut impl BufRead,
) -> Result<(Vec<String>, UrlSource)> {
    if !args.is_empty() {
        return Ok((args.to_vec(), UrlSource::Arguments));
    }

    if let Some(urls) = read_list_file(list_file)? {
        if !urls.is_empty() {
            return Ok((urls, UrlSource::ListFile(list_file.display().to_string())));
        }
    }

    Ok((prompt_for_urls(input)?, UrlSource::Prompt))
}
