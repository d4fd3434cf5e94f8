use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

pub const DEFAULT_LINKS_FILE: &str = "album_links.txt";

/// Resolves the filename typed by the user: empty means the default, and `.txt` is enforced.
pub fn normalize_filename(input: &str) -> String {
    let name = input.trim();
    if name.is_empty() {
        return DEFAULT_LINKS_FILE.to_string();
    }
    if name.ends_with(".txt") {
        name.to_string()
    } else {
        format!("{name}.txt")
    }
}

/// Writes one entry per line, replacing any existing file.
pub fn save_links<S: AsRef<str>>(path: &Path, urls: &[S]) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for url in urls {
        writeln!(writer, "{}", url.as_ref())?;
    }
    writer.flush()
}

/// Reads the links of a file: trimmed lines starting with `http`. Comments and other lines are skipped.
pub fn read_links(path: &Path) -> io::Result<Vec<String>> {
    let reader = BufReader::new(File::open(path)?);
    let mut links = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.starts_with("http") {
            links.push(line.to_string());
        }
    }
    Ok(links)
}

pub fn links_file_exists(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}
