//! Daily log files, one directory per context.
//!
//! Layout: `<folder>/<context>/<YYYY-MM-DD>.<txt|html>`. Files are opened in
//! append mode, so a restarted bot continues the day's file. HTML files get
//! the page header once, when first created; `</body>` and `</html>` are
//! optional end tags in HTML, so a file stays valid however it is cut off.
//!
//! At most [`DEFAULT_MAX_OPEN`] files are held open. When the table is full
//! the least recently written file is closed, and every file from an earlier
//! date is closed as soon as a record for a new date arrives.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::debug;

use super::{LogFormat, LogRecord, LogSink};

/// Open file handles kept by default.
pub const DEFAULT_MAX_OPEN: usize = 32;

const HTML_HEADER: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <title>{title}</title>
    <link href="/static/css/stylesheet.css" rel="stylesheet" type="text/css" />
  </head>
  <body>
"#;

struct OpenLog {
    date: NaiveDate,
    last_used: u64,
    writer: BufWriter<File>,
}

/// Writes records to per-context daily files under a folder.
pub struct FileSink {
    folder: PathBuf,
    format: LogFormat,
    max_open: usize,
    today: Option<NaiveDate>,
    clock: u64,
    open: HashMap<String, OpenLog>,
}

impl FileSink {
    /// Sink rooted at `folder`. Nothing is created until the first write.
    pub fn new(folder: impl Into<PathBuf>, format: LogFormat) -> Self {
        Self {
            folder: folder.into(),
            format,
            max_open: DEFAULT_MAX_OPEN,
            today: None,
            clock: 0,
            open: HashMap::new(),
        }
    }

    /// Limit how many files stay open at once (at least one).
    pub fn with_max_open(mut self, max_open: usize) -> Self {
        self.max_open = max_open.max(1);
        self
    }

    /// Root folder.
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Number of files currently held open.
    pub fn open_files(&self) -> usize {
        self.open.len()
    }

    /// File a record for `context` on `date` lands in.
    pub fn path_for(&self, context: &str, date: NaiveDate) -> PathBuf {
        let extension = match self.format {
            LogFormat::Text => "txt",
            LogFormat::Html => "html",
        };
        self.folder
            .join(sanitize(context))
            .join(format!("{}.{}", date.format("%Y-%m-%d"), extension))
    }

    fn open_log(&self, context: &str, date: NaiveDate) -> io::Result<OpenLog> {
        let path = self.path_for(context, date);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let fresh = file.metadata()?.len() == 0;
        let mut writer = BufWriter::new(file);

        if fresh && self.format == LogFormat::Html {
            let title = escape_html(&format!("{} {}", context, date.format("%Y-%m-%d")));
            writer.write_all(HTML_HEADER.replace("{title}", &title).as_bytes())?;
        }

        debug!(path = %path.display(), "opened log file");
        Ok(OpenLog {
            date,
            last_used: self.clock,
            writer,
        })
    }

    /// Close every file from a date other than `date`.
    fn rotate(&mut self, date: NaiveDate) -> io::Result<()> {
        if self.today == Some(date) {
            return Ok(());
        }
        self.today = Some(date);

        let stale: Vec<String> = self
            .open
            .iter()
            .filter(|(_, log)| log.date != date)
            .map(|(context, _)| context.clone())
            .collect();
        for context in stale {
            self.close(&context)?;
        }
        Ok(())
    }

    /// Close the least recently written file.
    fn evict(&mut self) -> io::Result<()> {
        let oldest = self
            .open
            .iter()
            .min_by_key(|(_, log)| log.last_used)
            .map(|(context, _)| context.clone());
        match oldest {
            Some(context) => self.close(&context),
            None => Ok(()),
        }
    }

    fn close(&mut self, context: &str) -> io::Result<()> {
        if let Some(mut log) = self.open.remove(context) {
            debug!(context, date = %log.date, "closing log file");
            log.writer.flush()?;
        }
        Ok(())
    }

    fn format_line(&self, record: &LogRecord) -> String {
        let time = record.timestamp.format("%H:%M:%S");
        match self.format {
            LogFormat::Text => format!("[{}] {}\n", time, record.render()),
            LogFormat::Html => format!(
                "    <div class=\"{}\"><span class=\"time\">[{}]</span> {}</div>\n",
                record.kind,
                time,
                escape_html(&record.render())
            ),
        }
    }
}

impl LogSink for FileSink {
    fn write(&mut self, record: &LogRecord) -> io::Result<()> {
        let context = record.context();
        let date = record.timestamp.date_naive();
        self.rotate(date)?;

        let current = matches!(self.open.get(&context), Some(log) if log.date == date);
        if !current {
            self.close(&context)?;
            while self.open.len() >= self.max_open {
                self.evict()?;
            }
            let log = self.open_log(&context, date)?;
            self.open.insert(context.clone(), log);
        }

        self.clock += 1;
        let line = self.format_line(record);
        let log = self
            .open
            .get_mut(&context)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "log file not open"))?;
        log.last_used = self.clock;
        log.writer.write_all(line.as_bytes())?;
        log.writer.flush()
    }

    fn flush(&mut self) -> io::Result<()> {
        for log in self.open.values_mut() {
            log.writer.flush()?;
        }
        Ok(())
    }
}

/// Make a context name safe to use as one path component.
fn sanitize(context: &str) -> String {
    let cleaned: String = context
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' | ':' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    match cleaned.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Event, EventKind};
    use chrono::{Local, TimeZone};

    fn at(y: i32, m: u32, d: u32, h: u32) -> chrono::DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, h, 0, 0).single().unwrap()
    }

    fn join(ts: chrono::DateTime<Local>, channel: &str) -> LogRecord {
        let event = Event::new(EventKind::Join, "alice!alice@host", channel, Vec::<String>::new());
        LogRecord::at(ts, &event).with_text(format!("alice (alice@host) has joined {}", channel))
    }

    #[test]
    fn test_text_lines_appended_per_channel_and_day() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileSink::new(dir.path(), LogFormat::Text);

        sink.write(&join(at(2024, 3, 1, 10), "#Rust")).unwrap();
        sink.write(&join(at(2024, 3, 1, 11), "#rust")).unwrap();
        sink.write(&join(at(2024, 3, 2, 9), "#rust")).unwrap();

        let day1 = dir.path().join("#rust").join("2024-03-01.txt");
        let content = fs::read_to_string(day1).unwrap();
        assert_eq!(
            content,
            "[10:00:00] alice (alice@host) has joined #Rust\n\
             [11:00:00] alice (alice@host) has joined #rust\n"
        );
        assert!(dir.path().join("#rust").join("2024-03-02.txt").exists());
    }

    #[test]
    fn test_html_header_written_once_and_escaped() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileSink::new(dir.path(), LogFormat::Html);

        let event = Event::new(EventKind::PubMsg, "bob!b@h", "#web", ["<b>hi</b>"]);
        let rec = LogRecord::at(at(2024, 3, 1, 12), &event).with_text("bob: <b>hi</b>");
        sink.write(&rec).unwrap();
        sink.write(&rec).unwrap();

        let content = fs::read_to_string(dir.path().join("#web").join("2024-03-01.html")).unwrap();
        assert_eq!(content.matches("<!DOCTYPE").count(), 1);
        assert!(content.contains("<title>#web 2024-03-01</title>"));
        assert!(content.contains("bob: &lt;b&gt;hi&lt;/b&gt;"));
        assert_eq!(content.matches("class=\"pubmsg\"").count(), 2);
    }

    #[test]
    fn test_reopen_appends_without_second_header() {
        let dir = tempfile::tempdir().unwrap();
        let rec = join(at(2024, 3, 1, 10), "#c");

        FileSink::new(dir.path(), LogFormat::Html).write(&rec).unwrap();
        FileSink::new(dir.path(), LogFormat::Html).write(&rec).unwrap();

        let content = fs::read_to_string(dir.path().join("#c").join("2024-03-01.html")).unwrap();
        assert_eq!(content.matches("<!DOCTYPE").count(), 1);
        assert_eq!(content.matches("has joined").count(), 2);
    }

    fn privmsg(ts: chrono::DateTime<Local>, nick: &str) -> LogRecord {
        let event = Event::new(EventKind::PrivMsg, format!("{nick}!u@h"), "logbot", ["hi"]);
        LogRecord::at(ts, &event)
    }

    #[test]
    fn test_open_files_bounded_across_many_senders() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileSink::new(dir.path(), LogFormat::Text).with_max_open(8);
        let ts = at(2024, 3, 1, 10);

        for i in 0..2000 {
            sink.write(&privmsg(ts, &format!("nick{i}"))).unwrap();
            assert!(sink.open_files() <= 8);
        }
        // evicted files are reopened in append mode
        sink.write(&privmsg(ts, "nick0")).unwrap();

        let first = fs::read_to_string(dir.path().join("nick0").join("2024-03-01.txt")).unwrap();
        assert_eq!(first.lines().count(), 2);
        let last = dir.path().join("nick1999").join("2024-03-01.txt");
        assert_eq!(fs::read_to_string(last).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_day_change_closes_previous_day() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileSink::new(dir.path(), LogFormat::Text);

        sink.write(&join(at(2024, 3, 1, 10), "#a")).unwrap();
        sink.write(&join(at(2024, 3, 1, 11), "#b")).unwrap();
        sink.write(&privmsg(at(2024, 3, 1, 12), "bob")).unwrap();
        assert_eq!(sink.open_files(), 3);

        sink.write(&join(at(2024, 3, 2, 0), "#a")).unwrap();
        assert_eq!(sink.open_files(), 1);
    }

    #[test]
    fn test_html_header_is_html5() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileSink::new(dir.path(), LogFormat::Html);
        sink.write(&join(at(2024, 3, 1, 10), "#c")).unwrap();

        let content = fs::read_to_string(dir.path().join("#c").join("2024-03-01.html")).unwrap();
        assert!(content.starts_with("<!DOCTYPE html>\n"));
        assert!(!content.contains("XHTML"));
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("#a/b"), "#a_b");
        assert_eq!(sanitize(".."), "_");
        assert_eq!(sanitize(""), "_");
        assert_eq!(sanitize("#ok"), "#ok");
    }
}
