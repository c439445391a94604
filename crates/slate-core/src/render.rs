use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use chrono::{DateTime, NaiveDateTime};
use unicode_width::UnicodeWidthStr;

use crate::config::Config;
use crate::filter::{Filter, Stats};
use crate::session::Notice;
use crate::task::Task;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
        let color = match color_cfg.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => true,
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        Ok(Self { color })
    }

    #[tracing::instrument(skip(self, notices))]
    pub fn print_notices(&mut self, notices: &[Notice]) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        for notice in notices {
            let code = if notice.is_error() { "31" } else { "32" };
            writeln!(out, "{}", self.paint(notice.message(), code))?;
        }

        Ok(())
    }

    #[tracing::instrument(skip(self, stats))]
    pub fn print_tabs(&mut self, active: Filter, stats: &Stats) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{}", self.tabs_line(active, stats))?;
        Ok(())
    }

    fn tabs_line(&self, active: Filter, stats: &Stats) -> String {
        let tabs = [
            (Filter::All, stats.total),
            (Filter::Active, stats.active),
            (Filter::Completed, stats.completed),
        ];

        tabs.iter()
            .map(|(tab, count)| {
                let label = format!("{} ({count})", tab.label());
                if *tab == active {
                    self.paint(&label, "1")
                } else {
                    label
                }
            })
            .collect::<Vec<_>>()
            .join("   ")
    }

    #[tracing::instrument(skip(self, tasks))]
    pub fn print_task_table(&mut self, tasks: &[&Task], active: Filter) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        if tasks.is_empty() {
            writeln!(out, "No tasks found")?;
            writeln!(out, "{}", empty_state_hint(active))?;
            return Ok(());
        }

        let headers = vec![
            "".to_string(),
            "ID".to_string(),
            "Task".to_string(),
            "Status".to_string(),
            "Created".to_string(),
        ];

        let mut rows = Vec::with_capacity(tasks.len());

        for task in tasks {
            let checkbox = if task.is_complete { "[x]" } else { "[ ]" };
            let id = self.paint(&task.id, "33");
            let text = if task.is_complete {
                self.paint(&task.task, "9")
            } else {
                task.task.clone()
            };
            let status = if task.is_complete {
                self.paint("Done", "32")
            } else {
                self.paint("Active", "33")
            };

            rows.push(vec![
                checkbox.to_string(),
                id,
                text,
                status,
                format_created_date(&task.created_at),
            ]);
        }

        write_table(&mut out, headers, rows)?;
        Ok(())
    }

    #[tracing::instrument(skip(self, stats))]
    pub fn print_stats(&mut self, stats: &Stats) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        let headers = vec![
            "Total Tasks".to_string(),
            "Active".to_string(),
            "Completed".to_string(),
        ];
        let rows = vec![vec![
            stats.total.to_string(),
            stats.active.to_string(),
            stats.completed.to_string(),
        ]];

        write_table(&mut out, headers, rows)?;
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color || !io::stdout().is_terminal() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn empty_state_hint(active: Filter) -> &'static str {
    match active {
        Filter::All => "Add your first task to get started!",
        Filter::Active => "All your tasks are completed! 🎉",
        Filter::Completed => "No completed tasks yet.",
    }
}

fn format_created_date(raw: &str) -> String {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.format("%Y-%m-%d").to_string();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return parsed.format("%Y-%m-%d").to_string();
    }
    raw.to_string()
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for idx in 0..column_count {
        write!(writer, "{:-<width$} ", "", width = widths[idx])?;
    }
    writeln!(writer)?;

    for row in rows {
        for idx in 0..column_count {
            let cell = &row[idx];
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::{Renderer, empty_state_hint, format_created_date, strip_ansi, write_table};
    use crate::filter::{Filter, Stats};

    #[test]
    fn tabs_line_shows_live_counts() {
        let renderer = Renderer { color: false };
        let stats = Stats {
            total: 3,
            active: 2,
            completed: 1,
        };

        let line = renderer.tabs_line(Filter::Active, &stats);
        assert_eq!(line, "All (3)   Active (2)   Completed (1)");
    }

    #[test]
    fn created_dates_render_as_calendar_days() {
        assert_eq!(format_created_date("2024-01-01T00:00:00Z"), "2024-01-01");
        assert_eq!(format_created_date("2024-01-01T00:00:00.000Z"), "2024-01-01");
        assert_eq!(
            format_created_date("2026-02-16T05:00:00.123456"),
            "2026-02-16"
        );
        assert_eq!(format_created_date("soon"), "soon");
    }

    #[test]
    fn empty_state_hints_follow_the_selected_tab() {
        assert_eq!(
            empty_state_hint(Filter::All),
            "Add your first task to get started!"
        );
        assert_eq!(
            empty_state_hint(Filter::Active),
            "All your tasks are completed! 🎉"
        );
        assert_eq!(
            empty_state_hint(Filter::Completed),
            "No completed tasks yet."
        );
    }

    #[test]
    fn tables_pad_by_visible_width() {
        let mut out = Vec::new();
        write_table(
            &mut out,
            vec!["ID".to_string(), "Task".to_string()],
            vec![
                vec!["\x1b[33m1\x1b[0m".to_string(), "Buy milk".to_string()],
                vec!["42".to_string(), "Walk".to_string()],
            ],
        )
        .expect("write table");

        let text = String::from_utf8(out).expect("utf8 table");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ID Task     ");
        assert_eq!(lines[1], "-- -------- ");
        assert_eq!(strip_ansi(lines[2]), "1  Buy milk ");
        assert_eq!(lines[3], "42 Walk     ");
    }
}
