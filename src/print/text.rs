use std::fmt::Write;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::guide::{GuideRow, GuideView};
use crate::models::TimeWindow;
use crate::print::PrintPage;
use crate::utils::DateTimeParser;

const NUMBER_WIDTH: usize = 6;
const NAME_WIDTH: usize = 24;
const NO_PROGRAM_DATA: &str = "(no program data)";

/// Plain-text page: heading, slot labels, then one line per channel
pub fn render_page(view: &GuideView, page: &PrintPage, total_pages: usize) -> String {
    let tz = view.timezone();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Page {}/{}  {} - {} ({})",
        page.number,
        total_pages,
        page.window.start.with_timezone(&tz).format("%a %d %b %Y %H:%M"),
        DateTimeParser::format_clock(&page.window.end, &tz),
        tz
    );
    out.push_str(&slot_header(&page.window, &tz));

    let rows = view.rows_for(page.rows.clone(), &page.window);
    if rows.is_empty() {
        out.push_str("(no channels)\n");
    }
    for row in &rows {
        out.push_str(&render_row(row, &tz, false));
    }
    out
}

/// The virtualized rows of the current window, with each cell's pixel geometry
pub fn render_grid(view: &GuideView) -> String {
    let tz = view.timezone();
    let window = view.window();
    let visible = view.visible();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} - {} ({})  rows {}..{} of {}  offset {}px / {}px",
        window.start.with_timezone(&tz).format("%a %d %b %Y %H:%M"),
        DateTimeParser::format_clock(&window.end, &tz),
        tz,
        visible.start_index,
        visible.end_index,
        view.row_count(),
        visible.offset_y_px,
        visible.total_height_px
    );
    match view.now_marker_offset() {
        Some(offset) => {
            let _ = writeln!(
                out,
                "Now {} at {:.0}px",
                DateTimeParser::format_clock(&view.now(), &tz),
                offset
            );
        }
        None => {
            let _ = writeln!(out, "Now {} (outside window)", format_day(&view.now(), &tz));
        }
    }
    out.push_str(&slot_header(&window, &tz));

    for row in view.visible_rows() {
        out.push_str(&render_row(&row, &tz, true));
    }
    out
}

fn format_day(dt: &DateTime<Utc>, tz: &Tz) -> String {
    dt.with_timezone(tz).format("%a %d %b %H:%M").to_string()
}

fn slot_header(window: &TimeWindow, tz: &Tz) -> String {
    let labels: Vec<String> = crate::guide::enumerate_slots(window)
        .iter()
        .map(|slot| DateTimeParser::format_clock(slot, tz))
        .collect();
    format!(
        "{:>NUMBER_WIDTH$} {:<NAME_WIDTH$} {}\n",
        "",
        "",
        labels.join("  ")
    )
}

fn render_row(row: &GuideRow<'_>, tz: &Tz, with_geometry: bool) -> String {
    let name: String = row.channel.name.chars().take(NAME_WIDTH).collect();
    let mut line = format!(
        "{:>NUMBER_WIDTH$} {:<NAME_WIDTH$} ",
        row.channel.display_number(),
        name
    );

    if !row.has_programs() {
        line.push_str(NO_PROGRAM_DATA);
        line.push('\n');
        return line;
    }

    let cells: Vec<String> = row
        .cells
        .iter()
        .map(|cell| {
            let marker = if cell.airing { "*" } else { "" };
            let start = DateTimeParser::format_clock(&cell.program.start_time, tz);
            if with_geometry {
                format!(
                    "{marker}{start} {} [{:.0}+{:.0}]",
                    cell.program.display_title(),
                    cell.layout.offset_px,
                    cell.layout.width_px
                )
            } else {
                format!("{marker}{start} {}", cell.program.display_title())
            }
        })
        .collect();
    line.push_str(&cells.join(" | "));
    line.push('\n');
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PrintConfig;
    use crate::guide::GuideGeometry;
    use crate::models::{Channel, Program};
    use crate::print::paginate;
    use chrono::{Duration, TimeZone};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, minute, 0).unwrap()
    }

    fn channel(id: i64, name: &str, tvg_id: Option<&str>) -> Channel {
        Channel {
            id,
            channel_number: Some(id as f64),
            name: name.to_string(),
            tvg_id: tvg_id.map(str::to_string),
            uuid: None,
            epg_data_id: None,
            channel_group: None,
            logo_id: None,
        }
    }

    fn program(title: &str, start: DateTime<Utc>, minutes: i64) -> Program {
        Program {
            id: title.to_lowercase(),
            title: title.to_string(),
            sub_title: None,
            description: None,
            start_time: start,
            end_time: start + Duration::minutes(minutes),
            tvg_id: "one".to_string(),
        }
    }

    fn view() -> GuideView {
        let mut view = GuideView::new(chrono_tz::UTC, GuideGeometry::default(), 5, at(9, 40));
        view.set_channels(vec![channel(1, "One", Some("one")), channel(2, "Two", None)]);
        view.set_programs(vec![
            program("News", at(9, 0), 60),
            program("Film", at(13, 0), 90),
        ]);
        view.on_resize(600.0);
        view
    }

    #[test]
    fn test_render_page() {
        let view = view();
        let range = TimeWindow::new(at(9, 0), at(15, 0));
        let pages = paginate(&range, view.row_count(), &PrintConfig {
            rows_per_page: 20,
            hours_per_page: 3,
        });
        assert_eq!(pages.len(), 2);

        let first = render_page(&view, &pages[0], pages.len());
        assert!(first.starts_with("Page 1/2  Fri 01 Mar 2024 09:00 - 12:00 (UTC)"));
        assert!(first.contains("09:00  09:30  10:00"));
        assert!(first.contains("*09:00 News"));
        assert!(!first.contains("Film"));
        assert!(first.contains(NO_PROGRAM_DATA));

        let second = render_page(&view, &pages[1], pages.len());
        assert!(second.contains("13:00 Film"));
        assert!(!second.contains("News"));
    }

    #[test]
    fn test_render_grid_includes_geometry() {
        let view = view();
        let grid = render_grid(&view);
        assert!(grid.contains("rows 0..2 of 2"));
        assert!(grid.contains("Now 09:40 at"));
        assert!(grid.contains("*09:00 News [0+396]"));
        assert!(grid.contains("13:00 Film [1600+596]"));
    }
}
