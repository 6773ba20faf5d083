use crate::tui::app::App;
use crate::tui::ui::{bar_layout, chart_area, plot_area};
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use echo_charts_core::{export_json, ChartView, SeriesKind};
use ratatui::layout::Rect;
use std::path::Path;

pub fn handle_key(app: &mut App, key: KeyEvent) {
    if app.show_help {
        // any key closes the overlay; q still quits
        if key.code == KeyCode::Char('q') {
            app.should_quit = true;
        }
        app.show_help = false;
        return;
    }
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Tab | KeyCode::Char('v') => app.next_view(),
        KeyCode::Char('d') => app.set_view(ChartView::Daily),
        KeyCode::Char('h') => app.set_view(ChartView::Hourly),
        KeyCode::Char('w') => app.set_view(ChartView::Weekday),
        KeyCode::Char('e') => app.select(SeriesKind::Primary),
        KeyCode::Char('r') => app.select(SeriesKind::Secondary),
        KeyCode::Char(' ') => app.toggle_selection(),
        KeyCode::Left | KeyCode::Char(',') => app.move_pointer(-1),
        KeyCode::Right | KeyCode::Char('.') => app.move_pointer(1),
        KeyCode::PageUp => app.move_pointer(-7),
        KeyCode::PageDown => app.move_pointer(7),
        KeyCode::Home => app.pointer_home(),
        KeyCode::End => app.pointer_end(),
        KeyCode::Esc => app.pointer = None,
        KeyCode::Char('R') => {
            app.pending_reload = true;
            app.status_msg = "Reloading...".into();
        }
        KeyCode::Char('E') => {
            let dir = Path::new(&app.config.export.output_dir);
            let out = dir.join("echo-charts.json");
            let result = std::fs::create_dir_all(dir)
                .map_err(|e| e.to_string())
                .and_then(|_| export_json(&out, &app.sources, &app.stats, &app.data).map_err(|e| e.to_string()));
            app.status_msg = match result {
                Ok(()) => format!("Exported to {}", out.display()),
                Err(e) => format!("error: export failed: {e}"),
            };
        }
        KeyCode::Char('y') => copy_focus(app),
        _ => {}
    }
}

#[cfg(feature = "clipboard")]
fn copy_focus(app: &mut App) {
    let Some(text) = app.focus_text() else {
        app.status_msg = "Nothing focused".into();
        return;
    };
    app.status_msg = if cli_clipboard::set_contents(text.clone()).is_ok() {
        format!("Copied: {text}")
    } else {
        "error: clipboard unavailable".into()
    };
}

#[cfg(not(feature = "clipboard"))]
fn copy_focus(app: &mut App) {
    app.status_msg = "Clipboard support not compiled in (feature: clipboard)".into();
}

/// Mouse motion over the plot moves the focus; `area` is the whole frame.
pub fn handle_mouse(app: &mut App, mouse: MouseEvent, area: Rect) {
    match mouse.kind {
        MouseEventKind::Moved | MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left) => {
            let plot = plot_area(chart_area(area), app.view);
            let inside = mouse.column >= plot.x
                && mouse.column < plot.x + plot.width
                && mouse.row >= plot.y
                && mouse.row < plot.y + plot.height;
            if !inside {
                return;
            }
            let column = mouse.column - plot.x;
            if app.view == ChartView::Weekday {
                // bars are fixed-width groups, not a linear axis
                let groups = app.data.view(app.view).both.len() as u16;
                let (_, step) = bar_layout(plot.width, groups);
                app.pointer_at_group(column, step);
            } else {
                app.pointer_at_column(column, plot.width);
            }
        }
        MouseEventKind::ScrollUp => app.move_pointer(-1),
        MouseEventKind::ScrollDown => app.move_pointer(1),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use echo_charts_common::Config;
    use echo_charts_core::{parse_timestamp, LoadedLog, Record};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> App {
        let mut app = App::new("echo.csv".into(), Config::default());
        let records = ["2020-01-06 08:10:00.0+0000", "2020-01-07 09:00:00.0+0000"]
            .iter()
            .map(|ts| Record::new(parse_timestamp(ts).unwrap(), true))
            .collect();
        app.set_log(LoadedLog { records, ..Default::default() });
        app.refresh(80);
        app
    }

    #[test]
    fn keys_switch_views_and_series() {
        let mut app = app();
        handle_key(&mut app, key(KeyCode::Char('w')));
        assert_eq!(app.view, ChartView::Weekday);
        handle_key(&mut app, key(KeyCode::Tab));
        assert_eq!(app.view, ChartView::Daily);
        handle_key(&mut app, key(KeyCode::Char('r')));
        assert_eq!(app.selection, SeriesKind::Secondary);
        handle_key(&mut app, key(KeyCode::Char(' ')));
        assert_eq!(app.selection, SeriesKind::Primary);
    }

    #[test]
    fn help_overlay_swallows_keys() {
        let mut app = app();
        handle_key(&mut app, key(KeyCode::Char('?')));
        assert!(app.show_help);
        handle_key(&mut app, key(KeyCode::Char('w')));
        assert!(!app.show_help);
        assert_eq!(app.view, ChartView::Daily);
    }

    #[test]
    fn arrows_move_focus_and_esc_clears() {
        let mut app = app();
        handle_key(&mut app, key(KeyCode::Char('h')));
        handle_key(&mut app, key(KeyCode::Right));
        handle_key(&mut app, key(KeyCode::Right));
        assert_eq!(app.pointer, Some(1.0));
        handle_key(&mut app, key(KeyCode::End));
        assert_eq!(app.pointer, Some(23.0));
        handle_key(&mut app, key(KeyCode::Esc));
        assert!(app.pointer.is_none());
    }

    #[test]
    fn reload_and_quit_set_flags() {
        let mut app = app();
        handle_key(&mut app, key(KeyCode::Char('R')));
        assert!(app.pending_reload);
        handle_key(&mut app, key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn export_writes_into_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app();
        app.config.export.output_dir = dir.path().to_string_lossy().into_owned();
        handle_key(&mut app, key(KeyCode::Char('E')));
        assert!(app.status_msg.starts_with("Exported to"), "{}", app.status_msg);
        assert!(dir.path().join("echo-charts.json").exists());
    }

    #[test]
    fn mouse_outside_plot_is_ignored() {
        let mut app = app();
        app.set_view(ChartView::Hourly);
        let area = Rect { x: 0, y: 0, width: 80, height: 24 };
        let at = |column, row| MouseEvent { kind: MouseEventKind::Moved, column, row, modifiers: KeyModifiers::NONE };
        handle_mouse(&mut app, at(0, 0), area);
        assert!(app.pointer.is_none());
        let plot = plot_area(chart_area(area), ChartView::Hourly);
        handle_mouse(&mut app, at(plot.x, plot.y), area);
        assert_eq!(app.pointer, Some(0.0));
    }

    #[test]
    fn mouse_on_weekday_bar_focuses_that_day() {
        use echo_charts_core::{focus, BucketKey, WEEKDAYS};
        let mut app = app();
        app.set_view(ChartView::Weekday);
        let area = Rect { x: 0, y: 0, width: 100, height: 24 };
        let plot = plot_area(chart_area(area), ChartView::Weekday);
        let (bar_width, step) = bar_layout(plot.width, 7);
        let at = |column| MouseEvent { kind: MouseEventKind::Moved, column, row: plot.y, modifiers: KeyModifiers::NONE };
        for (k, day) in WEEKDAYS.iter().enumerate() {
            let first = plot.x + k as u16 * step;
            for column in [first, first + 2 * bar_width - 1] {
                handle_mouse(&mut app, at(column), area);
                let ctx = app.focus_context().unwrap();
                let f = focus(app.data.view(app.view), &ctx).unwrap();
                assert_eq!(f.main.position, BucketKey::Weekday(*day), "column {column}");
            }
        }
        // first column of the Sunday bars on a 100-column terminal
        handle_mouse(&mut app, at(85), area);
        assert_eq!(app.pointer, Some(6.0));
    }
}
