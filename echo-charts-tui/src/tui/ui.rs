use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph},
};
use crate::tui::app::App;
use crate::tui::theme::Theme;
use echo_charts_core::{focus, locate, AxisScale, ChartView, SeriesKind, SeriesSet};

/// width reserved for y-axis labels, so pointer columns can be mapped back to the plot
const Y_LABEL_WIDTH: u16 = 8;
const X_TICKS: usize = 5;
const BAR_GROUP_GAP: u16 = 2;

pub fn render(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let area = frame.area();
    let chunks = split(area);
    render_topbar(frame, app, chunks[0], theme);
    match app.view {
        ChartView::Daily | ChartView::Hourly => render_line_chart(frame, app, chunks[1], theme),
        ChartView::Weekday => render_bar_chart(frame, app, chunks[1], theme),
    }
    render_focus_line(frame, app, chunks[2], theme);
    render_bottombar(frame, app, chunks[3], theme);
    if app.show_help { render_help(frame, area); }
}

fn split(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(1), Constraint::Length(1)])
        .split(area)
}

/// screen rect the chart block is drawn into
pub fn chart_area(area: Rect) -> Rect {
    split(area)[1]
}

/// approximate plot rect inside the chart block (axes and labels removed)
pub fn plot_area(chart: Rect, view: ChartView) -> Rect {
    let inner = Block::default().borders(Borders::ALL).inner(chart);
    match view {
        ChartView::Weekday => Rect { height: inner.height.saturating_sub(1), ..inner },
        _ => Rect {
            x: inner.x + Y_LABEL_WIDTH + 1,
            y: inner.y,
            width: inner.width.saturating_sub(Y_LABEL_WIDTH + 1),
            height: inner.height.saturating_sub(2),
        },
    }
}

/// (bar width, columns per group) for `groups` bar pairs across `inner_width`.
/// Group `k` starts `k * step` columns into the plot.
pub fn bar_layout(inner_width: u16, groups: u16) -> (u16, u16) {
    let groups = groups.max(1);
    let bar_width = ((inner_width / groups).saturating_sub(BAR_GROUP_GAP) / 2).max(1);
    (bar_width, 2 * bar_width + BAR_GROUP_GAP)
}

fn view_title(view: ChartView) -> &'static str {
    match view {
        ChartView::Daily => "Echoes per day (d)",
        ChartView::Hourly => "Average echoes per hour of day (h)",
        ChartView::Weekday => "Echoes per weekday (w)",
    }
}

fn empty(frame: &mut Frame, area: Rect, title: &str) {
    frame.render_widget(
        Paragraph::new("No records loaded.").block(Block::default().borders(Borders::ALL).title(title.to_owned())),
        area,
    );
}

/// x labels at evenly spaced positions, each naming the nearest bucket
fn x_labels<'a>(set: &SeriesSet, scale: &AxisScale) -> Vec<Span<'a>> {
    let ticks = X_TICKS.min(set.both.len()).max(1);
    (0..ticks)
        .map(|i| {
            let t = if ticks == 1 { 0.0 } else { i as f64 / (ticks - 1) as f64 };
            let at = scale.min + t * (scale.max - scale.min);
            let label = locate(&set.both, at).map(|p| p.position.to_string()).unwrap_or_default();
            Span::raw(label)
        })
        .collect()
}

fn y_labels<'a>(max: f64, averages: bool) -> Vec<Span<'a>> {
    [0.0, max / 2.0, max]
        .iter()
        .map(|v| {
            let s = if averages { format!("{v:.2}") } else { format!("{v:.0}") };
            Span::raw(format!("{s:>w$}", w = Y_LABEL_WIDTH as usize))
        })
        .collect()
}

fn render_line_chart(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let title = view_title(app.view);
    let set = app.data.view(app.view);
    let Some(scale) = app.scale(1.0) else {
        empty(frame, area, title);
        return;
    };
    let both = set.both.xy();
    let main = set.get(app.selection).xy();
    let focused: Vec<(f64, f64)> = app
        .focus_context()
        .and_then(|ctx| focus(set, &ctx).ok())
        .map(|f| {
            vec![
                (f.main.position.axis_value(), f.main.value()),
                (f.both.position.axis_value(), f.both.value()),
            ]
        })
        .unwrap_or_default();
    let y_max = set.both.max_value().max(1.0);
    let datasets = vec![
        Dataset::default()
            .name(SeriesKind::Both.label())
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(theme.both))
            .data(&both),
        Dataset::default()
            .name(app.selection.label())
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(theme.series(app.selection)))
            .data(&main),
        Dataset::default()
            .marker(Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(theme.highlight).add_modifier(Modifier::BOLD))
            .data(&focused),
    ];
    // a single day still needs a non-empty x range
    let x_max = if scale.max > scale.min { scale.max } else { scale.min + 1.0 };
    let chart = Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title(title))
        .x_axis(
            Axis::default()
                .style(Style::default().fg(theme.axis))
                .bounds([scale.min, x_max])
                .labels(x_labels(set, &scale)),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(theme.axis))
                .bounds([0.0, y_max])
                .labels(y_labels(y_max, app.view.averages_by_default())),
        );
    frame.render_widget(chart, area);
}

fn render_bar_chart(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let title = view_title(app.view);
    let set = app.data.view(app.view);
    if app.records.is_empty() {
        empty(frame, area, title);
        return;
    }
    let focused = app
        .focus_context()
        .and_then(|ctx| focus(set, &ctx).ok())
        .map(|f| f.main.position);
    let (bar_width, _) = bar_layout(area.width.saturating_sub(2), set.both.len() as u16);
    let mut chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .bar_width(bar_width)
        .bar_gap(0)
        .group_gap(BAR_GROUP_GAP);
    let main = set.get(app.selection);
    for p in set.both.points() {
        let main_count = main.get(&p.position).map_or(0, |q| q.count);
        let main_color = if focused == Some(p.position) { theme.highlight } else { theme.series(app.selection) };
        let group = BarGroup::default()
            .label(Line::from(p.position.to_string()))
            .bars(&[
                Bar::default().value(p.count).style(Style::default().fg(theme.both)),
                Bar::default().value(main_count).style(Style::default().fg(main_color)),
            ]);
        chart = chart.data(group);
    }
    frame.render_widget(chart, area);
}

fn render_topbar(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let info = format!(
        " {} | {} sources | {} rows | {} | main: ",
        app.input_path,
        app.sources.len(),
        app.stats.rows_read,
        app.view
    );
    let line = Line::from(vec![
        Span::raw(info),
        Span::styled(app.selection.label(), Style::default().fg(theme.series(app.selection)).add_modifier(Modifier::BOLD)),
        Span::raw(" vs "),
        Span::styled("both", Style::default().fg(theme.both)),
    ]);
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(theme.bg).fg(theme.fg)), area);
}

fn render_focus_line(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let line = match app.focus_text() {
        Some(text) => Line::from(Span::styled(format!(" {text}"), Style::default().fg(theme.highlight))),
        None => Line::from(" \u{2190}/\u{2192} or move the mouse over the chart to focus a point"),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_help(frame: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(Span::styled("Keybindings", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("  q        Quit"),
        Line::from("  ?        Toggle help"),
        Line::from("  Tab      Next chart"),
        Line::from("  d h w    Daily / hourly / weekday chart"),
        Line::from("  e r      Main series: expls / rexpls"),
        Line::from("  Space    Swap main series"),
        Line::from("  \u{2190} \u{2192}      Move focus one bucket"),
        Line::from("  PgUp/Dn  Move focus seven buckets"),
        Line::from("  Home/End First / last bucket"),
        Line::from("  Esc      Clear focus"),
        Line::from("  y        Copy focused point"),
        Line::from("  E        Export charts to JSON"),
        Line::from("  R        Reload source"),
    ];
    let popup = centered_rect(50, 70, area);
    frame.render_widget(ratatui::widgets::Clear, popup);
    frame.render_widget(Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("Help (?)")), popup);
}

fn status_color(theme: &Theme, msg: &str) -> Color {
    if msg.starts_with("error") {
        theme.error
    } else if ["Loaded", "Exported", "Copied"].iter().any(|p| msg.starts_with(p)) {
        theme.success
    } else {
        theme.fg
    }
}

fn render_bottombar(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let color = status_color(theme, &app.status_msg);
    let bar_text = format!(" {} | q:quit ?:help Tab d h w e r \u{2190}\u{2192} E R", app.status_msg);
    frame.render_widget(Paragraph::new(bar_text).style(Style::default().bg(theme.bg).fg(color)), area);
}

fn centered_rect(px: u16, py: u16, r: Rect) -> Rect {
    let v = Layout::default().direction(Direction::Vertical).constraints([Constraint::Percentage((100-py)/2), Constraint::Percentage(py), Constraint::Percentage((100-py)/2)]).split(r);
    Layout::default().direction(Direction::Horizontal).constraints([Constraint::Percentage((100-px)/2), Constraint::Percentage(px), Constraint::Percentage((100-px)/2)]).split(v[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_area_leaves_room_for_labels() {
        let chart = Rect { x: 0, y: 1, width: 100, height: 30 };
        let plot = plot_area(chart, ChartView::Hourly);
        assert_eq!(plot.x, 1 + Y_LABEL_WIDTH + 1);
        assert_eq!(plot.width, 98 - Y_LABEL_WIDTH - 1);
        let bars = plot_area(chart, ChartView::Weekday);
        assert_eq!((bars.x, bars.width), (1, 98));
    }

    #[test]
    fn bar_groups_step_evenly() {
        assert_eq!(bar_layout(98, 7), (6, 14));
        assert_eq!(bar_layout(77, 7), (4, 10));
        assert_eq!(bar_layout(5, 7), (1, 4));
    }

    #[test]
    fn status_colors() {
        let theme = Theme::dark();
        assert_eq!(status_color(&theme, "Loaded 5 rows"), theme.success);
        assert_eq!(status_color(&theme, "Exported to ./echo-charts.json"), theme.success);
        assert_eq!(status_color(&theme, "error: reload failed: gone"), theme.error);
        assert_eq!(status_color(&theme, "Reloading..."), theme.fg);
    }

    #[test]
    fn chart_area_sits_between_bars() {
        let area = Rect { x: 0, y: 0, width: 80, height: 24 };
        let chart = chart_area(area);
        assert_eq!((chart.y, chart.height), (1, 21));
    }
}
