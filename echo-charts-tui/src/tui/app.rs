use crate::tui::session::Session;
use crate::tui::theme::Theme;
use echo_charts_common::Config;
use echo_charts_core::{
    build_chart_data, focus, AggregateOptions, AxisScale, ChartData, ChartView, CsvSource,
    FocusContext, LoadStats, LoadedLog, Record, RedrawState, SeriesKind,
};

pub struct App {
    pub input_path: String,
    pub records: Vec<Record>,
    pub sources: Vec<CsvSource>,
    pub stats: LoadStats,
    pub data: ChartData,
    pub generation: u64, // bumped on every (re)load
    pub redraw: RedrawState,
    pub aggregate_opts: AggregateOptions,
    pub view: ChartView,
    pub selection: SeriesKind, // main series, never Both
    pub pointer: Option<f64>,  // axis units of the current view
    pub show_help: bool,
    pub status_msg: String,
    pub should_quit: bool,
    pub pending_reload: bool, // set by the R key, handled by the main loop
    pub config: Config,
    pub theme: Theme,
    pub watch_rx: Option<std::sync::mpsc::Receiver<()>>, // reload events from filesystem watcher
}

impl App {
    pub fn new(input_path: String, config: Config) -> Self {
        let view = config.display.default_view.parse().unwrap_or(ChartView::Daily);
        let selection = match config.display.default_series.parse::<SeriesKind>() {
            Ok(SeriesKind::Secondary) => SeriesKind::Secondary,
            _ => SeriesKind::Primary,
        };
        Self {
            input_path,
            records: Vec::new(),
            sources: Vec::new(),
            stats: LoadStats::default(),
            data: ChartData::default(),
            generation: 0,
            redraw: RedrawState::new(),
            aggregate_opts: AggregateOptions::from(&config.data),
            view,
            selection,
            pointer: None,
            show_help: false,
            status_msg: String::from("Loading..."),
            should_quit: false,
            pending_reload: false,
            theme: Theme::from_name(&config.display.theme),
            config,
            watch_rx: None,
        }
    }

    pub fn set_log(&mut self, log: LoadedLog) {
        self.records = log.records;
        self.sources = log.sources;
        self.stats = log.stats;
        self.generation += 1;
    }

    /// Rebuilds every series when the width or the data changed since the last frame.
    pub fn refresh(&mut self, width: u16) {
        if self.redraw.needs_redraw(width, self.generation) {
            self.data = build_chart_data(&self.records, &self.aggregate_opts);
            if let Some(p) = self.pointer {
                self.pointer = self.scale(1.0).map(|s| p.clamp(s.min, s.max));
            }
        }
    }

    pub fn scale(&self, width: f64) -> Option<AxisScale> {
        AxisScale::for_series(self.data.view(self.view), width)
    }

    pub fn set_view(&mut self, view: ChartView) {
        if self.view != view {
            self.view = view;
            self.pointer = None; // axis units differ per view
        }
    }

    pub fn next_view(&mut self) {
        self.set_view(self.view.next());
    }

    pub fn select(&mut self, kind: SeriesKind) {
        if kind != SeriesKind::Both {
            self.selection = kind;
        }
    }

    pub fn toggle_selection(&mut self) {
        self.selection = self.selection.toggled();
    }

    /// moves the focus by whole buckets; the first move lands on the first point
    pub fn move_pointer(&mut self, steps: i64) {
        let Some(scale) = self.scale(1.0) else { return };
        let next = match self.pointer {
            None if steps < 0 => scale.max,
            None => scale.min,
            Some(p) => (p.round() + steps as f64).clamp(scale.min, scale.max),
        };
        self.pointer = Some(next);
    }

    pub fn pointer_home(&mut self) {
        self.pointer = self.scale(1.0).map(|s| s.min);
    }

    pub fn pointer_end(&mut self) {
        self.pointer = self.scale(1.0).map(|s| s.max);
    }

    /// pointer from a column inside a plot `width` columns wide
    pub fn pointer_at_column(&mut self, column: u16, width: u16) {
        if let Some(scale) = self.scale(width.saturating_sub(1) as f64) {
            self.pointer = Some(scale.invert(column as f64).clamp(scale.min, scale.max));
        }
    }

    /// pointer on the bar group under `column`, groups being `step` columns apart
    pub fn pointer_at_group(&mut self, column: u16, step: u16) {
        if let Some(scale) = self.scale(1.0) {
            let last = (scale.max - scale.min).max(0.0) as u16;
            let index = (column / step.max(1)).min(last);
            self.pointer = Some(scale.min + index as f64);
        }
    }

    pub fn focus_context(&self) -> Option<FocusContext> {
        self.pointer.map(|pointer| FocusContext { selection: self.selection, pointer })
    }

    /// tooltip text for the focused points, as the hover labels showed them
    pub fn focus_text(&self) -> Option<String> {
        let ctx = self.focus_context()?;
        let f = focus(self.data.view(self.view), &ctx).ok()?;
        let fmt = |v: f64| if self.view.averages_by_default() { format!("{v:.2}") } else { format!("{v}") };
        Some(format!(
            "{}  {} {}  both {}",
            f.main.position,
            self.selection,
            fmt(f.main.value()),
            fmt(f.both.value())
        ))
    }

    pub fn to_session(&self) -> Session {
        Session {
            input_path: self.input_path.clone(),
            view: self.view.name().into(),
            series: self.selection.label().into(),
        }
    }

    pub fn restore_from_session(&mut self, s: &Session) {
        if s.input_path != self.input_path {
            return;
        }
        if let Ok(view) = s.view.parse() {
            self.view = view;
        }
        if let Ok(kind) = s.series.parse() {
            self.select(kind);
        }
    }
}
