use std::sync::mpsc::{self, Receiver, Sender};

use tracing::{debug, warn};

use crate::client::{FetchOutcome, MetricClient};
use crate::data::World;
use crate::map::{ChoroplethRenderer, Viewport};
use crate::models::{Metric, MetricMap};
use crate::scale::ColorScale;
use crate::slider::YearBounds;

/// Application state: one map widget instance constructed once, owning the
/// geometry, the current metric map, the selected year, and the scale.
pub struct App {
    pub world: World,
    pub metrics: MetricMap,
    pub year: i32,
    pub bounds: YearBounds,
    pub metric: Metric,
    pub scale: ColorScale,
    pub viewport: Viewport,
    pub renderer: ChoroplethRenderer,
    pub should_quit: bool,
    /// A fetch for the current year is in flight
    pub fetching: bool,
    /// Mouse button is down on the slider track
    pub slider_drag: bool,
    client: MetricClient,
    results_tx: Sender<FetchOutcome>,
    results_rx: Receiver<FetchOutcome>,
    /// Token of the most recently issued fetch; older results are stale
    latest_token: u64,
}

impl App {
    pub fn new(
        world: World,
        metric: Metric,
        client: MetricClient,
        bounds: YearBounds,
        width: u16,
        height: u16,
    ) -> Self {
        let (results_tx, results_rx) = mpsc::channel();
        let mut app = Self {
            world,
            metrics: MetricMap::new(),
            year: bounds.min,
            bounds,
            metric,
            scale: metric.scale(),
            viewport: Viewport::new(1, 1),
            renderer: ChoroplethRenderer::new(),
            should_quit: false,
            fetching: false,
            slider_drag: false,
            client,
            results_tx,
            results_rx,
            latest_token: 0,
        };
        app.apply_size(width, height);
        // Everything is grey until the first fetch lands
        app.renderer
            .recolor(&app.world, &app.metrics, &app.scale);
        app.request_fetch();
        app
    }

    /// Terminal cell budget to map pixel viewport: 2 border columns; 2 border
    /// rows plus 3 slider rows plus 1 status row. Half blocks double the
    /// vertical resolution.
    fn apply_size(&mut self, width: u16, height: u16) {
        let inner_width = (width as usize).saturating_sub(2).max(1);
        let inner_height = (height as usize).saturating_sub(6).max(1);
        self.viewport.resize(inner_width, inner_height * 2);
        self.renderer.reproject(&self.world, &self.viewport);
    }

    /// Terminal resize: re-derive the projection and redraw geometry.
    /// Never fetches and never touches the fill table.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.apply_size(width, height);
    }

    /// Select a year: clamp to bounds and, if it changed, issue exactly one
    /// fetch for it. The displayed label follows `self.year` directly.
    pub fn set_year(&mut self, year: i32) {
        let year = self.bounds.clamp(year);
        if year == self.year {
            return;
        }
        self.year = year;
        self.request_fetch();
    }

    pub fn step_year(&mut self, delta: i32) {
        self.set_year(self.year + delta);
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    fn request_fetch(&mut self) {
        self.latest_token += 1;
        self.fetching = true;
        self.client.spawn_fetch(
            self.metric,
            self.year,
            self.latest_token,
            self.results_tx.clone(),
        );
    }

    /// Drain completed fetches. Only the result carrying the latest issued
    /// token may render; anything older lost the race and is dropped, so a
    /// slow response for an abandoned year can never overwrite a newer one.
    pub fn poll_fetches(&mut self) {
        while let Ok(outcome) = self.results_rx.try_recv() {
            if outcome.token != self.latest_token {
                debug!(
                    token = outcome.token,
                    year = outcome.year,
                    "discarding stale fetch result"
                );
                continue;
            }
            self.fetching = false;
            match outcome.result {
                Ok(metrics) => {
                    debug!(
                        year = outcome.year,
                        countries = metrics.len(),
                        "metrics updated"
                    );
                    self.metrics = metrics;
                    self.renderer
                        .recolor(&self.world, &self.metrics, &self.scale);
                }
                Err(err) => {
                    warn!(
                        year = outcome.year,
                        error = %err,
                        "fetch failed; keeping last-rendered state"
                    );
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn latest_token(&self) -> u64 {
        self.latest_token
    }

    #[cfg(test)]
    pub(crate) fn push_outcome(&mut self, outcome: FetchOutcome) {
        self.results_tx.send(outcome).unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Country;
    use crate::map::geometry::Polygon;

    fn test_app() -> App {
        let world = World::from_countries(vec![Country {
            code: "USA".into(),
            name: None,
            polygons: vec![Polygon::new(
                vec![
                    (-130.0, 20.0),
                    (-60.0, 20.0),
                    (-60.0, 55.0),
                    (-130.0, 55.0),
                    (-130.0, 20.0),
                ],
                Vec::new(),
            )],
        }]);
        let client = MetricClient::new("http://127.0.0.1:1").unwrap();
        App::new(
            world,
            Metric::WordCount,
            client,
            YearBounds::new(1946, 1950),
            80,
            24,
        )
    }

    fn outcome(token: u64, year: i32, metrics: MetricMap) -> FetchOutcome {
        FetchOutcome {
            token,
            year,
            result: Ok(metrics),
        }
    }

    #[test]
    fn test_year_change_issues_one_fetch_with_a_fresh_token() {
        let mut app = test_app();
        let initial = app.latest_token();
        assert_eq!(initial, 1);

        app.set_year(1948);
        assert_eq!(app.year, 1948);
        assert_eq!(app.latest_token(), initial + 1);

        // Same year again: no new fetch
        app.set_year(1948);
        assert_eq!(app.latest_token(), initial + 1);
    }

    #[test]
    fn test_year_clamps_to_bounds() {
        let mut app = test_app();
        app.set_year(1900);
        assert_eq!(app.year, 1946);
        app.set_year(3000);
        assert_eq!(app.year, 1950);
        app.step_year(-10);
        assert_eq!(app.year, 1946);
    }

    #[test]
    fn test_stale_results_are_discarded() {
        let mut app = test_app();
        app.set_year(1947);
        app.set_year(1948);
        let latest = app.latest_token();

        let mut stale = MetricMap::new();
        stale.insert("USA".into(), 1.0);
        let mut fresh = MetricMap::new();
        fresh.insert("USA".into(), 9_999.0);

        // The older request returns after the newer one was issued
        app.push_outcome(outcome(latest, 1948, fresh.clone()));
        app.push_outcome(outcome(latest - 1, 1947, stale));
        app.poll_fetches();

        assert_eq!(app.metrics, fresh);
        assert_eq!(app.renderer.fills()[0], app.scale.color(9_999.0));
    }

    #[test]
    fn test_failed_fetch_keeps_last_rendered_state() {
        let mut app = test_app();
        let mut metrics = MetricMap::new();
        metrics.insert("USA".into(), 5_000.0);
        app.push_outcome(outcome(app.latest_token(), 1946, metrics.clone()));
        app.poll_fetches();
        assert_eq!(app.metrics, metrics);

        app.set_year(1947);
        app.push_outcome(FetchOutcome {
            token: app.latest_token(),
            year: 1947,
            result: Err(crate::client::FetchError::Status(
                reqwest::StatusCode::NOT_FOUND,
            )),
        });
        app.poll_fetches();

        // Map still shows 1946's data
        assert_eq!(app.metrics, metrics);
        assert_eq!(app.renderer.fills()[0], app.scale.color(5_000.0));
    }

    #[test]
    fn test_resize_redraws_geometry_without_fetching() {
        let mut app = test_app();
        let token_before = app.latest_token();
        let fills_before = app.renderer.fills().to_vec();

        app.resize(120, 40);

        assert_eq!(app.latest_token(), token_before);
        assert_eq!(app.renderer.fills(), fills_before.as_slice());
        assert_eq!(app.renderer.index_size(), (118, 68));
    }
}
