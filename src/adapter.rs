//! Bridge to an embedded third-party Gantt widget.
//!
//! The widget is opaque: it owns its own scroll and zoom state and only sees
//! what [`GanttWidget`] hands it. This module translates milestones into the
//! widget's task shape, derives its header scales from the view mode, and
//! turns the widget's raw events back into [`AdapterEvent`]s.

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::Serialize;

use crate::TimelineError;
use crate::consts::MS_PER_DAY;
use crate::item::TimelineItem;
use crate::logging::{ADAPTER_TARGET, day};
use crate::period::{Period, days_between};
use crate::types::{ItemId, ViewMode};

/// Calendar unit of one header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleUnit {
    Year,
    Quarter,
    Month,
    Week,
    Day,
}

/// One header row: a unit, how many units per cell, and a label template in
/// the widget's own syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScaleRow {
    pub unit: ScaleUnit,
    pub step: u32,
    pub format: &'static str,
}

impl ScaleRow {
    const fn new(unit: ScaleUnit, format: &'static str) -> Self {
        Self { unit, step: 1, format }
    }
}

/// Header rows, cell width and visible range for one view mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScaleConfig {
    pub rows: Vec<ScaleRow>,
    pub column_width: u32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ScaleConfig {
    pub fn for_period(period: &Period) -> Self {
        let (rows, column_width) = match period.mode() {
            ViewMode::Days => (vec![ScaleRow::new(ScaleUnit::Day, "%d %M")], 60),
            ViewMode::Weeks => (
                vec![
                    ScaleRow::new(ScaleUnit::Week, "Week #%W"),
                    ScaleRow::new(ScaleUnit::Day, "%D %d"),
                ],
                50,
            ),
            ViewMode::Months => (
                vec![
                    ScaleRow::new(ScaleUnit::Month, "%F %Y"),
                    ScaleRow::new(ScaleUnit::Week, "#%W"),
                ],
                40,
            ),
            ViewMode::Quarters => (
                vec![
                    ScaleRow::new(ScaleUnit::Year, "%Y"),
                    ScaleRow::new(ScaleUnit::Quarter, "Q%q"),
                ],
                90,
            ),
        };
        Self {
            rows,
            column_width,
            start: period.start(),
            end: period.end(),
        }
    }
}

/// A milestone in the widget's task shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetTask {
    pub id: ItemId,
    pub text: String,
    pub start_date: DateTime<Utc>,
    /// Whole days, at least one
    pub duration: u32,
}

/// Days a task spans: `max(1, ceil((end - start) / day))`.
pub fn duration_days(start: DateTime<Utc>, end: DateTime<Utc>) -> u32 {
    let millis = (end - start).num_milliseconds();
    if millis <= 0 {
        return 1;
    }
    let days = (millis + MS_PER_DAY - 1) / MS_PER_DAY;
    u32::try_from(days).unwrap_or(u32::MAX).max(1)
}

/// Converts one milestone; items without a start date cannot be placed.
pub fn to_widget_task(item: &TimelineItem) -> Option<WidgetTask> {
    let start_date = item.start_date?;
    let duration = item.end().map_or(1, |end| duration_days(start_date, end));
    Some(WidgetTask {
        id: item.id.clone(),
        text: item.title.clone(),
        start_date,
        duration,
    })
}

/// Operations the adapter needs from the embedded widget.
pub trait GanttWidget {
    /// Replaces the header scales and visible range.
    fn configure(&mut self, scale: &ScaleConfig);

    /// Replaces every task.
    fn load(&mut self, tasks: &[WidgetTask]);
}

/// Raw events raised by the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    /// A drag finished with the task now starting at `new_start`
    TaskMoved {
        id: ItemId,
        new_start: DateTime<Utc>,
    },
    TaskClicked {
        id: ItemId,
    },
}

/// Events re-emitted upward to the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterEvent {
    DragCompleted { id: ItemId, delta_days: i64 },
    Clicked { id: ItemId },
}

/// Owns a widget and keeps it fed with milestones for the current view.
#[derive(Debug)]
pub struct GanttAdapter<W> {
    widget: W,
    period: Period,
    tasks: Vec<WidgetTask>,
}

impl<W: GanttWidget> GanttAdapter<W> {
    pub fn new(widget: W, milestones: &[TimelineItem], view_mode: ViewMode, start_date: DateTime<Utc>) -> Self {
        let mut adapter = Self {
            widget,
            period: Period::new(view_mode, start_date),
            tasks: Vec::new(),
        };
        adapter.update(milestones, view_mode, start_date);
        adapter
    }

    /// Pushes a new `{milestones, view_mode, start_date}` triple to the widget.
    pub fn update(&mut self, milestones: &[TimelineItem], view_mode: ViewMode, start_date: DateTime<Utc>) {
        self.period = Period::new(view_mode, start_date);
        self.tasks = milestones
            .iter()
            .filter_map(|item| {
                let task = to_widget_task(item);
                if task.is_none() {
                    warn!(target: ADAPTER_TARGET, "skipping {}: no start date", item.id);
                }
                task
            })
            .collect();

        self.widget.configure(&self.scale());
        self.widget.load(&self.tasks);
        debug!(
            target: ADAPTER_TARGET,
            "loaded {} of {} milestones into {} view from {}",
            self.tasks.len(),
            milestones.len(),
            view_mode,
            day(Some(self.period.start()))
        );
    }

    pub fn scale(&self) -> ScaleConfig {
        ScaleConfig::for_period(&self.period)
    }

    pub const fn period(&self) -> &Period {
        &self.period
    }

    pub fn tasks(&self) -> &[WidgetTask] {
        &self.tasks
    }

    pub const fn widget(&self) -> &W {
        &self.widget
    }

    /// Translates a widget event.
    ///
    /// A drag that lands on the same day yields `Ok(None)`. After a move the
    /// adapter's copy of the task follows the widget, so the next drag is
    /// measured from where this one ended.
    ///
    /// # Errors
    /// Returns `TimelineError::UnknownItem` for ids the adapter never loaded.
    pub fn handle(&mut self, event: WidgetEvent) -> Result<Option<AdapterEvent>, TimelineError> {
        match event {
            WidgetEvent::TaskMoved { id, new_start } => {
                let task = self
                    .tasks
                    .iter_mut()
                    .find(|task| task.id == id)
                    .ok_or_else(|| TimelineError::UnknownItem(id.clone()))?;
                let delta_days = days_between(task.start_date, new_start);
                task.start_date = new_start;
                if delta_days == 0 {
                    return Ok(None);
                }
                debug!(target: ADAPTER_TARGET, "{id} dragged by {delta_days}d");
                Ok(Some(AdapterEvent::DragCompleted { id, delta_days }))
            }
            WidgetEvent::TaskClicked { id } => {
                if !self.tasks.iter().any(|task| task.id == id) {
                    return Err(TimelineError::UnknownItem(id));
                }
                Ok(Some(AdapterEvent::Clicked { id }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{milestone, utc};

    #[derive(Debug, Default)]
    struct FakeWidget {
        scales: Vec<ScaleConfig>,
        loads: Vec<Vec<WidgetTask>>,
    }

    impl GanttWidget for FakeWidget {
        fn configure(&mut self, scale: &ScaleConfig) {
            self.scales.push(scale.clone());
        }

        fn load(&mut self, tasks: &[WidgetTask]) {
            self.loads.push(tasks.to_vec());
        }
    }

    #[test]
    fn test_duration_days_cases() {
        struct TestCase {
            start: &'static str,
            end: &'static str,
            expected: u32,
        }

        let cases = [
            TestCase {
                start: "2024-03-01T00:00:00Z",
                end: "2024-03-01T00:00:00Z",
                expected: 1,
            },
            TestCase {
                start: "2024-03-01T00:00:00Z",
                end: "2024-03-02T00:00:00Z",
                expected: 1,
            },
            TestCase {
                start: "2024-03-01T00:00:00Z",
                end: "2024-03-02T00:00:01Z",
                expected: 2,
            },
            TestCase {
                start: "2024-02-01T00:00:00Z",
                end: "2024-03-01T00:00:00Z",
                expected: 29,
            },
            TestCase {
                start: "2024-03-10T00:00:00Z",
                end: "2024-03-01T00:00:00Z",
                expected: 1,
            },
        ];

        for case in &cases {
            assert_eq!(
                duration_days(utc(case.start), utc(case.end)),
                case.expected,
                "{} -> {}",
                case.start,
                case.end
            );
        }
    }

    #[test]
    fn test_to_widget_task() {
        let task = to_widget_task(&milestone("5", Some("2024-03-04"), Some("2024-03-08"))).unwrap();
        assert_eq!(task.id, ItemId::from("5"));
        assert_eq!(task.text, "Milestone 5");
        assert_eq!(task.start_date, utc("2024-03-04T00:00:00Z"));
        assert_eq!(task.duration, 4);

        let open_ended = to_widget_task(&milestone("6", Some("2024-03-04"), None)).unwrap();
        assert_eq!(open_ended.duration, 1);

        assert!(to_widget_task(&milestone("7", None, Some("2024-03-08"))).is_none());
    }

    #[test]
    fn test_scale_rows_per_mode() {
        let reference = utc("2024-03-17T00:00:00Z");
        let units = |mode| {
            ScaleConfig::for_period(&Period::new(mode, reference))
                .rows
                .iter()
                .map(|row| row.unit)
                .collect::<Vec<_>>()
        };

        assert_eq!(units(ViewMode::Days), vec![ScaleUnit::Day]);
        assert_eq!(units(ViewMode::Weeks), vec![ScaleUnit::Week, ScaleUnit::Day]);
        assert_eq!(units(ViewMode::Months), vec![ScaleUnit::Month, ScaleUnit::Week]);
        assert_eq!(units(ViewMode::Quarters), vec![ScaleUnit::Year, ScaleUnit::Quarter]);
    }

    #[test]
    fn test_scale_range_follows_period() {
        let scale = ScaleConfig::for_period(&Period::new(ViewMode::Quarters, utc("2024-03-17T00:00:00Z")));
        assert_eq!(scale.start, utc("2024-01-01T00:00:00Z"));
        assert_eq!(scale.end, utc("2025-01-01T00:00:00Z"));

        let json = serde_json::to_value(&scale).unwrap();
        assert_eq!(json["rows"][1]["unit"], "quarter");
    }

    #[test]
    fn test_adapter_loads_widget() {
        let items = vec![
            milestone("1", Some("2024-03-04"), Some("2024-03-06")),
            milestone("2", None, Some("2024-03-06")),
            milestone("3", Some("2024-03-12"), None),
        ];
        let adapter = GanttAdapter::new(
            FakeWidget::default(),
            &items,
            ViewMode::Weeks,
            utc("2024-03-06T00:00:00Z"),
        );

        assert_eq!(adapter.tasks().len(), 2);
        assert_eq!(adapter.widget().loads.len(), 1);
        assert_eq!(adapter.widget().loads[0], adapter.tasks());
        assert_eq!(adapter.widget().scales[0].start, utc("2024-03-04T00:00:00Z"));
        assert_eq!(adapter.period().span_days(), 7);
    }

    #[test]
    fn test_adapter_update_reconfigures() {
        let items = vec![milestone("1", Some("2024-03-04"), Some("2024-03-06"))];
        let mut adapter = GanttAdapter::new(
            FakeWidget::default(),
            &items,
            ViewMode::Weeks,
            utc("2024-03-06T00:00:00Z"),
        );
        adapter.update(&items, ViewMode::Months, utc("2024-03-06T00:00:00Z"));

        assert_eq!(adapter.widget().scales.len(), 2);
        assert_eq!(adapter.widget().scales[1].start, utc("2024-03-01T00:00:00Z"));
        assert_eq!(adapter.period().mode(), ViewMode::Months);
    }

    #[test]
    fn test_drag_event_carries_delta() {
        let items = vec![milestone("1", Some("2024-03-04"), Some("2024-03-06"))];
        let mut adapter = GanttAdapter::new(
            FakeWidget::default(),
            &items,
            ViewMode::Weeks,
            utc("2024-03-06T00:00:00Z"),
        );
        let id = ItemId::from("1");

        let event = adapter
            .handle(WidgetEvent::TaskMoved {
                id: id.clone(),
                new_start: utc("2024-03-07T09:00:00Z"),
            })
            .unwrap();
        assert_eq!(
            event,
            Some(AdapterEvent::DragCompleted {
                id: id.clone(),
                delta_days: 3,
            })
        );

        // Measured from where the previous drag ended
        let event = adapter
            .handle(WidgetEvent::TaskMoved {
                id: id.clone(),
                new_start: utc("2024-03-05T00:00:00Z"),
            })
            .unwrap();
        assert_eq!(
            event,
            Some(AdapterEvent::DragCompleted {
                id: id.clone(),
                delta_days: -2,
            })
        );

        let event = adapter
            .handle(WidgetEvent::TaskMoved {
                id,
                new_start: utc("2024-03-05T18:00:00Z"),
            })
            .unwrap();
        assert_eq!(event, None);
    }

    #[test]
    fn test_click_event() {
        let items = vec![milestone("1", Some("2024-03-04"), None)];
        let mut adapter = GanttAdapter::new(
            FakeWidget::default(),
            &items,
            ViewMode::Days,
            utc("2024-03-06T00:00:00Z"),
        );

        let event = adapter.handle(WidgetEvent::TaskClicked { id: "1".into() }).unwrap();
        assert_eq!(event, Some(AdapterEvent::Clicked { id: "1".into() }));
    }

    #[test]
    fn test_unknown_ids_are_errors() {
        let mut adapter = GanttAdapter::new(FakeWidget::default(), &[], ViewMode::Days, utc("2024-03-06T00:00:00Z"));

        let result = adapter.handle(WidgetEvent::TaskClicked { id: "x".into() });
        assert!(matches!(result, Err(TimelineError::UnknownItem(_))));

        let result = adapter.handle(WidgetEvent::TaskMoved {
            id: "x".into(),
            new_start: utc("2024-03-06T00:00:00Z"),
        });
        assert!(matches!(result, Err(TimelineError::UnknownItem(_))));
    }
}
