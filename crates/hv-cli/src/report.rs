//! End-of-command summary tables.

use std::time::Instant;

use chrono::{DateTime, Utc};
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct Row {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

/// Collects counters for one command and prints them as a table.
pub struct Report {
    command: &'static str,
    started_at: DateTime<Utc>,
    clock: Instant,
    rows: Vec<Row>,
}

impl Report {
    pub fn start(command: &'static str) -> Self {
        Self {
            command,
            started_at: Utc::now(),
            clock: Instant::now(),
            rows: Vec::new(),
        }
    }

    pub fn add(&mut self, metric: &'static str, value: impl ToString) -> &mut Self {
        self.rows.push(Row {
            metric,
            value: value.to_string(),
        });
        self
    }

    pub fn render(&self) -> String {
        let mut rows = vec![
            Row {
                metric: "command",
                value: self.command.to_string(),
            },
            Row {
                metric: "started",
                value: self.started_at.to_rfc3339(),
            },
        ];
        rows.extend(self.rows.iter().map(|r| Row {
            metric: r.metric,
            value: r.value.clone(),
        }));
        rows.push(Row {
            metric: "elapsed",
            value: format!("{:.3}s", self.clock.elapsed().as_secs_f64()),
        });
        Table::new(rows).with(Style::rounded()).to_string()
    }

    pub fn print(&self) {
        println!("{}", self.render());
    }
}
