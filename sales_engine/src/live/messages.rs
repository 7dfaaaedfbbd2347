use std::sync::Arc;

use serde::Serialize;

use crate::report::ReportSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PushKind {
    /// Sent once, right after a client subscribes.
    DailyReportInitial,
    /// Sent whenever the user's daily report changes.
    DailyReport,
}

/// A report pushed to a live connection. The snapshot is shared between every connection it is sent to.
#[derive(Debug, Clone, PartialEq)]
pub struct PushMessage {
    pub kind: PushKind,
    pub data: Arc<ReportSnapshot>,
}

#[derive(Serialize)]
struct Envelope<'a> {
    #[serde(rename = "type")]
    kind: PushKind,
    data: &'a ReportSnapshot,
}

impl PushMessage {
    pub fn initial(snapshot: ReportSnapshot) -> Self {
        Self { kind: PushKind::DailyReportInitial, data: Arc::new(snapshot) }
    }

    pub fn update(snapshot: Arc<ReportSnapshot>) -> Self {
        Self { kind: PushKind::DailyReport, data: snapshot }
    }

    /// The wire form: `{"type": "daily_report", "data": {...}}`.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&Envelope { kind: self.kind, data: &self.data })
    }
}
