//! Report computation.
//!
//! [`aggregate`] turns a user's order rows for a date range into a [`ReportSnapshot`]: KPI totals, breakdowns by day,
//! niche, SKU, hour and weekday, profit rankings and a few highlights. It is a pure function; fetching the rows is the
//! job of `ReportApi`.
mod aggregator;
mod snapshot;

pub use aggregator::{
    aggregate,
    RECENT_SALES_LIMIT,
    TOP_ADS_LIMIT,
    TOP_NICHES_LIMIT,
    TOP_PER_NICHE_LIMIT,
    TOP_SKUS_LIMIT,
};
pub use snapshot::{
    AverageTicket,
    BestSeller,
    Breakdowns,
    BucketTotals,
    CostTotals,
    DayBreakdown,
    GroupSummary,
    Highlights,
    HourBucket,
    KpiTotals,
    MarginIndices,
    NicheBreakdown,
    NicheDaySummary,
    NicheRank,
    RankEntry,
    Rankings,
    ReportPeriod,
    ReportSnapshot,
    SaleLine,
    SkuBreakdown,
    WeekdayBucket,
};
