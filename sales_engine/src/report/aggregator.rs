//! Pure report computation over a set of stored order rows.
//!
//! Nothing in here touches the database or the clock. Give it the same rows and it returns an equal snapshot.
use std::{
    collections::{BTreeMap, HashMap},
    hash::Hash,
};

use chrono::{Datelike, NaiveDate, Timelike};
use sales_common::DateRange;

use crate::{
    db_types::OrderRecord,
    report::snapshot::{
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
    },
};

pub const TOP_ADS_LIMIT: usize = 30;
pub const TOP_SKUS_LIMIT: usize = 30;
pub const TOP_PER_NICHE_LIMIT: usize = 15;
pub const TOP_NICHES_LIMIT: usize = 10;
pub const RECENT_SALES_LIMIT: usize = 15;

/// Running sums over a group of rows.
#[derive(Debug, Clone, Copy, Default)]
struct Totals {
    revenue: f64,
    gross_profit: f64,
    net_profit: f64,
    cost: f64,
    freight: f64,
    taxes: f64,
    rentability: f64,
    profitability: f64,
    units: i64,
    orders: i64,
}

impl Totals {
    fn add(&mut self, row: &OrderRecord) {
        self.revenue += row.total_value;
        self.gross_profit += row.gross_profit;
        self.net_profit += row.profit;
        self.cost += row.cost;
        self.freight += row.freight;
        self.taxes += row.taxes;
        self.rentability += row.rentability;
        self.profitability += row.profitability;
        self.units += row.quantity;
        self.orders += 1;
    }

    fn of<'a, I: IntoIterator<Item = &'a OrderRecord>>(rows: I) -> Self {
        rows.into_iter().fold(Self::default(), |mut acc, row| {
            acc.add(row);
            acc
        })
    }

    fn average_ticket(&self) -> AverageTicket {
        AverageTicket { per_order: ratio(self.revenue, self.orders as f64), per_unit: ratio(self.revenue, self.units as f64) }
    }

    fn summary(&self) -> GroupSummary {
        GroupSummary {
            revenue: self.revenue,
            gross_profit: self.gross_profit,
            net_profit: self.net_profit,
            order_count: self.orders,
            units: self.units,
            average_ticket: self.average_ticket(),
        }
    }

    fn bucket(&self) -> BucketTotals {
        BucketTotals { revenue: self.revenue, net_profit: self.net_profit, order_count: self.orders }
    }

    fn mean_rentability(&self) -> f64 {
        ratio(self.rentability, self.orders as f64)
    }

    fn mean_profitability(&self) -> f64 {
        ratio(self.profitability, self.orders as f64)
    }
}

/// `numerator / denominator`, or 0 when the denominator is 0.
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Groups rows by key, keeping the groups in order of first appearance.
fn group_in_order<'a, K, F>(rows: impl IntoIterator<Item = &'a OrderRecord>, key: F) -> Vec<(K, Totals)>
where
    K: Eq + Hash + Clone,
    F: Fn(&OrderRecord) -> K,
{
    let mut index = HashMap::<K, usize>::new();
    let mut groups = Vec::<(K, Totals)>::new();
    for row in rows {
        let k = key(row);
        let i = *index.entry(k.clone()).or_insert_with(|| {
            groups.push((k, Totals::default()));
            groups.len() - 1
        });
        groups[i].1.add(row);
    }
    groups
}

/// Groups rows by key, sorted by key.
fn group_sorted<'a, K, F>(rows: impl IntoIterator<Item = &'a OrderRecord>, key: F) -> BTreeMap<K, Totals>
where
    K: Ord,
    F: Fn(&OrderRecord) -> K,
{
    let mut groups = BTreeMap::<K, Totals>::new();
    for row in rows {
        groups.entry(key(row)).or_default().add(row);
    }
    groups
}

/// Highest net profit first. The sort is stable, so ties keep their order of first appearance.
fn by_profit_desc<K>(mut groups: Vec<(K, Totals)>) -> Vec<(K, Totals)> {
    groups.sort_by(|a, b| b.1.net_profit.total_cmp(&a.1.net_profit));
    groups
}

fn rank(groups: Vec<(String, Totals)>, limit: usize) -> Vec<RankEntry> {
    by_profit_desc(groups)
        .into_iter()
        .take(limit)
        .map(|(key, t)| RankEntry { key, net_profit: t.net_profit, gross_profit: t.gross_profit })
        .collect()
}

fn best_seller(groups: Vec<(String, Totals)>) -> Option<BestSeller> {
    by_profit_desc(groups).into_iter().next().map(|(key, t)| BestSeller {
        key,
        net_profit: t.net_profit,
        revenue: t.revenue,
        units: t.units,
    })
}

fn sale_line(row: &OrderRecord) -> SaleLine {
    SaleLine {
        payment_date: row.payment_timestamp,
        order_id: row.order_id.to_string(),
        cart_id: row.cart_id.clone(),
        sku: row.sku.clone(),
        title: row.title.clone(),
        quantity: row.quantity,
        total_value: row.total_value,
        profit: row.profit,
        niche: row.niche_label().to_string(),
    }
}

fn niche_key(row: &OrderRecord) -> String {
    row.niche_label().to_string()
}

/// Computes the full report for `range` from `rows`, which are expected to be the rows of one user inside the range.
pub fn aggregate(range: &DateRange, rows: &[OrderRecord]) -> ReportSnapshot {
    let overall = Totals::of(rows);
    let day_count = range.day_count();
    ReportSnapshot {
        period: ReportPeriod { start: range.start(), end: range.end(), day_count },
        kpis: kpi_totals(&overall, rows),
        breakdowns: Breakdowns {
            daily: daily_breakdown(rows),
            by_niche: niche_breakdown(&overall, rows, day_count),
            by_sku: sku_breakdown(rows),
            by_hour: group_sorted(rows, |r| r.payment_timestamp.hour())
                .into_iter()
                .map(|(hour, t)| HourBucket { hour, totals: t.bucket() })
                .collect(),
            by_weekday: group_sorted(rows, |r| r.payment_timestamp.weekday().num_days_from_monday())
                .into_iter()
                .map(|(weekday, t)| WeekdayBucket { weekday, totals: t.bucket() })
                .collect(),
        },
        rankings: rankings(rows),
        highlights: highlights(rows),
    }
}

fn kpi_totals(overall: &Totals, rows: &[OrderRecord]) -> KpiTotals {
    let mut unmapped_skus = Vec::<String>::new();
    for row in rows.iter().filter(|r| r.niche.is_none()) {
        if !unmapped_skus.contains(&row.sku) {
            unmapped_skus.push(row.sku.clone());
        }
    }
    KpiTotals {
        revenue: overall.revenue,
        gross_profit: overall.gross_profit,
        net_profit: overall.net_profit,
        order_count: overall.orders,
        units: overall.units,
        average_ticket: overall.average_ticket(),
        costs: CostTotals { cost: overall.cost, freight: overall.freight, taxes: overall.taxes },
        indices: MarginIndices {
            net_margin: ratio(overall.net_profit, overall.revenue) * 100.0,
            mean_profitability: overall.mean_profitability(),
        },
        unmapped_skus,
    }
}

fn daily_breakdown(rows: &[OrderRecord]) -> Vec<DayBreakdown> {
    let mut days = BTreeMap::<NaiveDate, Vec<&OrderRecord>>::new();
    for row in rows {
        days.entry(row.payment_timestamp.date()).or_default().push(row);
    }
    days.into_iter()
        .map(|(day, day_rows)| {
            let niches = group_sorted(day_rows.iter().copied(), niche_key)
                .into_iter()
                .map(|(niche, t)| NicheDaySummary {
                    niche,
                    revenue: t.revenue,
                    gross_profit: t.gross_profit,
                    net_profit: t.net_profit,
                    order_count: t.orders,
                    units: t.units,
                })
                .collect();
            DayBreakdown { day, summary: Totals::of(day_rows.iter().copied()).summary(), niches }
        })
        .collect()
}

fn niche_breakdown(overall: &Totals, rows: &[OrderRecord], day_count: i64) -> Vec<NicheBreakdown> {
    let days = day_count.max(1) as f64;
    group_sorted(rows, niche_key)
        .into_iter()
        .map(|(niche, t)| NicheBreakdown {
            niche,
            revenue: t.revenue,
            gross_profit: t.gross_profit,
            net_profit: t.net_profit,
            order_count: t.orders,
            units: t.units,
            freight: t.freight,
            taxes: t.taxes,
            cost: t.cost,
            mean_rentability: t.mean_rentability(),
            mean_profitability: t.mean_profitability(),
            revenue_share: ratio(t.revenue, overall.revenue),
            profit_share: ratio(t.net_profit, overall.net_profit),
            revenue_per_day: t.revenue / days,
            units_per_day: t.units as f64 / days,
        })
        .collect()
}

fn sku_breakdown(rows: &[OrderRecord]) -> Vec<SkuBreakdown> {
    group_sorted(rows, |r| (r.sku.clone(), niche_key(r)))
        .into_iter()
        .map(|((sku, niche), t)| SkuBreakdown {
            sku,
            niche,
            revenue: t.revenue,
            gross_profit: t.gross_profit,
            net_profit: t.net_profit,
            order_count: t.orders,
            units: t.units,
        })
        .collect()
}

fn rankings(rows: &[OrderRecord]) -> Rankings {
    let mut per_niche = BTreeMap::<String, Vec<&OrderRecord>>::new();
    for row in rows {
        per_niche.entry(niche_key(row)).or_default().push(row);
    }
    let top_skus_per_nicho = per_niche
        .into_iter()
        .map(|(niche, niche_rows)| {
            let skus = group_in_order(niche_rows.iter().copied(), |r| r.sku.clone());
            (niche, rank(skus, TOP_PER_NICHE_LIMIT))
        })
        .collect();
    let top_nichos = by_profit_desc(group_in_order(rows, niche_key))
        .into_iter()
        .take(TOP_NICHES_LIMIT)
        .map(|(niche, t)| NicheRank { niche, net_profit: t.net_profit, revenue: t.revenue, order_count: t.orders })
        .collect();
    Rankings {
        top_ads: rank(group_in_order(rows, |r| r.ad.clone()), TOP_ADS_LIMIT),
        top_skus: rank(group_in_order(rows, |r| r.sku.clone()), TOP_SKUS_LIMIT),
        top_nichos,
        top_skus_per_nicho,
    }
}

fn highlights(rows: &[OrderRecord]) -> Highlights {
    let mut recent = rows.iter().collect::<Vec<&OrderRecord>>();
    recent.sort_by(|a, b| b.payment_timestamp.cmp(&a.payment_timestamp).then(b.id.cmp(&a.id)));
    Highlights {
        last_sale: recent.first().map(|r| sale_line(r)),
        best_product: best_seller(group_in_order(rows, |r| r.sku.clone())),
        best_ad: best_seller(group_in_order(rows, |r| r.ad.clone())),
        recent_sales: recent.iter().take(RECENT_SALES_LIMIT).map(|r| sale_line(r)).collect(),
        negative_sales: rows.iter().filter(|r| r.profit < 0.0).map(sale_line).collect(),
    }
}
