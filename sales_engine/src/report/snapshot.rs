//! The report value objects.
//!
//! Field names serialize to the keys the dashboard reads (`faturamento_total`, `lucro_liquido_total`, ...). A snapshot
//! carries no generation timestamp, so two snapshots computed from the same rows compare equal.
use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSnapshot {
    #[serde(rename = "periodo")]
    pub period: ReportPeriod,
    #[serde(rename = "kpis_gerais")]
    pub kpis: KpiTotals,
    #[serde(rename = "relatorios")]
    pub breakdowns: Breakdowns,
    pub rankings: Rankings,
    #[serde(rename = "destaques")]
    pub highlights: Highlights,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    #[serde(rename = "inicio")]
    pub start: NaiveDate,
    #[serde(rename = "fim")]
    pub end: NaiveDate,
    #[serde(rename = "dias_totais")]
    pub day_count: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AverageTicket {
    #[serde(rename = "pedido")]
    pub per_order: f64,
    #[serde(rename = "unidade")]
    pub per_unit: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostTotals {
    #[serde(rename = "custo_total")]
    pub cost: f64,
    #[serde(rename = "frete_total")]
    pub freight: f64,
    #[serde(rename = "impostos_total")]
    pub taxes: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarginIndices {
    /// Net profit as a percentage of revenue.
    #[serde(rename = "rentabilidade_media")]
    pub net_margin: f64,
    #[serde(rename = "profitabilidade_media")]
    pub mean_profitability: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiTotals {
    #[serde(rename = "faturamento_total")]
    pub revenue: f64,
    #[serde(rename = "lucro_bruto_total")]
    pub gross_profit: f64,
    #[serde(rename = "lucro_liquido_total")]
    pub net_profit: f64,
    #[serde(rename = "total_pedidos")]
    pub order_count: i64,
    #[serde(rename = "total_unidades")]
    pub units: i64,
    #[serde(rename = "ticket_medio")]
    pub average_ticket: AverageTicket,
    #[serde(rename = "custos")]
    pub costs: CostTotals,
    #[serde(rename = "indices")]
    pub indices: MarginIndices,
    /// SKUs that appear in the range without a niche mapping, in order of first appearance.
    #[serde(rename = "skus_sem_nicho")]
    pub unmapped_skus: Vec<String>,
}

//--------------------------------------     Breakdowns       ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Breakdowns {
    #[serde(rename = "diario")]
    pub daily: Vec<DayBreakdown>,
    #[serde(rename = "por_nicho")]
    pub by_niche: Vec<NicheBreakdown>,
    #[serde(rename = "por_sku")]
    pub by_sku: Vec<SkuBreakdown>,
    #[serde(rename = "por_hora")]
    pub by_hour: Vec<HourBucket>,
    #[serde(rename = "por_dia_semana")]
    pub by_weekday: Vec<WeekdayBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayBreakdown {
    #[serde(rename = "data")]
    pub day: NaiveDate,
    #[serde(rename = "resumo")]
    pub summary: GroupSummary,
    #[serde(rename = "nichos")]
    pub niches: Vec<NicheDaySummary>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    #[serde(rename = "faturamento")]
    pub revenue: f64,
    #[serde(rename = "lucro_bruto")]
    pub gross_profit: f64,
    #[serde(rename = "lucro_liquido")]
    pub net_profit: f64,
    #[serde(rename = "total_pedidos")]
    pub order_count: i64,
    #[serde(rename = "total_unidades")]
    pub units: i64,
    #[serde(rename = "ticket_medio")]
    pub average_ticket: AverageTicket,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NicheDaySummary {
    #[serde(rename = "nicho")]
    pub niche: String,
    #[serde(rename = "faturamento")]
    pub revenue: f64,
    #[serde(rename = "lucro_bruto")]
    pub gross_profit: f64,
    #[serde(rename = "lucro_liquido")]
    pub net_profit: f64,
    #[serde(rename = "total_pedidos")]
    pub order_count: i64,
    #[serde(rename = "total_unidades")]
    pub units: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NicheBreakdown {
    #[serde(rename = "nicho")]
    pub niche: String,
    #[serde(rename = "faturamento_total")]
    pub revenue: f64,
    #[serde(rename = "lucro_bruto")]
    pub gross_profit: f64,
    #[serde(rename = "lucro_liquido")]
    pub net_profit: f64,
    #[serde(rename = "total_pedidos")]
    pub order_count: i64,
    #[serde(rename = "total_unidades")]
    pub units: i64,
    #[serde(rename = "frete")]
    pub freight: f64,
    #[serde(rename = "impostos")]
    pub taxes: f64,
    #[serde(rename = "custo")]
    pub cost: f64,
    #[serde(rename = "rentabilidade_media")]
    pub mean_rentability: f64,
    #[serde(rename = "profitabilidade_media")]
    pub mean_profitability: f64,
    /// This niche's revenue as a fraction of the range revenue.
    #[serde(rename = "participacao_faturamento")]
    pub revenue_share: f64,
    #[serde(rename = "participacao_lucro")]
    pub profit_share: f64,
    #[serde(rename = "media_dia_valor")]
    pub revenue_per_day: f64,
    #[serde(rename = "media_dia_unidades")]
    pub units_per_day: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuBreakdown {
    pub sku: String,
    #[serde(rename = "nicho")]
    pub niche: String,
    #[serde(rename = "faturamento_total")]
    pub revenue: f64,
    #[serde(rename = "lucro_bruto")]
    pub gross_profit: f64,
    #[serde(rename = "lucro_liquido")]
    pub net_profit: f64,
    #[serde(rename = "total_pedidos")]
    pub order_count: i64,
    #[serde(rename = "total_unidades")]
    pub units: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketTotals {
    #[serde(rename = "faturamento")]
    pub revenue: f64,
    #[serde(rename = "lucro_liquido")]
    pub net_profit: f64,
    #[serde(rename = "total_pedidos")]
    pub order_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourBucket {
    #[serde(rename = "hora")]
    pub hour: u32,
    #[serde(flatten)]
    pub totals: BucketTotals,
}

/// `weekday` counts from Monday = 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeekdayBucket {
    #[serde(rename = "dia_semana")]
    pub weekday: u32,
    #[serde(flatten)]
    pub totals: BucketTotals,
}

//--------------------------------------      Rankings        ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rankings {
    pub top_ads: Vec<RankEntry>,
    pub top_skus: Vec<RankEntry>,
    pub top_nichos: Vec<NicheRank>,
    pub top_skus_per_nicho: BTreeMap<String, Vec<RankEntry>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankEntry {
    #[serde(rename = "chave")]
    pub key: String,
    #[serde(rename = "lucro_liquido")]
    pub net_profit: f64,
    #[serde(rename = "lucro_bruto")]
    pub gross_profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NicheRank {
    #[serde(rename = "nicho")]
    pub niche: String,
    #[serde(rename = "lucro_liquido")]
    pub net_profit: f64,
    #[serde(rename = "faturamento")]
    pub revenue: f64,
    #[serde(rename = "total_pedidos")]
    pub order_count: i64,
}

//--------------------------------------     Highlights       ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Highlights {
    #[serde(rename = "ultima_venda")]
    pub last_sale: Option<SaleLine>,
    #[serde(rename = "melhor_produto")]
    pub best_product: Option<BestSeller>,
    #[serde(rename = "melhor_anuncio")]
    pub best_ad: Option<BestSeller>,
    #[serde(rename = "ultimas_15_vendas")]
    pub recent_sales: Vec<SaleLine>,
    #[serde(rename = "vendas_negativas")]
    pub negative_sales: Vec<SaleLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleLine {
    pub payment_date: NaiveDateTime,
    pub order_id: String,
    pub cart_id: Option<String>,
    pub sku: String,
    pub title: String,
    pub quantity: i64,
    pub total_value: f64,
    pub profit: f64,
    #[serde(rename = "nicho")]
    pub niche: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestSeller {
    #[serde(rename = "chave")]
    pub key: String,
    #[serde(rename = "lucro_liquido")]
    pub net_profit: f64,
    #[serde(rename = "faturamento")]
    pub revenue: f64,
    #[serde(rename = "quantidade")]
    pub units: i64,
}
