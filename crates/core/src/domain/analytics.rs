use chrono::NaiveDate;
use serde::Serialize;

/// Which relation a history entry came from. Serialized as `ctr` / `products`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTag {
    Ctr,
    Products,
}

impl SourceTag {
    // Merge order within a date: ctr entries sort before products entries.
    pub(crate) fn merge_rank(self) -> u8 {
        match self {
            SourceTag::Ctr => 0,
            SourceTag::Products => 1,
        }
    }
}

/// One product selected for an advertiser on the query date. The shape
/// depends on which dataset the caller asked for.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RankedItem {
    Ctr {
        product_id: String,
        ctr: f64,
        click: i64,
        impression: i64,
    },
    Views {
        product_id: String,
        views: i64,
    },
}

/// One row of the unified history stream. Fields belonging to the other
/// source are `None` and omitted from the JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub date: NaiveDate,
    pub product_id: String,
    pub source: SourceTag,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impression: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctr: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views: Option<i64>,
}

/// Outcome of one independently computed summary metric. Serializes to the
/// metric's value on success or to `{"error": msg}` when its query failed.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MetricResult<T> {
    Ok(T),
    Err { error: String },
}

impl<T> MetricResult<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, MetricResult::Ok(_))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub total_advertisers: MetricResult<i64>,
    pub positive_ctr_counts: MetricResult<Vec<PositiveCtrCount>>,
    pub top_ranked_pairs: MetricResult<Vec<RankedPair>>,
    pub daily_ctr_extremes: MetricResult<Vec<DailyCtrExtremes>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PositiveCtrCount {
    pub advertiser_id: String,
    pub products: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedPair {
    pub advertiser_id: String,
    pub product_id: String,
    pub total_views: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyCtrExtremes {
    pub date: NaiveDate,
    pub mean_ctr: f64,
    pub max_ctr: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticCount {
    pub id: String,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn ctr_history_entry_omits_views() {
        let entry = HistoryEntry {
            date: NaiveDate::from_ymd_opt(2026, 8, 20).unwrap(),
            product_id: "P1".to_string(),
            source: SourceTag::Ctr,
            click: Some(3),
            impression: Some(100),
            ctr: Some(0.03),
            views: None,
        };
        let v = serde_json::to_value(&entry).unwrap();
        assert_eq!(v["source"], "ctr");
        assert_eq!(v["date"], "2026-08-20");
        assert_eq!(v["click"], 3);
        assert!(v.get("views").is_none());
    }

    #[test]
    fn products_history_entry_omits_ctr_fields() {
        let entry = HistoryEntry {
            date: NaiveDate::from_ymd_opt(2026, 8, 21).unwrap(),
            product_id: "P2".to_string(),
            source: SourceTag::Products,
            click: None,
            impression: None,
            ctr: None,
            views: Some(42),
        };
        let v = serde_json::to_value(&entry).unwrap();
        assert_eq!(v["source"], "products");
        assert_eq!(v["views"], 42);
        assert!(v.get("click").is_none());
        assert!(v.get("impression").is_none());
        assert!(v.get("ctr").is_none());
    }

    #[test]
    fn metric_result_serializes_value_or_error_object() {
        let ok: MetricResult<i64> = MetricResult::Ok(7);
        assert_eq!(serde_json::to_value(&ok).unwrap(), serde_json::json!(7));

        let err: MetricResult<i64> = MetricResult::Err {
            error: "query failed".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!({"error": "query failed"})
        );
    }

    #[test]
    fn ranked_item_variants_carry_only_their_metric() {
        let ctr = RankedItem::Ctr {
            product_id: "P1".to_string(),
            ctr: 0.5,
            click: 10,
            impression: 20,
        };
        let v = serde_json::to_value(&ctr).unwrap();
        assert_eq!(v["ctr"], 0.5);
        assert!(v.get("views").is_none());

        let views = RankedItem::Views {
            product_id: "P2".to_string(),
            views: 9,
        };
        let v = serde_json::to_value(&views).unwrap();
        assert_eq!(v["views"], 9);
        assert!(v.get("ctr").is_none());
    }
}
