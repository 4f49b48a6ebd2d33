use crate::domain::analytics::{
    DailyCtrExtremes, MetricResult, PositiveCtrCount, RankedPair, StatsReport,
};
use anyhow::Context;
use chrono::NaiveDate;

/// Computes the four summary metrics, each from its own query. A failure in
/// one metric is reported in that metric's slot and never takes the other
/// three down with it.
pub async fn fetch(pool: &sqlx::PgPool) -> StatsReport {
    StatsReport {
        total_advertisers: metric("total_advertisers", total_advertisers(pool).await),
        positive_ctr_counts: metric("positive_ctr_counts", positive_ctr_counts(pool).await),
        top_ranked_pairs: metric("top_ranked_pairs", top_ranked_pairs(pool).await),
        daily_ctr_extremes: metric("daily_ctr_extremes", daily_ctr_extremes(pool).await),
    }
}

fn metric<T>(name: &'static str, result: anyhow::Result<T>) -> MetricResult<T> {
    match result {
        Ok(value) => MetricResult::Ok(value),
        Err(e) => {
            tracing::error!(metric = name, error = %e, "stats metric query failed");
            MetricResult::Err {
                error: format!("{e:#}"),
            }
        }
    }
}

// Distinct advertisers across the union of both relations. An advertiser
// present in only one of them still counts once.
async fn total_advertisers(pool: &sqlx::PgPool) -> anyhow::Result<i64> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*)::int8 FROM ( \
             SELECT advertiser_id FROM top_ctr \
             UNION \
             SELECT advertiser_id FROM top_products \
         ) advertisers",
    )
    .fetch_one(pool)
    .await
    .context("count distinct advertisers failed")?;
    Ok(count)
}

// Advertisers with no positive-CTR rows are omitted, not zero-valued.
async fn positive_ctr_counts(pool: &sqlx::PgPool) -> anyhow::Result<Vec<PositiveCtrCount>> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        "SELECT advertiser_id, COUNT(DISTINCT product_id)::int8 \
         FROM top_ctr \
         WHERE ctr > 0 \
         GROUP BY advertiser_id \
         ORDER BY advertiser_id ASC",
    )
    .fetch_all(pool)
    .await
    .context("count positive-ctr products failed")?;

    let mut out = Vec::with_capacity(rows.len());
    for (advertiser_id, products) in rows {
        out.push(PositiveCtrCount {
            advertiser_id,
            products,
        });
    }
    Ok(out)
}

// Top 10 (advertiser, product) pairs by views summed over all days.
// Ties break by advertiser_id then product_id so the ranking is reproducible.
async fn top_ranked_pairs(pool: &sqlx::PgPool) -> anyhow::Result<Vec<RankedPair>> {
    let rows = sqlx::query_as::<_, (String, String, i64)>(
        "SELECT advertiser_id, product_id, SUM(views)::int8 AS total_views \
         FROM top_products \
         GROUP BY advertiser_id, product_id \
         ORDER BY total_views DESC, advertiser_id ASC, product_id ASC \
         LIMIT 10",
    )
    .fetch_all(pool)
    .await
    .context("rank advertiser/product pairs by views failed")?;

    let mut out = Vec::with_capacity(rows.len());
    for (advertiser_id, product_id, total_views) in rows {
        out.push(RankedPair {
            advertiser_id,
            product_id,
            total_views,
        });
    }
    Ok(out)
}

async fn daily_ctr_extremes(pool: &sqlx::PgPool) -> anyhow::Result<Vec<DailyCtrExtremes>> {
    let rows = sqlx::query_as::<_, (NaiveDate, f64, f64)>(
        "SELECT insert_date, AVG(ctr)::float8, MAX(ctr)::float8 \
         FROM top_ctr \
         GROUP BY insert_date \
         ORDER BY insert_date ASC",
    )
    .fetch_all(pool)
    .await
    .context("aggregate daily ctr extremes failed")?;

    let mut out = Vec::with_capacity(rows.len());
    for (date, mean, max) in rows {
        out.push(DailyCtrExtremes {
            date,
            mean_ctr: round4(mean),
            max_ctr: round4(max),
        });
    }
    Ok(out)
}

// Half-up to 4 decimal places. f64::round is half-away-from-zero, which is
// half-up on the non-negative CTR domain.
fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round4_truncates_to_four_places() {
        assert_eq!(round4(0.123_456), 0.1235);
        assert_eq!(round4(2.0 / 3.0), 0.6667);
        assert_eq!(round4(0.5), 0.5);
        assert_eq!(round4(0.0), 0.0);
    }

    #[test]
    fn round4_rounds_up_past_the_midpoint() {
        assert_eq!(round4(0.123_46), 0.1235);
        assert_eq!(round4(0.999_96), 1.0);
        assert_eq!(round4(0.000_04), 0.0);
    }

    #[test]
    fn round4_preserves_mean_not_above_max() {
        let mean = round4(0.333_333_3);
        let max = round4(0.9);
        assert!(mean <= max);
    }

    #[test]
    fn failed_metric_is_isolated_into_its_slot() {
        let failed: MetricResult<i64> = metric("total_advertisers", Err(anyhow::anyhow!("boom")));
        match failed {
            MetricResult::Err { error } => assert!(error.contains("boom")),
            MetricResult::Ok(_) => panic!("expected the error slot"),
        }

        let ok = metric("total_advertisers", Ok(3_i64));
        assert!(ok.is_ok());
    }
}
