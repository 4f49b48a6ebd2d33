use crate::domain::analytics::DiagnosticCount;
use crate::query::DiagnosticMetric;
use anyhow::Context;
use chrono::NaiveDate;

/// Distinct-product counts over the current day's `top_ctr` rows, grouped by
/// the requested axis.
///
/// The `product` axis reproduces the upstream contract as-is: grouping by
/// `product_id` makes the distinct count a constant 1 per row. See DESIGN.md.
pub async fn fetch(
    pool: &sqlx::PgPool,
    metric: DiagnosticMetric,
    day: NaiveDate,
) -> anyhow::Result<Vec<DiagnosticCount>> {
    let sql = match metric {
        DiagnosticMetric::Adv => {
            "SELECT advertiser_id, COUNT(DISTINCT product_id)::int8 \
             FROM top_ctr \
             WHERE insert_date = $1 \
             GROUP BY advertiser_id \
             ORDER BY advertiser_id ASC"
        }
        DiagnosticMetric::Product => {
            "SELECT product_id, COUNT(DISTINCT product_id)::int8 \
             FROM top_ctr \
             WHERE insert_date = $1 \
             GROUP BY product_id \
             ORDER BY product_id ASC"
        }
    };

    let rows = sqlx::query_as::<_, (String, i64)>(sql)
        .bind(day)
        .fetch_all(pool)
        .await
        .context("select diagnostic counts failed")?;

    let mut out = Vec::with_capacity(rows.len());
    for (id, count) in rows {
        out.push(DiagnosticCount { id, count });
    }
    Ok(out)
}
