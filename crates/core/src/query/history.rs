use crate::domain::analytics::{HistoryEntry, SourceTag};
use crate::time::reporting::trailing_window;
use anyhow::Context;
use chrono::NaiveDate;

type CtrRow = (NaiveDate, String, i64, i64, f64);
type ViewRow = (NaiveDate, String, i64);

/// Entries from both relations for one advertiser in the trailing 7-day
/// window ending at `day`, merged into a single source-tagged chronological
/// stream. No rows is a normal outcome and yields an empty list.
pub async fn fetch(
    pool: &sqlx::PgPool,
    advertiser_id: &str,
    day: NaiveDate,
) -> anyhow::Result<Vec<HistoryEntry>> {
    let (start, end) = trailing_window(day);

    let ctr_rows = sqlx::query_as::<_, CtrRow>(
        "SELECT insert_date, product_id, click::int8, impression::int8, ctr::float8 \
         FROM top_ctr \
         WHERE advertiser_id = $1 AND insert_date BETWEEN $2 AND $3",
    )
    .bind(advertiser_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await
    .context("select top_ctr history failed")?;

    let view_rows = sqlx::query_as::<_, ViewRow>(
        "SELECT insert_date, product_id, views::int8 \
         FROM top_products \
         WHERE advertiser_id = $1 AND insert_date BETWEEN $2 AND $3",
    )
    .bind(advertiser_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await
    .context("select top_products history failed")?;

    Ok(merge_entries(ctr_rows, view_rows))
}

/// Pure merge of the two row sources. Each entry carries only the fields of
/// its own source; order is date ascending, ctr entries before products
/// entries within a date, then product_id ascending.
fn merge_entries(ctr_rows: Vec<CtrRow>, view_rows: Vec<ViewRow>) -> Vec<HistoryEntry> {
    let mut entries = Vec::with_capacity(ctr_rows.len() + view_rows.len());

    for (date, product_id, click, impression, ctr) in ctr_rows {
        entries.push(HistoryEntry {
            date,
            product_id,
            source: SourceTag::Ctr,
            click: Some(click),
            impression: Some(impression),
            ctr: Some(ctr),
            views: None,
        });
    }

    for (date, product_id, views) in view_rows {
        entries.push(HistoryEntry {
            date,
            product_id,
            source: SourceTag::Products,
            click: None,
            impression: None,
            ctr: None,
            views: Some(views),
        });
    }

    entries.sort_by(|a, b| {
        (a.date, a.source.merge_rank(), a.product_id.as_str()).cmp(&(
            b.date,
            b.source.merge_rank(),
            b.product_id.as_str(),
        ))
    });

    entries
}
