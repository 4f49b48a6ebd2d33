use crate::domain::analytics::RankedItem;
use crate::query::Model;
use anyhow::Context;
use chrono::NaiveDate;

/// All products recorded for one advertiser on `day` under the chosen
/// dataset. No ranking cut and no CTR filtering; rows come back sorted by
/// `product_id` so repeated calls are stable.
pub async fn fetch(
    pool: &sqlx::PgPool,
    advertiser_id: &str,
    model: Model,
    day: NaiveDate,
) -> anyhow::Result<Vec<RankedItem>> {
    match model {
        Model::TopCtr => {
            let rows = sqlx::query_as::<_, (String, f64, i64, i64)>(
                "SELECT product_id, ctr::float8, click::int8, impression::int8 \
                 FROM top_ctr \
                 WHERE advertiser_id = $1 AND insert_date = $2 \
                 ORDER BY product_id ASC",
            )
            .bind(advertiser_id)
            .bind(day)
            .fetch_all(pool)
            .await
            .context("select top_ctr recommendations failed")?;

            let mut out = Vec::with_capacity(rows.len());
            for (product_id, ctr, click, impression) in rows {
                out.push(RankedItem::Ctr {
                    product_id,
                    ctr,
                    click,
                    impression,
                });
            }
            Ok(out)
        }
        Model::TopProducts => {
            let rows = sqlx::query_as::<_, (String, i64)>(
                "SELECT product_id, views::int8 \
                 FROM top_products \
                 WHERE advertiser_id = $1 AND insert_date = $2 \
                 ORDER BY product_id ASC",
            )
            .bind(advertiser_id)
            .bind(day)
            .fetch_all(pool)
            .await
            .context("select top_products recommendations failed")?;

            let mut out = Vec::with_capacity(rows.len());
            for (product_id, views) in rows {
                out.push(RankedItem::Views { product_id, views });
            }
            Ok(out)
        }
    }
}
