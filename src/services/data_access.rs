use std::sync::Arc;

use tracing::error;

use crate::date_utils::DateRange;
use crate::db::queries::sales;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{OrderRecord, SalesDetailRecord};
use crate::services::normalizer::{categorize_optional, normalize_optional, OTHER_CATEGORY};

/// Reads cleaned sales details and orders from the store.
///
/// Each fetch checks a connection out of the pool and hands it back when the
/// guard drops, on success and on every error path alike.
///
/// Store failures are handled by policy: by default they are logged and the
/// fetch yields no records, so an unreachable store reads as an empty range.
/// With `strict` set they propagate to the caller instead.
#[derive(Clone)]
pub struct SalesRepository {
    pool: DbPool,
    excluded_members: Arc<[String]>,
    strict: bool,
}

impl SalesRepository {
    pub fn new(pool: DbPool, excluded_members: Vec<String>, strict: bool) -> Self {
        Self {
            pool,
            excluded_members: excluded_members.into(),
            strict,
        }
    }

    pub fn fetch_sales_details(&self, range: DateRange) -> AppResult<Vec<SalesDetailRecord>> {
        let rows = self.with_fail_soft("sales details", |repo| {
            let conn = repo.pool.get()?;
            Ok(sales::list_sales_details(&conn, range, &repo.excluded_members)?)
        })?;

        Ok(rows
            .into_iter()
            .filter_map(|raw| {
                let category = categorize_optional(raw.product_name.as_deref());
                if category == OTHER_CATEGORY {
                    return None;
                }
                Some(SalesDetailRecord {
                    doc_date: raw.doc_date,
                    member_name: raw.member_name.unwrap_or_default(),
                    store_name: raw.store_name.unwrap_or_default(),
                    product_name: normalize_optional(raw.product_name.as_deref())
                        .unwrap_or_default(),
                    category: category.to_string(),
                    sale_amount: raw.sale_amount,
                    performance_amount: raw.performance_amount,
                    doc_status: raw.doc_status,
                })
            })
            .collect())
    }

    pub fn fetch_orders(&self, range: DateRange) -> AppResult<Vec<OrderRecord>> {
        self.with_fail_soft("orders", |repo| {
            let conn = repo.pool.get()?;
            Ok(sales::list_orders(&conn, range, &repo.excluded_members)?)
        })
    }

    fn with_fail_soft<T>(
        &self,
        what: &str,
        fetch: impl FnOnce(&Self) -> AppResult<Vec<T>>,
    ) -> AppResult<Vec<T>> {
        match fetch(self) {
            Ok(rows) => Ok(rows),
            Err(e) if self.strict => Err(e),
            Err(e) => {
                error!(error = %e, records = what, "Store query failed, continuing with no data");
                Ok(Vec::new())
            }
        }
    }
}
