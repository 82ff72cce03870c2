use chrono::NaiveDate;
use rusqlite::{Connection, ToSql};
use tracing::{debug, warn};

use crate::date_utils::{parse_doc_date, DateRange};
use crate::models::{OrderRecord, ORDER_STATUSES, SALES_DETAIL_STATUSES};

/// A sales-detail row as stored, before category assignment.
#[derive(Debug, Clone)]
pub struct RawSalesDetail {
    pub doc_date: NaiveDate,
    pub member_name: Option<String>,
    pub store_name: Option<String>,
    pub product_name: Option<String>,
    pub sale_amount: f64,
    pub performance_amount: f64,
    pub doc_status: String,
}

/// Date, status and account restrictions shared by both record sets.
struct RecordFilter<'a> {
    range: DateRange,
    statuses: &'a [&'a str],
    excluded_members: &'a [String],
}

impl RecordFilter<'_> {
    /// Append the WHERE conditions and their parameters.
    fn push_conditions(&self, sql: &mut String, params_vec: &mut Vec<Box<dyn ToSql>>) {
        sql.push_str(" WHERE date(doc_date) BETWEEN ? AND ?");
        params_vec.push(Box::new(self.range.from_param()));
        params_vec.push(Box::new(self.range.to_param()));

        sql.push_str(&format!(
            " AND doc_status IN ({})",
            placeholders(self.statuses.len())
        ));
        for status in self.statuses {
            params_vec.push(Box::new(status.to_string()));
        }

        if !self.excluded_members.is_empty() {
            sql.push_str(&format!(
                " AND member_name NOT IN ({})",
                placeholders(self.excluded_members.len())
            ));
            for member in self.excluded_members {
                params_vec.push(Box::new(member.clone()));
            }
        }
    }
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}

pub fn list_sales_details(
    conn: &Connection,
    range: DateRange,
    excluded_members: &[String],
) -> rusqlite::Result<Vec<RawSalesDetail>> {
    let filter = RecordFilter {
        range,
        statuses: SALES_DETAIL_STATUSES,
        excluded_members,
    };

    let mut sql = String::from(
        "SELECT doc_date, member_name, store_name, product_name,
                sale_amount, performance_amount, doc_status
         FROM product_order_sales_return_details",
    );
    let mut params_vec: Vec<Box<dyn ToSql>> = Vec::new();
    filter.push_conditions(&mut sql, &mut params_vec);
    sql.push_str(" ORDER BY doc_date, id");

    let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_refs.as_slice(), |row| {
        Ok((
            row.get::<_, String>(0)?,
            RawSalesDetail {
                doc_date: NaiveDate::default(),
                member_name: row.get(1)?,
                store_name: row.get(2)?,
                product_name: row.get(3)?,
                sale_amount: row.get::<_, Option<f64>>(4)?.unwrap_or(0.0),
                performance_amount: row.get::<_, Option<f64>>(5)?.unwrap_or(0.0),
                doc_status: row.get(6)?,
            },
        ))
    })?;

    let mut details = Vec::new();
    for row in rows {
        let (doc_date, mut detail) = row?;
        let Some(date) = parse_doc_date(&doc_date) else {
            warn!(doc_date = %doc_date, "Skipping sales detail with unparseable document date");
            continue;
        };
        detail.doc_date = date;
        details.push(detail);
    }

    debug!(
        count = details.len(),
        from = %range.from,
        to = %range.to,
        "Queried sales details"
    );
    Ok(details)
}

pub fn list_orders(
    conn: &Connection,
    range: DateRange,
    excluded_members: &[String],
) -> rusqlite::Result<Vec<OrderRecord>> {
    let filter = RecordFilter {
        range,
        statuses: ORDER_STATUSES,
        excluded_members,
    };

    let mut sql = String::from(
        "SELECT doc_date, member_name, store_name, paid_amount, doc_status
         FROM product_order",
    );
    let mut params_vec: Vec<Box<dyn ToSql>> = Vec::new();
    filter.push_conditions(&mut sql, &mut params_vec);
    sql.push_str(" ORDER BY doc_date, id");

    let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_refs.as_slice(), |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, Option<String>>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, Option<f64>>(3)?,
            row.get::<_, String>(4)?,
        ))
    })?;

    let mut orders = Vec::new();
    for row in rows {
        let (doc_date, member_name, store_name, paid_amount, doc_status) = row?;
        let Some(date) = parse_doc_date(&doc_date) else {
            warn!(doc_date = %doc_date, "Skipping order with unparseable document date");
            continue;
        };
        orders.push(OrderRecord {
            doc_date: date,
            member_name: member_name.unwrap_or_default(),
            store_name: store_name.unwrap_or_default(),
            paid_amount: paid_amount.unwrap_or(0.0),
            doc_status,
        });
    }

    debug!(
        count = orders.len(),
        from = %range.from,
        to = %range.to,
        "Queried orders"
    );
    Ok(orders)
}
