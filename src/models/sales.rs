use chrono::NaiveDate;
use serde::Serialize;

use crate::date_utils::month_label;

/// Sales-detail statuses that mark a line as final ("completed", "reviewed").
pub const SALES_DETAIL_STATUSES: &[&str] = &["完结", "已审核"];

/// Order statuses that count as sold ("delivery started", "split order",
/// "order completed").
pub const ORDER_STATUSES: &[&str] = &["开始送货", "拆单", "订单完结"];

/// A cleaned, categorized sales or return line item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesDetailRecord {
    pub doc_date: NaiveDate,
    pub member_name: String,
    pub store_name: String,
    pub product_name: String,
    pub category: String,
    pub sale_amount: f64,
    pub performance_amount: f64,
    pub doc_status: String,
}

impl SalesDetailRecord {
    pub fn month(&self) -> String {
        month_label(self.doc_date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRecord {
    pub doc_date: NaiveDate,
    pub member_name: String,
    pub store_name: String,
    pub paid_amount: f64,
    pub doc_status: String,
}

impl OrderRecord {
    pub fn month(&self) -> String {
        month_label(self.doc_date)
    }
}
