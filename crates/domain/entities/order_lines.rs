use diesel::prelude::*;

use crate::infra::db::postgres::schema::order_lines;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = order_lines)]
pub struct OrderLineEntity {
    pub id: i64,
    pub order_id: i64,
    pub product_name: String,
    pub variant_name: Option<String>,
    pub quantity: i32,
    pub unit_price_minor: i64,
    pub line_total_minor: i64,
}
