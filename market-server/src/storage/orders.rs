//! Order persistence

use redb::{ReadableDatabase, ReadableTable};
use shared::models::{Order, OrderStatus};

use super::{COUNTERS_TABLE, MarketStorage, ORDER_NO_KEY, ORDERS_TABLE, StorageError, StorageResult};

/// Order listing filter. Soft-deleted orders are excluded unless asked for.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub customer_id: Option<String>,
    pub seller_id: Option<String>,
    pub status: Option<OrderStatus>,
    pub include_deleted: bool,
}

impl OrderFilter {
    pub fn for_customer(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: Some(customer_id.into()),
            ..Default::default()
        }
    }

    pub fn for_seller(seller_id: impl Into<String>) -> Self {
        Self {
            seller_id: Some(seller_id.into()),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: Option<OrderStatus>) -> Self {
        self.status = status;
        self
    }

    pub fn matches(&self, order: &Order) -> bool {
        (self.include_deleted || !order.is_deleted)
            && self.customer_id.as_ref().is_none_or(|c| *c == order.customer_id)
            && self.seller_id.as_ref().is_none_or(|s| *s == order.seller_id)
            && self.status.is_none_or(|s| s == order.status)
    }
}

impl MarketStorage {
    /// Get and increment the order number atomically
    pub fn next_order_no(&self) -> StorageResult<u64> {
        let txn = self.db().begin_write()?;
        let mut table = txn.open_table(COUNTERS_TABLE)?;
        let current = table.get(ORDER_NO_KEY)?.map(|g| g.value()).unwrap_or(0);
        let next = current + 1;
        table.insert(ORDER_NO_KEY, next)?;
        drop(table);
        txn.commit()?;
        Ok(next)
    }

    pub fn insert_order(&self, order: &Order) -> StorageResult<()> {
        let txn = self.db().begin_write()?;
        {
            let mut table = txn.open_table(ORDERS_TABLE)?;
            let value = serde_json::to_vec(order)?;
            table.insert(order.id.as_str(), value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Find by id, soft-deleted orders included
    pub fn get_order(&self, order_id: &str) -> StorageResult<Option<Order>> {
        let read_txn = self.db().begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Filtered listing, newest first, with skip/limit.
    /// Returns the page and the total match count.
    pub fn find_orders(
        &self,
        filter: &OrderFilter,
        skip: usize,
        limit: usize,
    ) -> StorageResult<(Vec<Order>, u64)> {
        let read_txn = self.db().begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        let mut matched = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let order: Order = serde_json::from_slice(value.value())?;
            if filter.matches(&order) {
                matched.push(order);
            }
        }

        matched.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.order_no.cmp(&a.order_no))
        });
        let total = matched.len() as u64;
        let page = matched.into_iter().skip(skip).take(limit).collect();
        Ok((page, total))
    }

    /// Atomic conditional status update
    ///
    /// Succeeds only when the stored status still equals `expected`.
    /// Completing an order stamps `delivered_at`.
    pub fn compare_and_set_status(
        &self,
        order_id: &str,
        expected: OrderStatus,
        next: OrderStatus,
        now: i64,
    ) -> StorageResult<Order> {
        let txn = self.db().begin_write()?;
        let order = {
            let mut table = txn.open_table(ORDERS_TABLE)?;
            let current: Option<Order> = table
                .get(order_id)?
                .map(|g| serde_json::from_slice(g.value()))
                .transpose()?;

            let mut order = match current {
                Some(o) if !o.is_deleted => o,
                _ => return Err(StorageError::OrderNotFound(order_id.to_string())),
            };
            if order.status != expected {
                return Err(StorageError::StatusConflict {
                    order_id: order_id.to_string(),
                    expected,
                    actual: order.status,
                });
            }

            order.status = next;
            order.updated_at = now;
            if next == OrderStatus::Completed {
                order.delivered_at = Some(now);
            }
            let value = serde_json::to_vec(&order)?;
            table.insert(order_id, value.as_slice())?;
            order
        };
        txn.commit()?;
        Ok(order)
    }

    /// Flag-based delete; the record stays in the table
    pub fn soft_delete_order(&self, order_id: &str, now: i64) -> StorageResult<()> {
        let txn = self.db().begin_write()?;
        {
            let mut table = txn.open_table(ORDERS_TABLE)?;
            let current: Option<Order> = table
                .get(order_id)?
                .map(|g| serde_json::from_slice(g.value()))
                .transpose()?;
            let mut order =
                current.ok_or_else(|| StorageError::OrderNotFound(order_id.to_string()))?;
            order.is_deleted = true;
            order.updated_at = now;
            let value = serde_json::to_vec(&order)?;
            table.insert(order_id, value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Number of completed order lines of `product_id` bought by `customer_id`
    pub fn count_purchased(&self, customer_id: &str, product_id: &str) -> StorageResult<u64> {
        let filter = OrderFilter::for_customer(customer_id).with_status(Some(OrderStatus::Completed));
        let read_txn = self.db().begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        let mut count = 0u64;
        for result in table.iter()? {
            let (_key, value) = result?;
            let order: Order = serde_json::from_slice(value.value())?;
            if filter.matches(&order) {
                count += order.items.iter().filter(|l| l.product_id == product_id).count() as u64;
            }
        }
        Ok(count)
    }

    /// Distinct sellers the customer has non-deleted orders with
    pub fn sellers_ordered_from(&self, customer_id: &str) -> StorageResult<Vec<String>> {
        let filter = OrderFilter::for_customer(customer_id);
        let read_txn = self.db().begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        let mut sellers: Vec<String> = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let order: Order = serde_json::from_slice(value.value())?;
            if filter.matches(&order) && !sellers.contains(&order.seller_id) {
                sellers.push(order.seller_id);
            }
        }
        Ok(sellers)
    }
}
