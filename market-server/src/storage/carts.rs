//! Stored cart persistence

use redb::{ReadableDatabase, ReadableTable};
use shared::models::Cart;

use super::{CARTS_TABLE, MarketStorage, StorageError, StorageResult};

impl MarketStorage {
    pub fn get_cart(&self, customer_id: &str) -> StorageResult<Option<Cart>> {
        let read_txn = self.db().begin_read()?;
        let table = read_txn.open_table(CARTS_TABLE)?;

        match table.get(customer_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Read-modify-recompute-write inside one write transaction
    ///
    /// `mutate` works on the stored cart (or an empty one). When it fails
    /// the transaction is dropped and nothing is written. Totals are fully
    /// recomputed before persisting.
    pub fn mutate_cart<T, E>(
        &self,
        customer_id: &str,
        now: i64,
        mutate: impl FnOnce(&mut Cart) -> Result<T, E>,
    ) -> Result<(Cart, T), E>
    where
        E: From<StorageError>,
    {
        let txn = self.db().begin_write().map_err(StorageError::from)?;
        let (cart, output) = {
            let mut table = txn.open_table(CARTS_TABLE).map_err(StorageError::from)?;
            let stored: Option<Cart> = table
                .get(customer_id)
                .map_err(StorageError::from)?
                .map(|g| serde_json::from_slice(g.value()))
                .transpose()
                .map_err(StorageError::from)?;

            let mut cart = stored.unwrap_or_else(|| Cart::empty(customer_id));
            let output = mutate(&mut cart)?;
            cart.recompute_totals();
            cart.updated_at = now;

            let value = serde_json::to_vec(&cart).map_err(StorageError::from)?;
            table
                .insert(customer_id, value.as_slice())
                .map_err(StorageError::from)?;
            (cart, output)
        };
        txn.commit().map_err(StorageError::from)?;
        Ok((cart, output))
    }
}
