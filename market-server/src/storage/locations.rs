//! Location persistence

use redb::{ReadableDatabase, ReadableTable};
use shared::models::Location;

use super::{LOCATIONS_TABLE, MarketStorage, StorageResult, USER_LOCATIONS_TABLE};

impl MarketStorage {
    pub fn insert_location(&self, location: &Location) -> StorageResult<()> {
        let txn = self.db().begin_write()?;
        {
            let mut table = txn.open_table(LOCATIONS_TABLE)?;
            let value = serde_json::to_vec(location)?;
            table.insert(location.id.as_str(), value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn get_location(&self, location_id: &str) -> StorageResult<Option<Location>> {
        let read_txn = self.db().begin_read()?;
        let table = read_txn.open_table(LOCATIONS_TABLE)?;

        match table.get(location_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Physically removes the record. Returns it if it existed.
    pub fn remove_location(&self, location_id: &str) -> StorageResult<Option<Location>> {
        let txn = self.db().begin_write()?;
        let removed = {
            let mut table = txn.open_table(LOCATIONS_TABLE)?;
            let removed: Option<Location> = table
                .remove(location_id)?
                .map(|g| serde_json::from_slice(g.value()))
                .transpose()?;
            removed
        };
        txn.commit()?;
        Ok(removed)
    }

    /// Point `user_id` at `location_id` and delete the superseded record,
    /// in one write transaction. Returns the superseded id.
    pub fn assign_user_location(
        &self,
        user_id: &str,
        location_id: &str,
    ) -> StorageResult<Option<String>> {
        let txn = self.db().begin_write()?;
        let previous = {
            let mut assignments = txn.open_table(USER_LOCATIONS_TABLE)?;
            let previous = assignments
                .insert(user_id, location_id)?
                .map(|g| g.value().to_string())
                .filter(|old| old != location_id);
            if let Some(old) = previous.as_deref() {
                let mut locations = txn.open_table(LOCATIONS_TABLE)?;
                locations.remove(old)?;
            }
            previous
        };
        txn.commit()?;
        Ok(previous)
    }

    pub fn get_user_location(&self, user_id: &str) -> StorageResult<Option<String>> {
        let read_txn = self.db().begin_read()?;
        let table = read_txn.open_table(USER_LOCATIONS_TABLE)?;
        Ok(table.get(user_id)?.map(|g| g.value().to_string()))
    }

    /// Every stored (user_id, location_id) pair
    pub fn user_locations(&self) -> StorageResult<Vec<(String, String)>> {
        let read_txn = self.db().begin_read()?;
        let table = read_txn.open_table(USER_LOCATIONS_TABLE)?;
        let mut pairs = Vec::new();
        for result in table.iter()? {
            let (user_id, location_id) = result?;
            pairs.push((user_id.value().to_string(), location_id.value().to_string()));
        }
        Ok(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::LocationInput;

    #[test]
    fn test_location_lifecycle() {
        let storage = MarketStorage::open_in_memory().unwrap();
        let input = LocationInput {
            latitude: 10.7769,
            longitude: 106.7009,
            address: Some("Bến Thành".into()),
        };
        let loc = Location::new("l1", &input, 1);
        storage.insert_location(&loc).unwrap();

        assert_eq!(storage.get_location("l1").unwrap(), Some(loc.clone()));
        assert_eq!(storage.remove_location("l1").unwrap(), Some(loc));
        assert!(storage.get_location("l1").unwrap().is_none());
        assert!(storage.remove_location("l1").unwrap().is_none());
    }

    #[test]
    fn test_assignment_replaces_and_drops_old_record() {
        let storage = MarketStorage::open_in_memory().unwrap();
        let input = LocationInput {
            latitude: 10.0,
            longitude: 106.0,
            address: None,
        };
        storage.insert_location(&Location::new("l1", &input, 1)).unwrap();
        storage.insert_location(&Location::new("l2", &input, 2)).unwrap();

        assert_eq!(storage.assign_user_location("s1", "l1").unwrap(), None);
        assert_eq!(storage.assign_user_location("s1", "l1").unwrap(), None);
        assert_eq!(storage.assign_user_location("s1", "l2").unwrap().as_deref(), Some("l1"));

        assert!(storage.get_location("l1").unwrap().is_none());
        assert!(storage.get_location("l2").unwrap().is_some());
        assert_eq!(storage.get_user_location("s1").unwrap().as_deref(), Some("l2"));
        assert_eq!(
            storage.user_locations().unwrap(),
            vec![("s1".to_string(), "l2".to_string())]
        );
    }
}
