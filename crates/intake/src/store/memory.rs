//! In-process record store.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{RecordStore, RowValues, SheetRow, StoreError};

/// Record store holding rows in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: RwLock<Vec<RowValues>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with rows, in order.
    #[must_use]
    pub fn with_rows(rows: Vec<RowValues>) -> Self {
        Self {
            rows: RwLock::new(rows),
        }
    }

    /// Number of data rows.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    /// Returns `true` if the table has no data rows.
    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list_rows(&self) -> Result<Vec<SheetRow>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .enumerate()
            .map(|(index, cells)| SheetRow::new(index, cells.clone()))
            .collect())
    }

    async fn append_row(&self, values: RowValues) -> Result<SheetRow, StoreError> {
        let mut rows = self.rows.write().await;
        rows.push(values.clone());
        Ok(SheetRow::new(rows.len() - 1, values))
    }

    async fn save_row(&self, row: &SheetRow) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        let slot = rows
            .get_mut(row.index)
            .ok_or(StoreError::RowMissing(row.index))?;
        slot.clone_from(row.cells());
        Ok(())
    }

    async fn delete_row(&self, row: &SheetRow) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        if row.index >= rows.len() {
            return Err(StoreError::RowMissing(row.index));
        }
        rows.remove(row.index);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::Column;

    fn named(name: &str) -> RowValues {
        RowValues::from([(Column::FullName.header().to_string(), name.to_string())])
    }

    #[tokio::test]
    async fn test_append_assigns_next_position() {
        let store = MemoryStore::with_rows(vec![named("Ana")]);
        let row = store.append_row(named("Bruno")).await.unwrap();
        assert_eq!(row.index, 1);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_save_overwrites_in_place() {
        let store = MemoryStore::with_rows(vec![named("Ana"), named("Bruno")]);
        let mut row = store.list_rows().await.unwrap().remove(1);
        row.set(Column::FullName, "Bruna");
        store.save_row(&row).await.unwrap();

        let rows = store.list_rows().await.unwrap();
        assert_eq!(rows[0].get(Column::FullName), Some("Ana"));
        assert_eq!(rows[1].get(Column::FullName), Some("Bruna"));
    }

    #[tokio::test]
    async fn test_delete_shifts_later_rows() {
        let store = MemoryStore::with_rows(vec![named("Ana"), named("Bruno"), named("Carla")]);
        let row = store.list_rows().await.unwrap().remove(0);
        store.delete_row(&row).await.unwrap();

        let rows = store.list_rows().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].index, 0);
        assert_eq!(rows[0].get(Column::FullName), Some("Bruno"));
    }

    #[tokio::test]
    async fn test_stale_position_is_reported() {
        let store = MemoryStore::new();
        let row = SheetRow::new(3, named("Ana"));
        assert!(matches!(
            store.save_row(&row).await,
            Err(StoreError::RowMissing(3))
        ));
        assert!(matches!(
            store.delete_row(&row).await,
            Err(StoreError::RowMissing(3))
        ));
    }
}
