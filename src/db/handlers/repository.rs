//! Common CRUD interface implemented by every database repository.

use async_trait::async_trait;

use crate::db::errors::Result;

/// Uniform create/read/update/delete surface over a table.
///
/// Repositories borrow a connection for their lifetime, so a single
/// transaction can be threaded through several of them. Domain-specific
/// queries (joins, approval flips, counts) live on the concrete types.
#[async_trait]
pub trait Repository {
    type CreateRequest: Send + Sync;
    type UpdateRequest: Send + Sync;
    type Response: Send + Sync;
    type Id: Send + Sync;
    type Filter: Send + Sync;

    /// Insert a new record and return the stored row.
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response>;

    /// Fetch a single record, `None` if it does not exist.
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>>;

    /// List records matching the filter.
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>>;

    /// Apply a partial update and return the new row. Fails with
    /// [`crate::db::errors::DbError::NotFound`] if the record is missing.
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest)
    -> Result<Self::Response>;

    /// Delete a record, returning whether a row was removed.
    async fn delete(&mut self, id: Self::Id) -> Result<bool>;
}
