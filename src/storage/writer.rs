use crate::core::{Record, WriteError};
use async_trait::async_trait;
use std::sync::Arc;

/// The host store's single-record write primitive.
///
/// Create-or-update semantics belong to the implementor. On success the
/// implementor should flip the record out of its "new" state.
#[async_trait]
pub trait RecordWriter<R: Record>: Send + Sync {
    async fn write(&self, record: &mut R) -> Result<(), WriteError>;
}

#[async_trait]
impl<R, W> RecordWriter<R> for Arc<W>
where
    R: Record,
    W: RecordWriter<R> + ?Sized,
{
    async fn write(&self, record: &mut R) -> Result<(), WriteError> {
        (**self).write(record).await
    }
}

#[async_trait]
impl<R, W> RecordWriter<R> for &W
where
    R: Record,
    W: RecordWriter<R> + ?Sized,
{
    async fn write(&self, record: &mut R) -> Result<(), WriteError> {
        (**self).write(record).await
    }
}
