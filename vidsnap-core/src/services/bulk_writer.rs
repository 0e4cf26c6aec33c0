//! Batched inserts that hand back generated identifiers in input order.

use std::marker::PhantomData;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect,
};

use crate::database::entities::{
    events, frames, index_entries, region_relations, regions, segments, tube_region_relations,
    tube_relations, tubes,
};
use crate::errors::{ImportExportError, ImportExportResult};
use crate::snapshot::EntityKind;

/// Storage target for one batch of records of a single kind.
///
/// Implementations return one generated id per record, in record order.
#[async_trait(?Send)]
pub trait BatchSink<R> {
    fn kind(&self) -> EntityKind;

    async fn write_batch(&mut self, batch: Vec<R>) -> ImportExportResult<Vec<i32>>;
}

/// Splits a record sequence into batches of at most `batch_size` and writes
/// them one after another.
#[derive(Debug, Clone, Copy)]
pub struct BulkWriter {
    batch_size: usize,
}

impl BulkWriter {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of batches `write_all` issues for `records` records.
    pub fn batch_count(&self, records: usize) -> usize {
        records.div_ceil(self.batch_size)
    }

    /// Write every record and return the generated ids; the k-th id belongs
    /// to the k-th record. The first failing batch aborts the write.
    pub async fn write_all<R, S>(&self, sink: &mut S, mut records: Vec<R>) -> ImportExportResult<Vec<i32>>
    where
        S: BatchSink<R> + ?Sized,
    {
        let mut ids = Vec::with_capacity(records.len());
        let mut batch_number = 0;

        while !records.is_empty() {
            let batch_size = self.batch_size.min(records.len());
            let batch: Vec<R> = records.drain(..batch_size).collect();
            let batch_ids = sink.write_batch(batch).await?;
            if batch_ids.len() != batch_size {
                return Err(ImportExportError::BatchMismatch {
                    kind: sink.kind(),
                    expected: batch_size,
                    actual: batch_ids.len(),
                });
            }
            batch_number += 1;
            tracing::debug!(
                "Wrote {} batch {} ({} records)",
                sink.kind(),
                batch_number,
                batch_size
            );
            ids.extend(batch_ids);
        }

        Ok(ids)
    }
}

/// Entities whose rows belong to one video and carry an integer primary key.
pub trait VideoScopedEntity: EntityTrait {
    fn id_column() -> Self::Column;
    fn video_column() -> Self::Column;
}

macro_rules! video_scoped {
    ($($entity:ident),+ $(,)?) => {
        $(
            impl VideoScopedEntity for $entity::Entity {
                fn id_column() -> Self::Column {
                    $entity::Column::Id
                }

                fn video_column() -> Self::Column {
                    $entity::Column::VideoId
                }
            }
        )+
    };
}

video_scoped!(
    events,
    segments,
    frames,
    regions,
    region_relations,
    tubes,
    tube_relations,
    tube_region_relations,
    index_entries,
);

/// Writes active models to their table with a multi-row insert.
///
/// Identifiers are read back as the newest `n` ids of the video, which is
/// exact while the connection is the only writer of that video.
pub struct TableSink<'a, C, A> {
    conn: &'a C,
    video_id: i32,
    kind: EntityKind,
    _model: PhantomData<A>,
}

impl<'a, C, A> TableSink<'a, C, A> {
    pub fn new(conn: &'a C, video_id: i32, kind: EntityKind) -> Self {
        Self {
            conn,
            video_id,
            kind,
            _model: PhantomData,
        }
    }
}

#[async_trait(?Send)]
impl<'a, C, A> BatchSink<A> for TableSink<'a, C, A>
where
    C: ConnectionTrait,
    A: ActiveModelTrait + Send,
    A::Entity: VideoScopedEntity,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
{
    fn kind(&self) -> EntityKind {
        self.kind
    }

    async fn write_batch(&mut self, batch: Vec<A>) -> ImportExportResult<Vec<i32>> {
        let count = batch.len();
        if count == 0 {
            return Ok(Vec::new());
        }

        <A::Entity as EntityTrait>::insert_many(batch)
            .exec_without_returning(self.conn)
            .await?;

        let mut ids: Vec<i32> = <A::Entity as EntityTrait>::find()
            .select_only()
            .column(<A::Entity as VideoScopedEntity>::id_column())
            .filter(<A::Entity as VideoScopedEntity>::video_column().eq(self.video_id))
            .order_by_desc(<A::Entity as VideoScopedEntity>::id_column())
            .limit(count as u64)
            .into_tuple::<i32>()
            .all(self.conn)
            .await?;
        ids.reverse();

        Ok(ids)
    }
}
