//! tantivy-backed search repository

use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tantivy::collector::{Count, TopDocs};
use tantivy::directory::MmapDirectory;
use tantivy::query::QueryParser;
use tantivy::schema::{Field, Schema, Value, FAST, INDEXED, STORED, TEXT};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};
use tokio::sync::Mutex;

use super::{Indexable, SearchError, SearchRepository, SearchResult};
use crate::models::{Page, Pageable};

/// Default indexing memory budget for the single writer thread
pub const DEFAULT_WRITER_MEMORY: usize = 50_000_000;

const ID_FIELD: &str = "id";
const SOURCE_FIELD: &str = "source";

#[derive(Debug, Clone)]
struct IndexFields {
    id: Field,
    source: Field,
    text: Vec<(&'static str, Field)>,
}

impl IndexFields {
    fn text_field(&self, name: &str) -> Option<Field> {
        self.text
            .iter()
            .find(|(field_name, _)| *field_name == name)
            .map(|(_, field)| *field)
    }

    fn default_fields(&self) -> Vec<Field> {
        self.text.iter().map(|(_, field)| *field).collect()
    }
}

fn build_schema<T: Indexable>() -> (Schema, IndexFields) {
    let mut builder = Schema::builder();
    let id = builder.add_i64_field(ID_FIELD, INDEXED | STORED | FAST);
    let source = builder.add_text_field(SOURCE_FIELD, STORED);
    let text = T::TEXT_FIELDS
        .iter()
        .map(|name| (*name, builder.add_text_field(name, TEXT)))
        .collect();

    (builder.build(), IndexFields { id, source, text })
}

/// Search repository over one tantivy index.
///
/// Writes commit before returning, so a search issued after `save` or
/// `delete` completes sees the change.
pub struct TantivySearchRepository<T> {
    index: Index,
    reader: IndexReader,
    writer: Arc<Mutex<IndexWriter>>,
    fields: IndexFields,
    _entity: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for TantivySearchRepository<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TantivySearchRepository")
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

impl<T: Indexable> TantivySearchRepository<T> {
    /// Open the index under `root/<INDEX_NAME>`, creating it if needed.
    pub fn open(root: &Path, writer_memory: usize) -> SearchResult<Self> {
        let dir = root.join(T::INDEX_NAME);
        std::fs::create_dir_all(&dir)?;

        let (schema, fields) = build_schema::<T>();
        let index = Index::open_or_create(MmapDirectory::open(&dir)?, schema)?;
        tracing::info!(index = T::INDEX_NAME, path = %dir.display(), "Search index opened");

        Self::from_index(index, fields, writer_memory)
    }

    /// Index held entirely in memory.
    pub fn in_ram(writer_memory: usize) -> SearchResult<Self> {
        let (schema, fields) = build_schema::<T>();
        Self::from_index(Index::create_in_ram(schema), fields, writer_memory)
    }

    fn from_index(index: Index, fields: IndexFields, writer_memory: usize) -> SearchResult<Self> {
        let writer = index.writer_with_num_threads(1, writer_memory)?;
        let reader: IndexReader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;

        Ok(Self {
            index,
            reader,
            writer: Arc::new(Mutex::new(writer)),
            fields,
            _entity: PhantomData,
        })
    }

    /// Run `op` against the writer on the blocking pool, then commit and reload.
    async fn write<F>(&self, op: F) -> SearchResult<()>
    where
        F: FnOnce(&mut IndexWriter, &IndexFields) -> SearchResult<()> + Send + 'static,
    {
        let writer = Arc::clone(&self.writer);
        let reader = self.reader.clone();
        let fields = self.fields.clone();

        tokio::task::spawn_blocking(move || {
            let mut writer = writer.blocking_lock();
            if let Err(e) = apply(&mut writer, &fields, op) {
                // Drop queued operations so the next commit does not apply them
                if let Err(rollback) = writer.rollback() {
                    tracing::error!(index = T::INDEX_NAME, "Search index rollback failed: {}", rollback);
                }
                return Err(e);
            }
            reader.reload()?;
            Ok(())
        })
        .await?
    }
}

fn apply<F>(writer: &mut IndexWriter, fields: &IndexFields, op: F) -> SearchResult<()>
where
    F: FnOnce(&mut IndexWriter, &IndexFields) -> SearchResult<()>,
{
    op(writer, fields)?;
    writer.commit()?;
    Ok(())
}

fn decode<T: Indexable>(doc: &TantivyDocument, fields: &IndexFields) -> SearchResult<T> {
    let source = doc
        .get_first(fields.source)
        .and_then(|value| value.as_str())
        .ok_or(SearchError::MissingSource)?;
    Ok(serde_json::from_str(source)?)
}

#[async_trait]
impl<T: Indexable> SearchRepository<T> for TantivySearchRepository<T> {
    async fn save(&self, entity: &T) -> SearchResult<()> {
        let id = entity.index_id().ok_or(SearchError::MissingId {
            index: T::INDEX_NAME,
        })?;
        let source = serde_json::to_string(entity)?;
        let values = entity.text_values();

        self.write(move |writer, fields| {
            let mut doc = TantivyDocument::default();
            doc.add_i64(fields.id, id);
            doc.add_text(fields.source, &source);
            for (name, value) in &values {
                if let Some(field) = fields.text_field(name) {
                    doc.add_text(field, value);
                }
            }

            writer.delete_term(Term::from_field_i64(fields.id, id));
            writer.add_document(doc)?;
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: i64) -> SearchResult<()> {
        self.write(move |writer, fields| {
            writer.delete_term(Term::from_field_i64(fields.id, id));
            Ok(())
        })
        .await
    }

    async fn search(&self, query: &str, pageable: Option<Pageable>) -> SearchResult<Page<T>> {
        let index = self.index.clone();
        let reader = self.reader.clone();
        let fields = self.fields.clone();
        let query = query.to_owned();

        tokio::task::spawn_blocking(move || {
            let parser = QueryParser::for_index(&index, fields.default_fields());
            let query = parser.parse_query(&query)?;
            let searcher = reader.searcher();

            let total = searcher.search(&query, &Count)?;
            let pageable = pageable.unwrap_or_else(|| Pageable {
                page: 0,
                size: u32::try_from(total).unwrap_or(u32::MAX),
            });
            if total == 0 || pageable.offset() >= total as u64 {
                return Ok(Page::new(Vec::new(), total as u64, pageable));
            }

            let collector = TopDocs::with_limit(pageable.limit().max(1) as usize)
                .and_offset(pageable.offset() as usize);
            let hits = searcher.search(&query, &collector)?;

            let mut content = Vec::with_capacity(hits.len());
            for (_score, address) in hits {
                let doc: TantivyDocument = searcher.doc(address)?;
                content.push(decode::<T>(&doc, &fields)?);
            }

            Ok(Page::new(content, total as u64, pageable))
        })
        .await?
    }

    async fn clear(&self) -> SearchResult<()> {
        self.write(|writer, _| {
            writer.delete_all_documents()?;
            Ok(())
        })
        .await
    }
}
