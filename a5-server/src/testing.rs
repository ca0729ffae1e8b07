//! In-memory store and request helpers for handler tests

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, HeaderName, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use crate::db::repos::{BlogRepository, DbError, EntryRepository};
use crate::http::{build_router, AppState, DEFAULT_USER_HEADER};
use crate::models::{Blog, BlogRef, Entry, Page, Pageable, TagRef, UserRef};
use crate::search::{SearchError, SearchRepository, SearchResult, TantivySearchRepository};

const TEST_WRITER_MEMORY: usize = 15_000_000;

#[derive(Default)]
struct Inner {
    next_id: i64,
    users: Vec<UserRef>,
    blogs: BTreeMap<i64, Blog>,
    entries: BTreeMap<i64, Entry>,
    tags: BTreeMap<i64, String>,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn user(&mut self, login: &str) -> UserRef {
        if let Some(user) = self.users.iter().find(|u| u.login == login) {
            return user.clone();
        }
        let user = UserRef {
            id: self.next_id(),
            login: login.to_owned(),
        };
        self.users.push(user.clone());
        user
    }

    /// Resolve blog and tag references the way the SQL joins do.
    fn hydrate(&self, id: i64, entry: &Entry) -> Result<Entry, DbError> {
        let blog = match entry.blog_id() {
            Some(blog_id) => {
                let blog = self.blogs.get(&blog_id).ok_or_else(|| DbError::Conflict {
                    message: format!("blog {blog_id} does not exist"),
                })?;
                Some(BlogRef {
                    id: blog_id,
                    name: Some(blog.name.clone()),
                    handle: Some(blog.handle.clone()),
                })
            }
            None => None,
        };

        let mut tag_ids = entry.tag_ids();
        tag_ids.sort_unstable();
        let tags = tag_ids
            .into_iter()
            .map(|tag_id| {
                let name = self.tags.get(&tag_id).ok_or_else(|| DbError::Conflict {
                    message: format!("tag {tag_id} does not exist"),
                })?;
                Ok(TagRef {
                    id: tag_id,
                    name: Some(name.clone()),
                })
            })
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(Entry {
            id: Some(id),
            blog,
            tags,
            ..entry.clone()
        })
    }
}

/// Store of record held in memory, implementing both repositories
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn add_tag(&self, id: i64, name: &str) {
        self.inner.lock().unwrap().tags.insert(id, name.to_owned());
    }
}

#[async_trait]
impl BlogRepository for MemoryStore {
    async fn save(&self, blog: &Blog, owner_login: &str) -> Result<Blog, DbError> {
        let mut inner = self.inner.lock().unwrap();
        let user = inner.user(owner_login);
        let id = inner.next_id();
        let saved = Blog {
            id: Some(id),
            user: Some(user),
            ..blog.clone()
        };
        inner.blogs.insert(id, saved.clone());
        Ok(saved)
    }

    async fn update(&self, id: i64, blog: &Blog) -> Result<Blog, DbError> {
        let mut inner = self.inner.lock().unwrap();
        let stored = inner
            .blogs
            .get_mut(&id)
            .ok_or_else(|| DbError::not_found("blog", id))?;
        stored.name = blog.name.clone();
        stored.handle = blog.handle.clone();
        Ok(stored.clone())
    }

    async fn find_one(&self, id: i64) -> Result<Option<Blog>, DbError> {
        Ok(self.inner.lock().unwrap().blogs.get(&id).cloned())
    }

    async fn find_by_user_is_current_user(&self, login: &str) -> Result<Vec<Blog>, DbError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .blogs
            .values()
            .filter(|b| b.user.as_ref().is_some_and(|u| u.login == login))
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<Blog>, DbError> {
        Ok(self.inner.lock().unwrap().blogs.values().cloned().collect())
    }

    async fn delete(&self, id: i64) -> Result<(), DbError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.entries.values().any(|e| e.blog_id() == Some(id)) {
            return Err(DbError::Conflict {
                message: format!("blog {id} still has entries"),
            });
        }
        inner
            .blogs
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DbError::not_found("blog", id))
    }
}

#[async_trait]
impl EntryRepository for MemoryStore {
    async fn save(&self, entry: &Entry) -> Result<Entry, DbError> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id + 1;
        let saved = inner.hydrate(id, entry)?;
        inner.next_id = id;
        inner.entries.insert(id, saved.clone());
        Ok(saved)
    }

    async fn update(&self, id: i64, entry: &Entry) -> Result<Entry, DbError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.entries.contains_key(&id) {
            return Err(DbError::not_found("entry", id));
        }
        let saved = inner.hydrate(id, entry)?;
        inner.entries.insert(id, saved.clone());
        Ok(saved)
    }

    async fn find_one_with_eager_relationships(&self, id: i64) -> Result<Option<Entry>, DbError> {
        Ok(self.inner.lock().unwrap().entries.get(&id).cloned())
    }

    async fn find_by_blog_user_login_order_by_date_desc(
        &self,
        login: &str,
        pageable: Pageable,
    ) -> Result<Page<Entry>, DbError> {
        let inner = self.inner.lock().unwrap();
        let mut owned: Vec<Entry> = inner
            .entries
            .values()
            .filter(|e| {
                e.blog_id()
                    .and_then(|blog_id| inner.blogs.get(&blog_id))
                    .and_then(|b| b.user.as_ref())
                    .is_some_and(|u| u.login == login)
            })
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));

        let total = owned.len() as u64;
        let content = owned
            .into_iter()
            .skip(pageable.offset() as usize)
            .take(pageable.limit() as usize)
            .collect();
        Ok(Page::new(content, total, pageable))
    }

    async fn find_all(&self) -> Result<Vec<Entry>, DbError> {
        Ok(self.inner.lock().unwrap().entries.values().cloned().collect())
    }

    async fn delete(&self, id: i64) -> Result<(), DbError> {
        self.inner
            .lock()
            .unwrap()
            .entries
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DbError::not_found("entry", id))
    }
}

/// Search repository whose every operation fails
pub struct FailingIndex;

fn offline() -> SearchError {
    SearchError::Io(std::io::Error::other("index offline"))
}

#[async_trait]
impl<T: Send + Sync + 'static> SearchRepository<T> for FailingIndex {
    async fn save(&self, _entity: &T) -> SearchResult<()> {
        Err(offline())
    }

    async fn delete(&self, _id: i64) -> SearchResult<()> {
        Err(offline())
    }

    async fn search(&self, _query: &str, _pageable: Option<Pageable>) -> SearchResult<Page<T>> {
        Err(offline())
    }

    async fn clear(&self) -> SearchResult<()> {
        Err(offline())
    }
}

/// Router wired to a memory store and in-RAM indexes
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub state: Arc<AppState>,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(
            Arc::new(TantivySearchRepository::<Blog>::in_ram(TEST_WRITER_MEMORY).unwrap()),
            Arc::new(TantivySearchRepository::<Entry>::in_ram(TEST_WRITER_MEMORY).unwrap()),
        )
    }

    pub fn with_failing_index() -> Self {
        Self::build(Arc::new(FailingIndex), Arc::new(FailingIndex))
    }

    fn build(
        blog_index: Arc<dyn SearchRepository<Blog>>,
        entry_index: Arc<dyn SearchRepository<Entry>>,
    ) -> Self {
        let store = Arc::new(MemoryStore::default());
        let state = Arc::new(AppState {
            blogs: store.clone(),
            entries: store.clone(),
            blog_index,
            entry_index,
            user_header: HeaderName::from_static(DEFAULT_USER_HEADER),
        });
        let router = build_router(Arc::clone(&state));
        Self {
            store,
            state,
            router,
        }
    }

    /// Blog written to the store only.
    pub async fn store_blog(&self, login: &str, name: &str, handle: &str) -> i64 {
        let blog = BlogRepository::save(self.store.as_ref(), &Blog::new(name, handle), login)
            .await
            .unwrap();
        blog.id.unwrap()
    }

    /// Blog written to the store and the index.
    pub async fn blog(&self, login: &str, name: &str, handle: &str) -> i64 {
        let id = self.store_blog(login, name, handle).await;
        let blog = BlogRepository::find_one(self.store.as_ref(), id)
            .await
            .unwrap()
            .unwrap();
        self.state.blog_index.save(&blog).await.unwrap();
        id
    }

    /// Entry written to the store and the index.
    pub async fn entry(&self, entry: Entry) -> i64 {
        let saved = EntryRepository::save(self.store.as_ref(), &entry).await.unwrap();
        self.state.entry_index.save(&saved).await.unwrap();
        saved.id.unwrap()
    }
}

/// Send one request and decode the JSON body (Null when empty).
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, HeaderMap, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(DEFAULT_USER_HEADER, user);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, headers, json)
}
