use actix_http::body::MessageBody;
use actix_http::Request;
use actix_service::Service;
use actix_web::{dev::ServiceResponse, test, Error};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use agora::db::{self, DatabaseConnection};
use agora::db::models::publication::NewPublication;
use agora::publications::Publications;
use agora::server::api::state::App as AppState;
use agora::server::app::init_app;
use agora::storage::{MemoryStore, ObjectStore, StoredObject, UrlSigner};

pub const ALICE: i64 = 1;
pub const BOB: i64 = 2;
pub const CAROL: i64 = 3;
pub const ADMIN: i64 = 4;

pub const CITY: i64 = 1;
pub const COMPLAINT: i64 = 1;
pub const SUGGESTION: i64 = 2;

pub const TAG_ROADS: i64 = 1;
pub const TAG_PARKS: i64 = 2;
pub const TAG_LIGHTING: i64 = 3;
pub const MISSING_TAG: i64 = 9;

pub const SECRET: &str = "test-secret";
pub const BASE_URL: &str = "http://localhost/files";

/// Object store that records every deletion and can be told to fail them.
#[derive(Debug)]
pub struct RecordingStore {
    inner: MemoryStore,
    deletes: Mutex<Vec<String>>,
    puts: AtomicUsize,
    fail_deletes: AtomicBool,
}

impl RecordingStore {
    pub fn new() -> Self {
        let signer = UrlSigner::new(BASE_URL, SECRET, 900).unwrap();
        Self {
            inner: MemoryStore::new(signer),
            deletes: Mutex::new(vec![]),
            puts: AtomicUsize::new(0),
            fail_deletes: AtomicBool::new(false),
        }
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn deletes(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn keys(&self) -> Vec<String> {
        self.inner.keys().unwrap()
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put(key, bytes, content_type).await
    }

    async fn get(&self, key: &str) -> Result<Option<StoredObject>> {
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.deletes.lock().unwrap().push(key.to_owned());
        if self.fail_deletes.load(Ordering::SeqCst) {
            anyhow::bail!("object store unavailable");
        }
        self.inner.delete(key).await
    }

    fn signed_url(&self, key: &str) -> Result<String> {
        self.inner.signed_url(key)
    }

    fn signer(&self) -> &UrlSigner {
        self.inner.signer()
    }
}

/// A migrated, seeded database in a temporary directory.
pub struct TestContext {
    pub db: DatabaseConnection,
    pub store: Arc<RecordingStore>,
    pub publications: Publications,
    _dir: TempDir,
}

impl TestContext {
    pub fn state(&self) -> AppState {
        AppState {
            publications: self.publications.clone(),
            default_page_size: 10,
        }
    }

    /// Number of rows in `table` referencing `publication_id`.
    pub async fn count_rows(&self, table: &str, publication_id: i64) -> i64 {
        let column = if table == "publication" {
            "id"
        } else {
            "publication_id"
        };
        let statement = format!("SELECT COUNT(*) FROM {table} WHERE {column} = $1");
        let row = sqlx::query(&statement)
            .bind(publication_id)
            .fetch_one(&self.db.pool)
            .await
            .unwrap();
        sqlx::Row::try_get::<i64, _>(&row, 0).unwrap()
    }

    /// Number of rows in `table`.
    pub async fn count_all(&self, table: &str) -> i64 {
        let statement = format!("SELECT COUNT(*) FROM {table}");
        let row = sqlx::query(&statement)
            .fetch_one(&self.db.pool)
            .await
            .unwrap();
        sqlx::Row::try_get::<i64, _>(&row, 0).unwrap()
    }

    /// Create a publication by `user_id` with the given tags.
    pub async fn publish(&self, user_id: i64, title: &str, tags: &[i64]) -> i64 {
        self.publications
            .create(&new_publication(user_id, title), tags)
            .await
            .unwrap()
            .id
    }
}

pub fn new_publication(user_id: i64, title: &str) -> NewPublication {
    NewPublication {
        title: title.to_owned(),
        description: format!("About {title}"),
        content: format!("Details on {title}"),
        city_id: CITY,
        publication_type_id: COMPLAINT,
        user_id,
        reference_link: None,
    }
}

async fn seed(db: &DatabaseConnection) -> Result<()> {
    let statements = [
        "INSERT INTO user (id, username, first_name, last_name) VALUES (1, 'alice', 'Alice', 'Moreno')",
        "INSERT INTO user (id, username, first_name, last_name) VALUES (2, 'bob', 'Bob', 'Keller')",
        "INSERT INTO user (id, username, first_name, last_name) VALUES (3, 'carol', 'Carol', 'Dunn')",
        "INSERT INTO user (id, username, first_name, last_name, image_url) VALUES (4, 'admin', 'Ada', 'Min', 'http://localhost/ada.png')",
        "INSERT INTO city (id, name) VALUES (1, 'Springfield')",
        "INSERT INTO publication_type (id, name) VALUES (1, 'Complaint')",
        "INSERT INTO publication_type (id, name) VALUES (2, 'Suggestion')",
        "INSERT INTO tag (id, name) VALUES (1, 'roads')",
        "INSERT INTO tag (id, name) VALUES (2, 'parks')",
        "INSERT INTO tag (id, name) VALUES (3, 'lighting')",
    ];
    for statement in statements {
        sqlx::query(statement).execute(&db.pool).await?;
    }
    Ok(())
}

pub async fn initialize_context() -> TestContext {
    let dir = tempfile::Builder::new().prefix("agora").tempdir().unwrap();
    let url = format!(
        "sqlite://{}?mode=rwc",
        dir.path().join("agora.sqlite3").display()
    );
    let db = db::init::open(&url).await.unwrap();
    seed(&db).await.unwrap();
    let store = Arc::new(RecordingStore::new());
    let object_store: Arc<dyn ObjectStore> = Arc::clone(&store) as Arc<dyn ObjectStore>;
    let publications = Publications::new(db.clone(), object_store);
    TestContext {
        db,
        store,
        publications,
        _dir: dir,
    }
}

pub async fn initialize_app(
    context: &TestContext,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = Error> {
    let state = context.state();
    test::init_service(init_app(&state)).await
}
