use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum_test::multipart::{MultipartForm, Part};
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::mongo::Mongo;

use talebook::app::build_router;
use talebook::config::AppConfig;
use talebook::db::fiction_repository::FictionRepository;
use talebook::db::user_repository::UserRepository;
use talebook::state::AppState;

/// A minimal 1x1 PNG.
pub const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // PNG signature
    0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, // IHDR chunk
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, // 1x1
    0x08, 0x02, 0x00, 0x00, 0x00, 0x90, 0x77, 0x53, 0xDE, // bit depth, color type, CRC
    0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, // IDAT chunk
    0x08, 0xD7, 0x63, 0xF8, 0xCF, 0xC0, 0x00, 0x00, // compressed data
    0x00, 0x02, 0x00, 0x01, 0xE2, 0x21, 0xBC, 0x33, // CRC
    0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, // IEND chunk
    0xAE, 0x42, 0x60, 0x82,
];

/// Holds the running MongoDB container and the router wired to it.
///
/// The container and the temporary `public` directory live as long as this
/// struct does.
pub struct TestEnv {
    _mongo: ContainerAsync<Mongo>,
    _public: tempfile::TempDir,
    pub router: Router,
    pub fictions: Arc<dyn FictionRepository>,
    pub users: Arc<dyn UserRepository>,
    /// Direct handle for seeding collections the API never writes.
    pub db: mongodb::Database,
    pub uploads_dir: PathBuf,
    pub config: AppConfig,
}

impl TestEnv {
    /// Start MongoDB and build the full application router in demo mode.
    pub async fn start() -> Self {
        let mongo_container = Mongo::default()
            .start()
            .await
            .expect("Failed to start MongoDB container");

        let mongo_port = mongo_container
            .get_host_port_ipv4(27017)
            .await
            .expect("Failed to get MongoDB port");
        let mongo_uri = format!("mongodb://127.0.0.1:{}", mongo_port);
        let mongo_client = mongodb::Client::with_uri_str(&mongo_uri)
            .await
            .expect("Failed to connect to MongoDB");

        let public = tempfile::tempdir().expect("Failed to create temp dir");
        let uploads_dir = public.path().join("uploads");

        let config = AppConfig {
            mongodb_uri: mongo_uri,
            mongodb_database: format!("talebook_test_{}", uuid::Uuid::new_v4().simple()),
            public_dir: public.path().to_path_buf(),
            uploads_dir: uploads_dir.clone(),
            jwt_secret: "test-secret".to_string(),
            demo_mode: true,
            ..AppConfig::default()
        };

        let db = mongo_client.database(&config.mongodb_database);
        let state = AppState::connect(&mongo_client, config.clone())
            .await
            .expect("Failed to build app state");

        Self {
            _mongo: mongo_container,
            _public: public,
            fictions: state.fiction_repo.clone(),
            users: state.user_repo.clone(),
            db,
            router: build_router(state),
            uploads_dir,
            config,
        }
    }

    /// Build an `axum_test::TestServer` from this environment's router.
    pub fn server(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .expect_success_by_default()
            .build(self.router.clone())
    }

    /// Build a `TestServer` that does NOT expect success by default (for error tests).
    pub fn server_permissive(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .build(self.router.clone())
    }

    /// Helper: log in as a demo user and return the bearer token.
    pub async fn login(&self, server: &axum_test::TestServer, username: &str) -> String {
        let response = server
            .post("/api/users/login")
            .json(&serde_json::json!({ "username": username, "password": username }))
            .await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        body["token"]
            .as_str()
            .expect("Login response should contain a token")
            .to_string()
    }

    /// Helper: create a fiction without an image and return its id.
    pub async fn create_fiction(
        &self,
        server: &axum_test::TestServer,
        token: &str,
        title: &str,
        description: &str,
        category: &str,
    ) -> String {
        let response = server
            .post("/api/fictions")
            .authorization_bearer(token)
            .multipart(fiction_form(title, description, category))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let body: serde_json::Value = response.json();
        body["fictionId"]
            .as_str()
            .expect("Create response should contain fictionId")
            .to_string()
    }

    /// Number of files currently in the uploads directory.
    pub fn upload_count(&self) -> usize {
        std::fs::read_dir(&self.uploads_dir)
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

/// The four text fields of a valid create form.
pub fn fiction_form(title: &str, description: &str, category: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("title", title.to_string())
        .add_text("description", description.to_string())
        .add_text("category", category.to_string())
        .add_text("body", "Once upon a time, in a quiet harbour town.")
}

/// A PNG part for the `image` field.
pub fn png_part() -> Part {
    Part::bytes(PNG_BYTES.to_vec())
        .file_name("cover.png")
        .mime_type("image/png")
}
