//! Test fixtures: declarations and a fake GitHub API.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use crypto_box::aead::OsRng;
use crypto_box::SecretKey;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const KEY_ID: &str = "568250167242549743";
pub const CREATED_AT: &str = "2026-01-01T00:00:01Z";
pub const UPDATED_AT: &str = "2026-01-01T00:00:01Z";
pub const UPDATED_ELSEWHERE: &str = "2026-02-02T12:00:00Z";

/// One secret in `acme/widgets`.
pub const SINGLE_DECLARATION: &str = r#"
[[secret]]
repo = "acme/widgets"
name = "API_KEY"
value = "s3cr3t"
"#;

/// Declarations with one bad repo path and two bad names.
pub const INVALID_DECLARATIONS: &str = r#"
[[secret]]
repo = "acme"
name = "API_KEY"
value = "a"

[[secret]]
repo = "acme/widgets"
name = "1github-token"
value = "b"

[[secret]]
repo = "acme/widgets"
name = "GITHUB_SHA"
value = "c"
"#;

/// A repository key pair as GitHub would hold it.
pub struct RepoKey {
    pub secret: SecretKey,
    pub public_b64: String,
}

impl RepoKey {
    pub fn generate() -> Self {
        let secret = SecretKey::generate(&mut OsRng);
        let public_b64 = STANDARD.encode(secret.public_key().as_bytes());
        Self { secret, public_b64 }
    }

    /// Unseal a base64 sealed box produced for this key.
    pub fn open(&self, encrypted_value: &str) -> String {
        let sealed = STANDARD.decode(encrypted_value).expect("ciphertext is not base64");
        let plaintext = self.secret.unseal(&sealed).expect("failed to unseal");
        String::from_utf8(plaintext).expect("plaintext is not UTF-8")
    }
}

pub fn secrets_path(owner: &str, repo: &str, name: &str) -> String {
    format!("/repos/{}/{}/actions/secrets/{}", owner, repo, name)
}

pub async fn mount_public_key(server: &MockServer, owner: &str, repo: &str, key: &RepoKey) {
    Mock::given(method("GET"))
        .and(path(secrets_path(owner, repo, "public-key")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "key_id": KEY_ID,
            "key": key.public_b64,
        })))
        .mount(server)
        .await;
}

pub async fn mount_upsert(server: &MockServer, owner: &str, repo: &str, name: &str) {
    Mock::given(method("PUT"))
        .and(path(secrets_path(owner, repo, name)))
        .respond_with(ResponseTemplate::new(201))
        .mount(server)
        .await;
}

pub async fn mount_metadata(server: &MockServer, owner: &str, repo: &str, name: &str, updated_at: &str) {
    Mock::given(method("GET"))
        .and(path(secrets_path(owner, repo, name)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": name,
            "created_at": CREATED_AT,
            "updated_at": updated_at,
        })))
        .mount(server)
        .await;
}

pub async fn mount_delete(server: &MockServer, owner: &str, repo: &str, name: &str) {
    Mock::given(method("DELETE"))
        .and(path(secrets_path(owner, repo, name)))
        .respond_with(ResponseTemplate::new(204))
        .mount(server)
        .await;
}

/// A fake API where `owner/repo/name` can be created and read back.
pub async fn mount_repository(server: &MockServer, owner: &str, repo: &str, name: &str, key: &RepoKey) {
    mount_public_key(server, owner, repo, key).await;
    mount_upsert(server, owner, repo, name).await;
    mount_metadata(server, owner, repo, name, UPDATED_AT).await;
}
