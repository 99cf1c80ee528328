use std::time::Duration;

use mockito::Matcher;
use serde_json::json;

use devportal::api::{self, search_service_catalog, PortalClient};
use devportal::error::{PortalError, WorkflowError};
use devportal::models::{ApplicationDraft, OneTimeSecret, PortalContext, SearchQuery};
use devportal::services::{ApplicationList, CredentialManager, CredentialView, RegistrationState, RegistrationWorkflow};

fn client(server: &mockito::ServerGuard) -> PortalClient {
    api::set_silent(true);
    PortalClient::new(&server.url(), "dev-token", Duration::from_secs(5)).unwrap()
}

fn search_body() -> serde_json::Value {
    json!({
        "count": 37,
        "data": [{
            "source": {
                "id": "pkg-1",
                "name": "barAPI",
                "description": "Bar",
                "versions": [
                    {"id": "v1", "version": "v4", "created_at": "2022-03-26T14:52:46.323Z"},
                    {"id": "v2", "version": "v1-beta", "created_at": "2022-03-20T00:00:00Z"}
                ]
            }
        }]
    })
}

#[tokio::test]
async fn test_search_sends_text_offset_limit() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/search/service_catalog")
        .match_header("authorization", "Bearer dev-token")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("text".into(), "bar".into()),
            Matcher::UrlEncoded("offset".into(), "12".into()),
            Matcher::UrlEncoded("limit".into(), "12".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(search_body().to_string())
        .create_async()
        .await;

    let query = SearchQuery { text: "bar".into(), offset: 12, limit: 12 };
    let page = search_service_catalog(&client(&server), &query).await.unwrap();
    assert_eq!(page.total_count, 37);
    assert_eq!(page.items[0].name, "barAPI");
    assert_eq!(page.items[0].latest_version().unwrap().version, "v4");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_empty_text_and_zero_offset_are_sent() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/search/service_catalog")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("text".into(), "".into()),
            Matcher::UrlEncoded("offset".into(), "0".into()),
            Matcher::UrlEncoded("limit".into(), "12".into()),
        ]))
        .with_status(200)
        .with_body(json!({"data": [], "count": 0}).to_string())
        .create_async()
        .await;

    let query = SearchQuery { text: String::new(), offset: 0, limit: 12 };
    let page = search_service_catalog(&client(&server), &query).await.unwrap();
    assert!(page.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_server_error_is_application_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/search/service_catalog")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body(json!({"message": "boom"}).to_string())
        .create_async()
        .await;

    let query = SearchQuery { text: String::new(), offset: 0, limit: 12 };
    let err = search_service_catalog(&client(&server), &query).await.unwrap_err();
    assert_eq!(err, PortalError::Application { status: 500, message: "boom".into() });
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    api::set_silent(true);
    let client = PortalClient::new("http://127.0.0.1:1", "", Duration::from_secs(2)).unwrap();
    let query = SearchQuery { text: String::new(), offset: 0, limit: 12 };
    let err = search_service_catalog(&client, &query).await.unwrap_err();
    assert!(err.is_network(), "{:?}", err);
}

#[tokio::test]
async fn test_listed_credentials_carry_no_key() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/applications/app-1/credentials")
        .with_status(200)
        .with_body(
            json!({"data": [
                {"id": "c1", "display_name": "ci", "key": "4hloijU1YDWzeY003FKKZCeFUBNBXaxo"},
                {"display_name": "missing id"}
            ]})
            .to_string(),
        )
        .create_async()
        .await;

    let manager = CredentialManager::load(&client(&server), "app-1").await.unwrap();
    assert_eq!(manager.credentials().len(), 1);
    let listed = serde_json::to_string(&manager.credentials()[0]).unwrap();
    assert!(!listed.contains("4hloijU1"));
}

#[tokio::test]
async fn test_generate_shows_once_then_refetches() {
    let mut server = mockito::Server::new_async().await;
    let list = server
        .mock("GET", "/applications/app-1/credentials")
        .with_status(200)
        .with_body(json!({"data": [{"id": "c1", "display_name": "ci"}]}).to_string())
        .expect(2)
        .create_async()
        .await;
    let create = server
        .mock("POST", "/applications/app-1/credentials")
        .match_body(Matcher::Json(json!({"display_name": "ci"})))
        .with_status(201)
        .with_body(json!({"id": "c1", "display_name": "ci", "credential": "s3cr3t"}).to_string())
        .create_async()
        .await;

    let client = client(&server);
    let mut manager = CredentialManager::load(&client, "app-1").await.unwrap();
    let secret = manager.generate(&client, "ci").await.unwrap();
    assert_eq!(secret.fields(), vec![("Credential", "s3cr3t")]);
    assert!(matches!(manager.generate(&client, "again").await, Err(WorkflowError::InvalidState(_))));

    manager.dismiss(&client).await.unwrap();
    assert_eq!(manager.view(), &CredentialView::Listed);
    assert!(manager.pending_secret().is_none());
    create.assert_async().await;
    list.assert_async().await;
}

#[tokio::test]
async fn test_revoke_refetches_list() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/applications/app-1/credentials")
        .with_status(200)
        .with_body(json!({"data": [{"id": "c1", "display_name": "ci"}]}).to_string())
        .create_async()
        .await;
    let revoke = server
        .mock("DELETE", "/applications/app-1/credentials/c1")
        .with_status(204)
        .create_async()
        .await;

    let client = client(&server);
    let mut manager = CredentialManager::load(&client, "app-1").await.unwrap();
    manager.revoke(&client, "c1").await.unwrap();
    revoke.assert_async().await;
    assert!(matches!(manager.revoke(&client, "zz").await, Err(WorkflowError::NotFound { .. })));
}

#[tokio::test]
async fn test_rename_patches_display_name_then_refetches() {
    let mut server = mockito::Server::new_async().await;
    let list = server
        .mock("GET", "/applications/app-1/credentials")
        .with_status(200)
        .with_body(json!({"data": [{"id": "c1", "display_name": "ci"}]}).to_string())
        .expect(2)
        .create_async()
        .await;
    let rename = server
        .mock("PATCH", "/applications/app-1/credentials/c1")
        .match_body(Matcher::Json(json!({"display_name": "deploy"})))
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;
    let unknown = server
        .mock("PATCH", "/applications/app-1/credentials/zz")
        .expect(0)
        .create_async()
        .await;

    let client = client(&server);
    let mut manager = CredentialManager::load(&client, "app-1").await.unwrap();
    manager.rename(&client, "c1", "deploy").await.unwrap();
    let notices = manager.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, "Credential successfully renamed");

    let err = manager.rename(&client, "zz", "other").await.unwrap_err();
    assert_eq!(err, WorkflowError::NotFound { kind: "credential", id: "zz".into() });

    rename.assert_async().await;
    unknown.assert_async().await;
    list.assert_async().await;
}

async fn registration_server(post_status: &str) -> (mockito::ServerGuard, mockito::Mock) {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/application_registrations/service_versions/ver-1")
        .with_status(200)
        .with_body(json!({"id": "cfg", "status": "enabled", "auto_approve": post_status == "approved"}).to_string())
        .create_async()
        .await;
    server
        .mock("GET", "/applications")
        .with_status(200)
        .with_body(
            json!({"data": [
                {"id": "app-1", "name": "My Cool App", "registrations": [
                    {"id": "r0", "status": "approved", "service_version": {"id": "ver-1"}}
                ]},
                {"id": "app-2", "name": "Other App", "registrations": []}
            ]})
            .to_string(),
        )
        .create_async()
        .await;
    let post = server
        .mock("POST", "/applications/app-2/registrations")
        .match_body(Matcher::Json(json!({"service_version_id": "ver-1"})))
        .with_status(201)
        .with_body(json!({"id": "r1", "status": post_status}).to_string())
        .create_async()
        .await;
    (server, post)
}

#[tokio::test]
async fn test_registration_pending() {
    let (server, post) = registration_server("pending").await;
    let client = client(&server);
    let mut wf = RegistrationWorkflow::open(&client, "ver-1").await.unwrap();
    assert_eq!(wf.candidates().len(), 1);
    assert_eq!(wf.selected(), Some("app-2"));

    let state = wf.submit(&client).await.unwrap();
    match state {
        RegistrationState::Pending(reg) => {
            assert_eq!(reg.application_id, "app-2");
            assert_eq!(reg.service_version_id, "ver-1");
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(wf.redirect_target(), None);
    post.assert_async().await;
}

#[tokio::test]
async fn test_registration_auto_approved() {
    let (server, post) = registration_server("approved").await;
    let client = client(&server);
    let mut wf = RegistrationWorkflow::open(&client, "ver-1").await.unwrap();
    wf.submit(&client).await.unwrap();
    assert_eq!(wf.redirect_target(), Some("app-2"));
    post.assert_async().await;
}

#[tokio::test]
async fn test_registration_failure_returns_to_selection() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/application_registrations/service_versions/ver-1")
        .with_status(200)
        .with_body(json!({"status": "enabled"}).to_string())
        .create_async()
        .await;
    server
        .mock("GET", "/applications")
        .with_status(200)
        .with_body(json!({"data": [{"id": "app-2", "name": "Other App"}]}).to_string())
        .create_async()
        .await;
    server
        .mock("POST", "/applications/app-2/registrations")
        .with_status(400)
        .with_body(json!({"message": "already registered"}).to_string())
        .create_async()
        .await;

    let client = client(&server);
    let mut wf = RegistrationWorkflow::open(&client, "ver-1").await.unwrap();
    let err = wf.submit(&client).await.unwrap_err();
    assert!(err.to_string().contains("already registered"));
    assert_eq!(wf.state(), &RegistrationState::SelectingApplication);
    assert_eq!(wf.candidates().len(), 1);
}

#[tokio::test]
async fn test_registration_disabled_when_config_missing() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/application_registrations/service_versions/ver-1")
        .with_status(404)
        .create_async()
        .await;

    let err = RegistrationWorkflow::open(&client(&server), "ver-1").await.unwrap_err();
    assert_eq!(err, WorkflowError::RegistrationDisabled("ver-1".into()));
}

#[tokio::test]
async fn test_create_dcr_application_returns_credentials() {
    let mut server = mockito::Server::new_async().await;
    let create = server
        .mock("POST", "/applications")
        .match_body(Matcher::Json(json!({"name": "My DCR App", "redirect_uri": "http://google.com"})))
        .with_status(201)
        .with_body(
            json!({"id": "app-9", "credentials": {"client_id": "cid", "client_secret": "SECRET_TOKEN"}}).to_string(),
        )
        .create_async()
        .await;
    let list = server
        .mock("GET", "/applications")
        .with_status(200)
        .with_body(json!({"data": [{"id": "app-9", "name": "My DCR App", "is_dcr": true}]}).to_string())
        .create_async()
        .await;

    let client = client(&server);
    let mut apps = ApplicationList::new(vec![]);
    let draft = ApplicationDraft {
        name: "My DCR App".into(),
        redirect_uri: Some("http://google.com".into()),
        ..Default::default()
    };
    let created = apps.create(&client, &draft, false).await.unwrap();
    assert_eq!(created.id, "app-9");
    let creds = created.credentials.unwrap();
    assert_eq!(creds.client_secret.expose(), "SECRET_TOKEN");
    assert_eq!(apps.applications().len(), 1);
    create.assert_async().await;
    list.assert_async().await;
}

#[tokio::test]
async fn test_created_application_is_preselected_without_second_fetch() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/applications")
        .with_status(201)
        .with_body(json!({"id": "app-3"}).to_string())
        .create_async()
        .await;
    let list = server
        .mock("GET", "/applications")
        .with_status(200)
        .with_body(
            json!({"data": [
                {"id": "app-1", "name": "My Cool App", "registrations": [
                    {"id": "r0", "status": "approved", "service_version": {"id": "ver-1"}}
                ]},
                {"id": "app-3", "name": "Fresh App", "registrations": []}
            ]})
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let client = client(&server);
    let mut workflow = RegistrationWorkflow::new("ver-1", vec![]);
    assert!(workflow.only_create_available());

    let mut apps = ApplicationList::new(vec![]);
    let created = apps.create(&client, &ApplicationDraft::new("Fresh App"), false).await.unwrap();
    workflow.application_created(apps.applications().to_vec(), &created.id).unwrap();

    assert_eq!(workflow.selected(), Some("app-3"));
    assert_eq!(workflow.registered_applications().len(), 1);
    list.assert_async().await;
}

#[tokio::test]
async fn test_create_rejects_blank_name() {
    let server = mockito::Server::new_async().await;
    let mut apps = ApplicationList::new(vec![]);
    let err = apps.create(&client(&server), &ApplicationDraft::new("  "), true).await.unwrap_err();
    assert_eq!(err, WorkflowError::IncompleteDraft);
}

#[tokio::test]
async fn test_refresh_secret_requires_dcr() {
    let mut server = mockito::Server::new_async().await;
    let refresh = server
        .mock("POST", "/applications/app-9/refresh_token")
        .with_status(200)
        .with_body(json!({"client_secret": "NEW_SECRET"}).to_string())
        .create_async()
        .await;

    let client = client(&server);
    let app = devportal::models::Application::from_value(&json!({"id": "app-9", "name": "x", "is_dcr": true})).unwrap();
    let mut manager = CredentialManager::new("app-9", vec![]);

    let key_portal = PortalContext::default();
    assert_eq!(
        manager.refresh_secret(&client, &key_portal, &app).await.unwrap_err(),
        WorkflowError::DcrUnavailable
    );

    let dcr_portal = PortalContext { is_public: false, is_dcr: true };
    let secret = manager.refresh_secret(&client, &dcr_portal, &app).await.unwrap();
    assert_eq!(secret, &OneTimeSecret::RefreshedSecret(devportal::models::Secret::new("NEW_SECRET")));
    refresh.assert_async().await;
}

#[tokio::test]
async fn test_delete_removes_locally_and_refetches() {
    let mut server = mockito::Server::new_async().await;
    let list = server
        .mock("GET", "/applications")
        .with_status(200)
        .with_body(json!({"data": [{"id": "a1", "name": "A"}, {"id": "a2", "name": "B"}]}).to_string())
        .create_async()
        .await;
    let client = client(&server);
    let mut apps = ApplicationList::load(&client).await.unwrap();
    assert_eq!(apps.applications().len(), 2);
    list.remove_async().await;

    let delete = server
        .mock("DELETE", "/applications/a1")
        .with_status(204)
        .create_async()
        .await;
    let refetch = server
        .mock("GET", "/applications")
        .with_status(200)
        .with_body(json!({"data": [{"id": "a2", "name": "B"}]}).to_string())
        .create_async()
        .await;

    apps.delete(&client, "a1").await.unwrap();
    assert!(apps.find("a1").is_none());
    assert_eq!(apps.applications().len(), 1);
    delete.assert_async().await;
    refetch.assert_async().await;
}

#[tokio::test]
async fn test_update_refetches_record() {
    let mut server = mockito::Server::new_async().await;
    let patch = server
        .mock("PATCH", "/applications/a1")
        .match_body(Matcher::Json(json!({"name": "Renamed", "reference_id": "ref"})))
        .with_status(200)
        .with_body("")
        .create_async()
        .await;
    server
        .mock("GET", "/applications/a1")
        .with_status(200)
        .with_body(json!({"id": "a1", "name": "Renamed", "reference_id": "ref"}).to_string())
        .create_async()
        .await;

    let client = client(&server);
    let original = devportal::models::Application::from_value(&json!({"id": "a1", "name": "A", "reference_id": "ref"})).unwrap();
    let mut apps = ApplicationList::new(vec![original.clone()]);
    let mut draft = ApplicationDraft::from_application(&original);
    draft.name = "Renamed".into();
    let updated = apps.update(&client, "a1", &draft).await.unwrap();
    assert_eq!(updated.name, "Renamed");
    assert_eq!(apps.find("a1").unwrap().name, "Renamed");
    patch.assert_async().await;
}
