//! Integration tests for the onboarding flow.

mod common;

use kyckit_core::api::{ErrorKind, USER_ID_HEADER};
use kyckit_core::kyc::{KycStep, PhoneVerification};
use kyckit_core::services::DocumentUpload;
use kyckit_core::storage::{keys, KeyValueBackend};
use kyckit_core::{AppSettings, LoginRequest};
use mockito::{Matcher, Server};
use serde_json::json;

fn login_request() -> LoginRequest {
    LoginRequest {
        email: "a@x.com".to_string(),
        password: "p".to_string(),
    }
}

#[tokio::test]
async fn test_login_then_authenticated_calls() -> eyre::Result<()> {
    let mut server = Server::new_async().await;
    let login = server
        .mock("POST", "/api/auth/login")
        .match_body(Matcher::Json(json!({"email": "a@x.com", "password": "p"})))
        .with_status(200)
        .with_body(common::envelope(&json!({"user": {"id": "1"}, "token": "eyJ..."})))
        .create_async()
        .await;
    let status = server
        .mock("GET", "/api/kyc/status")
        .match_header("authorization", "Bearer eyJ...")
        .match_header(USER_ID_HEADER, "1")
        .with_status(200)
        .with_body(common::envelope(&json!({"status": "pending"})))
        .create_async()
        .await;

    let (client, _) = common::memory_client(&server.url());
    assert!(!client.auth().is_authenticated());

    client.auth().login(login_request()).await?;
    login.assert_async().await;

    let session = client.sessions().get_session();
    assert_eq!(session.token.as_deref(), Some("eyJ..."));
    assert_eq!(session.user.map(|user| user.id).as_deref(), Some("1"));
    assert!(session.last_login_time.is_some());
    assert!(client.auth().is_authenticated());

    assert_eq!(client.kyc().status().await?.status, "pending");
    status.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_unauthorized_response_evicts_session() -> eyre::Result<()> {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/auth/login")
        .with_status(200)
        .with_body(common::envelope(&json!({"user": {"id": 1}, "token": "expired"})))
        .create_async()
        .await;
    server
        .mock("GET", "/api/documents")
        .with_status(401)
        .with_body(r#"{"success":false,"message":"Token expired"}"#)
        .create_async()
        .await;

    let (client, _) = common::memory_client(&server.url());
    client
        .sessions()
        .set_app_settings(AppSettings {
            theme: "dark".to_string(),
            ..AppSettings::default()
        })?;
    client.auth().login(login_request()).await?;

    let err = client.documents().list().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
    assert_eq!(err.to_string(), "auth error: Token expired");

    let session = client.sessions().get_session();
    assert_eq!(session.token, None);
    assert_eq!(session.user, None);
    assert_eq!(client.sessions().app_settings().theme, "dark");
    Ok(())
}

#[tokio::test]
async fn test_full_onboarding_survives_restart() -> eyre::Result<()> {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/documents")
        .with_status(201)
        .with_body(common::envelope(&json!({
            "id": "doc-1",
            "type": "passport",
            "filename": "passport.jpg",
            "status": "uploaded"
        })))
        .create_async()
        .await;
    server
        .mock("POST", "/api/kyc/verify-identity")
        .with_status(200)
        .with_body(common::envelope(&json!({"isVerified": true, "faceMatchScore": 0.88})))
        .create_async()
        .await;
    server
        .mock("POST", "/api/kyc/send-phone-code")
        .with_status(200)
        .with_body(r#"{"success":true}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/api/kyc/verify-phone")
        .with_status(200)
        .with_body(common::envelope(&json!({"verified": true})))
        .create_async()
        .await;

    let dir = tempfile::tempdir()?;
    let client = common::file_client(dir.path(), &server.url());
    let flow = client.flow();

    flow.complete_step(KycStep::ProfileSetup)?;
    let document = flow
        .upload_document(DocumentUpload {
            document_type: "passport".to_string(),
            filename: "passport.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            content: b"jpeg bytes".to_vec(),
        })
        .await?;
    flow.complete_step(KycStep::DocumentUpload)?;
    flow.verify_identity(kyckit_core::kyc::IdentityVerificationRequest {
        selfie: "c2VsZmll".to_string(),
        document_id: document.id.clone(),
        nfc_data: None,
    })
    .await?;
    flow.send_phone_code("+15550100".to_string()).await?;
    flow.verify_phone("123456".to_string()).await?;

    let progress = flow.progress();
    assert_eq!(progress.current_step, KycStep::FinalReview);
    assert_eq!(
        progress.phone_verification,
        PhoneVerification {
            phone_number: Some("+15550100".to_string()),
            is_verified: true,
            code_sent: true,
        }
    );

    drop(client);
    let reopened = common::file_client(dir.path(), &server.url());
    assert_eq!(reopened.flow().progress(), progress);
    assert_eq!(reopened.documents().cached(), vec![document]);

    let progress = reopened.flow().complete_step(KycStep::FinalReview)?;
    assert_eq!(progress.current_step, KycStep::Completed);
    Ok(())
}

#[tokio::test]
async fn test_account_deletion_wipes_user_data() -> eyre::Result<()> {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/auth/login")
        .with_status(200)
        .with_body(common::envelope(&json!({"user": {"id": "1"}, "token": "t"})))
        .create_async()
        .await;
    server
        .mock("GET", "/api/kyc/status")
        .with_status(200)
        .with_body(common::envelope(&json!({"status": "approved"})))
        .create_async()
        .await;
    server
        .mock("DELETE", "/api/users/account")
        .with_status(200)
        .with_body(r#"{"success":true}"#)
        .create_async()
        .await;

    let (client, backend) = common::memory_client(&server.url());
    client.auth().login(login_request()).await?;
    client.kyc().status().await?;
    client.flow().complete_step(KycStep::ProfileSetup)?;
    client.sessions().set_app_settings(AppSettings::default())?;

    client.user().delete_account().await?;

    assert!(!client.auth().is_authenticated());
    assert_eq!(client.kyc().cached_status(), None);
    assert_eq!(backend.keys()?, vec![keys::APP_SETTINGS.to_string()]);
    Ok(())
}
