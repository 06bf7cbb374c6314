use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with, Store, User, ADMIN_EMAIL, ADMIN_PASSWORD, PAGE_SIZE};
use serde_json::{json, Value};
use tower::ServiceExt;

const TOKEN: &str = "test-token";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn authed() -> axum::Router {
    app_with(Store::seeded().with_token(TOKEN))
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .header(http::header::AUTHORIZATION, format!("Bearer {TOKEN}"))
        .body(body.to_string())
        .unwrap()
}

fn bare_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, format!("Bearer {TOKEN}"))
        .body(String::new())
        .unwrap()
}

// --- auth ---

#[tokio::test]
async fn login_returns_token_and_user() {
    let body = json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }).to_string();
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/login/")
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let login: Value = body_json(resp).await;
    assert!(!login["token"].as_str().unwrap().is_empty());
    assert_eq!(login["user"]["email"], ADMIN_EMAIL);
}

#[tokio::test]
async fn login_with_wrong_password_is_401() {
    let body = json!({ "email": ADMIN_EMAIL, "password": "nope" }).to_string();
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/login/")
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let err: Value = body_json(resp).await;
    assert!(err["detail"].is_string());
}

#[tokio::test]
async fn missing_token_is_401() {
    let resp = authed()
        .oneshot(Request::builder().uri("/api/fornecedores/").body(String::new()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn issued_token_opens_collections() {
    let app = app();
    let body = json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }).to_string();
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/login/")
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();
    let login: Value = body_json(resp).await;
    let token = login["token"].as_str().unwrap();

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/pacientes/")
                .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

// --- list ---

#[tokio::test]
async fn list_empty_collection() {
    let resp = authed().oneshot(bare_request("GET", "/api/fornecedores/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let page: Value = body_json(resp).await;
    assert_eq!(page["count"], 0);
    assert_eq!(page["results"], json!([]));
}

#[tokio::test]
async fn unknown_collection_is_404() {
    let resp = authed().oneshot(bare_request("GET", "/api/nada/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_pages_newest_first() {
    let mut store = Store::seeded().with_token(TOKEN);
    for i in 0..12 {
        let mut fields = serde_json::Map::new();
        fields.insert("nome".to_string(), json!(format!("Forma {i}")));
        store.insert("formas-pagamento", fields).unwrap();
    }
    let app = app_with(store);

    let resp = app.clone().oneshot(bare_request("GET", "/api/formas-pagamento/")).await.unwrap();
    let first: Value = body_json(resp).await;
    assert_eq!(first["count"], 12);
    assert_eq!(first["results"].as_array().unwrap().len(), PAGE_SIZE);
    assert_eq!(first["results"][0]["nome"], "Forma 11");

    let resp = app
        .oneshot(bare_request("GET", "/api/formas-pagamento/?page=2"))
        .await
        .unwrap();
    let second: Value = body_json(resp).await;
    assert_eq!(second["results"].as_array().unwrap().len(), 2);
    assert_eq!(second["results"][1]["nome"], "Forma 0");
}

#[tokio::test]
async fn huge_page_number_is_an_empty_page() {
    let uri = format!("/api/formas-pagamento/?page={}", usize::MAX);
    let resp = authed().oneshot(bare_request("GET", &uri)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let page: Value = body_json(resp).await;
    assert_eq!(page["results"], json!([]));
}

// --- create ---

#[tokio::test]
async fn create_returns_201_with_id() {
    let resp = authed()
        .oneshot(json_request(
            "POST",
            "/api/fornecedores/",
            r#"{"nome":"Farmácia Central","cnpj_cpf":"12.345.678/0001-90"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = body_json(resp).await;
    assert_eq!(created["id"], 1);
    assert_eq!(created["nome"], "Farmácia Central");
}

#[tokio::test]
async fn create_missing_required_fields_returns_400() {
    let resp = authed()
        .oneshot(json_request("POST", "/api/lancamentos/", r#"{"valor":"10.00"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let errors: Value = body_json(resp).await;
    assert!(errors["fornecedor"].is_array());
    assert!(errors.get("valor").is_none());
}

// --- get / update / delete ---

#[tokio::test]
async fn get_missing_record_is_404() {
    let resp = authed().oneshot(bare_request("GET", "/api/paciente/99/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_numeric_id_is_400() {
    let resp = authed().oneshot(bare_request("GET", "/api/paciente/abc/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn crud_lifecycle() {
    use tower::Service;

    let mut app = authed().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/api/medicamentos/", r#"{"nome":"Losartana","dosagem":"50mg"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = body_json(resp).await;
    assert_eq!(created["estoque"], 0);
    assert_eq!(created["controlado"], false);
    let id = created["id"].as_i64().unwrap();

    // update replaces the record
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            &format!("/api/medicamento/{id}/"),
            r#"{"nome":"Losartana potássica","estoque":30,"controlado":false}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = body_json(resp).await;
    assert_eq!(updated["id"], id);
    assert_eq!(updated["estoque"], 30);
    assert!(updated.get("dosagem").is_none());

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(bare_request("DELETE", &format!("/api/medicamento/{id}/")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // get after delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(bare_request("GET", &format!("/api/medicamento/{id}/")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- account ---

#[tokio::test]
async fn profile_update_changes_name() {
    let resp = authed()
        .oneshot(json_request("PUT", "/api/usuario/1/", r#"{"nome":"Dra. Ana"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let user: User = body_json(resp).await;
    assert_eq!(user.nome, "Dra. Ana");
    assert_eq!(user.email, ADMIN_EMAIL);
}

#[tokio::test]
async fn profile_update_of_other_user_is_403() {
    let resp = authed()
        .oneshot(json_request("PUT", "/api/usuario/2/", r#"{"nome":"X"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn avatar_upload_sets_path() {
    let boundary = "XBOUNDARY";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"avatar\"; filename=\"eu.png\"\r\n\
         Content-Type: image/png\r\n\r\nPNGDATA\r\n--{boundary}--\r\n"
    );
    let resp = authed()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/usuario/1/avatar/")
                .header(
                    http::header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .header(http::header::AUTHORIZATION, format!("Bearer {TOKEN}"))
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let user: User = body_json(resp).await;
    assert_eq!(user.avatar.as_deref(), Some("/media/avatars/1/eu.png"));
}

#[tokio::test]
async fn avatar_upload_without_file_is_400() {
    let boundary = "XBOUNDARY";
    let body = format!("--{boundary}\r\nContent-Disposition: form-data; name=\"nome\"\r\n\r\nAna\r\n--{boundary}--\r\n");
    let resp = authed()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/usuario/1/avatar/")
                .header(
                    http::header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .header(http::header::AUTHORIZATION, format!("Bearer {TOKEN}"))
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
