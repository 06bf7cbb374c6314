//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results. Comparing parsed JSON (not raw strings) avoids
//! false negatives from field-ordering differences.

use clinica_core::types::{
    ChartAccount, Credentials, DocumentType, EntryType, LedgerEntry, Medication, Patient, PatientNote, PaymentMethod,
    Supplier, VitalSigns,
};
use clinica_core::{ApiClient, ApiError, HttpMethod, HttpRequest, HttpResponse, RequestBody, Resource};
use serde::de::DeserializeOwned;
use serde_json::Value;

const BASE_URL: &str = "http://localhost:8000/api";

fn client() -> ApiClient {
    ApiClient::new(BASE_URL).with_token(Some("tok".to_string()))
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn load(raw: &str) -> Vec<Value> {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
}

/// Compare a built request with the `expected_request` block of a case.
fn assert_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.url, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: url");

    let expected_headers: Vec<(String, String)> = expected["headers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let arr = h.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect();
    assert_eq!(req.headers, expected_headers, "{name}: headers");

    match expected.get("body") {
        Some(expected_body) => {
            let json = req.body.as_ref().and_then(RequestBody::as_json).unwrap();
            let body: Value = serde_json::from_str(json).unwrap();
            assert_eq!(&body, expected_body, "{name}: body");
        }
        None => assert!(req.body.is_none(), "{name}: body should be None"),
    }
}

fn simulated(case: &Value) -> HttpResponse {
    let sim = &case["response"];
    HttpResponse::new(
        sim["status"].as_u64().unwrap() as u16,
        sim["body"].as_str().unwrap(),
    )
}

/// Check a parse failure against `expected_error` (and `expected_message`, if any).
fn assert_error(name: &str, err: &ApiError, case: &Value) {
    let kind = case["expected_error"].as_str().unwrap();
    let matched = match kind {
        "unauthorized" => matches!(err, ApiError::Unauthorized(_)),
        "not_found" => matches!(err, ApiError::NotFound),
        "http" => matches!(err, ApiError::Http { .. }),
        "deserialization" => matches!(err, ApiError::Deserialization(_)),
        other => panic!("{name}: unknown error kind {other}"),
    };
    assert!(matched, "{name}: expected {kind}, got {err:?}");

    if let Some(message) = case["expected_message"].as_str() {
        assert_eq!(err.user_message(), message, "{name}: message");
    }
}

/// Run `$check::<R>(case)` for the resource named by the case's collection path.
macro_rules! dispatch {
    ($case:expr, $check:ident, [$($ty:ty),+ $(,)?]) => {{
        let collection = $case["resource"].as_str().unwrap();
        $(
            if collection == <$ty as Resource>::COLLECTION {
                return $check::<$ty>($case);
            }
        )+
        panic!("no resource for collection {collection}");
    }};
}

macro_rules! every_resource {
    ($case:expr, $check:ident) => {
        dispatch!($case, $check, [
            Supplier, ChartAccount, PaymentMethod, DocumentType, EntryType, LedgerEntry,
            Medication, Patient, VitalSigns, PatientNote,
        ])
    };
}

// Chart-of-accounts payloads are built by the form as a tagged enum and are
// covered by unit tests instead.
macro_rules! payload_resource {
    ($case:expr, $check:ident) => {
        dispatch!($case, $check, [
            Supplier, PaymentMethod, DocumentType, EntryType, LedgerEntry, Medication, PatientNote,
        ])
    };
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

fn check_list<R: Resource>(case: &Value) {
    let name = case["name"].as_str().unwrap();
    let page = case["page"].as_u64().map(|p| p as u32);
    let c = client();

    let req = c.build_list::<R>(page);
    assert_request(name, &req, &case["expected_request"]);

    match c.parse_list::<R>(simulated(case)) {
        Ok(parsed) => {
            let expected = &case["expected"];
            assert_eq!(parsed.count, expected["count"].as_u64().unwrap(), "{name}: count");
            let ids: Vec<i64> = parsed.results.iter().map(Resource::id).collect();
            let expected_ids: Vec<i64> = serde_json::from_value(expected["ids"].clone()).unwrap();
            assert_eq!(ids, expected_ids, "{name}: ids");
        }
        Err(err) => assert_error(name, &err, case),
    }
}

#[test]
fn list_test_vectors() {
    fn run(case: &Value) {
        every_resource!(case, check_list)
    }
    for case in load(include_str!("../../test-vectors/list.json")) {
        run(&case);
    }
}

// ---------------------------------------------------------------------------
// Get
// ---------------------------------------------------------------------------

fn check_get<R: Resource>(case: &Value) {
    let name = case["name"].as_str().unwrap();
    let id = case["id"].as_i64().unwrap();
    let c = client();

    let req = c.build_get::<R>(id);
    assert_request(name, &req, &case["expected_request"]);

    match c.parse_get::<R>(simulated(case)) {
        Ok(record) => {
            assert_eq!(record.id(), id, "{name}: id");
            assert_eq!(
                record.display_name(),
                case["expected_display_name"].as_str().unwrap(),
                "{name}: display name"
            );
        }
        Err(err) => assert_error(name, &err, case),
    }
}

#[test]
fn get_test_vectors() {
    fn run(case: &Value) {
        every_resource!(case, check_get)
    }
    for case in load(include_str!("../../test-vectors/get.json")) {
        run(&case);
    }
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

fn check_create<R>(case: &Value)
where
    R: Resource,
    R::Payload: DeserializeOwned,
{
    let name = case["name"].as_str().unwrap();
    let payload: R::Payload = serde_json::from_value(case["payload"].clone()).unwrap();
    let c = client();

    let req = c.build_create::<R>(&payload).unwrap();
    assert_request(name, &req, &case["expected_request"]);

    match c.parse_create::<R>(simulated(case)) {
        Ok(record) => assert_eq!(record.id(), case["expected_id"].as_i64().unwrap(), "{name}: id"),
        Err(err) => assert_error(name, &err, case),
    }
}

#[test]
fn create_test_vectors() {
    fn run(case: &Value) {
        payload_resource!(case, check_create)
    }
    for case in load(include_str!("../../test-vectors/create.json")) {
        run(&case);
    }
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

fn check_update<R>(case: &Value)
where
    R: Resource,
    R::Payload: DeserializeOwned,
{
    let name = case["name"].as_str().unwrap();
    let id = case["id"].as_i64().unwrap();
    let payload: R::Payload = serde_json::from_value(case["payload"].clone()).unwrap();
    let c = client();

    let req = c.build_update::<R>(id, &payload).unwrap();
    assert_request(name, &req, &case["expected_request"]);

    match c.parse_update::<R>(simulated(case)) {
        Ok(record) => assert_eq!(record.id(), case["expected_id"].as_i64().unwrap(), "{name}: id"),
        Err(err) => assert_error(name, &err, case),
    }
}

#[test]
fn update_test_vectors() {
    fn run(case: &Value) {
        payload_resource!(case, check_update)
    }
    for case in load(include_str!("../../test-vectors/update.json")) {
        run(&case);
    }
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

fn check_delete<R: Resource>(case: &Value) {
    let name = case["name"].as_str().unwrap();
    let id = case["id"].as_i64().unwrap();
    let c = client();

    let req = c.build_delete::<R>(id);
    assert_request(name, &req, &case["expected_request"]);

    let result = c.parse_delete(simulated(case));
    if case.get("expected_error").is_some() {
        assert_error(name, &result.unwrap_err(), case);
    } else {
        assert!(result.is_ok(), "{name}: {result:?}");
    }
}

#[test]
fn delete_test_vectors() {
    fn run(case: &Value) {
        every_resource!(case, check_delete)
    }
    for case in load(include_str!("../../test-vectors/delete.json")) {
        run(&case);
    }
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[test]
fn login_test_vectors() {
    // A stale token must not leak into the sign-in request.
    let c = client();
    for case in load(include_str!("../../test-vectors/login.json")) {
        let name = case["name"].as_str().unwrap();
        let input: Credentials = serde_json::from_value(case["input"].clone()).unwrap();

        let req = c.build_login(&input).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        match c.parse_login(simulated(&case)) {
            Ok(login) => {
                let expected = &case["expected"];
                assert_eq!(login.token, expected["token"].as_str().unwrap(), "{name}: token");
                assert_eq!(login.user.id, expected["user_id"].as_i64().unwrap(), "{name}: user");
            }
            Err(err) => assert_error(name, &err, &case),
        }
    }
}
