//! In-memory stand-in for the clinic API, used by tests and local runs.
//!
//! Every entity shares the same handlers: records are stored as raw JSON
//! objects per collection, ids come from one counter, lists are paged ten
//! at a time, newest first. All routes except `login/` require a bearer
//! token issued by `login/`.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const PAGE_SIZE: usize = 10;
pub const ADMIN_EMAIL: &str = "admin@clinica.com";
pub const ADMIN_PASSWORD: &str = "admin123";

const REQUIRED_MSG: &str = "Este campo é obrigatório.";

/// Collection/detail path pair and the fields the API refuses to omit.
#[derive(Debug)]
pub struct Entity {
    pub collection: &'static str,
    pub detail: &'static str,
    pub required: &'static [&'static str],
}

pub const ENTITIES: &[Entity] = &[
    Entity {
        collection: "fornecedores",
        detail: "fornecedor",
        required: &["nome", "cnpj_cpf"],
    },
    Entity {
        collection: "planos-contas",
        detail: "plano-conta",
        required: &["codigo", "nome", "tipo"],
    },
    Entity {
        collection: "formas-pagamento",
        detail: "forma-pagamento",
        required: &["nome"],
    },
    Entity {
        collection: "tipos-documento",
        detail: "tipo-documento",
        required: &["nome"],
    },
    Entity {
        collection: "tipos-conta",
        detail: "tipo-conta",
        required: &["nome"],
    },
    Entity {
        collection: "lancamentos",
        detail: "lancamento",
        required: &[
            "fornecedor",
            "tipo_conta",
            "tipo_documento",
            "plano_conta",
            "forma_pagamento",
            "data_vencimento",
            "valor",
        ],
    },
    Entity {
        collection: "medicamentos",
        detail: "medicamento",
        required: &["nome"],
    },
    Entity {
        collection: "pacientes",
        detail: "paciente",
        required: &["nome"],
    },
    Entity {
        collection: "sinais-vitais",
        detail: "sinal-vital",
        required: &["paciente", "data_hora"],
    },
    Entity {
        collection: "anotacoes",
        detail: "anotacao",
        required: &["paciente", "titulo", "conteudo", "data"],
    },
];

impl Entity {
    pub fn by_collection(name: &str) -> Option<&'static Entity> {
        ENTITIES.iter().find(|e| e.collection == name)
    }

    pub fn by_detail(name: &str) -> Option<&'static Entity> {
        ENTITIES.iter().find(|e| e.detail == name)
    }

    /// Server-side defaults for fields a client may leave out.
    fn apply_defaults(&self, fields: &mut Map<String, Value>) {
        let defaults = match self.collection {
            "lancamentos" => vec![("status", json!("pendente"))],
            "medicamentos" => vec![("estoque", json!(0)), ("controlado", json!(false))],
            "pacientes" => vec![("ativo", json!(true))],
            _ => Vec::new(),
        };
        for (key, value) in defaults {
            let slot = fields.entry(key).or_insert(Value::Null);
            if slot.is_null() {
                *slot = value;
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub nome: String,
    pub email: String,
    pub avatar: Option<String>,
}

#[derive(Clone, Debug)]
struct Account {
    user: User,
    password: String,
}

#[derive(Debug, Default)]
pub struct Store {
    records: HashMap<&'static str, BTreeMap<i64, Value>>,
    next_id: i64,
    accounts: Vec<Account>,
    tokens: HashMap<String, i64>,
}

impl Store {
    /// Empty store with the admin account.
    pub fn seeded() -> Self {
        Self {
            accounts: vec![Account {
                user: User {
                    id: 1,
                    nome: "Administrador".to_string(),
                    email: ADMIN_EMAIL.to_string(),
                    avatar: None,
                },
                password: ADMIN_PASSWORD.to_string(),
            }],
            ..Self::default()
        }
    }

    /// Accept `token` as the admin's session without a login round-trip.
    pub fn with_token(mut self, token: &str) -> Self {
        self.tokens.insert(token.to_string(), 1);
        self
    }

    /// Insert a record directly, bypassing validation. Returns its id.
    pub fn insert(&mut self, collection: &str, mut fields: Map<String, Value>) -> Option<i64> {
        let entity = Entity::by_collection(collection)?;
        entity.apply_defaults(&mut fields);
        Some(self.store(entity, fields))
    }

    fn store(&mut self, entity: &'static Entity, mut fields: Map<String, Value>) -> i64 {
        self.next_id += 1;
        let id = self.next_id;
        fields.insert("id".to_string(), json!(id));
        self.records
            .entry(entity.collection)
            .or_default()
            .insert(id, Value::Object(fields));
        id
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<i64, Reject> {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| {
                Reject::detail(
                    StatusCode::UNAUTHORIZED,
                    "As credenciais de autenticação não foram fornecidas.",
                )
            })?;
        self.tokens
            .get(token)
            .copied()
            .ok_or_else(|| Reject::detail(StatusCode::UNAUTHORIZED, "Token inválido."))
    }

    fn account_mut(&mut self, id: i64) -> Result<&mut Account, Reject> {
        self.accounts
            .iter_mut()
            .find(|a| a.user.id == id)
            .ok_or_else(Reject::not_found)
    }
}

pub type Db = Arc<RwLock<Store>>;

/// Error response with a JSON body.
#[derive(Debug)]
pub struct Reject {
    status: StatusCode,
    body: Value,
}

impl Reject {
    fn detail(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            body: json!({ "detail": message }),
        }
    }

    fn not_found() -> Self {
        Self::detail(StatusCode::NOT_FOUND, "Não encontrado.")
    }

    fn fields(errors: Map<String, Value>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: Value::Object(errors),
        }
    }
}

impl IntoResponse for Reject {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub fn app() -> Router {
    app_with(Store::seeded())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    let api = Router::new()
        .route("/login/", post(login))
        .route("/usuario/{id}/", put(update_user))
        .route("/usuario/{id}/avatar/", post(upload_avatar))
        .route("/{segment}/", get(list_records).post(create_record))
        .route(
            "/{segment}/{id}/",
            get(get_record).put(update_record).delete(delete_record),
        )
        .with_state(db);
    Router::new().nest("/api", api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Check required fields and strip client-supplied ids.
fn validate(entity: &Entity, body: Value) -> Result<Map<String, Value>, Reject> {
    let Value::Object(mut fields) = body else {
        return Err(Reject::detail(StatusCode::BAD_REQUEST, "Esperado um objeto JSON."));
    };
    fields.remove("id");
    let mut errors = Map::new();
    for name in entity.required {
        let missing = match fields.get(*name) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        };
        if missing {
            errors.insert(name.to_string(), json!([REQUIRED_MSG]));
        }
    }
    if !errors.is_empty() {
        return Err(Reject::fields(errors));
    }
    entity.apply_defaults(&mut fields);
    Ok(fields)
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<usize>,
}

async fn list_records(
    State(db): State<Db>,
    Path(collection): Path<String>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
) -> Result<Json<Value>, Reject> {
    let store = db.read().await;
    store.authorize(&headers)?;
    let entity = Entity::by_collection(&collection).ok_or_else(Reject::not_found)?;
    let all: Vec<&Value> = store
        .records
        .get(entity.collection)
        .map(|records| records.values().rev().collect())
        .unwrap_or_default();
    let page = query.page.unwrap_or(1).max(1);
    let results: Vec<Value> = all
        .iter()
        .skip((page - 1).saturating_mul(PAGE_SIZE))
        .take(PAGE_SIZE)
        .map(|v| (*v).clone())
        .collect();
    Ok(Json(json!({ "results": results, "count": all.len() })))
}

async fn create_record(
    State(db): State<Db>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), Reject> {
    let mut store = db.write().await;
    store.authorize(&headers)?;
    let entity = Entity::by_collection(&collection).ok_or_else(Reject::not_found)?;
    let fields = validate(entity, body)?;
    let id = store.store(entity, fields);
    tracing::info!(collection = entity.collection, id, "record created");
    let record = store
        .records
        .get(entity.collection)
        .and_then(|records| records.get(&id))
        .cloned()
        .ok_or_else(Reject::not_found)?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn get_record(
    State(db): State<Db>,
    Path((detail, id)): Path<(String, i64)>,
    headers: HeaderMap,
) -> Result<Json<Value>, Reject> {
    let store = db.read().await;
    store.authorize(&headers)?;
    let entity = Entity::by_detail(&detail).ok_or_else(Reject::not_found)?;
    store
        .records
        .get(entity.collection)
        .and_then(|records| records.get(&id))
        .cloned()
        .map(Json)
        .ok_or_else(Reject::not_found)
}

async fn update_record(
    State(db): State<Db>,
    Path((detail, id)): Path<(String, i64)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, Reject> {
    let mut store = db.write().await;
    store.authorize(&headers)?;
    let entity = Entity::by_detail(&detail).ok_or_else(Reject::not_found)?;
    let mut fields = validate(entity, body)?;
    let slot = store
        .records
        .get_mut(entity.collection)
        .and_then(|records| records.get_mut(&id))
        .ok_or_else(Reject::not_found)?;
    fields.insert("id".to_string(), json!(id));
    *slot = Value::Object(fields);
    tracing::info!(collection = entity.collection, id, "record updated");
    Ok(Json(slot.clone()))
}

async fn delete_record(
    State(db): State<Db>,
    Path((detail, id)): Path<(String, i64)>,
    headers: HeaderMap,
) -> Result<StatusCode, Reject> {
    let mut store = db.write().await;
    store.authorize(&headers)?;
    let entity = Entity::by_detail(&detail).ok_or_else(Reject::not_found)?;
    store
        .records
        .get_mut(entity.collection)
        .and_then(|records| records.remove(&id))
        .ok_or_else(Reject::not_found)?;
    tracing::info!(collection = entity.collection, id, "record deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

async fn login(State(db): State<Db>, Json(input): Json<LoginRequest>) -> Result<Json<Value>, Reject> {
    let mut store = db.write().await;
    let user = store
        .accounts
        .iter()
        .find(|a| a.user.email.eq_ignore_ascii_case(input.email.trim()) && a.password == input.password)
        .map(|a| a.user.clone())
        .ok_or_else(|| Reject::detail(StatusCode::UNAUTHORIZED, "E-mail ou senha inválidos."))?;
    let token = Uuid::new_v4().simple().to_string();
    store.tokens.insert(token.clone(), user.id);
    tracing::info!(user_id = user.id, "login");
    Ok(Json(json!({ "token": token, "user": user })))
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdate {
    pub nome: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

fn ensure_self(caller: i64, id: i64) -> Result<(), Reject> {
    if caller == id {
        Ok(())
    } else {
        Err(Reject::detail(
            StatusCode::FORBIDDEN,
            "Você não tem permissão para executar essa ação.",
        ))
    }
}

async fn update_user(
    State(db): State<Db>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(input): Json<ProfileUpdate>,
) -> Result<Json<User>, Reject> {
    let mut store = db.write().await;
    ensure_self(store.authorize(&headers)?, id)?;
    if let Some(email) = &input.email {
        if !email.contains('@') {
            let mut errors = Map::new();
            errors.insert("email".to_string(), json!(["Insira um endereço de email válido."]));
            return Err(Reject::fields(errors));
        }
    }
    let account = store.account_mut(id)?;
    if let Some(nome) = input.nome {
        account.user.nome = nome;
    }
    if let Some(email) = input.email {
        account.user.email = email;
    }
    if let Some(password) = input.password {
        account.password = password;
    }
    Ok(Json(account.user.clone()))
}

async fn upload_avatar(
    State(db): State<Db>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<User>, Reject> {
    ensure_self(db.read().await.authorize(&headers)?, id)?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Reject::detail(StatusCode::BAD_REQUEST, &e.to_string()))?
    {
        if field.name() != Some("avatar") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("avatar").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| Reject::detail(StatusCode::BAD_REQUEST, &e.to_string()))?;
        upload = Some((file_name, bytes.len()));
    }
    let Some((file_name, size)) = upload else {
        let mut errors = Map::new();
        errors.insert("avatar".to_string(), json!(["Nenhum arquivo foi submetido."]));
        return Err(Reject::fields(errors));
    };

    let mut store = db.write().await;
    let account = store.account_mut(id)?;
    account.user.avatar = Some(format!("/media/avatars/{id}/{file_name}"));
    tracing::info!(user_id = id, bytes = size, "avatar uploaded");
    Ok(Json(account.user.clone()))
}
