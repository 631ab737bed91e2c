//! Client Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Legal kind of a client (individual or company)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "client_kind", rename_all = "SCREAMING_SNAKE_CASE")
)]
pub enum ClientKind {
    PessoaFisica,
    PessoaJuridica,
}

/// Client entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Client {
    pub id: i64,
    pub kind: ClientKind,
    pub name: String,
    /// CPF (individual tax id), PESSOA_FISICA only
    pub cpf: Option<String>,
    /// Company legal name, PESSOA_JURIDICA only
    pub razao_social: Option<String>,
    /// CNPJ (company tax id), PESSOA_JURIDICA only
    pub cnpj: Option<String>,
    pub inscricao_estadual: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Running account balance
    pub balance: f64,
    pub created_at: DateTime<Utc>,
}

/// Create client payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientCreate {
    pub kind: ClientKind,
    pub name: String,
    pub cpf: Option<String>,
    pub razao_social: Option<String>,
    pub cnpj: Option<String>,
    pub inscricao_estadual: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Update client payload (absent field = keep current value)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientUpdate {
    pub kind: Option<ClientKind>,
    pub name: Option<String>,
    pub cpf: Option<String>,
    pub razao_social: Option<String>,
    pub cnpj: Option<String>,
    pub inscricao_estadual: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub balance: Option<f64>,
}
