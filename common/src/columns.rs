//! Detecção de colunas por palavras-chave no cabeçalho
//!
//! Cada papel tem um predicado próprio sobre o cabeçalho normalizado. O
//! primeiro cabeçalho (na ordem da planilha) que satisfaz o predicado vence;
//! papel sem coluna fica ausente e o restante do motor apenas o ignora.

use crate::text;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Papel semântico de uma coluna
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Status,
    Municipio,
    Campus,
    Avaliador,
    Codigo,
    Inicio,
    Ultima,
    Meta,
}

impl Role {
    /// Todos os papéis, na ordem de resolução
    pub const ALL: [Role; 8] = [
        Role::Status,
        Role::Municipio,
        Role::Campus,
        Role::Avaliador,
        Role::Codigo,
        Role::Inicio,
        Role::Ultima,
        Role::Meta,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Status => "status",
            Role::Municipio => "municipio",
            Role::Campus => "campus",
            Role::Avaliador => "avaliador",
            Role::Codigo => "codigo",
            Role::Inicio => "inicio",
            Role::Ultima => "ultima",
            Role::Meta => "meta",
        }
    }

    /// Predicado do papel (recebe o cabeçalho já normalizado)
    pub fn predicate(&self) -> fn(&str) -> bool {
        match self {
            Role::Status => is_status_header,
            Role::Municipio => is_municipio_header,
            Role::Campus => is_campus_header,
            Role::Avaliador => is_avaliador_header,
            Role::Codigo => is_codigo_header,
            Role::Inicio => is_inicio_header,
            Role::Ultima => is_ultima_header,
            Role::Meta => is_meta_header,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = text::normalize(s);
        Role::ALL
            .iter()
            .copied()
            .find(|role| role.as_str() == key)
            .ok_or_else(|| format!("Papel de coluna desconhecido: {}", s))
    }
}

/// O que fazer quando dois papéis aceitam o mesmo cabeçalho
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Cada papel é resolvido sozinho; a mesma coluna pode servir a dois papéis
    Independent,
    /// Coluna já atribuída (na ordem de `Role::ALL`) não é reutilizada
    Exclusive,
}

/// Política usada por [`detect_columns`]
pub const COLLISION_POLICY: CollisionPolicy = CollisionPolicy::Independent;

fn contains_any(header: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| header.contains(k))
}

fn has_token(header: &str, token: &str) -> bool {
    header
        .split(|c: char| !c.is_alphanumeric())
        .any(|t| t == token)
}

pub fn is_status_header(header: &str) -> bool {
    header.contains("status")
}

pub fn is_municipio_header(header: &str) -> bool {
    header.contains("munic")
}

pub fn is_campus_header(header: &str) -> bool {
    header.contains("campus")
}

pub fn is_avaliador_header(header: &str) -> bool {
    contains_any(header, &["aval", "tecnico"])
}

/// "Nº do processo", "E-Docs"; não confunde com "Status do processo"
pub fn is_codigo_header(header: &str) -> bool {
    contains_any(header, &["processo", "edoc", "e-doc"])
        && !contains_any(header, &["status", "aval", "tecnico", "data"])
}

pub fn is_inicio_header(header: &str) -> bool {
    contains_any(header, &["criacao", "abertura", "inicio", "analise"])
        && !contains_any(header, &["status", "ultima", "atualiz", "aval", "tecnico"])
}

/// "Data da ultima atualização de status" também conta
pub fn is_ultima_header(header: &str) -> bool {
    contains_any(header, &["ultima", "atualiz"])
}

/// "sla" só como palavra inteira ("legislação" não é prazo)
pub fn is_meta_header(header: &str) -> bool {
    contains_any(header, &["meta", "prazo"]) || has_token(header, "sla")
}

/// Mapa papel → cabeçalho original
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRoleMap {
    roles: BTreeMap<Role, String>,
}

impl ColumnRoleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cabeçalho atribuído ao papel
    pub fn get(&self, role: Role) -> Option<&str> {
        self.roles.get(&role).map(String::as_str)
    }

    pub fn set(&mut self, role: Role, header: impl Into<String>) {
        self.roles.insert(role, header.into());
    }

    pub fn contains(&self, role: Role) -> bool {
        self.roles.contains_key(&role)
    }

    /// Papéis sem coluna correspondente
    pub fn missing(&self) -> Vec<Role> {
        Role::ALL.iter().copied().filter(|r| !self.contains(*r)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, &str)> {
        self.roles.iter().map(|(role, header)| (*role, header.as_str()))
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

/// Detecta as colunas com a política padrão
pub fn detect_columns<S: AsRef<str>>(headers: &[S]) -> ColumnRoleMap {
    detect_columns_with(headers, COLLISION_POLICY)
}

/// Detecta as colunas com uma política explícita
pub fn detect_columns_with<S: AsRef<str>>(headers: &[S], policy: CollisionPolicy) -> ColumnRoleMap {
    let normalized: Vec<String> = headers.iter().map(|h| text::normalize(h.as_ref())).collect();
    let mut taken = vec![false; headers.len()];
    let mut map = ColumnRoleMap::new();

    for role in Role::ALL {
        let predicate = role.predicate();
        let found = normalized.iter().enumerate().find(|(i, header)| {
            let free = policy == CollisionPolicy::Independent || !taken[*i];
            free && predicate(header.as_str())
        });

        if let Some((index, _)) = found {
            taken[index] = true;
            map.set(role, headers[index].as_ref().trim());
        }
    }

    debug!(
        "colunas detectadas: {:?}; ausentes: {:?}",
        map.iter().collect::<Vec<_>>(),
        map.missing()
    );

    map
}
