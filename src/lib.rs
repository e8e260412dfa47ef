//! IntegraCAR
//!
//! CLI sobre o motor `integracar-common`: leitura de planilhas, configuração
//! do usuário, relatórios e exportação do recorte.

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod loader;
pub mod report;
pub mod session;
