//! Planilha carregada + motor configurado

use crate::config::Config;
use crate::error::{IntegraCarError, Result};
use crate::loader;
use chrono::{Local, NaiveDateTime};
use integracar_common::sla::parse_date;
use integracar_common::{DashboardState, DashboardView, Engine, RecordFilter};
use log::{debug, warn};
use std::path::Path;

pub struct Session {
    pub engine: Engine,
    pub state: DashboardState,
}

impl Session {
    /// Lê a planilha e monta o estado com a configuração do usuário
    pub fn open(input: &Path, config: &Config, reference: Option<&Path>) -> Result<Self> {
        let sheet = loader::load_sheet(input)?;
        debug!("{}: {} colunas, {} linhas", input.display(), sheet.headers.len(), sheet.rows.len());

        let reference = config.reference_data(reference)?;
        let engine = Engine::new(config.engine.clone(), reference)?;
        let state = engine.load(&sheet.headers, sheet.rows);

        let missing = state.roles().missing();
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|r| r.as_str()).collect();
            warn!("Colunas não encontradas: {}", names.join(", "));
        }

        Ok(Self { engine, state })
    }

    pub fn refresh(&mut self, filter: &RecordFilter, now: NaiveDateTime) -> DashboardView {
        self.engine.refresh(&mut self.state, filter, now)
    }
}

/// `--today` ou o relógio local
pub fn resolve_now(today: Option<&str>) -> Result<NaiveDateTime> {
    match today {
        Some(raw) => parse_date(raw).ok_or_else(|| IntegraCarError::InvalidDate(raw.to_string())),
        None => Ok(Local::now().naive_local()),
    }
}
