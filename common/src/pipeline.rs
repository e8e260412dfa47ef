//! Atualização do painel
//!
//! O [`Engine`] é imutável (canonicalizadores, configuração, referência). O
//! estado mutável fica em [`DashboardState`], que pertence ao chamador: o
//! lote bruto e a memória de rótulos já resolvidos. Cada `refresh` recalcula
//! todas as visões a partir do lote bruto.

use crate::aggregate::{self, GroupCount, PivotTable};
use crate::canonical::{self, CanonicalCache, Canonicalizer, EntityKind, MatchSource};
use crate::columns::{detect_columns, ColumnRoleMap};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::geo::{self, MapView};
use crate::reference::ReferenceData;
use crate::sla::{self, SlaSummary};
use crate::status::{self, Polarity, StatusClass};
use crate::text;
use crate::types::{NormalizedRecord, ProcessRecord, RawRecord};
use chrono::NaiveDateTime;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Dimensão de agrupamento dos relatórios
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    #[default]
    Campus,
    Municipio,
    Avaliador,
}

impl Dimension {
    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Campus => "Campus",
            Dimension::Municipio => "Município",
            Dimension::Avaliador => "Avaliador",
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match text::normalize(s).as_str() {
            "campus" | "campi" => Ok(Dimension::Campus),
            "municipio" | "municipios" => Ok(Dimension::Municipio),
            "avaliador" | "avaliadores" | "orientador" | "tecnico" => Ok(Dimension::Avaliador),
            _ => Err(format!("Dimensão desconhecida: {} (campus / municipio / avaliador)", s)),
        }
    }
}

/// Filtro por igualdade de rótulos canônicos
///
/// Os valores passam pelo mesmo canonicalizador dos registros, então
/// "serra - es" filtra "Serra".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordFilter {
    pub campus: Option<String>,
    pub municipio: Option<String>,
    pub avaliador: Option<String>,
    pub status_class: Option<StatusClass>,
}

impl RecordFilter {
    pub fn is_empty(&self) -> bool {
        self.campus.is_none()
            && self.municipio.is_none()
            && self.avaliador.is_none()
            && self.status_class.is_none()
    }
}

/// Filtro já reduzido a rótulos canônicos e chave de agrupamento
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ResolvedFilter {
    campus: Option<String>,
    municipio: Option<String>,
    avaliador_group: Option<String>,
    status_class: Option<StatusClass>,
}

impl ResolvedFilter {
    fn matches(&self, record: &NormalizedRecord) -> bool {
        fn same<T: PartialEq>(wanted: &Option<T>, actual: &T) -> bool {
            wanted.as_ref().map_or(true, |w| w == actual)
        }
        same(&self.campus, &record.campus)
            && same(&self.municipio, &record.municipio)
            && same(&self.avaliador_group, &record.avaliador_group)
            && same(&self.status_class, &record.status_class)
    }
}

/// Estado do painel, mantido pelo chamador entre atualizações
#[derive(Debug, Clone)]
pub struct DashboardState {
    headers: Vec<String>,
    roles: ColumnRoleMap,
    records: Vec<ProcessRecord>,
    municipio_cache: CanonicalCache,
    campus_cache: CanonicalCache,
    avaliador_cache: CanonicalCache,
}

impl DashboardState {
    pub fn roles(&self) -> &ColumnRoleMap {
        &self.roles
    }

    pub fn records(&self) -> &[ProcessRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Cabeçalhos originais, na ordem da planilha
    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

/// Contagem por classe de status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassCounts {
    pub completed: usize,
    /// Concluídos com desfecho positivo
    pub positive: usize,
    /// Concluídos com desfecho negativo
    pub negative: usize,
    pub under_review: usize,
    pub pending: usize,
    pub other: usize,
    pub undefined: usize,
}

impl ClassCounts {
    fn add(&mut self, class: StatusClass, polarity: Polarity) {
        match class {
            StatusClass::Completed => self.completed += 1,
            StatusClass::UnderReview => self.under_review += 1,
            StatusClass::Pending => self.pending += 1,
            StatusClass::Other => self.other += 1,
            StatusClass::Undefined => self.undefined += 1,
        }
        match polarity {
            Polarity::Positive => self.positive += 1,
            Polarity::Negative => self.negative += 1,
            Polarity::Neutral => {}
        }
    }

    pub fn get(&self, class: StatusClass) -> usize {
        match class {
            StatusClass::Completed => self.completed,
            StatusClass::UnderReview => self.under_review,
            StatusClass::Pending => self.pending,
            StatusClass::Other => self.other,
            StatusClass::Undefined => self.undefined,
        }
    }
}

/// Quantidades distintas no recorte
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DistinctCounts {
    pub campuses: usize,
    pub municipalities: usize,
    pub evaluators: usize,
}

/// Opções dos filtros (lote inteiro, ordenadas pela chave normalizada)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub campuses: Vec<String>,
    pub municipalities: Vec<String>,
    pub evaluators: Vec<String>,
}

/// Processo em aberto perto do prazo (ou atrasado)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CriticalPending {
    pub campus: String,
    pub municipio: String,
    pub status: String,
    pub elapsed_days: i64,
    pub deadline_days: i64,
    pub avaliador: String,
    pub codigo: String,
    pub remaining_days: i64,
}

/// Indicadores do recorte
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub classes: ClassCounts,
    pub sla: SlaSummary,
    pub sla_percentage: Option<u8>,
    pub default_deadline_percentage: Option<u8>,
    pub default_deadline_days: i64,
}

/// Tudo o que uma atualização produz
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub roles: ColumnRoleMap,
    pub filter: RecordFilter,
    /// Posição de cada registro do recorte no lote
    pub indices: Vec<usize>,
    pub records: Vec<NormalizedRecord>,
    pub summary: Summary,
    pub municipios: Vec<GroupCount>,
    pub campi: Vec<GroupCount>,
    pub avaliadores: Vec<GroupCount>,
    /// Contagem por texto de status ("Sem status" quando vazio)
    pub statuses: Vec<GroupCount>,
    pub distinct: DistinctCounts,
    pub options: FilterOptions,
    pub pendencias: Vec<CriticalPending>,
}

impl DashboardView {
    /// Pares (registro original, visão normalizada) do recorte
    pub fn rows<'s>(
        &'s self,
        state: &'s DashboardState,
    ) -> impl Iterator<Item = (&'s ProcessRecord, &'s NormalizedRecord)> + 's {
        self.indices
            .iter()
            .zip(&self.records)
            .filter_map(move |(&i, normalized)| state.records.get(i).map(|r| (r, normalized)))
    }

    /// Rótulo de linha de cada registro na dimensão
    ///
    /// Avaliadores saem pelo nome mais frequente do grupo, como nas contagens.
    fn row_labels(&self, dimension: Dimension) -> Vec<String> {
        match dimension {
            Dimension::Campus => self.records.iter().map(|r| r.campus.clone()).collect(),
            Dimension::Municipio => self.records.iter().map(|r| r.municipio.clone()).collect(),
            Dimension::Avaliador => {
                let mut names: HashMap<&str, Vec<&str>> = HashMap::new();
                for r in &self.records {
                    names
                        .entry(r.avaliador_group.as_str())
                        .or_default()
                        .push(r.avaliador_display.as_str());
                }
                let labels: HashMap<&str, String> = names
                    .into_iter()
                    .map(|(group, names)| (group, aggregate::find_most_frequent(names).unwrap_or_default()))
                    .collect();
                self.records
                    .iter()
                    .map(|r| labels.get(r.avaliador_group.as_str()).cloned().unwrap_or_default())
                    .collect()
            }
        }
    }

    /// Pivô dimensão × rótulos de status esperados
    pub fn status_pivot(&self, dimension: Dimension, status_labels: &[String], top: usize) -> PivotTable {
        let rows = self.row_labels(dimension);
        aggregate::status_pivot(
            rows.iter()
                .map(String::as_str)
                .zip(self.records.iter().map(|r| r.status.as_str())),
            status_labels,
            top,
        )
    }

    /// Pivô dimensão × classe de status
    pub fn class_pivot(&self, dimension: Dimension, top: usize) -> PivotTable {
        let rows = self.row_labels(dimension);
        aggregate::class_pivot(
            rows.iter()
                .map(String::as_str)
                .zip(self.records.iter().map(|r| r.status_class)),
            top,
        )
    }

    /// Contagens da dimensão
    pub fn counts(&self, dimension: Dimension) -> &[GroupCount] {
        match dimension {
            Dimension::Campus => &self.campi,
            Dimension::Municipio => &self.municipios,
            Dimension::Avaliador => &self.avaliadores,
        }
    }

    /// Pontos do mapa por município
    pub fn map(&self, reference: &ReferenceData) -> MapView {
        geo::map_view(&self.municipios, reference)
    }
}

/// Motor de normalização e classificação
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    reference: ReferenceData,
    municipio: Canonicalizer,
    campus: Canonicalizer,
    avaliador: Canonicalizer,
}

impl Engine {
    pub fn new(config: EngineConfig, reference: ReferenceData) -> Result<Self> {
        config.validate()?;
        let municipio = Canonicalizer::municipio(&reference, config.fuzzy.clone())?;
        let campus = Canonicalizer::campus(&reference, config.fuzzy.clone())?;
        let avaliador = Canonicalizer::avaliador(&reference, config.fuzzy.clone())?;
        Ok(Self { config, reference, municipio, campus, avaliador })
    }

    /// Motor com a configuração padrão e a referência do Espírito Santo
    pub fn espirito_santo() -> Result<Self> {
        Self::new(EngineConfig::default(), ReferenceData::espirito_santo())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    pub fn canonicalizer(&self, kind: EntityKind) -> &Canonicalizer {
        match kind {
            EntityKind::Municipio => &self.municipio,
            EntityKind::Campus => &self.campus,
            EntityKind::Avaliador => &self.avaliador,
        }
    }

    /// Detecta as colunas e monta o estado a partir do lote bruto
    ///
    /// `headers` vazio usa os cabeçalhos da primeira linha.
    pub fn load(&self, headers: &[String], rows: Vec<RawRecord>) -> DashboardState {
        let headers: Vec<String> = if headers.is_empty() {
            rows.first()
                .map(|r| r.headers().map(str::to_string).collect())
                .unwrap_or_default()
        } else {
            headers.iter().map(|h| h.trim().to_string()).collect()
        };
        let roles = detect_columns(&headers);

        let records: Vec<ProcessRecord> = rows
            .into_iter()
            .filter(|r| !r.is_blank())
            .map(|r| ProcessRecord::from_raw(r, &roles))
            .collect();
        debug!("{} registros carregados", records.len());

        DashboardState {
            headers,
            roles,
            records,
            municipio_cache: CanonicalCache::new(EntityKind::Municipio),
            campus_cache: CanonicalCache::new(EntityKind::Campus),
            avaliador_cache: CanonicalCache::new(EntityKind::Avaliador),
        }
    }

    fn normalize_record(
        &self,
        state_caches: (&mut CanonicalCache, &mut CanonicalCache, &mut CanonicalCache),
        record: &ProcessRecord,
        now: NaiveDateTime,
    ) -> NormalizedRecord {
        let (municipio_cache, campus_cache, avaliador_cache) = state_caches;

        let municipio = municipio_cache
            .canonicalize(&self.municipio, record.municipio.as_deref().unwrap_or(""));
        let campus = campus_cache.canonicalize(&self.campus, record.campus.as_deref().unwrap_or(""));

        let person = avaliador_cache.resolve(&self.avaliador, record.avaliador.as_deref().unwrap_or(""));
        let (avaliador_display, avaliador_group) = if person.source == MatchSource::NotInformed {
            (person.label.clone(), String::new())
        } else {
            (
                canonical::person_display_name(&person.label),
                canonical::person_grouping_key(&person.label, self.config.grouping_prefix_len),
            )
        };
        let avaliador = person.label.clone();

        let classification = status::classify_with_polarity(record.status_text());
        let sla = sla::evaluate(record, now, &self.config);

        NormalizedRecord {
            municipio,
            campus,
            avaliador,
            avaliador_display,
            avaliador_group,
            status: text::clean(record.status_text()),
            status_class: classification.class,
            polarity: classification.polarity,
            sla,
        }
    }

    /// Canonicaliza os valores do filtro uma única vez por atualização
    fn resolve_filter(&self, filter: &RecordFilter) -> ResolvedFilter {
        let avaliador_group = filter.avaliador.as_deref().map(|raw| {
            let resolved = self.avaliador.resolve(raw);
            if resolved.source == MatchSource::NotInformed {
                String::new()
            } else {
                canonical::person_grouping_key(&resolved.label, self.config.grouping_prefix_len)
            }
        });

        ResolvedFilter {
            campus: filter.campus.as_deref().map(|raw| self.campus.canonicalize(raw)),
            municipio: filter.municipio.as_deref().map(|raw| self.municipio.canonicalize(raw)),
            avaliador_group,
            status_class: filter.status_class,
        }
    }

    /// Recalcula todas as visões do recorte
    pub fn refresh(&self, state: &mut DashboardState, filter: &RecordFilter, now: NaiveDateTime) -> DashboardView {
        let DashboardState { roles, records, municipio_cache, campus_cache, avaliador_cache, .. } = state;

        let mut all: Vec<NormalizedRecord> = Vec::with_capacity(records.len());
        for record in records.iter() {
            let caches = (&mut *municipio_cache, &mut *campus_cache, &mut *avaliador_cache);
            all.push(self.normalize_record(caches, record, now));
        }

        let options = FilterOptions {
            campuses: aggregate::unique_sorted(all.iter().map(|r| r.campus.as_str())),
            municipalities: aggregate::unique_sorted(all.iter().map(|r| r.municipio.as_str())),
            evaluators: aggregate::unique_sorted(
                aggregate::person_group_counts(
                    all.iter().map(|r| (r.avaliador_group.as_str(), r.avaliador_display.as_str())),
                )
                .iter()
                .map(|g| g.label.as_str()),
            ),
        };

        let resolved = self.resolve_filter(filter);
        let mut indices = Vec::new();
        let mut view_records = Vec::new();
        for (i, normalized) in all.into_iter().enumerate() {
            if resolved.matches(&normalized) {
                indices.push(i);
                view_records.push(normalized);
            }
        }

        let mut summary = Summary {
            total: view_records.len(),
            default_deadline_days: self.config.default_deadline_days,
            ..Summary::default()
        };
        let mut skipped = 0;
        for r in &view_records {
            summary.classes.add(r.status_class, r.polarity);
            match &r.sla {
                Some(outcome) => summary.sla.record(outcome, r.status_class),
                None => skipped += 1,
            }
        }
        summary.sla_percentage = summary.sla.percentage();
        summary.default_deadline_percentage = summary.sla.default_deadline_percentage();
        if skipped > 0 {
            debug!("{} registros sem data de início válida ficaram fora do prazo", skipped);
        }

        let municipios = aggregate::group_counts(view_records.iter().map(|r| r.municipio.as_str()));
        let campi = aggregate::group_counts(view_records.iter().map(|r| r.campus.as_str()));
        let avaliadores = aggregate::person_group_counts(
            view_records
                .iter()
                .map(|r| (r.avaliador_group.as_str(), r.avaliador_display.as_str())),
        );
        let statuses = aggregate::group_counts(view_records.iter().map(|r| {
            if r.status.is_empty() {
                StatusClass::Undefined.label()
            } else {
                r.status.as_str()
            }
        }));

        let informed = |counts: &[GroupCount], kind: EntityKind| {
            counts.iter().filter(|g| g.label != kind.not_informed()).count()
        };
        let distinct = DistinctCounts {
            campuses: informed(&campi, EntityKind::Campus),
            municipalities: informed(&municipios, EntityKind::Municipio),
            evaluators: informed(&avaliadores, EntityKind::Avaliador),
        };

        let mut pendencias: Vec<CriticalPending> = indices
            .iter()
            .zip(&view_records)
            .filter_map(|(&i, normalized)| {
                let record = &records[i];
                let p = sla::pending_deadline(record, normalized.status_class, now, &self.config)?;
                Some(CriticalPending {
                    campus: normalized.campus.clone(),
                    municipio: normalized.municipio.clone(),
                    status: normalized.status.clone(),
                    elapsed_days: p.elapsed_days,
                    deadline_days: p.deadline_days,
                    avaliador: normalized.avaliador.clone(),
                    codigo: record.codigo.clone().unwrap_or_default(),
                    remaining_days: p.remaining_days,
                })
            })
            .collect();
        pendencias.sort_by_key(|p| p.remaining_days);

        DashboardView {
            roles: roles.clone(),
            filter: filter.clone(),
            indices,
            records: view_records,
            summary,
            municipios,
            campi,
            avaliadores,
            statuses,
            distinct,
            options,
            pendencias,
        }
    }
}
