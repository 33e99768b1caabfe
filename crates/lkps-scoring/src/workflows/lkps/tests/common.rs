use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::lkps::repository::{RepositoryError, SavedTable, ScoreRepository};
use crate::workflows::lkps::{
    lkps_router, LkpsScoringService, ScoreDetail, ScoringConfig, StaticResolver, TableCode,
    TableRecord,
};

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) tables: Arc<Mutex<BTreeMap<TableCode, SavedTable>>>,
}

impl MemoryRepository {
    pub(super) fn saved(&self, code: &str) -> Option<SavedTable> {
        self.tables
            .lock()
            .expect("lock")
            .get(&TableCode::new(code))
            .cloned()
    }
}

impl ScoreRepository for MemoryRepository {
    fn save(&self, table: SavedTable) -> Result<(), RepositoryError> {
        self.tables
            .lock()
            .expect("lock")
            .insert(table.code.clone(), table);
        Ok(())
    }

    fn fetch(&self, code: &TableCode) -> Result<Option<SavedTable>, RepositoryError> {
        Ok(self.tables.lock().expect("lock").get(code).cloned())
    }

    fn scored_codes(&self) -> Result<Vec<TableCode>, RepositoryError> {
        Ok(self.tables.lock().expect("lock").keys().cloned().collect())
    }
}

pub(super) struct UnavailableRepository;

impl ScoreRepository for UnavailableRepository {
    fn save(&self, _table: SavedTable) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _code: &TableCode) -> Result<Option<SavedTable>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn scored_codes(&self) -> Result<Vec<TableCode>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service() -> (LkpsScoringService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = LkpsScoringService::new(repository.clone(), ScoringConfig::default());
    (service, repository)
}

pub(super) fn router_with_service(service: LkpsScoringService<MemoryRepository>) -> axum::Router {
    lkps_router(Arc::new(service))
}

pub(super) fn code(value: &str) -> TableCode {
    TableCode::new(value)
}

pub(super) fn faculty_detail(ndtps: f64) -> StaticResolver {
    StaticResolver::new().with(
        "3a1",
        ScoreDetail::new().with("NDT", ndtps).with("NDTPS", ndtps),
    )
}

/// Permanent lecturers; the first `matching` have expertise matching the programme.
pub(super) fn faculty_rows(total: usize, matching: usize) -> Vec<TableRecord> {
    (0..total)
        .map(|index| {
            TableRecord::new(format!("dosen-{index}"), index as u32 + 1)
                .with_field("nama_dosen", format!("Dosen {index}").as_str())
                .with_field("nidn", format!("00{index:04}").as_str())
                .with_field("jabatan_akademik", "Lektor")
                .with_field("sesuai_kompetensi", if index < matching { "V" } else { "" })
        })
        .collect()
}

pub(super) fn funding_row(key: &str, source: &str, ts2: f64, ts1: f64, ts: f64) -> TableRecord {
    TableRecord::new(key, 1)
        .with_field("sumber_pembiayaan", source)
        .with_field("ts2", ts2)
        .with_field("ts1", ts1)
        .with_field("ts", ts)
}

pub(super) fn involvement_row(key: &str, title: &str, student: &str) -> TableRecord {
    TableRecord::new(key, 1)
        .with_field("nama_dosen", "Dr. Sari")
        .with_field("nama_mahasiswa", student)
        .with_field("judul_kegiatan", title)
}

pub(super) fn output_row(key: &str, luaran: &str) -> TableRecord {
    TableRecord::new(key, 1).with_field("luaran", luaran)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
