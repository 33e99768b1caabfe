use std::io::Cursor;
use std::sync::Arc;

use super::common::*;
use crate::workflows::lkps::{
    FieldValue, LkpsScoringService, ScoringConfig, ScoringServiceError, StoreError, TableRecord,
};

#[test]
fn save_scores_persists_and_publishes_detail() {
    let (service, repository) = build_service();

    let report = service
        .save_records(&code("3a1"), faculty_rows(12, 10))
        .expect("save succeeds");

    assert_eq!(report.rows, 12);
    assert!(report.validation.is_empty());
    let outcome = report.outcome.expect("registered table is scored");
    assert_eq!(outcome.score_detail.get("NDTPS"), Some(10.0));

    let saved = repository.saved("3a1").expect("table persisted");
    assert_eq!(saved.rows.len(), 12);
    assert!(saved.rows.iter().all(|row| row.saved_at == Some(saved.saved_at)));
    let detail = service
        .score_detail(&code("3a1"))
        .expect("lookup succeeds")
        .expect("detail present");
    assert_eq!(detail.get("NDT"), Some(12.0));
}

#[test]
fn save_renumbers_rows_and_reports_validation_without_blocking() {
    let (service, repository) = build_service();
    let rows = vec![
        funding_row("a", "Mandiri", 1.0, 0.0, 0.0),
        TableRecord::new("b", 9).with_field("ts", 2.0),
    ];

    let report = service
        .save_records(&code("3b2"), rows)
        .expect("save succeeds");

    assert_eq!(report.validation.len(), 1);
    assert_eq!(report.validation[0].row_key, "b");
    assert_eq!(report.validation[0].sequence, 2);
    let saved = repository.saved("3b2").expect("persisted");
    let sequences: Vec<u32> = saved.rows.iter().map(|row| row.sequence).collect();
    assert_eq!(sequences, vec![1, 2]);
}

#[test]
fn dependent_tables_see_the_latest_save() {
    let (service, _) = build_service();

    let first = service
        .save_records(&code("3b2"), vec![funding_row("r1", "Mandiri", 2.0, 2.0, 2.0)])
        .expect("save succeeds");
    assert_eq!(first.outcome.expect("scored").score_for(23), Some(0.0));
    assert_eq!(first.warnings.len(), 1);

    service
        .save_records(&code("3a1"), faculty_rows(10, 10))
        .expect("roster saved");
    let second = service
        .save_records(&code("3b2"), vec![funding_row("r1", "Mandiri", 2.0, 2.0, 2.0)])
        .expect("save succeeds");

    // RL = 6 / (3 × 10) = 0.2, C = 0.2, score = 4 × 0.1
    let outcome = second.outcome.expect("scored");
    assert_eq!(outcome.score_detail.get("NDTPS"), Some(10.0));
    assert_eq!(outcome.score_for(23), Some(0.4));
    assert!(second.warnings.is_empty());
}

#[test]
fn community_service_chain_flows_into_table_seven() {
    let (service, _) = build_service();
    service
        .save_records(&code("3a1"), faculty_rows(4, 4))
        .expect("roster saved");
    service
        .save_records(
            &code("3b3"),
            vec![funding_row("p1", "Perguruan Tinggi", 1.0, 1.0, 2.0)],
        )
        .expect("pkm saved");

    let report = service
        .save_records(&code("7"), vec![involvement_row("m1", "Bank sampah", "Andi")])
        .expect("involvement saved");

    let outcome = report.outcome.expect("scored");
    assert_eq!(outcome.score_detail.get("NPkMD"), Some(4.0));
    assert_eq!(outcome.score_detail.get("PPkMDM"), Some(0.25));
    assert_eq!(outcome.score_for(45), Some(4.0));
}

#[test]
fn unregistered_tables_are_stored_raw_with_warning() {
    let (service, repository) = build_service();
    let rows = vec![TableRecord::new("x", 1).with_field("col_1", "bebas")];

    let report = service
        .save_records(&code("3b8-1"), rows)
        .expect("save succeeds");

    assert!(report.outcome.is_none());
    assert_eq!(report.warnings.len(), 1);
    let saved = repository.saved("3b8-1").expect("stored");
    assert!(saved.outcome.is_none());
    assert!(service
        .score_detail(&code("3b8-1"))
        .expect("lookup succeeds")
        .is_none());
}

#[test]
fn import_fills_candidates_and_save_promotes_selected_rows() {
    let (service, _) = build_service();
    let csv = "\
No,Nama Dosen,Tema,Nama Mahasiswa,Judul Kegiatan,Tahun
1,Dr. Sari,Energi,Andi,Panel surya,2023
2,Dr. Sari,Energi,Rina,Turbin mikro,2024
";

    let summary = service
        .import(&code("6a"), Cursor::new(csv))
        .expect("import succeeds");
    assert!(summary.into_candidates);
    assert_eq!(summary.imported, 2);
    assert!(service.load(&code("6a")).expect("load").is_empty());

    let selected = service
        .toggle_selection(&code("6a"), "6a-2")
        .expect("candidate exists");
    assert!(selected);

    let report = service.save(&code("6a")).expect("save succeeds");
    assert_eq!(report.rows, 1);
    assert_eq!(service.candidates(&code("6a")).len(), 1);
    let rows = service.load(&code("6a")).expect("load");
    assert_eq!(rows[0].text("judul_kegiatan"), "Turbin mikro");
}

#[test]
fn field_edits_apply_to_workspace_rows() {
    let (service, _) = build_service();
    service.replace_rows(&code("3b5"), vec![TableRecord::new("c1", 1)]);

    service
        .update_field(&code("3b5"), "c1", "jumlah_sitasi", FieldValue::Number(7.0))
        .expect("row exists");
    let missing = service.update_field(&code("3b5"), "c9", "jumlah_sitasi", FieldValue::Number(1.0));

    assert_eq!(service.load(&code("3b5")).expect("load")[0].number("jumlah_sitasi"), 7.0);
    assert!(matches!(
        missing,
        Err(ScoringServiceError::Store(StoreError::RowNotFound { .. }))
    ));
}

#[test]
fn load_restores_rows_from_last_save() {
    let repository = Arc::new(MemoryRepository::default());
    let first = LkpsScoringService::new(repository.clone(), ScoringConfig::default());
    first
        .save_records(&code("3a1"), faculty_rows(3, 3))
        .expect("save succeeds");

    let restarted = LkpsScoringService::new(repository, ScoringConfig::default());

    assert_eq!(restarted.load(&code("3a1")).expect("load").len(), 3);
}

#[test]
fn repository_failures_propagate() {
    let service = LkpsScoringService::new(Arc::new(UnavailableRepository), ScoringConfig::default());

    let result = service.save_records(&code("3a1"), faculty_rows(3, 3));

    assert!(matches!(result, Err(ScoringServiceError::Repository(_))));
}

#[test]
fn preview_scores_without_persisting() {
    let (service, repository) = build_service();

    let outcome = service
        .preview(&code("3a3"), Vec::new())
        .expect("registered table");

    assert_eq!(outcome.score_for(20), Some(0.0));
    assert!(repository.saved("3a3").is_none());
    assert!(service.preview(&code("zz"), Vec::new()).is_none());
}

#[test]
fn second_import_adds_candidates_without_touching_saved_rows() {
    let (service, _) = build_service();
    let first = "No,Nama Dosen,Tema,Nama Mahasiswa,Judul Kegiatan,Tahun\n1,Dr. Sari,Energi,Andi,Panel surya,2023\n";
    let second = "No,Nama Dosen,Tema,Nama Mahasiswa,Judul Kegiatan,Tahun\n1,Budi,Robotika,Tono,Lengan robot,2024\n";

    service
        .import(&code("6a"), Cursor::new(first))
        .expect("first import");
    service
        .toggle_selection(&code("6a"), "6a-1")
        .expect("candidate exists");
    service.save(&code("6a")).expect("first save");

    service
        .import(&code("6a"), Cursor::new(second))
        .expect("second import");
    let candidates = service.candidates(&code("6a"));
    assert_eq!(candidates.len(), 1);
    assert_ne!(candidates[0].key, "6a-1");
    let selected = service
        .toggle_selection(&code("6a"), &candidates[0].key)
        .expect("candidate exists");
    assert!(selected);

    let report = service.save(&code("6a")).expect("second save");

    assert_eq!(report.rows, 2);
    assert!(service.candidates(&code("6a")).is_empty());
    let rows = service.load(&code("6a")).expect("load");
    assert!(rows.iter().all(|row| row.selected));
    assert_eq!(
        report.outcome.expect("scored").score_detail.get("NPM"),
        Some(2.0)
    );
}

#[test]
fn import_after_restart_keeps_previously_saved_rows() {
    let repository = Arc::new(MemoryRepository::default());
    let first = LkpsScoringService::new(repository.clone(), ScoringConfig::default());
    first
        .save_records(&code("6a"), vec![involvement_row("6a-1", "Panel surya", "Andi")])
        .expect("first save");

    let restarted = LkpsScoringService::new(repository, ScoringConfig::default());
    restarted
        .import(
            &code("6a"),
            Cursor::new("No,Nama Dosen,Tema,Nama Mahasiswa,Judul Kegiatan,Tahun\n1,Budi,Robotika,Tono,Lengan robot,2024\n"),
        )
        .expect("import succeeds");
    let key = restarted.candidates(&code("6a"))[0].key.clone();
    assert_ne!(key, "6a-1");
    restarted
        .toggle_selection(&code("6a"), &key)
        .expect("candidate exists");

    let report = restarted.save(&code("6a")).expect("save succeeds");

    assert_eq!(report.rows, 2);
}

#[test]
fn discard_drops_unsaved_work_but_keeps_persisted_scores() {
    let (service, _) = build_service();
    service
        .save_records(&code("3a1"), faculty_rows(3, 3))
        .expect("save succeeds");
    service.replace_rows(&code("3a1"), faculty_rows(5, 5));

    service.discard(&code("3a1"));

    assert_eq!(service.load(&code("3a1")).expect("load").len(), 3);
    assert!(service
        .score_detail(&code("3a1"))
        .expect("lookup succeeds")
        .is_some());
}

#[test]
fn scored_tables_lists_every_persisted_code() {
    let (service, _) = build_service();
    service
        .save_records(&code("3a1"), faculty_rows(3, 3))
        .expect("save succeeds");
    service
        .save_records(&code("3b2"), vec![funding_row("r1", "Mandiri", 1.0, 0.0, 0.0)])
        .expect("save succeeds");

    let codes = service.scored_tables().expect("listing succeeds");

    assert_eq!(codes, vec![code("3a1"), code("3b2")]);
}
