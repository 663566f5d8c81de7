//! End-to-end scenarios over the seeded demo dataset: access scoping,
//! annex issuance, signature acceptance with auto-advance, progression
//! gating and batch export.

use camara_itinerary::engine::export::ExportFilters;
use camara_itinerary::store::models::{
    AnnexStatus, AnnexType, AuthenticatedActor, NewAttendance, NewParticipant, PhaseStatus,
    PhaseType, Role, SignatureInput, UpdateParticipant,
};
use camara_itinerary::{Engine, EngineError};
use time::macros::date;

fn actor(user_id: &str, email: &str, role: Role, name: &str) -> AuthenticatedActor {
    AuthenticatedActor {
        user_id: user_id.to_string(),
        email: email.to_string(),
        role,
        name: name.to_string(),
    }
}

fn admin() -> AuthenticatedActor {
    actor(
        "user-admin-ana",
        "admin@camara-menorca.es",
        Role::Administrator,
        "Ana Garcia Ruiz",
    )
}

fn carlos() -> AuthenticatedActor {
    actor(
        "user-instructor-carlos",
        "instructor1@camara-menorca.es",
        Role::Instructor,
        "Carlos Martinez Lopez",
    )
}

fn isabel() -> AuthenticatedActor {
    actor(
        "user-instructor-isabel",
        "instructor2@camara-menorca.es",
        Role::Instructor,
        "Isabel Fernandez Torres",
    )
}

fn miguel() -> AuthenticatedActor {
    actor(
        "user-participant-miguel",
        "participant1@camara-menorca.es",
        Role::Participant,
        "Miguel Sanchez Vega",
    )
}

fn laura() -> AuthenticatedActor {
    actor(
        "user-participant-laura",
        "participant2@camara-menorca.es",
        Role::Participant,
        "Laura Rodriguez Mora",
    )
}

fn signature_input() -> SignatureInput {
    SignatureInput {
        display_name: None,
        signature_data: None,
    }
}

#[test]
fn listing_is_scoped_by_role() {
    let engine = Engine::with_demo_data();

    let all = engine.list_participants(&admin()).unwrap();
    assert_eq!(all.len(), 5);

    let assigned = engine.list_participants(&carlos()).unwrap();
    let mut ids: Vec<&str> = assigned.iter().map(|view| view.id.as_str()).collect();
    ids.sort();
    assert_eq!(
        ids,
        ["participant-laura", "participant-miguel", "participant-sofia"]
    );

    let own = engine.list_participants(&miguel()).unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].id, "participant-miguel");

    let denied = engine.get_participant(&miguel(), "participant-laura");
    assert!(matches!(denied, Err(EngineError::AccessDenied(_))));
}

#[test]
fn annex_generation_is_an_upsert() {
    let engine = Engine::with_demo_data();
    let instructor = carlos();

    let before = engine
        .list_annexes(&instructor, "participant-miguel")
        .unwrap();
    assert_eq!(before.len(), 1);
    let seeded_id = before[0].id.clone();

    let first = engine
        .generate_annex(&instructor, "participant-miguel", None, false)
        .unwrap();
    let second = engine
        .generate_annex(&instructor, "participant-miguel", Some(AnnexType::Annex2), false)
        .unwrap();

    assert_eq!(first.id, seeded_id);
    assert_eq!(second.id, seeded_id);
    assert_eq!(
        engine
            .list_annexes(&instructor, "participant-miguel")
            .unwrap()
            .len(),
        1
    );
    assert_eq!(second.file_name, "Anexo-2-Miguel-Sanchez-Vega.pdf");
}

#[test]
fn participants_cannot_generate_annexes() {
    let engine = Engine::with_demo_data();
    let result = engine.generate_annex(&miguel(), "participant-miguel", None, false);
    assert!(matches!(result, Err(EngineError::AccessDenied(_))));
}

#[test]
fn generation_outside_active_phase_requires_override() {
    let engine = Engine::with_demo_data();

    let refused = engine.generate_annex(&carlos(), "participant-miguel", Some(AnnexType::Annex3), false);
    assert!(matches!(refused, Err(EngineError::RuleViolation(_))));

    let forced = engine
        .generate_annex(&admin(), "participant-miguel", Some(AnnexType::Annex3), true)
        .unwrap();
    assert_eq!(forced.annex_type, AnnexType::Annex3);

    // Issuing the document started its phase.
    let phases = engine
        .get_participant_phases(&admin(), "participant-miguel")
        .unwrap();
    let training = phases
        .iter()
        .find(|phase| phase.phase_type == PhaseType::Training)
        .unwrap();
    assert_eq!(training.status, PhaseStatus::InProgress);
    assert!(training.started_at.is_some());

    // The derived cursor still points at the first non-completed phase.
    let view = engine.get_participant(&admin(), "participant-miguel").unwrap();
    assert_eq!(view.current_phase, PhaseType::Diagnostic);
}

#[test]
fn progression_requires_a_signed_annex() {
    let engine = Engine::with_demo_data();

    // Miguel's annex 2 exists but is unsigned.
    let refused = engine.progress_phase(&carlos(), "participant-miguel", false);
    assert!(matches!(refused, Err(EngineError::RuleViolation(_))));

    // An administrator override bypasses the gate.
    let forced = engine
        .progress_phase(&admin(), "participant-miguel", true)
        .unwrap();
    assert_eq!(forced.current_phase, PhaseType::Training);
}

#[test]
fn participants_cannot_advance_their_own_phase() {
    let engine = Engine::with_demo_data();
    let result = engine.progress_phase(&miguel(), "participant-miguel", false);
    assert!(matches!(result, Err(EngineError::AccessDenied(_))));
}

#[test]
fn full_signature_set_auto_advances_the_phase() {
    let engine = Engine::with_demo_data();
    let annex_id = engine
        .list_annexes(&carlos(), "participant-miguel")
        .unwrap()[0]
        .id
        .clone();

    // Participant signs first: annex stays generated, phase stays open.
    engine
        .add_signature(&miguel(), &annex_id, signature_input())
        .unwrap();
    let annex = engine.get_annex(&carlos(), &annex_id).unwrap();
    assert_eq!(annex.status, AnnexStatus::Generated);
    assert_eq!(
        engine
            .get_participant(&carlos(), "participant-miguel")
            .unwrap()
            .current_phase,
        PhaseType::Diagnostic
    );

    // Instructor completes the required set: annex signed, diagnostic
    // completed, training started, without any progress call.
    engine
        .add_signature(&carlos(), &annex_id, signature_input())
        .unwrap();
    let annex = engine.get_annex(&carlos(), &annex_id).unwrap();
    assert_eq!(annex.status, AnnexStatus::Signed);

    let view = engine.get_participant(&carlos(), "participant-miguel").unwrap();
    assert_eq!(view.current_phase, PhaseType::Training);

    let phases = engine
        .get_participant_phases(&carlos(), "participant-miguel")
        .unwrap();
    assert_eq!(phases[0].status, PhaseStatus::Completed);
    assert!(phases[0].completed_at.is_some());
    assert_eq!(phases[1].status, PhaseStatus::InProgress);

    // The re-rendered document now lists both signers.
    assert_eq!(engine.list_signatures(&carlos(), &annex_id).unwrap().len(), 2);
}

#[test]
fn signatures_are_immutable_per_role() {
    let engine = Engine::with_demo_data();
    let annex_id = engine
        .list_annexes(&laura(), "participant-laura")
        .unwrap()[0]
        .id
        .clone();

    let before = engine.list_signatures(&laura(), &annex_id).unwrap();
    assert_eq!(before.len(), 2);

    let resign = engine.add_signature(&laura(), &annex_id, signature_input());
    assert!(matches!(resign, Err(EngineError::Conflict(_))));

    let after = engine.list_signatures(&laura(), &annex_id).unwrap();
    assert_eq!(after.len(), 2);
    assert_eq!(before[0].id, after[0].id);
    assert_eq!(before[0].signer_name, after[0].signer_name);
}

#[test]
fn signing_from_a_non_required_role_is_refused() {
    let engine = Engine::with_demo_data();
    // Annex 2 only requires participant and instructor signatures.
    let annex_id = engine
        .list_annexes(&admin(), "participant-miguel")
        .unwrap()[0]
        .id
        .clone();

    let result = engine.add_signature(&admin(), &annex_id, signature_input());
    assert!(matches!(result, Err(EngineError::RuleViolation(_))));
}

#[test]
fn participants_cannot_sign_someone_elses_document() {
    let engine = Engine::with_demo_data();
    let annex_id = engine
        .list_annexes(&laura(), "participant-laura")
        .unwrap()[0]
        .id
        .clone();

    let result = engine.add_signature(&miguel(), &annex_id, signature_input());
    assert!(matches!(result, Err(EngineError::AccessDenied(_))));
}

#[test]
fn nothing_to_progress_once_every_phase_is_completed() {
    let engine = Engine::with_demo_data();
    let result = engine.progress_phase(&admin(), "participant-sofia", false);
    assert!(matches!(result, Err(EngineError::RuleViolation(_))));
}

#[test]
fn downloads_are_stable_and_fingerprinted() {
    let engine = Engine::with_demo_data();
    let annex = engine
        .list_annexes(&laura(), "participant-laura")
        .unwrap()[0]
        .clone();

    let first = engine.download_annex(&laura(), &annex.id).unwrap();
    let second = engine.download_annex(&laura(), &annex.id).unwrap();

    assert_eq!(first.bytes, second.bytes);
    assert_eq!(first.content_hash, annex.content_hash);
    assert_eq!(first.content_hash.len(), 64);
    assert!(first.bytes.starts_with(b"%PDF-1.4\n"));
    assert_eq!(first.file_name, "Anexo-2-Laura-Rodriguez-Mora.pdf");
}

#[test]
fn attendance_is_validated_rounded_and_listed_in_date_order() {
    let engine = Engine::with_demo_data();
    let instructor = carlos();

    let too_long = engine.mark_attendance(
        &instructor,
        "participant-laura",
        NewAttendance {
            session_date: date!(2025 - 02 - 10),
            hours: 13.0,
            notes: None,
        },
    );
    assert!(matches!(too_long, Err(EngineError::Validation(_))));

    let recorded = engine
        .mark_attendance(
            &instructor,
            "participant-laura",
            NewAttendance {
                session_date: date!(2025 - 01 - 08),
                hours: 3.33,
                notes: Some("Sesion de refuerzo.".to_string()),
            },
        )
        .unwrap();
    assert_eq!(recorded.hours, 3.3);
    assert_eq!(recorded.instructor_name, "Carlos Martinez Lopez");

    let listed = engine.list_attendance(&instructor, "participant-laura").unwrap();
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[0].session_date, date!(2025 - 01 - 08));
    assert_eq!(listed[2].session_date, date!(2025 - 01 - 29));

    // Isabel is not assigned to Laura.
    let denied = engine.mark_attendance(
        &isabel(),
        "participant-laura",
        NewAttendance {
            session_date: date!(2025 - 02 - 11),
            hours: 2.0,
            notes: None,
        },
    );
    assert!(matches!(denied, Err(EngineError::AccessDenied(_))));
}

#[test]
fn batch_export_respects_scope_and_filters() {
    let engine = Engine::with_demo_data();

    let everything = engine
        .batch_export(&admin(), ExportFilters::default())
        .unwrap();
    assert_eq!(everything.count, 5);
    assert!(everything.file_name.starts_with("anexos-export-"));
    assert!(everything.file_name.ends_with(".zip"));
    assert!(everything.bytes.starts_with(b"PK\x03\x04"));

    let signed_only = engine
        .batch_export(
            &admin(),
            ExportFilters {
                signed_only: Some(true),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(signed_only.count, 4);

    let own = engine
        .batch_export(&miguel(), ExportFilters::default())
        .unwrap();
    assert_eq!(own.count, 1);

    // Miguel's only annex is unsigned, so the intersection is empty.
    let empty = engine.batch_export(
        &admin(),
        ExportFilters {
            participant_ids: Some(vec!["participant-miguel".to_string()]),
            signed_only: Some(true),
            ..Default::default()
        },
    );
    assert!(matches!(empty, Err(EngineError::NotFound(_))));

    // Isabel's participants have no annexes at all.
    let none = engine.batch_export(&isabel(), ExportFilters::default());
    assert!(matches!(none, Err(EngineError::NotFound(_))));
}

#[test]
fn participant_creation_is_admin_only_and_unique_by_email() {
    let engine = Engine::with_demo_data();

    let new_participant = || NewParticipant {
        first_name: "Elena".to_string(),
        last_name: "Pons Marti".to_string(),
        id_number: "88999000M".to_string(),
        email: "participant6@camara-menorca.es".to_string(),
        phone: "+34 666 666 666".to_string(),
        course_id: "course-programa-emprendimiento-2025".to_string(),
        create_login: None,
    };

    let denied = engine.create_participant(&carlos(), new_participant());
    assert!(matches!(denied, Err(EngineError::AccessDenied(_))));

    let created = engine.create_participant(&admin(), new_participant()).unwrap();
    assert_eq!(created.current_phase, PhaseType::Diagnostic);
    assert_eq!(created.phases.len(), 3);
    assert_eq!(created.phases[0].status, PhaseStatus::InProgress);
    assert_eq!(created.phases[1].status, PhaseStatus::NotStarted);
    assert!(created.user_id.is_some());

    let duplicate = engine.create_participant(&admin(), new_participant());
    assert!(matches!(duplicate, Err(EngineError::Conflict(_))));

    let mut unknown_course = new_participant();
    unknown_course.email = "participant7@camara-menorca.es".to_string();
    unknown_course.course_id = "course-desconocido".to_string();
    let missing = engine.create_participant(&admin(), unknown_course);
    assert!(matches!(missing, Err(EngineError::Store(_))));
}

#[test]
fn participant_updates_are_partial_and_admin_only() {
    let engine = Engine::with_demo_data();

    let denied = engine.update_participant(
        &carlos(),
        "participant-miguel",
        UpdateParticipant {
            phone: Some("+34 600 000 000".to_string()),
            ..Default::default()
        },
    );
    assert!(matches!(denied, Err(EngineError::AccessDenied(_))));

    let updated = engine
        .update_participant(
            &admin(),
            "participant-miguel",
            UpdateParticipant {
                phone: Some("+34 600 000 000".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.phone, "+34 600 000 000");
    assert_eq!(updated.first_name, "Miguel");
}

#[test]
fn dashboards_reflect_the_seeded_state() {
    let engine = Engine::with_demo_data();

    let admin_board = engine.admin_dashboard(&admin()).unwrap();
    assert_eq!(admin_board.totals.participants, 5);
    assert_eq!(admin_board.totals.annexes_generated, 5);
    assert_eq!(admin_board.totals.annexes_signed, 4);
    assert_eq!(admin_board.totals.pending_signatures, 1);
    assert_eq!(admin_board.phases.diagnostic, 2);
    assert_eq!(admin_board.phases.training, 2);
    assert_eq!(admin_board.phases.completion, 1);
    assert_eq!(admin_board.recent_attendance.len(), 2);

    let instructor_board = engine.instructor_dashboard(&carlos()).unwrap();
    assert_eq!(instructor_board.totals.participants, 3);
    assert_eq!(instructor_board.totals.attendance_records, 2);
    assert_eq!(instructor_board.totals.pending_signatures, 1);

    let participant_board = engine.participant_dashboard(&miguel()).unwrap();
    assert_eq!(participant_board.pending_annexes, 1);
    assert_eq!(participant_board.signed_annexes, 0);

    assert!(matches!(
        engine.admin_dashboard(&carlos()),
        Err(EngineError::AccessDenied(_))
    ));
    assert_eq!(engine.list_courses().len(), 2);
}

#[test]
fn audit_trail_records_state_changes_for_administrators() {
    let engine = Engine::with_demo_data();

    engine
        .generate_annex(&carlos(), "participant-miguel", None, false)
        .unwrap();
    engine
        .progress_phase(&admin(), "participant-miguel", true)
        .unwrap();

    let entries = engine.list_audit_log(&admin()).unwrap();
    assert!(entries.iter().any(|entry| entry.action == "annex_generated"));
    assert!(entries.iter().any(|entry| entry.action == "phase_progressed"));

    assert!(matches!(
        engine.list_audit_log(&carlos()),
        Err(EngineError::AccessDenied(_))
    ));
}
