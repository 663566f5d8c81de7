//! Demo dataset used by the original deployment: two courses, nine users,
//! five participants with staged phase progress, and the instructor
//! assignments the access-scoping rules are exercised against.

use time::macros::{date, datetime};
use time::OffsetDateTime;

use super::models::*;
use super::StoreState;

/// Fixed creation timestamp shared by every seeded record.
pub const SEED_AT: OffsetDateTime = datetime!(2025-02-06 10:00:00 UTC);

const COURSE_ID: &str = "course-programa-emprendimiento-2025";

fn seed_user(id: &str, email: &str, name: &str, role: Role) -> User {
    User {
        id: id.to_string(),
        email: email.to_string(),
        name: name.to_string(),
        role,
        created_at: SEED_AT,
    }
}

fn seed_participant(
    id: &str,
    user_id: &str,
    first_name: &str,
    last_name: &str,
    id_number: &str,
    email: &str,
    phone: &str,
) -> Participant {
    Participant {
        id: id.to_string(),
        user_id: Some(user_id.to_string()),
        course_id: COURSE_ID.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        id_number: id_number.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        created_at: SEED_AT,
        updated_at: SEED_AT,
    }
}

fn seed_assignment(id: &str, instructor_id: &str, participant_id: &str) -> InstructorAssignment {
    InstructorAssignment {
        id: id.to_string(),
        instructor_id: instructor_id.to_string(),
        participant_id: participant_id.to_string(),
        created_at: SEED_AT,
    }
}

fn seed_phase(participant_id: &str, phase_type: PhaseType, status: PhaseStatus) -> Phase {
    Phase {
        id: format!("phase-{}-{}", participant_id, phase_type),
        participant_id: participant_id.to_string(),
        phase_type,
        status,
        started_at: (status != PhaseStatus::NotStarted).then_some(SEED_AT),
        completed_at: (status == PhaseStatus::Completed).then_some(SEED_AT),
        created_at: SEED_AT,
        updated_at: SEED_AT,
    }
}

/// Base records of the demo dataset: everything except annexes, signatures
/// and attendance, which the engine seeds through its own document flow.
pub fn demo_base_state() -> StoreState {
    let mut state = StoreState::default();

    state.courses.push(Course {
        id: COURSE_ID.to_string(),
        name: "Programa de Emprendimiento Digital 2025".to_string(),
        description: "Programa demo para el pitch de Madrid.".to_string(),
        duration_hours: 120,
        start_date: date!(2025 - 01 - 15),
        end_date: date!(2025 - 04 - 30),
    });
    state.courses.push(Course {
        id: "course-talento-45-marketing".to_string(),
        name: "Talento 45+ - Marketing Digital".to_string(),
        description: "Curso de apoyo complementario".to_string(),
        duration_hours: 80,
        start_date: date!(2025 - 02 - 01),
        end_date: date!(2025 - 05 - 15),
    });

    state.users.extend([
        seed_user(
            "user-admin-ana",
            "admin@camara-menorca.es",
            "Ana Garcia Ruiz",
            Role::Administrator,
        ),
        seed_user(
            "user-admin-godmode",
            "godmode@camara-menorca.es",
            "God Mode Admin",
            Role::Administrator,
        ),
        seed_user(
            "user-instructor-carlos",
            "instructor1@camara-menorca.es",
            "Carlos Martinez Lopez",
            Role::Instructor,
        ),
        seed_user(
            "user-instructor-isabel",
            "instructor2@camara-menorca.es",
            "Isabel Fernandez Torres",
            Role::Instructor,
        ),
        seed_user(
            "user-participant-miguel",
            "participant1@camara-menorca.es",
            "Miguel Sanchez Vega",
            Role::Participant,
        ),
        seed_user(
            "user-participant-laura",
            "participant2@camara-menorca.es",
            "Laura Rodriguez Mora",
            Role::Participant,
        ),
        seed_user(
            "user-participant-david",
            "participant3@camara-menorca.es",
            "David Hernandez Cruz",
            Role::Participant,
        ),
        seed_user(
            "user-participant-sofia",
            "participant4@camara-menorca.es",
            "Sofia Lopez Navarro",
            Role::Participant,
        ),
        seed_user(
            "user-participant-javier",
            "participant5@camara-menorca.es",
            "Javier Morales Ruiz",
            Role::Participant,
        ),
    ]);

    state.participants.extend([
        seed_participant(
            "participant-miguel",
            "user-participant-miguel",
            "Miguel",
            "Sanchez Vega",
            "43256789X",
            "participant1@camara-menorca.es",
            "+34 611 111 111",
        ),
        seed_participant(
            "participant-laura",
            "user-participant-laura",
            "Laura",
            "Rodriguez Mora",
            "54123456W",
            "participant2@camara-menorca.es",
            "+34 622 222 222",
        ),
        seed_participant(
            "participant-david",
            "user-participant-david",
            "David",
            "Hernandez Cruz",
            "55111222J",
            "participant3@camara-menorca.es",
            "+34 633 333 333",
        ),
        seed_participant(
            "participant-sofia",
            "user-participant-sofia",
            "Sofia",
            "Lopez Navarro",
            "66777888K",
            "participant4@camara-menorca.es",
            "+34 644 444 444",
        ),
        seed_participant(
            "participant-javier",
            "user-participant-javier",
            "Javier",
            "Morales Ruiz",
            "77888999L",
            "participant5@camara-menorca.es",
            "+34 655 555 555",
        ),
    ]);

    state.assignments.extend([
        seed_assignment("assignment-carlos-miguel", "user-instructor-carlos", "participant-miguel"),
        seed_assignment("assignment-carlos-laura", "user-instructor-carlos", "participant-laura"),
        seed_assignment("assignment-carlos-sofia", "user-instructor-carlos", "participant-sofia"),
        seed_assignment("assignment-isabel-david", "user-instructor-isabel", "participant-david"),
        seed_assignment("assignment-isabel-javier", "user-instructor-isabel", "participant-javier"),
    ]);

    use PhaseStatus::*;
    let phase_plan: [(&str, [PhaseStatus; 3]); 5] = [
        ("participant-miguel", [InProgress, NotStarted, NotStarted]),
        ("participant-laura", [Completed, InProgress, NotStarted]),
        ("participant-david", [NotStarted, NotStarted, NotStarted]),
        ("participant-sofia", [Completed, Completed, Completed]),
        ("participant-javier", [Completed, InProgress, NotStarted]),
    ];

    for (participant_id, statuses) in phase_plan {
        for (phase_type, status) in PHASE_ORDER.into_iter().zip(statuses) {
            state.phases.push(seed_phase(participant_id, phase_type, status));
        }
    }

    state
}

/// Attendance fixtures, appended after the demo annexes have been rendered
/// (matching the original seeding order).
pub fn demo_attendance() -> Vec<AttendanceRecord> {
    vec![
        AttendanceRecord {
            id: "attendance-laura-1".to_string(),
            participant_id: "participant-laura".to_string(),
            instructor_id: "user-instructor-carlos".to_string(),
            session_date: date!(2025 - 01 - 22),
            hours: 4.0,
            notes: Some("Excelente participacion en la sesion de hoy.".to_string()),
            created_at: SEED_AT,
        },
        AttendanceRecord {
            id: "attendance-laura-2".to_string(),
            participant_id: "participant-laura".to_string(),
            instructor_id: "user-instructor-carlos".to_string(),
            session_date: date!(2025 - 01 - 29),
            hours: 4.0,
            notes: Some("Avance constante en modulo practico.".to_string()),
            created_at: SEED_AT,
        },
    ]
}
