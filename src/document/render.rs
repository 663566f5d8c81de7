//! Annex document composition. Turns participant, course, phase and
//! signature data into the fixed line layout consumed by the PDF writer,
//! and fingerprints the resulting bytes. Rendering is a pure function of
//! its input: identical input always yields identical bytes and hash.

use sha2::{Digest, Sha256};

use crate::store::models::{AnnexType, Role, TEMPLATE_VERSION};

use super::pdf;

#[derive(Debug, Clone)]
pub struct SignatureLine {
    pub role: Role,
    pub name: String,
    /// Already formatted as YYYY-MM-DD.
    pub signed_at: String,
}

#[derive(Debug, Clone)]
pub struct ParticipantBlock {
    pub full_name: String,
    pub id_number: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone)]
pub struct CourseBlock {
    pub name: String,
    pub duration_hours: i64,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone)]
pub struct AnnexDocumentInput {
    pub annex_type: AnnexType,
    pub participant: ParticipantBlock,
    pub course: CourseBlock,
    pub phase_label: String,
    /// Emission date, formatted as YYYY-MM-DD.
    pub generated_at: String,
    pub attendance_summary: Option<String>,
    pub instructor_notes: Option<String>,
    pub signatures: Vec<SignatureLine>,
}

#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub content_hash: String,
}

fn signature_line(signature: &SignatureLine) -> String {
    format!(
        "- {}: {} ({})",
        signature.role.as_str().to_uppercase(),
        signature.name,
        signature.signed_at
    )
}

/// The ordered text lines of an annex document.
pub fn compose_lines(input: &AnnexDocumentInput) -> Vec<String> {
    let mut lines = vec![
        "CAMARA DE COMERCIO DE MENORCA".to_string(),
        format!("Plantilla: {}", TEMPLATE_VERSION),
        format!(
            "Documento: {} ({})",
            input.annex_type.as_str().to_uppercase(),
            input.phase_label
        ),
        format!("Fecha emision: {}", input.generated_at),
        String::new(),
        "DATOS DEL PARTICIPANTE".to_string(),
        format!("Nombre: {}", input.participant.full_name),
        format!("DNI/NIE: {}", input.participant.id_number),
        format!("Email: {}", input.participant.email),
        format!("Telefono: {}", input.participant.phone),
        String::new(),
        "DATOS DEL PROGRAMA".to_string(),
        format!("Programa: {}", input.course.name),
        format!("Duracion: {} horas", input.course.duration_hours),
        format!(
            "Fechas: {} - {}",
            input.course.start_date, input.course.end_date
        ),
        String::new(),
    ];

    match input.annex_type {
        AnnexType::Annex2 => lines.extend([
            "ANEXO 2 - FASE DIAGNOSTICO".to_string(),
            "Objetivo: Registrar situacion inicial y compromiso de participacion.".to_string(),
            "Texto demo: El participante autoriza la gestion academica del itinerario.".to_string(),
            String::new(),
        ]),
        AnnexType::Annex3 => lines.extend([
            "ANEXO 3 - PROGRESO FORMATIVO".to_string(),
            format!(
                "Resumen asistencia: {}",
                input
                    .attendance_summary
                    .as_deref()
                    .unwrap_or("Sin sesiones registradas")
            ),
            format!(
                "Observaciones instructor: {}",
                input.instructor_notes.as_deref().unwrap_or("Sin observaciones")
            ),
            String::new(),
        ]),
        AnnexType::Annex5 => lines.extend([
            "ANEXO 5 - CERTIFICADO DE FINALIZACION".to_string(),
            "La Camara certifica que el participante ha completado satisfactoriamente".to_string(),
            "el programa formativo y ha cumplido con los requisitos de seguimiento.".to_string(),
            String::new(),
        ]),
    }

    lines.push("FIRMAS REGISTRADAS".to_string());

    if input.signatures.is_empty() {
        lines.push("- Pendiente de firma".to_string());
    } else {
        for signature in &input.signatures {
            lines.push(signature_line(signature));
        }
    }

    lines.push(String::new());
    lines.push("Documento generado para demo Madrid 2026.".to_string());

    lines
}

/// Render the annex to PDF bytes and fingerprint them.
pub fn render_annex(input: &AnnexDocumentInput) -> RenderedDocument {
    let bytes = pdf::build_document(&compose_lines(input));
    let content_hash = hex::encode(Sha256::digest(&bytes));

    RenderedDocument {
        bytes,
        content_hash,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input(annex_type: AnnexType) -> AnnexDocumentInput {
        AnnexDocumentInput {
            annex_type,
            participant: ParticipantBlock {
                full_name: "Miguel Sanchez Vega".to_string(),
                id_number: "43256789X".to_string(),
                email: "participant1@camara-menorca.es".to_string(),
                phone: "+34 611 111 111".to_string(),
            },
            course: CourseBlock {
                name: "Programa de Emprendimiento Digital 2025".to_string(),
                duration_hours: 120,
                start_date: "2025-01-15".to_string(),
                end_date: "2025-04-30".to_string(),
            },
            phase_label: "Diagnostico".to_string(),
            generated_at: "2025-02-06".to_string(),
            attendance_summary: None,
            instructor_notes: None,
            signatures: Vec::new(),
        }
    }

    #[test]
    fn identical_input_yields_identical_bytes_and_hash() {
        let input = sample_input(AnnexType::Annex2);
        let first = render_annex(&input);
        let second = render_annex(&input);

        assert_eq!(first.bytes, second.bytes);
        assert_eq!(first.content_hash, second.content_hash);
        assert_eq!(first.content_hash.len(), 64);
    }

    #[test]
    fn unsigned_annex_shows_pending_line() {
        let lines = compose_lines(&sample_input(AnnexType::Annex2));
        let firmas = lines.iter().position(|l| l == "FIRMAS REGISTRADAS").unwrap();
        assert_eq!(lines[firmas + 1], "- Pendiente de firma");
    }

    #[test]
    fn signatures_render_role_name_and_date() {
        let mut input = sample_input(AnnexType::Annex5);
        input.phase_label = "Finalizacion".to_string();
        input.signatures = vec![
            SignatureLine {
                role: Role::Participant,
                name: "Miguel Sanchez Vega".to_string(),
                signed_at: "2025-02-06".to_string(),
            },
            SignatureLine {
                role: Role::Instructor,
                name: "Carlos Martinez Lopez".to_string(),
                signed_at: "2025-02-07".to_string(),
            },
        ];

        let lines = compose_lines(&input);
        assert!(lines.contains(&"- PARTICIPANT: Miguel Sanchez Vega (2025-02-06)".to_string()));
        assert!(lines.contains(&"- INSTRUCTOR: Carlos Martinez Lopez (2025-02-07)".to_string()));
        assert!(!lines.contains(&"- Pendiente de firma".to_string()));
    }

    #[test]
    fn body_section_follows_annex_type() {
        let mut input = sample_input(AnnexType::Annex3);
        input.phase_label = "Formacion".to_string();
        input.attendance_summary = Some("2 sesiones - 8.0 horas".to_string());
        input.instructor_notes = Some("Avance constante en modulo practico.".to_string());

        let lines = compose_lines(&input);
        assert!(lines.contains(&"ANEXO 3 - PROGRESO FORMATIVO".to_string()));
        assert!(lines.contains(&"Resumen asistencia: 2 sesiones - 8.0 horas".to_string()));

        let certificate = compose_lines(&sample_input(AnnexType::Annex5));
        assert!(certificate.contains(&"ANEXO 5 - CERTIFICADO DE FINALIZACION".to_string()));
    }

    #[test]
    fn new_signature_changes_the_fingerprint() {
        let unsigned = sample_input(AnnexType::Annex2);
        let mut signed = sample_input(AnnexType::Annex2);
        signed.signatures.push(SignatureLine {
            role: Role::Participant,
            name: "Miguel Sanchez Vega".to_string(),
            signed_at: "2025-02-06".to_string(),
        });

        assert_ne!(
            render_annex(&unsigned).content_hash,
            render_annex(&signed).content_hash
        );
    }
}
