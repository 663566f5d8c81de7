//! Minimal single-page PDF writer. One catalog, one page tree, one page,
//! one Helvetica font and one content stream that lays the given lines out
//! top-to-bottom. Output is a pure function of the input lines: no
//! timestamps, no document ids, so identical lines produce identical bytes.

const PAGE_TOP_Y: i32 = 800;
const LINE_HEIGHT: i32 = 14;
const LEFT_MARGIN: i32 = 40;

/// Escape parentheses and backslashes per the PDF string syntax.
fn escape_text(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}

/// Render ordered text lines into a complete single-page PDF byte stream.
pub fn build_document(lines: &[String]) -> Vec<u8> {
    let mut stream_lines = vec!["BT".to_string(), "/F1 11 Tf".to_string()];
    let mut current_y = PAGE_TOP_Y;

    for line in lines {
        stream_lines.push(format!(
            "1 0 0 1 {} {} Tm ({}) Tj",
            LEFT_MARGIN,
            current_y,
            escape_text(line)
        ));
        current_y -= LINE_HEIGHT;
    }

    stream_lines.push("ET".to_string());
    let stream_content = stream_lines.join("\n");

    let objects = [
        "1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj".to_string(),
        "2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj".to_string(),
        "3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 595 842] \
         /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >> endobj"
            .to_string(),
        "4 0 obj << /Type /Font /Subtype /Type1 /BaseFont /Helvetica >> endobj".to_string(),
        format!(
            "5 0 obj << /Length {} >> stream\n{}\nendstream endobj",
            stream_content.len(),
            stream_content
        ),
    ];

    let mut pdf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());

    for object in &objects {
        offsets.push(pdf.len());
        pdf.push_str(object);
        pdf.push('\n');
    }

    // Cross-reference table: exact byte offset of every object.
    let xref_offset = pdf.len();
    pdf.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
    pdf.push_str("0000000000 65535 f \n");
    for offset in &offsets {
        pdf.push_str(&format!("{:010} 00000 n \n", offset));
    }

    pdf.push_str(&format!(
        "trailer << /Size {} /Root 1 0 R >>\n",
        objects.len() + 1
    ));
    pdf.push_str(&format!("startxref\n{}\n%%EOF\n", xref_offset));

    pdf.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn output_is_deterministic() {
        let input = lines(&["Titulo", "", "Cuerpo del documento"]);
        assert_eq!(build_document(&input), build_document(&input));
    }

    #[test]
    fn escapes_parentheses_and_backslashes() {
        assert_eq!(escape_text(r"a(b)c\d"), r"a\(b\)c\\d");

        let bytes = build_document(&lines(&["Nota (firmada)"]));
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains(r"(Nota \(firmada\)) Tj"));
    }

    #[test]
    fn has_header_trailer_and_valid_xref() {
        let bytes = build_document(&lines(&["Linea unica"]));
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("%PDF-1.4\n"));
        assert!(text.ends_with("%%EOF\n"));
        assert!(text.contains("trailer << /Size 6 /Root 1 0 R >>"));

        // startxref must point at the xref table itself.
        let start = text
            .rsplit_once("startxref\n")
            .and_then(|(_, rest)| rest.split('\n').next())
            .and_then(|value| value.parse::<usize>().ok())
            .unwrap();
        assert_eq!(&text[start..start + 4], "xref");
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let bytes = build_document(&lines(&["a", "b"]));
        let text = String::from_utf8(bytes).unwrap();

        for number in 1..=5 {
            let marker = format!("{} 0 obj", number);
            let expected = text.find(&marker).unwrap();
            let xref_line = text
                .lines()
                .skip_while(|line| *line != "0000000000 65535 f ")
                .nth(number)
                .unwrap();
            let recorded: usize = xref_line.split(' ').next().unwrap().parse().unwrap();
            assert_eq!(recorded, expected, "object {} offset", number);
        }
    }

    #[test]
    fn stream_length_matches_content() {
        let bytes = build_document(&lines(&["contenido"]));
        let text = String::from_utf8(bytes).unwrap();

        let (before, after) = text.split_once(" >> stream\n").unwrap();
        let length: usize = before.rsplit_once("/Length ").unwrap().1.parse().unwrap();
        let stream = after.split_once("\nendstream").unwrap().0;
        assert_eq!(stream.len(), length);
    }
}
