//! PDF report adapter.
//!
//! Writes a single A4 page using the base-14 Helvetica fonts, so the output
//! needs no embedded font data. The document carries no creation date and
//! no file identifier: identical inputs produce identical bytes.

use std::fmt::Write as _;

use crate::domain::ClinicalRecord;
use crate::ports::{ReportError, ReportRenderer};

pub const REPORT_FILE_NAME: &str = "Heart_Health_Report.pdf";
pub const PDF_MIME_TYPE: &str = "application/pdf";

pub const REPORT_TITLE: &str = "Heart Disease Health Report";
pub const DISCLAIMER: &str = "Disclaimer: This report is for informational purposes only and is not a medical diagnosis. Please consult a healthcare professional for personalized medical advice.";

// A4 in points.
const PAGE_WIDTH: f64 = 595.0;
const PAGE_HEIGHT: f64 = 842.0;
const MARGIN: f64 = 56.0;
const CONTENT_WIDTH: f64 = PAGE_WIDTH - 2.0 * MARGIN;

const TITLE_SIZE: f64 = 16.0;
const BODY_SIZE: f64 = 12.0;
const DISCLAIMER_SIZE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Font {
    Regular,
    Bold,
    Italic,
}

impl Font {
    const ALL: [Font; 3] = [Font::Regular, Font::Bold, Font::Italic];

    fn resource(self) -> &'static str {
        match self {
            Self::Regular => "F1",
            Self::Bold => "F2",
            Self::Italic => "F3",
        }
    }

    fn base_font(self) -> &'static str {
        match self {
            Self::Regular => "Helvetica",
            Self::Bold => "Helvetica-Bold",
            Self::Italic => "Helvetica-Oblique",
        }
    }

    /// Advance width of a printable ASCII char in 1/1000 em (AFM metrics).
    fn char_width(self, c: char) -> u16 {
        let table = match self {
            Self::Regular | Self::Italic => &HELVETICA_WIDTHS,
            Self::Bold => &HELVETICA_BOLD_WIDTHS,
        };
        let code = c as u32;
        if (32..=126).contains(&code) {
            table[(code - 32) as usize]
        } else {
            table[('?' as u32 - 32) as usize]
        }
    }

    fn text_width(self, text: &str, size: f64) -> f64 {
        let units: u32 = text.chars().map(|c| u32::from(self.char_width(c))).sum();
        f64::from(units) * size / 1000.0
    }
}

// Widths for codes 32..=126 under WinAnsiEncoding.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Replace anything outside printable ASCII with '?'.
fn to_printable_ascii(text: &str) -> String {
    text.chars()
        .map(|c| if (' '..='~').contains(&c) { c } else { '?' })
        .collect()
}

/// Escape a printable-ASCII string for a PDF literal string.
fn escape_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        if matches!(c, '(' | ')' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Greedy word wrap against measured widths.
///
/// Words wider than a full line are split between characters.
fn wrap(text: &str, font: Font, size: f64, max_width: f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if font.text_width(&candidate, size) <= max_width {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        for c in word.chars() {
            current.push(c);
            if font.text_width(&current, size) > max_width && current.chars().count() > 1 {
                current.pop();
                lines.push(std::mem::take(&mut current));
                current.push(c);
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

struct PlacedLine {
    font: Font,
    size: f64,
    x: f64,
    y: f64,
    text: String,
}

/// Top-down line placement on the single page.
struct PageLayout {
    cursor: f64,
    lines: Vec<PlacedLine>,
}

impl PageLayout {
    fn new() -> Self {
        Self {
            cursor: PAGE_HEIGHT - MARGIN,
            lines: Vec::new(),
        }
    }

    fn place(&mut self, font: Font, size: f64, x: f64, text: String) -> Result<(), ReportError> {
        let baseline = self.cursor - size;
        if baseline < MARGIN {
            return Err(ReportError::Layout(
                "content does not fit on a single page".into(),
            ));
        }
        self.lines.push(PlacedLine {
            font,
            size,
            x,
            y: baseline,
            text,
        });
        self.cursor -= size * 1.5;
        Ok(())
    }

    fn centered(&mut self, font: Font, size: f64, text: &str) -> Result<(), ReportError> {
        let text = to_printable_ascii(text);
        let x = MARGIN + ((CONTENT_WIDTH - font.text_width(&text, size)) / 2.0).max(0.0);
        self.place(font, size, x, text)
    }

    fn paragraph(&mut self, font: Font, size: f64, text: &str) -> Result<(), ReportError> {
        let text = to_printable_ascii(text);
        for line in wrap(&text, font, size, CONTENT_WIDTH) {
            self.place(font, size, MARGIN, line)?;
        }
        Ok(())
    }

    fn gap(&mut self, points: f64) {
        self.cursor -= points;
    }

    fn content_stream(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            // Writing to a String cannot fail.
            let _ = writeln!(
                out,
                "BT /{} {:.0} Tf {:.2} {:.2} Td ({}) Tj ET",
                line.font.resource(),
                line.size,
                line.x,
                line.y,
                escape_literal(&line.text)
            );
        }
        out
    }
}

/// Serializes numbered objects and the cross-reference table.
struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn new() -> Self {
        let mut buf = Vec::with_capacity(4096);
        buf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self {
            buf,
            offsets: Vec::new(),
        }
    }

    /// Append the next object; returns its number.
    fn object(&mut self, body: &str) -> usize {
        self.offsets.push(self.buf.len());
        let number = self.offsets.len();
        self.buf
            .extend_from_slice(format!("{number} 0 obj\n{body}\nendobj\n").as_bytes());
        number
    }

    fn stream(&mut self, content: &str) -> usize {
        self.object(&format!(
            "<< /Length {} >>\nstream\n{content}endstream",
            content.len()
        ))
    }

    fn finish(mut self, root: usize, info: usize) -> Vec<u8> {
        let xref_offset = self.buf.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", self.offsets.len() + 1);
        for offset in &self.offsets {
            let _ = write!(xref, "{offset:010} 00000 n \n");
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {} /Root {root} 0 R /Info {info} 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
            self.offsets.len() + 1
        );
        self.buf.extend_from_slice(xref.as_bytes());
        self.buf
    }
}

/// Renders the health report as a one-page PDF.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfReportRenderer;

impl PdfReportRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn layout(
        record: &ClinicalRecord,
        logistic_label: &str,
        svm_label: &str,
        advice: &str,
    ) -> Result<PageLayout, ReportError> {
        let mut page = PageLayout::new();
        page.centered(Font::Bold, TITLE_SIZE, REPORT_TITLE)?;
        page.gap(BODY_SIZE);

        let fields = [
            format!("Age: {}", record.age),
            format!("Sex: {}", record.sex.label()),
            format!("Chest Pain Type: {}", record.chest_pain.label()),
            format!("Max Heart Rate: {}", record.max_heart_rate),
            format!("Heart Oxygen Stress Score: {}", record.oxygen_stress_label()),
            format!("Resting BP: {}", record.resting_bp),
            format!("Cholesterol: {}", record.cholesterol),
            format!(
                "Exercise Induced Angina: {}",
                record.exercise_angina_label()
            ),
        ];
        for field in &fields {
            page.paragraph(Font::Regular, BODY_SIZE, field)?;
        }
        page.gap(BODY_SIZE / 2.0);

        page.paragraph(
            Font::Regular,
            BODY_SIZE,
            &format!("Logistic Regression: {logistic_label}"),
        )?;
        page.paragraph(Font::Regular, BODY_SIZE, &format!("SVM: {svm_label}"))?;
        page.paragraph(
            Font::Regular,
            BODY_SIZE,
            &format!("Doctor Recommendation: {advice}"),
        )?;
        page.gap(BODY_SIZE);

        page.paragraph(Font::Italic, DISCLAIMER_SIZE, DISCLAIMER)?;
        Ok(page)
    }
}

impl ReportRenderer for PdfReportRenderer {
    fn render(
        &self,
        record: &ClinicalRecord,
        logistic_label: &str,
        svm_label: &str,
        advice: &str,
    ) -> Result<Vec<u8>, ReportError> {
        let page = Self::layout(record, logistic_label, svm_label, advice)?;

        // Object numbers are fixed by insertion order.
        let mut pdf = PdfWriter::new();
        let catalog = pdf.object("<< /Type /Catalog /Pages 2 0 R >>");
        pdf.object("<< /Type /Pages /Kids [3 0 R] /Count 1 >>");
        pdf.object(&format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH:.0} {PAGE_HEIGHT:.0}] \
             /Resources << /Font << /F1 5 0 R /F2 6 0 R /F3 7 0 R >> >> /Contents 4 0 R >>"
        ));
        pdf.stream(&page.content_stream());
        for font in Font::ALL {
            pdf.object(&format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                font.base_font()
            ));
        }
        let info = pdf.object(&format!(
            "<< /Title ({}) /Producer (cardioform) >>",
            escape_literal(REPORT_TITLE)
        ));

        let bytes = pdf.finish(catalog, info);
        tracing::debug!(size = bytes.len(), "report rendered");
        Ok(bytes)
    }

    fn file_name(&self) -> &str {
        REPORT_FILE_NAME
    }

    fn mime_type(&self) -> &str {
        PDF_MIME_TYPE
    }
}
