//! Transcript export to PDF
//!
//! Export happens in two steps. [`ReportLayout`] wraps and paginates the
//! transcript into positioned lines without touching any PDF types, and
//! [`render_pdf`] writes those lines with a built-in font.

use crate::config::ExportConfig;
use crate::error::{FeedloopError, Result};
use crate::providers::Turn;
use crate::session::Session;
use printpdf::{BuiltinFont, Mm, PdfDocument};
use std::path::{Path, PathBuf};

/// MIME type of every export artifact
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Page geometry and typography for the report
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSettings {
    /// Page width (mm), A4 by default
    pub width_mm: f32,
    /// Page height (mm)
    pub height_mm: f32,
    /// Margin on every side (mm)
    pub margin_mm: f32,
    /// Vertical distance between baselines (mm)
    pub line_height_mm: f32,
    /// Characters per wrapped line
    pub wrap_columns: usize,
    pub title_size: f32,
    pub body_size: f32,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            width_mm: 210.0,
            height_mm: 297.0,
            margin_mm: 20.0,
            line_height_mm: 6.0,
            wrap_columns: 90,
            title_size: 16.0,
            body_size: 11.0,
        }
    }
}

/// Typeface used for a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Title,
    Heading,
    Body,
}

/// A line of text placed on a page
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub style: LineStyle,
    /// Left edge (mm from the page's left side)
    pub x_mm: f32,
    /// Baseline (mm from the page's bottom side)
    pub y_mm: f32,
}

/// Transcript wrapped and paginated into positioned lines
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    settings: PageSettings,
    pages: Vec<Vec<PlacedLine>>,
}

impl ReportLayout {
    /// Lays out a title followed by every turn, in order
    ///
    /// Each turn gets a heading with its speaker label and its content
    /// wrapped to `settings.wrap_columns`. A new page starts whenever the
    /// next baseline would fall below the bottom margin.
    pub fn build(title: &str, turns: &[Turn], settings: PageSettings) -> Self {
        let mut builder = LayoutBuilder::new(settings);

        builder.push(title, LineStyle::Title);
        builder.skip();

        for turn in turns {
            let heading = if turn.is_error {
                format!("{} (error):", turn.role.label())
            } else {
                format!("{}:", turn.role.label())
            };
            builder.push(&heading, LineStyle::Heading);
            for line in wrap_text(&turn.content, settings.wrap_columns) {
                builder.push(&line, LineStyle::Body);
            }
            builder.skip();
        }

        builder.finish()
    }

    pub fn pages(&self) -> &[Vec<PlacedLine>] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn settings(&self) -> PageSettings {
        self.settings
    }
}

struct LayoutBuilder {
    settings: PageSettings,
    pages: Vec<Vec<PlacedLine>>,
    cursor_y: f32,
}

impl LayoutBuilder {
    fn new(settings: PageSettings) -> Self {
        Self {
            settings,
            pages: vec![Vec::new()],
            cursor_y: settings.height_mm - settings.margin_mm,
        }
    }

    fn ensure_room(&mut self) {
        if self.cursor_y < self.settings.margin_mm {
            self.pages.push(Vec::new());
            self.cursor_y = self.settings.height_mm - self.settings.margin_mm;
        }
    }

    fn push(&mut self, text: &str, style: LineStyle) {
        self.ensure_room();
        let line = PlacedLine {
            text: text.to_string(),
            style,
            x_mm: self.settings.margin_mm,
            y_mm: self.cursor_y,
        };
        if let Some(page) = self.pages.last_mut() {
            page.push(line);
        }
        self.cursor_y -= self.settings.line_height_mm;
    }

    /// Blank line; never opens a page on its own
    fn skip(&mut self) {
        self.cursor_y -= self.settings.line_height_mm;
    }

    fn finish(self) -> ReportLayout {
        ReportLayout {
            settings: self.settings,
            pages: self.pages,
        }
    }
}

/// Word-wraps text to at most `width` characters per line
///
/// Existing line breaks are kept, blank lines included. Words longer than
/// `width` are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let chars: Vec<char> = word.chars().collect();
            for chunk in chars.chunks(width) {
                let piece: String = chunk.iter().collect();
                let needed = if current_len == 0 {
                    chunk.len()
                } else {
                    current_len + 1 + chunk.len()
                };
                if needed > width {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                if current_len > 0 {
                    current.push(' ');
                    current_len += 1;
                }
                current.push_str(&piece);
                current_len += chunk.len();
            }
        }
        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Replaces characters the built-in PDF fonts cannot encode
fn pdf_safe(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            c if (c as u32) < 0x20 => ' ',
            c if (c as u32) <= 0xFF => c,
            _ => '?',
        })
        .collect()
}

/// Writes a layout to PDF bytes
///
/// # Errors
///
/// Returns `Export` if a font cannot be loaded or the document cannot be saved
pub fn render_pdf(title: &str, layout: &ReportLayout) -> Result<Vec<u8>> {
    let settings = layout.settings();
    let width = Mm(settings.width_mm);
    let height = Mm(settings.height_mm);

    let (doc, first_page, first_layer) = PdfDocument::new(title, width, height, "Layer 1");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| FeedloopError::Export(format!("Failed to load font: {}", e)))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| FeedloopError::Export(format!("Failed to load font: {}", e)))?;

    for (index, lines) in layout.pages().iter().enumerate() {
        let (page, layer) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(width, height, "Layer 1")
        };
        let canvas = doc.get_page(page).get_layer(layer);

        for line in lines {
            let (font, size) = match line.style {
                LineStyle::Title => (&bold, settings.title_size),
                LineStyle::Heading => (&bold, settings.body_size),
                LineStyle::Body => (&regular, settings.body_size),
            };
            canvas.use_text(pdf_safe(&line.text), size, Mm(line.x_mm), Mm(line.y_mm), font);
        }
    }

    doc.save_to_bytes()
        .map_err(|e| FeedloopError::Export(format!("Failed to write PDF: {}", e)).into())
}

/// Rendered report ready to be saved or offered for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Writes the bytes to `target`
    ///
    /// A directory target receives the artifact under its own file name.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written
    pub fn write_to(&self, target: impl AsRef<Path>) -> Result<PathBuf> {
        let target = target.as_ref();
        let path = if target.is_dir() {
            target.join(&self.file_name)
        } else {
            target.to_path_buf()
        };
        std::fs::write(&path, &self.bytes).map_err(FeedloopError::Io)?;
        tracing::info!("Wrote {} bytes to {}", self.bytes.len(), path.display());
        Ok(path)
    }
}

/// Renders the session transcript once export is unlocked
///
/// # Errors
///
/// Returns `ExportNotReady` while fewer than the threshold of follow-up
/// exchanges have completed, or `Export` if rendering fails
///
/// # Examples
///
/// ```
/// use feedloop::config::ExportConfig;
/// use feedloop::export::export_session;
/// use feedloop::session::Session;
///
/// let session = Session::new(3, None);
/// assert!(export_session(&session, &ExportConfig::default()).is_err());
/// ```
pub fn export_session(session: &Session, config: &ExportConfig) -> Result<ExportArtifact> {
    if !session.export_ready() {
        return Err(FeedloopError::ExportNotReady {
            interactions: session.interactions(),
            threshold: session.export_threshold(),
        }
        .into());
    }

    let layout = ReportLayout::build(&config.title, &session.snapshot(), PageSettings::default());
    let bytes = render_pdf(&config.title, &layout)?;
    tracing::info!(
        "Exported session {} ({} turns, {} pages)",
        session.id(),
        session.len(),
        layout.page_count()
    );

    Ok(ExportArtifact {
        file_name: config.file_name.clone(),
        content_type: PDF_CONTENT_TYPE,
        bytes,
    })
}
