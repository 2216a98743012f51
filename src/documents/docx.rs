//! @acp:module "Word Table Editing"
//! @acp:summary "Addressable table cells in a docx main document"
//! @acp:domain documents
//! @acp:layer storage
//!
//! Tables are addressed by body-level index, row index and grid column. A
//! cell spanning N grid columns answers for N consecutive indices. Vertical
//! merges are not resolved.

use std::ops::Range;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::checkbox::toggle_glyph;
use super::package::Package;
use super::template::FieldMap;
use super::xml;
use crate::error::Result;

const DOCUMENT_PART: &str = "word/document.xml";

const NARRATIVE_FONT: &str = "游ゴシック";
/// Half-points; 9pt
const NARRATIVE_SIZE: u32 = 18;

/// Text-bearing run children; group 1 is the `w:t` content
static TEXT_TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|<w:tab/>|<w:br(?:\s[^>]*)?/>|<w:cr/>").unwrap()
});

static GRID_SPAN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<w:gridSpan\s+w:val="(\d+)""#).unwrap());

/// @acp:summary "Run formatting for replaced cell text"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunFormat {
    /// No run properties; the paragraph style applies
    #[default]
    Inherit,
    /// 9pt 游ゴシック, used for narrative sections
    Narrative,
}

impl RunFormat {
    fn properties(&self) -> String {
        match self {
            RunFormat::Inherit => String::new(),
            RunFormat::Narrative => format!(
                "<w:rPr><w:rFonts w:ascii=\"{f}\" w:eastAsia=\"{f}\" w:hAnsi=\"{f}\"/><w:sz w:val=\"{s}\"/><w:szCs w:val=\"{s}\"/></w:rPr>",
                f = NARRATIVE_FONT,
                s = NARRATIVE_SIZE
            ),
        }
    }
}

/// @acp:summary "Main document XML with table addressing"
pub struct Document {
    xml: String,
}

impl Document {
    pub fn from_xml(xml: String) -> Self {
        Self { xml }
    }

    pub fn xml(&self) -> &str {
        &self.xml
    }

    pub fn into_xml(self) -> String {
        self.xml
    }

    fn body(&self) -> Option<Range<usize>> {
        let start = xml::find_start(&self.xml, "w:body", 0)?;
        let end = xml::element_end(&self.xml, "w:body", start)?;
        xml::content_range(&self.xml, "w:body", &(start..end))
    }

    fn tables(&self) -> Vec<Range<usize>> {
        self.body()
            .map(|body| xml::elements(&self.xml, "w:tbl", body))
            .unwrap_or_default()
    }

    pub fn table_count(&self) -> usize {
        self.tables().len()
    }

    fn rows(&self, table: usize) -> Vec<Range<usize>> {
        self.tables()
            .get(table)
            .and_then(|t| xml::content_range(&self.xml, "w:tbl", t))
            .map(|content| xml::elements(&self.xml, "w:tr", content))
            .unwrap_or_default()
    }

    pub fn row_count(&self, table: usize) -> usize {
        self.rows(table).len()
    }

    /// Cells of a row, one entry per grid column
    fn cells(&self, table: usize, row: usize) -> Vec<Range<usize>> {
        let Some(content) = self
            .rows(table)
            .get(row)
            .and_then(|r| xml::content_range(&self.xml, "w:tr", r))
        else {
            return Vec::new();
        };

        let mut grid = Vec::new();
        for cell in xml::elements(&self.xml, "w:tc", content) {
            let span = self.grid_span(&cell);
            for _ in 0..span {
                grid.push(cell.clone());
            }
        }
        grid
    }

    pub fn cell_count(&self, table: usize, row: usize) -> usize {
        self.cells(table, row).len()
    }

    fn grid_span(&self, cell: &Range<usize>) -> usize {
        self.cell_properties(cell)
            .and_then(|props| {
                GRID_SPAN_PATTERN
                    .captures(&self.xml[props])
                    .and_then(|c| c[1].parse::<usize>().ok())
            })
            .filter(|span| *span > 0)
            .unwrap_or(1)
    }

    /// `<w:tcPr>` when it is the cell's first child
    fn cell_properties(&self, cell: &Range<usize>) -> Option<Range<usize>> {
        let content = xml::content_range(&self.xml, "w:tc", cell)?;
        let offset = self.xml[content.clone()].len() - self.xml[content.clone()].trim_start().len();
        let start = content.start + offset;
        if xml::find_start(&self.xml, "w:tcPr", start) != Some(start) {
            return None;
        }
        let end = xml::element_end(&self.xml, "w:tcPr", start)?;
        Some(start..end)
    }

    /// Direct paragraphs of a cell, excluding those of nested tables
    fn paragraphs(&self, cell: &Range<usize>) -> Vec<Range<usize>> {
        let Some(content) = xml::content_range(&self.xml, "w:tc", cell) else {
            return Vec::new();
        };
        let nested = xml::elements(&self.xml, "w:tbl", content.clone());
        xml::elements(&self.xml, "w:p", content)
            .into_iter()
            .filter(|p| !nested.iter().any(|t| t.contains(&p.start)))
            .collect()
    }

    /// @acp:summary "Cell text; paragraphs joined by newlines"
    pub fn cell_text(&self, table: usize, row: usize, cell: usize) -> Option<String> {
        let cell = self.cells(table, row).get(cell)?.clone();
        let text = self
            .paragraphs(&cell)
            .iter()
            .map(|p| paragraph_text(&self.xml[p.clone()]))
            .collect::<Vec<_>>()
            .join("\n");
        Some(text)
    }

    /// @acp:summary "Replace cell content with one paragraph; false when the cell is absent"
    pub fn set_cell_text(
        &mut self,
        table: usize,
        row: usize,
        cell: usize,
        text: &str,
        format: RunFormat,
    ) -> bool {
        let Some(cell) = self.cells(table, row).get(cell).cloned() else {
            return false;
        };
        let Some(content) = xml::content_range(&self.xml, "w:tc", &cell) else {
            // <w:tc/> has nothing to keep
            let replacement = format!("<w:tc>{}</w:tc>", paragraph_xml("", text, format));
            self.xml.replace_range(cell, &replacement);
            return true;
        };

        let properties = self
            .cell_properties(&cell)
            .map(|r| self.xml[r].to_string())
            .unwrap_or_default();
        let paragraph_properties = self
            .paragraphs(&cell)
            .first()
            .and_then(|p| self.paragraph_properties(p))
            .unwrap_or_default();

        let replacement = format!(
            "{}{}",
            properties,
            paragraph_xml(&paragraph_properties, text, format)
        );
        self.xml.replace_range(content, &replacement);
        true
    }

    fn paragraph_properties(&self, paragraph: &Range<usize>) -> Option<String> {
        let content = xml::content_range(&self.xml, "w:p", paragraph)?;
        let offset = self.xml[content.clone()].len() - self.xml[content.clone()].trim_start().len();
        let start = content.start + offset;
        if xml::find_start(&self.xml, "w:pPr", start) != Some(start) {
            return None;
        }
        let end = xml::element_end(&self.xml, "w:pPr", start)?;
        Some(self.xml[start..end].to_string())
    }
}

fn paragraph_text(paragraph: &str) -> String {
    let mut text = String::new();
    for token in TEXT_TOKEN_PATTERN.captures_iter(paragraph) {
        match token.get(1) {
            Some(t) => text.push_str(&xml::unescape(t.as_str())),
            None if token[0].starts_with("<w:tab") => text.push('\t'),
            None => text.push('\n'),
        }
    }
    text
}

fn paragraph_xml(properties: &str, text: &str, format: RunFormat) -> String {
    if text.is_empty() {
        return format!("<w:p>{}</w:p>", properties);
    }

    let mut run = String::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            run.push_str("<w:br/>");
        }
        for (j, piece) in line.split('\t').enumerate() {
            if j > 0 {
                run.push_str("<w:tab/>");
            }
            if !piece.is_empty() {
                run.push_str(&format!(
                    "<w:t xml:space=\"preserve\">{}</w:t>",
                    xml::escape(piece)
                ));
            }
        }
    }

    format!(
        "<w:p>{}<w:r>{}{}</w:r></w:p>",
        properties,
        format.properties(),
        run
    )
}

/// @acp:summary "What to put in an addressed cell"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellContent {
    Text(String),
    Narrative(String),
    /// Set each label's box glyph in the cell's existing text
    Glyphs(Vec<(String, bool)>),
}

/// @acp:summary "One addressed table cell edit"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEdit {
    pub table: usize,
    pub row: usize,
    pub cell: usize,
    pub content: CellContent,
}

/// @acp:summary "Ordered table edits for the main document"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentFields {
    pub edits: Vec<TableEdit>,
}

impl DocumentFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, table: usize, row: usize, cell: usize, content: CellContent) -> &mut Self {
        self.edits.push(TableEdit {
            table,
            row,
            cell,
            content,
        });
        self
    }

    pub fn text(&mut self, table: usize, row: usize, cell: usize, text: impl Into<String>) -> &mut Self {
        self.push(table, row, cell, CellContent::Text(text.into()))
    }

    /// Edit addressed to a cell, last write wins
    pub fn get(&self, table: usize, row: usize, cell: usize) -> Option<&CellContent> {
        self.edits
            .iter()
            .rev()
            .find(|e| e.table == table && e.row == row && e.cell == cell)
            .map(|e| &e.content)
    }

    /// Apply every edit to an in-memory document; returns how many landed
    pub fn apply_to(&self, document: &mut Document) -> usize {
        let mut applied = 0;
        for edit in &self.edits {
            let (text, format) = match &edit.content {
                CellContent::Text(text) => (text.clone(), RunFormat::Inherit),
                CellContent::Narrative(text) => (text.clone(), RunFormat::Narrative),
                CellContent::Glyphs(labels) => {
                    let Some(current) = document.cell_text(edit.table, edit.row, edit.cell) else {
                        tracing::debug!("Skipping absent cell {}/{}/{}", edit.table, edit.row, edit.cell);
                        continue;
                    };
                    let toggled = labels
                        .iter()
                        .fold(current, |text, (label, checked)| toggle_glyph(&text, label, *checked));
                    (toggled, RunFormat::Inherit)
                }
            };

            if document.set_cell_text(edit.table, edit.row, edit.cell, &text, format) {
                applied += 1;
            } else {
                tracing::debug!("Skipping absent cell {}/{}/{}", edit.table, edit.row, edit.cell);
            }
        }
        applied
    }
}

impl FieldMap for DocumentFields {
    fn apply(&self, path: &Path) -> Result<()> {
        let mut package = Package::open(path)?;
        let mut document = Document::from_xml(package.part(DOCUMENT_PART)?);
        let applied = self.apply_to(&mut document);
        tracing::debug!(
            "Applied {}/{} table edits across {} tables",
            applied,
            self.edits.len(),
            document.table_count()
        );
        package.set_part(DOCUMENT_PART, document.into_xml());
        package.save()
    }
}
