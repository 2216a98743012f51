//! @acp:module "Spreadsheet Editing"
//! @acp:summary "Cell-level reads and writes on xlsx worksheets"
//! @acp:domain documents
//! @acp:layer storage
//!
//! Values are written as inline strings or numbers. The cell keeps its style
//! index so the template's borders and fonts survive. Rows and cells missing
//! from the sheet are inserted in sorted position.

use std::fmt;
use std::ops::Range;
use std::path::Path;
use std::str::FromStr;

use super::checkbox::{CHECKED, UNCHECKED};
use super::package::Package;
use super::template::FieldMap;
use super::xml;
use crate::error::{Result, SubsidyError};

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const CALC_CHAIN_PART: &str = "xl/calcChain.xml";
const DEFAULT_SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

/// @acp:summary "A1-style cell coordinate"
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellRef {
    /// 1-based column
    pub col: u32,
    /// 1-based row
    pub row: u32,
}

impl CellRef {
    pub fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

impl FromStr for CellRef {
    type Err = SubsidyError;

    fn from_str(s: &str) -> Result<Self> {
        let split = s.find(|c: char| c.is_ascii_digit()).unwrap_or(s.len());
        let (letters, digits) = s.split_at(split);
        let col = column_index(letters);
        let row = digits.parse::<u32>().ok().filter(|r| *r > 0);
        match (col, row) {
            (Some(col), Some(row)) => Ok(Self { col, row }),
            _ => Err(SubsidyError::InvalidCell(s.to_string())),
        }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letters(self.col), self.row)
    }
}

/// `A` → 1, `AB` → 28
pub fn column_index(letters: &str) -> Option<u32> {
    if letters.is_empty() || letters.len() > 3 {
        return None;
    }
    letters.chars().try_fold(0u32, |acc, c| {
        let c = c.to_ascii_uppercase();
        c.is_ascii_uppercase().then(|| acc * 26 + (c as u32 - 'A' as u32 + 1))
    })
}

/// 1 → `A`, 28 → `AB`
pub fn column_letters(mut index: u32) -> String {
    let mut letters = Vec::new();
    while index > 0 {
        let rem = (index - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        index = (index - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// @acp:summary "A value to store in a cell"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Text(String),
    Number(i64),
}

/// @acp:summary "One worksheet's XML plus the workbook's shared strings"
pub struct Worksheet {
    name: String,
    part: String,
    xml: String,
    shared: Vec<String>,
}

impl Worksheet {
    /// Parse a worksheet part directly; the workbook normally does this
    pub fn from_xml(name: &str, xml: String, shared: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            part: String::new(),
            xml,
            shared,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn xml(&self) -> &str {
        &self.xml
    }

    /// @acp:summary "Displayed text of a cell, `None` when empty or absent"
    pub fn value(&self, cell: &str) -> Result<Option<String>> {
        let target: CellRef = cell.parse()?;
        let Some(range) = self.find_cell(target) else {
            return Ok(None);
        };

        let tag_end = xml::tag_end(&self.xml, range.start).unwrap_or(range.end);
        let tag = &self.xml[range.start..tag_end];
        let Some(content) = xml::content_range(&self.xml, "c", &range) else {
            return Ok(None);
        };

        let value = match xml::attr(tag, "t").as_deref() {
            Some("inlineStr") => xml::elements(&self.xml, "is", content)
                .first()
                .map(|is| rich_text(&self.xml, is.clone())),
            Some("s") => element_text(&self.xml, "v", content)
                .and_then(|v| v.trim().parse::<usize>().ok())
                .and_then(|i| self.shared.get(i).cloned()),
            _ => element_text(&self.xml, "v", content),
        };
        Ok(value)
    }

    pub fn set(&mut self, cell: &str, value: CellValue) -> Result<()> {
        let target: CellRef = cell.parse()?;
        tracing::debug!("{}!{} <- {:?}", self.name, target, value);
        self.write_cell(target, &value)
    }

    pub fn set_text(&mut self, cell: &str, text: impl Into<String>) -> Result<()> {
        self.set(cell, CellValue::Text(text.into()))
    }

    pub fn set_number(&mut self, cell: &str, number: i64) -> Result<()> {
        self.set(cell, CellValue::Number(number))
    }

    /// Flip `□` to `☑`; any other current value is left alone
    pub fn check_if_blank(&mut self, cell: &str) -> Result<bool> {
        if self.value(cell)?.as_deref() == Some(UNCHECKED) {
            self.set_text(cell, CHECKED)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Checked and total checkbox counts over `rows` of `column`
    pub fn tally(&self, column: &str, rows: std::ops::RangeInclusive<u32>) -> Result<(usize, usize)> {
        let mut checked = 0;
        let mut total = 0;
        for row in rows {
            match self.value(&format!("{}{}", column, row))?.as_deref() {
                Some(CHECKED) => {
                    checked += 1;
                    total += 1;
                }
                Some(UNCHECKED) => total += 1,
                _ => {}
            }
        }
        Ok((checked, total))
    }

    fn sheet_data(&mut self) -> Result<Range<usize>> {
        let start = xml::find_start(&self.xml, "sheetData", 0)
            .ok_or_else(|| SubsidyError::Other(format!("worksheet {} has no sheetData", self.name)))?;
        if xml::is_self_closing(&self.xml, start) {
            let end = xml::tag_end(&self.xml, start).unwrap_or(self.xml.len());
            self.xml.replace_range(start..end, "<sheetData></sheetData>");
        }
        let end = xml::element_end(&self.xml, "sheetData", start)
            .ok_or_else(|| SubsidyError::Other(format!("worksheet {} has unbalanced sheetData", self.name)))?;
        Ok(xml::content_range(&self.xml, "sheetData", &(start..end)).unwrap_or(end..end))
    }

    fn find_cell(&self, target: CellRef) -> Option<Range<usize>> {
        let start = xml::find_start(&self.xml, "sheetData", 0)?;
        let end = xml::element_end(&self.xml, "sheetData", start)?;
        let data = xml::content_range(&self.xml, "sheetData", &(start..end))?;
        let row = xml::elements(&self.xml, "row", data)
            .into_iter()
            .find(|r| row_number(&self.xml, r) == Some(target.row))?;
        let content = xml::content_range(&self.xml, "row", &row)?;
        xml::elements(&self.xml, "c", content)
            .into_iter()
            .find(|c| cell_ref(&self.xml, c) == Some(target))
    }

    fn write_cell(&mut self, target: CellRef, value: &CellValue) -> Result<()> {
        let data = self.sheet_data()?;
        let mut insert_at = data.end;

        for row in xml::elements(&self.xml, "row", data) {
            match row_number(&self.xml, &row) {
                Some(n) if n == target.row => return self.write_in_row(row, target, value),
                Some(n) if n > target.row => {
                    insert_at = row.start;
                    break;
                }
                _ => {}
            }
        }

        let row_xml = format!("<row r=\"{}\">{}</row>", target.row, cell_xml(target, None, value));
        self.xml.insert_str(insert_at, &row_xml);
        Ok(())
    }

    fn write_in_row(&mut self, row: Range<usize>, target: CellRef, value: &CellValue) -> Result<()> {
        if xml::is_self_closing(&self.xml, row.start) {
            let open = self.xml[row.start..row.end - 2].trim_end().to_string();
            let expanded = format!("{}>{}</row>", open, cell_xml(target, None, value));
            self.xml.replace_range(row, &expanded);
            return Ok(());
        }

        let content = xml::content_range(&self.xml, "row", &row).unwrap_or(row.end..row.end);
        let mut insert_at = content.end;
        for cell in xml::elements(&self.xml, "c", content) {
            match cell_ref(&self.xml, &cell) {
                Some(r) if r == target => {
                    let tag_end = xml::tag_end(&self.xml, cell.start).unwrap_or(cell.end);
                    let style = xml::attr(&self.xml[cell.start..tag_end], "s");
                    let replacement = cell_xml(target, style.as_deref(), value);
                    self.xml.replace_range(cell, &replacement);
                    return Ok(());
                }
                Some(r) if r.col > target.col => {
                    insert_at = cell.start;
                    break;
                }
                _ => {}
            }
        }

        self.xml.insert_str(insert_at, &cell_xml(target, None, value));
        Ok(())
    }
}

fn row_number(xml_text: &str, row: &Range<usize>) -> Option<u32> {
    let end = xml::tag_end(xml_text, row.start)?;
    xml::attr(&xml_text[row.start..end], "r")?.parse().ok()
}

fn cell_ref(xml_text: &str, cell: &Range<usize>) -> Option<CellRef> {
    let end = xml::tag_end(xml_text, cell.start)?;
    xml::attr(&xml_text[cell.start..end], "r")?.parse().ok()
}

fn cell_xml(target: CellRef, style: Option<&str>, value: &CellValue) -> String {
    let style = style
        .map(|s| format!(" s=\"{}\"", xml::escape(s)))
        .unwrap_or_default();
    match value {
        CellValue::Text(text) if text.is_empty() => format!("<c r=\"{}\"{}/>", target, style),
        CellValue::Text(text) => format!(
            "<c r=\"{}\"{} t=\"inlineStr\"><is><t xml:space=\"preserve\">{}</t></is></c>",
            target,
            style,
            xml::escape(text)
        ),
        CellValue::Number(n) => format!("<c r=\"{}\"{}><v>{}</v></c>", target, style, n),
    }
}

/// Unescaped content of the first `name` element inside `range`
fn element_text(xml_text: &str, name: &str, range: Range<usize>) -> Option<String> {
    let element = xml::elements(xml_text, name, range).into_iter().next()?;
    let content = xml::content_range(xml_text, name, &element)?;
    Some(xml::unescape(&xml_text[content]))
}

/// Concatenated `<t>` runs of a string item, skipping phonetic `<rPh>` runs
fn rich_text(xml_text: &str, range: Range<usize>) -> String {
    let phonetic = xml::elements(xml_text, "rPh", range.clone());
    let mut text = String::new();
    let mut pos = range.start;
    while let Some(start) = xml::find_start(xml_text, "t", pos) {
        if start >= range.end {
            break;
        }
        let Some(end) = xml::element_end(xml_text, "t", start) else {
            break;
        };
        if !phonetic.iter().any(|p| p.contains(&start)) {
            if let Some(content) = xml::content_range(xml_text, "t", &(start..end)) {
                text.push_str(&xml::unescape(&xml_text[content]));
            }
        }
        pos = end;
    }
    text
}

/// Shared string table, one entry per `<si>`
pub fn parse_shared_strings(xml_text: &str) -> Vec<String> {
    xml::elements(xml_text, "si", 0..xml_text.len())
        .into_iter()
        .map(|si| rich_text(xml_text, si))
        .collect()
}

/// @acp:summary "Workbook package with its sheet directory resolved"
pub struct Workbook {
    package: Package,
    sheets: Vec<(String, String)>,
    shared: Vec<String>,
    modified: bool,
}

impl Workbook {
    /// @acp:summary "Open an xlsx package and resolve sheet names to parts"
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let package = Package::open(path)?;
        let workbook = package.part(WORKBOOK_PART)?;
        let rels = package.part(WORKBOOK_RELS_PART)?;
        let relationships = parse_relationships(&rels);

        let mut sheets = Vec::new();
        for sheet in xml::elements(&workbook, "sheet", 0..workbook.len()) {
            let end = xml::tag_end(&workbook, sheet.start).unwrap_or(sheet.end);
            let tag = &workbook[sheet.start..end];
            let (Some(name), Some(id)) = (xml::attr(tag, "name"), xml::attr(tag, "r:id")) else {
                continue;
            };
            if let Some((_, _, target)) = relationships.iter().find(|(rid, _, _)| *rid == id) {
                sheets.push((name, resolve_target(target)));
            }
        }

        let shared_part = relationships
            .iter()
            .find(|(_, kind, _)| kind.ends_with("/sharedStrings"))
            .map(|(_, _, target)| resolve_target(target))
            .unwrap_or_else(|| DEFAULT_SHARED_STRINGS_PART.to_string());
        let shared = if package.has_part(&shared_part) {
            parse_shared_strings(&package.part(&shared_part)?)
        } else {
            Vec::new()
        };

        Ok(Self {
            package,
            sheets,
            shared,
            modified: false,
        })
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn worksheet(&self, name: &str) -> Result<Worksheet> {
        let (_, part) = self
            .sheets
            .iter()
            .find(|(n, _)| n == name)
            .ok_or_else(|| SubsidyError::MissingSheet(name.to_string()))?;
        Ok(Worksheet {
            name: name.to_string(),
            part: part.clone(),
            xml: self.package.part(part)?,
            shared: self.shared.clone(),
        })
    }

    /// Put an edited worksheet back into the package
    pub fn store(&mut self, sheet: Worksheet) {
        self.package.set_part(&sheet.part, sheet.xml);
        self.modified = true;
    }

    /// @acp:summary "Write the package back, dropping the stale calculation chain"
    pub fn save(mut self) -> Result<()> {
        if self.modified {
            self.drop_calc_chain()?;
        }
        self.package.save()
    }

    fn drop_calc_chain(&mut self) -> Result<()> {
        if !self.package.remove_part(CALC_CHAIN_PART) {
            return Ok(());
        }
        tracing::debug!("Dropping {} from {}", CALC_CHAIN_PART, self.package.path().display());

        if self.package.has_part(CONTENT_TYPES_PART) {
            let types = self.package.part(CONTENT_TYPES_PART)?;
            let pruned = remove_elements(&types, "Override", |tag| {
                xml::attr(tag, "PartName").as_deref() == Some("/xl/calcChain.xml")
            });
            self.package.set_part(CONTENT_TYPES_PART, pruned);
        }

        let rels = self.package.part(WORKBOOK_RELS_PART)?;
        let pruned = remove_elements(&rels, "Relationship", |tag| {
            xml::attr(tag, "Type")
                .map(|t| t.ends_with("/calcChain"))
                .unwrap_or(false)
        });
        self.package.set_part(WORKBOOK_RELS_PART, pruned);
        Ok(())
    }
}

/// `(Id, Type, Target)` for every relationship
fn parse_relationships(rels: &str) -> Vec<(String, String, String)> {
    xml::elements(rels, "Relationship", 0..rels.len())
        .into_iter()
        .filter_map(|r| {
            let end = xml::tag_end(rels, r.start)?;
            let tag = &rels[r.start..end];
            Some((
                xml::attr(tag, "Id")?,
                xml::attr(tag, "Type").unwrap_or_default(),
                xml::attr(tag, "Target")?,
            ))
        })
        .collect()
}

/// Relationship targets are relative to `xl/` unless absolute
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

fn remove_elements(xml_text: &str, name: &str, matches: impl Fn(&str) -> bool) -> String {
    let mut out = xml_text.to_string();
    let found = xml::elements(xml_text, name, 0..xml_text.len());
    for element in found.into_iter().rev() {
        let end = xml::tag_end(xml_text, element.start).unwrap_or(element.end);
        if matches(&xml_text[element.start..end]) {
            out.replace_range(element, "");
        }
    }
    out
}

/// @acp:summary "How a mapped cell is written"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellEdit {
    Set(CellValue),
    /// Tick the box only when it currently holds `□`
    CheckIfBlank,
}

/// @acp:summary "Ordered cell edits for one named sheet"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetFields {
    pub sheet: String,
    pub edits: Vec<(String, CellEdit)>,
    /// Checkbox column and rows to count once edits are applied
    pub tally: Option<(String, std::ops::RangeInclusive<u32>)>,
}

impl SheetFields {
    pub fn new(sheet: &str) -> Self {
        Self {
            sheet: sheet.to_string(),
            edits: Vec::new(),
            tally: None,
        }
    }

    pub fn text(&mut self, cell: impl Into<String>, text: impl Into<String>) -> &mut Self {
        self.edits
            .push((cell.into(), CellEdit::Set(CellValue::Text(text.into()))));
        self
    }

    pub fn number(&mut self, cell: impl Into<String>, number: i64) -> &mut Self {
        self.edits
            .push((cell.into(), CellEdit::Set(CellValue::Number(number))));
        self
    }

    pub fn check_if_blank(&mut self, cell: impl Into<String>) -> &mut Self {
        self.edits.push((cell.into(), CellEdit::CheckIfBlank));
        self
    }

    /// Cell value for `cell` as mapped, last write wins
    pub fn get(&self, cell: &str) -> Option<&CellEdit> {
        self.edits
            .iter()
            .rev()
            .find(|(c, _)| c == cell)
            .map(|(_, edit)| edit)
    }
}

impl FieldMap for SheetFields {
    fn apply(&self, path: &Path) -> Result<()> {
        let mut book = Workbook::open(path)?;
        let mut sheet = book.worksheet(&self.sheet)?;

        let mut ticked = 0;
        for (cell, edit) in &self.edits {
            match edit {
                CellEdit::Set(value) => sheet.set(cell, value.clone())?,
                CellEdit::CheckIfBlank => {
                    if sheet.check_if_blank(cell)? {
                        ticked += 1;
                    }
                }
            }
        }
        if ticked > 0 {
            tracing::debug!("Ticked {} checkboxes on {}", ticked, self.sheet);
        }

        if let Some((column, rows)) = &self.tally {
            let (checked, total) = sheet.tally(column, rows.clone())?;
            tracing::info!("{}: {}/{} items checked in column {}", self.sheet, checked, total, column);
        }

        book.store(sheet);
        book.save()
    }
}
