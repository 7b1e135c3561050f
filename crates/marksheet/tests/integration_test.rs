//! End-to-end tests for roster ingestion, rendering and assembly.

use std::io::Write;

use lopdf::Document;
use tempfile::{NamedTempFile, TempDir};

use marksheet::{
    classify, merge, DataTable, DocumentRenderer, Generator, GeneratorConfig, Grade,
    MarksheetError, Parser, ParserConfig, RenderOptions, SchoolProfile, StudentRecord,
    SubjectScore, ValidationError, MERGED_FILE_NAME,
};

/// Two-sheet workbook: "Term 1" (three subjects, two students) and
/// "Term 2" (one subject, one student). Marks are stored as numbers.
const WORKBOOK: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/roster.xlsx");

const HEADER: &str = "Roll No.,Name of the student,Father's Name,Mother's Name";

/// Helper to create a temporary roster file with the given extension.
fn create_roster_file(content: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

fn profile() -> SchoolProfile {
    SchoolProfile::new("10th", "Springfield High", "R. Sharma", "2024-2025")
}

/// The two-student, two-subject roster used across these tests.
fn small_roster() -> String {
    format!(
        "{HEADER},Maths,English\n\
         1,Asha Rao,Vikram Rao,Meena Rao,95,60\n\
         2,Ravi Das,Anil Das,Sita Das,45,39\n"
    )
}

/// A record with `subjects` subjects, all scoring 75.
fn record_with_subjects(roll: &str, subjects: usize) -> StudentRecord {
    StudentRecord {
        roll: roll.to_string(),
        name: format!("Student {}", roll),
        father_name: "Father".to_string(),
        mother_name: "Mother".to_string(),
        subjects: (1..=subjects)
            .map(|i| {
                (
                    format!("Subject {}", i),
                    SubjectScore {
                        mark: 75,
                        grade: classify(75),
                    },
                )
            })
            .collect(),
    }
}

fn uncompressed_renderer() -> DocumentRenderer {
    DocumentRenderer::new(&profile(), RenderOptions { compress: false })
        .expect("Failed to build renderer")
}

/// Concatenated content streams of every page, in page order.
fn page_texts(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).expect("Failed to load PDF");
    doc.get_pages()
        .into_values()
        .map(|id| {
            let content = doc.get_page_content(id).expect("Failed to read page content");
            String::from_utf8_lossy(&content).into_owned()
        })
        .collect()
}

// =============================================================================
// End-to-end Pipeline Tests
// =============================================================================

#[test]
fn test_two_students_two_subjects() {
    let file = create_roster_file(&small_roster(), ".csv");
    let generator = Generator::with_config(
        profile(),
        GeneratorConfig {
            render: RenderOptions { compress: false },
            ..Default::default()
        },
    );
    let result = generator.generate_file(file.path()).expect("Generation failed");

    assert_eq!(result.summary.students, 2);
    assert_eq!(result.summary.subjects, 2);
    assert_eq!(result.roster.subjects, vec!["Maths", "English"]);

    let asha = &result.roster.records[0];
    assert_eq!(asha.score("Maths").unwrap().grade, Grade::APlus);
    assert_eq!(asha.score("English").unwrap().grade, Grade::B);
    assert_eq!(asha.total(), 155);

    let ravi = &result.roster.records[1];
    assert_eq!(ravi.score("Maths").unwrap().grade, Grade::D);
    assert_eq!(ravi.score("English").unwrap().grade, Grade::F);
    assert_eq!(ravi.total(), 84);

    assert_eq!(result.documents.len(), 2);
    assert_eq!(result.merged.page_count, 2);

    // Merged pages follow roster order.
    let pages = page_texts(&result.merged.bytes);
    assert_eq!(pages.len(), 2);
    assert!(pages[0].contains("(Name of Student: Asha Rao)"));
    assert!(pages[0].contains("(155)"));
    assert!(pages[0].contains("(A+)"));
    assert!(pages[1].contains("(Name of Student: Ravi Das)"));
    assert!(pages[1].contains("(84)"));

    let source = result.source.expect("File runs carry source metadata");
    assert_eq!(source.format, "csv");
    assert_eq!(source.row_count, 2);
}

#[test]
fn test_save_writes_individual_and_merged() {
    let file = create_roster_file(&small_roster(), ".csv");
    let out = TempDir::new().unwrap();

    let result = Generator::new(profile())
        .generate_file(file.path())
        .expect("Generation failed");
    let written = result.save(out.path()).expect("Save failed");

    assert_eq!(written.len(), 3);
    for name in ["1_Asha_Rao.pdf", "2_Ravi_Das.pdf", MERGED_FILE_NAME] {
        let path = out.path().join(name);
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"), "{} is not a PDF", name);
    }
    let merged = std::fs::read(out.path().join(MERGED_FILE_NAME)).unwrap();
    assert_eq!(marksheet::assemble::page_count(&merged).unwrap(), 2);
}

#[test]
fn test_generation_is_idempotent() {
    let file = create_roster_file(&small_roster(), ".csv");
    let generator = Generator::new(profile());

    let first = generator.generate_file(file.path()).unwrap();
    let second = generator.generate_file(file.path()).unwrap();

    assert_eq!(first.roster, second.roster);
    assert_eq!(first.summary, second.summary);
    let names = |docs: &[marksheet::RenderedDocument]| {
        docs.iter().map(|d| d.name.clone()).collect::<Vec<_>>()
    };
    assert_eq!(names(&first.documents), names(&second.documents));
    for (a, b) in first.documents.iter().zip(&second.documents) {
        assert_eq!(a.page_count, b.page_count);
        assert_eq!(page_texts(&a.bytes), page_texts(&b.bytes));
    }
}

#[test]
fn test_tab_delimited_roster() {
    let content = small_roster().replace(',', "\t");
    let file = create_roster_file(&content, ".tsv");
    let result = Generator::new(profile()).generate_file(file.path()).unwrap();
    assert_eq!(result.summary.students, 2);
    assert_eq!(result.source.unwrap().format, "tsv");
}

// =============================================================================
// Workbook Tests
// =============================================================================

#[test]
fn test_workbook_first_sheet_by_default() {
    let (table, source) = Parser::new().parse_file(WORKBOOK).expect("Failed to parse workbook");

    assert_eq!(source.format, "xlsx");
    assert_eq!(source.row_count, 2);
    assert_eq!(
        table.headers,
        vec![
            "Roll No.",
            "Name of the student",
            "Father's Name",
            "Mother's Name",
            "Maths",
            "English",
            "Science",
        ]
    );
    // Numeric cells come back as whole numbers, not "95.0".
    assert_eq!(table.rows[0][0], "1");
    assert_eq!(table.rows[0][4], "95");
    assert_eq!(table.rows[1][4], "45");
    assert_eq!(table.rows[0][6], "88");
}

#[test]
fn test_workbook_generates_marksheets() {
    let result = Generator::new(profile()).generate_file(WORKBOOK).unwrap();

    assert_eq!(result.roster.subjects, vec!["Maths", "English", "Science"]);
    let ravi = result.roster.find("2").unwrap();
    assert_eq!(ravi.score("Maths").unwrap().mark, 45);
    assert_eq!(ravi.score("English").unwrap().grade, Grade::F);
    assert_eq!(ravi.total(), 45 + 39 + 72);
    assert_eq!(result.summary.pages, 2);
}

#[test]
fn test_workbook_named_sheet() {
    let config = GeneratorConfig {
        parser: ParserConfig {
            sheet: Some("Term 2".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    let result = Generator::with_config(profile(), config)
        .generate_file(WORKBOOK)
        .unwrap();

    assert_eq!(result.roster.subjects, vec!["History"]);
    assert_eq!(result.roster.records[0].name, "Kiran Shah");
    assert_eq!(result.roster.records[0].score("History").unwrap().grade, Grade::A);
}

#[test]
fn test_workbook_unknown_sheet() {
    let parser = Parser::with_config(ParserConfig {
        sheet: Some("Term 9".to_string()),
        ..Default::default()
    });
    let err = parser.parse_file(WORKBOOK).unwrap_err();
    assert!(matches!(err, MarksheetError::Spreadsheet(ref m) if m.contains("Term 9")));
}

// =============================================================================
// Assembly Tests
// =============================================================================

#[test]
fn test_merge_is_additive_and_ordered() {
    let renderer = uncompressed_renderer();
    let docs: Vec<_> = [("1", 2), ("2", 30), ("3", 60)]
        .iter()
        .map(|(roll, subjects)| renderer.render(&record_with_subjects(roll, *subjects)).unwrap())
        .collect();

    let counts: Vec<usize> = docs.iter().map(|d| d.page_count).collect();
    assert_eq!(counts, vec![1, 2, 3]);

    let merged = merge(&docs).unwrap();
    assert_eq!(merged.page_count, 6);

    let pages = page_texts(&merged.bytes);
    assert_eq!(pages.len(), 6);
    let owners = ["Student 1", "Student 2", "Student 2", "Student 3", "Student 3", "Student 3"];
    let mut expected_pages = Vec::new();
    for doc in &docs {
        expected_pages.extend(page_texts(&doc.bytes));
    }
    assert_eq!(pages, expected_pages);

    // Identity appears once per document, on its first page.
    for (i, owner) in owners.iter().enumerate() {
        let first_of_doc = i == 0 || owners[i - 1] != *owner;
        let needle = format!("(Name of Student: {})", owner);
        assert_eq!(pages[i].contains(&needle), first_of_doc, "page {}", i);
    }
}

#[test]
fn test_continuation_pages_repeat_header_and_footer() {
    let doc = uncompressed_renderer()
        .render(&record_with_subjects("7", 30))
        .unwrap();
    let pages = page_texts(&doc.bytes);
    assert_eq!(pages.len(), 2);
    for page in &pages {
        assert!(page.contains("(Springfield High)"));
        assert!(page.contains("(\\( R. Sharma \\))") || page.contains("(( R. Sharma ))"));
    }
    assert!(!pages[0].contains("(Total)"));
    assert!(pages[1].contains("(Total)"));
    assert!(pages[1].contains(&format!("({})", 30 * 75)));
}

#[test]
fn test_merge_empty_input() {
    assert!(matches!(merge(&[]), Err(MarksheetError::Assembly(_))));
}

// =============================================================================
// Failure Tests
// =============================================================================

#[test]
fn test_missing_identity_column() {
    let file = create_roster_file(
        "Roll No.,Name of the student,Father's Name,Maths\n1,Asha,Vikram,90\n",
        ".csv",
    );
    let err = Generator::new(profile()).generate_file(file.path()).unwrap_err();
    assert!(matches!(
        err,
        MarksheetError::Validation(ValidationError::MissingColumn(ref c)) if c == "Mother's Name"
    ));
}

#[test]
fn test_non_numeric_mark_aborts_run() {
    let content = format!("{HEADER},Maths\n1,Asha Rao,Vikram Rao,Meena Rao,ninety\n");
    let file = create_roster_file(&content, ".csv");

    let err = Generator::new(profile()).generate_file(file.path()).unwrap_err();
    assert!(matches!(
        err,
        MarksheetError::Validation(ValidationError::InvalidMark { ref value, .. }) if value == "ninety"
    ));
}

#[test]
fn test_roster_without_subjects() {
    let content = format!("{HEADER}\n1,Asha Rao,Vikram Rao,Meena Rao\n");
    let file = create_roster_file(&content, ".csv");
    let err = Generator::new(profile()).generate_file(file.path()).unwrap_err();
    assert!(matches!(
        err,
        MarksheetError::Validation(ValidationError::NoSubjects)
    ));
}

#[test]
fn test_header_only_roster() {
    let content = format!("{HEADER},Maths\n");
    let file = create_roster_file(&content, ".csv");
    let err = Generator::new(profile()).generate_file(file.path()).unwrap_err();
    assert!(matches!(
        err,
        MarksheetError::Validation(ValidationError::EmptyRoster) | MarksheetError::EmptyData(_)
    ));
}

#[test]
fn test_missing_roster_file() {
    let err = Generator::new(profile())
        .generate_file("/nonexistent/roster.csv")
        .unwrap_err();
    assert!(matches!(err, MarksheetError::Io { .. }));
}

#[test]
fn test_unreadable_logo_aborts_before_rendering() {
    let table = DataTable::from_rows(
        &["Roll No.", "Name of the student", "Father's Name", "Mother's Name", "Maths"],
        &[&["1", "Asha Rao", "Vikram Rao", "Meena Rao", "88"]],
    );
    let p = profile().with_logo("/nonexistent/logo.png");
    let err = Generator::new(p).generate_table(&table).unwrap_err();
    assert!(matches!(err, MarksheetError::Render(_)));
}
