use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use predicates::prelude::*;

fn invtab() -> Command {
    Command::cargo_bin("invtab").unwrap()
}

fn int(values: &[i64]) -> Vec<Object> {
    values.iter().map(|&v| Object::Integer(v)).collect()
}

fn text(ops: &mut Vec<Operation>, x: i64, y: i64, s: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(12)]));
    ops.push(Operation::new("Td", int(&[x, y])));
    ops.push(Operation::new("Tj", vec![Object::string_literal(s)]));
    ops.push(Operation::new("ET", vec![]));
}

/// One page with a ruled `Description | Qty | Amount` table and one item row.
fn write_invoice(path: &Path, item: &str) {
    let mut ops = Vec::new();
    for y in [700, 680, 660] {
        ops.push(Operation::new("m", int(&[50, y])));
        ops.push(Operation::new("l", int(&[400, y])));
    }
    for x in [50, 200, 300, 400] {
        ops.push(Operation::new("m", int(&[x, 660])));
        ops.push(Operation::new("l", int(&[x, 700])));
    }
    ops.push(Operation::new("S", vec![]));
    text(&mut ops, 60, 686, "Description");
    text(&mut ops, 210, 686, "Qty");
    text(&mut ops, 310, 686, "Amount");
    text(&mut ops, 60, 666, item);
    text(&mut ops, 210, 666, "10");
    text(&mut ops, 310, 666, "50.00");

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let content = Content { operations: ops };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        "MediaBox" => int(&[0, 0, 612, 792]),
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => Object::Integer(1),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

/// A config file with default values, so the user's own config is never read.
fn default_config(dir: &Path) -> PathBuf {
    let path = dir.join("config.json");
    fs::write(&path, "{}").unwrap();
    path
}

#[test]
fn test_help_lists_commands() {
    invtab()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_extract_requires_inputs() {
    invtab().arg("extract").assert().failure();
}

#[test]
fn test_extract_writes_csv() {
    let dir = tempfile::tempdir().unwrap();
    let config = default_config(dir.path());
    write_invoice(&dir.path().join("Acme_1.pdf"), "Widget");
    write_invoice(&dir.path().join("Globex_2.pdf"), "Gadget");
    let output = dir.path().join("out/items.csv");

    invtab()
        .arg("-c")
        .arg(&config)
        .arg("extract")
        .arg(dir.path())
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let csv = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines,
        [
            "invoice_no,date,supplier,item,qty,price,total,vat,file_name",
            ",,Acme,Widget,10,,50.00,,Acme_1.pdf",
            ",,Globex,Gadget,10,,50.00,,Globex_2.pdf",
        ]
    );
}

#[test]
fn test_extract_json_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let config = default_config(dir.path());
    let pdf = dir.path().join("Acme_1.pdf");
    write_invoice(&pdf, "Widget");

    invtab()
        .arg("-c")
        .arg(&config)
        .args(["extract", "-f", "json", "-j", "2"])
        .arg(&pdf)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""item": "Widget""#))
        .stdout(predicate::str::contains(r#""supplier": "Acme""#));
}

#[test]
fn test_extract_writes_xlsx() {
    let dir = tempfile::tempdir().unwrap();
    let config = default_config(dir.path());
    let pdf = dir.path().join("Acme_1.pdf");
    write_invoice(&pdf, "Widget");
    let output = dir.path().join("items.xlsx");

    invtab()
        .arg("-c")
        .arg(&config)
        .args(["extract", "-f", "xlsx", "-o"])
        .arg(&output)
        .arg(&pdf)
        .assert()
        .success();

    let bytes = fs::read(&output).unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn test_xlsx_requires_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = default_config(dir.path());
    let pdf = dir.path().join("Acme_1.pdf");
    write_invoice(&pdf, "Widget");

    invtab()
        .arg("-c")
        .arg(&config)
        .args(["extract", "-f", "xlsx"])
        .arg(&pdf)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output"));
}

#[test]
fn test_extract_without_pdfs_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = default_config(dir.path());
    fs::write(dir.path().join("notes.txt"), "hello").unwrap();

    invtab()
        .arg("-c")
        .arg(&config)
        .arg("extract")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No PDF files found"));
}

#[test]
fn test_unreadable_pdf_reports_no_data() {
    let dir = tempfile::tempdir().unwrap();
    let config = default_config(dir.path());
    let pdf = dir.path().join("Broken_1.pdf");
    fs::write(&pdf, b"not a pdf").unwrap();

    invtab()
        .arg("-c")
        .arg(&config)
        .args(["extract"])
        .arg(&pdf)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Broken_1.pdf"))
        .stderr(predicate::str::contains("no extractable data"));
}

#[test]
fn test_config_init_and_show() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("invtab.json");

    invtab()
        .args(["config", "init", "-o"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));
    assert!(path.exists());

    invtab()
        .args(["config", "init", "-o"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    invtab()
        .arg("-c")
        .arg(&path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"render_dpi\": 300"))
        .stdout(predicate::str::contains("\"flavor\": \"lattice\""));
}
