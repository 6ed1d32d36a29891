use std::io::Cursor;

use markup_nav::{Document, DocumentKind, Error, Options};

fn fragment_options() -> Options {
    Options {
        kind: DocumentKind::Fragment,
        ..Options::default()
    }
}

#[test]
fn empty_input_is_rejected() {
    assert!(matches!(Document::parse(""), Err(Error::EmptyInput)));
    assert!(matches!(Document::parse(" \n\t "), Err(Error::EmptyInput)));
    assert!(matches!(Document::parse_bytes(b""), Err(Error::EmptyInput)));
}

#[test]
fn fragment_without_elements_has_no_root() {
    let result = Document::parse_with_options("just text", &fragment_options());
    assert!(matches!(result, Err(Error::NoRootElement)));

    let lenient = Options {
        require_root: false,
        ..fragment_options()
    };
    let doc = Document::parse_with_options("just text", &lenient).unwrap();
    assert!(doc.root().is_none());
    assert_eq!(doc.document_node().text_content(), "just text");
}

#[test]
fn document_mode_synthesizes_structure() {
    let doc = Document::parse("<p>loose</p>").unwrap();
    assert_eq!(doc.kind(), DocumentKind::Document);
    assert_eq!(doc.root().unwrap().tag_name().as_deref(), Some("html"));
    assert!(doc.head().is_some());
    assert_eq!(doc.body().unwrap().child_of_tag("p").unwrap().text_content(), "loose");
    assert!(doc.title().is_none());
}

#[test]
fn malformed_markup_still_parses() {
    let doc = Document::parse("<div><p>unclosed<span>deep</div><p>after").unwrap();
    let body = doc.body().unwrap();
    assert!(body.descendant_of_tag("span").is_some());
    assert_eq!(body.descendants_of_tag("p").len(), 2);
}

#[test]
fn bytes_with_meta_charset_are_decoded() {
    let mut bytes = b"<html><head><meta charset=\"windows-1252\"><title>Caf".to_vec();
    bytes.push(0xE9);
    bytes.extend_from_slice(b"</title></head><body></body></html>");
    let doc = Document::parse_bytes(&bytes).unwrap();
    assert_eq!(doc.encoding().name(), "windows-1252");
    assert_eq!(doc.title().as_deref(), Some("Café"));
}

#[test]
fn explicit_encoding_overrides_sniffing() {
    let bytes = "<html><head><meta charset=\"iso-8859-1\"><title>Grüße</title></head></html>".as_bytes();
    let options = Options {
        encoding: Some("utf-8".to_string()),
        ..Options::default()
    };
    let doc = Document::parse_bytes_with_options(bytes, &options).unwrap();
    assert_eq!(doc.title().as_deref(), Some("Grüße"));
}

#[test]
fn unknown_encoding_label_is_invalid_input() {
    let options = Options {
        encoding: Some("no-such-charset".to_string()),
        ..Options::default()
    };
    let result = Document::parse_bytes_with_options(b"<p>x</p>", &options);
    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[test]
fn strict_encoding_rejects_malformed_bytes() {
    let bytes = b"<html><body><p>bad \xFF byte</p></body></html>";
    let strict = Options {
        encoding: Some("utf-8".to_string()),
        strict_encoding: true,
        ..Options::default()
    };
    assert!(matches!(
        Document::parse_bytes_with_options(bytes, &strict),
        Err(Error::InvalidInput(_))
    ));

    let doc = Document::parse_bytes(bytes).unwrap();
    let text = doc.body().unwrap().text_content();
    assert!(text.contains('\u{FFFD}'));
}

#[test]
fn from_reader_matches_parse() {
    let html = "<html><body><ul><li>a</li><li>b</li></ul></body></html>";
    let doc = Document::from_reader(Cursor::new(html.as_bytes()), &Options::default()).unwrap();
    let items = doc.root().unwrap().descendants_of_tag("li");
    assert_eq!(items.len(), 2);
}

#[test]
fn from_path_reads_file() {
    let path = std::env::temp_dir().join(format!("markup_nav_doc_{}.html", std::process::id()));
    std::fs::write(&path, "<html><head><title>On disk</title></head></html>").unwrap();
    let doc = Document::from_path(&path, &Options::default()).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(doc.title().as_deref(), Some("On disk"));
}

#[test]
fn missing_file_is_unreadable() {
    let path = std::env::temp_dir().join("markup_nav_definitely_missing.html");
    let result = Document::from_path(&path, &Options::default());
    assert!(matches!(result, Err(Error::Unreadable(_))));
}

#[test]
fn error_messages_are_descriptive() {
    let err = Document::parse("").unwrap_err();
    assert!(!err.to_string().is_empty());
    let doc = Document::parse("<p>x</p>").unwrap();
    let err = Error::from(doc.root().unwrap().nodes_for_query("//p[@id").unwrap_err());
    assert!(err.to_string().contains("1206"));
}

#[test]
fn independent_documents_can_be_used_from_threads() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                let html = format!("<html><body><p id=\"p{i}\">{i}</p></body></html>");
                let doc = Document::parse(&html).unwrap();
                doc.root()
                    .unwrap()
                    .descendant_with_id(&format!("p{i}"))
                    .and_then(|p| p.integer_value())
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), Some(i as i64));
    }
}
