//! Simple CLI that reads HTML from stdin, evaluates an XPath expression and
//! prints the matches as JSON.
//!
//! Usage: `query_stdin '<expression>' < page.html`
//!
//! Set `RUST_LOG=markup_nav=debug` to see load and query logging on stderr.

use std::collections::BTreeMap;
use std::io::{self, Read};

use markup_nav::{Document, Node};
use serde::Serialize;

#[derive(Serialize)]
struct Match {
    tag: Option<String>,
    attributes: BTreeMap<String, String>,
    text: String,
}

impl From<Node<'_>> for Match {
    fn from(node: Node<'_>) -> Self {
        Self {
            tag: node.tag_name(),
            attributes: node.attributes(),
            text: node.text_content(),
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let Some(expression) = std::env::args().nth(1) else {
        eprintln!("Usage: query_stdin <xpath-expression> < input.html");
        std::process::exit(2);
    };

    let mut bytes = Vec::new();
    if io::stdin().read_to_end(&mut bytes).is_err() {
        eprintln!("Failed to read from stdin");
        std::process::exit(1);
    }

    let document = match Document::parse_bytes(&bytes) {
        Ok(document) => document,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    let origin = document.root().unwrap_or_else(|| document.document_node());
    let matches: Vec<Match> = match origin.nodes_for_query(&expression) {
        Ok(nodes) => nodes.into_iter().map(Match::from).collect(),
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    println!("{}", serde_json::to_string(&matches).unwrap_or_default());
}
