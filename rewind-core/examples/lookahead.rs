//! Peek inside each element before deciding how to consume it.
//!
//! Usage: cargo run --example lookahead [file.xml]

use rewind_core::{BufferLimit, BufferingCursor, EventSource, MarkupReaderExt, MarkupTokenizer};

const SAMPLE: &str = r#"<inventory>
  <item sku="A-1"><name>Bolt</name><qty>120</qty></item>
  <item sku="B-7"><discontinued/><name>Washer</name></item>
  <item sku="C-3"><name>Nut</name><qty>45</qty></item>
</inventory>"#;

fn main() {
    let input = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path).unwrap_or_else(|err| {
            eprintln!("cannot read {path}: {err}");
            std::process::exit(1);
        }),
        None => SAMPLE.to_string(),
    };

    let mut cursor = BufferingCursor::new(MarkupTokenizer::from_str(&input));
    if let Err(err) = run(&mut cursor) {
        let location = err.span().map(|span| cursor.get_ref().location(span));
        match location {
            Some(location) => eprintln!("error at {location}: {err}"),
            None => eprintln!("error: {err}"),
        }
        std::process::exit(1);
    }
}

fn run(cursor: &mut BufferingCursor<MarkupTokenizer<'_>>) -> Result<(), rewind_core::StreamError> {
    cursor.next_tag()?;
    loop {
        let item = cursor.next_tag()?;
        if item.is_end_element() {
            break;
        }
        let sku = item.attribute("sku").unwrap_or("?").to_string();

        // Retain the item's first child so it can be handed back after inspection
        cursor.mark(BufferLimit::bounded(1))?;
        let first = cursor.next_tag()?;
        if first.name() == Some("discontinued") {
            println!("{sku}: discontinued, skipping");
            cursor.skip_element()?; // </discontinued>
            cursor.skip_element()?; // rest of <item>
            continue;
        }
        cursor.reset()?;

        let mut fields = Vec::new();
        loop {
            let child = cursor.next_tag()?;
            if child.is_end_element() {
                break;
            }
            let name = child.name().unwrap_or_default().to_string();
            fields.push(format!("{name}={}", cursor.element_text()?));
        }
        println!("{sku}: {}", fields.join(", "));
    }
    cursor.close()
}
