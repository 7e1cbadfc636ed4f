use quick_xml::escape::escape;

/// Build the canonical XML for plain-text input.
///
/// Each non-blank line is a sentence, one blank line closes the paragraph
/// and a further blank line closes the page. Words are split on whitespace.
pub fn synthesize(text: &str, language: &str) -> String {
    let pages = split_pages(text);

    let mut out = String::from("<?xml version='1.0' encoding='utf-8'?>\n<TEI>\n");
    out.push_str(&format!("  <text xml:lang=\"{}\">\n", escape(language)));
    out.push_str("    <body>\n");
    for page in &pages {
        out.push_str("      <div type=\"page\">\n");
        for paragraph in page {
            out.push_str("        <p>\n");
            for sentence in paragraph {
                out.push_str("          <s>");
                let words: Vec<String> = sentence
                    .split_whitespace()
                    .map(|word| format!("<w>{}</w>", escape(word)))
                    .collect();
                out.push_str(&words.join(" "));
                out.push_str("</s>\n");
            }
            out.push_str("        </p>\n");
        }
        out.push_str("      </div>\n");
    }
    out.push_str("    </body>\n  </text>\n</TEI>\n");
    out
}

type Paragraph<'a> = Vec<&'a str>;
type Page<'a> = Vec<Paragraph<'a>>;

fn split_pages(text: &str) -> Vec<Page<'_>> {
    let mut pages = Vec::new();
    let mut paragraphs: Page<'_> = Vec::new();
    let mut sentences: Paragraph<'_> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if !line.is_empty() {
            sentences.push(line);
        } else if !sentences.is_empty() {
            paragraphs.push(std::mem::take(&mut sentences));
        } else if !paragraphs.is_empty() {
            pages.push(std::mem::take(&mut paragraphs));
        }
    }
    if !sentences.is_empty() {
        paragraphs.push(sentences);
    }
    if !paragraphs.is_empty() {
        pages.push(paragraphs);
    }
    pages
}
