//! Picture book pages and HTML export.
//!
//! A finished [`Book`] is written out as one self-contained HTML document:
//! a cover page (title, author, cover image) followed by one block per
//! story page. Images stay embedded as the `data:` URIs the studio returned,
//! so the file opens offline.

use crate::animal::Animal;
use serde::Serialize;
use std::fmt::Write;

/// A finalized sentence with its chosen illustration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub text: String,
    pub image_url: String,
}

/// A completed picture book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub title: String,
    pub author: String,
    pub character: Animal,
    pub cover: String,
    pub pages: Vec<Page>,
}

/// An exported book ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedBook {
    /// Suggested download name, e.g. `The_Lion_King.html`.
    pub file_name: String,
    pub html: String,
}

impl ExportedBook {
    pub fn as_bytes(&self) -> &[u8] {
        self.html.as_bytes()
    }
}

const STYLE: &str = "\
body { font-family: 'Comic Sans MS', cursive, sans-serif; text-align: center; background: #fffcf0; padding: 40px; color: #333; }
.page { background: white; max-width: 800px; margin: 0 auto 50px auto; padding: 40px; border-radius: 30px; border: 10px solid #eee; }
img { max-width: 100%; border-radius: 20px; }
h1 { font-size: 4em; color: #4f46e5; }
p { font-size: 2em; line-height: 1.4; margin-top: 20px; }
.page-number { color: #ccc; }";

/// Render `book` as a standalone HTML document.
pub fn export_book(book: &Book) -> ExportedBook {
    let title = escape_html(&book.title);

    let mut html = String::new();
    // Writing into a String cannot fail.
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n<title>{title}</title>\n<style>\n{STYLE}\n</style>\n</head>\n<body>\n"
    );
    let _ = write!(
        html,
        "<div class=\"page\">\n<h1>{title}</h1>\n<p>By {author}</p>\n<img src=\"{cover}\" alt=\"Cover\" />\n</div>\n",
        author = escape_html(&book.author),
        cover = escape_html(&book.cover),
    );

    for (i, page) in book.pages.iter().enumerate() {
        let _ = write!(
            html,
            "<div class=\"page\">\n<img src=\"{src}\" alt=\"Page {number}\" />\n<p>{text}</p>\n<div class=\"page-number\">- Page {number} -</div>\n</div>\n",
            src = escape_html(&page.image_url),
            text = escape_html(&page.text),
            number = i + 1,
        );
    }

    html.push_str("</body>\n</html>\n");

    tracing::debug!(pages = book.pages.len(), bytes = html.len(), "exported book");

    ExportedBook {
        file_name: file_name_for(&book.title),
        html,
    }
}

/// Download name: whitespace runs become `_`, path-hostile characters are dropped.
pub fn file_name_for(title: &str) -> String {
    let stem: String = title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .collect();

    if stem.is_empty() {
        "book.html".to_string()
    } else {
        format!("{stem}.html")
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_book() -> Book {
        Book {
            title: "The Lion King".to_string(),
            author: "Mia".to_string(),
            character: Animal::Lion,
            cover: "data:image/png;base64,COVER".to_string(),
            pages: vec![
                Page {
                    text: "The lion lived in a big forest.".to_string(),
                    image_url: "data:image/png;base64,P1".to_string(),
                },
                Page {
                    text: "He played with his friends.".to_string(),
                    image_url: "data:image/png;base64,P2".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_export_contains_cover_and_pages_in_order() {
        let exported = export_book(&sample_book());
        let html = &exported.html;

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>The Lion King</title>"));
        assert!(html.contains("<h1>The Lion King</h1>"));
        assert!(html.contains("<p>By Mia</p>"));
        assert!(html.contains("src=\"data:image/png;base64,COVER\""));

        let first = html.find("The lion lived in a big forest.").unwrap();
        let second = html.find("He played with his friends.").unwrap();
        assert!(first < second);
        assert!(html.contains("- Page 1 -"));
        assert!(html.contains("- Page 2 -"));
        assert!(!html.contains("- Page 3 -"));
    }

    #[test]
    fn test_export_escapes_user_text() {
        let mut book = sample_book();
        book.author = "<script>alert('x')</script>".to_string();
        book.pages[0].text = "Tom & \"Jerry\" ran.".to_string();

        let html = export_book(&book).html;
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(html.contains("Tom &amp; &quot;Jerry&quot; ran."));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name_for("The Lion King"), "The_Lion_King.html");
        assert_eq!(file_name_for("  Big   Blue\tSea "), "Big_Blue_Sea.html");
        assert_eq!(file_name_for("Cats/Dogs?"), "CatsDogs.html");
        assert_eq!(file_name_for("   "), "book.html");
    }

    #[test]
    fn test_bytes_match_html() {
        let exported = export_book(&sample_book());
        assert_eq!(exported.as_bytes(), exported.html.as_bytes());
        assert_eq!(exported.file_name, "The_Lion_King.html");
    }
}
