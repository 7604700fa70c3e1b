//! Fixed documents and page wrappers of the package.

use quick_xml::escape::escape;

use crate::xml::xml_chars;

/// `META-INF/container.xml`, pointing at the package document.
pub const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#;

/// Stylesheet used when none is configured.
pub const DEFAULT_CSS: &str = "body { font-family: serif; line-height: 1.5; padding: 0 0.5rem; }
h1, h2, h3 { margin: 1.2em 0 0.6em; }
img { max-width: 100%; height: auto; }
";

const COVER_CSS: &str = "html, body { margin: 0; padding: 0; height: 100%; }
figure { margin: 0; height: 100%; display: flex; align-items: center; justify-content: center; background: #000; }
img { max-width: 100%; max-height: 100%; }";

fn open_document(out: &mut String, title: &str, language: &str) {
    let language = escape(language);
    out.push_str(
        r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops" lang=""#,
    );
    out.push_str(&language);
    out.push_str(r#"" xml:lang=""#);
    out.push_str(&language);
    out.push_str("\">\n<head>\n  <meta charset=\"utf-8\"/>\n  <title>");
    out.push_str(&escape(&*xml_chars(title)));
    out.push_str("</title>\n");
}

/// Wrap a normalized chapter body in a complete XHTML content document.
pub fn chapter_page(title: &str, language: &str, body: &str) -> String {
    let mut doc = String::with_capacity(body.len() + 512);
    open_document(&mut doc, title, language);
    doc.push_str("  <link rel=\"stylesheet\" type=\"text/css\" href=\"styles.css\"/>\n");
    doc.push_str("</head>\n<body epub:type=\"bodymatter\">\n");
    doc.push_str(body);
    doc.push_str("\n</body>\n</html>\n");
    doc
}

/// Full-page cover showing `image_href`.
pub fn cover_page(title: &str, language: &str, image_href: &str) -> String {
    let mut doc = String::new();
    open_document(&mut doc, title, language);
    doc.push_str("  <style>");
    doc.push_str(COVER_CSS);
    doc.push_str("</style>\n");
    doc.push_str("</head>\n<body epub:type=\"cover\">\n  <figure>\n    <img src=\"");
    doc.push_str(&escape(image_href));
    doc.push_str("\" alt=\"Cover\" role=\"doc-cover\"/>\n  </figure>\n</body>\n</html>\n");
    doc
}
