//! Record extraction from heterogeneous page bodies.
//!
//! Each response shape gets one extractor. An extractor runs once per
//! page body and yields raw, un-normalized records; a body it cannot
//! make sense of turns into an error that the fan-out absorbs as "this
//! page yielded zero records".

use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

use crate::{Result, SearchError};

/// Raw field mapping decoded from a plain-JSON page body.
pub(crate) type RawRecord = serde_json::Map<String, Value>;

/// Raw text-shaped record before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawTextRecord {
    pub href: String,
    pub title: String,
    pub body: String,
}

/// Opening marker of the embedded results array in a `d.js` body.
const SCRIPT_PREFIX: &str = "DDG.pageLayout.load('d',";
/// Closing marker of the embedded results array in a `d.js` body.
const SCRIPT_SUFFIX: &str = ");DDG.duckbar.load(";

/// Literal body marker for an exhausted html-endpoint page.
const NO_RESULTS_HTML: &str = "No  results.";
/// Literal body marker for an exhausted lite-endpoint page.
const NO_RESULTS_LITE: &str = "No more results.";

/// Link prefixes that never denote an organic result.
const EXCLUDED_HREF_PREFIXES: [&str; 2] = [
    "http://www.google.com/search?q=",
    "https://duckduckgo.com/y.js?ad_domain",
];

/// Returns true for the search-engine self-redirect and ad-redirect links.
pub(crate) fn is_excluded_href(href: &str) -> bool {
    EXCLUDED_HREF_PREFIXES
        .iter()
        .any(|prefix| href.starts_with(prefix))
}

/// Capability interface over the text response shapes.
pub(crate) trait Extract {
    /// Record type produced by this shape.
    type Record;

    /// Turns one page body into a sequence of raw records.
    fn extract(&self, body: &str) -> Result<Vec<Self::Record>>;
}

/// Extractor for the embedded-script-JSON shape (`links.duckduckgo.com/d.js`).
pub(crate) struct ScriptJson;

impl Extract for ScriptJson {
    type Record = RawTextRecord;

    fn extract(&self, body: &str) -> Result<Vec<RawTextRecord>> {
        let start = body
            .find(SCRIPT_PREFIX)
            .ok_or_else(|| SearchError::Extraction("page layout marker not found".to_string()))?
            + SCRIPT_PREFIX.len();
        let end = body[start..]
            .find(SCRIPT_SUFFIX)
            .ok_or_else(|| SearchError::Extraction("duckbar marker not found".to_string()))?;

        let rows: Vec<RawRecord> = serde_json::from_str(&body[start..start + end])
            .map_err(|e| SearchError::Extraction(format!("embedded JSON: {e}")))?;

        let records = rows
            .into_iter()
            .filter_map(|row| {
                let href = row.get("u")?.as_str()?.to_string();
                Some(RawTextRecord {
                    href,
                    title: field(&row, "t"),
                    body: field(&row, "a"),
                })
            })
            .collect();
        Ok(records)
    }
}

/// Extractor for the rendered html-endpoint shape (`html.duckduckgo.com`).
///
/// A result block is a `div` owning a direct `h2` child; the link comes
/// from the first direct child anchor, the snippet from the concatenated
/// text of all direct child anchors.
pub(crate) struct HtmlBlocks;

impl Extract for HtmlBlocks {
    type Record = RawTextRecord;

    fn extract(&self, body: &str) -> Result<Vec<RawTextRecord>> {
        if body.contains(NO_RESULTS_HTML) {
            return Ok(Vec::new());
        }
        let document = Html::parse_document(body);
        let div_selector = parse_selector("div")?;
        let anchor_selector = parse_selector("a")?;

        let mut records = Vec::new();
        for element in document.select(&div_selector) {
            let children: Vec<ElementRef> =
                element.children().filter_map(ElementRef::wrap).collect();
            let Some(heading) = children.iter().find(|c| c.value().name() == "h2") else {
                continue;
            };
            let anchors: Vec<&ElementRef> = children
                .iter()
                .filter(|c| c.value().name() == "a")
                .collect();
            let Some(href) = anchors.first().and_then(|a| a.value().attr("href")) else {
                continue;
            };
            if href.is_empty() {
                continue;
            }

            let title: String = heading
                .select(&anchor_selector)
                .next()
                .map(|a| a.text().collect())
                .unwrap_or_default();
            let body: String = anchors.iter().flat_map(|a| a.text()).collect();

            records.push(RawTextRecord {
                href: href.to_string(),
                title,
                body,
            });
        }
        Ok(records)
    }
}

/// Extractor for the lite-endpoint shape (`lite.duckduckgo.com`).
///
/// Rows of the last table repeat in groups of three: link+title, then
/// snippet, then a separator row that emits the record. A group whose
/// link row is empty or excluded is consumed without emitting.
pub(crate) struct LiteRows;

impl Extract for LiteRows {
    type Record = RawTextRecord;

    fn extract(&self, body: &str) -> Result<Vec<RawTextRecord>> {
        if body.contains(NO_RESULTS_LITE) {
            return Ok(Vec::new());
        }
        let document = Html::parse_document(body);
        let table_selector = parse_selector("table")?;
        let row_selector = parse_selector("tr")?;
        let anchor_selector = parse_selector("a")?;
        let snippet_selector = parse_selector("td.result-snippet")?;

        let Some(table) = document.select(&table_selector).last() else {
            return Ok(Vec::new());
        };

        let mut records = Vec::new();
        let mut href = String::new();
        let mut title = String::new();
        let mut body_text = String::new();
        let mut skip_group = false;

        for (i, row) in table.select(&row_selector).enumerate() {
            match i % 3 {
                0 => {
                    skip_group = true;
                    if let Some(anchor) = row.select(&anchor_selector).next() {
                        if let Some(link) = anchor.value().attr("href") {
                            if !link.is_empty() && !is_excluded_href(link) {
                                href = link.to_string();
                                title = anchor.text().collect();
                                skip_group = false;
                            }
                        }
                    }
                }
                1 => {
                    body_text = row
                        .select(&snippet_selector)
                        .flat_map(|cell| cell.text())
                        .collect();
                }
                _ => {
                    if !skip_group {
                        records.push(RawTextRecord {
                            href: href.clone(),
                            title: title.clone(),
                            body: body_text.clone(),
                        });
                    }
                    body_text.clear();
                }
            }
        }
        Ok(records)
    }
}

/// Reads the `results` array out of a plain-JSON page body
/// (images/videos/news endpoints).
pub(crate) fn json_results(body: &str) -> Result<Vec<RawRecord>> {
    let parsed: Value = serde_json::from_str(body)
        .map_err(|e| SearchError::Extraction(format!("response JSON: {e}")))?;
    let rows = parsed
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| SearchError::Extraction("missing results array".to_string()))?;
    Ok(rows
        .iter()
        .filter_map(|row| row.as_object().cloned())
        .collect())
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| SearchError::Extraction(format!("selector '{css}': {e:?}")))
}

fn field(row: &RawRecord, key: &str) -> String {
    row.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT_BODY: &str = concat!(
        "if (DDG.deep) {}\nDDG.pageLayout.load('d',[",
        r#"{"u":"https://example.com/1","t":"First","a":"snippet one"},"#,
        r#"{"t":"no link here"},"#,
        r#"{"u":"https://example.com/2","t":"Second","a":"snippet two"}"#,
        "]);DDG.duckbar.load('images');"
    );

    #[test]
    fn test_script_json_extracts_rows() {
        let records = ScriptJson.extract(SCRIPT_BODY).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].href, "https://example.com/1");
        assert_eq!(records[0].title, "First");
        assert_eq!(records[1].body, "snippet two");
    }

    #[test]
    fn test_script_json_missing_prefix() {
        let err = ScriptJson.extract("<html>no markers</html>").unwrap_err();
        assert!(matches!(err, SearchError::Extraction(_)));
    }

    #[test]
    fn test_script_json_missing_suffix() {
        let body = "DDG.pageLayout.load('d',[{\"u\":\"x\"}]";
        assert!(ScriptJson.extract(body).is_err());
    }

    #[test]
    fn test_script_json_malformed_payload() {
        let body = "DDG.pageLayout.load('d',[{broken);DDG.duckbar.load(";
        assert!(ScriptJson.extract(body).is_err());
    }

    const HTML_BODY: &str = r#"
        <html><body>
        <div id="links">
            <div class="result">
                <h2><a href="https://example.com/a">Alpha</a></h2>
                <a href="https://example.com/a">Alpha snippet text</a>
            </div>
            <div class="result">
                <h2><a href="https://example.com/b">Beta</a></h2>
                <a href="https://example.com/b">Beta <b>snippet</b></a>
            </div>
            <div class="sidebar">no heading here</div>
        </div>
        </body></html>
    "#;

    #[test]
    fn test_html_blocks_extracts_divs_with_headings() {
        let records = HtmlBlocks.extract(HTML_BODY).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].href, "https://example.com/a");
        assert_eq!(records[0].title, "Alpha");
        assert_eq!(records[0].body, "Alpha snippet text");
        assert_eq!(records[1].body, "Beta snippet");
    }

    #[test]
    fn test_html_blocks_no_results_marker() {
        let body = "<html><body><div>No  results.</div></body></html>";
        assert!(HtmlBlocks.extract(body).unwrap().is_empty());
    }

    #[test]
    fn test_html_blocks_empty_document() {
        assert!(HtmlBlocks.extract("<html></html>").unwrap().is_empty());
    }

    #[test]
    fn test_html_blocks_skips_block_without_anchor() {
        let body = "<div><h2>heading only</h2></div>";
        assert!(HtmlBlocks.extract(body).unwrap().is_empty());
    }

    fn lite_group(href: &str, title: &str, snippet: &str) -> String {
        format!(
            "<tr><td><a href=\"{href}\">{title}</a></td></tr>\
             <tr><td class=\"result-snippet\">{snippet}</td></tr>\
             <tr><td>separator</td></tr>"
        )
    }

    #[test]
    fn test_lite_rows_three_row_groups() {
        let body = format!(
            "<html><body><table>{}{}</table></body></html>",
            lite_group("https://example.com/a", "Alpha", "first snippet"),
            lite_group("https://example.com/b", "Beta", "second snippet"),
        );
        let records = LiteRows.extract(&body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].href, "https://example.com/a");
        assert_eq!(records[0].title, "Alpha");
        assert_eq!(records[1].body, "second snippet");
    }

    #[test]
    fn test_lite_rows_uses_last_table() {
        let body = format!(
            "<html><body><table><tr><td>nav</td></tr></table><table>{}</table></body></html>",
            lite_group("https://example.com/a", "Alpha", "snippet"),
        );
        let records = LiteRows.extract(&body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].href, "https://example.com/a");
    }

    #[test]
    fn test_lite_rows_skips_excluded_group() {
        let body = format!(
            "<html><body><table>{}{}</table></body></html>",
            lite_group("https://duckduckgo.com/y.js?ad_domain=x.com", "Ad", "ad text"),
            lite_group("https://example.com/real", "Real", "real text"),
        );
        let records = LiteRows.extract(&body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].href, "https://example.com/real");
    }

    #[test]
    fn test_lite_rows_no_more_results_marker() {
        let body = "<html><body><table><tr><td>No more results.</td></tr></table></body></html>";
        assert!(LiteRows.extract(body).unwrap().is_empty());
    }

    #[test]
    fn test_lite_rows_no_table() {
        assert!(LiteRows.extract("<html><body></body></html>").unwrap().is_empty());
    }

    #[test]
    fn test_json_results() {
        let body = r#"{"results":[{"image":"https://i.example.com/1.png"},{"image":"https://i.example.com/2.png"}]}"#;
        let rows = json_results(body).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].get("image").unwrap().as_str().unwrap(),
            "https://i.example.com/1.png"
        );
    }

    #[test]
    fn test_json_results_missing_array() {
        assert!(json_results(r#"{"ok":true}"#).is_err());
    }

    #[test]
    fn test_json_results_malformed() {
        assert!(json_results("<html>block page</html>").is_err());
    }

    #[test]
    fn test_excluded_href_prefixes() {
        assert!(is_excluded_href("http://www.google.com/search?q=rust"));
        assert!(is_excluded_href("https://duckduckgo.com/y.js?ad_domain=x"));
        assert!(!is_excluded_href("https://example.com"));
    }
}
