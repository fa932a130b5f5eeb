//! Heuristics for pulling playtime estimates out of HowLongToBeat markup.
//!
//! The markup is not under our control and changes often, so extraction is a
//! chain of progressively blunter strategies. Each one only fills the fields
//! that are still empty.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::html::{Node, Page, Query};

/// Inner markup beyond this many characters is never scanned.
pub const RAW_SCAN_LIMIT: usize = 20_000;
/// Extracted values longer than this are assumed to be a selector gone wrong.
pub const OVERSIZED_VALUE: usize = 300;
pub const TRUNCATED_VALUE: usize = 200;

const MAIN_LABELS: &[&str] = &["Main Story", "Main"];
const COMPLETIONIST_LABELS: &[&str] = &["Completionist"];

// The selectors are static, so a parse failure is a programming error.
fn query(css: &str) -> Query {
    Query::parse(css).expect("static selector must parse")
}

static TIME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[0-9]{1,3}(?:[.,][0-9]+)?½?\s*(?:hours|hour|hrs|hr|h)")
        .expect("static regex must compile")
});
static MAIN_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bmain\b").expect("static regex must compile"));

static SEARCH_RESULT: Lazy<Query> = Lazy::new(|| query(".search_list_details, .search_list_box"));
static RESULT_LINK: Lazy<Query> = Lazy::new(|| query("a[href]"));
static PAGE_TITLE: Lazy<Query> = Lazy::new(|| query("h1, .profile_title, .game_title"));
static SMALL_TEXT: Lazy<Query> = Lazy::new(|| query("span, div, p, li"));
static MAIN_REGIONS: Lazy<Vec<Query>> = Lazy::new(|| {
    ["#main_content", ".game_page", ".profile", ".content", "body"]
        .iter()
        .map(|css| query(css))
        .collect()
});

/// First time-like substring of `s`, e.g. `"25 Hours"` or `"53½ Hours"`.
pub fn find_time(s: &str) -> Option<String> {
    if s.trim().is_empty() {
        return None;
    }
    TIME_PATTERN.find(s).map(|m| m.as_str().trim().to_owned())
}

/// Cut oversized values down to something displayable.
pub fn normalize_value(value: String) -> String {
    if value.chars().count() > OVERSIZED_VALUE {
        value
            .chars()
            .take(TRUNCATED_VALUE)
            .collect::<String>()
            .trim()
            .to_owned()
    } else {
        value
    }
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn non_empty(s: String) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_owned())
    }
}

/// What the search results page told us about the best match.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: Option<String>,
    /// Link to the detail page, as written in the markup.
    pub detail_href: Option<String>,
}

pub fn first_result(page: &Page) -> SearchHit {
    match page.select_first(&SEARCH_RESULT) {
        Some(result) => match result.select_first(&RESULT_LINK) {
            Some(link) => SearchHit {
                title: non_empty(link.text()),
                detail_href: link.attr("href").and_then(|h| non_empty(h.to_owned())),
            },
            None => SearchHit {
                title: non_empty(result.text()),
                detail_href: None,
            },
        },
        None => SearchHit {
            title: page_title(page),
            detail_href: None,
        },
    }
}

/// Title element of a detail page, if it has one.
pub fn page_title(page: &Page) -> Option<String> {
    page.select_first(&PAGE_TITLE).and_then(|t| non_empty(t.text()))
}

/// The part of the page the stats live in, so footers and navigation are not
/// mistaken for playtimes.
pub fn main_region(page: &Page) -> Node<'_> {
    MAIN_REGIONS
        .iter()
        .find_map(|q| page.select_first(q))
        .unwrap_or_else(|| page.root())
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractedTimes {
    pub main: Option<String>,
    pub completionist: Option<String>,
}

impl ExtractedTimes {
    pub fn is_complete(&self) -> bool {
        self.main.is_some() && self.completionist.is_some()
    }
}

type Strategy = fn(Node<'_>, &mut ExtractedTimes);

/// Tried in order until both values are known.
const STRATEGIES: &[(&str, Strategy)] = &[
    ("label", label_directed),
    ("keyword", keyword_scan),
    ("raw", raw_pattern_scan),
];

pub fn extract_times(region: Node<'_>) -> ExtractedTimes {
    let mut times = ExtractedTimes::default();
    for (name, strategy) in STRATEGIES {
        if times.is_complete() {
            break;
        }
        strategy(region, &mut times);
        log::trace!("after {} strategy: {:?}", name, times);
    }
    times
}

/// Find an element carrying `label` and look around it for a value.
pub fn time_by_label(region: Node<'_>, label: &str) -> Option<String> {
    let needle = label.to_lowercase();
    for el in region
        .descendants()
        .filter(|n| n.own_text().to_lowercase().contains(&needle))
    {
        if let Some(t) = el.next_sibling().and_then(|s| find_time(&s.own_text())) {
            return Some(t);
        }
        if let Some(parent) = el.parent() {
            if let Some(t) = parent
                .select(&SMALL_TEXT)
                .into_iter()
                .find_map(|c| find_time(&c.own_text()))
            {
                return Some(t);
            }
        }
        if let Some(t) = find_time(&el.own_text()) {
            return Some(t);
        }
    }
    None
}

fn first_by_labels(region: Node<'_>, labels: &[&str]) -> Option<String> {
    labels.iter().find_map(|label| time_by_label(region, label))
}

pub fn label_directed(region: Node<'_>, times: &mut ExtractedTimes) {
    if times.main.is_none() {
        times.main = first_by_labels(region, MAIN_LABELS);
    }
    if times.completionist.is_none() {
        times.completionist = first_by_labels(region, COMPLETIONIST_LABELS);
    }
}

/// Look through every small text element for a keyword and a time together.
pub fn keyword_scan(region: Node<'_>, times: &mut ExtractedTimes) {
    for el in region.select(&SMALL_TEXT) {
        let text = el.own_text();
        if text.is_empty() {
            continue;
        }
        let lower = text.to_lowercase();
        if times.main.is_none() && (lower.contains("main story") || MAIN_WORD.is_match(&lower)) {
            times.main = find_time(&text);
        }
        if times.completionist.is_none() && lower.contains("completionist") {
            times.completionist = find_time(&text);
        }
        if times.is_complete() {
            break;
        }
    }
}

/// Last resort: the first two time-like strings in the region's markup.
pub fn raw_pattern_scan(region: Node<'_>, times: &mut ExtractedTimes) {
    let markup = region.inner_html();
    let capped = truncate_chars(&markup, RAW_SCAN_LIMIT);
    let mut found = TIME_PATTERN.find_iter(capped).map(|m| m.as_str().trim());
    let first = found.next();
    if times.main.is_none() {
        times.main = first.map(str::to_owned);
    }
    let second = found.next();
    if times.completionist.is_none() {
        times.completionist = second.map(str::to_owned);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region_times(html: &str) -> ExtractedTimes {
        let page = Page::parse(html, None);
        extract_times(main_region(&page))
    }

    #[test]
    fn time_pattern_variants() {
        assert_eq!(find_time("53½ Hours").as_deref(), Some("53½ Hours"));
        assert_eq!(find_time("about 25h total").as_deref(), Some("25h"));
        assert_eq!(find_time("12.5 hrs").as_deref(), Some("12.5 hrs"));
        assert_eq!(find_time("8,5 hr").as_deref(), Some("8,5 hr"));
        assert_eq!(find_time("25 HOURS").as_deref(), Some("25 HOURS"));
        assert_eq!(find_time("1 Hour").as_deref(), Some("1 Hour"));
    }

    #[test]
    fn time_pattern_needs_a_unit() {
        assert_eq!(find_time("25 minutes"), None);
        assert_eq!(find_time("Released 2015"), None);
        assert_eq!(find_time("   "), None);
        assert_eq!(find_time(""), None);
    }

    #[test]
    fn time_pattern_is_ascii_digits_only() {
        assert_eq!(find_time("٢٥ hours"), None);
        assert_eq!(find_time("２５ Hours"), None);
        assert_eq!(find_time("٢٥ hours or 30 hours").as_deref(), Some("30 hours"));
    }

    #[test]
    fn oversized_values_are_truncated() {
        let blob = format!("25 Hours {}", "x".repeat(400));
        let normalized = normalize_value(blob);
        assert!(normalized.chars().count() <= TRUNCATED_VALUE);
        assert!(normalized.starts_with("25 Hours"));

        let short = "25 Hours".to_owned();
        assert_eq!(normalize_value(short.clone()), short);

        let exactly = "y".repeat(OVERSIZED_VALUE);
        assert_eq!(normalize_value(exactly.clone()), exactly);
    }

    #[test]
    fn truncation_trims_whitespace() {
        let blob = format!("{} {}", "a".repeat(199), "b".repeat(200));
        assert_eq!(normalize_value(blob), "a".repeat(199));
    }

    #[test]
    fn label_with_sibling_value() {
        let times = region_times(
            r#"<html><body><div class="game_page"><ul>
                <li><h4>Main Story</h4><h5>25 Hours</h5></li>
                <li><h4>Main + Extras</h4><h5>51 Hours</h5></li>
                <li><h4>Completionist</h4><h5>173 Hours</h5></li>
            </ul></div></body></html>"#,
        );
        assert_eq!(times.main.as_deref(), Some("25 Hours"));
        assert_eq!(times.completionist.as_deref(), Some("173 Hours"));
    }

    #[test]
    fn label_with_value_elsewhere_in_parent() {
        let page = Page::parse(
            r#"<html><body><div id="main_content">
                <div class="stat"><span>12½ Hours</span><b>Main Story</b></div>
            </div></body></html>"#,
            None,
        );
        let region = main_region(&page);
        assert_eq!(time_by_label(region, "Main Story").as_deref(), Some("12½ Hours"));
    }

    #[test]
    fn label_with_value_in_own_text() {
        let page = Page::parse(
            r#"<html><body><p>Completionist: 40 hrs</p></body></html>"#,
            None,
        );
        let region = main_region(&page);
        assert_eq!(time_by_label(region, "completionist").as_deref(), Some("40 hrs"));
        assert_eq!(time_by_label(region, "Main Story"), None);
    }

    #[test]
    fn main_label_falls_back_to_short_form() {
        let times = region_times(
            r#"<html><body><table>
                <tr><td>Main</td><td>9 Hours</td></tr>
                <tr><td>Completionist</td><td>14 Hours</td></tr>
            </table></body></html>"#,
        );
        assert_eq!(times.main.as_deref(), Some("9 Hours"));
        assert_eq!(times.completionist.as_deref(), Some("14 Hours"));
    }

    #[test]
    fn keyword_scan_fills_missing_values_only() {
        let page = Page::parse(
            r#"<html><body>
                <span>main campaign 30h</span>
                <span>completionist run is 80 hours</span>
            </body></html>"#,
            None,
        );
        let region = main_region(&page);
        let mut times = ExtractedTimes {
            main: Some("kept".to_owned()),
            completionist: None,
        };
        keyword_scan(region, &mut times);
        assert_eq!(times.main.as_deref(), Some("kept"));
        assert_eq!(times.completionist.as_deref(), Some("80 hours"));
    }

    #[test]
    fn keyword_scan_requires_whole_word_main() {
        let page = Page::parse(
            r#"<html><body><span>domain expansion 30h</span></body></html>"#,
            None,
        );
        let mut times = ExtractedTimes::default();
        keyword_scan(main_region(&page), &mut times);
        assert_eq!(times.main, None);
    }

    #[test]
    fn raw_scan_uses_first_two_matches() {
        let page = Page::parse(
            r#"<html><body><div data-main="40 Hours"></div><div data-all="90h"></div><div data-x="7 hr"></div></body></html>"#,
            None,
        );
        let mut times = ExtractedTimes::default();
        raw_pattern_scan(main_region(&page), &mut times);
        assert_eq!(times.main.as_deref(), Some("40 Hours"));
        assert_eq!(times.completionist.as_deref(), Some("90h"));
    }

    #[test]
    fn raw_scan_second_match_goes_to_completionist_even_if_main_known() {
        let page = Page::parse(
            r#"<html><body><i title="40 Hours"></i><i title="90h"></i></body></html>"#,
            None,
        );
        let mut times = ExtractedTimes {
            main: Some("12 Hours".to_owned()),
            completionist: None,
        };
        raw_pattern_scan(main_region(&page), &mut times);
        assert_eq!(times.main.as_deref(), Some("12 Hours"));
        assert_eq!(times.completionist.as_deref(), Some("90h"));
    }

    #[test]
    fn raw_scan_stops_at_limit() {
        let filler = "x".repeat(RAW_SCAN_LIMIT + 10);
        let html = format!(
            r#"<html><body><div>{}</div><div>40 Hours</div></body></html>"#,
            filler
        );
        let page = Page::parse(&html, None);
        let mut times = ExtractedTimes::default();
        raw_pattern_scan(main_region(&page), &mut times);
        assert_eq!(times, ExtractedTimes::default());
    }

    #[test]
    fn main_region_prefers_content_over_body() {
        let page = Page::parse(
            r#"<html><body>
                <div id="main_content"><p>Main Story</p><p>20 Hours</p></div>
                <footer><p>Completionist 999 Hours</p></footer>
            </body></html>"#,
            None,
        );
        let region = main_region(&page);
        assert_eq!(region.attr("id"), Some("main_content"));
        let times = extract_times(region);
        assert_eq!(times.main.as_deref(), Some("20 Hours"));
        assert_eq!(times.completionist, None);
    }

    #[test]
    fn no_times_anywhere() {
        let times = region_times("<html><body><p>Nothing to see</p></body></html>");
        assert_eq!(times, ExtractedTimes::default());
    }

    #[test]
    fn first_result_with_link() {
        let page = Page::parse(
            r#"<html><body><ul>
                <li class="search_list_box"><div class="search_list_details">
                    <h3><a href="/game/10270"> The Witcher 3: Wild Hunt </a></h3>
                </div></li>
                <li class="search_list_box"><a href="/game/1">Other</a></li>
            </ul></body></html>"#,
            None,
        );
        assert_eq!(
            first_result(&page),
            SearchHit {
                title: Some("The Witcher 3: Wild Hunt".to_owned()),
                detail_href: Some("/game/10270".to_owned()),
            }
        );
    }

    #[test]
    fn first_result_without_link() {
        let page = Page::parse(
            r#"<html><body><div class="search_list_details">Portal 2</div></body></html>"#,
            None,
        );
        assert_eq!(
            first_result(&page),
            SearchHit {
                title: Some("Portal 2".to_owned()),
                detail_href: None,
            }
        );
    }

    #[test]
    fn no_results_reads_page_title() {
        let page = Page::parse(
            r#"<html><body><div class="profile_title">Hollow Knight</div></body></html>"#,
            None,
        );
        assert_eq!(first_result(&page).title.as_deref(), Some("Hollow Knight"));
        let empty = Page::parse("<html><body></body></html>", None);
        assert_eq!(first_result(&empty), SearchHit::default());
    }

    #[test]
    fn script_text_is_not_a_label() {
        let times = region_times(
            r#"<html><body>
                <script>var main = 1; var delay = "2h";</script>
                <style>.main::after { content: "3h"; }</style>
                <ul><li><h4>Main</h4><h5>25 Hours</h5></li></ul>
            </body></html>"#,
        );
        assert_eq!(times.main.as_deref(), Some("25 Hours"));
    }
}
