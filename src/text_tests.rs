use super::*;

#[test]
fn strips_tags_and_decodes_once() {
    assert_eq!(strip_html("On <i>Archives</i> &amp; Time"), "On Archives & Time");
    assert_eq!(strip_html("<p>One</p>\n  <p>Two</p>"), "One Two");
    assert_eq!(strip_html("H<sub>2</sub>O"), "H2O");
    assert_eq!(strip_html("a &amp;lt; b"), "a &lt; b");
}

#[test]
fn decodes_numeric_references_and_keeps_unknown_ones() {
    assert_eq!(decode_entities("&#228;&#xE4;"), "ää");
    assert_eq!(decode_entities("&bogus; &#xFFFFFF;"), "&bogus; &#xFFFFFF;");
}

#[test]
fn primary_subtag_truncates_locale() {
    assert_eq!(primary_subtag("en_US"), "en");
    assert_eq!(primary_subtag("de-DE"), "de");
    assert_eq!(primary_subtag("sr@latin"), "sr");
    assert_eq!(primary_subtag(""), "");
}
