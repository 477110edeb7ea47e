//! Dublin Core statements for a publication.
//!
//! The mapper yields an ordered list of statements; both generated documents
//! render the same list, so descriptive metadata never drifts between them.
use crate::inventory::{GalleyEntry, JournalSource, PackageInventory};
use crate::model::Publication;
use crate::text::{primary_subtag, strip_html};
use crate::xml::Element;

pub const DC_NAMESPACE: &str = "http://purl.org/dc/elements/1.1/";
pub const DCTERMS_NAMESPACE: &str = "http://purl.org/dc/terms/";
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Controlled-vocabulary language tag on fixed type statements.
pub const VOCABULARY_LANG: &str = "en-US";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DcElement {
    Title,
    Creator,
    Subject,
    Description,
    Publisher,
    Contributor,
    Date,
    Type,
    Format,
    Identifier,
    Source,
    Language,
    Relation,
    Coverage,
    Rights,
}

impl DcElement {
    pub fn qualified_name(self) -> &'static str {
        match self {
            DcElement::Title => "dc:title",
            DcElement::Creator => "dc:creator",
            DcElement::Subject => "dc:subject",
            DcElement::Description => "dc:description",
            DcElement::Publisher => "dc:publisher",
            DcElement::Contributor => "dc:contributor",
            DcElement::Date => "dc:date",
            DcElement::Type => "dc:type",
            DcElement::Format => "dc:format",
            DcElement::Identifier => "dc:identifier",
            DcElement::Source => "dc:source",
            DcElement::Language => "dc:language",
            DcElement::Relation => "dc:relation",
            DcElement::Coverage => "dc:coverage",
            DcElement::Rights => "dc:rights",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DcStatement {
    pub element: DcElement,
    pub value: String,
    pub lang: Option<String>,
    /// Identifier scheme (`url`, `doi`), written as a `type` attribute.
    pub scheme: Option<&'static str>,
}

impl DcStatement {
    pub fn new(element: DcElement, value: impl Into<String>) -> Self {
        DcStatement {
            element,
            value: value.into(),
            lang: None,
            scheme: None,
        }
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    fn with_scheme(mut self, scheme: &'static str) -> Self {
        self.scheme = Some(scheme);
        self
    }

    pub fn to_element(&self) -> Element {
        let mut element = Element::new(self.element.qualified_name());
        if let Some(lang) = &self.lang {
            element.set_attr("xml:lang", lang.as_str());
        }
        if let Some(scheme) = self.scheme {
            element.set_attr("type", scheme);
        }
        element.with_text(self.value.as_str())
    }
}

/// Everything the mapper reads besides the publication itself.
#[derive(Debug, Clone, Copy)]
pub struct DublinCoreSource<'a> {
    pub publication: &'a Publication,
    pub submission_id: u64,
    pub galleys: &'a [GalleyEntry],
    pub journal: Option<&'a JournalSource>,
}

impl<'a> DublinCoreSource<'a> {
    pub fn from_inventory(inventory: &'a PackageInventory) -> Self {
        DublinCoreSource {
            publication: &inventory.publication,
            submission_id: inventory.submission.id,
            galleys: &inventory.galleys,
            journal: inventory.source.as_ref(),
        }
    }
}

/// Map a publication to statements in fixed element order. Empty or missing
/// values are skipped, never emitted as placeholders.
pub fn map_publication(source: &DublinCoreSource<'_>) -> Vec<DcStatement> {
    let publication = source.publication;
    let locale = publication.locale.as_str();
    let lang = primary_subtag(locale);
    let mut out = Vec::new();

    if let Some(title) = publication.full_title(locale).map(|t| strip_html(&t)) {
        if !title.is_empty() {
            out.push(DcStatement::new(DcElement::Title, title).with_lang(lang.as_str()));
        }
    }

    for author in publication.ordered_authors() {
        push_text(&mut out, DcElement::Creator, &author.full_name(locale), None);
    }

    for list in [&publication.keywords, &publication.subjects] {
        for (keyword_locale, keyword) in list.non_empty() {
            push_text(&mut out, DcElement::Subject, keyword, Some(keyword_locale));
        }
    }

    for (abstract_locale, text) in publication.abstract_text.non_empty() {
        push_text(&mut out, DcElement::Description, text, Some(abstract_locale));
    }

    if let Some(journal) = source.journal {
        for (name_locale, name) in journal.journal.name.non_empty() {
            push_text(&mut out, DcElement::Publisher, name, Some(name_locale));
        }
    }

    for (agency_locale, agency) in publication.supporting_agencies.non_empty() {
        push_text(&mut out, DcElement::Contributor, agency, Some(agency_locale));
    }

    if let Some(published) = publication.date_published {
        out.push(DcStatement::new(DcElement::Date, published.date_string()));
    }

    out.push(DcStatement::new(DcElement::Type, "journal article").with_lang(VOCABULARY_LANG));

    for entry in source.galleys {
        let mimetype = entry.file.file.mimetype.trim();
        if !mimetype.is_empty() {
            out.push(DcStatement::new(DcElement::Format, mimetype));
        }
    }

    let slug = publication
        .url_path
        .as_deref()
        .map(str::trim)
        .filter(|slug| !slug.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| source.submission_id.to_string());
    out.push(DcStatement::new(DcElement::Identifier, slug).with_scheme("url"));
    if let Some(doi) = publication.doi() {
        out.push(DcStatement::new(DcElement::Identifier, doi).with_scheme("doi"));
    }

    if let Some(journal) = source.journal {
        let issue_label = issue_label(journal);
        for (name_locale, name) in journal.journal.name.non_empty() {
            let name = strip_html(name);
            let value = match &issue_label {
                Some(label) => format!("{name}; {label}"),
                None => name,
            };
            let statement = DcStatement::new(DcElement::Source, value);
            out.push(statement.with_lang(primary_subtag(name_locale)));
        }
        for issn in journal.journal.issns() {
            out.push(DcStatement::new(DcElement::Source, issn));
        }
    }

    if !lang.is_empty() {
        out.push(DcStatement::new(DcElement::Language, lang.as_str()));
    }

    for galley in publication.ordered_galleys() {
        if let Some(slug) = galley.url_path.as_deref().map(str::trim) {
            if !slug.is_empty() {
                out.push(DcStatement::new(DcElement::Relation, slug));
            }
        }
    }

    for (coverage_locale, coverage) in publication.coverage.non_empty() {
        push_text(&mut out, DcElement::Coverage, coverage, Some(coverage_locale));
    }

    let holder = publication.copyright_holder.preferred(locale).map(strip_html);
    if let (Some(holder), Some(year)) = (holder, publication.copyright_year) {
        if !holder.is_empty() {
            out.push(DcStatement::new(DcElement::Rights, format!("{holder} {year}")));
        }
    }
    if let Some(license) = publication.license_url.as_deref().map(str::trim) {
        if !license.is_empty() {
            out.push(DcStatement::new(DcElement::Rights, license));
        }
    }

    out
}

/// `Vol. 7 (2023)`, or whichever half is known.
fn issue_label(journal: &JournalSource) -> Option<String> {
    match (journal.volume.as_deref(), journal.year.as_deref()) {
        (Some(volume), Some(year)) => Some(format!("Vol. {volume} ({year})")),
        (Some(volume), None) => Some(format!("Vol. {volume}")),
        (None, Some(year)) => Some(format!("({year})")),
        (None, None) => None,
    }
}

fn push_text(out: &mut Vec<DcStatement>, element: DcElement, raw: &str, locale: Option<&str>) {
    let value = strip_html(raw);
    if value.is_empty() {
        return;
    }
    let statement = DcStatement::new(element, value);
    out.push(match locale {
        Some(locale) => statement.with_lang(primary_subtag(locale)),
        None => statement,
    });
}

/// Render statements as `dc:*` elements in order.
pub fn to_elements(statements: &[DcStatement]) -> Vec<Element> {
    statements.iter().map(DcStatement::to_element).collect()
}

#[cfg(test)]
#[path = "dublin_core_tests.rs"]
mod tests;
