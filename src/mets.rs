//! Structural and administrative package document (`content/mets.xml`).
//!
//! Every content object gets the same identifier in three places: its
//! administrative section (`<id>-amd`), its file entry (`<id>`), and its
//! structure-map pointer (`<id>`). [`check_identifiers`] verifies that on a
//! finished tree before it is written.
use crate::config::PackageLabels;
use crate::dublin_core::{
    map_publication, to_elements, DublinCoreSource, DCTERMS_NAMESPACE, DC_NAMESPACE,
    XSI_NAMESPACE,
};
use crate::inventory::{Bucket, PackageFile, PackageInventory};
use crate::paths::PROVENANCE_FILE_NAME;
use crate::xml::{text_element, Element};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

pub const METS_NAMESPACE: &str = "http://www.loc.gov/METS/";
pub const DNX_NAMESPACE: &str = "http://www.exlibrisgroup.com/dps/dnx";
pub const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

pub const ADMIN_SUFFIX: &str = "-amd";
pub const PROVENANCE_OBJECT_ID: &str = "publication_process";
const PACKAGE_SECTION: &str = "ie";
const REPRESENTATION_SECTION: &str = "rep1";
const DESCRIPTIVE_SECTION_ID: &str = "ie-dmd";
const STRUCT_MAP_ID: &str = "structmap-1";

/// A content object as the document describes it.
#[derive(Debug, Clone)]
struct MetsObject {
    id: String,
    /// Location relative to `content/streams`.
    href: String,
    name: String,
    created: String,
    modified: String,
}

impl MetsObject {
    fn from_file(id: String, href: String, file: &PackageFile) -> Self {
        MetsObject {
            id,
            href,
            name: file.name.clone(),
            created: file.file.created_at.date_string(),
            modified: file.file.updated_at.date_string(),
        }
    }
}

struct BucketObjects {
    bucket: Bucket,
    entries: Vec<(u64, MetsObject)>,
}

fn collect_objects(
    inventory: &PackageInventory,
    build_date: NaiveDate,
) -> (Vec<MetsObject>, MetsObject, Vec<BucketObjects>) {
    let galleys = inventory
        .galleys
        .iter()
        .map(|entry| {
            MetsObject::from_file(entry.id.clone(), entry.file.name.clone(), &entry.file)
        })
        .collect();
    let today = build_date.format("%Y-%m-%d").to_string();
    let provenance = MetsObject {
        id: PROVENANCE_OBJECT_ID.to_string(),
        href: PROVENANCE_FILE_NAME.to_string(),
        name: PROVENANCE_FILE_NAME.to_string(),
        created: today.clone(),
        modified: today,
    };
    let buckets = Bucket::ALL
        .into_iter()
        .map(|bucket| BucketObjects {
            bucket,
            entries: inventory
                .bucket(bucket)
                .iter()
                .map(|file| {
                    let object = MetsObject::from_file(
                        bucket.object_id(file.id()),
                        bucket.relative_path(file),
                        file,
                    );
                    (file.id(), object)
                })
                .collect(),
        })
        .collect();
    (galleys, provenance, buckets)
}

/// Build the `mets:mets` tree for one package.
pub fn build_mets(
    inventory: &PackageInventory,
    labels: &PackageLabels,
    build_date: NaiveDate,
) -> Element {
    let (galleys, provenance, buckets) = collect_objects(inventory, build_date);
    let objects: Vec<&MetsObject> = galleys
        .iter()
        .chain(std::iter::once(&provenance))
        .chain(buckets.iter().flat_map(|b| b.entries.iter().map(|(_, object)| object)))
        .collect();

    let mut root = Element::new("mets:mets")
        .with_attr("xmlns:mets", METS_NAMESPACE)
        .with_attr("xmlns:dcterms", DCTERMS_NAMESPACE)
        .with_attr("xmlns:dnx", DNX_NAMESPACE)
        .with_attr("xmlns:xlink", XLINK_NAMESPACE);

    root.push(descriptive_section(inventory));
    root.push(package_section(inventory, labels));
    root.push(representation_section());
    for object in &objects {
        root.push(object_section(object));
    }
    root.push(file_section(&objects));
    root.push(struct_map(&galleys, &provenance, &buckets));
    root
}

fn descriptive_section(inventory: &PackageInventory) -> Element {
    let statements = map_publication(&DublinCoreSource::from_inventory(inventory));
    let mut record = Element::new("dc:record")
        .with_attr("xmlns:dc", DC_NAMESPACE)
        .with_attr("xmlns:dcterms", DCTERMS_NAMESPACE)
        .with_attr("xmlns:xsi", XSI_NAMESPACE);
    record.extend(to_elements(&statements));
    Element::new("mets:dmdSec")
        .with_attr("ID", DESCRIPTIVE_SECTION_ID)
        .with_child(
            Element::new("mets:mdWrap")
                .with_attr("MDTYPE", "DC")
                .with_child(Element::new("mets:xmlData").with_child(record)),
        )
}

fn package_section(inventory: &PackageInventory, labels: &PackageLabels) -> Element {
    let identifier = inventory
        .publication
        .doi()
        .map(str::to_string)
        .unwrap_or_else(|| inventory.submission.id.to_string());
    admin_section(
        PACKAGE_SECTION,
        vec![
            dnx_section(
                "generalIECharacteristics",
                &[
                    ("submissionReason", labels.submission_reason.as_str()),
                    ("status", "ACTIVE"),
                    ("IEEntityType", labels.ie_entity_type.as_str()),
                ],
            ),
            dnx_section(
                "objectIdentifier",
                &[
                    ("objectIdentifierType", labels.object_identifier_type.as_str()),
                    ("objectIdentifierValue", identifier.as_str()),
                ],
            ),
        ],
    )
}

fn representation_section() -> Element {
    admin_section(
        REPRESENTATION_SECTION,
        vec![dnx_section(
            "generalRepCharacteristics",
            &[
                ("preservationType", "PRESERVATION_MASTER"),
                ("usageType", "VIEW"),
                ("DigitalOriginal", "true"),
                ("RevisionNumber", "1"),
            ],
        )],
    )
}

fn object_section(object: &MetsObject) -> Element {
    admin_section(
        &object.id,
        vec![dnx_section(
            "generalFileCharacteristics",
            &[
                ("label", ""),
                ("note", ""),
                ("fileOriginalName", object.name.as_str()),
                ("fileOriginalPath", object.href.as_str()),
                ("fileSizeBytes", ""),
                ("fileCreationDate", object.created.as_str()),
                ("fileModificationDate", object.modified.as_str()),
            ],
        )],
    )
}

/// `mets:amdSec` with one technical record and empty rights, source, and
/// provenance placeholders.
fn admin_section(object_id: &str, sections: Vec<Element>) -> Element {
    let admin_id = format!("{object_id}{ADMIN_SUFFIX}");
    let mut tech = Element::new("mets:techMD").with_attr("ID", format!("{admin_id}-tech"));
    tech.push(dnx_wrap(sections));
    let mut amd = Element::new("mets:amdSec")
        .with_attr("ID", admin_id.as_str())
        .with_child(tech);
    for (element, suffix) in [
        ("mets:rightsMD", "rights"),
        ("mets:sourceMD", "source"),
        ("mets:digiprovMD", "digiprov"),
    ] {
        amd.push(
            Element::new(element)
                .with_attr("ID", format!("{admin_id}-{suffix}"))
                .with_child(dnx_wrap(Vec::new())),
        );
    }
    amd
}

fn dnx_wrap(sections: Vec<Element>) -> Element {
    let mut dnx = Element::new("dnx").with_attr("xmlns", DNX_NAMESPACE);
    dnx.extend(sections);
    Element::new("mets:mdWrap")
        .with_attr("MDTYPE", "OTHER")
        .with_attr("OTHERMDTYPE", "dnx")
        .with_child(Element::new("mets:xmlData").with_child(dnx))
}

fn dnx_section(id: &str, keys: &[(&str, &str)]) -> Element {
    let mut record = Element::new("record");
    record.extend(
        keys.iter()
            .map(|(key, value)| text_element("key", *value).with_attr("id", *key)),
    );
    Element::new("section").with_attr("id", id).with_child(record)
}

fn file_section(objects: &[&MetsObject]) -> Element {
    let mut group = Element::new("mets:fileGrp")
        .with_attr("ID", REPRESENTATION_SECTION)
        .with_attr("ADMID", format!("{REPRESENTATION_SECTION}{ADMIN_SUFFIX}"));
    for object in objects {
        group.push(
            Element::new("mets:file")
                .with_attr("ID", object.id.as_str())
                .with_attr("ADMID", format!("{}{ADMIN_SUFFIX}", object.id))
                .with_child(
                    Element::new("mets:FLocat")
                        .with_attr("LOCTYPE", "URL")
                        .with_attr("xlink:href", object.href.as_str()),
                ),
        );
    }
    Element::new("mets:fileSec").with_child(group)
}

fn file_leaf(label: &str, object_id: &str) -> Element {
    Element::new("mets:div")
        .with_attr("LABEL", label)
        .with_attr("TYPE", "FILE")
        .with_child(Element::new("mets:fptr").with_attr("FILEID", object_id))
}

fn struct_map(
    galleys: &[MetsObject],
    provenance: &MetsObject,
    buckets: &[BucketObjects],
) -> Element {
    let mut contents = Element::new("mets:div").with_attr("LABEL", "Table of Contents");
    for galley in galleys {
        contents.push(file_leaf(&galley.name, &galley.id));
    }
    contents.push(file_leaf(&provenance.name, &provenance.id));
    for group in buckets {
        let mut division = Element::new("mets:div").with_attr("LABEL", group.bucket.as_str());
        for (file_id, object) in &group.entries {
            division.push(
                Element::new("mets:div")
                    .with_attr("LABEL", file_id.to_string())
                    .with_child(file_leaf(&object.name, &object.id)),
            );
        }
        contents.push(division);
    }
    Element::new("mets:structMap")
        .with_attr("ID", STRUCT_MAP_ID)
        .with_attr("TYPE", "LOGICAL")
        .with_child(
            Element::new("mets:div")
                .with_attr("LABEL", "PRESERVATION_MASTER")
                .with_child(contents),
        )
}

/// A content object whose identifiers disagree between sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentifierIssue {
    pub object_id: String,
    pub problem: String,
}

/// Object ids found in each of the three cross-referencing sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectIdentifiers {
    pub admin: BTreeSet<String>,
    pub files: BTreeSet<String>,
    pub struct_map: BTreeSet<String>,
}

/// Gather object ids from an `mets:mets` tree, leaving out the package and
/// representation sections.
pub fn object_identifiers(mets: &Element) -> ObjectIdentifiers {
    let reserved = [PACKAGE_SECTION, REPRESENTATION_SECTION];
    let admin = mets
        .children_named("mets:amdSec")
        .filter_map(|section| section.attr("ID"))
        .filter_map(|id| id.strip_suffix(ADMIN_SUFFIX))
        .filter(|id| !reserved.contains(id))
        .map(str::to_string)
        .collect();
    let files = mets
        .descendants_named("mets:file")
        .into_iter()
        .filter_map(|file| file.attr("ID"))
        .map(str::to_string)
        .collect();
    let struct_map = mets
        .descendants_named("mets:fptr")
        .into_iter()
        .filter_map(|pointer| pointer.attr("FILEID"))
        .map(str::to_string)
        .collect();
    ObjectIdentifiers {
        admin,
        files,
        struct_map,
    }
}

/// Check that every object appears under one identifier in the admin
/// sections, the file inventory, and the structure map.
pub fn check_identifiers(mets: &Element) -> Vec<IdentifierIssue> {
    let ids = object_identifiers(mets);
    let mut issues: BTreeMap<String, Vec<String>> = BTreeMap::new();

    let all: BTreeSet<&String> = ids
        .admin
        .iter()
        .chain(&ids.files)
        .chain(&ids.struct_map)
        .collect();
    for id in all {
        for (section, present) in [
            ("administrative section", ids.admin.contains(id)),
            ("file inventory", ids.files.contains(id)),
            ("structure map", ids.struct_map.contains(id)),
        ] {
            if !present {
                issues
                    .entry(id.clone())
                    .or_default()
                    .push(format!("missing from {section}"));
            }
        }
    }

    for file in mets.descendants_named("mets:file") {
        let Some(id) = file.attr("ID") else {
            continue;
        };
        let expected = format!("{id}{ADMIN_SUFFIX}");
        if file.attr("ADMID") != Some(expected.as_str()) {
            issues
                .entry(id.to_string())
                .or_default()
                .push(format!("ADMID is not {expected}"));
        }
        let href = file
            .child("mets:FLocat")
            .and_then(|locator| locator.attr("xlink:href"))
            .unwrap_or_default();
        if href.is_empty() {
            issues
                .entry(id.to_string())
                .or_default()
                .push("file entry has no location".to_string());
        }
    }

    issues
        .into_iter()
        .flat_map(|(object_id, problems)| {
            problems.into_iter().map(move |problem| IdentifierIssue {
                object_id: object_id.clone(),
                problem,
            })
        })
        .collect()
}

/// Stream-relative locations of every file entry.
pub fn file_locations(mets: &Element) -> Vec<(String, String)> {
    mets.descendants_named("mets:file")
        .into_iter()
        .filter_map(|file| {
            let id = file.attr("ID")?;
            let href = file.child("mets:FLocat")?.attr("xlink:href")?;
            Some((id.to_string(), href.to_string()))
        })
        .collect()
}

#[cfg(test)]
#[path = "mets_tests.rs"]
mod tests;
