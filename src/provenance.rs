//! Editorial history document (`content/streams/publication_process.xml`).
//!
//! File references carry a `dc:relation` with the same stream-relative path
//! the stager writes to, so every reference resolves inside the package.
use crate::config::ReviewRole;
use crate::dublin_core::{
    map_publication, to_elements, DublinCoreSource, DC_NAMESPACE, VOCABULARY_LANG,
    XSI_NAMESPACE,
};
use crate::inventory::{AssignmentEntry, Bucket, PackageFile, PackageInventory, RoundEntry};
use crate::model::{Note, ReviewComment, Timestamp};
use crate::xml::{text_element, Element};

pub const PROVENANCE_SCHEMA_LOCATION: &str = "publication_process.xsd";

/// Resource type for every file reference.
const FILE_TYPE: &str = "preprint";
/// Resource type tag on decision nodes.
const DECISION_TYPE: &str = "peer_review";

/// Build the `article` tree for one package.
pub fn build_provenance(inventory: &PackageInventory) -> Element {
    let mut article = Element::new("article")
        .with_attr("xmlns:xsi", XSI_NAMESPACE)
        .with_attr("xmlns:dc", DC_NAMESPACE)
        .with_attr("xsi:schemaLocation", PROVENANCE_SCHEMA_LOCATION);

    let mut source = Element::new("article_source");
    source.extend(to_elements(&map_publication(
        &DublinCoreSource::from_inventory(inventory),
    )));
    article.push(source);

    for file in &inventory.manuscript {
        article.push(file_reference(inventory, file, "manuscript", Bucket::Manuscript));
    }

    for round in inventory.review.rounds() {
        article.push(round_node(inventory, round));
        for assignment in &round.assignments {
            article.push(assignment_node(inventory, round, assignment));
        }
    }
    article.push(discussion_node(inventory));

    for file in &inventory.publication_proof {
        article.push(file_reference(
            inventory,
            file,
            "publication_proof",
            Bucket::PublicationProof,
        ));
    }
    article
}

fn round_node(inventory: &PackageInventory, entry: &RoundEntry) -> Element {
    let round_id = entry.round.id;
    let mut node = Element::new("peer_review");
    push_review_files(
        &mut node,
        inventory,
        &inventory.review.round_files(round_id, ReviewRole::Reviewed),
        ReviewRole::Reviewed,
    );
    if let Some(decision) = &entry.decision {
        node.push(decision_node(
            decision.decision.label(),
            inventory.person(decision.editor_id),
            decision.date_decided,
        ));
    }
    push_review_files(
        &mut node,
        inventory,
        &inventory.review.round_files(round_id, ReviewRole::Revised),
        ReviewRole::Revised,
    );
    node
}

/// An assignment's view: its own files first, then the round's files for the
/// same role.
fn assignment_node(
    inventory: &PackageInventory,
    round: &RoundEntry,
    entry: &AssignmentEntry,
) -> Element {
    let assignment = &entry.assignment;
    let mut node = Element::new("peer_review");
    for role in ReviewRole::ALL {
        push_review_files(&mut node, inventory, entry.own_files(role), role);
        push_review_files(
            &mut node,
            inventory,
            &inventory.review.round_files(round.round.id, role),
            role,
        );
        if role == ReviewRole::Reviewed {
            let label = assignment
                .recommendation
                .map(|recommendation| recommendation.label())
                .unwrap_or_default();
            node.push(decision_node(
                label,
                inventory.person(Some(assignment.reviewer_id)),
                assignment.decision_date(),
            ));
        }
    }
    for comment in &entry.comments {
        node.push(review_comment(inventory, comment));
    }
    node
}

fn discussion_node(inventory: &PackageInventory) -> Element {
    let mut node = Element::new("peer_review");
    for note in &inventory.notes {
        node.push(note_comment(inventory, note));
    }
    node
}

fn push_review_files(
    node: &mut Element,
    inventory: &PackageInventory,
    files: &[PackageFile],
    role: ReviewRole,
) {
    for file in files {
        node.push(file_reference(inventory, file, role.node_name(), Bucket::PeerReview));
    }
}

fn decision_node(label: &str, creator: Option<&str>, date: Option<Timestamp>) -> Element {
    let mut decision = Element::new("decision").with_text(label);
    decision.push(text_element("dc:type", DECISION_TYPE));
    decision.push(text_element("dc:creator", creator.unwrap_or_default()));
    if let Some(date) = date {
        decision.push(text_element("dc:date", date.date_string()));
    }
    decision
}

/// `<node_name>` describing one staged file.
fn file_reference(
    inventory: &PackageInventory,
    file: &PackageFile,
    node_name: &str,
    bucket: Bucket,
) -> Element {
    let mut node = Element::new(node_name);
    let creators: Vec<&str> = file.file.creator.non_empty().map(|(_, name)| name).collect();
    if creators.is_empty() {
        let uploader = inventory.person(file.file.uploader_user_id).unwrap_or_default();
        node.push(text_element("dc:creator", uploader));
    } else {
        node.extend(creators.into_iter().map(|name| text_element("dc:creator", name)));
    }
    node.push(text_element("dc:date", file.file.created_at.date_string()));
    node.push(text_element("dc:type", FILE_TYPE).with_attr("xml:lang", VOCABULARY_LANG));
    node.push(text_element("dc:format", file.file.mimetype.trim()));
    node.push(text_element("dc:relation", bucket.relative_path(file)));
    node
}

fn review_comment(inventory: &PackageInventory, comment: &ReviewComment) -> Element {
    let mut node = Element::new("comment").with_cdata(&comment.body);
    if let Some(title) = comment.title.as_deref().filter(|title| !title.is_empty()) {
        node.push(text_element("dc:title", title));
    }
    if let Some(posted) = comment.date_posted {
        node.push(text_element("dc:date", posted.date_string()));
    }
    node.push(text_element(
        "dc:creator",
        inventory.person(comment.author_id).unwrap_or_default(),
    ));
    node
}

fn note_comment(inventory: &PackageInventory, note: &Note) -> Element {
    let mut node = Element::new("comment").with_cdata(&note.contents);
    if let Some(created) = note.date_created {
        node.push(text_element("dc:date", created.date_string()));
    }
    node.push(text_element(
        "dc:creator",
        inventory.person(note.user_id).unwrap_or_default(),
    ));
    node.push(text_element("dc:title", note.title.as_deref().unwrap_or_default()));
    node
}

/// Every `dc:relation` under a file reference, in document order. The
/// descriptive block is skipped; its relations are galley slugs, not paths.
pub fn file_relations(article: &Element) -> Vec<String> {
    article
        .elements()
        .filter(|child| child.name != "article_source")
        .flat_map(|child| child.descendants_named("dc:relation"))
        .map(Element::text)
        .collect()
}

#[cfg(test)]
#[path = "provenance_tests.rs"]
mod tests;
