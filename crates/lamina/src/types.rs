//! Output data model.
//!
//! These are the types that end up in serialized artifacts: one
//! [`IngestedDocument`] per input file, holding typed, geometrically-located
//! [`DocumentElement`]s in global reading order. [`LayoutElement`] and
//! [`PageLayout`] are the ephemeral detector-side types consumed during one
//! page's processing and never persisted.

use crate::geometry::BoundingBox;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

/// Semantic category of a page region, as emitted by the layout detector.
///
/// Closed vocabulary; any detector label outside it maps to [`Unknown`]
/// (see [`ElementType::from_label`]).
///
/// [`Unknown`]: ElementType::Unknown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElementType {
    Caption,
    Footnote,
    Formula,
    ListItem,
    PageFooter,
    PageHeader,
    Image,
    SectionHeader,
    Table,
    Text,
    Title,
    Unknown,
}

impl ElementType {
    /// Map a detection-model label to its element type, case-insensitively.
    /// Unrecognized labels fall back to `Unknown`.
    pub fn from_label(label: &str) -> Self {
        const LABELS: [(&str, ElementType); 11] = [
            ("Caption", ElementType::Caption),
            ("Footnote", ElementType::Footnote),
            ("Formula", ElementType::Formula),
            ("List-item", ElementType::ListItem),
            ("Page-footer", ElementType::PageFooter),
            ("Page-header", ElementType::PageHeader),
            ("Picture", ElementType::Image),
            ("Section-header", ElementType::SectionHeader),
            ("Table", ElementType::Table),
            ("Text", ElementType::Text),
            ("Title", ElementType::Title),
        ];

        LABELS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(label))
            .map(|(_, ty)| *ty)
            .unwrap_or(ElementType::Unknown)
    }
}

/// Where an element sits in the document: 1-based page plus page-space box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub page_number: u32,
    pub bbox: BoundingBox,
}

/// The payload of one element. Exactly one variant per element; the
/// `contentType` tag drives serialization so downstream consumers never
/// inspect a shared base type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "contentType", rename_all_fields = "camelCase")]
pub enum Content {
    #[serde(rename = "TEXT")]
    Text { text: String },
    #[serde(rename = "TABLE")]
    Table { csv: String },
    #[serde(rename = "IMAGE")]
    Image { storage_ref: String },
}

/// Section-hierarchy context, reserved for downstream enrichment.
///
/// The core pipeline never populates this; it exists so artifacts keep a
/// stable shape once a hierarchy pass is added behind the ingestion step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyContext {
    pub parent_section_id: String,
    pub parent_section_title: String,
    pub hierarchy_level: u32,
    pub is_continuation: bool,
}

/// One typed, located piece of content. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentElement {
    pub id: String,
    pub element_type: ElementType,
    pub location: Location,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<HierarchyContext>,
    pub content: Content,
}

impl DocumentElement {
    /// Create an element with a fresh id and no hierarchy context.
    pub fn new(element_type: ElementType, location: Location, content: Content) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            element_type,
            location,
            context: None,
            content,
        }
    }

    /// Global reading order: page number ascending, then in-page geometric
    /// order per [`BoundingBox::compare_reading_order`].
    pub fn reading_order(a: &DocumentElement, b: &DocumentElement) -> Ordering {
        a.location
            .page_number
            .cmp(&b.location.page_number)
            .then_with(|| BoundingBox::compare_reading_order(&a.location.bbox, &b.location.bbox))
    }
}

/// One ML-detected page region. Consumed by the pipeline and discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutElement {
    pub element_type: ElementType,
    pub bbox: BoundingBox,
    pub confidence: f32,
}

/// All detections for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub page_number: u32,
    pub elements: Vec<LayoutElement>,
}

/// Per-file provenance recorded alongside the elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub filename: String,
    /// sha-256 hex digest of the raw input bytes.
    pub file_hash: String,
    pub total_pages: u32,
    pub processing_time_ms: u64,
}

/// The terminal artifact of one file's pipeline.
///
/// Invariant: `elements` is always fully sorted by global reading order
/// before the document is handed to any collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestedDocument {
    pub id: String,
    pub metadata: DocumentMetadata,
    pub elements: Vec<DocumentElement>,
}

impl IngestedDocument {
    /// Wrap sorted elements and metadata with a fresh document id.
    pub fn new(metadata: DocumentMetadata, elements: Vec<DocumentElement>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            metadata,
            elements,
        }
    }
}
