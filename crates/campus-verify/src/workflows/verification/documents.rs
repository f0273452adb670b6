use std::collections::BTreeMap;

use super::domain::{DocumentGroupName, DocumentSide, NormalizedImage, VerificationKind};
use super::error::VerificationError;

/// One side of a physical document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSlot {
    pub side: DocumentSide,
    pub asset: Option<NormalizedImage>,
}

impl DocumentSlot {
    fn empty(side: DocumentSide) -> Self {
        Self { side, asset: None }
    }

    pub fn is_filled(&self) -> bool {
        self.asset.is_some()
    }
}

/// Paired front/back evidence for a single document type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentGroup {
    pub name: DocumentGroupName,
    pub required: bool,
    pub front: DocumentSlot,
    pub back: DocumentSlot,
}

impl DocumentGroup {
    fn new(name: DocumentGroupName, required: bool) -> Self {
        Self {
            name,
            required,
            front: DocumentSlot::empty(DocumentSide::Front),
            back: DocumentSlot::empty(DocumentSide::Back),
        }
    }

    pub fn slot(&self, side: DocumentSide) -> &DocumentSlot {
        match side {
            DocumentSide::Front => &self.front,
            DocumentSide::Back => &self.back,
        }
    }

    fn slot_mut(&mut self, side: DocumentSide) -> &mut DocumentSlot {
        match side {
            DocumentSide::Front => &mut self.front,
            DocumentSide::Back => &mut self.back,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.front.is_filled() && self.back.is_filled()
    }

    /// Both assets as `[front, back]`, only when the group is complete.
    pub fn pair(&self) -> Option<[NormalizedImage; 2]> {
        match (&self.front.asset, &self.back.asset) {
            (Some(front), Some(back)) => Some([front.clone(), back.clone()]),
            _ => None,
        }
    }
}

/// Assembled evidence keyed by group, each entry ordered `[front, back]`.
pub type DocumentPayload = BTreeMap<DocumentGroupName, [NormalizedImage; 2]>;

/// Slot fill state for one verification attempt. Dropped on success or teardown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSet {
    kind: VerificationKind,
    groups: Vec<DocumentGroup>,
}

impl DocumentSet {
    pub fn for_kind(kind: VerificationKind) -> Self {
        let groups = kind
            .layout()
            .iter()
            .map(|spec| DocumentGroup::new(spec.name, spec.required))
            .collect();
        Self { kind, groups }
    }

    pub fn kind(&self) -> VerificationKind {
        self.kind
    }

    pub fn groups(&self) -> &[DocumentGroup] {
        &self.groups
    }

    pub fn group(&self, name: DocumentGroupName) -> Option<&DocumentGroup> {
        self.groups.iter().find(|group| group.name == name)
    }

    /// Unknown groups are never complete.
    pub fn is_complete(&self, name: DocumentGroupName) -> bool {
        self.group(name).is_some_and(DocumentGroup::is_complete)
    }

    pub fn asset(&self, name: DocumentGroupName, side: DocumentSide) -> Option<&NormalizedImage> {
        self.group(name)
            .and_then(|group| group.slot(side).asset.as_ref())
    }

    /// Stores `image` in the slot, returning the asset it replaced.
    pub fn record(
        &mut self,
        name: DocumentGroupName,
        side: DocumentSide,
        image: NormalizedImage,
    ) -> Result<Option<NormalizedImage>, VerificationError> {
        let kind = self.kind;
        let group = self
            .groups
            .iter_mut()
            .find(|group| group.name == name)
            .ok_or(VerificationError::UnknownGroup { kind, group: name })?;

        Ok(group.slot_mut(side).asset.replace(image))
    }

    /// Required groups with at least one empty slot, in layout order.
    pub fn missing_required(&self) -> Vec<DocumentGroupName> {
        self.groups
            .iter()
            .filter(|group| group.required && !group.is_complete())
            .map(|group| group.name)
            .collect()
    }

    /// Complete groups only. A lone image in an optional group is left out.
    pub fn assemble_payload(&self) -> DocumentPayload {
        self.groups
            .iter()
            .filter_map(|group| group.pair().map(|pair| (group.name, pair)))
            .collect()
    }
}
