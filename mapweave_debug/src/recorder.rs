// Copyright 2026 the Mapweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a byte
//! buffer as little-endian records, one tag byte followed by fixed fields.
//! [`decode`] reads them back as an iterator of [`RecordedEvent`].
//!
//! The buffer is shared between clones of a recorder, so a clone can be
//! handed to the reconciler while the original is kept for inspection.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use mapweave_core::attach::Attachment;
use mapweave_core::instance::InstanceId;
use mapweave_core::kind::{BuiltinKind, Capability, Category, Decoration, Kind};
use mapweave_core::trace::{
    AttachedEvent, CommittedEvent, DetachedEvent, InstanceCreatedEvent, RemovedEvent,
    ReorderedEvent, SizeWarningEvent, TraceSink, UpdateAction, UpdateCommittedEvent,
    UpdateOutcome, UpdatePreparedEvent,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_INSTANCE_CREATED: u8 = 1;
const TAG_ATTACHED: u8 = 2;
const TAG_DETACHED: u8 = 3;
const TAG_COMMITTED: u8 = 4;
const TAG_UPDATE_PREPARED: u8 = 5;
const TAG_UPDATE_COMMITTED: u8 = 6;
const TAG_REORDERED: u8 = 7;
const TAG_REMOVED: u8 = 8;
const TAG_SIZE_WARNING: u8 = 9;

const CATEGORIES: [Category; 6] = [
    Category::Root,
    Category::Layer,
    Category::LayerGroup,
    Category::FeatureGroup,
    Category::Control,
    Category::Handler,
];

const CAPABILITIES: [Capability; 3] = [Capability::Layer, Capability::Control, Capability::Handler];

// ---------------------------------------------------------------------------
// RecordedId
// ---------------------------------------------------------------------------

/// An instance handle as it was recorded: slot index and generation.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordedId {
    /// Slot index.
    pub index: u32,
    /// Generation counter.
    pub generation: u32,
}

impl From<InstanceId> for RecordedId {
    fn from(id: InstanceId) -> Self {
        Self {
            index: id.index(),
            generation: id.generation(),
        }
    }
}

impl fmt::Debug for RecordedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@{}", self.index, self.generation)
    }
}

impl fmt::Display for RecordedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Clone, Debug, Default)]
pub struct RecorderSink {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.buf.borrow().clone()
    }

    /// Decodes everything recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<RecordedEvent> {
        decode(&self.buf.borrow()).collect()
    }

    /// Discards everything recorded so far.
    pub fn clear(&self) {
        self.buf.borrow_mut().clear();
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&self, v: u8) {
        self.buf.borrow_mut().push(v);
    }

    fn write_u32(&self, v: u32) {
        self.buf.borrow_mut().extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&self, v: f64) {
        self.buf.borrow_mut().extend_from_slice(&v.to_bits().to_le_bytes());
    }

    fn write_count(&self, v: usize) {
        self.write_u32(u32::try_from(v).unwrap_or(u32::MAX));
    }

    fn write_id(&self, id: InstanceId) {
        self.write_u32(id.index());
        self.write_u32(id.generation());
    }

    fn write_option_id(&self, id: Option<InstanceId>) {
        match id {
            Some(id) => {
                self.write_u8(1);
                self.write_id(id);
            }
            None => {
                self.write_u8(0);
                self.write_u32(0);
                self.write_u32(0);
            }
        }
    }

    fn write_category(&self, c: Category) {
        self.write_u8(index_of(&CATEGORIES, c));
    }

    fn write_decoration(&self, d: Decoration) {
        self.write_u8(match d {
            Decoration::Popup => 0,
            Decoration::Tooltip => 1,
        });
    }

    /// Kinds are stored by tag; extension kinds by their default suffix.
    fn write_kind(&self, kind: Kind) {
        let tag = match kind {
            Kind::Builtin(builtin) => builtin.tag(),
            Kind::Extension(capability) => capability.default_suffix(),
        };
        self.write_count(tag.len());
        self.buf.borrow_mut().extend_from_slice(tag.as_bytes());
    }

    fn write_attachment(&self, a: Attachment) {
        match a {
            Attachment::Structural => self.write_u8(0),
            Attachment::RootDecoration(d) => {
                self.write_u8(1);
                self.write_decoration(d);
            }
            Attachment::RootExtension => self.write_u8(2),
            Attachment::BoundDecoration(d) => {
                self.write_u8(3);
                self.write_decoration(d);
            }
            Attachment::Unsupported => self.write_u8(4),
        }
    }
}

fn index_of<T: PartialEq>(table: &[T], value: T) -> u8 {
    table
        .iter()
        .position(|v| *v == value)
        .and_then(|i| u8::try_from(i).ok())
        .unwrap_or(u8::MAX)
}

impl TraceSink for RecorderSink {
    fn on_instance_created(&mut self, e: &InstanceCreatedEvent) {
        self.write_u8(TAG_INSTANCE_CREATED);
        self.write_id(e.instance);
        self.write_u32(e.container.0);
        self.write_category(e.category);
        self.write_kind(e.kind);
    }

    fn on_attached(&mut self, e: &AttachedEvent) {
        self.write_u8(TAG_ATTACHED);
        self.write_id(e.parent);
        self.write_id(e.child);
        self.write_attachment(e.attachment);
    }

    fn on_detached(&mut self, e: &DetachedEvent) {
        self.write_u8(TAG_DETACHED);
        self.write_option_id(e.parent);
        self.write_id(e.child);
    }

    fn on_committed(&mut self, e: &CommittedEvent) {
        self.write_u8(TAG_COMMITTED);
        self.write_id(e.instance);
    }

    fn on_update_prepared(&mut self, e: &UpdatePreparedEvent) {
        self.write_u8(TAG_UPDATE_PREPARED);
        self.write_id(e.instance);
        match e.outcome {
            UpdateOutcome::SkippedImmutable => {
                self.write_u8(0);
                self.write_u32(0);
            }
            UpdateOutcome::Unchanged => {
                self.write_u8(1);
                self.write_u32(0);
            }
            UpdateOutcome::Changed(n) => {
                self.write_u8(2);
                self.write_count(n);
            }
        }
    }

    fn on_update_committed(&mut self, e: &UpdateCommittedEvent) {
        self.write_u8(TAG_UPDATE_COMMITTED);
        self.write_id(e.instance);
        self.write_u8(match e.action {
            UpdateAction::InPlace => 0,
            UpdateAction::RootMerged => 1,
            UpdateAction::ExtensionToggled => 2,
            UpdateAction::Replaced => 3,
        });
    }

    fn on_reordered(&mut self, e: &ReorderedEvent) {
        self.write_u8(TAG_REORDERED);
        self.write_id(e.instance);
        self.write_option_id(e.before);
        self.write_u8(u8::from(e.moved));
    }

    fn on_removed(&mut self, e: &RemovedEvent) {
        self.write_u8(TAG_REMOVED);
        self.write_id(e.instance);
        self.write_count(e.released);
    }

    fn on_size_warning(&mut self, e: &SizeWarningEvent) {
        self.write_u8(TAG_SIZE_WARNING);
        self.write_u32(e.container.0);
        self.write_f64(e.width);
        self.write_f64(e.height);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// An instance was created.
    InstanceCreated {
        /// The new instance.
        instance: RecordedId,
        /// Its container.
        container: u32,
        /// Its category.
        category: Category,
        /// Its kind.
        kind: Kind,
    },
    /// A child was attached.
    Attached {
        /// The parent.
        parent: RecordedId,
        /// The child.
        child: RecordedId,
        /// The strategy used.
        attachment: Attachment,
    },
    /// A child was detached.
    Detached {
        /// The former parent, `None` for a root.
        parent: Option<RecordedId>,
        /// The child.
        child: RecordedId,
    },
    /// An instance was committed.
    Committed {
        /// The instance.
        instance: RecordedId,
    },
    /// An update was prepared.
    UpdatePrepared {
        /// The instance.
        instance: RecordedId,
        /// The decision.
        outcome: UpdateOutcome,
    },
    /// An update was committed.
    UpdateCommitted {
        /// The instance.
        instance: RecordedId,
        /// How it was applied.
        action: UpdateAction,
    },
    /// A reorder was attempted.
    Reordered {
        /// The instance to move.
        instance: RecordedId,
        /// The sibling it was to precede, if any.
        before: Option<RecordedId>,
        /// Whether anything moved.
        moved: bool,
    },
    /// A subtree was removed.
    Removed {
        /// The subtree root.
        instance: RecordedId,
        /// Number of instance records released.
        released: u32,
    },
    /// A container filled an undersized parent.
    SizeWarning {
        /// The container.
        container: u32,
        /// Parent width in pixels.
        width: f64,
        /// Parent height in pixels.
        height: f64,
    },
}

impl RecordedEvent {
    /// Short event name, as used by the exporters.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::InstanceCreated { .. } => "InstanceCreated",
            Self::Attached { .. } => "Attached",
            Self::Detached { .. } => "Detached",
            Self::Committed { .. } => "Committed",
            Self::UpdatePrepared { .. } => "UpdatePrepared",
            Self::UpdateCommitted { .. } => "UpdateCommitted",
            Self::Reordered { .. } => "Reordered",
            Self::Removed { .. } => "Removed",
            Self::SizeWarning { .. } => "SizeWarning",
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> DecodeIter<'a> {
    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let bytes = self.data.get(self.pos..self.pos + n)?;
        self.pos += n;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take(1).map(|b| b[0])
    }

    fn read_u32(&mut self) -> Option<u32> {
        Some(u32::from_le_bytes(self.take(4)?.try_into().ok()?))
    }

    fn read_f64(&mut self) -> Option<f64> {
        Some(f64::from_bits(u64::from_le_bytes(
            self.take(8)?.try_into().ok()?,
        )))
    }

    fn read_id(&mut self) -> Option<RecordedId> {
        Some(RecordedId {
            index: self.read_u32()?,
            generation: self.read_u32()?,
        })
    }

    fn read_option_id(&mut self) -> Option<Option<RecordedId>> {
        let present = self.read_u8()?;
        let id = self.read_id()?;
        Some((present != 0).then_some(id))
    }

    fn read_category(&mut self) -> Option<Category> {
        CATEGORIES.get(usize::from(self.read_u8()?)).copied()
    }

    fn read_decoration(&mut self) -> Option<Decoration> {
        Some(match self.read_u8()? {
            0 => Decoration::Popup,
            _ => Decoration::Tooltip,
        })
    }

    fn read_kind(&mut self) -> Option<Kind> {
        let len = usize::try_from(self.read_u32()?).ok()?;
        let tag = core::str::from_utf8(self.take(len)?).ok()?;
        BuiltinKind::from_tag(tag).map(Kind::Builtin).or_else(|| {
            CAPABILITIES
                .into_iter()
                .find(|c| c.default_suffix() == tag)
                .map(Kind::Extension)
        })
    }

    fn read_attachment(&mut self) -> Option<Attachment> {
        Some(match self.read_u8()? {
            0 => Attachment::Structural,
            1 => Attachment::RootDecoration(self.read_decoration()?),
            2 => Attachment::RootExtension,
            3 => Attachment::BoundDecoration(self.read_decoration()?),
            _ => Attachment::Unsupported,
        })
    }

    fn decode_instance_created(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::InstanceCreated {
            instance: self.read_id()?,
            container: self.read_u32()?,
            category: self.read_category()?,
            kind: self.read_kind()?,
        })
    }

    fn decode_attached(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Attached {
            parent: self.read_id()?,
            child: self.read_id()?,
            attachment: self.read_attachment()?,
        })
    }

    fn decode_detached(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Detached {
            parent: self.read_option_id()?,
            child: self.read_id()?,
        })
    }

    fn decode_update_prepared(&mut self) -> Option<RecordedEvent> {
        let instance = self.read_id()?;
        let code = self.read_u8()?;
        let count = self.read_u32()?;
        let outcome = match code {
            0 => UpdateOutcome::SkippedImmutable,
            1 => UpdateOutcome::Unchanged,
            _ => UpdateOutcome::Changed(usize::try_from(count).ok()?),
        };
        Some(RecordedEvent::UpdatePrepared { instance, outcome })
    }

    fn decode_update_committed(&mut self) -> Option<RecordedEvent> {
        let instance = self.read_id()?;
        let action = match self.read_u8()? {
            0 => UpdateAction::InPlace,
            1 => UpdateAction::RootMerged,
            2 => UpdateAction::ExtensionToggled,
            _ => UpdateAction::Replaced,
        };
        Some(RecordedEvent::UpdateCommitted { instance, action })
    }

    fn decode_reordered(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Reordered {
            instance: self.read_id()?,
            before: self.read_option_id()?,
            moved: self.read_u8()? != 0,
        })
    }

    fn decode_removed(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Removed {
            instance: self.read_id()?,
            released: self.read_u32()?,
        })
    }

    fn decode_size_warning(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::SizeWarning {
            container: self.read_u32()?,
            width: self.read_f64()?,
            height: self.read_f64()?,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_INSTANCE_CREATED => self.decode_instance_created(),
            TAG_ATTACHED => self.decode_attached(),
            TAG_DETACHED => self.decode_detached(),
            TAG_COMMITTED => Some(RecordedEvent::Committed {
                instance: self.read_id()?,
            }),
            TAG_UPDATE_PREPARED => self.decode_update_prepared(),
            TAG_UPDATE_COMMITTED => self.decode_update_committed(),
            TAG_REORDERED => self.decode_reordered(),
            TAG_REMOVED => self.decode_removed(),
            TAG_SIZE_WARNING => self.decode_size_warning(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
